use std::fmt;

use serde::{Deserialize, Serialize};

use crate::transcode::EncodedToken;

/// Server-assigned identifier tying the rounds of one conversation together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(pub i64);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum SaslCommand {
    Start {
        mechanism: String,
        payload: EncodedToken,
        auto_authorize: bool,
    },
    Continue {
        conversation_id: ConversationId,
        payload: EncodedToken,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SaslReply {
    Challenge {
        conversation_id: ConversationId,
        done: bool,
        payload: EncodedToken,
    },
    Rejected {
        code: i32,
        message: String,
    },
}
