use std::{error::Error, fmt};

use crate::{authenticator::HandshakeState, engine::ResultCode};

/// Step of the handshake an error was raised from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Initialize,
    CreateContext,
    Start,
    Step,
    Encode,
    Decode,
    Complete,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Initialize => "engine initialization",
            Operation::CreateContext => "context creation",
            Operation::Start => "mechanism start",
            Operation::Step => "negotiation step",
            Operation::Encode => "token encoding",
            Operation::Decode => "token decoding",
            Operation::Complete => "handshake completion",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a handshake operation. Every variant is fatal to the attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The engine reported a failure code, or a peer token could not be
    /// decoded.
    Negotiation {
        operation: Operation,
        code: ResultCode,
        message: String,
    },
    /// The engine picked a mechanism other than GSSAPI. Empty when it picked
    /// none at all.
    MechanismMismatch { selected: String },
    /// The encoder wrote, or would have written, more than the buffer holds.
    EncodingOverflow { written: usize, capacity: usize },
    /// The call is not legal in the authenticator's current state.
    ProtocolState {
        operation: Operation,
        state: HandshakeState,
    },
}

impl AuthError {
    pub(crate) fn negotiation(
        operation: Operation,
        code: ResultCode,
        message: impl Into<String>,
    ) -> Self {
        Self::Negotiation {
            operation,
            code,
            message: message.into(),
        }
    }

    /// Engine code carried by the error, if any.
    pub fn code(&self) -> Option<ResultCode> {
        match self {
            AuthError::Negotiation { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Negotiation {
                operation,
                code,
                message,
            } => write!(f, "{} failed (code {}: {})", operation, code, message),
            AuthError::MechanismMismatch { selected } if selected.is_empty() => {
                f.write_str("negotiation engine did not select a mechanism")
            }
            AuthError::MechanismMismatch { selected } => write!(
                f,
                "negotiation engine selected an unexpected mechanism: {}",
                selected
            ),
            AuthError::EncodingOverflow { written, capacity } => write!(
                f,
                "encoder claimed to write {} bytes when fewer than {} bytes were allowed",
                written, capacity
            ),
            AuthError::ProtocolState { operation, state } => {
                write!(f, "{} is not allowed in the {} state", operation, state)
            }
        }
    }
}

impl Error for AuthError {}
