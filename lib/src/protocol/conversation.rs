use std::{error::Error, fmt};

use tracing::{debug, info, warn};

use crate::{
    authenticator::Authenticator,
    constants::GSSAPI_MECHANISM,
    engine::NegotiationEngine,
    error::AuthError,
};

use super::{
    messages::{ConversationId, SaslCommand, SaslReply},
    transport::SaslTransport,
};

/// Bounds applied by [`run_conversation`]. No cap by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversationLimits {
    pub max_rounds: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversationOutcome {
    pub conversation_id: ConversationId,
    /// Challenges answered with `saslContinue`.
    pub rounds: usize,
}

#[derive(Debug)]
pub enum ConversationError {
    Auth(AuthError),
    Transport(Box<dyn Error + Send + Sync>),
    Rejected {
        code: i32,
        message: String,
    },
    ConversationMismatch {
        expected: ConversationId,
        got: ConversationId,
    },
    TooManyRounds(usize),
}

impl fmt::Display for ConversationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversationError::Auth(err) => write!(f, "authentication error: {}", err),
            ConversationError::Transport(err) => write!(f, "transport error: {}", err),
            ConversationError::Rejected { code, message } => {
                write!(f, "server rejected authentication ({}): {}", code, message)
            }
            ConversationError::ConversationMismatch { expected, got } => write!(
                f,
                "server switched conversation id from {} to {}",
                expected, got
            ),
            ConversationError::TooManyRounds(limit) => write!(
                f,
                "server still challenging after {} rounds",
                limit
            ),
        }
    }
}

impl Error for ConversationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConversationError::Auth(err) => Some(err),
            ConversationError::Transport(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<AuthError> for ConversationError {
    fn from(value: AuthError) -> Self {
        Self::Auth(value)
    }
}

fn transport_error<E>(err: E) -> ConversationError
where
    E: Error + Send + Sync + 'static,
{
    ConversationError::Transport(Box::new(err))
}

/// Runs a full `saslStart`/`saslContinue` exchange over `transport`.
///
/// Returns once the server reports `done`, at which point the authenticator
/// is marked complete. On any error the authenticator is left failed.
pub async fn run_conversation<T, E>(
    transport: &mut T,
    authenticator: &mut Authenticator<E>,
    limits: &ConversationLimits,
) -> Result<ConversationOutcome, ConversationError>
where
    T: SaslTransport,
    E: NegotiationEngine,
{
    let result = converse(transport, authenticator, limits).await;
    if result.is_err() {
        authenticator.fail();
    }
    result
}

async fn converse<T, E>(
    transport: &mut T,
    authenticator: &mut Authenticator<E>,
    limits: &ConversationLimits,
) -> Result<ConversationOutcome, ConversationError>
where
    T: SaslTransport,
    E: NegotiationEngine,
{
    let payload = authenticator.initiate()?;
    transport
        .send(&SaslCommand::Start {
            mechanism: GSSAPI_MECHANISM.to_owned(),
            payload,
            auto_authorize: true,
        })
        .await
        .map_err(transport_error)?;

    let mut expected: Option<ConversationId> = None;
    let mut rounds = 0usize;
    loop {
        let reply = transport.receive().await.map_err(transport_error)?;
        let (conversation_id, done, challenge) = match reply {
            SaslReply::Challenge {
                conversation_id,
                done,
                payload,
            } => (conversation_id, done, payload),
            SaslReply::Rejected { code, message } => {
                warn!(
                    "server rejected GSSAPI authentication for {} ({}): {}",
                    authenticator.user_name(),
                    code,
                    message
                );
                return Err(ConversationError::Rejected { code, message });
            }
        };

        match expected {
            None => expected = Some(conversation_id),
            Some(expected) if expected != conversation_id => {
                return Err(ConversationError::ConversationMismatch {
                    expected,
                    got: conversation_id,
                });
            }
            Some(_) => {}
        }

        if done {
            authenticator.complete()?;
            info!(
                "GSSAPI conversation {} finished after {} rounds",
                conversation_id, rounds
            );
            return Ok(ConversationOutcome {
                conversation_id,
                rounds,
            });
        }

        if let Some(max_rounds) = limits.max_rounds {
            if rounds >= max_rounds {
                return Err(ConversationError::TooManyRounds(max_rounds));
            }
        }

        let payload = authenticator.step(&challenge)?;
        rounds += 1;
        debug!("answering round {} of conversation {}", rounds, conversation_id);
        transport
            .send(&SaslCommand::Continue {
                conversation_id,
                payload,
            })
            .await
            .map_err(transport_error)?;
    }
}
