//! Drives the `saslStart`/`saslContinue` exchange around an
//! [`Authenticator`](crate::Authenticator).
//!
//! The runner talks to the server through a [`SaslTransport`]. A real
//! database driver implements it over its own command encoding;
//! [`JsonFrameTransport`] is a simple length-prefixed JSON transport for
//! tests and peers that accept it. It is not a database wire format.

mod conversation;
mod framing;
mod messages;
mod transport;

pub use conversation::{
    ConversationError, ConversationLimits, ConversationOutcome, run_conversation,
};
pub use framing::{MAX_FRAME_BYTES, ProtocolError, read_message, write_message};
pub use messages::{ConversationId, SaslCommand, SaslReply};
pub use transport::{JsonFrameTransport, SaslTransport};
