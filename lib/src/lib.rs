//! Client side of a SASL GSSAPI handshake for database authentication.
//!
//! An [`Authenticator`] owns one negotiation context produced by a
//! [`NegotiationEngine`] and drives it through
//! [`initiate`](Authenticator::initiate) and any number of
//! [`step`](Authenticator::step) calls. Tokens cross the boundary as base64
//! [`EncodedToken`]s; moving them to and from the server is left to the
//! caller, or to [`protocol::run_conversation`] when the peer speaks the
//! `saslStart`/`saslContinue` exchange.

pub mod authenticator;
pub mod config;
pub mod constants;
mod context;
pub mod engine;
pub mod error;
pub mod identity;
pub mod protocol;
pub mod resolver;
pub mod transcode;

#[cfg(test)]
mod testing;

pub use authenticator::{Authenticator, HandshakeState};
pub use config::{AuthenticatorConfig, ConfigError};
pub use engine::{
    CallbackId, ContextRequest, NegotiationEngine, ResultCode, StartOutcome, StepOutcome,
    ensure_initialized,
};
pub use error::{AuthError, Operation};
pub use identity::{HostName, Identity, IdentityError, ServiceName, UserName};
pub use resolver::CredentialResolver;
pub use transcode::{EncodedToken, decode_token, encode_token};
