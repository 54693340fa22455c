use std::fmt;

use tracing::{debug, info, warn};

use crate::{
    constants::GSSAPI_MECHANISM,
    context::ContextHandle,
    engine::{ContextRequest, NegotiationEngine, ResultCode},
    error::{AuthError, Operation},
    identity::{HostName, Identity, ServiceName, UserName},
    resolver::CredentialResolver,
    transcode::{EncodedToken, decode_token, encode_token},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandshakeState {
    Uninitialized,
    Initiated,
    Continuing,
    Complete,
    Failed,
}

impl HandshakeState {
    pub fn as_str(self) -> &'static str {
        match self {
            HandshakeState::Uninitialized => "uninitialized",
            HandshakeState::Initiated => "initiated",
            HandshakeState::Continuing => "continuing",
            HandshakeState::Complete => "complete",
            HandshakeState::Failed => "failed",
        }
    }

    fn accepts_step(self) -> bool {
        matches!(self, HandshakeState::Initiated | HandshakeState::Continuing)
    }
}

impl fmt::Display for HandshakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One GSSAPI authentication attempt.
///
/// The negotiation context is created by [`initiate`](Self::initiate) and
/// released when the authenticator is dropped. Any error leaves the
/// authenticator in [`HandshakeState::Failed`]; start over with a new one.
pub struct Authenticator<E: NegotiationEngine> {
    identity: Identity,
    context: ContextHandle<E>,
    state: HandshakeState,
    steps: u64,
}

impl<E: NegotiationEngine> Authenticator<E> {
    pub fn new(engine: E, identity: Identity) -> Self {
        Self {
            identity,
            context: ContextHandle::new(engine),
            state: HandshakeState::Uninitialized,
            steps: 0,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn user_name(&self) -> &UserName {
        &self.identity.user_name
    }

    pub fn host_name(&self) -> &HostName {
        &self.identity.host_name
    }

    pub fn service_name(&self) -> &ServiceName {
        &self.identity.service_name
    }

    pub fn canonicalize_host_name(&self) -> bool {
        self.identity.canonicalize_host_name
    }

    #[deprecated(note = "always true; kept for callers of the legacy validity flag")]
    pub fn is_valid(&self) -> bool {
        true
    }

    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// Successful `step` calls so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn has_context(&self) -> bool {
        self.context.is_present()
    }

    /// Creates the context, starts the GSSAPI mechanism and returns the first
    /// token for the server.
    pub fn initiate(&mut self) -> Result<EncodedToken, AuthError> {
        let result = self.try_initiate();
        self.settle(result)
    }

    /// Feeds a server challenge to the engine and returns the reply token.
    ///
    /// Never decides on its own that the exchange is over; the caller stops
    /// stepping once the server reports completion.
    pub fn step(&mut self, challenge: &EncodedToken) -> Result<EncodedToken, AuthError> {
        let result = self.try_step(challenge);
        self.settle(result)
    }

    /// Marks the exchange finished after the server reported success.
    pub fn complete(&mut self) -> Result<(), AuthError> {
        if !self.state.accepts_step() {
            let err = self.state_error(Operation::Complete);
            return self.settle(Err(err));
        }
        self.state = HandshakeState::Complete;
        info!(
            "GSSAPI handshake complete for {} after {} steps",
            self.identity.user_name, self.steps
        );
        Ok(())
    }

    /// Releases the negotiation context now rather than on drop.
    pub fn dispose(&mut self) {
        self.context.dispose();
    }

    fn try_initiate(&mut self) -> Result<EncodedToken, AuthError> {
        if self.state != HandshakeState::Uninitialized {
            return Err(self.state_error(Operation::Start));
        }

        let resolver = CredentialResolver::new(&self.identity.user_name);
        let request = ContextRequest {
            service_name: self.identity.service_name.as_str(),
            host_name: self.identity.host_name.as_str(),
            canonicalize_host_name: self.identity.canonicalize_host_name,
        };
        self.context.create(&request, &resolver)?;

        let Some((engine, context)) = self.context.parts() else {
            return Err(AuthError::ProtocolState {
                operation: Operation::Start,
                state: HandshakeState::Uninitialized,
            });
        };
        let outcome = engine.start(context, &[GSSAPI_MECHANISM], &resolver);

        if outcome.code.is_failure() {
            return Err(AuthError::negotiation(
                Operation::Start,
                outcome.code,
                engine.error_string(outcome.code),
            ));
        }

        let selected = outcome.mechanism.unwrap_or_default();
        if selected != GSSAPI_MECHANISM {
            return Err(AuthError::MechanismMismatch { selected });
        }
        debug!("negotiation engine selected {}", selected);

        if outcome.code != ResultCode::CONTINUE {
            return Err(AuthError::negotiation(
                Operation::Start,
                outcome.code,
                format!(
                    "expected the mechanism to continue: {}",
                    engine.error_string(outcome.code)
                ),
            ));
        }

        let token = encode_token(&outcome.token)?;
        self.state = HandshakeState::Initiated;
        debug!(
            "GSSAPI handshake initiated for {}: {} byte token",
            self.identity.user_name,
            outcome.token.len()
        );
        Ok(token)
    }

    fn try_step(&mut self, challenge: &EncodedToken) -> Result<EncodedToken, AuthError> {
        if !self.state.accepts_step() {
            return Err(self.state_error(Operation::Step));
        }

        let state = self.state;
        let resolver = CredentialResolver::new(&self.identity.user_name);
        let Some((engine, context)) = self.context.parts() else {
            return Err(AuthError::ProtocolState {
                operation: Operation::Step,
                state,
            });
        };

        let inbound = decode_token(challenge)?;
        let outcome = engine.step(context, &inbound, &resolver);
        if outcome.code.is_failure() {
            return Err(AuthError::negotiation(
                Operation::Step,
                outcome.code,
                engine.error_string(outcome.code),
            ));
        }

        let token = encode_token(&outcome.token)?;
        self.steps += 1;
        self.state = HandshakeState::Continuing;
        debug!(
            "GSSAPI step {} ({}): {} bytes in, {} bytes out",
            self.steps,
            outcome.code,
            inbound.len(),
            outcome.token.len()
        );
        Ok(token)
    }

    fn state_error(&self, operation: Operation) -> AuthError {
        AuthError::ProtocolState {
            operation,
            state: self.state,
        }
    }

    /// Retires the attempt after a failure detected outside the handshake
    /// itself, such as a server rejection.
    pub(crate) fn fail(&mut self) {
        if self.state != HandshakeState::Failed {
            warn!(
                "GSSAPI handshake for {} abandoned in the {} state",
                self.identity.user_name, self.state
            );
            self.state = HandshakeState::Failed;
        }
    }

    fn settle<T>(&mut self, result: Result<T, AuthError>) -> Result<T, AuthError> {
        if let Err(err) = &result {
            warn!(
                "GSSAPI handshake for {} failed: {}",
                self.identity.user_name, err
            );
            self.state = HandshakeState::Failed;
        }
        result
    }
}

impl<E: NegotiationEngine> fmt::Debug for Authenticator<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("identity", &self.identity)
            .field("state", &self.state)
            .field("steps", &self.steps)
            .field("has_context", &self.context.is_present())
            .finish()
    }
}
