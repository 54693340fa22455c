use tracing::debug;

use crate::{engine::CallbackId, identity::UserName};

/// Answers the engine's credential callbacks from the authenticator's
/// identity.
///
/// Both the authentication name and the authorization user resolve to the
/// configured user name. Anything else is left to the engine.
#[derive(Debug, Clone, Copy)]
pub struct CredentialResolver<'a> {
    user_name: &'a str,
}

impl<'a> CredentialResolver<'a> {
    pub(crate) fn new(user_name: &'a UserName) -> Self {
        Self {
            user_name: user_name.as_str(),
        }
    }

    /// Returns the requested value borrowed from the identity, or `None`
    /// when the callback is not handled here.
    pub fn resolve(&self, id: CallbackId) -> Option<&'a [u8]> {
        match id {
            CallbackId::AUTH_NAME | CallbackId::USER => Some(self.user_name.as_bytes()),
            other => {
                debug!("credential callback {:#x} not handled", other.raw());
                None
            }
        }
    }
}
