use tracing::{debug, warn};

use crate::{
    engine::{ContextRequest, NegotiationEngine},
    error::{AuthError, Operation},
    resolver::CredentialResolver,
};

/// Exclusive owner of the engine's negotiation context.
///
/// The context is created at most once and handed back to the engine for
/// teardown exactly once, either through [`dispose`](Self::dispose) or on
/// drop.
pub(crate) struct ContextHandle<E: NegotiationEngine> {
    engine: E,
    context: Option<E::Context>,
}

impl<E: NegotiationEngine> ContextHandle<E> {
    pub(crate) fn new(engine: E) -> Self {
        Self {
            engine,
            context: None,
        }
    }

    /// Creates the context unless one already exists. On failure nothing is
    /// retained.
    pub(crate) fn create(
        &mut self,
        request: &ContextRequest<'_>,
        resolver: &CredentialResolver<'_>,
    ) -> Result<(), AuthError> {
        if self.context.is_some() {
            return Ok(());
        }

        match self.engine.create_context(request, resolver) {
            Ok(context) => {
                debug!(
                    "negotiation context created (service={}, host={})",
                    request.service_name, request.host_name
                );
                self.context = Some(context);
                Ok(())
            }
            Err(code) => {
                warn!(
                    "negotiation context creation failed for {}@{}: code {}",
                    request.service_name, request.host_name, code
                );
                Err(AuthError::negotiation(
                    Operation::CreateContext,
                    code,
                    self.engine.error_string(code),
                ))
            }
        }
    }

    pub(crate) fn is_present(&self) -> bool {
        self.context.is_some()
    }

    /// Engine and live context together, or `None` before creation and after
    /// disposal.
    pub(crate) fn parts(&mut self) -> Option<(&E, &mut E::Context)> {
        let engine = &self.engine;
        self.context.as_mut().map(|context| (engine, context))
    }

    pub(crate) fn dispose(&mut self) {
        if let Some(context) = self.context.take() {
            self.engine.dispose(context);
            debug!("negotiation context disposed");
        }
    }
}

impl<E: NegotiationEngine> Drop for ContextHandle<E> {
    fn drop(&mut self) {
        self.dispose();
    }
}
