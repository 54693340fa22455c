#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    rc::Rc,
};

use gssauth::{
    CallbackId, ContextRequest, CredentialResolver, Identity, NegotiationEngine, ResultCode,
    StartOutcome, StepOutcome,
};

/// Engine double driven by queued outcomes; shared counters let tests
/// observe disposal after the authenticator is gone.
#[derive(Clone, Default)]
pub struct MockEngine {
    pub start: Rc<RefCell<Option<StartOutcome>>>,
    pub steps: Rc<RefCell<VecDeque<StepOutcome>>>,
    pub received: Rc<RefCell<Vec<Vec<u8>>>>,
    pub fail_create: Rc<Cell<Option<ResultCode>>>,
    pub auth_name: Rc<RefCell<Option<Vec<u8>>>>,
    pub disposed: Rc<Cell<usize>>,
}

impl MockEngine {
    pub fn gssapi_start(token: &[u8]) -> Self {
        let engine = Self::default();
        *engine.start.borrow_mut() = Some(StartOutcome {
            code: ResultCode::CONTINUE,
            mechanism: Some("GSSAPI".to_owned()),
            token: token.to_vec(),
        });
        engine
    }

    pub fn then_step(self, code: ResultCode, token: &[u8]) -> Self {
        self.steps.borrow_mut().push_back(StepOutcome {
            code,
            token: token.to_vec(),
        });
        self
    }
}

impl NegotiationEngine for MockEngine {
    type Context = ();

    fn create_context(
        &self,
        _request: &ContextRequest<'_>,
        resolver: &CredentialResolver<'_>,
    ) -> Result<Self::Context, ResultCode> {
        *self.auth_name.borrow_mut() = resolver.resolve(CallbackId::AUTH_NAME).map(<[u8]>::to_vec);
        match self.fail_create.get() {
            Some(code) => Err(code),
            None => Ok(()),
        }
    }

    fn start(
        &self,
        _context: &mut Self::Context,
        _mechanisms: &[&str],
        _resolver: &CredentialResolver<'_>,
    ) -> StartOutcome {
        self.start.borrow_mut().take().unwrap_or(StartOutcome {
            code: ResultCode::FAIL,
            mechanism: None,
            token: Vec::new(),
        })
    }

    fn step(
        &self,
        _context: &mut Self::Context,
        inbound: &[u8],
        _resolver: &CredentialResolver<'_>,
    ) -> StepOutcome {
        self.received.borrow_mut().push(inbound.to_vec());
        self.steps.borrow_mut().pop_front().unwrap_or(StepOutcome {
            code: ResultCode::OK,
            token: Vec::new(),
        })
    }

    fn dispose(&self, _context: Self::Context) {
        self.disposed.set(self.disposed.get() + 1);
    }

    fn error_string(&self, code: ResultCode) -> String {
        match code {
            ResultCode::FAIL => "bad token".to_owned(),
            other => format!("engine code {}", other),
        }
    }
}

pub fn alice() -> Identity {
    Identity::new("alice", "db.example.com", "mongodb", false).expect("valid identity")
}
