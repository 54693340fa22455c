use std::{
    cell::{RefCell, RefMut},
    collections::{HashMap, VecDeque},
    rc::Rc,
};

use crate::{
    constants::GSSAPI_MECHANISM,
    engine::{
        CallbackId, ContextRequest, NegotiationEngine, ResultCode, StartOutcome, StepOutcome,
    },
    resolver::CredentialResolver,
};

/// Engine double whose answers are queued up front and whose calls are
/// recorded for inspection.
#[derive(Default)]
pub(crate) struct Script {
    pub(crate) create_error: Option<ResultCode>,
    pub(crate) start: Option<StartOutcome>,
    pub(crate) steps: VecDeque<StepOutcome>,
    pub(crate) messages: HashMap<ResultCode, String>,

    pub(crate) initialized: usize,
    pub(crate) created: usize,
    pub(crate) disposed: usize,
    pub(crate) target: Option<String>,
    pub(crate) resolved_user: Option<Vec<u8>>,
    pub(crate) mechanisms: Vec<String>,
    pub(crate) inbound: Vec<Vec<u8>>,
}

#[derive(Clone, Default)]
pub(crate) struct ScriptedEngine(Rc<RefCell<Script>>);

impl ScriptedEngine {
    pub(crate) fn script(&self) -> RefMut<'_, Script> {
        self.0.borrow_mut()
    }

    pub(crate) fn with_start(self, code: ResultCode, mechanism: Option<&str>, token: &[u8]) -> Self {
        self.script().start = Some(StartOutcome {
            code,
            mechanism: mechanism.map(str::to_owned),
            token: token.to_vec(),
        });
        self
    }

    pub(crate) fn with_step(self, code: ResultCode, token: &[u8]) -> Self {
        self.script().steps.push_back(StepOutcome {
            code,
            token: token.to_vec(),
        });
        self
    }

    pub(crate) fn with_message(self, code: ResultCode, message: &str) -> Self {
        self.script().messages.insert(code, message.to_owned());
        self
    }
}

impl NegotiationEngine for ScriptedEngine {
    type Context = usize;

    fn initialize(&self) -> ResultCode {
        self.script().initialized += 1;
        ResultCode::OK
    }

    fn create_context(
        &self,
        request: &ContextRequest<'_>,
        resolver: &CredentialResolver<'_>,
    ) -> Result<Self::Context, ResultCode> {
        let mut script = self.script();
        script.target = Some(format!("{}@{}", request.service_name, request.host_name));
        script.resolved_user = resolver.resolve(CallbackId::AUTH_NAME).map(<[u8]>::to_vec);
        if let Some(code) = script.create_error {
            return Err(code);
        }
        script.created += 1;
        Ok(script.created)
    }

    fn start(
        &self,
        _context: &mut Self::Context,
        mechanisms: &[&str],
        _resolver: &CredentialResolver<'_>,
    ) -> StartOutcome {
        let mut script = self.script();
        script
            .mechanisms
            .extend(mechanisms.iter().map(|m| (*m).to_owned()));
        script.start.take().unwrap_or(StartOutcome {
            code: ResultCode::CONTINUE,
            mechanism: Some(GSSAPI_MECHANISM.to_owned()),
            token: Vec::new(),
        })
    }

    fn step(
        &self,
        _context: &mut Self::Context,
        inbound: &[u8],
        _resolver: &CredentialResolver<'_>,
    ) -> StepOutcome {
        let mut script = self.script();
        script.inbound.push(inbound.to_vec());
        script.steps.pop_front().unwrap_or(StepOutcome {
            code: ResultCode::OK,
            token: Vec::new(),
        })
    }

    fn dispose(&self, _context: Self::Context) {
        self.script().disposed += 1;
    }

    fn error_string(&self, code: ResultCode) -> String {
        self.script()
            .messages
            .get(&code)
            .cloned()
            .unwrap_or_else(|| "generic failure".to_owned())
    }
}
