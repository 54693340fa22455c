use std::{
    any::{TypeId, type_name},
    collections::HashMap,
    fmt,
    sync::{Mutex, OnceLock, PoisonError},
};

use tracing::{info, warn};

use crate::{
    error::{AuthError, Operation},
    resolver::CredentialResolver,
};

/// Numeric status reported by the negotiation engine.
///
/// Negative values are failures; zero and positive values are progress
/// indicators. The constants follow the Cyrus SASL numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResultCode(i32);

impl ResultCode {
    pub const OK: Self = Self(0);
    pub const CONTINUE: Self = Self(1);
    pub const INTERACT: Self = Self(2);
    pub const FAIL: Self = Self(-1);
    pub const NOMEM: Self = Self(-2);
    pub const BUFOVER: Self = Self(-3);
    pub const NOMECH: Self = Self(-4);
    pub const BADPROT: Self = Self(-5);
    pub const NOTDONE: Self = Self(-6);
    pub const BADPARAM: Self = Self(-7);
    pub const BADMAC: Self = Self(-9);
    pub const NOTINIT: Self = Self(-12);

    pub const fn new(code: i32) -> Self {
        Self(code)
    }

    pub const fn get(self) -> i32 {
        self.0
    }

    pub const fn is_failure(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a credential the engine asks the application for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u32);

impl CallbackId {
    pub const USER: Self = Self(0x4001);
    pub const AUTH_NAME: Self = Self(0x4002);
    pub const LANGUAGE: Self = Self(0x4003);
    pub const PASS: Self = Self(0x4004);
    pub const GET_REALM: Self = Self(0x4008);

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Names handed to the engine when a context is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextRequest<'a> {
    pub service_name: &'a str,
    pub host_name: &'a str,
    pub canonicalize_host_name: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartOutcome {
    pub code: ResultCode,
    /// `None` when the engine selected nothing.
    pub mechanism: Option<String>,
    pub token: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub code: ResultCode,
    pub token: Vec<u8>,
}

/// Call contract of the external engine that performs mechanism negotiation
/// and produces the GSSAPI tokens.
///
/// The resolver is passed to every call that may need to ask for
/// credentials; implementations must not retain it past the call.
pub trait NegotiationEngine {
    type Context;

    /// Process-wide library setup. Called through [`ensure_initialized`].
    fn initialize(&self) -> ResultCode {
        ResultCode::OK
    }

    fn create_context(
        &self,
        request: &ContextRequest<'_>,
        resolver: &CredentialResolver<'_>,
    ) -> Result<Self::Context, ResultCode>;

    fn start(
        &self,
        context: &mut Self::Context,
        mechanisms: &[&str],
        resolver: &CredentialResolver<'_>,
    ) -> StartOutcome;

    fn step(
        &self,
        context: &mut Self::Context,
        inbound: &[u8],
        resolver: &CredentialResolver<'_>,
    ) -> StepOutcome;

    fn dispose(&self, context: Self::Context);

    fn error_string(&self, code: ResultCode) -> String;
}

static ENGINE_INIT: OnceLock<Mutex<HashMap<TypeId, ResultCode>>> = OnceLock::new();

/// Runs the engine's one-time initialization the first time it is called in
/// this process for that engine type. Later calls return the cached outcome,
/// failures included, without touching the engine.
pub fn ensure_initialized<E>(engine: &E) -> Result<(), AuthError>
where
    E: NegotiationEngine + 'static,
{
    let code = {
        let mut outcomes = ENGINE_INIT
            .get_or_init(Default::default)
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *outcomes.entry(TypeId::of::<E>()).or_insert_with(|| {
            let code = engine.initialize();
            if code == ResultCode::OK {
                info!("negotiation engine {} initialized", type_name::<E>());
            } else {
                warn!(
                    "negotiation engine {} initialization failed with code {}",
                    type_name::<E>(),
                    code
                );
            }
            code
        })
    };

    if code == ResultCode::OK {
        Ok(())
    } else {
        Err(AuthError::negotiation(
            Operation::Initialize,
            code,
            engine.error_string(code),
        ))
    }
}
