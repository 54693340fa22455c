use std::{env, error::Error, fmt};

use serde::{Deserialize, Serialize};

use crate::{
    constants::DEFAULT_SERVICE_NAME,
    identity::{Identity, IdentityError},
    protocol::ConversationLimits,
};

pub const ENV_USER_NAME: &str = "GSSAPI_USER_NAME";
pub const ENV_HOST_NAME: &str = "GSSAPI_HOST_NAME";
pub const ENV_SERVICE_NAME: &str = "GSSAPI_SERVICE_NAME";
pub const ENV_CANONICALIZE_HOST_NAME: &str = "GSSAPI_CANONICALIZE_HOST_NAME";
pub const ENV_MAX_ROUNDS: &str = "GSSAPI_MAX_ROUNDS";

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
    Identity(IdentityError),
    Json(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} is not set", key),
            ConfigError::Invalid { key, value } => {
                write!(f, "{} has invalid value '{}'", key, value)
            }
            ConfigError::Identity(err) => write!(f, "invalid identity: {}", err),
            ConfigError::Json(err) => write!(f, "JSON error: {}", err),
        }
    }
}

impl Error for ConfigError {}

impl From<IdentityError> for ConfigError {
    fn from(value: IdentityError) -> Self {
        ConfigError::Identity(value)
    }
}

/// Caller-facing settings for one authentication attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthenticatorConfig {
    pub user_name: String,
    pub host_name: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default)]
    pub canonicalize_host_name: bool,
    /// Cap on `saslContinue` rounds; unbounded when absent.
    #[serde(default)]
    pub max_rounds: Option<usize>,
}

fn default_service_name() -> String {
    DEFAULT_SERVICE_NAME.to_owned()
}

impl AuthenticatorConfig {
    pub fn new(user_name: impl Into<String>, host_name: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            host_name: host_name.into(),
            service_name: default_service_name(),
            canonicalize_host_name: false,
            max_rounds: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(ConfigError::Json)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through `lookup`, keyed by the `GSSAPI_*` variable
    /// names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let user_name = lookup(ENV_USER_NAME).ok_or(ConfigError::Missing(ENV_USER_NAME))?;
        let host_name = lookup(ENV_HOST_NAME).ok_or(ConfigError::Missing(ENV_HOST_NAME))?;
        let service_name = lookup(ENV_SERVICE_NAME).unwrap_or_else(default_service_name);

        let canonicalize_host_name = match lookup(ENV_CANONICALIZE_HOST_NAME) {
            None => false,
            Some(value) => parse_flag(&value).ok_or(ConfigError::Invalid {
                key: ENV_CANONICALIZE_HOST_NAME,
                value,
            })?,
        };

        let max_rounds = match lookup(ENV_MAX_ROUNDS) {
            None => None,
            Some(value) => Some(value.trim().parse::<usize>().map_err(|_| {
                ConfigError::Invalid {
                    key: ENV_MAX_ROUNDS,
                    value,
                }
            })?),
        };

        Ok(Self {
            user_name,
            host_name,
            service_name,
            canonicalize_host_name,
            max_rounds,
        })
    }

    pub fn identity(&self) -> Result<Identity, ConfigError> {
        Ok(Identity::new(
            self.user_name.as_str(),
            self.host_name.as_str(),
            self.service_name.as_str(),
            self.canonicalize_host_name,
        )?)
    }

    pub fn limits(&self) -> ConversationLimits {
        ConversationLimits {
            max_rounds: self.max_rounds,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
