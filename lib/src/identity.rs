use std::{error::Error, fmt};

use serde::{Deserialize, Serialize};

const MAX_NAME_LEN: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityError {
    kind: &'static str,
    message: String,
}

impl IdentityError {
    fn new(kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

impl fmt::Display for IdentityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} name {}", self.kind, self.message)
    }
}

impl Error for IdentityError {}

fn validate_name(kind: &'static str, value: &str) -> Result<(), IdentityError> {
    if value.is_empty() {
        return Err(IdentityError::new(kind, "must not be empty"));
    }

    if value.len() > MAX_NAME_LEN {
        return Err(IdentityError::new(
            kind,
            format!("must be at most {} bytes", MAX_NAME_LEN),
        ));
    }

    if value.contains('\0') {
        return Err(IdentityError::new(kind, "must not contain NUL bytes"));
    }

    Ok(())
}

fn validate_service(kind: &'static str, value: &str) -> Result<(), IdentityError> {
    validate_name(kind, value)?;
    if value.contains(['@', '/']) {
        return Err(IdentityError::new(kind, "must not contain '@' or '/'"));
    }
    Ok(())
}

macro_rules! identity_name {
    ($name:ident, $kind:literal, $validate:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Result<Self, IdentityError> {
                let value = value.into();
                $validate($kind, &value)?;
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let value = String::deserialize(deserializer)?;
                $name::new(value).map_err(serde::de::Error::custom)
            }
        }
    };
}

identity_name!(UserName, "user", validate_name);
identity_name!(HostName, "host", validate_name);
identity_name!(ServiceName, "service", validate_service);

/// Who is authenticating, and to which service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_name: UserName,
    pub host_name: HostName,
    pub service_name: ServiceName,
    /// Passed through to the engine when the context is created.
    pub canonicalize_host_name: bool,
}

impl Identity {
    pub fn new(
        user_name: impl Into<String>,
        host_name: impl Into<String>,
        service_name: impl Into<String>,
        canonicalize_host_name: bool,
    ) -> Result<Self, IdentityError> {
        Ok(Self {
            user_name: UserName::new(user_name)?,
            host_name: HostName::new(host_name)?,
            service_name: ServiceName::new(service_name)?,
            canonicalize_host_name,
        })
    }
}
