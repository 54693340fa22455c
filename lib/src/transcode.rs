use std::fmt;

use base64::{
    DecodeSliceError, Engine, encoded_len, engine::general_purpose::STANDARD as BASE64,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use zeroize::Zeroizing;

use crate::{
    constants::{DECODE_BUFFER_LEN, ENCODE_BUFFER_LEN},
    engine::ResultCode,
    error::{AuthError, Operation},
};

/// Base64 text form of a negotiation token, as exchanged with the peer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedToken(String);

impl EncodedToken {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for EncodedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EncodedToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for EncodedToken {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Encodes a raw token into base64 through a fixed buffer.
///
/// One byte of the buffer is always held back from the encoder, and the
/// length it reports is checked against the buffer before it is trusted.
pub fn encode_token(token: &[u8]) -> Result<EncodedToken, AuthError> {
    let mut buffer = [0u8; ENCODE_BUFFER_LEN];
    let limit = ENCODE_BUFFER_LEN - 1;

    let written = BASE64
        .encode_slice(token, &mut buffer[..limit])
        .map_err(|_| {
            let required = encoded_len(token.len(), true).unwrap_or(usize::MAX);
            warn!(
                "refusing to encode {} byte token: needs {} bytes, buffer holds {}",
                token.len(),
                required,
                limit
            );
            AuthError::EncodingOverflow {
                written: required,
                capacity: ENCODE_BUFFER_LEN,
            }
        })?;

    if written >= ENCODE_BUFFER_LEN {
        return Err(AuthError::EncodingOverflow {
            written,
            capacity: ENCODE_BUFFER_LEN,
        });
    }

    // The base64 alphabet is ASCII, so every byte maps to one char.
    let text = buffer[..written].iter().map(|&b| char::from(b)).collect();
    Ok(EncodedToken(text))
}

/// Decodes a peer token. Malformed or oversized input is a negotiation
/// failure, never truncated.
pub fn decode_token(token: &EncodedToken) -> Result<Zeroizing<Vec<u8>>, AuthError> {
    let mut buffer = Zeroizing::new([0u8; DECODE_BUFFER_LEN]);
    let scratch: &mut [u8] = &mut *buffer;

    let written = BASE64
        .decode_slice(token.as_str().as_bytes(), scratch)
        .map_err(|err| match err {
            DecodeSliceError::OutputSliceTooSmall => AuthError::negotiation(
                Operation::Decode,
                ResultCode::BUFOVER,
                format!("decoded token exceeds {} bytes", DECODE_BUFFER_LEN),
            ),
            DecodeSliceError::DecodeError(err) => AuthError::negotiation(
                Operation::Decode,
                ResultCode::BADPROT,
                format!("malformed base64 token: {}", err),
            ),
        })?;

    Ok(Zeroizing::new(scratch[..written].to_vec()))
}
