pub const GSSAPI_MECHANISM: &str = "GSSAPI";
pub const DEFAULT_SERVICE_NAME: &str = "mongodb";

/// Largest raw token accepted or produced in a single round.
pub const MAX_TOKEN_BYTES: usize = 4096;

/// Encode scratch space: the base64 form of the largest token plus one byte
/// reserved for a terminator.
pub const ENCODE_BUFFER_LEN: usize = MAX_TOKEN_BYTES.div_ceil(3) * 4 + 1;
pub const DECODE_BUFFER_LEN: usize = MAX_TOKEN_BYTES;
