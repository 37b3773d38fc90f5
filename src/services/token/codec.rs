use serde_json::{Map, Value};

/// Errors reported by a token codec.
///
/// `Invalid` is about the presented credential (signature, structure,
/// algorithm). Everything else is a codec fault and must not be blamed on
/// the client.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("{0}")]
    Invalid(String),

    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("codec unavailable: {0}")]
    Unavailable(String),
}

/// Decodes and verifies signed tokens.
///
/// `decode` returns the full claim set. Expiry is not judged here; the
/// caller checks `exp` after the revocation lookup.
pub trait TokenCodec: Send + Sync {
    fn decode(&self, token: &str) -> Result<Map<String, Value>, CodecError>;
}
