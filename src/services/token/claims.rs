use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ClaimsError {
    #[error("missing '{0}' claim")]
    Missing(&'static str),
    #[error("invalid '{0}' claim")]
    Invalid(&'static str),
}

/// Typed view over a verified token payload.
///
/// - `sub` may be a string or an integer in the payload; it is normalized to a string.
/// - `payload` keeps the full claim set (including the claims lifted out here).
#[derive(Debug, Clone, PartialEq)]
pub struct TokenClaims {
    pub sub: String,
    pub email: Option<String>,
    pub exp: i64,
    pub iat: Option<i64>,
    pub jti: Option<String>,
    pub payload: Map<String, Value>,
}

impl TokenClaims {
    pub fn from_payload(payload: Map<String, Value>) -> Result<Self, ClaimsError> {
        let sub = match payload.get("sub") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
            Some(Value::Number(n)) if n.is_i64() || n.is_u64() => n.to_string(),
            Some(Value::Null) | None => return Err(ClaimsError::Missing("sub")),
            Some(_) => return Err(ClaimsError::Invalid("sub")),
        };

        let exp = match payload.get("exp") {
            Some(v) => timestamp(v).ok_or(ClaimsError::Invalid("exp"))?,
            None => return Err(ClaimsError::Missing("exp")),
        };

        let iat = match payload.get("iat") {
            Some(Value::Null) | None => None,
            Some(v) => Some(timestamp(v).ok_or(ClaimsError::Invalid("iat"))?),
        };

        let email = optional_string(&payload, "email")?;
        let jti = optional_string(&payload, "jti")?.filter(|s| !s.trim().is_empty());

        Ok(Self {
            sub,
            email,
            exp,
            iat,
            jti,
            payload,
        })
    }

    /// Whether the token is past its expiry at `now`, allowing `leeway` seconds.
    pub fn is_expired_at(&self, now: i64, leeway: u64) -> bool {
        let leeway = i64::try_from(leeway).unwrap_or(i64::MAX);
        self.exp.saturating_add(leeway) < now
    }

    /// Seconds left until expiry (0 once expired).
    pub fn remaining_seconds(&self, now: i64) -> u64 {
        u64::try_from(self.exp.saturating_sub(now)).unwrap_or(0)
    }
}

/// Identifier used for revocation: `jti` when present, otherwise the
/// SHA-256 of the raw token (hex).
pub fn token_id(claims: &TokenClaims, raw_token: &str) -> String {
    match &claims.jti {
        Some(jti) => jti.clone(),
        None => hex::encode(Sha256::digest(raw_token.as_bytes())),
    }
}

// NumericDate: integer seconds; fractional values are truncated.
fn timestamp(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        _ => None,
    }
}

fn optional_string(
    payload: &Map<String, Value>,
    name: &'static str,
) -> Result<Option<String>, ClaimsError> {
    match payload.get(name) {
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(ClaimsError::Invalid(name)),
    }
}
