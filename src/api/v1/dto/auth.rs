/*
 * Responsibility
 * - request/response DTOs for the auth endpoints
 * - validate() for shape checks before reaching the issuer
 */
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Subject id as sent by clients: `"42"` or `42`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SubjectId {
    Text(String),
    Number(i64),
}

impl SubjectId {
    pub fn to_claim(&self) -> String {
        match self {
            Self::Text(s) => s.trim().to_string(),
            Self::Number(n) => n.to_string(),
        }
    }
}

/// Request body for `POST /auth/token`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRequest {
    pub sub: SubjectId,
    pub email: Option<String>,
    /// Extra claims copied into the token (reserved names are ignored).
    #[serde(default)]
    pub claims: Map<String, Value>,
}

impl TokenRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.sub.to_claim().is_empty() {
            return Err("sub is required");
        }
        if let Some(email) = &self.email
            && (email.len() > 254 || !email.contains('@'))
        {
            return Err("email is invalid");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always "Bearer"
    pub token_type: String,
    /// Seconds until expiry.
    pub expires_in: u64,
    /// Expiry as unix seconds.
    pub expires_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(v: Value) -> TokenRequest {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn numeric_and_text_subjects() {
        assert_eq!(parse(json!({"sub": 42})).sub.to_claim(), "42");
        assert_eq!(parse(json!({"sub": " u-1 "})).sub.to_claim(), "u-1");
    }

    #[test]
    fn validation() {
        assert!(parse(json!({"sub": "u", "email": "a@b.com"})).validate().is_ok());
        assert_eq!(
            parse(json!({"sub": "  "})).validate(),
            Err("sub is required")
        );
        assert_eq!(
            parse(json!({"sub": "u", "email": "nope"})).validate(),
            Err("email is invalid")
        );
    }
}
