use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::services::token::{codec::CodecError, jwt::JwtCodec};

// Claims owned by the issuer; caller-supplied extras never override them.
const RESERVED: [&str; 7] = ["sub", "email", "iat", "exp", "jti", "iss", "aud"];

/// Result of issuing an access token.
#[derive(Clone, Debug, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
    pub expires_at: i64,
    pub jti: String,
}

#[derive(Debug, thiserror::Error)]
pub enum IssueError {
    #[error("subject must not be empty")]
    EmptySubject,
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Mints signed access tokens.
#[derive(Clone, Debug)]
pub struct TokenIssuer {
    codec: Arc<JwtCodec>,
    ttl_seconds: u64,
}

impl TokenIssuer {
    pub fn new(codec: Arc<JwtCodec>, ttl_seconds: u64) -> Self {
        Self { codec, ttl_seconds }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Issue a token for `sub` valid for the configured TTL.
    pub fn issue(
        &self,
        sub: &str,
        email: Option<&str>,
        extra: Map<String, Value>,
    ) -> Result<IssuedToken, IssueError> {
        self.issue_at(sub, email, extra, chrono::Utc::now().timestamp())
    }

    /// Same as `issue`, with an explicit issuance time (unix seconds).
    pub fn issue_at(
        &self,
        sub: &str,
        email: Option<&str>,
        extra: Map<String, Value>,
        now: i64,
    ) -> Result<IssuedToken, IssueError> {
        let sub = sub.trim();
        if sub.is_empty() {
            return Err(IssueError::EmptySubject);
        }

        let ttl = i64::try_from(self.ttl_seconds).unwrap_or(i64::MAX);
        let exp = now.saturating_add(ttl);
        let jti = Uuid::new_v4().to_string();

        let mut claims: Map<String, Value> = extra
            .into_iter()
            .filter(|(k, _)| !RESERVED.contains(&k.as_str()))
            .collect();
        claims.insert("sub".into(), Value::from(sub));
        if let Some(email) = email {
            claims.insert("email".into(), Value::from(email));
        }
        claims.insert("iat".into(), Value::from(now));
        claims.insert("exp".into(), Value::from(exp));
        claims.insert("jti".into(), Value::from(jti.as_str()));
        if let Some(iss) = self.codec.issuer() {
            claims.insert("iss".into(), Value::from(iss));
        }
        if let Some(aud) = self.codec.audience() {
            claims.insert("aud".into(), Value::from(aud));
        }

        let token = self.codec.sign(&claims)?;

        tracing::debug!(sub = %sub, jti = %jti, exp, "access token issued");

        Ok(IssuedToken {
            token,
            token_type: "Bearer",
            expires_in: self.ttl_seconds,
            expires_at: exp,
            jti,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::token::{TokenClaims, TokenCodec};
    use jsonwebtoken::Algorithm;
    use serde_json::json;

    fn issuer() -> TokenIssuer {
        let codec = JwtCodec::hmac(Algorithm::HS256, b"issuer-test-secret")
            .unwrap()
            .with_issuer("token-gate");
        TokenIssuer::new(Arc::new(codec), 600)
    }

    #[test]
    fn issued_tokens_carry_lifecycle_claims() {
        let issuer = issuer();
        let mut extra = Map::new();
        extra.insert("role".into(), json!("admin"));

        let issued = issuer
            .issue_at("42", Some("a@b.com"), extra, 1_000)
            .unwrap();
        assert_eq!(issued.token_type, "Bearer");
        assert_eq!(issued.expires_in, 600);
        assert_eq!(issued.expires_at, 1_600);

        let payload = issuer.codec.decode(&issued.token).unwrap();
        let claims = TokenClaims::from_payload(payload).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.email.as_deref(), Some("a@b.com"));
        assert_eq!(claims.iat, Some(1_000));
        assert_eq!(claims.exp, 1_600);
        assert_eq!(claims.jti.as_deref(), Some(issued.jti.as_str()));
        assert_eq!(claims.payload["iss"], "token-gate");
        assert_eq!(claims.payload["role"], "admin");
    }

    #[test]
    fn extras_cannot_override_reserved_claims() {
        let issuer = issuer();
        let mut extra = Map::new();
        extra.insert("sub".into(), json!("someone-else"));
        extra.insert("exp".into(), json!(9_999_999_999i64));

        let issued = issuer.issue_at("42", None, extra, 1_000).unwrap();
        let payload = issuer.codec.decode(&issued.token).unwrap();
        assert_eq!(payload["sub"], "42");
        assert_eq!(payload["exp"], 1_600);
    }

    #[test]
    fn jti_is_unique_per_token() {
        let issuer = issuer();
        let a = issuer.issue("42", None, Map::new()).unwrap();
        let b = issuer.issue("42", None, Map::new()).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn empty_subject_is_refused() {
        assert!(matches!(
            issuer().issue(" ", None, Map::new()),
            Err(IssueError::EmptySubject)
        ));
    }
}
