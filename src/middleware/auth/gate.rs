//! Token gate: bearer credential check in front of request handlers.
//!
//! For every request that no exclusion rule covers:
//! - read `Authorization: Bearer <token>`
//! - verify the token with the configured codec
//! - look the token id up in the revocation store
//! - check `exp` against the current time
//! - attach `AuthenticatedIdentity` to request extensions and forward
//!
//! Any failure short-circuits with a JSON rejection; the continuation is not called.
//!
//! Exclusion rules and codec live in one immutable snapshot that mutators
//! replace atomically, so in-flight requests keep the view they started with.

use std::{future::Future, sync::Arc};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::OriginalUri,
    http::{HeaderMap, Method, Request, header},
    response::{IntoResponse, Response},
};
use tracing::{debug, error, warn};

use crate::api::v1::extractors::AuthenticatedIdentity;
use crate::middleware::auth::exclusion::{ExclusionRule, find_match};
use crate::middleware::auth::rejection::GateError;
use crate::services::revocation::RevocationStore;
use crate::services::token::{CodecError, TokenClaims, TokenCodec, token_id};

/// Configuration view shared by all requests.
#[derive(Clone)]
pub struct GateSnapshot {
    pub codec: Option<Arc<dyn TokenCodec>>,
    pub rules: Arc<[ExclusionRule]>,
}

pub struct TokenGate {
    snapshot: ArcSwap<GateSnapshot>,
    revocations: Arc<dyn RevocationStore>,
    leeway_seconds: u64,
}

impl std::fmt::Debug for TokenGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot.load();
        f.debug_struct("TokenGate")
            .field("has_codec", &snapshot.codec.is_some())
            .field("excluded_routes", &snapshot.rules.len())
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

impl TokenGate {
    /// Gate with no codec and no exclusions; every request is refused until
    /// a codec is installed.
    pub fn new(revocations: Arc<dyn RevocationStore>) -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(GateSnapshot {
                codec: None,
                rules: Arc::from(Vec::new()),
            }),
            revocations,
            leeway_seconds: 0,
        }
    }

    pub fn with_codec(self, codec: Arc<dyn TokenCodec>) -> Self {
        self.set_codec(codec);
        self
    }

    pub fn with_excluded_routes(self, rules: Vec<ExclusionRule>) -> Self {
        self.set_excluded_routes(rules);
        self
    }

    /// Seconds a token is still accepted past its `exp`.
    pub fn with_leeway(mut self, leeway_seconds: u64) -> Self {
        self.leeway_seconds = leeway_seconds;
        self
    }

    pub fn set_codec(&self, codec: Arc<dyn TokenCodec>) {
        self.snapshot.rcu(|current| GateSnapshot {
            codec: Some(codec.clone()),
            rules: current.rules.clone(),
        });
    }

    /// Replace the whole rule set.
    pub fn set_excluded_routes(&self, rules: Vec<ExclusionRule>) {
        let rules: Arc<[ExclusionRule]> = Arc::from(rules);
        self.snapshot.rcu(|current| GateSnapshot {
            codec: current.codec.clone(),
            rules: rules.clone(),
        });
    }

    /// Append one rule.
    pub fn add_excluded_route(&self, rule: ExclusionRule) {
        self.snapshot.rcu(|current| {
            let mut rules = current.rules.to_vec();
            rules.push(rule.clone());
            GateSnapshot {
                codec: current.codec.clone(),
                rules: Arc::from(rules),
            }
        });
    }

    pub fn excluded_routes(&self) -> Arc<[ExclusionRule]> {
        self.snapshot.load().rules.clone()
    }

    pub fn revocations(&self) -> &Arc<dyn RevocationStore> {
        &self.revocations
    }

    /// Run `req` through the gate, calling `next` only when it is excluded
    /// or carries a valid credential.
    pub async fn handle<F, Fut>(&self, mut req: Request<Body>, next: F) -> Response
    where
        F: FnOnce(Request<Body>) -> Fut,
        Fut: Future<Output = Response>,
    {
        // Nested routers strip their prefix from `uri()`; rules are written
        // against the full path.
        let path = req
            .extensions()
            .get::<OriginalUri>()
            .map(|uri| uri.0.path().to_owned())
            .unwrap_or_else(|| req.uri().path().to_owned());

        match self.authenticate(req.method(), &path, req.headers()).await {
            Ok(None) => next(req).await,
            Ok(Some(identity)) => {
                debug!(sub = %identity.id, path = %path, "request authenticated");
                req.extensions_mut().insert(identity);
                next(req).await
            }
            Err(err) => {
                warn!(
                    kind = err.kind(),
                    method = %req.method(),
                    path = %path,
                    "request rejected: {err}"
                );
                err.into_response()
            }
        }
    }

    /// The checks behind `handle`, without forwarding.
    ///
    /// - `Ok(None)`: route excluded, no identity
    /// - `Ok(Some(_))`: credential accepted
    /// - `Err(_)`: rejection
    pub async fn authenticate(
        &self,
        method: &Method,
        path: &str,
        headers: &HeaderMap,
    ) -> Result<Option<AuthenticatedIdentity>, GateError> {
        let snapshot = self.snapshot.load_full();

        if let Some(rule) = find_match(&snapshot.rules, method, path) {
            debug!(
                method = %method,
                path = %path,
                rule = rule.pattern().as_str(),
                "route excluded from authentication"
            );
            return Ok(None);
        }

        let token = bearer_token(headers)?;

        let codec = snapshot.codec.as_ref().ok_or_else(|| {
            error!("token gate has no codec configured");
            GateError::AuthenticationFailed
        })?;

        let payload = codec.decode(token).map_err(|err| match err {
            CodecError::Invalid(message) => GateError::InvalidCredential(message),
            other => {
                error!(error = %other, "token codec failure");
                GateError::AuthenticationFailed
            }
        })?;

        let claims = TokenClaims::from_payload(payload)
            .map_err(|err| GateError::InvalidCredential(err.to_string()))?;

        let token_id = token_id(&claims, token);

        let revoked = self.revocations.is_revoked(&token_id).await.map_err(|err| {
            error!(error = %err, "revocation lookup failed");
            GateError::AuthenticationFailed
        })?;
        if revoked {
            return Err(GateError::RevokedCredential);
        }

        let now = chrono::Utc::now().timestamp();
        if claims.is_expired_at(now, self.leeway_seconds) {
            return Err(GateError::ExpiredCredential);
        }

        Ok(Some(AuthenticatedIdentity::from_claims(
            claims, token, token_id,
        )))
    }
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// The scheme is case-insensitive; the token must be one non-empty word.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, GateError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(GateError::MissingCredential)?
        .to_str()
        .map_err(|_| GateError::MalformedCredential)?
        .trim();

    if value.is_empty() {
        return Err(GateError::MissingCredential);
    }

    let (scheme, rest) = value
        .split_once(char::is_whitespace)
        .ok_or(GateError::MalformedCredential)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(GateError::MalformedCredential);
    }

    let token = rest.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(GateError::MalformedCredential);
    }

    Ok(token)
}
