/*
 * Responsibility
 * - Load Config -> build dependencies (codec, revocation store, gate, issuer) -> assemble Router
 * - Apply middleware (token gate on /api/v1, HTTP layers on everything)
 * - Start with axum::serve()
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::middleware::{self, auth::TokenGate, http::HttpLimits};
use crate::services::{
    cache::MemoryCache,
    revocation::{CacheRevocationStore, RevocationStore},
    token::{TokenIssuer, build_jwt_codec},
};
use crate::{api, state::AppState};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,token_gate=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Always surface panics via tracing so they don't get lost
        tracing::error!(?info, "panic");

        // Development: crash the whole process so it gets noticed immediately.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting token gate in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Build process-level services and inject them into the shared state.
pub async fn build_state(config: &Config) -> Result<AppState> {
    let codec = Arc::new(build_jwt_codec(config).context("failed to build JWT codec")?);

    let revocations: Arc<dyn RevocationStore> = match &config.redis_url {
        Some(url) => Arc::new(
            CacheRevocationStore::connect(url, config.revocation_key_prefix.clone())
                .await
                .context("failed to connect revocation store")?,
        ),
        None => {
            tracing::warn!("REDIS_URL not set; revoked tokens are kept in process memory");
            Arc::new(CacheRevocationStore::new(
                Arc::new(MemoryCache::new()),
                config.revocation_key_prefix.clone(),
            ))
        }
    };

    let gate = TokenGate::new(revocations)
        .with_codec(codec.clone())
        .with_excluded_routes(config.excluded_routes.clone())
        .with_leeway(config.access_token_leeway_seconds);

    let issuer = match (config.token_issue_enabled, codec.can_sign()) {
        (true, true) => {
            tracing::warn!("token issuance endpoint enabled; anyone reaching it can mint tokens");
            Some(Arc::new(TokenIssuer::new(
                codec,
                config.access_token_ttl_seconds,
            )))
        }
        (true, false) => {
            anyhow::bail!("TOKEN_ISSUE_ENABLED is set but no signing key is configured")
        }
        (false, _) => None,
    };

    tracing::info!(
        excluded_routes = config.excluded_routes.len(),
        issuance = issuer.is_some(),
        "token gate ready"
    );

    Ok(AppState::new(Arc::new(gate), issuer))
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let v1 = api::v1::routes(state.issuer.is_some());
    let v1 = middleware::auth::access::apply(v1, state.clone());

    let router = Router::new().nest("/api/v1", v1).with_state(state);

    middleware::http::apply(router, HttpLimits::from_config(config))
}
