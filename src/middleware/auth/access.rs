//! Bearer token check for `/api/v1/*` -> `AuthenticatedIdentity` in request extensions.
//!
//! The checks themselves live in `TokenGate`; this module only wires it into axum.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::state::AppState;

/// Put the token gate in front of every route of `router`.
///
/// Example:
/// ```ignore
/// let v1 = api::v1::routes(&config);
/// let v1 = middleware::auth::access::apply(v1, state.clone());
/// app = app.nest("/api/v1", v1);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 from_fn cannot take a State extractor, so pass the state explicitly
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    state.gate.handle(req, |req| next.run(req)).await
}
