//! Bearer-token gate for axum services: JWT verification, revocation
//! (blacklist) and expiry checks, with route exclusions.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
