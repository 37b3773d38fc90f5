/*
 * Responsibility
 * - Public interface of the middleware layer
 * - auth: token gate (bearer check, revocation, expiry, exclusions)
 * - http: cross-cutting transport concerns (request id, tracing, limits)
 */
pub mod auth;
pub mod http;
