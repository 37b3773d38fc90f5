/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - Hand the identity attached by the token gate to handlers
 * - axum-specific code lives in core, the contract type in types
 *
 * Public API:
 * - AuthenticatedIdentity
 * - AuthIdentity
 */

mod core;
mod types;

pub use self::core::AuthIdentity;
pub use types::AuthenticatedIdentity;
