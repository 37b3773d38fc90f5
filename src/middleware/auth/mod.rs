pub mod access;
pub mod exclusion;
pub mod gate;
pub mod rejection;

pub use exclusion::{ExclusionRule, PathPattern, RuleError};
pub use gate::TokenGate;
pub use rejection::GateError;
