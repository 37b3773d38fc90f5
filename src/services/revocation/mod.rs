pub mod cache_store;
pub mod store;

pub use cache_store::CacheRevocationStore;
pub use store::{RevocationError, RevocationStore};
