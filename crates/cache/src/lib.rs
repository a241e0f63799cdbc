//! Caches in front of the semantic index and rename validation.
//!
//! Both caches share [`CachePolicy`]: a capacity bound with oldest-insertion
//! eviction and a TTL checked lazily on read.

mod query;
mod store;
mod validation;

pub use query::QueryCache;
pub use store::{CachePolicy, CacheStats, TtlStore};
pub use validation::{ComputeAborted, ValidationCache, ValidationKey};
