//! Two-tier response cache for Maitre.
//!
//! The shared tier is a network key-value store (Redis) that all instances
//! see; the fallback tier is a bounded in-process LRU that keeps serving
//! hits while the shared tier is unreachable. Callers interact only with
//! [`CacheTier`], which absorbs every shared-tier failure — a cache outage
//! is a degradation, never a request failure.

pub mod fallback;
pub mod redis_backend;
pub mod tier;

pub use fallback::FallbackCache;
pub use redis_backend::RedisCacheBackend;
pub use tier::{CacheTier, ClearScope};
