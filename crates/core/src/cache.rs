//! Cache key construction and the shared cache backend trait.
//!
//! Keys are derived from normalized query text so that hit rate is
//! insensitive to casing and whitespace. The normalized text is folded
//! through SHA-256 and truncated, keeping keys fixed-length and glob-safe
//! for pattern deletion (`resp:{tenant}:*`).

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::time::Duration;

use crate::classify::QueryCategory;
use crate::error::CacheError;

/// Key prefix shared by both cache tiers.
const KEY_PREFIX: &str = "resp";

/// Hex characters of the query digest kept in the key.
const DIGEST_LEN: usize = 16;

/// Normalize raw query text for key construction: lowercase, trim, collapse
/// internal whitespace runs to single spaces.
///
/// Idempotent: `normalize_query(normalize_query(s)) == normalize_query(s)`.
pub fn normalize_query(raw: &str) -> String {
    raw.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// A composite cache key: tenant, category, and normalized query text.
///
/// Two raw queries that normalize identically always produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    tenant_id: String,
    category: QueryCategory,
    digest: String,
}

impl CacheKey {
    pub fn new(tenant_id: impl Into<String>, category: QueryCategory, raw_text: &str) -> Self {
        let normalized = normalize_query(raw_text);
        let mut hasher = Sha256::new();
        hasher.update(normalized.as_bytes());
        let digest = format!("{:x}", hasher.finalize());

        Self {
            tenant_id: tenant_id.into(),
            category,
            digest: digest[..DIGEST_LEN].to_string(),
        }
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn category(&self) -> QueryCategory {
        self.category
    }

    /// Glob pattern matching every key of one tenant, for bulk invalidation
    /// after a catalog change.
    pub fn tenant_pattern(tenant_id: &str) -> String {
        format!("{KEY_PREFIX}:{tenant_id}:*")
    }

    /// Glob pattern matching every key of every tenant.
    pub fn all_pattern() -> String {
        format!("{KEY_PREFIX}:*")
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{KEY_PREFIX}:{}:{}:{}",
            self.tenant_id, self.category, self.digest
        )
    }
}

/// Point-in-time cache health, exposed for diagnostics endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Whether the most recent shared-tier operation succeeded
    pub shared_available: bool,

    /// Entries currently held by the in-process fallback tier
    pub fallback_entries: usize,
}

/// The network key-value store behind the shared cache tier.
///
/// Implementations: Redis. Any operation may fail with
/// `CacheError::Unavailable` when the connection is down; the two-tier
/// cache absorbs those failures and callers above it never see them.
#[async_trait]
pub trait SharedCacheBackend: Send + Sync {
    /// A human-readable name for this backend ("redis").
    fn name(&self) -> &str;

    /// Look up a key. `Ok(None)` is a logical miss, not a failure.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a value with a TTL.
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration)
    -> Result<(), CacheError>;

    /// Delete all keys matching a glob pattern; returns how many went away.
    async fn delete_matching(&self, pattern: &str) -> Result<u64, CacheError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases_trims_and_collapses() {
        assert_eq!(
            normalize_query("  Do you   have CARBONARA?\t"),
            "do you have carbonara?"
        );
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize_query("  MiXeD   Case  ");
        assert_eq!(normalize_query(&once), once);
    }

    #[test]
    fn case_and_whitespace_variants_share_a_key() {
        let a = CacheKey::new("t1", QueryCategory::SpecificItem, "Do you have Carbonara");
        let b = CacheKey::new("t1", QueryCategory::SpecificItem, "  do  you have carbonara ");
        assert_eq!(a, b);
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn distinct_tenants_and_categories_get_distinct_keys() {
        let a = CacheKey::new("t1", QueryCategory::SpecificItem, "carbonara");
        let b = CacheKey::new("t2", QueryCategory::SpecificItem, "carbonara");
        let c = CacheKey::new("t1", QueryCategory::Recommendation, "carbonara");
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn rendered_key_matches_tenant_pattern() {
        let key = CacheKey::new("trattoria-1", QueryCategory::Hours, "when do you open");
        let rendered = key.to_string();
        assert!(rendered.starts_with("resp:trattoria-1:hours:"));

        let pattern = CacheKey::tenant_pattern("trattoria-1");
        assert!(rendered.starts_with(pattern.trim_end_matches('*')));
    }
}
