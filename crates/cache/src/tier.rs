//! The two-tier cache facade.
//!
//! `get` and `set` try the shared tier first under a short per-operation
//! timeout, then transparently retry against the in-process fallback on a
//! connection failure. A logical miss in the shared tier is a miss — only
//! failures fall through. Successful shared writes are mirrored into the
//! fallback so its contents stay warm while the shared tier is healthy.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use tokio::time::timeout;
use tracing::{debug, warn};

use maitre_core::cache::{CacheKey, CacheStats, SharedCacheBackend};
use maitre_core::event::{DomainEvent, EventBus};

use crate::fallback::FallbackCache;

/// What to invalidate.
#[derive(Debug, Clone)]
pub enum ClearScope {
    /// Every cached response for one tenant
    Tenant(String),
    /// Everything
    All,
}

/// The two-tier response cache.
///
/// Construct with [`CacheTier::new`] for a fallback-only cache (tests,
/// cache-less deployments) and attach the shared tier with
/// [`CacheTier::with_shared`].
pub struct CacheTier {
    shared: Option<Arc<dyn SharedCacheBackend>>,
    fallback: FallbackCache,
    shared_ttl: Duration,
    op_timeout: Duration,
    shared_available: AtomicBool,
    events: Option<Arc<EventBus>>,
}

impl CacheTier {
    pub fn new(fallback_capacity: usize, fallback_ttl: Duration) -> Self {
        Self {
            shared: None,
            fallback: FallbackCache::new(fallback_capacity, fallback_ttl),
            shared_ttl: Duration::from_secs(3600),
            op_timeout: Duration::from_millis(1500),
            shared_available: AtomicBool::new(false),
            events: None,
        }
    }

    /// Attach the shared backend with its TTL and per-operation timeout.
    pub fn with_shared(
        mut self,
        backend: Arc<dyn SharedCacheBackend>,
        shared_ttl: Duration,
        op_timeout: Duration,
    ) -> Self {
        self.shared = Some(backend);
        self.shared_ttl = shared_ttl;
        self.op_timeout = op_timeout;
        self.shared_available = AtomicBool::new(true);
        self
    }

    /// Attach an event bus for degradation events.
    pub fn with_events(mut self, events: Arc<EventBus>) -> Self {
        self.events = Some(events);
        self
    }

    fn note_degraded(&self, operation: &str, reason: String) {
        self.shared_available.store(false, Ordering::Relaxed);
        warn!(operation, %reason, "shared cache degraded, using fallback tier");
        if let Some(events) = &self.events {
            events.publish(DomainEvent::CacheDegraded {
                operation: operation.into(),
                reason,
                timestamp: Utc::now(),
            });
        }
    }

    /// Look up a cached response. Never fails; a shared-tier outage reads
    /// from the fallback tier instead.
    pub async fn get(&self, key: &CacheKey) -> Option<String> {
        let key_str = key.to_string();

        if let Some(shared) = &self.shared {
            match timeout(self.op_timeout, shared.get(&key_str)).await {
                Ok(Ok(hit)) => {
                    self.shared_available.store(true, Ordering::Relaxed);
                    if hit.is_some() {
                        debug!(key = %key_str, "shared cache hit");
                    }
                    // A logical miss in the healthy shared tier is a miss.
                    return hit;
                }
                Ok(Err(e)) => self.note_degraded("get", e.to_string()),
                Err(_) => self.note_degraded(
                    "get",
                    format!("timed out after {}ms", self.op_timeout.as_millis()),
                ),
            }
        }

        let hit = self.fallback.get(&key_str);
        if hit.is_some() {
            debug!(key = %key_str, "fallback cache hit");
        }
        hit
    }

    /// Store a response. Never fails; a shared-tier outage writes only the
    /// fallback tier.
    pub async fn set(&self, key: &CacheKey, value: &str) {
        let key_str = key.to_string();

        if let Some(shared) = &self.shared {
            match timeout(
                self.op_timeout,
                shared.set_with_ttl(&key_str, value, self.shared_ttl),
            )
            .await
            {
                Ok(Ok(())) => {
                    self.shared_available.store(true, Ordering::Relaxed);
                    // Mirror so fallback reads stay warm through an outage.
                    self.fallback.set(&key_str, value);
                    return;
                }
                Ok(Err(e)) => self.note_degraded("set", e.to_string()),
                Err(_) => self.note_degraded(
                    "set",
                    format!("timed out after {}ms", self.op_timeout.as_millis()),
                ),
            }
        }

        self.fallback.set(&key_str, value);
    }

    /// Invalidate cached responses in both tiers.
    pub async fn clear(&self, scope: ClearScope) {
        let (pattern, prefix) = match &scope {
            ClearScope::Tenant(tenant_id) => {
                let pattern = CacheKey::tenant_pattern(tenant_id);
                let prefix = pattern.trim_end_matches('*').to_string();
                (pattern, prefix)
            }
            ClearScope::All => (CacheKey::all_pattern(), String::new()),
        };

        if let Some(shared) = &self.shared {
            match timeout(self.op_timeout, shared.delete_matching(&pattern)).await {
                Ok(Ok(removed)) => {
                    self.shared_available.store(true, Ordering::Relaxed);
                    debug!(%pattern, removed, "cleared shared cache entries");
                }
                Ok(Err(e)) => self.note_degraded("clear", e.to_string()),
                Err(_) => self.note_degraded(
                    "clear",
                    format!("timed out after {}ms", self.op_timeout.as_millis()),
                ),
            }
        }

        match scope {
            ClearScope::Tenant(_) => self.fallback.clear_prefix(&prefix),
            ClearScope::All => self.fallback.clear(),
        }
    }

    /// Current cache health for diagnostics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            shared_available: self.shared.is_some()
                && self.shared_available.load(Ordering::Relaxed),
            fallback_entries: self.fallback.len(),
        }
    }
}
