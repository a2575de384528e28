//! The request-level orchestrator.
//!
//! `respond()` owns the control flow and the failure policy: classify,
//! consult the cache, assemble context on a miss, generate, store. It never
//! returns an error — any internal failure degrades to a fixed apologetic
//! message, and every degradation is published on the event bus.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use maitre_cache::CacheTier;
use maitre_config::{DecodingConfig, ResponderConfig};
use maitre_core::cache::CacheKey;
use maitre_core::catalog::CatalogProvider;
use maitre_core::classify::{ClassificationResult, QueryCategory};
use maitre_core::conversation::{ConversationStore, SenderRole, Turn};
use maitre_core::event::{DomainEvent, EventBus};
use maitre_core::generate::{GenerationRequest, Generator};

use crate::classifier::QueryClassifier;
use crate::context::{ContextAssembler, NO_CATALOG_DATA};

/// Reply phrasings that must not be cached: a negative answer for a query
/// that may later have a real catalog match would poison the cache.
const NON_CACHEABLE_PATTERNS: &[&str] = &[
    "not available",
    "not on the menu",
    "i'm sorry",
    "i am sorry",
    "unfortunately",
    "don't have",
    "do not have",
    "unable to",
    "no catalog data",
];

/// The response orchestrator exposed to the web layer.
pub struct Responder {
    classifier: QueryClassifier,
    assembler: ContextAssembler,
    cache: Arc<CacheTier>,
    generator: Arc<dyn Generator>,
    catalog: Arc<dyn CatalogProvider>,
    store: Arc<dyn ConversationStore>,
    events: Arc<EventBus>,
    preamble: String,
    fallback_message: String,
}

impl Responder {
    pub fn new(
        cache: Arc<CacheTier>,
        generator: Arc<dyn Generator>,
        catalog: Arc<dyn CatalogProvider>,
        store: Arc<dyn ConversationStore>,
        events: Arc<EventBus>,
    ) -> Self {
        let responder_config = ResponderConfig::default();
        Self {
            classifier: QueryClassifier::default(),
            assembler: ContextAssembler::new(),
            cache,
            generator,
            catalog,
            store,
            events,
            preamble: responder_config.preamble,
            fallback_message: responder_config.fallback_message,
        }
    }

    /// Use configured decoding profiles instead of the defaults.
    pub fn with_decoding(mut self, decoding: DecodingConfig) -> Self {
        self.classifier = QueryClassifier::new(decoding);
        self
    }

    /// Override the persona preamble.
    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = preamble.into();
        self
    }

    /// Override the user-facing failure message.
    pub fn with_fallback_message(mut self, message: impl Into<String>) -> Self {
        self.fallback_message = message.into();
        self
    }

    /// Answer one guest message. Always returns a string: the reply, the
    /// apologetic fallback, or `""` for non-guest senders.
    pub async fn respond(
        &self,
        tenant_id: &str,
        client_id: &str,
        raw_text: &str,
        sender_role: SenderRole,
    ) -> String {
        // A message from staff is never auto-answered.
        if !sender_role.is_guest() {
            debug!(tenant_id, "ignoring non-guest message");
            return String::new();
        }

        let started = tokio::time::Instant::now();
        let classification = self.classifier.classify(raw_text);
        debug!(
            tenant_id,
            category = %classification.category,
            language = %classification.language,
            "classified guest query"
        );
        self.events.publish(DomainEvent::QueryClassified {
            tenant_id: tenant_id.into(),
            category: classification.category.to_string(),
            language: classification.language.to_string(),
            timestamp: Utc::now(),
        });

        self.record(Turn::guest(tenant_id, client_id, raw_text)).await;

        // Greetings are contextless and cheap to regenerate: no cache, no
        // catalog fetch.
        if classification.category == QueryCategory::Greeting {
            let reply = self
                .generate(tenant_id, String::new(), raw_text, &classification)
                .await;
            return self
                .finish(tenant_id, client_id, &classification, reply, false, started)
                .await;
        }

        let key = CacheKey::new(tenant_id, classification.category, raw_text);
        if let Some(hit) = self.cache.get(&key).await {
            debug!(tenant_id, key = %key, "serving cached reply");
            return self
                .finish(tenant_id, client_id, &classification, hit, true, started)
                .await;
        }

        let context = match self.catalog.snapshot(tenant_id).await {
            Ok(snapshot) => self.assembler.assemble(&snapshot, &classification, raw_text),
            Err(e) => {
                warn!(tenant_id, error = %e, "catalog snapshot unavailable");
                NO_CATALOG_DATA.to_string()
            }
        };

        let reply = self.generate(tenant_id, context, raw_text, &classification).await;

        if reply != self.fallback_message && Self::is_cacheable(&reply) {
            self.cache.set(&key, &reply).await;
        }

        self.finish(tenant_id, client_id, &classification, reply, false, started)
            .await
    }

    /// Build the prompt and call the generation backend, degrading to the
    /// fallback message on any typed failure.
    async fn generate(
        &self,
        tenant_id: &str,
        context: String,
        raw_text: &str,
        classification: &ClassificationResult,
    ) -> String {
        let prompt = if context.is_empty() {
            format!("{}\n\nGuest: {raw_text}", self.preamble)
        } else {
            format!("{}\n\n{context}\n\nGuest: {raw_text}", self.preamble)
        };

        let request = GenerationRequest::new(prompt, classification.profile);
        match self.generator.generate(request).await {
            Ok(text) => text,
            Err(e) => {
                warn!(tenant_id, error = %e, "generation failed, returning fallback");
                self.events.publish(DomainEvent::InferenceFailed {
                    tenant_id: tenant_id.into(),
                    reason: e.to_string(),
                    timestamp: Utc::now(),
                });
                self.fallback_message.clone()
            }
        }
    }

    /// Record the assistant turn, publish the answer event, return the text.
    async fn finish(
        &self,
        tenant_id: &str,
        client_id: &str,
        classification: &ClassificationResult,
        reply: String,
        served_from_cache: bool,
        started: tokio::time::Instant,
    ) -> String {
        self.record(Turn::assistant(tenant_id, client_id, reply.clone()))
            .await;

        let duration_ms = started.elapsed().as_millis() as u64;
        info!(
            tenant_id,
            category = %classification.category,
            served_from_cache,
            duration_ms,
            "answered guest query"
        );
        self.events.publish(DomainEvent::TurnAnswered {
            tenant_id: tenant_id.into(),
            category: classification.category.to_string(),
            served_from_cache,
            duration_ms,
            timestamp: Utc::now(),
        });

        reply
    }

    /// Fire-and-forget turn recording: a store failure is logged and
    /// published, never allowed to block the reply.
    async fn record(&self, turn: Turn) {
        let tenant_id = turn.tenant_id.clone();
        if let Err(e) = self.store.record_turn(turn).await {
            warn!(tenant_id, error = %e, "failed to record conversation turn");
            self.events.publish(DomainEvent::TurnRecordFailed {
                tenant_id,
                reason: e.to_string(),
                timestamp: Utc::now(),
            });
        }
    }

    fn is_cacheable(reply: &str) -> bool {
        let lower = reply.to_lowercase();
        !NON_CACHEABLE_PATTERNS.iter().any(|p| lower.contains(p))
    }
}
