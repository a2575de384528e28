//! Catalog domain types and the catalog provider trait.
//!
//! The catalog is owned by an external collaborator; the orchestrator only
//! ever reads an immutable per-request snapshot and never mutates it. The
//! provider is responsible for normalizing whatever shape its upstream
//! records have into the one canonical `CatalogItem`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// One sellable item in a tenant's catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Item name, unique within a tenant
    pub name: String,

    /// Coarse grouping ("pasta", "dessert", ...)
    pub category: String,

    /// Price in the tenant's display currency
    pub price: f64,

    /// Composition tags ("egg", "pasta", "pancetta")
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,

    /// Safety-relevant exclusion tags ("contains gluten", "nuts")
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclusions: Vec<String>,

    /// Optional one-line description for display
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CatalogItem {
    /// Create an item with the required fields; tags via struct update.
    pub fn new(name: impl Into<String>, category: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            price,
            attributes: Vec::new(),
            exclusions: Vec::new(),
            description: None,
        }
    }

    pub fn with_attributes(mut self, attributes: Vec<String>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_exclusions(mut self, exclusions: Vec<String>) -> Self {
        self.exclusions = exclusions;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// An immutable, point-in-time read of one tenant's catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    /// All items currently offered
    pub items: Vec<CatalogItem>,

    /// Operating-hours blurb, if the tenant has one configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<String>,
}

impl CatalogSnapshot {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The catalog provider collaborator.
///
/// Implementations live outside this subsystem (relational store, menu
/// management service). Snapshots may be stale within seconds to minutes.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Fetch the current snapshot for a tenant, including its hours blurb.
    async fn snapshot(&self, tenant_id: &str) -> Result<CatalogSnapshot, CatalogError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_fills_optional_fields() {
        let item = CatalogItem::new("Spaghetti Carbonara", "pasta", 18.99)
            .with_attributes(vec!["egg".into(), "pancetta".into()])
            .with_exclusions(vec!["contains gluten".into()])
            .with_description("Roman classic");

        assert_eq!(item.attributes.len(), 2);
        assert_eq!(item.exclusions.len(), 1);
        assert_eq!(item.description.as_deref(), Some("Roman classic"));
    }

    #[test]
    fn empty_snapshot_reports_empty() {
        assert!(CatalogSnapshot::default().is_empty());
    }
}
