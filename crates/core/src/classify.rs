//! Classification domain types.
//!
//! A `ClassificationResult` is produced fresh for every incoming query and
//! never persisted: the coarse intent bucket, the detected language, and the
//! decoding parameters to use for generation.

use serde::{Deserialize, Serialize};

/// The coarse intent bucket assigned to a query.
///
/// This is a closed enum: classification is total, and anything the rules
/// don't recognize resolves to `Other` — never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryCategory {
    /// A salutation with no informational content
    Greeting,
    /// "What do you have?" — the guest wants to browse
    CatalogOverview,
    /// A question about one or more named items
    SpecificItem,
    /// Allergen / dietary-restriction questions
    DietaryFilter,
    /// "What should I get?"
    Recommendation,
    /// Opening hours and scheduling
    Hours,
    /// Everything else
    Other,
}

impl QueryCategory {
    /// Stable snake_case name, used in cache keys and structured logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::CatalogOverview => "catalog_overview",
            Self::SpecificItem => "specific_item",
            Self::DietaryFilter => "dietary_filter",
            Self::Recommendation => "recommendation",
            Self::Hours => "hours",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for QueryCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ISO-639-1-like language tag ("en", "es", "it", ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Language(pub String);

impl Language {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// The default when detection finds no clear signal.
    pub fn english() -> Self {
        Self("en".into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::english()
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generation parameters associated with a classification category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecodingProfile {
    /// Sampling temperature (0.0 = deterministic)
    pub temperature: f32,

    /// Maximum tokens the backend may generate
    pub max_output_tokens: u32,
}

impl Default for DecodingProfile {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_output_tokens: 256,
        }
    }
}

/// The full output of query classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// The intent bucket
    pub category: QueryCategory,

    /// Detected language of the query
    pub language: Language,

    /// Decoding parameters for this category
    pub profile: DecodingProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_names_are_snake_case() {
        assert_eq!(QueryCategory::CatalogOverview.as_str(), "catalog_overview");
        assert_eq!(QueryCategory::SpecificItem.to_string(), "specific_item");
    }

    #[test]
    fn language_defaults_to_english() {
        assert_eq!(Language::default().as_str(), "en");
    }

    #[test]
    fn category_serializes_as_snake_case() {
        let json = serde_json::to_string(&QueryCategory::DietaryFilter).unwrap();
        assert_eq!(json, "\"dietary_filter\"");
    }
}
