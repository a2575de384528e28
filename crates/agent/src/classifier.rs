//! Rule-based query classification.
//!
//! Ordered rule evaluation, first match wins. The order puts specific and
//! safety-relevant intents ahead of generic ones so that, e.g., a dietary
//! question is never swallowed by the recommendation rule. The heuristics
//! are deliberately isolated behind this type so a model-based classifier
//! could replace them without touching the orchestrator.

use maitre_config::DecodingConfig;
use maitre_core::cache::normalize_query;
use maitre_core::classify::{ClassificationResult, Language, QueryCategory};

// --- Greeting lexicons, per language ---

const GREETING_WORDS: &[&str] = &[
    // en
    "hello", "hi", "hey", "howdy", "greetings",
    // es
    "hola",
    // it
    "ciao", "salve", "buongiorno", "buonasera",
    // fr
    "bonjour", "salut", "bonsoir",
];

const GREETING_PHRASES: &[&str] = &[
    "good morning",
    "good afternoon",
    "good evening",
    "buenos dias",
    "buenos días",
    "buenas tardes",
    "buenas noches",
    "buona sera",
    "buona giornata",
];

/// A salutation is only a greeting when the whole message is short.
const MAX_GREETING_WORDS: usize = 4;

// --- Category vocabularies ---

const OVERVIEW_TERMS: &[&str] = &[
    "menu",
    "menú",
    "menù",
    "carta",
    "carte",
    "what do you have",
    "what do you serve",
    "what do you offer",
    "show me",
    "qué tienen",
    "que tienen",
    "cosa avete",
    "che avete",
];

const FOOD_TERMS: &[&str] = &[
    "pizza", "pasta", "carbonara", "lasagna", "risotto", "gnocchi", "ravioli", "spaghetti",
    "burger", "sandwich", "salad", "soup", "steak", "fish", "chicken", "seafood", "shrimp",
    "dessert", "tiramisu", "cake", "gelato", "appetizer", "starter", "antipasto", "bruschetta",
    "wine", "beer", "coffee", "espresso", "cocktail", "juice", "drink",
];

const DIETARY_TERMS: &[&str] = &[
    "vegan", "vegetarian", "gluten", "lactose", "dairy", "allerg", "nut ", "nuts", "peanut",
    "shellfish", "halal", "kosher", "celiac", "coeliac", "vegano", "vegetariano", "alergi",
    "senza glutine", "sin gluten", "végétarien", "vegetarien", "sans gluten",
];

const RECOMMENDATION_TERMS: &[&str] = &[
    "recommend", "suggest", "best", "popular", "favorite", "favourite", "specialty",
    "speciality", "what should", "recomienda", "recomiendas", "consiglia", "consigli",
    "conseille", "spécialité",
];

const HOURS_TERMS: &[&str] = &[
    "hours", "open", "close", "closing", "opening", "schedule", "when are you", "when do you",
    "horario", "abierto", "cierran", "orario", "aperto", "chiuso", "horaires", "ouvert",
];

// --- Language indicator lexicons ---

const ES_INDICATORS: &[&str] = &[
    "hola", "que", "qué", "tienen", "tiene", "ustedes", "usted", "gracias", "por", "para",
    "cuál", "cual", "dónde", "donde", "cuándo", "cuando", "quiero", "menú", "tarde", "noche",
];

const IT_INDICATORS: &[&str] = &[
    "ciao", "che", "cosa", "avete", "voi", "grazie", "per", "con", "quale", "dove", "quando",
    "vorrei", "menù", "buongiorno", "buonasera", "senza", "della", "del",
];

const FR_INDICATORS: &[&str] = &[
    "bonjour", "vous", "avez", "quoi", "merci", "est", "quel", "quelle", "où", "quand", "je",
    "voudrais", "carte", "sans", "pour", "les", "des",
];

const ES_DIACRITICS: &[char] = &['á', 'í', 'ó', 'ú', 'ñ', '¿', '¡'];
const IT_DIACRITICS: &[char] = &['à', 'è', 'ì', 'ò', 'ù'];
const FR_DIACRITICS: &[char] = &['â', 'ç', 'ê', 'ë', 'î', 'ï', 'ô', 'û', 'œ'];

/// Minimum indicator hits before a non-English detection is trusted.
const MIN_LANGUAGE_SCORE: usize = 2;

/// The rule-based classifier. Deterministic and total: every input string
/// produces a well-formed result, defaulting to `Other` / `en`.
pub struct QueryClassifier {
    decoding: DecodingConfig,
}

impl Default for QueryClassifier {
    fn default() -> Self {
        Self::new(DecodingConfig::default())
    }
}

impl QueryClassifier {
    pub fn new(decoding: DecodingConfig) -> Self {
        Self { decoding }
    }

    /// Classify a raw query. Cannot fail.
    pub fn classify(&self, text: &str) -> ClassificationResult {
        let normalized = normalize_query(text);
        let category = categorize(&normalized);
        let language = detect_language(&normalized);

        ClassificationResult {
            profile: self.decoding.profile_for(category),
            category,
            language,
        }
    }
}

/// Ordered rules, first match wins.
fn categorize(normalized: &str) -> QueryCategory {
    if is_greeting(normalized) {
        QueryCategory::Greeting
    } else if contains_any(normalized, OVERVIEW_TERMS) {
        QueryCategory::CatalogOverview
    } else if contains_any(normalized, FOOD_TERMS) {
        QueryCategory::SpecificItem
    } else if contains_any(normalized, DIETARY_TERMS) {
        QueryCategory::DietaryFilter
    } else if contains_any(normalized, RECOMMENDATION_TERMS) {
        QueryCategory::Recommendation
    } else if contains_any(normalized, HOURS_TERMS) {
        QueryCategory::Hours
    } else {
        QueryCategory::Other
    }
}

fn contains_any(normalized: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| normalized.contains(t))
}

fn is_greeting(normalized: &str) -> bool {
    let words = word_list(normalized);
    if words.is_empty() || words.len() > MAX_GREETING_WORDS {
        return false;
    }

    if GREETING_WORDS.contains(&words[0].as_str()) {
        return true;
    }

    if words.len() >= 2 {
        let first_two = format!("{} {}", words[0], words[1]);
        if GREETING_PHRASES.contains(&first_two.as_str()) {
            return true;
        }
    }

    false
}

/// Split into words with edge punctuation stripped ("hello!" -> "hello").
fn word_list(normalized: &str) -> Vec<String> {
    normalized
        .split(' ')
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Score-based language detection over indicator tokens and diacritics.
/// The best score wins if it reaches the threshold; ties resolve to `en`.
fn detect_language(normalized: &str) -> Language {
    let words = word_list(normalized);

    let candidates: [(&str, &[&str], &[char]); 3] = [
        ("es", ES_INDICATORS, ES_DIACRITICS),
        ("it", IT_INDICATORS, IT_DIACRITICS),
        ("fr", FR_INDICATORS, FR_DIACRITICS),
    ];

    let mut best: Option<(&str, usize)> = None;
    let mut tied = false;

    for (tag, indicators, diacritics) in candidates {
        let token_hits = words
            .iter()
            .filter(|w| indicators.contains(&w.as_str()))
            .count();
        let diacritic_hits = normalized.chars().filter(|c| diacritics.contains(c)).count();
        let score = token_hits + diacritic_hits;

        match best {
            Some((_, best_score)) if score > best_score => {
                best = Some((tag, score));
                tied = false;
            }
            Some((_, best_score)) if score == best_score && score > 0 => {
                tied = true;
            }
            None => {
                best = Some((tag, score));
                tied = false;
            }
            _ => {}
        }
    }

    match best {
        Some((tag, score)) if score >= MIN_LANGUAGE_SCORE && !tied => Language::new(tag),
        _ => Language::english(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> ClassificationResult {
        QueryClassifier::default().classify(text)
    }

    #[test]
    fn classification_is_total() {
        for input in ["", "   ", "🍕🍕🍕", "asdfghjkl", "日本語のテキスト", "\t\n"] {
            let result = classify(input);
            // Must produce a result without panicking, whatever the input.
            assert!(!result.language.as_str().is_empty());
            let _ = result.category;
        }
    }

    #[test]
    fn unrecognized_text_falls_back_to_other() {
        let result = classify("tell me about the weather on mars");
        assert_eq!(result.category, QueryCategory::Other);
        assert_eq!(result.language.as_str(), "en");
    }

    #[test]
    fn short_salutations_are_greetings() {
        for text in ["hello", "Hi!", "hey there", "good morning", "Hola", "ciao", "Bonjour!"] {
            assert_eq!(classify(text).category, QueryCategory::Greeting, "{text}");
        }
    }

    #[test]
    fn long_messages_starting_with_hello_are_not_greetings() {
        let result = classify("hello can you tell me if you have any carbonara today");
        assert_ne!(result.category, QueryCategory::Greeting);
    }

    #[test]
    fn menu_browsing_is_catalog_overview() {
        assert_eq!(classify("show me the menu").category, QueryCategory::CatalogOverview);
        assert_eq!(
            classify("What do you have today?").category,
            QueryCategory::CatalogOverview
        );
    }

    #[test]
    fn named_dishes_are_specific_items() {
        assert_eq!(
            classify("do you have carbonara").category,
            QueryCategory::SpecificItem
        );
        assert_eq!(classify("how much is the pizza").category, QueryCategory::SpecificItem);
    }

    #[test]
    fn dietary_questions_are_dietary_filter() {
        assert_eq!(
            classify("which options are gluten free").category,
            QueryCategory::DietaryFilter
        );
        assert_eq!(
            classify("I have a peanut allergy, what is safe?").category,
            QueryCategory::DietaryFilter
        );
    }

    #[test]
    fn named_item_wins_over_dietary_wording() {
        // Rule order: a named dish is more specific than the dietary rule.
        assert_eq!(
            classify("is the pizza vegan").category,
            QueryCategory::SpecificItem
        );
    }

    #[test]
    fn recommendation_vocabulary_is_recognized() {
        assert_eq!(
            classify("what would you recommend").category,
            QueryCategory::Recommendation
        );
    }

    #[test]
    fn dietary_wins_over_recommendation() {
        assert_eq!(
            classify("recommend something vegan").category,
            QueryCategory::DietaryFilter
        );
    }

    #[test]
    fn hours_vocabulary_is_recognized() {
        assert_eq!(classify("when do you open").category, QueryCategory::Hours);
        assert_eq!(classify("what are your hours").category, QueryCategory::Hours);
    }

    #[test]
    fn spanish_is_detected_with_enough_signal() {
        let result = classify("¿qué tienen para cenar ustedes?");
        assert_eq!(result.language.as_str(), "es");
    }

    #[test]
    fn italian_is_detected_with_enough_signal() {
        let result = classify("che cosa avete da mangiare voi");
        assert_eq!(result.language.as_str(), "it");
    }

    #[test]
    fn french_is_detected_with_enough_signal() {
        let result = classify("qu'est-ce que vous avez sur la carte");
        assert_eq!(result.language.as_str(), "fr");
    }

    #[test]
    fn weak_signal_defaults_to_english() {
        // A single indicator hit is below the threshold.
        assert_eq!(classify("hola everyone welcome").language.as_str(), "en");
        assert_eq!(classify("do you have pasta").language.as_str(), "en");
    }

    #[test]
    fn greeting_profile_runs_hotter_and_shorter_than_item_profile() {
        let greeting = classify("hello");
        let item = classify("do you have carbonara");
        assert!(greeting.profile.temperature > item.profile.temperature);
        assert!(item.profile.max_output_tokens > greeting.profile.max_output_tokens);
    }
}
