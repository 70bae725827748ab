//! Slot extraction from transcripts
//!
//! Shared helpers the parser rules draw on: preference scanning, ingredient
//! mention resolution, and quantity pattern matching. All helpers are pure
//! and idempotent; none mutate their input.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::intent::keywords;
use crate::lexicon::{Lexicon, find_word};

/// Preference slots shared by several parser rules
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preferences {
    /// Canonical dietary tags, deduplicated, in order of first mention
    pub dietary: Vec<String>,
    /// Maximum cook time in minutes
    pub cook_time: Option<u32>,
    pub difficulty: Option<String>,
    pub meal_type: Option<String>,
    pub flavor: Option<String>,
    pub servings: Option<u32>,
}

/// Everything the rule cascade needs, computed once per transcript
#[derive(Debug, Clone)]
pub(crate) struct Analysis {
    /// Lowercased, trimmed transcript
    pub text: String,
    /// Canonical ingredient mentions, first-appearance order
    pub ingredients: Vec<String>,
    /// Free-text quantity per mentioned ingredient
    pub quantities: BTreeMap<String, String>,
    pub prefs: Preferences,
    pub cuisine: Option<String>,
}

impl Analysis {
    pub(crate) fn of(transcript: &str, lexicon: &Lexicon) -> Self {
        let text = transcript.trim().to_lowercase();
        let ingredients = lexicon.find_mentions(&text);
        let quantities = extract_quantities(&text, lexicon);
        let prefs = extract_preferences(&text);
        let cuisine = extract_cuisine(&text);

        Self {
            text,
            ingredients,
            quantities,
            prefs,
            cuisine,
        }
    }

    /// Whole-word containment check against the lowercased transcript
    pub(crate) fn has(&self, phrase: &str) -> bool {
        find_word(&self.text, phrase).is_some()
    }

    /// Whole-word containment of any phrase in the list
    pub(crate) fn has_any(&self, phrases: &[&str]) -> bool {
        phrases.iter().any(|p| self.has(p))
    }
}

static EXPLICIT_MINUTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*(?:minutes?|mins?|min)\b").expect("valid regex"));

static SERVINGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:serves|feeds)\s+(\d+)|for\s+(\d+)\s+people|(\d+)\s+servings")
        .expect("valid regex")
});

static UNIT_QUANTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(\d+(?:\.\d+)?)\s+(cups?|tablespoons?|tbsp|teaspoons?|tsp|pounds?|lbs?|ounces?|oz|grams?|kilograms?|kg|cloves?|slices?|pieces?|cans?)\s+of\s+([a-z' ]+)",
    )
    .expect("valid regex")
});

static BARE_QUANTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s+([a-z][a-z' ]*)").expect("valid regex"));

static VAGUE_QUANTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(a few|a couple of|a couple|a little|a handful of|some)\s+([a-z][a-z' ]*)")
        .expect("valid regex")
});

/// Scan for dietary, time, difficulty, meal-type, and flavor cues
///
/// Explicit "N minutes" beats the "quick"/"hurry" defaults when both appear.
#[must_use]
pub fn extract_preferences(text: &str) -> Preferences {
    let text = text.to_lowercase();

    let mut dietary = Vec::new();
    for &(keyword, tag) in keywords::DIETARY {
        if find_word(&text, keyword).is_some() && !dietary.iter().any(|t| t == tag) {
            dietary.push(tag.to_string());
        }
    }
    if text.contains("allergic") || text.contains("allergy") || text.contains("intolerant") {
        for &(keyword, tag) in keywords::ALLERGIES {
            if find_word(&text, keyword).is_some() && !dietary.iter().any(|t| t == tag) {
                dietary.push(tag.to_string());
            }
        }
    }

    let cook_time = extract_cook_time(&text);

    let difficulty = keywords::DIFFICULTIES
        .iter()
        .find(|(keyword, _)| find_word(&text, keyword).is_some())
        .map(|&(_, level)| level.to_string());

    let meal_type = keywords::MEAL_TYPES
        .iter()
        .find(|keyword| find_word(&text, keyword).is_some())
        .map(|&m| m.to_string());

    let flavor = keywords::FLAVORS
        .iter()
        .find(|keyword| find_word(&text, keyword).is_some())
        .map(|&f| f.to_string());

    let servings = SERVINGS.captures(&text).and_then(|caps| {
        caps.iter()
            .skip(1)
            .flatten()
            .next()
            .and_then(|m| m.as_str().parse().ok())
    });

    Preferences {
        dietary,
        cook_time,
        difficulty,
        meal_type,
        flavor,
        servings,
    }
}

/// Cook time in minutes: explicit number, verbal hour phrases, then cue defaults
fn extract_cook_time(text: &str) -> Option<u32> {
    if let Some(caps) = EXPLICIT_MINUTES.captures(text) {
        if let Ok(minutes) = caps[1].parse() {
            return Some(minutes);
        }
    }
    if text.contains("half an hour") {
        return Some(30);
    }
    if text.contains("an hour") || text.contains("one hour") {
        return Some(60);
    }
    if keywords::QUICK_CUES.iter().any(|c| find_word(text, c).is_some()) {
        return Some(keywords::QUICK_DEFAULT_MINUTES);
    }
    if keywords::HURRY_CUES.iter().any(|c| find_word(text, c).is_some()) {
        return Some(keywords::HURRY_DEFAULT_MINUTES);
    }
    None
}

/// First recognized cuisine name, if any
#[must_use]
pub fn extract_cuisine(text: &str) -> Option<String> {
    let text = text.to_lowercase();
    keywords::CUISINES
        .iter()
        .find(|cuisine| find_word(&text, cuisine).is_some())
        .map(|&c| c.to_string())
}

/// Extract bound quantities: `<n> <unit> of <ingredient>`, `<n> <ingredient>`,
/// and vague quantifiers ("a few", "some", "a little")
///
/// A quantity is only recorded when its trailing phrase resolves to a known
/// canonical ingredient.
pub(crate) fn extract_quantities(text: &str, lexicon: &Lexicon) -> BTreeMap<String, String> {
    let mut quantities = BTreeMap::new();

    for caps in UNIT_QUANTITY.captures_iter(text) {
        if let Some(ingredient) = first_mention(&caps[3], lexicon) {
            quantities
                .entry(ingredient)
                .or_insert_with(|| format!("{} {}", &caps[1], &caps[2]));
        }
    }

    for caps in BARE_QUANTITY.captures_iter(text) {
        // `2 cups of rice` already matched above; skip when the phrase
        // starts with a unit word
        let rest = &caps[2];
        if starts_with_unit(rest) {
            continue;
        }
        if let Some(ingredient) = first_mention(rest, lexicon) {
            quantities.entry(ingredient).or_insert_with(|| caps[1].to_string());
        }
    }

    for caps in VAGUE_QUANTITY.captures_iter(text) {
        if let Some(ingredient) = first_mention(&caps[2], lexicon) {
            quantities.entry(ingredient).or_insert_with(|| caps[1].to_string());
        }
    }

    quantities
}

fn first_mention(phrase: &str, lexicon: &Lexicon) -> Option<String> {
    lexicon.find_mentions(phrase).into_iter().next()
}

fn starts_with_unit(phrase: &str) -> bool {
    const UNITS: &[&str] = &[
        "cup", "cups", "tablespoon", "tablespoons", "tbsp", "teaspoon", "teaspoons", "tsp",
        "pound", "pounds", "lb", "lbs", "ounce", "ounces", "oz", "gram", "grams", "kilogram",
        "kilograms", "kg", "clove", "cloves", "slice", "slices", "piece", "pieces", "can", "cans",
        "minute", "minutes", "min", "mins", "hour", "hours", "people", "servings",
    ];
    let first = phrase.split_whitespace().next().unwrap_or("");
    UNITS.contains(&first)
}
