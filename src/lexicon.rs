//! Ingredient lexicon
//!
//! Static catalog of known ingredient names, category tags, and pairing
//! suggestions. Loaded once at startup and shared read-only; the intent
//! parser resolves spoken mentions to canonical names through it.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Ingredient category tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Protein,
    Vegetable,
    Fruit,
    Grain,
    Dairy,
    Pantry,
    Herb,
}

/// One canonical ingredient with its pairings
#[derive(Debug, Clone)]
pub struct LexiconEntry {
    /// Canonical name (the preferred spelling, not a synonym)
    pub name: &'static str,
    /// Category tag
    pub category: Category,
    /// Related ingredients, in suggestion order
    pub pairings: &'static [&'static str],
}

/// Canonical ingredients known to the assistant
///
/// Pairing lists are ordered by how commonly the combination appears in the
/// recipe catalog.
const ENTRIES: &[LexiconEntry] = &[
    LexiconEntry { name: "chicken breast", category: Category::Protein, pairings: &["garlic", "lemon", "rice", "broccoli", "olive oil"] },
    LexiconEntry { name: "ground beef", category: Category::Protein, pairings: &["onion", "garlic", "tomatoes", "pasta", "cheese"] },
    LexiconEntry { name: "salmon", category: Category::Protein, pairings: &["lemon", "garlic", "spinach", "rice", "olive oil"] },
    LexiconEntry { name: "shrimp", category: Category::Protein, pairings: &["garlic", "lemon", "pasta", "butter", "bell pepper"] },
    LexiconEntry { name: "tofu", category: Category::Protein, pairings: &["soy sauce", "garlic", "rice", "broccoli", "mushrooms"] },
    LexiconEntry { name: "eggs", category: Category::Protein, pairings: &["cheese", "spinach", "onion", "butter", "mushrooms"] },
    LexiconEntry { name: "beans", category: Category::Protein, pairings: &["rice", "onion", "garlic", "corn", "tomatoes"] },
    LexiconEntry { name: "rice", category: Category::Grain, pairings: &["chicken breast", "beans", "onion", "eggs", "soy sauce"] },
    LexiconEntry { name: "pasta", category: Category::Grain, pairings: &["tomatoes", "garlic", "cheese", "olive oil", "basil"] },
    LexiconEntry { name: "bread", category: Category::Grain, pairings: &["butter", "cheese", "eggs", "garlic", "avocado"] },
    LexiconEntry { name: "quinoa", category: Category::Grain, pairings: &["spinach", "avocado", "lemon", "beans", "olive oil"] },
    LexiconEntry { name: "potatoes", category: Category::Vegetable, pairings: &["butter", "garlic", "onion", "cheese", "rosemary"] },
    LexiconEntry { name: "onion", category: Category::Vegetable, pairings: &["garlic", "tomatoes", "bell pepper", "ground beef", "olive oil"] },
    LexiconEntry { name: "garlic", category: Category::Vegetable, pairings: &["onion", "olive oil", "tomatoes", "basil", "butter"] },
    LexiconEntry { name: "tomatoes", category: Category::Vegetable, pairings: &["basil", "garlic", "onion", "pasta", "cheese"] },
    LexiconEntry { name: "bell pepper", category: Category::Vegetable, pairings: &["onion", "garlic", "rice", "ground beef", "mushrooms"] },
    LexiconEntry { name: "carrots", category: Category::Vegetable, pairings: &["onion", "potatoes", "garlic", "ginger", "butter"] },
    LexiconEntry { name: "broccoli", category: Category::Vegetable, pairings: &["garlic", "cheese", "chicken breast", "lemon", "soy sauce"] },
    LexiconEntry { name: "spinach", category: Category::Vegetable, pairings: &["garlic", "eggs", "cheese", "lemon", "mushrooms"] },
    LexiconEntry { name: "mushrooms", category: Category::Vegetable, pairings: &["garlic", "butter", "onion", "thyme", "cheese"] },
    LexiconEntry { name: "corn", category: Category::Vegetable, pairings: &["butter", "beans", "bell pepper", "lime", "cheese"] },
    LexiconEntry { name: "avocado", category: Category::Fruit, pairings: &["lime", "tomatoes", "onion", "bread", "eggs"] },
    LexiconEntry { name: "lemon", category: Category::Fruit, pairings: &["garlic", "olive oil", "chicken breast", "salmon", "butter"] },
    LexiconEntry { name: "lime", category: Category::Fruit, pairings: &["avocado", "corn", "shrimp", "cilantro", "rice"] },
    LexiconEntry { name: "cheese", category: Category::Dairy, pairings: &["pasta", "bread", "eggs", "tomatoes", "potatoes"] },
    LexiconEntry { name: "milk", category: Category::Dairy, pairings: &["butter", "eggs", "flour", "cheese", "potatoes"] },
    LexiconEntry { name: "butter", category: Category::Dairy, pairings: &["garlic", "bread", "potatoes", "mushrooms", "flour"] },
    LexiconEntry { name: "yogurt", category: Category::Dairy, pairings: &["lemon", "garlic", "cucumber", "honey", "mint"] },
    LexiconEntry { name: "olive oil", category: Category::Pantry, pairings: &["garlic", "lemon", "tomatoes", "pasta", "basil"] },
    LexiconEntry { name: "soy sauce", category: Category::Pantry, pairings: &["garlic", "ginger", "rice", "tofu", "broccoli"] },
    LexiconEntry { name: "flour", category: Category::Pantry, pairings: &["butter", "milk", "eggs", "sugar", "yeast"] },
    LexiconEntry { name: "basil", category: Category::Herb, pairings: &["tomatoes", "garlic", "olive oil", "pasta", "cheese"] },
    LexiconEntry { name: "cilantro", category: Category::Herb, pairings: &["lime", "onion", "avocado", "beans", "corn"] },
    LexiconEntry { name: "ginger", category: Category::Herb, pairings: &["garlic", "soy sauce", "carrots", "rice", "onion"] },
];

/// Synonym and everyday-term mappings to canonical names
///
/// Covers both documented lexicon synonyms ("chicken" for "chicken breast")
/// and common spoken terms that are not lexicon entries themselves.
const SYNONYMS: &[(&str, &str)] = &[
    ("chicken", "chicken breast"),
    ("meat", "ground beef"),
    ("beef", "ground beef"),
    ("hamburger", "ground beef"),
    ("fish", "salmon"),
    ("prawns", "shrimp"),
    ("egg", "eggs"),
    ("noodles", "pasta"),
    ("spaghetti", "pasta"),
    ("macaroni", "pasta"),
    ("toast", "bread"),
    ("potato", "potatoes"),
    ("onions", "onion"),
    ("tomato", "tomatoes"),
    ("peppers", "bell pepper"),
    ("pepper", "bell pepper"),
    ("carrot", "carrots"),
    ("mushroom", "mushrooms"),
    ("greens", "spinach"),
    ("avocados", "avocado"),
    ("lemons", "lemon"),
    ("limes", "lime"),
    ("cheddar", "cheese"),
    ("mozzarella", "cheese"),
    ("parmesan", "cheese"),
    ("oil", "olive oil"),
    ("soy", "soy sauce"),
    ("bean", "beans"),
];

/// Immutable ingredient catalog with synonym resolution
pub struct Lexicon {
    entries: &'static [LexiconEntry],
    by_name: HashMap<&'static str, usize>,
    synonyms: HashMap<&'static str, &'static str>,
}

static BUILTIN: LazyLock<Lexicon> = LazyLock::new(|| Lexicon::new(ENTRIES, SYNONYMS));

impl Lexicon {
    fn new(entries: &'static [LexiconEntry], synonyms: &[(&'static str, &'static str)]) -> Self {
        let by_name = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name, i))
            .collect();
        let synonyms = synonyms.iter().copied().collect();

        Self {
            entries,
            by_name,
            synonyms,
        }
    }

    /// The built-in catalog, constructed once per process
    #[must_use]
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    /// Look up an entry by canonical name
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&LexiconEntry> {
        self.by_name.get(name).map(|&i| &self.entries[i])
    }

    /// Resolve a mention (canonical name or synonym) to its canonical name
    #[must_use]
    pub fn canonicalize(&self, mention: &str) -> Option<&'static str> {
        let mention = mention.trim();
        if let Some(&i) = self.by_name.get(mention) {
            return Some(self.entries[i].name);
        }
        self.synonyms.get(mention).copied()
    }

    /// All terms the scanner should look for: canonical names plus synonyms,
    /// each with its canonical resolution
    pub(crate) fn terms(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.entries
            .iter()
            .map(|e| (e.name, e.name))
            .chain(self.synonyms.iter().map(|(&s, &c)| (s, c)))
    }

    /// Find canonical ingredient mentions in a transcript
    ///
    /// Matches whole words only (so "rice" does not match inside "price"),
    /// resolves synonyms, deduplicates, and preserves the order of first
    /// appearance in the text.
    #[must_use]
    pub fn find_mentions(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();

        let mut found: Vec<(usize, &'static str)> = Vec::new();
        for (term, canonical) in self.terms() {
            if let Some(pos) = find_word(&lower, term) {
                found.push((pos, canonical));
            }
        }

        found.sort_by_key(|&(pos, _)| pos);

        let mut mentions = Vec::new();
        for (_, canonical) in found {
            if !mentions.iter().any(|m| m == canonical) {
                mentions.push(canonical.to_string());
            }
        }
        mentions
    }

    /// Suggest ingredients that pair with the given selection
    ///
    /// Unions each selected ingredient's pairings, drops anything already
    /// selected, and keeps first-appearance order (not sorted). Stateless;
    /// consumed by the UI layer rather than the parser.
    #[must_use]
    pub fn suggest_pairings(&self, selected: &[String]) -> Vec<String> {
        let mut suggestions: Vec<String> = Vec::new();

        for name in selected {
            let Some(entry) = self.entry(name) else {
                continue;
            };
            for &pairing in entry.pairings {
                if selected.iter().any(|s| s == pairing) {
                    continue;
                }
                if !suggestions.iter().any(|s| s == pairing) {
                    suggestions.push(pairing.to_string());
                }
            }
        }

        suggestions
    }
}

/// Find `term` in `text` at a word boundary, returning its byte position
///
/// `term` may span multiple words ("gluten free"); boundaries are checked
/// against the characters adjacent to the whole phrase.
pub(crate) fn find_word(text: &str, term: &str) -> Option<usize> {
    let mut start = 0;
    while let Some(rel) = text[start..].find(term) {
        let pos = start + rel;
        let end = pos + term.len();

        let before_ok = pos == 0
            || text[..pos]
                .chars()
                .next_back()
                .is_none_or(|c| !c.is_alphanumeric());
        let after_ok = end == text.len()
            || text[end..].chars().next().is_none_or(|c| !c.is_alphanumeric());

        if before_ok && after_ok {
            return Some(pos);
        }
        start = end;
    }
    None
}
