//! Fixed keyword tables used by the parser
//!
//! Every table maps spoken phrasing to a canonical slot value. Tables are
//! consulted with whole-word matching against the lowercased transcript.

/// Dietary keyword → canonical tag
pub(crate) const DIETARY: &[(&str, &str)] = &[
    ("vegetarian", "vegetarian"),
    ("vegan", "vegan"),
    ("gluten free", "gluten-free"),
    ("gluten-free", "gluten-free"),
    ("dairy free", "dairy-free"),
    ("dairy-free", "dairy-free"),
    ("nut free", "nut-free"),
    ("nut-free", "nut-free"),
    ("ketogenic", "keto"),
    ("keto", "keto"),
    ("paleo", "paleo"),
    ("low carb", "low-carb"),
    ("low-carb", "low-carb"),
];

/// Allergy phrasing → the corresponding `-free` tag
pub(crate) const ALLERGIES: &[(&str, &str)] = &[
    ("nuts", "nut-free"),
    ("nut", "nut-free"),
    ("peanuts", "nut-free"),
    ("peanut", "nut-free"),
    ("dairy", "dairy-free"),
    ("milk", "dairy-free"),
    ("lactose", "dairy-free"),
    ("gluten", "gluten-free"),
    ("wheat", "gluten-free"),
];

/// Recognized cuisine names
pub(crate) const CUISINES: &[&str] = &[
    "italian",
    "mexican",
    "chinese",
    "indian",
    "thai",
    "japanese",
    "french",
    "mediterranean",
    "american",
    "korean",
    "greek",
    "spanish",
    "vietnamese",
];

/// Difficulty keyword → canonical level
pub(crate) const DIFFICULTIES: &[(&str, &str)] = &[
    ("easy", "easy"),
    ("simple", "easy"),
    ("beginner", "easy"),
    ("medium", "medium"),
    ("intermediate", "medium"),
    ("hard", "hard"),
    ("difficult", "hard"),
    ("advanced", "hard"),
    ("challenging", "hard"),
];

/// Recognized meal types
pub(crate) const MEAL_TYPES: &[&str] = &[
    "breakfast",
    "brunch",
    "lunch",
    "dinner",
    "snack",
    "dessert",
];

/// Recognized flavor/style tags
pub(crate) const FLAVORS: &[&str] = &[
    "spicy",
    "sweet",
    "savory",
    "healthy",
    "comfort food",
    "light",
    "hearty",
    "fresh",
    "creamy",
];

/// Possession/availability cues that signal an ingredient-bearing utterance
///
/// "ingredients" alone is not enough to classify (narration and shopping-list
/// utterances say it too); the rule additionally requires at least one
/// resolved ingredient mention.
pub(crate) const INGREDIENT_CUES: &[&str] =
    &["with", "using", "i have", "i've got", "got", "available", "ingredients"];

/// Meal-planning query phrases
pub(crate) const MEAL_PLANNING: &[&str] = &[
    "what can i make",
    "what should i make",
    "what can i cook",
    "what should i cook",
    "what's for dinner",
    "whats for dinner",
    "dinner ideas",
    "lunch ideas",
    "breakfast ideas",
    "meal ideas",
    "ideas for",
];

/// Cues that time pressure matters, with default cook-time minutes
pub(crate) const QUICK_CUES: &[&str] = &["quick", "fast"];
pub(crate) const HURRY_CUES: &[&str] = &["hurry", "short on time", "in a rush", "no time"];

/// Default minutes when "quick"/"fast" is said without a number
pub(crate) const QUICK_DEFAULT_MINUTES: u32 = 30;

/// Default minutes when the user is in a hurry
pub(crate) const HURRY_DEFAULT_MINUTES: u32 = 15;

/// Direct recipe-lookup trigger phrases, stripped from the query
pub(crate) const RECIPE_TRIGGERS: &[&str] = &[
    "recipe for",
    "how to make",
    "how do i make",
    "how to cook",
    "how do i cook",
];

/// Generic search trigger words, stripped from the query
pub(crate) const SEARCH_TRIGGERS: &[&str] =
    &["show me", "look for", "search for", "find me", "search", "find"];

/// Shopping-list utterance cues
pub(crate) const SHOPPING_CUES: &[&str] =
    &["shopping list", "grocery list", "missing ingredients", "add to list", "to my list"];

/// Narration verbs and subjects
pub(crate) const NARRATION_VERBS: &[&str] = &["read", "tell me", "explain", "narrate"];
pub(crate) const NARRATION_SUBJECTS: &[&str] =
    &["recipe", "ingredients", "instructions", "steps", "nutrition"];

/// Help utterance cues
pub(crate) const HELP_CUES: &[&str] = &["help", "what can you do", "what can you help"];
