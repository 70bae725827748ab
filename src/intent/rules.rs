//! The parser's ordered rule cascade
//!
//! Rules are an explicit ordered list of (predicate, handler) pairs evaluated
//! first-match-wins. Order is significant because rules overlap: an utterance
//! mentioning both "vegan" and "quick" must classify as dietary filtering, not
//! time filtering, because the dietary rule comes first.

use crate::intent::command::{
    Action, Command, ConversationContext, NarrationAction, ShoppingListAction,
};
use crate::intent::extract::{Analysis, Preferences};
use crate::intent::keywords;

/// One entry in the cascade
pub(crate) struct Rule {
    pub name: &'static str,
    pub applies: fn(&Analysis) -> bool,
    pub build: fn(&Analysis) -> Command,
}

/// The cascade, in precedence order; the catch-all search fallback lives in
/// `fallback`
pub(crate) const RULES: &[Rule] = &[
    Rule { name: "ingredients", applies: is_ingredient_bearing, build: build_ingredients },
    Rule { name: "meal_planning", applies: is_meal_planning, build: build_meal_planning },
    Rule { name: "dietary", applies: is_dietary, build: build_dietary },
    Rule { name: "time", applies: is_time_pressure, build: build_time },
    Rule { name: "flavor", applies: is_flavor, build: build_flavor },
    Rule { name: "recipe_lookup", applies: is_recipe_lookup, build: build_recipe_lookup },
    Rule { name: "refine_or_search", applies: is_refine_or_search, build: build_refine_or_search },
    Rule { name: "shopping_list", applies: is_shopping_list, build: build_shopping_list },
    Rule { name: "narration", applies: is_narration, build: build_narration },
    Rule { name: "help", applies: is_help, build: build_help },
];

/// Catch-all: degrade to a plain search so the caller always gets something
/// actionable
pub(crate) fn fallback(analysis: &Analysis) -> Command {
    let mut command = Command::new(Action::Search);
    command.query = Some(analysis.text.clone());
    command
}

// ---- rule 1: ingredient-bearing utterances ----

fn is_ingredient_bearing(a: &Analysis) -> bool {
    a.has_any(keywords::INGREDIENT_CUES) && !a.ingredients.is_empty()
}

fn build_ingredients(a: &Analysis) -> Command {
    let mut command = Command::new(Action::Ingredients);
    command.ingredients = a.ingredients.clone();
    command.quantities = a.quantities.clone();
    command.cuisine = a.cuisine.clone();
    apply_preferences(&mut command, &a.prefs);
    command.conversation_context = Some(ConversationContext::IngredientSearch);
    command.message = Some(format!(
        "Looking for recipes with {}.",
        join_names(&a.ingredients)
    ));
    command.follow_up_question = Some(ingredient_follow_up(a));
    command
}

/// Context-sensitive follow-up for an ingredient list
fn ingredient_follow_up(a: &Analysis) -> String {
    const GENERIC: &[&str] = &[
        "What sounds good today?",
        "Want me to pull up the best match?",
        "Should I sort those by rating?",
    ];

    if a.ingredients.len() == 1 {
        return format!(
            "Should I suggest ingredients that pair well with {}?",
            a.ingredients[0]
        );
    }
    if a.ingredients.len() >= 3 && a.prefs.cook_time.is_none() {
        return "How much time do you have to cook?".to_string();
    }
    if a.prefs.dietary.is_empty() {
        return "Any dietary restrictions I should keep in mind?".to_string();
    }
    // Deterministic pick so identical transcripts parse identically
    GENERIC[a.ingredients.len() % GENERIC.len()].to_string()
}

// ---- rule 2: meal-planning queries ----

fn is_meal_planning(a: &Analysis) -> bool {
    keywords::MEAL_PLANNING.iter().any(|p| a.text.contains(p))
}

fn build_meal_planning(a: &Analysis) -> Command {
    let mut command = Command::new(Action::Conversation);
    command.ingredients = a.ingredients.clone();
    command.cuisine = a.cuisine.clone();
    apply_preferences(&mut command, &a.prefs);
    command.conversation_context = Some(ConversationContext::MealPlanning);
    command.message = Some("Let's plan a meal.".to_string());
    command.follow_up_question = Some("What ingredients do you have on hand?".to_string());
    command
}

// ---- rule 3: dietary and allergy utterances ----

fn is_dietary(a: &Analysis) -> bool {
    !a.prefs.dietary.is_empty() || a.has("allergic") || a.has("allergy")
}

fn build_dietary(a: &Analysis) -> Command {
    let mut command = Command::new(Action::Filter);
    apply_preferences(&mut command, &a.prefs);
    command.cuisine = a.cuisine.clone();
    command.conversation_context = Some(ConversationContext::DietaryFiltering);
    command.message = Some(if a.prefs.dietary.is_empty() {
        "Filtering out recipes that conflict with your allergies.".to_string()
    } else {
        format!("Filtering for {} recipes.", a.prefs.dietary.join(", "))
    });
    command
}

// ---- rule 4: time-pressure utterances ----

fn is_time_pressure(a: &Analysis) -> bool {
    a.prefs.cook_time.is_some()
}

fn build_time(a: &Analysis) -> Command {
    let mut command = Command::new(Action::Filter);
    apply_preferences(&mut command, &a.prefs);
    command.cuisine = a.cuisine.clone();
    command.conversation_context = Some(ConversationContext::TimeBased);
    if let Some(minutes) = a.prefs.cook_time {
        command.message = Some(format!("Finding recipes ready in {minutes} minutes or less."));
    }
    command
}

// ---- rule 5: flavor and cuisine-preference utterances ----

fn is_flavor(a: &Analysis) -> bool {
    a.prefs.flavor.is_some()
}

fn build_flavor(a: &Analysis) -> Command {
    let mut command = Command::new(Action::Filter);
    command.query = a.prefs.flavor.clone();
    command.cuisine = a.cuisine.clone();
    apply_preferences(&mut command, &a.prefs);
    command.conversation_context = Some(ConversationContext::FlavorBased);
    if let Some(flavor) = &a.prefs.flavor {
        command.message = Some(format!("Looking for {flavor} recipes."));
    }
    command
}

// ---- rule 6: direct recipe lookup ----

fn is_recipe_lookup(a: &Analysis) -> bool {
    keywords::RECIPE_TRIGGERS.iter().any(|p| a.text.contains(p))
}

fn build_recipe_lookup(a: &Analysis) -> Command {
    let query = keywords::RECIPE_TRIGGERS
        .iter()
        .find_map(|trigger| {
            a.text
                .find(trigger)
                .map(|pos| a.text[pos + trigger.len()..].trim())
        })
        .unwrap_or(&a.text)
        .trim_start_matches("a ")
        .trim_start_matches("the ")
        .to_string();

    let mut command = Command::new(Action::Search);
    command.message = Some(format!("Searching for {query}."));
    command.query = Some(query);
    command
}

// ---- rule 7: cuisine-only, difficulty-only, or generic search ----

fn is_refine_or_search(a: &Analysis) -> bool {
    a.cuisine.is_some()
        || a.prefs.difficulty.is_some()
        || a.has_any(keywords::SEARCH_TRIGGERS)
}

fn build_refine_or_search(a: &Analysis) -> Command {
    if let Some(cuisine) = &a.cuisine {
        let mut command = Command::new(Action::Filter);
        command.cuisine = Some(cuisine.clone());
        apply_preferences(&mut command, &a.prefs);
        command.message = Some(format!("Filtering for {cuisine} recipes."));
        return command;
    }

    if a.prefs.difficulty.is_some() {
        let mut command = Command::new(Action::Filter);
        apply_preferences(&mut command, &a.prefs);
        if let Some(difficulty) = &command.difficulty {
            command.message = Some(format!("Filtering for {difficulty} recipes."));
        }
        return command;
    }

    let mut query = a.text.clone();
    for trigger in keywords::SEARCH_TRIGGERS {
        query = query.replacen(trigger, "", 1);
    }
    let query = query
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_start_matches("a ")
        .trim_start_matches("the ")
        .to_string();

    let mut command = Command::new(Action::Search);
    command.message = Some(format!("Searching for {query}."));
    command.query = Some(query);
    command
}

// ---- rule 8: shopping-list utterances ----

fn is_shopping_list(a: &Analysis) -> bool {
    keywords::SHOPPING_CUES.iter().any(|p| a.text.contains(p))
}

fn build_shopping_list(a: &Analysis) -> Command {
    let mut command = Command::new(Action::ShoppingList);

    if a.has("missing") || a.has("need") {
        command.shopping_list_action = Some(ShoppingListAction::AddMissing);
        command.follow_up_question =
            Some("Which recipe should I check for missing ingredients?".to_string());
    } else if a.has("create") || a.text.contains("from recipe") || a.text.contains("from the recipe")
    {
        command.shopping_list_action = Some(ShoppingListAction::CreateFromRecipe);
        command.follow_up_question =
            Some("Which recipe should I build the list from?".to_string());
    } else if a.ingredients.is_empty() {
        command.follow_up_question =
            Some("What would you like to add to your shopping list?".to_string());
    } else {
        command.shopping_list_action = Some(ShoppingListAction::AddIngredients);
        command.ingredients = a.ingredients.clone();
        command.quantities = a.quantities.clone();
        command.message = Some(format!(
            "Adding {} to your shopping list.",
            join_names(&a.ingredients)
        ));
    }

    command
}

// ---- rule 9: narration utterances ----

fn is_narration(a: &Analysis) -> bool {
    keywords::NARRATION_VERBS.iter().any(|p| a.text.contains(p))
        && a.has_any(keywords::NARRATION_SUBJECTS)
}

fn build_narration(a: &Analysis) -> Command {
    let mut command = Command::new(Action::RecipeNarration);

    let (narration, follow_up) = if a.has("nutrition") {
        (
            NarrationAction::ReadNutrition,
            "Which recipe's nutrition facts should I read?",
        )
    } else if a.has("instructions") || a.has("steps") {
        (
            NarrationAction::ReadInstructions,
            "Which recipe's instructions should I read?",
        )
    } else if a.has("ingredients") {
        (
            NarrationAction::ReadIngredients,
            "Which recipe's ingredient list should I read?",
        )
    } else {
        (
            NarrationAction::ReadRecipe,
            "Which recipe would you like me to read?",
        )
    };

    command.narration_action = Some(narration);
    command.follow_up_question = Some(follow_up.to_string());
    command
}

// ---- rule 10: help ----

fn is_help(a: &Analysis) -> bool {
    a.has_any(keywords::HELP_CUES)
}

fn build_help(_a: &Analysis) -> Command {
    let mut command = Command::new(Action::Help);
    command.message = Some(
        "You can ask me to find recipes, filter by diet, time, or cuisine, \
         tell me what ingredients you have, manage your shopping list, \
         or have me read a recipe aloud."
            .to_string(),
    );
    command
}

// ---- shared slot application ----

/// Copy the shared preference bundle into a command's slots
fn apply_preferences(command: &mut Command, prefs: &Preferences) {
    command.dietary_restrictions = prefs.dietary.clone();
    command.cook_time = prefs.cook_time;
    command.difficulty = prefs.difficulty.clone();
    command.meal_type = prefs.meal_type.clone();
    command.servings = prefs.servings;
}

/// "a", "a and b", "a, b and c"
fn join_names(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [only] => only.clone(),
        [head @ .., last] => format!("{} and {last}", head.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::Lexicon;

    fn analyze(text: &str) -> Analysis {
        Analysis::of(text, Lexicon::builtin())
    }

    #[test]
    fn test_join_names() {
        let names: Vec<String> = ["rice", "beans", "corn"].iter().map(ToString::to_string).collect();
        assert_eq!(join_names(&names[..1]), "rice");
        assert_eq!(join_names(&names[..2]), "rice and beans");
        assert_eq!(join_names(&names), "rice, beans and corn");
    }

    #[test]
    fn test_single_ingredient_follow_up_asks_pairing() {
        let a = analyze("what can i do with salmon");
        let follow_up = ingredient_follow_up(&a);
        assert!(follow_up.contains("salmon"));
        assert!(follow_up.contains("pair"));
    }

    #[test]
    fn test_many_ingredients_follow_up_asks_time() {
        let a = analyze("i have rice, beans and corn");
        assert_eq!(ingredient_follow_up(&a), "How much time do you have to cook?");
    }

    #[test]
    fn test_two_ingredients_follow_up_asks_dietary() {
        let a = analyze("i have chicken and rice");
        assert_eq!(
            ingredient_follow_up(&a),
            "Any dietary restrictions I should keep in mind?"
        );
    }

    #[test]
    fn test_rule_order_dietary_before_time() {
        // Both dietary and time cues present: dietary rule is earlier
        let a = analyze("quick vegetarian dinner");
        let matched = RULES.iter().find(|r| (r.applies)(&a)).unwrap();
        assert_eq!(matched.name, "dietary");
    }

    #[test]
    fn test_rule_order_ingredients_first() {
        let a = analyze("quick dinner with chicken");
        let matched = RULES.iter().find(|r| (r.applies)(&a)).unwrap();
        assert_eq!(matched.name, "ingredients");
    }
}
