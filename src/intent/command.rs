//! Structured voice commands
//!
//! The parser's output shape, shared with the application-level dispatcher.
//! Serialized as camelCase JSON to match the dispatcher's wire shape.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Top-level intent tag of a parsed command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Search,
    Filter,
    Navigate,
    Help,
    Ingredients,
    Conversation,
    ShoppingList,
    RecipeNarration,
    Unknown,
}

/// Session-topic tag grouping related follow-up turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationContext {
    MealPlanning,
    DietaryFiltering,
    TimeBased,
    FlavorBased,
    IngredientSearch,
}

/// Sub-classification of a shopping-list command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShoppingListAction {
    AddMissing,
    CreateFromRecipe,
    AddIngredients,
}

/// Sub-classification of a narration command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrationAction {
    ReadRecipe,
    ReadIngredients,
    ReadInstructions,
    ReadNutrition,
}

/// A parsed voice command: one action tag plus action-dependent slots
///
/// Slot presence depends on the action; `narration_action` is only meaningful
/// when `action` is [`Action::RecipeNarration`], and so on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    pub action: Action,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,

    /// Maximum cook time in minutes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cook_time: Option<u32>,

    /// Canonical ingredient names, deduplicated, in order of first mention
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ingredients: Vec<String>,

    /// Canonical dietary tags, deduplicated, in order of first mention
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dietary_restrictions: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,

    /// Free-text quantity per ingredient (e.g. "2 cups", "a few")
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub quantities: BTreeMap<String, String>,

    /// Prompt the assistant should ask next, when one applies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up_question: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_context: Option<ConversationContext>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub shopping_list_action: Option<ShoppingListAction>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub narration_action: Option<NarrationAction>,

    /// Human-readable confirmation text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Command {
    /// Create a command with the given action and no slots
    #[must_use]
    pub fn new(action: Action) -> Self {
        Self {
            action,
            query: None,
            cuisine: None,
            difficulty: None,
            cook_time: None,
            ingredients: Vec::new(),
            dietary_restrictions: Vec::new(),
            meal_type: None,
            servings: None,
            quantities: BTreeMap::new(),
            follow_up_question: None,
            conversation_context: None,
            shopping_list_action: None,
            narration_action: None,
            message: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_json_shape() {
        let mut command = Command::new(Action::Filter);
        command.dietary_restrictions = vec!["vegetarian".to_string()];
        command.cook_time = Some(30);
        command.conversation_context = Some(ConversationContext::DietaryFiltering);

        let json = serde_json::to_value(&command).unwrap();
        assert_eq!(json["action"], "filter");
        assert_eq!(json["cookTime"], 30);
        assert_eq!(json["dietaryRestrictions"][0], "vegetarian");
        assert_eq!(json["conversationContext"], "dietary_filtering");
        // Absent slots are omitted entirely
        assert!(json.get("narrationAction").is_none());
        assert!(json.get("ingredients").is_none());
    }

    #[test]
    fn test_command_roundtrip() {
        let mut command = Command::new(Action::ShoppingList);
        command.shopping_list_action = Some(ShoppingListAction::AddMissing);
        command.follow_up_question = Some("Which recipe?".to_string());

        let json = serde_json::to_string(&command).unwrap();
        let back: Command = serde_json::from_str(&json).unwrap();
        assert_eq!(back, command);
    }
}
