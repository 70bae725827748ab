//! Command dispatch seam
//!
//! Parsed commands leave the voice subsystem through [`CommandDispatcher`].
//! The application owns the real routing (recipe search, list management,
//! navigation); this crate only defines the seam and a logging implementation
//! used by the binary and in tests.

use async_trait::async_trait;

use crate::Result;
use crate::intent::{Action, Command};

/// Routes a parsed command to the application and returns the reply text
///
/// The returned string is user-facing and is fed to speech output.
#[async_trait]
pub trait CommandDispatcher: Send + Sync {
    /// Handle one command
    ///
    /// # Errors
    ///
    /// Returns error if the application cannot act on the command
    async fn dispatch(&self, command: Command) -> Result<String>;
}

/// Dispatcher that logs the command and echoes a plain-text reply
///
/// Stands in wherever real routing is not wired up. The reply favors the
/// follow-up question when the parser produced one, so conversational flows
/// sound natural even without an application behind the seam.
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoDispatcher;

#[async_trait]
impl CommandDispatcher for EchoDispatcher {
    async fn dispatch(&self, command: Command) -> Result<String> {
        tracing::info!(action = ?command.action, query = ?command.query, "dispatching command");

        if let Some(question) = &command.follow_up_question {
            return Ok(question.clone());
        }

        let query = command.query.as_deref().unwrap_or("recipes");
        let reply = match command.action {
            Action::Search | Action::Filter | Action::Navigate | Action::Unknown => {
                format!("Searching for {query}")
            }
            Action::Ingredients => format!(
                "Looking for recipes with {}",
                command.ingredients.join(", ")
            ),
            Action::ShoppingList => "Updating your shopping list".to_string(),
            Action::RecipeNarration => "Reading the recipe".to_string(),
            Action::Help | Action::Conversation => command
                .message
                .clone()
                .unwrap_or_else(|| "How can I help with dinner?".to_string()),
        };

        Ok(reply)
    }
}
