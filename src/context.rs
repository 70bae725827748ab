//! Conversation context tracking
//!
//! Accumulates user preferences across turns and carries the active
//! follow-up question. Context and follow-up expire automatically a fixed
//! delay after the last merge; accumulated preferences persist until the
//! session is cleared.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::intent::{Command, ConversationContext};

/// How long context and follow-up survive after the last merge
pub const DEFAULT_CONTEXT_TTL: Duration = Duration::from_millis(5000);

/// Scalar and set preferences accumulated over a session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionPreferences {
    /// Union of all dietary tags heard this session
    pub dietary: BTreeSet<String>,
    pub cook_time: Option<u32>,
    pub difficulty: Option<String>,
    pub meal_type: Option<String>,
}

/// Session-scoped conversation state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationState {
    pub context: Option<ConversationContext>,
    pub follow_up_question: Option<String>,
    pub preferences: SessionPreferences,
}

impl ConversationState {
    /// Merge a parsed command into this state
    ///
    /// Dietary tags union; scalar preferences are overwritten only when the
    /// incoming command specifies a value (absence does not clear). Context
    /// and follow-up are replaced when the command carries them and retained
    /// otherwise.
    pub fn merge(&mut self, command: &Command) {
        for tag in &command.dietary_restrictions {
            self.preferences.dietary.insert(tag.clone());
        }
        if command.cook_time.is_some() {
            self.preferences.cook_time = command.cook_time;
        }
        if command.difficulty.is_some() {
            self.preferences.difficulty.clone_from(&command.difficulty);
        }
        if command.meal_type.is_some() {
            self.preferences.meal_type.clone_from(&command.meal_type);
        }
        if command.conversation_context.is_some() {
            self.context = command.conversation_context;
        }
        if command.follow_up_question.is_some() {
            self.follow_up_question
                .clone_from(&command.follow_up_question);
        }
    }

    /// Drop the active topic and follow-up, keeping preferences
    pub fn expire_topic(&mut self) {
        self.context = None;
        self.follow_up_question = None;
    }
}

/// Owns [`ConversationState`] and its expiry timer
///
/// Each merge reschedules a single expiry task (last turn wins, no
/// stacking). Dropping the tracker aborts the pending timer so no callback
/// fires after teardown.
pub struct ConversationTracker {
    state: Arc<Mutex<ConversationState>>,
    ttl: Duration,
    expiry: Option<JoinHandle<()>>,
}

impl ConversationTracker {
    /// Create an empty tracker with the given topic TTL
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(ConversationState::default())),
            ttl,
            expiry: None,
        }
    }

    /// Merge a command and reschedule topic expiry
    ///
    /// Must be called from within a tokio runtime.
    pub fn merge(&mut self, command: &Command) {
        if let Ok(mut state) = self.state.lock() {
            state.merge(command);
        }

        if let Some(previous) = self.expiry.take() {
            previous.abort();
        }

        let state = Arc::clone(&self.state);
        let ttl = self.ttl;
        self.expiry = Some(tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Ok(mut state) = state.lock() {
                tracing::debug!("conversation topic expired");
                state.expire_topic();
            }
        }));
    }

    /// Current state, by value
    #[must_use]
    pub fn snapshot(&self) -> ConversationState {
        self.state.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Clear everything, e.g. when the user exits voice mode
    pub fn clear(&mut self) {
        if let Some(previous) = self.expiry.take() {
            previous.abort();
        }
        if let Ok(mut state) = self.state.lock() {
            *state = ConversationState::default();
        }
    }
}

impl Drop for ConversationTracker {
    fn drop(&mut self) {
        if let Some(expiry) = self.expiry.take() {
            expiry.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::{Action, parse};

    fn command_with_dietary(tags: &[&str]) -> Command {
        let mut command = Command::new(Action::Filter);
        command.dietary_restrictions = tags.iter().map(ToString::to_string).collect();
        command
    }

    #[test]
    fn test_dietary_union_is_commutative() {
        let a = command_with_dietary(&["vegan", "nut-free"]);
        let b = command_with_dietary(&["keto", "vegan"]);

        let mut ab = ConversationState::default();
        ab.merge(&a);
        ab.merge(&b);

        let mut ba = ConversationState::default();
        ba.merge(&b);
        ba.merge(&a);

        assert_eq!(ab.preferences.dietary, ba.preferences.dietary);
        assert_eq!(ab.preferences.dietary.len(), 3);
    }

    #[test]
    fn test_scalars_last_write_wins_and_absence_keeps() {
        let mut state = ConversationState::default();

        let mut first = Command::new(Action::Filter);
        first.cook_time = Some(30);
        first.difficulty = Some("easy".to_string());
        state.merge(&first);

        let mut second = Command::new(Action::Filter);
        second.cook_time = Some(15);
        state.merge(&second);

        assert_eq!(state.preferences.cook_time, Some(15));
        // Absent in the second command, so retained
        assert_eq!(state.preferences.difficulty, Some("easy".to_string()));
    }

    #[test]
    fn test_context_retained_when_command_carries_none() {
        let mut state = ConversationState::default();
        state.merge(&parse("quick vegetarian dinner"));
        assert!(state.context.is_some());

        // A bare search carries no context or follow-up
        state.merge(&parse("grandma's special"));
        assert!(state.context.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_topic_expires_after_ttl() {
        let mut tracker = ConversationTracker::new(DEFAULT_CONTEXT_TTL);
        tracker.merge(&parse("quick vegetarian dinner"));
        tracker.merge(&parse("I have chicken and rice"));

        assert!(tracker.snapshot().context.is_some());
        assert!(tracker.snapshot().follow_up_question.is_some());

        tokio::time::sleep(DEFAULT_CONTEXT_TTL + Duration::from_millis(100)).await;

        let state = tracker.snapshot();
        assert!(state.context.is_none());
        assert!(state.follow_up_question.is_none());
        // Preferences survive expiry
        assert!(state.preferences.dietary.contains("vegetarian"));
        assert_eq!(state.preferences.cook_time, Some(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_merge_reschedules_expiry() {
        let mut tracker = ConversationTracker::new(DEFAULT_CONTEXT_TTL);
        tracker.merge(&parse("quick vegetarian dinner"));

        // Just before expiry, merge again: the timer restarts
        tokio::time::sleep(DEFAULT_CONTEXT_TTL - Duration::from_millis(500)).await;
        tracker.merge(&parse("I'm allergic to nuts"));

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(tracker.snapshot().context.is_some());

        tokio::time::sleep(DEFAULT_CONTEXT_TTL).await;
        assert!(tracker.snapshot().context.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_resets_everything() {
        let mut tracker = ConversationTracker::new(DEFAULT_CONTEXT_TTL);
        tracker.merge(&parse("quick vegetarian dinner"));
        tracker.clear();

        assert_eq!(tracker.snapshot(), ConversationState::default());
    }
}
