//! Intent parsing
//!
//! Turns a finalized transcript into a structured [`Command`]. Parsing is
//! pure, synchronous, and total: every transcript yields a command, and
//! unparseable input degrades to a plain search instead of an error so the
//! caller always has something actionable.

mod command;
mod extract;
mod keywords;
mod rules;

pub use command::{Action, Command, ConversationContext, NarrationAction, ShoppingListAction};
pub use extract::{Preferences, extract_cuisine, extract_preferences};

use crate::lexicon::Lexicon;

/// Parse a transcript into a structured command
///
/// Evaluates an ordered first-match-wins rule cascade over a single shared
/// analysis of the transcript. Deterministic: the same input always yields
/// the same command. Never panics.
#[must_use]
pub fn parse(transcript: &str) -> Command {
    let analysis = extract::Analysis::of(transcript, Lexicon::builtin());

    for rule in rules::RULES {
        if (rule.applies)(&analysis) {
            tracing::debug!(rule = rule.name, transcript, "parser rule matched");
            return (rule.build)(&analysis);
        }
    }

    tracing::debug!(transcript, "no parser rule matched, degrading to search");
    rules::fallback(&analysis)
}
