//! Conversation context tracker integration tests

use std::time::Duration;

use ladle_voice::{ConversationState, ConversationTracker, parse};

const TTL: Duration = Duration::from_millis(5000);

#[test]
fn test_preferences_accumulate_across_turns() {
    let mut state = ConversationState::default();

    state.merge(&parse("quick vegetarian dinner"));
    state.merge(&parse("I'm allergic to nuts"));
    state.merge(&parse("something easy"));

    assert!(state.preferences.dietary.contains("vegetarian"));
    assert!(state.preferences.dietary.contains("nut-free"));
    assert_eq!(state.preferences.cook_time, Some(30));
    assert_eq!(state.preferences.difficulty, Some("easy".to_string()));
}

#[test]
fn test_dietary_union_commutes_scalars_overwrite() {
    let vegetarian = parse("vegetarian recipes please");
    let keto_fast = parse("fast keto lunch");

    let mut forward = ConversationState::default();
    forward.merge(&vegetarian);
    forward.merge(&keto_fast);

    let mut backward = ConversationState::default();
    backward.merge(&keto_fast);
    backward.merge(&vegetarian);

    assert_eq!(forward.preferences.dietary, backward.preferences.dietary);
    // cook_time comes only from the keto_fast turn; in forward order it is
    // the last write, in backward order the vegetarian turn leaves it alone
    assert_eq!(forward.preferences.cook_time, Some(30));
    assert_eq!(backward.preferences.cook_time, Some(30));
}

#[tokio::test(start_paused = true)]
async fn test_topic_expires_but_preferences_survive() {
    let mut tracker = ConversationTracker::new(TTL);
    tracker.merge(&parse("quick vegetarian dinner"));

    assert!(tracker.snapshot().context.is_some());

    tokio::time::sleep(TTL + Duration::from_millis(100)).await;

    let state = tracker.snapshot();
    assert!(state.context.is_none());
    assert!(state.follow_up_question.is_none());
    assert!(state.preferences.dietary.contains("vegetarian"));
}

#[tokio::test(start_paused = true)]
async fn test_each_merge_restarts_the_expiry_clock() {
    let mut tracker = ConversationTracker::new(TTL);

    // Three turns spaced just inside the TTL keep the topic alive throughout
    for turn in [
        "quick vegetarian dinner",
        "I have chicken and rice",
        "something spicy",
    ] {
        tracker.merge(&parse(turn));
        tokio::time::sleep(TTL - Duration::from_millis(500)).await;
        assert!(tracker.snapshot().context.is_some(), "expired after {turn:?}");
    }

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(tracker.snapshot().context.is_none());
}
