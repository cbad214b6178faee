//! Router flows: the happy path, retry after a failed note write,
//! unauthorized senders, and idle-slot messages.

use chrono::Utc;
use habit_coach::models::checkin::{CheckInKind, IncomingMessage};
use habit_coach::router::{MessageRouter, CONFIRMATION_TEXT, RETRY_TEXT};

use super::test_helpers::{test_config, test_state, AUTHORIZED_USER};

fn reply_from(author: &str, content: &str) -> IncomingMessage {
    IncomingMessage {
        author_id: author.to_owned(),
        content: content.to_owned(),
        received_at: Utc::now(),
    }
}

/// Morning prompt answered, note write succeeds, user confirmed, slot
/// emptied.
#[tokio::test]
async fn reply_is_saved_confirmed_and_slot_cleared() {
    let (state, messenger, notes) = test_state(test_config());
    state.slot.try_open(CheckInKind::Morning);

    let router = MessageRouter::new(state.clone());
    router
        .handle(reply_from(AUTHORIZED_USER, "did my stretches"))
        .await
        .expect("handle succeeds");

    let writes = notes.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].kind, CheckInKind::Morning);
    assert_eq!(writes[0].text, "did my stretches");

    let sent = messenger.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, AUTHORIZED_USER);
    assert_eq!(sent[0].1, CONFIRMATION_TEXT);

    assert_eq!(state.slot.peek(), None);
}

/// Failed note write keeps the slot open and invites a retry; the
/// resent reply then succeeds and empties the slot.
#[tokio::test]
async fn failed_write_keeps_slot_open_until_retry_succeeds() {
    let (state, messenger, notes) = test_state(test_config());
    state.slot.try_open(CheckInKind::Morning);
    notes.script([false]);

    let router = MessageRouter::new(state.clone());
    router
        .handle(reply_from(AUTHORIZED_USER, "did my stretches"))
        .await
        .expect("failure reply delivered");

    assert_eq!(state.slot.peek(), Some(CheckInKind::Morning));
    assert_eq!(notes.writes().len(), 0);
    assert_eq!(messenger.sent()[0].1, RETRY_TEXT);

    // The identical resend now succeeds.
    router
        .handle(reply_from(AUTHORIZED_USER, "did my stretches"))
        .await
        .expect("retry succeeds");

    assert_eq!(state.slot.peek(), None);
    assert_eq!(notes.writes().len(), 1);
    assert_eq!(messenger.sent().len(), 2);
    assert_eq!(messenger.sent()[1].1, CONFIRMATION_TEXT);
}

/// A message from a different user while a check-in is open changes
/// nothing: no reply, no write, no state mutation.
#[tokio::test]
async fn unauthorized_sender_is_silently_ignored() {
    let (state, messenger, notes) = test_state(test_config());
    state.slot.try_open(CheckInKind::Morning);

    let router = MessageRouter::new(state.clone());
    router
        .handle(reply_from("U_STRANGER", "did my stretches"))
        .await
        .expect("handle succeeds");

    assert!(messenger.sent().is_empty());
    assert_eq!(notes.attempts(), 0);
    assert_eq!(state.slot.peek(), Some(CheckInKind::Morning));
}

/// An authorized message with no check-in open triggers no note write
/// and no reply.
#[tokio::test]
async fn idle_message_triggers_no_write() {
    let (state, messenger, notes) = test_state(test_config());

    let router = MessageRouter::new(state.clone());
    router
        .handle(reply_from(AUTHORIZED_USER, "hello there"))
        .await
        .expect("handle succeeds");

    assert!(messenger.sent().is_empty());
    assert_eq!(notes.attempts(), 0);
    assert_eq!(state.slot.peek(), None);
}

/// The saved block carries the evening heading data when the evening
/// check-in is the one open.
#[tokio::test]
async fn evening_reply_is_recorded_under_evening_kind() {
    let (state, _messenger, notes) = test_state(test_config());
    state.slot.try_open(CheckInKind::Evening);

    let router = MessageRouter::new(state.clone());
    router
        .handle(reply_from(AUTHORIZED_USER, "yes, went climbing"))
        .await
        .expect("handle succeeds");

    let writes = notes.writes();
    assert_eq!(writes[0].kind, CheckInKind::Evening);
}

/// Per inbound message the router performs at most one write attempt
/// and sends at most one reply, even on failure.
#[tokio::test]
async fn side_effects_are_bounded_per_message() {
    let (state, messenger, notes) = test_state(test_config());
    state.slot.try_open(CheckInKind::Morning);
    notes.script([false]);

    let router = MessageRouter::new(state.clone());
    router
        .handle(reply_from(AUTHORIZED_USER, "yes"))
        .await
        .expect("failure reply delivered");

    assert_eq!(notes.attempts(), 1);
    assert_eq!(messenger.sent().len(), 1);
}

/// A confirmation delivery failure surfaces as an error but the
/// check-in is already saved and the slot already cleared.
#[tokio::test]
async fn confirmation_delivery_failure_does_not_lose_the_save() {
    let (state, messenger, notes) = test_state(test_config());
    state.slot.try_open(CheckInKind::Morning);
    messenger.fail_deliveries();

    let router = MessageRouter::new(state.clone());
    let result = router.handle(reply_from(AUTHORIZED_USER, "yes")).await;

    assert!(result.is_err());
    assert_eq!(notes.writes().len(), 1);
    assert_eq!(state.slot.peek(), None);
}
