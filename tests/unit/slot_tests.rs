//! Conversation slot semantics: open/peek/close, skip-on-busy, expiry,
//! and mutual exclusion under concurrent access.

use chrono::{Duration, Utc};
use habit_coach::models::checkin::CheckInKind;
use habit_coach::state::ConversationSlot;

#[test]
fn opens_when_empty() {
    let slot = ConversationSlot::default();
    assert!(slot.try_open(CheckInKind::Morning));
    assert_eq!(slot.peek(), Some(CheckInKind::Morning));
}

#[test]
fn second_open_fails_and_keeps_first_kind() {
    let slot = ConversationSlot::default();
    assert!(slot.try_open(CheckInKind::Morning));

    // Evening trigger fires while morning is still awaiting a reply.
    assert!(!slot.try_open(CheckInKind::Evening));
    assert_eq!(slot.peek(), Some(CheckInKind::Morning));
}

#[test]
fn same_kind_reopen_also_fails() {
    let slot = ConversationSlot::default();
    assert!(slot.try_open(CheckInKind::Evening));
    assert!(!slot.try_open(CheckInKind::Evening));
}

#[test]
fn close_matching_kind_empties_slot() {
    let slot = ConversationSlot::default();
    slot.try_open(CheckInKind::Morning);

    assert!(slot.close_if_matches(CheckInKind::Morning));
    assert_eq!(slot.peek(), None);
}

#[test]
fn close_mismatched_kind_is_a_noop() {
    let slot = ConversationSlot::default();
    slot.try_open(CheckInKind::Morning);

    assert!(!slot.close_if_matches(CheckInKind::Evening));
    assert_eq!(slot.peek(), Some(CheckInKind::Morning));
}

#[test]
fn close_on_empty_slot_returns_false() {
    let slot = ConversationSlot::default();
    assert!(!slot.close_if_matches(CheckInKind::Morning));
}

#[test]
fn reopens_after_close() {
    let slot = ConversationSlot::default();
    slot.try_open(CheckInKind::Morning);
    slot.close_if_matches(CheckInKind::Morning);

    assert!(slot.try_open(CheckInKind::Evening));
    assert_eq!(slot.peek(), Some(CheckInKind::Evening));
}

#[test]
fn records_open_timestamp() {
    let slot = ConversationSlot::default();
    let before = Utc::now();
    slot.try_open(CheckInKind::Morning);

    let open = slot.open_check_in().expect("slot is open");
    assert_eq!(open.kind, CheckInKind::Morning);
    assert!(open.opened_at >= before);
    assert!(open.opened_at <= Utc::now());
}

#[test]
fn expires_only_slots_older_than_max_age() {
    let slot = ConversationSlot::default();
    slot.try_open_at(CheckInKind::Morning, Utc::now() - Duration::hours(25));

    assert_eq!(
        slot.expire_older_than(Duration::hours(20)),
        Some(CheckInKind::Morning)
    );
    assert_eq!(slot.peek(), None);
}

#[test]
fn fresh_slot_survives_expiry_check() {
    let slot = ConversationSlot::default();
    slot.try_open(CheckInKind::Evening);

    assert_eq!(slot.expire_older_than(Duration::hours(20)), None);
    assert_eq!(slot.peek(), Some(CheckInKind::Evening));
}

#[test]
fn expiry_on_empty_slot_is_a_noop() {
    let slot = ConversationSlot::default();
    assert_eq!(slot.expire_older_than(Duration::hours(1)), None);
}

/// Concurrent opens from many threads admit exactly one winner.
#[test]
fn concurrent_opens_admit_exactly_one() {
    let slot = ConversationSlot::default();
    let mut handles = Vec::new();

    for i in 0..16 {
        let slot = slot.clone();
        let kind = if i % 2 == 0 {
            CheckInKind::Morning
        } else {
            CheckInKind::Evening
        };
        handles.push(std::thread::spawn(move || slot.try_open(kind)));
    }

    let wins: usize = handles
        .into_iter()
        .map(|handle| usize::from(handle.join().expect("thread join")))
        .sum();

    assert_eq!(wins, 1, "exactly one concurrent open may succeed");
    assert!(slot.peek().is_some());
}

/// Interleaved open/close storms never leave the slot with more than
/// one observable entry: peek always reports zero or one kind.
#[test]
fn open_close_storm_keeps_slot_coherent() {
    let slot = ConversationSlot::default();
    let mut handles = Vec::new();

    for _ in 0..8 {
        let slot = slot.clone();
        handles.push(std::thread::spawn(move || {
            for _ in 0..100 {
                if slot.try_open(CheckInKind::Morning) {
                    assert_eq!(slot.peek(), Some(CheckInKind::Morning));
                    slot.close_if_matches(CheckInKind::Morning);
                }
            }
        }));
    }

    for handle in handles {
        handle.join().expect("thread join");
    }
    assert_eq!(slot.peek(), None);
}
