//! Conversation state: a single mailbox slot holding at most one
//! check-in that is awaiting a reply from the authorized user.
//!
//! The scheduler's timer callback and the Slack push-event callback run
//! concurrently, so every check-then-set and check-then-clear sequence
//! happens under one mutex. The lock is never held across a network
//! call.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};

use crate::models::checkin::CheckInKind;

/// A check-in that has been prompted and is awaiting a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenCheckIn {
    /// Which check-in was prompted.
    pub kind: CheckInKind,
    /// When the prompt was sent.
    pub opened_at: DateTime<Utc>,
}

/// Shared slot with 0 or 1 open check-ins. Only the scheduler opens
/// it; only the message router or the expiry policy closes it.
#[derive(Debug, Clone, Default)]
pub struct ConversationSlot {
    inner: Arc<Mutex<Option<OpenCheckIn>>>,
}

impl ConversationSlot {
    /// Open the slot for `kind` at the current instant.
    ///
    /// Returns `false` without modifying the slot when a check-in is
    /// already open, whatever its kind.
    pub fn try_open(&self, kind: CheckInKind) -> bool {
        self.try_open_at(kind, Utc::now())
    }

    /// Open the slot for `kind` with an explicit open timestamp.
    pub fn try_open_at(&self, kind: CheckInKind, opened_at: DateTime<Utc>) -> bool {
        let mut guard = self.lock();
        if guard.is_some() {
            return false;
        }
        *guard = Some(OpenCheckIn { kind, opened_at });
        true
    }

    /// Kind of the currently open check-in, if any.
    #[must_use]
    pub fn peek(&self) -> Option<CheckInKind> {
        self.lock().map(|open| open.kind)
    }

    /// Full snapshot of the currently open check-in, if any.
    #[must_use]
    pub fn open_check_in(&self) -> Option<OpenCheckIn> {
        *self.lock()
    }

    /// Clear the slot only when the open kind equals `kind`.
    ///
    /// Returns `false` (and leaves the slot untouched) when the slot is
    /// empty or holds a different kind.
    pub fn close_if_matches(&self, kind: CheckInKind) -> bool {
        let mut guard = self.lock();
        match *guard {
            Some(open) if open.kind == kind => {
                *guard = None;
                true
            }
            _ => false,
        }
    }

    /// Clear the slot when the open check-in is older than `max_age`,
    /// returning the expired kind.
    pub fn expire_older_than(&self, max_age: Duration) -> Option<CheckInKind> {
        let mut guard = self.lock();
        match *guard {
            Some(open) if Utc::now() - open.opened_at > max_age => {
                *guard = None;
                Some(open.kind)
            }
            _ => None,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<OpenCheckIn>> {
        // A poisoned slot only means a panic elsewhere; the Option
        // inside is still coherent.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
