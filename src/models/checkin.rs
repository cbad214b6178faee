//! Check-in domain models: the kind enumeration, inbound direct
//! messages, and the formatted block handed to the note service.

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Which daily check-in a prompt or reply belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CheckInKind {
    /// Morning routine check-in.
    Morning,
    /// Evening exercise check-in.
    Evening,
}

impl CheckInKind {
    /// Heading used in the daily-note block for this kind.
    #[must_use]
    pub fn heading(self) -> &'static str {
        match self {
            Self::Morning => "Morning Check-in",
            Self::Evening => "Exercise Check-in",
        }
    }
}

impl Display for CheckInKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Morning => write!(f, "morning"),
            Self::Evening => write!(f, "evening"),
        }
    }
}

/// An inbound direct message, one per Slack push event. Not retained
/// beyond the routing decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    /// Slack user ID of the sender.
    pub author_id: String,
    /// Raw message text.
    pub content: String,
    /// When the message was received.
    pub received_at: DateTime<Utc>,
}

/// The formatted payload handed to the note client. Constructed fresh
/// per reply and dropped after the write attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteBlock {
    /// Which check-in this block records.
    pub kind: CheckInKind,
    /// Reply time in the configured zone, shown in the block heading.
    pub timestamp: DateTime<Tz>,
    /// Verbatim reply text.
    pub text: String,
}
