//! Pure formatting of check-in replies into daily-note markdown.
//!
//! The rendered shape is the contract the note service depends on: a
//! heading naming the check-in kind and the local reply time, an
//! optional completion-status line parsed from keywords in the reply,
//! a blank line, then the verbatim reply text.

use chrono::DateTime;
use chrono_tz::Tz;

use crate::models::checkin::{CheckInKind, NoteBlock};

/// Build the block for a reply received at `at` (already converted to
/// the configured time zone).
#[must_use]
pub fn note_block(kind: CheckInKind, reply: &str, at: DateTime<Tz>) -> NoteBlock {
    NoteBlock {
        kind,
        timestamp: at,
        text: reply.to_owned(),
    }
}

/// Render a block to the markdown appended to the daily note.
#[must_use]
pub fn render_markdown(block: &NoteBlock) -> String {
    let time = block.timestamp.format("%I:%M %p");
    let mut out = format!("## {} ({time})\n", block.kind.heading());
    if let Some((label, status)) = completion_status(block.kind, &block.text) {
        out.push_str(&format!("**{label}:** {status}\n"));
    }
    out.push('\n');
    out.push_str(&block.text);
    out
}

/// Detect a yes/partial/no answer in the reply, if it contains one.
fn completion_status(kind: CheckInKind, reply: &str) -> Option<(&'static str, &'static str)> {
    let lower = reply.to_lowercase();
    let yes = lower.contains("yes");
    let no = lower.contains("no");
    match kind {
        CheckInKind::Morning => {
            let status = if yes && !no {
                "Yes"
            } else if lower.contains("partial") {
                "Partial"
            } else if no {
                "No"
            } else {
                return None;
            };
            Some(("Routine completion", status))
        }
        CheckInKind::Evening => {
            let status = if yes && !no {
                "Yes"
            } else if no {
                "No"
            } else {
                return None;
            };
            Some(("Workout", status))
        }
    }
}
