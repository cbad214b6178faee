//! Message router: the decision logic for every inbound direct message.
//!
//! Per message the side effects are bounded to at most one outbound
//! direct message, at most one note-service write attempt, and at most
//! one slot mutation.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::chat::DirectMessenger;
use crate::config::GlobalConfig;
use crate::format;
use crate::models::checkin::IncomingMessage;
use crate::note::NoteSink;
use crate::state::ConversationSlot;
use crate::Result;

/// Reply sent when the note write succeeds.
pub const CONFIRMATION_TEXT: &str = "Got it! Added to your daily note \u{2705}";

/// Reply sent when the note write fails; the slot stays open so the
/// user can resend the same reply.
pub const RETRY_TEXT: &str =
    "Your reply arrived, but saving it to the daily note failed. Please resend it in a moment.";

/// Shared application state injected into the scheduler's fire handler
/// and the message router.
pub struct AppState {
    /// Global configuration.
    pub config: Arc<GlobalConfig>,
    /// The single pending check-in slot.
    pub slot: ConversationSlot,
    /// Outbound direct-message channel.
    pub messenger: Arc<dyn DirectMessenger>,
    /// Daily-note sink.
    pub notes: Arc<dyn NoteSink>,
}

/// Routes inbound direct messages against the conversation slot.
pub struct MessageRouter {
    state: Arc<AppState>,
}

impl MessageRouter {
    /// Create a router bound to shared application state.
    #[must_use]
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Handle one inbound direct message.
    ///
    /// Unauthorized senders and messages arriving while no check-in is
    /// open are ignored silently: no reply, no write, no state change.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Slack`](crate::AppError::Slack) if the
    /// confirmation or failure reply cannot be delivered.
    pub async fn handle(&self, message: IncomingMessage) -> Result<()> {
        if message.author_id != self.state.config.slack.authorized_user_id {
            // Security event, but no feedback to the sender.
            warn!(
                author_id = %message.author_id,
                "ignoring direct message from unauthorized sender"
            );
            return Ok(());
        }

        let Some(kind) = self.state.slot.peek() else {
            debug!("no check-in awaiting a reply; ignoring message");
            return Ok(());
        };

        let tz = self.state.config.schedule.time_zone;
        let block = format::note_block(kind, &message.content, message.received_at.with_timezone(&tz));

        match self.state.notes.append_block(&block).await {
            Ok(()) => {
                self.state.slot.close_if_matches(kind);
                info!(kind = %kind, "check-in reply saved");
                self.state
                    .messenger
                    .send_direct_message(&message.author_id, CONFIRMATION_TEXT)
                    .await
            }
            Err(err) => {
                // Slot stays open so the same reply can be resent.
                error!(%err, kind = %kind, "failed to save check-in reply");
                self.state
                    .messenger
                    .send_direct_message(&message.author_id, RETRY_TEXT)
                    .await
            }
        }
    }
}
