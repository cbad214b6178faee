//! Slack push-event dispatch for inbound direct messages.
//!
//! Only plain direct messages reach the router: bot echoes, message
//! subtypes (edits, joins), non-DM channels, and empty text are all
//! dropped here. Authorization against the configured user happens in
//! the router, not here, so the drop stays silent either way.

use std::sync::Arc;

use chrono::Utc;
use slack_morphism::prelude::{
    SlackClient, SlackClientEventsUserState, SlackClientHyperHttpsConnector,
    SlackEventCallbackBody, SlackMessageEvent, SlackPushEventCallback,
};
use tracing::{debug, error, warn};

use crate::models::checkin::IncomingMessage;
use crate::router::{AppState, MessageRouter};

/// Handle push events delivered via Socket Mode.
///
/// # Errors
///
/// Never fails; routing errors are logged and swallowed so the Socket
/// Mode listener keeps running.
pub async fn handle_push(
    event: SlackPushEventCallback,
    _client: Arc<SlackClient<SlackClientHyperHttpsConnector>>,
    states: SlackClientEventsUserState,
) -> slack_morphism::UserCallbackResult<()> {
    let app_state: Option<Arc<AppState>> = {
        let guard = states.read().await;
        guard.get_user_state::<Arc<AppState>>().cloned()
    };
    let Some(state) = app_state else {
        warn!("app state not available; dropping push event");
        return Ok(());
    };

    if let SlackEventCallbackBody::Message(message) = event.event {
        let Some(incoming) = extract_direct_message(message) else {
            return Ok(());
        };
        let router = MessageRouter::new(state);
        if let Err(err) = router.handle(incoming).await {
            error!(%err, "check-in routing failed");
        }
    }

    Ok(())
}

/// Reduce a message event to an [`IncomingMessage`], or `None` when it
/// is not a plain inbound direct message.
fn extract_direct_message(message: SlackMessageEvent) -> Option<IncomingMessage> {
    if message.sender.bot_id.is_some() || message.subtype.is_some() {
        return None;
    }

    let is_dm = message
        .origin
        .channel_type
        .as_ref()
        .is_some_and(|channel_type| channel_type.0 == "im");
    if !is_dm {
        debug!("ignoring message outside a direct-message channel");
        return None;
    }

    let author_id = message.sender.user?.to_string();
    let content = message.content.and_then(|content| content.text)?;
    if content.is_empty() {
        return None;
    }

    Some(IncomingMessage {
        author_id,
        content,
        received_at: Utc::now(),
    })
}
