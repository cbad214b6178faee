//! Chat-platform boundary.
//!
//! The [`DirectMessenger`] trait decouples the core (scheduler and
//! message router) from the Slack transport, so tests can drive both
//! with in-memory implementations.

use std::future::Future;
use std::pin::Pin;

use crate::Result;

/// Outbound direct-message channel to the chat platform.
pub trait DirectMessenger: Send + Sync {
    /// Send a direct message to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Slack`](crate::AppError::Slack) if delivery
    /// fails (for example, the user has blocked the bot).
    fn send_direct_message<'a>(
        &'a self,
        user_id: &'a str,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}
