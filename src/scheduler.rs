//! Daily check-in scheduler.
//!
//! Registers one zone-aware cron job per check-in kind. The zoned
//! trigger abstraction handles daylight-saving transitions; a bad zone
//! name is rejected at configuration time, not here.

use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

use crate::models::checkin::CheckInKind;
use crate::router::AppState;
use crate::{AppError, Result};

/// Wrapper owning the cron scheduler and its two daily jobs.
pub struct CheckInScheduler {
    inner: JobScheduler,
}

impl CheckInScheduler {
    /// Register both daily triggers and start the scheduler.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Scheduler` if job registration or startup
    /// fails.
    pub async fn start(state: Arc<AppState>) -> Result<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|err| AppError::Scheduler(err.to_string()))?;

        for kind in [CheckInKind::Morning, CheckInKind::Evening] {
            let at = state.config.schedule.time_for(kind);
            let expression = format!("0 {} {} * * *", at.minute, at.hour);
            let job_state = Arc::clone(&state);

            let job = Job::new_async_tz(
                expression.as_str(),
                state.config.schedule.time_zone,
                move |_uuid, _lock| {
                    let state = Arc::clone(&job_state);
                    Box::pin(async move {
                        fire_check_in(&state, kind).await;
                    })
                },
            )
            .map_err(|err| AppError::Scheduler(err.to_string()))?;

            scheduler
                .add(job)
                .await
                .map_err(|err| AppError::Scheduler(err.to_string()))?;

            info!(kind = %kind, at = %at, "registered daily check-in trigger");
        }

        scheduler
            .start()
            .await
            .map_err(|err| AppError::Scheduler(err.to_string()))?;
        info!(
            zone = %state.config.schedule.time_zone,
            "check-in scheduler started"
        );

        Ok(Self { inner: scheduler })
    }

    /// Stop the scheduler and drop its jobs.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Scheduler` if shutdown fails.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.inner
            .shutdown()
            .await
            .map_err(|err| AppError::Scheduler(err.to_string()))?;
        info!("check-in scheduler stopped");
        Ok(())
    }
}

/// One trigger firing: arm the slot and send the prompt.
///
/// When a previous check-in is still awaiting a reply the new prompt
/// is skipped, so an unanswered prompt is never overwritten. When
/// prompt delivery fails the slot is rolled back, because the prompt
/// never reached the user.
pub async fn fire_check_in(state: &Arc<AppState>, kind: CheckInKind) {
    if let Some(max_age) = state.config.schedule.slot_expiry() {
        if let Some(stale) = state.slot.expire_older_than(max_age) {
            warn!(kind = %stale, "expired stale check-in slot");
        }
    }

    if !state.slot.try_open(kind) {
        warn!(
            kind = %kind,
            open = ?state.slot.peek(),
            "previous check-in still awaiting a reply; skipping prompt"
        );
        return;
    }

    let prompt = state.config.prompts.text_for(kind).to_owned();
    let user_id = state.config.slack.authorized_user_id.clone();

    match state.messenger.send_direct_message(&user_id, &prompt).await {
        Ok(()) => info!(kind = %kind, "check-in prompt sent"),
        Err(err) => {
            error!(%err, kind = %kind, "failed to deliver check-in prompt");
            state.slot.close_if_matches(kind);
        }
    }
}
