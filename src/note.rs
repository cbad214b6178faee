//! Note-service boundary and the Craft daily-note HTTP client.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::config::NoteConfig;
use crate::format;
use crate::models::checkin::NoteBlock;
use crate::{AppError, Result};

/// Sink that appends formatted blocks to the daily note.
pub trait NoteSink: Send + Sync {
    /// Append one block to today's daily note.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Note`](crate::AppError::Note) if the write
    /// fails, times out, or the service answers non-2xx.
    fn append_block<'a>(
        &'a self,
        block: &'a NoteBlock,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}

/// Wire shape of a text block accepted by the daily-note endpoint.
#[derive(Debug, Serialize)]
struct TextBlockBody {
    #[serde(rename = "type")]
    block_type: &'static str,
    content: String,
}

/// HTTP client for the Craft daily-note blocks endpoint.
pub struct NoteClient {
    http: reqwest::Client,
    endpoint: String,
}

impl NoteClient {
    /// Build a client with the configured base URL and request timeout.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Note` if the HTTP client cannot be built.
    pub fn new(config: &NoteConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|err| AppError::Note(format!("failed to build http client: {err}")))?;
        Ok(Self {
            http,
            endpoint: format!("{}/blocks", config.base_url.trim_end_matches('/')),
        })
    }
}

impl NoteSink for NoteClient {
    fn append_block<'a>(
        &'a self,
        block: &'a NoteBlock,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let body = TextBlockBody {
                block_type: "textBlock",
                content: format::render_markdown(block),
            };

            let response = self.http.post(&self.endpoint).json(&body).send().await?;
            if response.status().is_success() {
                info!(kind = %block.kind, "wrote check-in block to daily note");
                Ok(())
            } else {
                Err(AppError::Note(format!(
                    "note service returned {}",
                    response.status()
                )))
            }
        })
    }
}
