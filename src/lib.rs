#![forbid(unsafe_code)]

//! `habit-coach` — single-user Slack bot that prompts for morning and
//! evening habit check-ins on a daily schedule and appends each reply
//! to the Craft daily note.

pub mod chat;
pub mod config;
pub mod errors;
pub mod format;
pub mod models;
pub mod note;
pub mod router;
pub mod scheduler;
pub mod slack;
pub mod state;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
