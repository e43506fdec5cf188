//! Error types for layout and settings operations

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("A publish time is required to schedule")]
    MissingSchedule,

    #[error("Reset not confirmed: type {expected} to continue")]
    ResetNotConfirmed { expected: &'static str },

    #[error("Version snapshot not found: {0}")]
    HistoryEntryNotFound(String),
}

pub type Result<T> = std::result::Result<T, LayoutError>;
