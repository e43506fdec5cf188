//! Error types for the block model

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BlockError {
    #[error("Invalid block JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown block type: {0}")]
    UnknownType(String),

    #[error("Unknown device: {0}")]
    UnknownDevice(String),
}
