//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Block error: {0}")]
    Block(#[from] storefront_blocks::BlockError),

    #[error("Layout error: {0}")]
    Layout(#[from] storefront_layout::LayoutError),

    #[error("Preset not found: {0}")]
    PresetNotFound(String),

    #[error("Section not found: {0}")]
    SectionNotFound(String),

    #[error("Preview channel closed")]
    PreviewClosed,
}
