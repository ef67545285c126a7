//! Errors raised while producing transcript input.
//!
//! The parser itself is total; only the line source and settings can fail.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    #[error("Failed to read transcript {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid marker {marker:?}: {reason}")]
    InvalidMarker { marker: String, reason: String },
}
