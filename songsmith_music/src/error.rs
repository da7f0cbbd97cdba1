// Error type for the I/O-facing parts of the crate.
//
// Generation itself is total (unknown names fall back, unknown progressions
// yield nothing), so only export, project files, and config loading return
// these.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SongsmithError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid project file: {0}")]
    InvalidProject(String),

    #[error("invalid time signature '{0}' (expected N/D, e.g. 4/4)")]
    InvalidTimeSignature(String),
}

pub type Result<T> = std::result::Result<T, SongsmithError>;
