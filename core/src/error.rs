use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The container itself is unreadable past `offset`; no further records can be located.
    #[error("malformed archive at byte {offset}: {reason}")]
    Archive { offset: usize, reason: String },

    /// A single record is unusable; the records after it are still readable.
    #[error("malformed record at byte {offset}: {reason}")]
    RecordParse { offset: usize, reason: String },

    #[error("text extraction failed: {0}")]
    Extract(String),

    #[error("text extraction exceeded {0:?}")]
    ExtractTimeout(Duration),

    #[error("tokenization failed: {0}")]
    Tokenize(String),

    #[error("normalization failed: {0}")]
    Normalize(String),

    #[error("codec error: {0}")]
    Codec(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether the failure is contained to one record or document.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::RecordParse { .. }
                | Error::Extract(_)
                | Error::ExtractTimeout(_)
                | Error::Tokenize(_)
                | Error::Normalize(_)
        )
    }
}

/// Render a caught panic payload as a message.
pub(crate) fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
