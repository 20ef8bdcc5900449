use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history file error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("history file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported history version: {0}")]
    UnsupportedVersion(u32),

    #[error("history endpoint returned HTTP {status}")]
    Http { status: u16 },

    #[error("history endpoint unreachable: {0}")]
    Transport(String),

    #[error("history endpoint timed out")]
    Timeout,

    #[error("history endpoint sent an unreadable response: {0}")]
    InvalidResponse(String),

    #[error("malformed history row: {0}")]
    MalformedRow(String),

    #[error("history is disabled in the config")]
    Disabled,

    #[error("history task failed: {0}")]
    Task(String),
}

impl HistoryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HistoryError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            HistoryError::Timeout | HistoryError::Transport(_) => true,
            HistoryError::Http { status } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for HistoryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            HistoryError::Timeout
        } else if let Some(status) = e.status() {
            HistoryError::Http {
                status: status.as_u16(),
            }
        } else if e.is_decode() {
            HistoryError::InvalidResponse(e.to_string())
        } else {
            HistoryError::Transport(e.to_string())
        }
    }
}
