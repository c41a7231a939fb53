//! Error types shared by every module.

/// Failure of a single HTTP exchange.
///
/// A request resolves exactly once: either a 2xx response, or one of these.
#[derive(thiserror::Error, Debug)]
pub enum HttpError {
    /// The server answered with a status outside 200..=299.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// No response arrived (DNS, connect, TLS, body read).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl HttpError {
    /// Status code of the failed exchange, `0` when the transport failed
    /// before any status line was read.
    pub fn status(&self) -> u16 {
        match self {
            HttpError::Status { status, .. } => *status,
            HttpError::Transport(e) => e.status().map(|s| s.as_u16()).unwrap_or(0),
        }
    }

    /// Response body of a status failure.
    pub fn body(&self) -> Option<&str> {
        match self {
            HttpError::Status { body, .. } => Some(body),
            HttpError::Transport(_) => None,
        }
    }
}

/// Errors that can occur in the library.
#[derive(thiserror::Error, Debug)]
pub enum FuwuError {
    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for FuwuError {
    fn from(e: reqwest::Error) -> Self {
        FuwuError::Http(HttpError::Transport(e))
    }
}

/// Convenience result type.
pub type FuwuResult<T> = Result<T, FuwuError>;
