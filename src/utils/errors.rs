use thiserror::Error;

/// Main error type for Guichet
#[derive(Error, Debug)]
pub enum GuichetError {
    /// The server could not be reached or the request timed out
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// No usable bearer token, or the server refused it
    #[error("Not authenticated: {0}")]
    Unauthorized(String),

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Unsupported language code: {0}")]
    InvalidLanguage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GuichetError {
    /// Network unreachable or timeout
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// The server saw the request and said no
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. } | Self::Unauthorized(_))
    }
}

impl From<reqwest::Error> for GuichetError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Rejected {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GuichetError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GuichetError>;
