use thiserror::Error;

/// Every failure the client can observe. The `Display` form is the
/// normalized message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API Error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("API Error ({status}): empty response")]
    EmptyResponse { status: u16 },

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("{0}")]
    Validation(String),

    #[error("The server did not accept the request")]
    Rejected,

    #[error("Host credential is not available")]
    MissingCredential,
}

impl AppError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::Api { status: 404, .. })
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Transport(err.to_string())
    }
}
