use thiserror::Error;

/// Failures of a remote call or of a pipeline step.
///
/// `AuthExpired` ends the session, `Input` sends the user back to the start
/// without any remote call, everything else is reported as a generic failure.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("access token was rejected and could not be renewed")]
    AuthExpired,

    #[error("remote call failed with status {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("invalid input: {0}")]
    Input(String),

    #[error("http transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl PipelineError {
    pub fn input(message: impl Into<String>) -> Self {
        PipelineError::Input(message.into())
    }

    pub fn is_auth_expired(&self) -> bool {
        matches!(self, PipelineError::AuthExpired)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("storage task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}
