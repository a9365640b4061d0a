use thiserror::Error;

/// Unified error type for gha-version-updater operations
#[derive(Error, Debug)]
pub enum UpdaterError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API error: {message} (status: {status})")]
    Api { status: u16, message: String },

    #[error("Unexpected API response: {0}")]
    Response(String),

    #[error("Invalid workflow YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported action reference: {0}")]
    Reference(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in gha-version-updater
pub type Result<T> = std::result::Result<T, UpdaterError>;

impl UpdaterError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        UpdaterError::Config(msg.into())
    }

    /// Create an error for a response that lacks an expected field
    pub fn response(msg: impl Into<String>) -> Self {
        UpdaterError::Response(msg.into())
    }

    /// Create an error naming a reference token that cannot be split
    pub fn reference(token: impl Into<String>) -> Self {
        UpdaterError::Reference(token.into())
    }

    /// Create an API error from a status code and response body
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        UpdaterError::Api {
            status,
            message: message.into(),
        }
    }
}
