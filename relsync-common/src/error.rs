use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum RelsyncError {
    #[error("I/O Error: {0}")]
    Io(#[from] Arc<std::io::Error>),

    #[error("HTTP Request Error: {0}")]
    Http(#[from] Arc<reqwest::Error>),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] Arc<serde_json::Error>),

    #[error("Directory Walk Error: {0}")]
    Walk(#[from] Arc<walkdir::Error>),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Missing Credentials: {0}")]
    MissingCredentials(String),

    #[error("Release Not Found: no release tagged '{tag}' in {repo}")]
    ReleaseNotFound { tag: String, repo: String },

    #[error("Precondition Failed: {0}")]
    Precondition(String),

    #[error("Multiple manifests found in {dir}: {names:?}")]
    MultipleManifests { dir: String, names: Vec<String> },

    #[error("HttpError: {0}")]
    HttpError(String),

    #[error("API Error: {status} from {url}: {body}")]
    ApiStatus {
        status: u16,
        url: String,
        body: String,
    },

    #[error("Build environment setup failed: {0}")]
    BuildEnvError(String),

    #[error("Failed to execute command: {0}")]
    CommandExecError(String),

    #[error("Archive Error: {0}")]
    Archive(String),

    #[error("Validation Error: {0}")]
    ValidationError(String),

    #[error("IoError: {0}")]
    IoError(String),
}

impl From<std::io::Error> for RelsyncError {
    fn from(err: std::io::Error) -> Self {
        RelsyncError::Io(Arc::new(err))
    }
}

impl From<reqwest::Error> for RelsyncError {
    fn from(err: reqwest::Error) -> Self {
        RelsyncError::Http(Arc::new(err))
    }
}

impl From<serde_json::Error> for RelsyncError {
    fn from(err: serde_json::Error) -> Self {
        RelsyncError::Json(Arc::new(err))
    }
}

impl From<walkdir::Error> for RelsyncError {
    fn from(err: walkdir::Error) -> Self {
        RelsyncError::Walk(Arc::new(err))
    }
}

pub type Result<T> = std::result::Result<T, RelsyncError>;
