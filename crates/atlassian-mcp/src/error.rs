use std::path::PathBuf;

/// Errors raised while assembling the process configuration.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0} environment variable not set")]
    MissingEnv(String),

    #[error("{name} is invalid: {reason}")]
    InvalidConfig { name: String, reason: String },

    #[error("Failed to read teams file {}: {reason}", .path.display())]
    TeamsFile { path: PathBuf, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}
