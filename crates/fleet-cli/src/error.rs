//! Error types for the CLI

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors surfaced to the user as a single red line.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// A message for the user, with no underlying cause worth chaining
    #[error("{0}")]
    User(String),

    /// Core reconciliation error
    #[error(transparent)]
    Core(#[from] fleet_core::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn user(message: impl Into<String>) -> Self {
        Self::User(message.into())
    }
}
