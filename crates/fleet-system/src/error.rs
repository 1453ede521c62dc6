//! Error types for fleet-system

/// Result type for fleet-system operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur driving host collaborators.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A host command exited non-zero or could not be spawned
    #[error("running `{command}`: {message}")]
    Command { command: String, message: String },

    /// A user's systemd instance never became ready
    #[error("timeout waiting for user manager of {name}")]
    ManagerTimeout { name: String },

    /// Git error from libgit2
    #[error(transparent)]
    Git(#[from] git2::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
