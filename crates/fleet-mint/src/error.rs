//! Error types for the key minter

/// Result type for minter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading credentials or talking to the key API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The credential env file could not be read
    #[error("reading credentials {path}: {source}")]
    CredentialsRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A required variable is absent from the credential env file
    #[error("{name} not set in {path}")]
    MissingCredential { name: String, path: String },

    /// The API answered with a non-success status
    #[error("{endpoint} returned {status}: {body}")]
    Api {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    /// The API answered 200 but without the field we need
    #[error("empty {field} in {endpoint} response")]
    EmptyField {
        endpoint: &'static str,
        field: &'static str,
    },

    /// Transport-level HTTP failure
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
