//! Error type for the crate.
//!
//! Platform failures pass through with their meaning intact; a lookup
//! that simply finds nothing is not an error (callers get `None`,
//! `false` or an empty map instead).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing or unusable connection settings.
    #[error("config: {0}")]
    Config(String),

    /// Logging could not be set up, or was set up twice.
    #[error("logging: {0}")]
    Logging(String),

    /// Transport-level HTTP failure.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Non-success response from the management platform.
    #[error("api error {status}: {message}")]
    Api { status: u16, message: String },

    /// Rejected credentials or missing session.
    #[error("authentication: {0}")]
    Auth(String),

    /// Response body did not match the expected shape.
    #[error(transparent)]
    Parse(#[from] serde_json::Error),

    /// Malformed VM creation timestamp.
    #[error("invalid creation date: {0}")]
    DateParse(#[from] chrono::ParseError),

    /// A custom-field name resolved to more than one key.
    #[error("custom field name maps to more than one value: {0}")]
    DuplicateField(String),

    /// Inventory kind this transport cannot enumerate.
    #[error("unsupported inventory kind: {0}")]
    UnsupportedKind(String),
}

pub type Result<T> = std::result::Result<T, Error>;
