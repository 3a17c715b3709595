//! Common error types for the page info engine

use thiserror::Error;

/// Common result type for page info operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while discovering, building or registering navigation data.
///
/// Lookups never use this type for "not found"; they return `Option`.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Handler manifest could not be parsed
    #[error("Manifest error: {0}")]
    Manifest(#[from] toml::de::Error),

    /// Malformed registration argument (empty redirect or target URL, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Same redirect source registered for two different targets
    #[error("Cannot add redirection for '{source_url}': already targets '{existing}', refused '{requested}'")]
    RedirectConflict {
        source_url: String,
        existing: String,
        requested: String,
    },

    /// Two active handlers declare the same route key
    #[error("Duplicate route key '{key}' declared by {first} and {second}")]
    DuplicateKey {
        key: String,
        first: String,
        second: String,
    },

    /// Fatal failure of the full discovery pass; the locale stays unbuilt
    #[error("Metadata discovery failed: {0}")]
    Discovery(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),
}
