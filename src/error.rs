//! Error types for the apabi-downloader application.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    // Remote site errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Expected field '{field}' missing from {context}")]
    MissingField { field: String, context: String },

    #[error("Failed to parse remote response: {0}")]
    Parse(String),

    #[error("Page still denied after {0} consecutive re-authentications")]
    ReauthLimit(u32),

    #[error("Unexpected HTTP {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    // Storage errors
    #[error("Storage error at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid filename (path traversal attempt): {0}")]
    InvalidFilename(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // URL parsing errors
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    /// Shorthand for a field absent from a remote document.
    pub fn missing_field(field: impl Into<String>, context: impl Into<String>) -> Self {
        Error::MissingField {
            field: field.into(),
            context: context.into(),
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Process exit codes.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const API_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const DOWNLOAD_ERROR: i32 = 4;
    pub const UNEXPECTED_ERROR: i32 = 5;
}
