//! Error types for Chart Cycles
//!
//! This module defines the error types for all components of the application.
//! None of them cross the resolution boundary: the release assembler folds
//! fetch, probe and path failures into a `ResolutionResult` instead.

use std::path::PathBuf;
use thiserror::Error;

/// Metadata fetch errors
#[derive(Error, Debug)]
pub enum FetchError {
    /// HTTP request error
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),

    /// Metadata service returned a non-success status
    #[error("Metadata service error: HTTP {status}")]
    ServerError { status: u16 },

    /// Fetch did not complete in time
    #[error("Metadata fetch timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// Endpoint URL could not be built
    #[error("Invalid URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },

    /// Response body was not the expected document
    #[error("Malformed metadata document")]
    Decode(#[from] serde_json::Error),

    /// Response parsed but carried no usable cycle records
    #[error("Metadata service returned no usable records for {type_code}")]
    Empty { type_code: String },
}

/// HTTP client construction errors
#[derive(Error, Debug)]
pub enum ClientError {
    /// Underlying client builder failed
    #[error("Failed to build HTTP client")]
    Http(#[from] reqwest::Error),

    /// Proxy settings could not be turned into a proxy
    #[error("Invalid proxy {host}:{port}")]
    InvalidProxy { host: String, port: u16 },

    /// Rate limit was zero
    #[error("Rate limit must be non-zero")]
    ZeroRateLimit,

    /// Base URL could not be parsed
    #[error("Invalid base URL: {url} - {error}")]
    InvalidBaseUrl { url: String, error: String },
}

/// Naming table and template errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NamingError {
    /// Template references a placeholder that does not exist
    #[error("Unknown placeholder {{{name}}} in template \"{template}\"")]
    UnknownPlaceholder { name: String, template: String },

    /// Template has an opening brace without a closing one
    #[error("Unterminated placeholder in template \"{template}\"")]
    UnterminatedPlaceholder { template: String },

    /// Template needs a cycle number the record does not carry
    #[error("Template \"{template}\" requires a cycle number")]
    MissingCycleNumber { template: String },

    /// Index cannot be expressed as a volume letter
    #[error("Index {index} cannot be rendered as a letter")]
    LetterOutOfRange { index: u32 },

    /// Step must be at least one
    #[error("Invalid step {step} for {family} rule")]
    InvalidStep { family: String, step: u32 },

    /// Unknown product family name
    #[error("Unknown product family: {name}")]
    UnknownFamily { name: String },

    /// Unknown value for an enumerated request field
    #[error("Unknown {field}: {value}")]
    UnknownValue { field: &'static str, value: String },
}

/// Candidate path construction errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A path segment was empty or contained a separator
    #[error("Invalid path segment \"{segment}\"")]
    InvalidSegment { segment: String },

    /// Relative path could not be joined onto the product base URL
    #[error("Malformed path {path}: {error}")]
    Malformed { path: String, error: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid configuration format
    #[error("Invalid configuration format")]
    InvalidFormat(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// Naming table rejected by validation
    #[error("Invalid naming table")]
    Naming(#[from] NamingError),

    /// Configuration file could not be read or written
    #[error("Configuration file I/O failed: {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Metadata fetch error
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// HTTP client error
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Naming error
    #[error(transparent)]
    Naming(#[from] NamingError),

    /// Path error
    #[error(transparent)]
    Path(#[from] PathError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Output serialization error
    #[error("Failed to serialize output")]
    Serialize(#[from] serde_json::Error),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Check if the error is recoverable (transient)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::Fetch(FetchError::Http(_))
                | AppError::Fetch(FetchError::Timeout { .. })
                | AppError::Fetch(FetchError::ServerError { .. })
                | AppError::Fetch(FetchError::Empty { .. })
        )
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Fetch(_) => "metadata",
            AppError::Client(_) => "client",
            AppError::Naming(_) => "naming",
            AppError::Path(_) => "path",
            AppError::Config(_) => "config",
            AppError::Serialize(_) => "output",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Metadata fetch result type alias
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Client construction result type alias
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Naming result type alias
pub type NamingResult<T> = std::result::Result<T, NamingError>;

/// Path result type alias
pub type PathResult<T> = std::result::Result<T, PathError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
