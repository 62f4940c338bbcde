//! Error types for the Bananatag API client
//!
//! Every public operation returns `Result<T, Error>` where Error is defined here.
//! Errors fall into four families (see [`ErrorKind`]): configuration problems
//! raised at construction, validation failures raised before any I/O, transport
//! failures, and application errors reported by the API in its JSON envelope.

use thiserror::Error;

/// The main error type for the client
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("401 (Unauthorized): missing {field}; both an auth ID and an access key are required")]
    MissingCredential { field: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Validation Errors
    // ============================================================================
    #[error("400 (Bad request): '{field}' must be in format yyyy-mm-dd, got '{value}'")]
    InvalidDateFormat { field: String, value: String },

    #[error("400 (Bad request): start date {start} is after end date {end}")]
    DateOrder { start: String, end: String },

    #[error("400 (Bad request): '{field}' must be either 'true' or 'false', got '{value}'")]
    InvalidFlag { field: String, value: String },

    #[error("Missing required message field: {field}")]
    MissingField { field: String },

    #[error("Only one recipient address is allowed, got {count}")]
    TooManyRecipients { count: usize },

    #[error("Invalid attachment #{index}: {message}")]
    InvalidAttachment { index: usize, message: String },

    #[error("Invalid address in '{field}': {message}")]
    InvalidAddress { field: String, message: String },

    #[error("Failed to build message: {message}")]
    MessageBuild { message: String },

    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Application Errors
    // ============================================================================
    #[error("{code} ({error}): {message}")]
    Api {
        code: u16,
        error: String,
        message: String,
    },

    // ============================================================================
    // Internal Errors
    // ============================================================================
    #[error("Signature generation failed: {message}")]
    Signature { message: String },

    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Broad classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad or missing client configuration, raised at construction
    Configuration,
    /// Bad input, raised before any network call
    Validation,
    /// Network, timeout or undecodable response
    Transport,
    /// The API answered with an error code in its envelope
    Application,
    /// Anything else
    Internal,
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing credential error
    pub fn missing_credential(field: impl Into<String>) -> Self {
        Self::MissingCredential {
            field: field.into(),
        }
    }

    /// Create a missing message field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create an attachment validation error
    pub fn attachment(index: usize, message: impl Into<String>) -> Self {
        Self::InvalidAttachment {
            index,
            message: message.into(),
        }
    }

    /// Create a message build error
    pub fn message_build(message: impl Into<String>) -> Self {
        Self::MessageBuild {
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create an application error from the API envelope
    pub fn api(code: u16, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            code,
            error: error.into(),
            message: message.into(),
        }
    }

    /// Create a signature error
    pub fn signature(message: impl Into<String>) -> Self {
        Self::Signature {
            message: message.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config { .. }
            | Error::MissingCredential { .. }
            | Error::YamlParse(_)
            | Error::InvalidUrl(_) => ErrorKind::Configuration,

            Error::InvalidDateFormat { .. }
            | Error::DateOrder { .. }
            | Error::InvalidFlag { .. }
            | Error::MissingField { .. }
            | Error::TooManyRecipients { .. }
            | Error::InvalidAttachment { .. }
            | Error::InvalidAddress { .. }
            | Error::MessageBuild { .. } => ErrorKind::Validation,

            Error::Http(_)
            | Error::Timeout { .. }
            | Error::Decode { .. }
            | Error::JsonParse(_)
            | Error::Io(_) => ErrorKind::Transport,

            Error::Api { .. } => ErrorKind::Application,

            Error::Signature { .. } | Error::Other(_) | Error::Anyhow(_) => ErrorKind::Internal,
        }
    }

    /// Check if this error was raised before any request left the client
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    /// The API error code, for application errors
    pub fn api_code(&self) -> Option<u16> {
        match self {
            Error::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Result type alias for the client
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
