//! Error types for persona-lens
//!
//! Provides structured error handling with:
//! - Numeric error codes for machine parsing
//! - User-friendly messages with suggestions
//! - Exit codes for CLI
//!
//! Degraded conditions (avatar fetch, font lookup) are recovered with
//! fallback resources inside the renderers and never abort a render;
//! everything else in this module is a hard failure of the operation
//! that raised it.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for persona-lens operations
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric error codes for machine parsing and documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Configuration errors (1xx)
    ConfigNotFound = 100,
    ConfigParseError = 101,
    ConfigValidation = 102,

    // IO errors (2xx)
    IoRead = 200,
    IoWrite = 201,
    IoPermission = 202,
    IoNotFound = 203,

    // Fetch errors (3xx)
    FetchFailed = 300,
    FetchTimeout = 301,
    FetchStatus = 302,

    // Document errors (4xx)
    DocumentParse = 400,
    DocumentEmpty = 401,
    InvalidProfileUrl = 402,

    // Render errors (5xx)
    FontLoadFailed = 500,
    ImageEncodeFailed = 501,
    RenderFailed = 502,

    // Internal errors (9xx)
    InternalError = 900,
}

impl ErrorCode {
    /// Get the string code (e.g., "E100")
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Get the exit code for CLI (maps to 1-125 range)
    pub fn exit_code(&self) -> i32 {
        match *self as u16 {
            100..=199 => 10, // Config errors
            200..=299 => 20, // IO errors
            300..=399 => 30, // Fetch errors
            400..=499 => 40, // Document errors
            500..=599 => 50, // Render errors
            900..=999 => 90, // Internal errors
            _ => 1,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for persona-lens
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration parse error
    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    /// Configuration validation error
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String, field: Option<String> },

    // ─────────────────────────────────────────────────────────────
    // IO Errors
    // ─────────────────────────────────────────────────────────────

    /// File read error
    #[error("Failed to read file: {path}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File write error
    #[error("Failed to write file: {path}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    // ─────────────────────────────────────────────────────────────
    // Fetch Errors
    // ─────────────────────────────────────────────────────────────

    /// Avatar fetch failed (network / transport level)
    #[error("Failed to fetch {url}: {message}")]
    FetchFailed { url: String, message: String },

    /// Avatar fetch timed out
    #[error("Fetching {url} timed out after {timeout_secs}s")]
    FetchTimeout { url: String, timeout_secs: u64 },

    /// Avatar fetch returned a non-success HTTP status
    #[error("Fetching {url} returned HTTP {status}")]
    FetchStatus { url: String, status: u16 },

    // ─────────────────────────────────────────────────────────────
    // Document Errors
    // ─────────────────────────────────────────────────────────────

    /// Persona bundle could not be parsed
    #[error("Failed to parse persona document: {message}")]
    DocumentParse { message: String },

    /// Persona document has no renderable section at all
    #[error("Persona document for '{username}' has no renderable content")]
    DocumentEmpty { username: String },

    /// Not a valid Reddit profile URL
    #[error("Invalid Reddit profile URL: {url}")]
    InvalidProfileUrl { url: String },

    // ─────────────────────────────────────────────────────────────
    // Render Errors
    // ─────────────────────────────────────────────────────────────

    /// Font could not be loaded, including the bundled fallback
    #[error("Failed to load font '{name}': {message}")]
    FontLoadFailed { name: String, message: String },

    /// Card image encoding failed
    #[error("Failed to encode card image: {0}")]
    ImageEncode(#[from] image::ImageError),

    /// Any other fatal drawing error
    #[error("Render failed: {0}")]
    Render(String),

    // ─────────────────────────────────────────────────────────────
    // Internal Errors
    // ─────────────────────────────────────────────────────────────

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get the numeric error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Error::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Error::ConfigValidation { .. } => ErrorCode::ConfigValidation,

            Error::IoRead { .. } => ErrorCode::IoRead,
            Error::IoWrite { .. } => ErrorCode::IoWrite,
            Error::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => ErrorCode::IoNotFound,
                std::io::ErrorKind::PermissionDenied => ErrorCode::IoPermission,
                _ => ErrorCode::IoRead,
            },
            Error::Toml(_) => ErrorCode::ConfigParseError,

            Error::FetchFailed { .. } => ErrorCode::FetchFailed,
            Error::FetchTimeout { .. } => ErrorCode::FetchTimeout,
            Error::FetchStatus { .. } => ErrorCode::FetchStatus,

            Error::DocumentParse { .. } => ErrorCode::DocumentParse,
            Error::DocumentEmpty { .. } => ErrorCode::DocumentEmpty,
            Error::InvalidProfileUrl { .. } => ErrorCode::InvalidProfileUrl,

            Error::FontLoadFailed { .. } => ErrorCode::FontLoadFailed,
            Error::ImageEncode(_) => ErrorCode::ImageEncodeFailed,
            Error::Render(_) => ErrorCode::RenderFailed,

            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Whether this error class is absorbed by a fallback resource when it
    /// occurs inside a render (avatar fetch, font lookup). Callers seeing
    /// one of these at the top level hit it outside a render context.
    pub fn is_degraded(&self) -> bool {
        matches!(
            self,
            Error::FetchFailed { .. }
                | Error::FetchTimeout { .. }
                | Error::FetchStatus { .. }
                | Error::FontLoadFailed { .. }
        )
    }

    /// Check if the error is fatal to the whole render (no partial artifact)
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::ConfigNotFound { .. }
                | Error::ConfigParse { .. }
                | Error::ConfigValidation { .. }
                | Error::DocumentParse { .. }
                | Error::DocumentEmpty { .. }
                | Error::ImageEncode(_)
                | Error::Render(_)
                | Error::Internal(_)
        )
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    /// Get a user-friendly suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::ConfigNotFound { .. } => Some(
                "Run 'persona-lens config init' to create a default configuration file."
            ),
            Error::ConfigParse { .. } => Some(
                "Check your configuration file syntax. Run 'persona-lens config validate' to see details."
            ),
            Error::ConfigValidation { .. } => Some(
                "Review the configuration file and fix the invalid values."
            ),
            Error::DocumentParse { .. } => Some(
                "The persona bundle must be JSON with 'profile' and 'persona' objects. Check the input file."
            ),
            Error::DocumentEmpty { .. } => Some(
                "The analysis produced no attributes. Nothing can be rendered for this user."
            ),
            Error::InvalidProfileUrl { .. } => Some(
                "Expected a URL like https://www.reddit.com/user/<name>/ or a bare username."
            ),
            Error::FontLoadFailed { .. } => Some(
                "Check the font paths under [card] in the configuration, or remove them to use the bundled fonts."
            ),
            _ => None,
        }
    }

    /// Format the error for terminal display with colors
    pub fn format_for_terminal(&self) -> String {
        let mut output = format!("\x1b[31mError [{}]\x1b[0m: {}\n", self.code().as_str(), self);
        if let Some(hint) = self.suggestion() {
            output.push_str(&format!("\n\x1b[33mHint\x1b[0m: {}\n", hint));
        }
        output
    }

    /// Format the error for logging (no colors)
    pub fn format_for_log(&self) -> String {
        format!("[{}] {}", self.code().as_str(), self)
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Constructors (for ergonomic error creation)
// ─────────────────────────────────────────────────────────────────

impl Error {
    /// Create a config parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Error::ConfigParse { message: message.into() }
    }

    /// Create a config validation error with field name
    pub fn config_field_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a fetch failed error
    pub fn fetch_failed(url: impl Into<String>, message: impl Into<String>) -> Self {
        Error::FetchFailed {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a document parse error
    pub fn document_parse(message: impl Into<String>) -> Self {
        Error::DocumentParse { message: message.into() }
    }

    /// Create a font load error
    pub fn font_load(name: impl Into<String>, message: impl Into<String>) -> Self {
        Error::FontLoadFailed {
            name: name.into(),
            message: message.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_format() {
        assert_eq!(ErrorCode::ConfigNotFound.as_str(), "E100");
        assert_eq!(ErrorCode::FetchFailed.as_str(), "E300");
        assert_eq!(ErrorCode::DocumentEmpty.as_str(), "E401");
        assert_eq!(ErrorCode::InternalError.as_str(), "E900");
    }

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(ErrorCode::ConfigNotFound.exit_code(), 10);
        assert_eq!(ErrorCode::IoRead.exit_code(), 20);
        assert_eq!(ErrorCode::FetchFailed.exit_code(), 30);
        assert_eq!(ErrorCode::DocumentParse.exit_code(), 40);
        assert_eq!(ErrorCode::RenderFailed.exit_code(), 50);
        assert_eq!(ErrorCode::InternalError.exit_code(), 90);
    }

    #[test]
    fn test_error_codes() {
        let err = Error::fetch_failed("https://example.com/a.png", "refused");
        assert_eq!(err.code(), ErrorCode::FetchFailed);

        let err = Error::document_parse("missing field");
        assert_eq!(err.code(), ErrorCode::DocumentParse);

        let err = Error::DocumentEmpty { username: "kojied".into() };
        assert_eq!(err.code(), ErrorCode::DocumentEmpty);
    }

    #[test]
    fn test_error_degraded() {
        assert!(Error::fetch_failed("url", "test").is_degraded());
        assert!(Error::font_load("DejaVu", "bad table").is_degraded());
        assert!(!Error::document_parse("x").is_degraded());
    }

    #[test]
    fn test_error_fatal() {
        assert!(Error::document_parse("x").is_fatal());
        assert!(Error::DocumentEmpty { username: "u".into() }.is_fatal());
        assert!(!Error::fetch_failed("url", "test").is_fatal());
        assert!(!Error::font_load("DejaVu", "missing").is_fatal());
    }

    #[test]
    fn test_error_suggestions() {
        let err = Error::document_parse("bad json");
        assert!(err.suggestion().is_some());
        assert!(err.suggestion().unwrap().contains("JSON"));
    }

    #[test]
    fn test_format_for_terminal() {
        let err = Error::ConfigNotFound { path: PathBuf::from("/test/config.toml") };
        let formatted = err.format_for_terminal();
        assert!(formatted.contains("E100"));
        assert!(formatted.contains("\x1b[31m"));
        assert!(formatted.contains("Hint"));
    }

    #[test]
    fn test_format_for_log() {
        let err = Error::ConfigNotFound { path: PathBuf::from("/test/config.toml") };
        let formatted = err.format_for_log();
        assert!(formatted.contains("[E100]"));
        assert!(!formatted.contains("\x1b["));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert_eq!(err.code(), ErrorCode::IoNotFound);
    }
}
