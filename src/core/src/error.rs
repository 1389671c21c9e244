//! Error handling for Pageable Core.
//!
//! This module provides:
//! - A single error type with a stable, machine-readable error code
//! - Severity classification driving how errors are logged
//! - Structured details (page numbers, URLs, HTTP status) and source chaining
//! - Conversions from transport, JSON and configuration errors
//!
//! Programmer errors (a bad page argument, an inconsistent paging
//! configuration) are returned before any event fires or any request is
//! issued. Runtime errors (transport failures, undecodable bodies) are
//! returned after the `request` event and never leave partial state behind.
//!
//! # Usage
//!
//! ```rust,ignore
//! use pageable_core::error::{ErrorCode, PageableError, Result};
//!
//! fn check(page: u64, first_page: u64) -> Result<()> {
//!     if page < first_page {
//!         return Err(PageableError::invalid_page(page.to_string()));
//!     }
//!     Ok(())
//! }
//! ```

use metrics::counter;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tracing::{error, warn};

// ═══════════════════════════════════════════════════════════════════════════════
// Result Type Alias
// ═══════════════════════════════════════════════════════════════════════════════

/// A specialized Result type for paging operations.
pub type Result<T> = std::result::Result<T, PageableError>;

// ═══════════════════════════════════════════════════════════════════════════════
// Error Codes
// ═══════════════════════════════════════════════════════════════════════════════

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Paging Errors (1000-1099)
    InvalidPage,
    InvalidState,
    UnsupportedMode,

    // Transport Errors (3000-3099)
    TransportError,
    TransportTimeout,
    HttpStatus,

    // Serialization Errors (2200-2299)
    SerializationError,
    DeserializationError,

    // Configuration Errors (5000-5099)
    ConfigurationError,
    MissingConfiguration,
    InvalidConfiguration,

    // Internal Errors (9000-9099)
    InternalError,
}

impl ErrorCode {
    /// Get the numeric code for this error.
    pub const fn numeric_code(&self) -> u32 {
        match self {
            Self::InvalidPage => 1000,
            Self::InvalidState => 1001,
            Self::UnsupportedMode => 1002,

            Self::SerializationError => 2200,
            Self::DeserializationError => 2201,

            Self::TransportError => 3000,
            Self::TransportTimeout => 3001,
            Self::HttpStatus => 3002,

            Self::ConfigurationError => 5000,
            Self::MissingConfiguration => 5001,
            Self::InvalidConfiguration => 5002,

            Self::InternalError => 9000,
        }
    }

    /// Check if this error is retryable.
    ///
    /// The core never retries; this is exposed for callers that do.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::TransportError | Self::TransportTimeout | Self::HttpStatus
        )
    }

    /// Whether the error signals a bad argument or configuration rather than
    /// a runtime failure.
    pub const fn is_programmer_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidPage | Self::InvalidState | Self::UnsupportedMode
        )
    }

    /// Get the error category for grouping.
    pub const fn category(&self) -> &'static str {
        match self.numeric_code() {
            1000..=1099 => "paging",
            2200..=2299 => "serialization",
            3000..=3099 => "transport",
            5000..=5099 => "configuration",
            9000..=9099 => "internal",
            _ => "unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Error Severity
// ═══════════════════════════════════════════════════════════════════════════════

/// Severity level for errors (affects logging).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Caller errors (bad page argument)
    Low,
    /// Operational issues (timeouts, HTTP failures)
    Medium,
    /// Undecodable responses, broken configuration
    High,
    /// Bugs
    Critical,
}

impl ErrorSeverity {
    /// Get severity based on error code.
    pub const fn from_code(code: &ErrorCode) -> Self {
        match code {
            ErrorCode::InvalidPage | ErrorCode::InvalidState | ErrorCode::UnsupportedMode => {
                Self::Low
            }

            ErrorCode::TransportError | ErrorCode::TransportTimeout | ErrorCode::HttpStatus => {
                Self::Medium
            }

            ErrorCode::SerializationError
            | ErrorCode::DeserializationError
            | ErrorCode::ConfigurationError
            | ErrorCode::MissingConfiguration
            | ErrorCode::InvalidConfiguration => Self::High,

            ErrorCode::InternalError => Self::Critical,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Error Details
// ═══════════════════════════════════════════════════════════════════════════════

/// Additional structured details about an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Additional context key-value pairs
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,

    /// Page the operation targeted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,

    /// URL of the failed request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// HTTP status returned by the remote resource
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorDetails {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: u64) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Main Error Type
// ═══════════════════════════════════════════════════════════════════════════════

/// The main error type for Pageable Core.
#[derive(Error, Debug)]
pub struct PageableError {
    /// Machine-readable error code
    code: ErrorCode,

    /// Human readable message
    message: Cow<'static, str>,

    /// Detailed internal message (for logging only)
    internal_message: Option<String>,

    /// Additional structured details
    details: ErrorDetails,

    /// The source error that caused this error
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl fmt::Display for PageableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref internal) = self.internal_message {
            write!(f, " (internal: {})", internal)?;
        }
        Ok(())
    }
}

impl PageableError {
    // ─────────────────────────────────────────────────────────────────────────
    // Constructors
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a new error with code and message.
    pub fn new(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> Self {
        let error = Self {
            code,
            message: message.into(),
            internal_message: None,
            details: ErrorDetails::default(),
            source: None,
        };
        error.record_metrics();
        error
    }

    /// Create an error with both a public and an internal message.
    pub fn with_internal(
        code: ErrorCode,
        message: impl Into<Cow<'static, str>>,
        internal_message: impl Into<String>,
    ) -> Self {
        let mut error = Self::new(code, message);
        error.internal_message = Some(internal_message.into());
        error
    }

    /// A page argument that is not a valid page identifier.
    pub fn invalid_page(target: impl Into<String>) -> Self {
        let target = target.into();
        Self::new(ErrorCode::InvalidPage, format!("invalid page: {}", target))
            .with_context("target", &target)
    }

    /// A numeric page outside the navigable range.
    pub fn page_out_of_range(page: u64, first_page: u64, last_page: Option<u64>) -> Self {
        let range = match last_page {
            Some(last) => format!("[{}, {}]", first_page, last),
            None => format!("[{}, ..)", first_page),
        };
        Self::new(
            ErrorCode::InvalidPage,
            format!("page {} is outside the navigable range {}", page, range),
        )
        .with_details(ErrorDetails::new().with_page(page))
    }

    /// An inconsistent paging configuration.
    pub fn invalid_state(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorCode::InvalidState, message)
    }

    /// A transport failure for the given URL.
    pub fn transport(url: impl Into<String>, message: impl Into<String>) -> Self {
        let url = url.into();
        Self::with_internal(ErrorCode::TransportError, "request failed", message)
            .with_details(ErrorDetails::new().with_url(url))
    }

    /// A non-success HTTP status.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        let url = url.into();
        Self::new(
            ErrorCode::HttpStatus,
            format!("remote resource answered with status {}", status),
        )
        .with_details(ErrorDetails::new().with_url(url).with_status(status))
    }

    /// A response body that could not be turned into records.
    pub fn deserialization(message: impl Into<String>) -> Self {
        Self::with_internal(
            ErrorCode::DeserializationError,
            "failed to decode response",
            message,
        )
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfiguration, message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_internal(ErrorCode::InternalError, "an internal error occurred", message)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Builder Methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Add a source error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Replace error details, keeping previously recorded context.
    pub fn with_details(mut self, details: ErrorDetails) -> Self {
        let context = std::mem::take(&mut self.details.context);
        self.details = details;
        self.details.context.extend(context);
        self
    }

    /// Add internal message.
    pub fn with_internal_message(mut self, message: impl Into<String>) -> Self {
        self.internal_message = Some(message.into());
        self
    }

    /// Add context to details.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        self.details = self.details.with_context(key, value);
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn internal_message(&self) -> Option<&str> {
        self.internal_message.as_deref()
    }

    pub fn details(&self) -> &ErrorDetails {
        &self.details
    }

    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }

    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::from_code(&self.code)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Logging
    // ─────────────────────────────────────────────────────────────────────────

    /// Log this error with appropriate severity.
    pub fn log(&self) {
        let code = self.code.to_string();
        let category = self.code.category();

        match self.severity() {
            ErrorSeverity::Critical | ErrorSeverity::High => {
                error!(
                    error_code = %code,
                    category = category,
                    message = %self.message,
                    internal_message = ?self.internal_message,
                    details = ?self.details,
                    "paging error"
                );
            }
            ErrorSeverity::Medium => {
                warn!(
                    error_code = %code,
                    category = category,
                    message = %self.message,
                    url = ?self.details.url,
                    status = ?self.details.status,
                    "paging request failed"
                );
            }
            ErrorSeverity::Low => {
                tracing::debug!(
                    error_code = %code,
                    category = category,
                    message = %self.message,
                    "rejected paging call"
                );
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Metrics
    // ─────────────────────────────────────────────────────────────────────────

    fn record_metrics(&self) {
        counter!(
            "pageable_errors_total",
            "code" => self.code.to_string(),
            "category" => self.code.category().to_string(),
        )
        .increment(1);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Error Context Extension
// ═══════════════════════════════════════════════════════════════════════════════

/// Extension trait for attaching an error code and context to foreign errors.
pub trait ErrorContext<T> {
    /// Wrap the error as an internal error with the given message.
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Wrap the error with a specific error code.
    fn with_error_code(self, code: ErrorCode) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let internal = e.to_string();
            PageableError::with_internal(ErrorCode::InternalError, message.into(), internal)
                .with_source(e)
        })
    }

    fn with_error_code(self, code: ErrorCode) -> Result<T> {
        self.map_err(|e| {
            let message = e.to_string();
            PageableError::new(code, message).with_source(e)
        })
    }
}

impl<T> ErrorContext<T> for Option<T> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| PageableError::internal(message))
    }

    fn with_error_code(self, code: ErrorCode) -> Result<T> {
        self.ok_or_else(|| PageableError::new(code, "value not present"))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Conversions
// ═══════════════════════════════════════════════════════════════════════════════

impl From<std::convert::Infallible> for PageableError {
    fn from(never: std::convert::Infallible) -> Self {
        match never {}
    }
}

impl From<serde_json::Error> for PageableError {
    fn from(error: serde_json::Error) -> Self {
        let code = if error.is_data() || error.is_syntax() || error.is_eof() {
            ErrorCode::DeserializationError
        } else {
            ErrorCode::SerializationError
        };

        Self::with_internal(code, "failed to process JSON data", error.to_string())
            .with_source(error)
    }
}

impl From<reqwest::Error> for PageableError {
    fn from(error: reqwest::Error) -> Self {
        let url = error.url().map(|u| u.to_string());
        let (code, message) = if error.is_timeout() {
            (ErrorCode::TransportTimeout, "request timed out")
        } else if error.is_connect() {
            (ErrorCode::TransportError, "failed to connect to remote resource")
        } else if error.is_decode() {
            (ErrorCode::DeserializationError, "failed to decode response body")
        } else if error.is_status() {
            (ErrorCode::HttpStatus, "remote resource returned an error")
        } else {
            (ErrorCode::TransportError, "network error occurred")
        };

        let mut details = ErrorDetails::new();
        if let Some(url) = url {
            details = details.with_url(url);
        }
        if let Some(status) = error.status() {
            details = details.with_status(status.as_u16());
        }

        Self::with_internal(code, message, error.to_string())
            .with_details(details)
            .with_source(error)
    }
}

impl From<config::ConfigError> for PageableError {
    fn from(error: config::ConfigError) -> Self {
        let (code, message) = match &error {
            config::ConfigError::NotFound(_) => (
                ErrorCode::MissingConfiguration,
                "required configuration not found",
            ),
            config::ConfigError::PathParse(_) | config::ConfigError::FileParse { .. } => (
                ErrorCode::InvalidConfiguration,
                "configuration could not be parsed",
            ),
            _ => (ErrorCode::ConfigurationError, "configuration error"),
        };

        Self::with_internal(code, message, error.to_string()).with_source(error)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_is_retryable() {
        assert!(ErrorCode::TransportTimeout.is_retryable());
        assert!(ErrorCode::HttpStatus.is_retryable());
        assert!(!ErrorCode::InvalidPage.is_retryable());
        assert!(!ErrorCode::DeserializationError.is_retryable());
    }

    #[test]
    fn test_programmer_errors() {
        assert!(ErrorCode::InvalidPage.is_programmer_error());
        assert!(ErrorCode::InvalidState.is_programmer_error());
        assert!(!ErrorCode::TransportError.is_programmer_error());
    }

    #[test]
    fn test_invalid_page_carries_target() {
        let error = PageableError::invalid_page("nosuchpage");
        assert_eq!(error.code(), ErrorCode::InvalidPage);
        assert_eq!(
            error.details().context.get("target"),
            Some(&serde_json::json!("nosuchpage"))
        );
    }

    #[test]
    fn test_out_of_range_message() {
        let error = PageableError::page_out_of_range(9, 1, Some(3));
        assert_eq!(error.code(), ErrorCode::InvalidPage);
        assert_eq!(error.details().page, Some(9));
        assert!(error.message().contains("[1, 3]"));

        let open = PageableError::page_out_of_range(0, 1, None);
        assert!(open.message().contains("[1, ..)"));
    }

    #[test]
    fn test_http_status_details() {
        let error = PageableError::http_status("http://example.test/items", 503);
        assert_eq!(error.code(), ErrorCode::HttpStatus);
        assert_eq!(error.details().status, Some(503));
        assert_eq!(error.details().url.as_deref(), Some("http://example.test/items"));
        assert_eq!(error.severity(), ErrorSeverity::Medium);
    }

    #[test]
    fn test_with_details_keeps_context() {
        let error = PageableError::invalid_page("x").with_details(ErrorDetails::new().with_page(4));
        assert_eq!(error.details().page, Some(4));
        assert!(error.details().context.contains_key("target"));
    }

    #[test]
    fn test_error_severity() {
        assert_eq!(ErrorSeverity::from_code(&ErrorCode::InvalidPage), ErrorSeverity::Low);
        assert_eq!(
            ErrorSeverity::from_code(&ErrorCode::TransportError),
            ErrorSeverity::Medium
        );
        assert_eq!(
            ErrorSeverity::from_code(&ErrorCode::DeserializationError),
            ErrorSeverity::High
        );
        assert_eq!(
            ErrorSeverity::from_code(&ErrorCode::InternalError),
            ErrorSeverity::Critical
        );
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let error = PageableError::from(err);
        assert_eq!(error.code(), ErrorCode::DeserializationError);
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_option_context() {
        let missing: Option<u32> = None;
        let error = missing.with_error_code(ErrorCode::InvalidState).unwrap_err();
        assert_eq!(error.code(), ErrorCode::InvalidState);
    }

    #[test]
    fn test_error_display() {
        let error = PageableError::with_internal(
            ErrorCode::TransportError,
            "request failed",
            "connection refused",
        );

        let display = format!("{}", error);
        assert!(display.contains("TransportError"));
        assert!(display.contains("request failed"));
        assert!(display.contains("connection refused"));
    }
}
