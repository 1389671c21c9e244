//! Telemetry: structured logging.
//!
//! Counters are emitted through the `metrics` facade at the call sites; the
//! embedding application decides whether and where to export them.
//!
//! # Example
//!
//! ```rust,no_run
//! use pageable_core::telemetry::{init_logging, LoggingConfig};
//!
//! init_logging(&LoggingConfig::default()).expect("Failed to initialize logging");
//! ```

pub mod logging;

pub use logging::{init_logging, LogFormat, LoggingConfig};
