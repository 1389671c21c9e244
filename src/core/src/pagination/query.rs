//! Request-side paging vocabulary.
//!
//! This module provides:
//! - The paging mode selector
//! - Query parameter names used when building fetch requests
//! - Page targets (`3`, `"first"`, `"next"`, ...) and per-call options

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{ErrorCode, PageableError};

// ═══════════════════════════════════════════════════════════════════════════════
// Paging Mode
// ═══════════════════════════════════════════════════════════════════════════════

/// How pages relate to the remote resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PagingMode {
    /// Fetched pages accumulate in a full cache and are served from it.
    #[default]
    Infinite,
    /// Every page turn is a fetch; nothing is cached.
    Server,
}

impl fmt::Display for PagingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Infinite => write!(f, "infinite"),
            Self::Server => write!(f, "server"),
        }
    }
}

impl FromStr for PagingMode {
    type Err = PageableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "infinite" => Ok(Self::Infinite),
            "server" => Ok(Self::Server),
            other => Err(PageableError::new(
                ErrorCode::UnsupportedMode,
                format!("unsupported paging mode: {}", other),
            )),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Query Parameters
// ═══════════════════════════════════════════════════════════════════════════════

/// Names of the query parameters and envelope fields exchanged with the
/// remote resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryParams {
    /// Request parameter carrying the page number.
    pub current_page: String,
    /// Request parameter carrying the page size.
    pub page_size: String,
    /// Envelope field carrying the total page count.
    pub total_pages: String,
    /// Envelope field carrying the total record count.
    pub total_records: String,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            current_page: "page".to_string(),
            page_size: "per_page".to_string(),
            total_pages: "total_pages".to_string(),
            total_records: "total_entries".to_string(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Page Target
// ═══════════════════════════════════════════════════════════════════════════════

/// A page to navigate to, absolute or relative to the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTarget {
    Number(u64),
    First,
    Previous,
    Next,
    Last,
}

impl fmt::Display for PageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::First => write!(f, "first"),
            Self::Previous => write!(f, "prev"),
            Self::Next => write!(f, "next"),
            Self::Last => write!(f, "last"),
        }
    }
}

impl FromStr for PageTarget {
    type Err = PageableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "first" => Ok(Self::First),
            "prev" | "previous" => Ok(Self::Previous),
            "next" => Ok(Self::Next),
            "last" => Ok(Self::Last),
            other => other
                .parse::<u64>()
                .map(Self::Number)
                .map_err(|_| PageableError::invalid_page(other)),
        }
    }
}

impl From<u64> for PageTarget {
    fn from(page: u64) -> Self {
        Self::Number(page)
    }
}

impl TryFrom<i64> for PageTarget {
    type Error = PageableError;

    fn try_from(page: i64) -> Result<Self, Self::Error> {
        u64::try_from(page)
            .map(Self::Number)
            .map_err(|_| PageableError::invalid_page(page.to_string()))
    }
}

impl TryFrom<i32> for PageTarget {
    type Error = PageableError;

    fn try_from(page: i32) -> Result<Self, Self::Error> {
        Self::try_from(i64::from(page))
    }
}

impl TryFrom<&str> for PageTarget {
    type Error = PageableError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl TryFrom<String> for PageTarget {
    type Error = PageableError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Page Options
// ═══════════════════════════════════════════════════════════════════════════════

/// Per-call options for page requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageOptions {
    /// Bypass the full cache and always hit the network.
    pub fetch: bool,
    /// Extra query parameters. They take precedence over the paging
    /// parameters derived from the state.
    pub params: BTreeMap<String, String>,
}

impl PageOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn force_fetch(mut self) -> Self {
        self.fetch = true;
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}
