#![allow(clippy::result_large_err)]
//! # Pageable Core
//!
//! Paging and state synchronization for remote record collections.
//!
//! ## Architecture
//!
//! - **Collection**: ordered, deduplicated records with change events
//! - **Pagination**: page state, link registry, full cache and the paging controller
//! - **Transport**: fetching pages from the remote resource (HTTP via reqwest)
//! - **Telemetry**: structured logging
//! - **Config**: file and environment based configuration

pub mod collection;
pub mod config;
pub mod error;
pub mod pagination;
pub mod telemetry;
pub mod transport;

pub use error::{ErrorCode, ErrorContext, ErrorDetails, ErrorSeverity, PageableError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::collection::{
        Collection, CollectionEvent, EventFilter, EventKind, Record, RecordId, Subscription,
    };
    pub use crate::config::Config;
    pub use crate::error::{ErrorCode, ErrorContext, PageableError, Result};
    pub use crate::pagination::{
        FullCache, LinkRegistry, NavigationLinks, PageOptions, PageOutcome, PageSource,
        PageState, PageTarget, PageableCollection, PagingMode, QueryParams, StateSeed,
    };
    pub use crate::transport::{FetchRequest, FetchResponse, HttpTransport, Transport};
}
