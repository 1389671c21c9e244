//! Infinite paging over remote collections.
//!
//! This module provides:
//! - `PageState`: paging parameters and their derivation rules
//! - `LinkRegistry`: page number to navigation URL, fed by `Link` headers
//! - `FullCache`: every record fetched so far, sliced into pages
//! - `PageableCollection`: the controller deciding between cache and network
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pageable_core::config::HttpConfig;
//! use pageable_core::pagination::{PageOptions, PageableCollection};
//! use pageable_core::transport::HttpTransport;
//!
//! # async fn run() -> pageable_core::Result<()> {
//! let transport = Arc::new(HttpTransport::new(&HttpConfig::default())?);
//! let mut repos = PageableCollection::<serde_json::Value>::builder(transport)
//!     .url("https://api.github.com/users/rust-lang/repos")
//!     .page_size(30)
//!     .build()?;
//!
//! repos.get_first_page(PageOptions::new()).await?;
//! while repos.get_next_page(PageOptions::new()).await?.is_some() {}
//! println!("{} repositories", repos.full_collection().map_or(0, |full| full.len()));
//! # Ok(())
//! # }
//! ```

mod cache;
mod links;
mod pageable;
mod query;
mod state;
pub mod strategies;

pub use cache::{FullCache, WindowCoverage};
pub use links::{parse_link_header, LinkRegistry, NavigationLinks};
pub use pageable::{PageOutcome, PageSource, PageableCollection, PageableCollectionBuilder};
pub use query::{PageOptions, PageTarget, PagingMode, QueryParams};
pub use state::{total_pages_for, PageState, StateSeed};
pub use strategies::Strategies;

/// Default page size if not specified.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Default index of the first page.
pub const DEFAULT_FIRST_PAGE: u64 = 1;
