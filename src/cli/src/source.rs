//! Building a pageable collection from configuration and arguments.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use serde_json::Value;
use std::sync::Arc;

use pageable_core::config::Config;
use pageable_core::pagination::{PageableCollection, PagingMode};
use pageable_core::transport::HttpTransport;

/// Paging mode selection.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// Accumulate pages in a local cache
    Infinite,
    /// Fetch on every page turn
    Server,
}

impl From<ModeArg> for PagingMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Infinite => PagingMode::Infinite,
            ModeArg::Server => PagingMode::Server,
        }
    }
}

/// Where and how to page. Unset options fall back to configuration.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// URL of the remote collection
    #[arg(env = "PAGEABLE_URL")]
    pub url: Option<String>,

    /// Records per page
    #[arg(short = 's', long)]
    pub page_size: Option<u64>,

    /// Index of the first page (0 or 1)
    #[arg(long)]
    pub first_page: Option<u64>,

    /// Paging mode
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,
}

impl SourceArgs {
    /// Apply the arguments on top of `config`.
    pub fn merge_into(&self, config: &mut Config) {
        if let Some(url) = &self.url {
            config.source.url = Some(url.clone());
        }
        if let Some(page_size) = self.page_size {
            config.state.page_size = page_size;
        }
        if let Some(first_page) = self.first_page {
            config.state.first_page = first_page;
        }
        if let Some(mode) = self.mode {
            config.source.mode = mode.into();
        }
    }
}

/// Open the remote collection described by `config` and `args`.
pub fn open(args: &SourceArgs, config: &Config) -> Result<PageableCollection<Value>> {
    let mut config = config.clone();
    args.merge_into(&mut config);

    if config.source.url.is_none() {
        anyhow::bail!("no collection URL given (pass one or set PAGEABLE__SOURCE__URL)");
    }

    let transport =
        Arc::new(HttpTransport::new(&config.http).context("Failed to create HTTP client")?);

    PageableCollection::builder(transport)
        .configure(&config)
        .build()
        .context("Failed to set up paging")
}
