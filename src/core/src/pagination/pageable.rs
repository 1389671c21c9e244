//! The paging controller.
//!
//! A [`PageableCollection`] owns the visible page, the full cache (infinite
//! mode), the link registry and the paging state. Every page request goes
//! through the same steps:
//!
//! 1. resolve and validate the target page, failing before any side effect;
//! 2. serve it from the full cache when the window is already there;
//! 3. otherwise fetch, parse, and compute the next links and state;
//! 4. commit links, cache, state and visible page together;
//! 5. emit events, in order: `sync`, cache `add`s, visible `reset`,
//!    state change.
//!
//! Nothing is committed when a step before 4 fails.

use metrics::counter;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::cache::{FullCache, WindowCoverage};
use super::links::{LinkRegistry, NavigationLinks};
use super::query::{PageOptions, PageTarget, PagingMode, QueryParams};
use super::state::{total_pages_for, PageState, StateSeed};
use super::strategies::{ParseLinks, ParseRecords, ParseState, Strategies, UrlFor};
use crate::collection::{Collection, CollectionEvent, EventFilter, Record, Subscription};
use crate::config::Config;
use crate::error::{ErrorCode, PageableError, Result};
use crate::transport::{FetchRequest, FetchResponse, Transport};

// ═══════════════════════════════════════════════════════════════════════════════
// Outcome
// ═══════════════════════════════════════════════════════════════════════════════

/// Where the records of a served page came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSource {
    Cache,
    Network,
}

impl PageSource {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Network => "network",
        }
    }
}

impl fmt::Display for PageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a successful page request.
#[derive(Debug, Clone)]
pub struct PageOutcome<R> {
    /// The page now current.
    pub page: u64,
    pub source: PageSource,
    /// The visible page after the request.
    pub records: Vec<R>,
    /// The raw response, for network fetches.
    pub response: Option<FetchResponse>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Pageable Collection
// ═══════════════════════════════════════════════════════════════════════════════

/// A paged view over a remote collection.
///
/// Page operations take `&mut self`, so at most one request per collection
/// is in flight. Share a collection across tasks behind a mutex.
pub struct PageableCollection<R: Record> {
    mode: PagingMode,
    state: PageState,
    links: LinkRegistry,
    full: Option<FullCache<R>>,
    page: Collection<R>,
    query_params: QueryParams,
    strategies: Strategies<R>,
    url_for: UrlFor,
    transport: Arc<dyn Transport>,
}

/// Everything a fetched response changes, computed before anything is
/// committed.
struct PendingPage<R> {
    page: u64,
    records: Vec<R>,
    links: LinkRegistry,
    state: PageState,
}

impl<R: Record + DeserializeOwned> PageableCollection<R> {
    /// Start building a collection fetching through `transport`.
    pub fn builder(transport: Arc<dyn Transport>) -> PageableCollectionBuilder<R> {
        PageableCollectionBuilder::new(transport)
    }
}

impl<R: Record> PageableCollection<R> {
    // ─────────────────────────────────────────────────────────────────────────
    // Snapshots
    // ─────────────────────────────────────────────────────────────────────────

    pub fn mode(&self) -> PagingMode {
        self.mode
    }

    pub fn state(&self) -> PageState {
        self.state.clone()
    }

    pub fn links(&self) -> LinkRegistry {
        self.links.clone()
    }

    /// The full cache; `None` outside infinite mode.
    pub fn full_collection(&self) -> Option<&FullCache<R>> {
        self.full.as_ref()
    }

    pub fn query_params(&self) -> &QueryParams {
        &self.query_params
    }

    /// The visible page.
    pub fn records(&self) -> &[R] {
        self.page.records()
    }

    pub fn page(&self) -> &Collection<R> {
        &self.page
    }

    pub fn len(&self) -> usize {
        self.page.len()
    }

    pub fn is_empty(&self) -> bool {
        self.page.is_empty()
    }

    pub fn to_json(&self) -> Result<serde_json::Value>
    where
        R: Serialize,
    {
        self.page.to_json()
    }

    /// Listen to events of the visible page: `request`, `sync`, `error`,
    /// `reset` and state changes. Full cache events are subscribed on
    /// [`full_collection`](Self::full_collection).
    pub fn subscribe<F>(&self, filter: impl Into<EventFilter>, handler: F) -> Subscription
    where
        F: Fn(&CollectionEvent<R>) + Send + Sync + 'static,
    {
        self.page.subscribe(filter, handler)
    }

    /// The configured URL for `page`.
    pub fn url_for(&self, page: u64) -> String {
        (self.url_for)(page)
    }

    /// Run the link strategy against `response`.
    pub fn parse_links(&self, response: &FetchResponse) -> NavigationLinks {
        (self.strategies.parse_links)(response)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Navigation predicates
    // ─────────────────────────────────────────────────────────────────────────

    pub fn has_previous_page(&self) -> bool {
        self.state.current_page() > self.state.first_page()
    }

    pub fn has_next_page(&self) -> bool {
        let Some(next) = self.state.current_page().checked_add(1) else {
            return false;
        };
        match self.mode {
            PagingMode::Infinite => {
                self.links.has(next) || self.state.last_page().is_some_and(|last| next <= last)
            }
            PagingMode::Server => self.state.last_page().map_or(true, |last| next <= last),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Page requests
    // ─────────────────────────────────────────────────────────────────────────

    /// Make `target` the current page.
    ///
    /// In infinite mode a page whose window is already cached is served
    /// without a request unless `options.fetch` is set.
    pub async fn get_page<T>(&mut self, target: T, options: PageOptions) -> Result<PageOutcome<R>>
    where
        T: TryInto<PageTarget>,
        T::Error: Into<PageableError>,
    {
        let target: PageTarget = target.try_into().map_err(Into::<PageableError>::into)?;
        let page = self.resolve(target)?;

        if !options.fetch && self.servable_from_cache(page) {
            return self.serve_from_cache(page);
        }
        self.fetch_page(page, &options).await
    }

    pub async fn get_first_page(&mut self, options: PageOptions) -> Result<PageOutcome<R>> {
        self.get_page(PageTarget::First, options).await
    }

    pub async fn get_last_page(&mut self, options: PageOptions) -> Result<PageOutcome<R>> {
        self.get_page(PageTarget::Last, options).await
    }

    /// Move forward one page. `Ok(None)` when there is no next page.
    pub async fn get_next_page(&mut self, options: PageOptions) -> Result<Option<PageOutcome<R>>> {
        if !self.has_next_page() {
            debug!(current_page = self.state.current_page(), "no next page");
            return Ok(None);
        }
        self.get_page(PageTarget::Next, options).await.map(Some)
    }

    /// Move back one page. `Ok(None)` when already on the first page.
    pub async fn get_previous_page(
        &mut self,
        options: PageOptions,
    ) -> Result<Option<PageOutcome<R>>> {
        if !self.has_previous_page() {
            debug!(current_page = self.state.current_page(), "no previous page");
            return Ok(None);
        }
        self.get_page(PageTarget::Previous, options).await.map(Some)
    }

    /// Refetch the current page from the remote resource.
    pub async fn fetch(&mut self, options: PageOptions) -> Result<PageOutcome<R>> {
        let page = self.state.current_page();
        self.fetch_page(page, &options).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    fn resolve(&self, target: PageTarget) -> Result<u64> {
        let state = &self.state;
        let page = match target {
            PageTarget::Number(page) => page,
            PageTarget::First => state.first_page(),
            PageTarget::Last => state
                .last_page()
                .ok_or_else(|| PageableError::invalid_page("last (total records unknown)"))?,
            PageTarget::Next => state
                .current_page()
                .checked_add(1)
                .ok_or_else(|| PageableError::invalid_page("next (past the largest page number)"))?,
            PageTarget::Previous => {
                if state.current_page() == state.first_page() {
                    return Err(PageableError::page_out_of_range(
                        state.first_page().saturating_sub(1),
                        state.first_page(),
                        state.last_page(),
                    ));
                }
                state.current_page() - 1
            }
        };

        let registered = self.mode == PagingMode::Infinite && self.links.has(page);
        if page < state.first_page() || !(state.contains(page) || registered) {
            return Err(PageableError::page_out_of_range(
                page,
                state.first_page(),
                state.last_page(),
            ));
        }
        Ok(page)
    }

    fn servable_from_cache(&self, page: u64) -> bool {
        let Some(full) = &self.full else {
            return false;
        };
        if !self.links.has(page) {
            return false;
        }
        match full.coverage(page, self.state.page_size(), self.state.first_page()) {
            WindowCoverage::Full => true,
            WindowCoverage::Partial => self.state.last_page() == Some(page),
            WindowCoverage::Empty => false,
        }
    }

    fn serve_from_cache(&mut self, page: u64) -> Result<PageOutcome<R>> {
        let Some(full) = &self.full else {
            return Err(PageableError::internal("cache serve without a full cache"));
        };
        let records = full.slice_for_page(page, self.state.page_size(), self.state.first_page());
        let next_state = self.state.with_current_page(page)?;

        let previous = std::mem::replace(&mut self.state, next_state);
        let reset = self.page.reset_deferred(records);

        debug!(page, records = self.page.len(), "serving page from cache");
        counter!("pageable_page_requests_total", "source" => PageSource::Cache.as_str())
            .increment(1);

        self.page.emit(&reset);
        if previous != self.state {
            self.page.emit(&CollectionEvent::StateChange {
                previous,
                current: self.state.clone(),
            });
        }

        Ok(PageOutcome {
            page,
            source: PageSource::Cache,
            records: self.page.records().to_vec(),
            response: None,
        })
    }

    #[instrument(skip(self, options), fields(mode = %self.mode))]
    async fn fetch_page(&mut self, page: u64, options: &PageOptions) -> Result<PageOutcome<R>> {
        let url = self
            .links
            .get(page)
            .map(str::to_string)
            .unwrap_or_else(|| (self.url_for)(page));

        let mut params = BTreeMap::new();
        params.insert(self.query_params.current_page.clone(), page.to_string());
        params.insert(
            self.query_params.page_size.clone(),
            self.state.page_size().to_string(),
        );
        params.extend(options.params.clone());

        let request = FetchRequest {
            page,
            url: url.clone(),
            params,
        };

        self.page.emit(&CollectionEvent::Request {
            page,
            url: url.clone(),
        });
        counter!("pageable_page_requests_total", "source" => PageSource::Network.as_str())
            .increment(1);

        let response = match self.transport.fetch(&request).await {
            Ok(response) => response,
            Err(error) => return Err(self.fail(page, error)),
        };

        let pending = match self.prepare(page, &url, &response) {
            Ok(pending) => pending,
            Err(error) => return Err(self.fail(page, error)),
        };

        let received = pending.records.len();
        let (adds, reset, previous) = self.commit(pending);

        info!(
            page,
            received,
            added = adds.len(),
            total_records = ?self.state.total_records(),
            "fetched page"
        );

        self.page.emit(&CollectionEvent::Sync {
            page,
            url,
            received,
        });
        if let Some(full) = &self.full {
            full.emit_all(&adds);
        }
        self.page.emit(&reset);
        self.page.emit(&CollectionEvent::StateChange {
            previous,
            current: self.state.clone(),
        });

        Ok(PageOutcome {
            page,
            source: PageSource::Network,
            records: self.page.records().to_vec(),
            response: Some(response),
        })
    }

    /// Parse `response` and compute the links and state it leads to.
    fn prepare(&self, page: u64, url: &str, response: &FetchResponse) -> Result<PendingPage<R>> {
        let records = (self.strategies.parse_records)(response, &self.query_params)?;
        let parsed_total = (self.strategies.parse_state)(response, &self.query_params);
        let navigation = (self.strategies.parse_links)(response);

        let mut links = self.links.clone();
        links.set(page, url);
        if let (Some(next), Some(following)) = (navigation.next, page.checked_add(1)) {
            debug!(page = following, url = %next, "registering next link");
            links.set(following, next);
        }
        if let Some(previous) = navigation.previous {
            if page > self.state.first_page() {
                links.set(page - 1, previous);
            }
        }

        // A response without a total keeps the known one. In infinite mode the
        // total never drops below what the cache will hold.
        let known_total = parsed_total.or(self.state.total_records());
        let total = match &self.full {
            Some(full) => {
                let cached = (full.len() + full.missing(&records).len()) as u64;
                Some(known_total.map_or(cached, |known| known.max(cached)))
            }
            None => known_total,
        };

        let state = self.state.transition(page, total).map_err(|e| {
            e.with_context("page", page)
                .with_context("received", records.len())
        })?;

        Ok(PendingPage {
            page,
            records,
            links,
            state,
        })
    }

    /// Apply a prepared page silently, returning the events to emit and the
    /// replaced state.
    fn commit(
        &mut self,
        pending: PendingPage<R>,
    ) -> (Vec<CollectionEvent<R>>, CollectionEvent<R>, PageState) {
        self.links = pending.links;
        let adds = match &mut self.full {
            Some(full) => full.merge_deferred(pending.records.iter().cloned()),
            None => Vec::new(),
        };
        let previous = std::mem::replace(&mut self.state, pending.state);
        let reset = self.page.reset_deferred(pending.records);
        debug_assert_eq!(self.state.current_page(), pending.page);
        (adds, reset, previous)
    }

    fn fail(&self, page: u64, error: PageableError) -> PageableError {
        error.log();
        counter!("pageable_fetch_failures_total", "code" => error.code().to_string())
            .increment(1);
        warn!(page, code = %error.code(), "page request failed");
        self.page.emit(&CollectionEvent::Error {
            page,
            code: error.code(),
            message: error.message().to_string(),
        });
        error
    }
}

impl<R: Record + fmt::Debug> fmt::Debug for PageableCollection<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageableCollection")
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("links", &self.links)
            .field("full_len", &self.full.as_ref().map(FullCache::len))
            .field("page", &self.page)
            .finish_non_exhaustive()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Builder
// ═══════════════════════════════════════════════════════════════════════════════

/// Builder for [`PageableCollection`].
pub struct PageableCollectionBuilder<R: Record> {
    transport: Arc<dyn Transport>,
    url_for: Option<UrlFor>,
    mode: PagingMode,
    seed: StateSeed,
    query_params: QueryParams,
    records: Vec<R>,
    strategies: Strategies<R>,
}

impl<R: Record + DeserializeOwned> PageableCollectionBuilder<R> {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            url_for: None,
            mode: PagingMode::default(),
            seed: StateSeed::default(),
            query_params: QueryParams::default(),
            records: Vec::new(),
            strategies: Strategies::default(),
        }
    }
}

impl<R: Record> PageableCollectionBuilder<R> {
    /// A single URL serving every page; the page is selected by query
    /// parameters.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.url_for = Some(Arc::new(move |_: u64| url.clone()));
        self
    }

    /// Compute the URL of each page.
    pub fn url_fn<F>(mut self, url_for: F) -> Self
    where
        F: Fn(u64) -> String + Send + Sync + 'static,
    {
        self.url_for = Some(Arc::new(url_for));
        self
    }

    pub fn mode(mut self, mode: PagingMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn state(mut self, seed: StateSeed) -> Self {
        self.seed = seed;
        self
    }

    pub fn page_size(mut self, page_size: u64) -> Self {
        self.seed.page_size = Some(page_size);
        self
    }

    pub fn first_page(mut self, first_page: u64) -> Self {
        self.seed.first_page = Some(first_page);
        self
    }

    pub fn current_page(mut self, current_page: u64) -> Self {
        self.seed.current_page = Some(current_page);
        self
    }

    pub fn total_records(mut self, total_records: u64) -> Self {
        self.seed.total_records = Some(total_records);
        self
    }

    pub fn query_params(mut self, query_params: QueryParams) -> Self {
        self.query_params = query_params;
        self
    }

    /// Initial records. In infinite mode they seed the full cache.
    pub fn records(mut self, records: impl IntoIterator<Item = R>) -> Self {
        self.records = records.into_iter().collect();
        self
    }

    pub fn strategies(mut self, strategies: Strategies<R>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn parse_records<F>(mut self, parse: F) -> Self
    where
        F: Fn(&FetchResponse, &QueryParams) -> Result<Vec<R>> + Send + Sync + 'static,
    {
        self.strategies.parse_records = Arc::new(parse) as ParseRecords<R>;
        self
    }

    pub fn parse_state<F>(mut self, parse: F) -> Self
    where
        F: Fn(&FetchResponse, &QueryParams) -> Option<u64> + Send + Sync + 'static,
    {
        self.strategies.parse_state = Arc::new(parse) as ParseState;
        self
    }

    pub fn parse_links<F>(mut self, parse: F) -> Self
    where
        F: Fn(&FetchResponse) -> NavigationLinks + Send + Sync + 'static,
    {
        self.strategies.parse_links = Arc::new(parse) as ParseLinks;
        self
    }

    /// Apply the source, state and query parameter sections of `config`.
    pub fn configure(mut self, config: &Config) -> Self {
        if let Some(url) = &config.source.url {
            self = self.url(url.clone());
        }
        self.mode = config.source.mode;
        self.seed.page_size = Some(config.state.page_size);
        self.seed.first_page = Some(config.state.first_page);
        self.query_params = config.query_params.clone();
        self
    }

    pub fn build(self) -> Result<PageableCollection<R>> {
        let url_for = self.url_for.ok_or_else(|| {
            PageableError::new(
                ErrorCode::MissingConfiguration,
                "a url or url function is required",
            )
        })?;

        let (state, links, full, page) = match self.mode {
            PagingMode::Infinite => {
                let full = FullCache::with_records(self.records);
                let state = PageState::initialize(&self.seed, Some(full.len() as u64))?;

                let known_pages = state
                    .last_page()
                    .map(|last| last - state.first_page() + 1)
                    .unwrap_or_else(|| total_pages_for(full.len() as u64, state.page_size()));
                let links: LinkRegistry = (state.first_page()
                    ..state.first_page() + known_pages)
                    .map(|page| (page, url_for(page)))
                    .collect();

                let visible = full.slice_for_page(
                    state.current_page(),
                    state.page_size(),
                    state.first_page(),
                );
                (state, links, Some(full), Collection::with_records(visible))
            }
            PagingMode::Server => {
                let state = PageState::initialize(&self.seed, None)?;
                let links: LinkRegistry =
                    std::iter::once((state.current_page(), url_for(state.current_page())))
                        .collect();
                (state, links, None, Collection::with_records(self.records))
            }
        };

        debug!(
            mode = %self.mode,
            page_size = state.page_size(),
            current_page = state.current_page(),
            links = links.len(),
            "pageable collection created"
        );

        Ok(PageableCollection {
            mode: self.mode,
            state,
            links,
            full,
            page,
            query_params: self.query_params,
            strategies: self.strategies,
            url_for,
            transport: self.transport,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
