//! Pluggable response parsing.
//!
//! A pageable collection does not know the shape of the remote resource. It
//! asks three strategies, all reading the same [`FetchResponse`]:
//!
//! - `parse_records`: the records of the page
//! - `parse_state`: the total record count, if the resource reports one
//! - `parse_links`: navigation URLs advertised for neighbouring pages

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::links::{parse_link_header, NavigationLinks};
use super::query::QueryParams;
use crate::error::{PageableError, Result};
use crate::transport::FetchResponse;

pub type ParseRecords<R> =
    Arc<dyn Fn(&FetchResponse, &QueryParams) -> Result<Vec<R>> + Send + Sync>;
pub type ParseState = Arc<dyn Fn(&FetchResponse, &QueryParams) -> Option<u64> + Send + Sync>;
pub type ParseLinks = Arc<dyn Fn(&FetchResponse) -> NavigationLinks + Send + Sync>;
pub type UrlFor = Arc<dyn Fn(u64) -> String + Send + Sync>;

/// The parsing strategies of a collection.
pub struct Strategies<R> {
    pub parse_records: ParseRecords<R>,
    pub parse_state: ParseState,
    pub parse_links: ParseLinks,
}

impl<R: DeserializeOwned + 'static> Default for Strategies<R> {
    fn default() -> Self {
        Self {
            parse_records: Arc::new(parse_records::<R>),
            parse_state: Arc::new(parse_state),
            parse_links: Arc::new(next_link),
        }
    }
}

impl<R> Clone for Strategies<R> {
    fn clone(&self) -> Self {
        Self {
            parse_records: Arc::clone(&self.parse_records),
            parse_state: Arc::clone(&self.parse_state),
            parse_links: Arc::clone(&self.parse_links),
        }
    }
}

impl<R> fmt::Debug for Strategies<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Strategies").finish_non_exhaustive()
    }
}

/// Split a `[state, records]` envelope. Any other body is returned as the
/// record list with no state.
fn envelope(body: &Value) -> (Option<&Value>, &Value) {
    match body.as_array().map(Vec::as_slice) {
        Some([state @ Value::Object(_), records @ Value::Array(_)]) => (Some(state), records),
        _ => (None, body),
    }
}

/// Records from a plain JSON array or a `[state, records]` envelope. An empty
/// body yields no records.
pub fn parse_records<R: DeserializeOwned>(
    response: &FetchResponse,
    _params: &QueryParams,
) -> Result<Vec<R>> {
    let (_, records) = envelope(&response.body);
    match records {
        Value::Null => Ok(Vec::new()),
        Value::Array(_) => Vec::<R>::deserialize(records).map_err(|e| {
            PageableError::deserialization(e.to_string())
                .with_context("url", &response.url)
                .with_source(e)
        }),
        other => Err(PageableError::deserialization(format!(
            "expected an array of records, got {}",
            json_type(other)
        ))
        .with_context("url", &response.url)),
    }
}

/// Total record count from the state object of a `[state, records]`
/// envelope, read under `params.total_records`.
pub fn parse_state(response: &FetchResponse, params: &QueryParams) -> Option<u64> {
    let (state, _) = envelope(&response.body);
    state?.get(&params.total_records)?.as_u64()
}

/// The `next` relation of the `Link` header. Absent or malformed headers
/// yield no links.
pub fn next_link(response: &FetchResponse) -> NavigationLinks {
    all_links(response).only_next()
}

/// Every recognized relation of the `Link` header.
pub fn all_links(response: &FetchResponse) -> NavigationLinks {
    response
        .header("link")
        .map(parse_link_header)
        .unwrap_or_default()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
