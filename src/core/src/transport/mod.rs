//! Remote resource access.
//!
//! A [`Transport`] turns a [`FetchRequest`] into a [`FetchResponse`]: the
//! raw JSON body plus the headers link metadata is read from. The paging
//! layer never retries; a failed fetch is returned to the caller as is.

mod http;

pub use http::HttpTransport;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;

/// A single page request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    /// Page the request is issued for.
    pub page: u64,
    /// Base URL, possibly carrying its own query string.
    pub url: String,
    /// Query parameters to apply on top of `url`.
    pub params: BTreeMap<String, String>,
}

/// A successful response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FetchResponse {
    pub url: String,
    pub status: u16,
    /// Header names are stored lowercased.
    headers: BTreeMap<String, String>,
    pub body: serde_json::Value,
}

impl FetchResponse {
    pub fn new(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            url: url.into(),
            status: 200,
            headers: BTreeMap::new(),
            body,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert_header(name, value);
        self
    }

    /// Add a header; repeated names are joined with `", "`.
    pub fn insert_header(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        self.headers
            .entry(name.to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }
}

/// Fetches pages from the remote resource.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse>;
}
