//! The full record mirror used by infinite paging.

use serde::Serialize;

use super::state::page_offset;
use crate::collection::{Collection, CollectionEvent, EventFilter, Record, RecordId, Subscription};
use crate::error::Result;

/// How much of a page window is present in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowCoverage {
    /// Every slot of the window holds a record.
    Full,
    /// The window starts inside the cache but runs past its end.
    Partial,
    /// The window starts at or beyond the end of the cache.
    Empty,
}

/// Every record fetched so far, in fetch order, deduplicated by identity.
/// Only ever grows in infinite mode.
#[derive(Debug)]
pub struct FullCache<R: Record> {
    collection: Collection<R>,
}

impl<R: Record> FullCache<R> {
    pub fn new() -> Self {
        Self {
            collection: Collection::new(),
        }
    }

    pub fn with_records(records: impl IntoIterator<Item = R>) -> Self {
        Self {
            collection: Collection::with_records(records),
        }
    }

    /// Append the records not yet cached, preserving input order. One `add`
    /// event fires per appended record.
    pub fn merge(&mut self, records: impl IntoIterator<Item = R>) -> Vec<R> {
        self.collection.add(records)
    }

    /// The records of `page`: fewer than `page_size` at the tail, none past
    /// the end.
    pub fn slice_for_page(&self, page: u64, page_size: u64, first_page: u64) -> Vec<R> {
        let start = page_offset(page, page_size, first_page);
        self.collection.slice(start, start + page_size as usize)
    }

    pub fn coverage(&self, page: u64, page_size: u64, first_page: u64) -> WindowCoverage {
        let start = page_offset(page, page_size, first_page);
        let end = start + page_size as usize;
        let len = self.collection.len();

        if start >= len {
            WindowCoverage::Empty
        } else if end <= len {
            WindowCoverage::Full
        } else {
            WindowCoverage::Partial
        }
    }

    /// The records of `records` a merge would append, without merging.
    pub fn missing(&self, records: &[R]) -> Vec<R> {
        let mut missing: Vec<R> = Vec::new();
        for record in records {
            if !self.collection.contains(record) && !missing.iter().any(|m| m.same_record(record)) {
                missing.push(record.clone());
            }
        }
        missing
    }

    pub fn len(&self) -> usize {
        self.collection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }

    pub fn records(&self) -> &[R] {
        self.collection.records()
    }

    pub fn get(&self, id: &RecordId) -> Option<&R> {
        self.collection.get(id)
    }

    pub fn collection(&self) -> &Collection<R> {
        &self.collection
    }

    pub fn subscribe<F>(&self, filter: impl Into<EventFilter>, handler: F) -> Subscription
    where
        F: Fn(&CollectionEvent<R>) + Send + Sync + 'static,
    {
        self.collection.subscribe(filter, handler)
    }

    pub fn to_json(&self) -> Result<serde_json::Value>
    where
        R: Serialize,
    {
        self.collection.to_json()
    }

    pub(crate) fn merge_deferred(
        &mut self,
        records: impl IntoIterator<Item = R>,
    ) -> Vec<CollectionEvent<R>> {
        self.collection.add_deferred(records)
    }

    pub(crate) fn emit_all(&self, events: &[CollectionEvent<R>]) {
        self.collection.emit_all(events);
    }
}

impl<R: Record> Default for FullCache<R> {
    fn default() -> Self {
        Self::new()
    }
}
