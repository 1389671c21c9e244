//! Ordered, observable record collection.

use serde::Serialize;
use std::collections::HashSet;

use super::events::{CollectionEvent, EventBus, EventFilter, Subscription};
use super::record::{Record, RecordId};
use crate::error::Result;

/// An ordered list of records with identity based deduplication and change
/// notification.
///
/// Identity is the record id; records without one compare by value.
#[derive(Debug)]
pub struct Collection<R: Record> {
    records: Vec<R>,
    /// Ids of every record in `records` that has one.
    ids: HashSet<RecordId>,
    events: EventBus<R>,
}

impl<R: Record> Collection<R> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            ids: HashSet::new(),
            events: EventBus::new(),
        }
    }

    /// Create a collection holding `records` (deduplicated), without
    /// emitting events.
    pub fn with_records(records: impl IntoIterator<Item = R>) -> Self {
        let mut collection = Self::new();
        collection.insert_new(records);
        collection
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.records.iter()
    }

    pub fn get(&self, id: &RecordId) -> Option<&R> {
        if !self.ids.contains(id) {
            return None;
        }
        self.records
            .iter()
            .find(|r| r.record_id().as_ref() == Some(id))
    }

    pub fn contains(&self, record: &R) -> bool {
        match record.record_id() {
            Some(id) => self.ids.contains(&id),
            None => self
                .records
                .iter()
                .any(|r| r.record_id().is_none() && r == record),
        }
    }

    pub fn position(&self, record: &R) -> Option<usize> {
        if !self.contains(record) {
            return None;
        }
        self.records.iter().position(|r| r.same_record(record))
    }

    /// Records in `[start, end)`, clamped to the collection bounds.
    pub fn slice(&self, start: usize, end: usize) -> Vec<R> {
        let end = end.min(self.records.len());
        if start >= end {
            return Vec::new();
        }
        self.records[start..end].to_vec()
    }

    /// Append the records not already present. Emits one `add` per inserted
    /// record and returns them in insertion order.
    pub fn add(&mut self, records: impl IntoIterator<Item = R>) -> Vec<R> {
        let events = self.add_deferred(records);
        let added = events
            .iter()
            .filter_map(|e| match e {
                CollectionEvent::Add { record, .. } => Some(record.clone()),
                _ => None,
            })
            .collect();
        self.emit_all(&events);
        added
    }

    /// Remove the given records. Emits one `remove` per removed record.
    pub fn remove<'a>(&mut self, records: impl IntoIterator<Item = &'a R>) -> Vec<R> {
        let mut removed = Vec::new();
        for record in records {
            if let Some(index) = self.position(record) {
                let record = self.records.remove(index);
                if let Some(id) = record.record_id() {
                    self.ids.remove(&id);
                }
                self.events.emit(&CollectionEvent::Remove {
                    record: record.clone(),
                    index,
                });
                removed.push(record);
            }
        }
        removed
    }

    /// Replace the whole content. Emits a single `reset`.
    pub fn reset(&mut self, records: impl IntoIterator<Item = R>) {
        let event = self.reset_deferred(records);
        self.events.emit(&event);
    }

    pub fn subscribe<F>(&self, filter: impl Into<EventFilter>, handler: F) -> Subscription
    where
        F: Fn(&CollectionEvent<R>) + Send + Sync + 'static,
    {
        self.events.subscribe(filter, handler)
    }

    pub fn to_json(&self) -> Result<serde_json::Value>
    where
        R: Serialize,
    {
        Ok(serde_json::to_value(&self.records)?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Deferred mutation
    //
    // The paging controller commits state, links and cache content before any
    // event fires; these mutate silently and hand the events back.
    // ─────────────────────────────────────────────────────────────────────────

    pub(crate) fn add_deferred(
        &mut self,
        records: impl IntoIterator<Item = R>,
    ) -> Vec<CollectionEvent<R>> {
        let start = self.records.len();
        let inserted = self.insert_new(records);
        inserted
            .into_iter()
            .enumerate()
            .map(|(offset, record)| CollectionEvent::Add {
                record,
                index: start + offset,
            })
            .collect()
    }

    pub(crate) fn reset_deferred(
        &mut self,
        records: impl IntoIterator<Item = R>,
    ) -> CollectionEvent<R> {
        self.records.clear();
        self.ids.clear();
        self.insert_new(records);
        CollectionEvent::Reset {
            len: self.records.len(),
        }
    }

    pub(crate) fn emit(&self, event: &CollectionEvent<R>) {
        self.events.emit(event);
    }

    pub(crate) fn emit_all(&self, events: &[CollectionEvent<R>]) {
        for event in events {
            self.events.emit(event);
        }
    }

    fn insert_new(&mut self, records: impl IntoIterator<Item = R>) -> Vec<R> {
        let mut inserted = Vec::new();
        for record in records {
            if !self.contains(&record) {
                if let Some(id) = record.record_id() {
                    self.ids.insert(id);
                }
                self.records.push(record.clone());
                inserted.push(record);
            }
        }
        inserted
    }
}

impl<R: Record> Default for Collection<R> {
    fn default() -> Self {
        Self::new()
    }
}
