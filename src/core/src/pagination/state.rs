//! Paging parameters and their derivation rules.
//!
//! This module provides:
//! - `StateSeed`, the user supplied starting parameters
//! - `PageState`, a validated snapshot replaced wholesale on every transition
//! - Total pages / last page derivation from the record count

use serde::{Deserialize, Serialize};

use crate::error::{PageableError, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// State Seed
// ═══════════════════════════════════════════════════════════════════════════════

/// Starting parameters for a pageable collection. Unset fields take defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateSeed {
    pub page_size: Option<u64>,
    pub first_page: Option<u64>,
    pub current_page: Option<u64>,
    pub total_records: Option<u64>,
}

impl StateSeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page_size(mut self, page_size: u64) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn first_page(mut self, first_page: u64) -> Self {
        self.first_page = Some(first_page);
        self
    }

    pub fn current_page(mut self, current_page: u64) -> Self {
        self.current_page = Some(current_page);
        self
    }

    pub fn total_records(mut self, total_records: u64) -> Self {
        self.total_records = Some(total_records);
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Page State
// ═══════════════════════════════════════════════════════════════════════════════

/// A validated paging snapshot.
///
/// `last_page`, `total_pages` and `total_records` are all known or all
/// unknown. When known, `last_page - first_page + 1 == total_pages` and
/// `current_page` lies in `[first_page, last_page]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageState {
    page_size: u64,
    first_page: u64,
    current_page: u64,
    last_page: Option<u64>,
    total_records: Option<u64>,
    total_pages: Option<u64>,
}

impl PageState {
    /// Build the initial state. `total_records` comes from the seed, or from
    /// `records_count` when the seed does not carry one.
    pub fn initialize(seed: &StateSeed, records_count: Option<u64>) -> Result<Self> {
        let page_size = seed.page_size.unwrap_or(super::DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            return Err(PageableError::invalid_state(
                "page size must be a positive integer",
            ));
        }

        let first_page = seed.first_page.unwrap_or(super::DEFAULT_FIRST_PAGE);
        if first_page > 1 {
            return Err(PageableError::invalid_state(format!(
                "first page must be 0 or 1, got {}",
                first_page
            )));
        }

        let current_page = seed.current_page.unwrap_or(first_page);
        let total_records = seed.total_records.or(records_count);

        let state = Self {
            page_size,
            first_page,
            current_page,
            last_page: None,
            total_records: None,
            total_pages: None,
        };
        state.derive(total_records)
    }

    /// Re-derive totals from `total_records` (`None` keeps the current
    /// total).
    pub fn recompute(&self, total_records: Option<u64>) -> Result<Self> {
        self.derive(total_records.or(self.total_records))
    }

    /// Move to `page`, validating it against the known range.
    pub fn with_current_page(&self, page: u64) -> Result<Self> {
        let mut next = self.clone();
        next.current_page = page;
        next.derive(self.total_records)
    }

    /// Move to `page` and adopt `total_records` in a single validated step.
    pub fn transition(&self, page: u64, total_records: Option<u64>) -> Result<Self> {
        let mut next = self.clone();
        next.current_page = page;
        next.derive(total_records.or(self.total_records))
    }

    fn derive(&self, total_records: Option<u64>) -> Result<Self> {
        let mut next = self.clone();
        next.total_records = total_records;
        next.total_pages = total_records.map(|total| total_pages_for(total, self.page_size));
        next.last_page = next
            .total_pages
            .map(|pages| self.first_page + pages - 1);

        if !next.contains(next.current_page) {
            return Err(PageableError::invalid_state(format!(
                "current page {} is outside [{}, {}]",
                next.current_page,
                next.first_page,
                next.last_page
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| "..".to_string()),
            )));
        }
        Ok(next)
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn first_page(&self) -> u64 {
        self.first_page
    }

    pub fn current_page(&self) -> u64 {
        self.current_page
    }

    pub fn last_page(&self) -> Option<u64> {
        self.last_page
    }

    pub fn total_records(&self) -> Option<u64> {
        self.total_records
    }

    pub fn total_pages(&self) -> Option<u64> {
        self.total_pages
    }

    /// Whether `page` lies in `[first_page, last_page]`; an unknown last page
    /// bounds nothing.
    pub fn contains(&self, page: u64) -> bool {
        page >= self.first_page && self.last_page.map_or(true, |last| page <= last)
    }

    /// Offset of the first record of `page` in the full record sequence.
    pub fn offset_of(&self, page: u64) -> usize {
        page_offset(page, self.page_size, self.first_page)
    }
}

/// `ceil(total / page_size)`, never below 1.
pub fn total_pages_for(total_records: u64, page_size: u64) -> u64 {
    total_records.div_ceil(page_size).max(1)
}

pub(crate) fn page_offset(page: u64, page_size: u64, first_page: u64) -> usize {
    (page.saturating_sub(first_page) * page_size) as usize
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_total_pages_floor_one() {
        assert_eq!(total_pages_for(0, 10), 1);
        assert_eq!(total_pages_for(1, 10), 1);
        assert_eq!(total_pages_for(10, 10), 1);
        assert_eq!(total_pages_for(11, 10), 2);
        assert_eq!(total_pages_for(4, 2), 2);
    }

    #[test]
    fn test_last_page_matches_total_pages() {
        for first_page in [0, 1] {
            for page_size in 1..=7u64 {
                for total in 0..=40u64 {
                    let state = PageState::initialize(
                        &StateSeed::new()
                            .page_size(page_size)
                            .first_page(first_page)
                            .total_records(total),
                        None,
                    )
                    .unwrap();
                    let pages = state.total_pages().unwrap();
                    assert_eq!(pages, total.div_ceil(page_size).max(1));
                    assert_eq!(state.last_page().unwrap() - first_page + 1, pages);
                }
            }
        }
    }

    #[test]
    fn test_initialize_from_records_count() {
        let state =
            PageState::initialize(&StateSeed::new().page_size(2).current_page(2), Some(4)).unwrap();

        assert_eq!(state.total_records(), Some(4));
        assert_eq!(state.total_pages(), Some(2));
        assert_eq!(state.last_page(), Some(2));
        assert_eq!(state.current_page(), 2);
        assert_eq!(state.first_page(), 1);
    }

    #[test]
    fn test_seeded_total_wins_over_records_count() {
        let state =
            PageState::initialize(&StateSeed::new().page_size(10).total_records(95), Some(3))
                .unwrap();
        assert_eq!(state.total_records(), Some(95));
        assert_eq!(state.last_page(), Some(10));
    }

    #[test]
    fn test_unknown_totals() {
        let state = PageState::initialize(&StateSeed::new().page_size(5), None).unwrap();
        assert_eq!(state.total_records(), None);
        assert_eq!(state.last_page(), None);
        assert!(state.contains(1_000));
        assert!(!state.contains(0));
    }

    #[test]
    fn test_rejects_bad_configuration() {
        let zero = PageState::initialize(&StateSeed::new().page_size(0), None).unwrap_err();
        assert_eq!(zero.code(), ErrorCode::InvalidState);

        let base = PageState::initialize(&StateSeed::new().first_page(2), None).unwrap_err();
        assert_eq!(base.code(), ErrorCode::InvalidState);

        let below =
            PageState::initialize(&StateSeed::new().first_page(1).current_page(0), None)
                .unwrap_err();
        assert_eq!(below.code(), ErrorCode::InvalidState);

        let beyond = PageState::initialize(
            &StateSeed::new().page_size(2).current_page(3),
            Some(4),
        )
        .unwrap_err();
        assert_eq!(beyond.code(), ErrorCode::InvalidState);
    }

    #[test]
    fn test_recompute_keeps_or_replaces_total() {
        let state = PageState::initialize(&StateSeed::new().page_size(2), Some(2)).unwrap();

        let same = state.recompute(None).unwrap();
        assert_eq!(same, state);

        let grown = state.recompute(Some(7)).unwrap();
        assert_eq!(grown.total_pages(), Some(4));
        assert_eq!(grown.last_page(), Some(4));
    }

    #[test]
    fn test_recompute_rejects_current_page_outside_range() {
        let state = PageState::initialize(
            &StateSeed::new().page_size(2).current_page(3),
            Some(6),
        )
        .unwrap();

        let error = state.recompute(Some(2)).unwrap_err();
        assert_eq!(error.code(), ErrorCode::InvalidState);
    }

    #[test]
    fn test_transition_moves_and_grows() {
        let state = PageState::initialize(&StateSeed::new().page_size(2), Some(2)).unwrap();
        let next = state.transition(2, Some(4)).unwrap();

        assert_eq!(next.current_page(), 2);
        assert_eq!(next.total_records(), Some(4));
        assert_eq!(next.last_page(), Some(2));
        assert!(state.transition(2, None).is_err());
    }

    #[test]
    fn test_offsets() {
        let one_based = PageState::initialize(&StateSeed::new().page_size(3), None).unwrap();
        assert_eq!(one_based.offset_of(1), 0);
        assert_eq!(one_based.offset_of(3), 6);

        let zero_based =
            PageState::initialize(&StateSeed::new().page_size(3).first_page(0), None).unwrap();
        assert_eq!(zero_based.offset_of(0), 0);
        assert_eq!(zero_based.offset_of(2), 6);
    }

    #[test]
    fn test_serializes_camel_case() {
        let state = PageState::initialize(&StateSeed::new().page_size(2), Some(3)).unwrap();
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["pageSize"], 2);
        assert_eq!(json["totalRecords"], 3);
        assert_eq!(json["lastPage"], 2);
    }
}
