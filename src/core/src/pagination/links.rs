//! Page number → navigation URL registry and `Link` header parsing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ═══════════════════════════════════════════════════════════════════════════════
// Link Registry
// ═══════════════════════════════════════════════════════════════════════════════

/// Navigation URLs known per page. Entries are added or replaced, never
/// removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkRegistry {
    links: BTreeMap<u64, String>,
}

impl LinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the URL of `page`, returning the previous one.
    pub fn set(&mut self, page: u64, url: impl Into<String>) -> Option<String> {
        self.links.insert(page, url.into())
    }

    pub fn get(&self, page: u64) -> Option<&str> {
        self.links.get(&page).map(String::as_str)
    }

    pub fn has(&self, page: u64) -> bool {
        self.links.contains_key(&page)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &str)> {
        self.links.iter().map(|(page, url)| (*page, url.as_str()))
    }

    pub fn snapshot(&self) -> BTreeMap<u64, String> {
        self.links.clone()
    }
}

impl<S: Into<String>> FromIterator<(u64, S)> for LinkRegistry {
    fn from_iter<I: IntoIterator<Item = (u64, S)>>(iter: I) -> Self {
        Self {
            links: iter.into_iter().map(|(p, u)| (p, u.into())).collect(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Navigation Links
// ═══════════════════════════════════════════════════════════════════════════════

/// Relations advertised by the remote resource for the page just fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", alias = "prev")]
    pub previous: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
}

impl NavigationLinks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_next(mut self, url: impl Into<String>) -> Self {
        self.next = Some(url.into());
        self
    }

    pub fn with_previous(mut self, url: impl Into<String>) -> Self {
        self.previous = Some(url.into());
        self
    }

    pub fn with_first(mut self, url: impl Into<String>) -> Self {
        self.first = Some(url.into());
        self
    }

    pub fn with_last(mut self, url: impl Into<String>) -> Self {
        self.last = Some(url.into());
        self
    }

    /// Keep only the `next` relation.
    pub fn only_next(self) -> Self {
        Self {
            next: self.next,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_none() && self.previous.is_none() && self.next.is_none() && self.last.is_none()
    }

    /// Record `url` under `rel` unless that relation is already set.
    /// Unrecognized relations are ignored.
    fn set_rel(&mut self, rel: &str, url: &str) {
        let slot = match rel.to_ascii_lowercase().as_str() {
            "next" => &mut self.next,
            "prev" | "previous" => &mut self.previous,
            "first" => &mut self.first,
            "last" => &mut self.last,
            _ => return,
        };
        if slot.is_none() {
            *slot = Some(url.to_string());
        }
    }
}

/// Parse an RFC 5988 `Link` header value:
/// `<url>; rel="next", <url>; rel="last"`.
///
/// Entries without a URL or a recognized `rel` are skipped; input that is not
/// a link list at all yields an empty result.
pub fn parse_link_header(header: &str) -> NavigationLinks {
    let mut links = NavigationLinks::new();
    let mut rest = header;

    while let Some(open) = rest.find('<') {
        let Some(len) = rest[open + 1..].find('>') else {
            break;
        };
        let url = rest[open + 1..open + 1 + len].trim();
        let after = &rest[open + 1 + len + 1..];

        // Parameters run up to the next entry.
        let end = after.find('<').unwrap_or(after.len());
        let params = &after[..end];

        if !url.is_empty() {
            for rel in rel_values(params) {
                links.set_rel(rel, url);
            }
        }
        rest = &after[end..];
    }

    links
}

fn rel_values(params: &str) -> Vec<&str> {
    params
        .split(';')
        .filter_map(|param| {
            let (key, value) = param.split_once('=')?;
            if !key.trim().eq_ignore_ascii_case("rel") {
                return None;
            }
            Some(
                value
                    .trim()
                    .trim_end_matches(',')
                    .trim()
                    .trim_matches('"'),
            )
        })
        .flat_map(str::split_whitespace)
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
