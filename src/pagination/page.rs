//! List and mutation envelopes.

use serde::{Deserialize, Serialize};

/// Items returned by `to_vec` when no limit is given.
pub const DEFAULT_TO_VEC_LIMIT: usize = 25;

/// One page of a list response: `{ "items": [...], "nextCursor": "..." }`.
///
/// A missing `nextCursor` marks the last page.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_cursor: Option<String>) -> Self {
        Self { items, next_cursor }
    }

    pub fn is_last(&self) -> bool {
        self.next_cursor.is_none()
    }
}

/// Mutation envelope: `{ "items": [...] }`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ItemsWrapper<T> {
    pub items: Vec<T>,
}

impl<T> ItemsWrapper<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }
}

/// Bound for eager accumulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToVecLimit {
    /// Stop after this many items.
    Limit(usize),
    /// Drain every page.
    All,
}

impl ToVecLimit {
    pub fn max(self) -> Option<usize> {
        match self {
            ToVecLimit::Limit(n) => Some(n),
            ToVecLimit::All => None,
        }
    }
}

impl Default for ToVecLimit {
    fn default() -> Self {
        ToVecLimit::Limit(DEFAULT_TO_VEC_LIMIT)
    }
}

impl From<usize> for ToVecLimit {
    fn from(n: usize) -> Self {
        ToVecLimit::Limit(n)
    }
}
