//! Limit/offset windows for list queries.

use serde::{Deserialize, Serialize};

/// A window over a newest-first list of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Maximum number of records to return.
    #[serde(default = "default_limit")]
    pub limit: u64,
    /// Number of records to skip.
    #[serde(default)]
    pub offset: u64,
}

/// Largest limit a Postgres `BIGINT` accepts.
const MAX_QUERY_LIMIT: u64 = u64::MAX >> 1;

fn default_limit() -> u64 {
    50
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl PageRequest {
    /// Creates a window starting at the first record.
    #[must_use]
    pub const fn first(limit: u64) -> Self {
        Self { limit, offset: 0 }
    }

    /// A window covering every record.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            limit: u64::MAX,
            offset: 0,
        }
    }

    /// The limit to push down to a SQL query, `None` when it exceeds what
    /// a `BIGINT` can hold.
    #[must_use]
    pub const fn query_limit(self) -> Option<u64> {
        if self.limit > MAX_QUERY_LIMIT {
            None
        } else {
            Some(self.limit)
        }
    }

    /// Returns the window immediately after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self {
            limit: self.limit,
            offset: self.offset.saturating_add(self.limit),
        }
    }

    /// Applies the window to an already-sorted iterator.
    pub fn apply<I: Iterator>(self, items: I) -> impl Iterator<Item = I::Item> {
        let offset = usize::try_from(self.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(self.limit).unwrap_or(usize::MAX);
        items.skip(offset).take(limit)
    }
}
