//! Data-integrity anomalies found while folding stored expense records.
//!
//! Aggregations never fail because of a single bad record. They skip it and
//! report it here so that the caller can log it.

use serde::Serialize;
use tally_shared::types::{ExpenseId, ProfileId};

/// An aggregate computed over the valid subset of its input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Aggregated<T> {
    /// Aggregate over every record that could be used.
    pub value: T,
    /// Records that were skipped, in input order.
    pub anomalies: Vec<ExpenseAnomaly>,
}

impl<T> Aggregated<T> {
    /// Wraps a value with no anomalies.
    pub const fn clean(value: T) -> Self {
        Self {
            value,
            anomalies: Vec::new(),
        }
    }

    /// Returns true if every record was used.
    pub fn is_clean(&self) -> bool {
        self.anomalies.is_empty()
    }

    /// Drops the anomaly report.
    pub fn into_value(self) -> T {
        self.value
    }
}

/// A skipped expense record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpenseAnomaly {
    /// The skipped expense.
    pub expense_id: ExpenseId,
    /// Why it was skipped.
    pub kind: AnomalyKind,
}

/// What is wrong with a stored expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "profile_id", rename_all = "snake_case")]
pub enum AnomalyKind {
    /// Group expense stored without split details.
    MissingSplitDetails,
    /// Split details with no participants.
    EmptySplit,
    /// A participant appears more than once in the split.
    DuplicateParticipant(ProfileId),
    /// A participant owes a negative amount.
    NegativeShare(ProfileId),
    /// The expense amount is negative.
    NegativeAmount,
}

impl std::fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSplitDetails => write!(f, "group expense has no split details"),
            Self::EmptySplit => write!(f, "split has no participants"),
            Self::DuplicateParticipant(id) => write!(f, "participant {id} appears twice"),
            Self::NegativeShare(id) => write!(f, "participant {id} has a negative share"),
            Self::NegativeAmount => write!(f, "expense amount is negative"),
        }
    }
}
