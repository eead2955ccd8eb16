//! Split error types.
//!
//! Every failure is a local, synchronous rejection of a single computation.
//! Nothing here is coerced into a best-guess split.

use rust_decimal::Decimal;
use tally_shared::types::ProfileId;
use thiserror::Error;

/// Errors that can occur while computing a split.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    /// The split configuration does not reconcile with the total or the participant set.
    #[error("Invalid split parameters: {0}")]
    InvalidStrategyParameters(ParameterIssue),

    /// The participant set cannot support the requested strategy.
    #[error("Split requires at least {required} participants, got {actual}")]
    InsufficientParticipants {
        /// Minimum number of participants for the strategy.
        required: usize,
        /// Number of participants supplied.
        actual: usize,
    },

    /// The total amount is below zero.
    #[error("Total amount cannot be negative: {0}")]
    NegativeTotal(Decimal),
}

/// What exactly is wrong with a split configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterIssue {
    /// Percentages do not sum to 100.
    #[error("percentages sum to {sum}, expected 100")]
    PercentageSum {
        /// Actual sum of the percentages.
        sum: Decimal,
    },

    /// A percentage lies outside `[0, 100]`.
    #[error("percentage {percentage} for {profile_id} is outside 0..=100")]
    PercentageOutOfRange {
        /// Participant.
        profile_id: ProfileId,
        /// Offending percentage.
        percentage: Decimal,
    },

    /// Custom amounts do not sum to the total.
    #[error("custom amounts sum to {sum}, expected {total}")]
    CustomSum {
        /// Actual sum of the amounts.
        sum: Decimal,
        /// Expense total.
        total: Decimal,
    },

    /// A custom amount is negative.
    #[error("amount {amount} for {profile_id} is negative")]
    NegativeAmount {
        /// Participant.
        profile_id: ProfileId,
        /// Offending amount.
        amount: Decimal,
    },

    /// A custom amount is larger than the total.
    #[error("amount {amount} for {profile_id} exceeds the total {total}")]
    AmountExceedsTotal {
        /// Participant.
        profile_id: ProfileId,
        /// Offending amount.
        amount: Decimal,
        /// Expense total.
        total: Decimal,
    },

    /// The strategy names someone outside the participant set.
    #[error("{0} is not a participant")]
    UnknownParticipant(ProfileId),

    /// The strategy leaves out a participant.
    #[error("no share given for participant {0}")]
    MissingParticipant(ProfileId),

    /// The total is larger than any expense may be.
    #[error("total {total} exceeds the maximum amount {max}")]
    TotalTooLarge {
        /// Expense total.
        total: Decimal,
        /// Largest accepted total.
        max: Decimal,
    },

    /// The participant list names someone twice.
    #[error("participant {0} appears more than once")]
    DuplicateParticipant(ProfileId),
}

impl From<ParameterIssue> for SplitError {
    fn from(issue: ParameterIssue) -> Self {
        Self::InvalidStrategyParameters(issue)
    }
}

impl SplitError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidStrategyParameters(_) => "INVALID_STRATEGY_PARAMETERS",
            Self::InsufficientParticipants { .. } => "INSUFFICIENT_PARTICIPANTS",
            Self::NegativeTotal(_) => "NEGATIVE_TOTAL",
        }
    }

    /// Returns the HTTP status code for this error.
    ///
    /// All split errors are caller-fixable validation failures.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        400
    }
}
