//! Split strategy and result types.
//!
//! [`SplitStrategy`] is what the caller asks for, [`SplitResult`] is what the
//! calculator produces, and [`SplitDetails`] is the shape persisted verbatim
//! next to the expense record.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::ProfileId;

/// Tag of a split strategy as stored in `split_details.type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitType {
    /// Total divided evenly.
    Equal,
    /// Each participant pays a percentage of the total.
    Percentage,
    /// Each participant pays an explicit amount.
    Custom,
}

impl std::fmt::Display for SplitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Equal => write!(f, "equal"),
            Self::Percentage => write!(f, "percentage"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// How a total is divided among participants.
///
/// Each variant carries exactly the parameters it needs, so a percentage
/// split without percentages cannot be expressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitStrategy {
    /// Divide the total evenly across all participants.
    Equal,
    /// Participant to percentage in `[0, 100]`; percentages sum to 100.
    Percentage(BTreeMap<ProfileId, Decimal>),
    /// Participant to absolute amount; amounts sum to the total.
    Custom(BTreeMap<ProfileId, Decimal>),
}

impl SplitStrategy {
    /// Returns the stored tag for this strategy.
    #[must_use]
    pub const fn split_type(&self) -> SplitType {
        match self {
            Self::Equal => SplitType::Equal,
            Self::Percentage(_) => SplitType::Percentage,
            Self::Custom(_) => SplitType::Custom,
        }
    }

    /// Builds a percentage strategy from `(participant, percentage)` pairs.
    #[must_use]
    pub fn percentages(pairs: impl IntoIterator<Item = (ProfileId, Decimal)>) -> Self {
        Self::Percentage(pairs.into_iter().collect())
    }

    /// Builds a custom strategy from `(participant, amount)` pairs.
    #[must_use]
    pub fn custom(pairs: impl IntoIterator<Item = (ProfileId, Decimal)>) -> Self {
        Self::Custom(pairs.into_iter().collect())
    }
}

/// One participant's owed amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitShare {
    /// Participant.
    pub profile_id: ProfileId,
    /// Owed amount in major units, two decimal places.
    pub amount: Decimal,
    /// Requested percentage, for percentage splits only.
    pub percentage: Option<Decimal>,
}

/// Validated per-participant amounts, in participant input order.
///
/// The shares cover exactly the participant set that was passed in and
/// sum to the (minor-unit) total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitResult {
    /// Strategy that produced the shares.
    pub split_type: SplitType,
    /// Owed amounts in participant order.
    pub shares: Vec<SplitShare>,
}

impl SplitResult {
    /// Sum of all shares.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.shares.iter().map(|s| s.amount).sum()
    }

    /// Owed amount of a participant, if they are part of the split.
    #[must_use]
    pub fn share_of(&self, profile_id: ProfileId) -> Option<Decimal> {
        self.shares
            .iter()
            .find(|s| s.profile_id == profile_id)
            .map(|s| s.amount)
    }

    /// Participants in input order.
    pub fn participants(&self) -> impl Iterator<Item = ProfileId> + '_ {
        self.shares.iter().map(|s| s.profile_id)
    }

    /// Converts the result into the persisted `split_details` shape.
    #[must_use]
    pub fn to_details(&self) -> SplitDetails {
        SplitDetails {
            split_type: self.split_type,
            participants: self
                .shares
                .iter()
                .map(|s| SplitParticipant {
                    profile_id: s.profile_id,
                    amount: s.amount,
                    percentage: s.percentage,
                })
                .collect(),
        }
    }
}

/// Persisted split of an expense.
///
/// Serialized as `{ "type": "equal"|"percentage"|"custom", "participants": [...] }`
/// where each participant is `{ "profile_id", "amount", "percentage"? }`,
/// with amounts as JSON numbers. Older records that stored amounts as
/// numeric strings still deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitDetails {
    /// Strategy tag.
    #[serde(rename = "type")]
    pub split_type: SplitType,
    /// Per-participant entries.
    pub participants: Vec<SplitParticipant>,
}

/// One entry of a persisted split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitParticipant {
    /// Participant.
    pub profile_id: ProfileId,
    /// Owed amount.
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub amount: Decimal,
    /// Requested percentage, for percentage splits.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "rust_decimal::serde::float_option::serialize"
    )]
    pub percentage: Option<Decimal>,
}

impl SplitDetails {
    /// Sum of all stored amounts.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.participants.iter().map(|p| p.amount).sum()
    }

    /// Owed amount of a participant, if present.
    #[must_use]
    pub fn share_of(&self, profile_id: ProfileId) -> Option<Decimal> {
        self.participants
            .iter()
            .find(|p| p.profile_id == profile_id)
            .map(|p| p.amount)
    }

    /// Returns true if the participant appears in the split.
    #[must_use]
    pub fn involves(&self, profile_id: ProfileId) -> bool {
        self.participants.iter().any(|p| p.profile_id == profile_id)
    }
}
