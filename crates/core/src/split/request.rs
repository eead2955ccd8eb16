//! Split requests as entered on the expense form.
//!
//! The form only asks the acting participant for their own percentage or
//! amount. Everyone else shares the remainder evenly.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{ProfileId, round_currency};

use super::calculator::{check_total, equal_shares};
use super::error::{ParameterIssue, SplitError};
use super::types::SplitStrategy;

/// A split expressed relative to the acting participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SplitRequest {
    /// Everyone pays the same.
    Equal,
    /// The actor pays `own_percentage`, the others split `100 - own_percentage`.
    Percentage {
        /// Actor's percentage in `[0, 100]`.
        own_percentage: Decimal,
    },
    /// The actor pays `own_amount`, the others split `total - own_amount`.
    Custom {
        /// Actor's amount in `[0, total]`.
        own_amount: Decimal,
    },
}

impl SplitRequest {
    /// Expands the request into a full [`SplitStrategy`] over `participants`.
    ///
    /// The remainder is divided across the other participants in their
    /// given order with the equal-split rounding rule.
    pub fn resolve(
        &self,
        actor: ProfileId,
        total: Decimal,
        participants: &[ProfileId],
    ) -> Result<SplitStrategy, SplitError> {
        check_total(total)?;
        match *self {
            Self::Equal => Ok(SplitStrategy::Equal),
            Self::Percentage { own_percentage } => {
                if own_percentage < Decimal::ZERO || own_percentage > Decimal::ONE_HUNDRED {
                    return Err(ParameterIssue::PercentageOutOfRange {
                        profile_id: actor,
                        percentage: own_percentage,
                    }
                    .into());
                }
                let others = others_of(actor, participants)?;
                let rest = equal_shares(Decimal::ONE_HUNDRED - own_percentage, others.len());
                Ok(SplitStrategy::Percentage(with_actor(
                    actor,
                    own_percentage,
                    &others,
                    rest,
                )))
            }
            Self::Custom { own_amount } => {
                let others = others_of(actor, participants)?;
                let total = round_currency(total);
                if own_amount < Decimal::ZERO {
                    return Err(ParameterIssue::NegativeAmount {
                        profile_id: actor,
                        amount: own_amount,
                    }
                    .into());
                }
                if own_amount > total {
                    return Err(ParameterIssue::AmountExceedsTotal {
                        profile_id: actor,
                        amount: own_amount,
                        total,
                    }
                    .into());
                }
                let rest = equal_shares(total - own_amount, others.len());
                Ok(SplitStrategy::Custom(with_actor(
                    actor, own_amount, &others, rest,
                )))
            }
        }
    }
}

fn others_of(actor: ProfileId, participants: &[ProfileId]) -> Result<Vec<ProfileId>, SplitError> {
    if !participants.contains(&actor) {
        return Err(ParameterIssue::UnknownParticipant(actor).into());
    }
    Ok(participants
        .iter()
        .copied()
        .filter(|id| *id != actor)
        .collect())
}

fn with_actor(
    actor: ProfileId,
    own: Decimal,
    others: &[ProfileId],
    rest: Vec<Decimal>,
) -> BTreeMap<ProfileId, Decimal> {
    std::iter::once((actor, own))
        .chain(others.iter().copied().zip(rest))
        .collect()
}
