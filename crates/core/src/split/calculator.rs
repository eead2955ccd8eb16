//! Split calculator.
//!
//! Shares are rounded half-up to the minor unit. Whatever the rounding
//! leaves over (total minus the sum of rounded shares) is added to the first
//! participant in input order, so the shares always sum to the total exactly.
//!
//! When a negative residual is larger than the first participant's share
//! (for example a percentage split giving them 0%), the first participant
//! drops to zero and the rest is taken from the next participants in input
//! order. No share is ever negative.

use std::collections::{BTreeMap, HashSet};

use rust_decimal::Decimal;
use tally_shared::types::{MAX_AMOUNT, ProfileId, SPLIT_EPSILON, round_currency};

use super::error::{ParameterIssue, SplitError};
use super::types::{SplitResult, SplitShare, SplitStrategy};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Stateless split calculator.
pub struct SplitCalculator;

impl SplitCalculator {
    /// Computes per-participant owed amounts.
    ///
    /// Inputs are checked in this order: negative or oversized total, empty
    /// participant list, duplicate participants, participant count, strategy
    /// parameters. Totals above [`MAX_AMOUNT`] are rejected.
    /// The total is normalized to the minor unit first and the returned
    /// shares sum to that normalized total.
    ///
    /// A single participant is only accepted with [`SplitStrategy::Equal`],
    /// which yields the full amount to that participant.
    pub fn calculate(
        total: Decimal,
        participants: &[ProfileId],
        strategy: &SplitStrategy,
    ) -> Result<SplitResult, SplitError> {
        check_total(total)?;
        let total = round_currency(total);

        let required = match strategy {
            SplitStrategy::Equal => 1,
            SplitStrategy::Percentage(_) | SplitStrategy::Custom(_) => 2,
        };
        if participants.is_empty() {
            return Err(SplitError::InsufficientParticipants {
                required,
                actual: 0,
            });
        }
        check_unique(participants)?;
        if participants.len() < required {
            return Err(SplitError::InsufficientParticipants {
                required,
                actual: participants.len(),
            });
        }

        let shares = match strategy {
            SplitStrategy::Equal => participants
                .iter()
                .zip(equal_shares(total, participants.len()))
                .map(|(id, amount)| SplitShare {
                    profile_id: *id,
                    amount,
                    percentage: None,
                })
                .collect(),
            SplitStrategy::Percentage(percentages) => {
                percentage_shares(total, participants, percentages)?
            }
            SplitStrategy::Custom(amounts) => custom_shares(total, participants, amounts)?,
        };

        Ok(SplitResult {
            split_type: strategy.split_type(),
            shares,
        })
    }

    /// Same as [`Self::calculate`], but returns `None` for input that would
    /// be rejected. Used for live previews while a form is being filled in.
    pub fn preview(
        total: Decimal,
        participants: &[ProfileId],
        strategy: &SplitStrategy,
    ) -> Option<SplitResult> {
        Self::calculate(total, participants, strategy).ok()
    }
}

/// Rejects totals below zero or above [`MAX_AMOUNT`].
pub(crate) fn check_total(total: Decimal) -> Result<(), SplitError> {
    if total < Decimal::ZERO {
        return Err(SplitError::NegativeTotal(total));
    }
    if total > MAX_AMOUNT {
        return Err(ParameterIssue::TotalTooLarge {
            total,
            max: MAX_AMOUNT,
        }
        .into());
    }
    Ok(())
}

/// Divides `amount` into `count` round-half-up shares summing to `amount`.
///
/// The residual goes to the first share, see the module docs for the
/// negative case.
pub(crate) fn equal_shares(amount: Decimal, count: usize) -> Vec<Decimal> {
    if count == 0 {
        return Vec::new();
    }
    let amount = round_currency(amount);
    let base = round_currency(amount / Decimal::from(count));
    let mut shares = vec![base; count];
    absorb_residual(&mut shares, amount);
    shares
}

fn percentage_shares(
    total: Decimal,
    participants: &[ProfileId],
    percentages: &BTreeMap<ProfileId, Decimal>,
) -> Result<Vec<SplitShare>, SplitError> {
    check_keys(participants, percentages)?;

    let mut sum = Decimal::ZERO;
    for id in participants {
        let percentage = percentages[id];
        if percentage < Decimal::ZERO || percentage > HUNDRED {
            return Err(ParameterIssue::PercentageOutOfRange {
                profile_id: *id,
                percentage,
            }
            .into());
        }
        sum += percentage;
    }
    if (sum - HUNDRED).abs() > SPLIT_EPSILON {
        return Err(ParameterIssue::PercentageSum { sum }.into());
    }

    let mut amounts: Vec<Decimal> = participants
        .iter()
        .map(|id| round_currency(total * percentages[id] / HUNDRED))
        .collect();
    absorb_residual(&mut amounts, total);

    Ok(participants
        .iter()
        .zip(amounts)
        .map(|(id, amount)| SplitShare {
            profile_id: *id,
            amount,
            percentage: Some(percentages[id]),
        })
        .collect())
}

fn custom_shares(
    total: Decimal,
    participants: &[ProfileId],
    amounts: &BTreeMap<ProfileId, Decimal>,
) -> Result<Vec<SplitShare>, SplitError> {
    check_keys(participants, amounts)?;

    let mut sum = Decimal::ZERO;
    for id in participants {
        let amount = amounts[id];
        if amount < Decimal::ZERO {
            return Err(ParameterIssue::NegativeAmount {
                profile_id: *id,
                amount,
            }
            .into());
        }
        if amount > total {
            return Err(ParameterIssue::AmountExceedsTotal {
                profile_id: *id,
                amount,
                total,
            }
            .into());
        }
        sum += amount;
    }
    if (sum - total).abs() > SPLIT_EPSILON {
        return Err(ParameterIssue::CustomSum { sum, total }.into());
    }

    let mut rounded: Vec<Decimal> = participants
        .iter()
        .map(|id| round_currency(amounts[id]))
        .collect();
    absorb_residual(&mut rounded, total);

    Ok(participants
        .iter()
        .zip(rounded)
        .map(|(id, amount)| SplitShare {
            profile_id: *id,
            amount,
            percentage: None,
        })
        .collect())
}

/// Adjusts `shares` so that they sum to `total`, starting with the first.
///
/// Requires non-negative shares and `total >= 0`; both hold for every
/// caller, so the walk always finishes with a zero residual.
fn absorb_residual(shares: &mut [Decimal], total: Decimal) {
    let mut residual = total - shares.iter().copied().sum::<Decimal>();
    for share in shares.iter_mut() {
        if residual.is_zero() {
            break;
        }
        let absorbed = if *share + residual >= Decimal::ZERO {
            residual
        } else {
            -*share
        };
        *share += absorbed;
        residual -= absorbed;
    }
}

fn check_unique(participants: &[ProfileId]) -> Result<(), SplitError> {
    let mut seen = HashSet::with_capacity(participants.len());
    for id in participants {
        if !seen.insert(*id) {
            return Err(ParameterIssue::DuplicateParticipant(*id).into());
        }
    }
    Ok(())
}

/// The strategy must name exactly the participant set.
fn check_keys(
    participants: &[ProfileId],
    params: &BTreeMap<ProfileId, Decimal>,
) -> Result<(), SplitError> {
    if let Some(unknown) = params.keys().find(|id| !participants.contains(id)) {
        return Err(ParameterIssue::UnknownParticipant(*unknown).into());
    }
    if let Some(missing) = participants.iter().find(|id| !params.contains_key(id)) {
        return Err(ParameterIssue::MissingParticipant(*missing).into());
    }
    Ok(())
}
