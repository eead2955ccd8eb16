//! Folding stored expenses into balances.
//!
//! Balances are derived, never stored: they are recomputed from the full
//! expense history every time. Records that cannot be folded are skipped
//! and reported as anomalies; one corrupt record never hides the rest.

use std::collections::HashSet;

use rust_decimal::Decimal;
use tally_shared::types::ProfileId;

use super::types::Balances;
use crate::expense::Expense;
use crate::integrity::{Aggregated, AnomalyKind, ExpenseAnomaly};
use crate::split::SplitDetails;

/// Stateless balance aggregator.
pub struct BalanceAggregator;

impl BalanceAggregator {
    /// Net balance of every counterparty relative to `reference`.
    ///
    /// Expenses the reference is not part of contribute nothing. Personal
    /// expenses without split details are ignored without an anomaly.
    pub fn compute_balances(reference: ProfileId, expenses: &[Expense]) -> Aggregated<Balances> {
        let mut balances = Balances::new();
        let anomalies = fold_valid(expenses, |expense, details| {
            for (counterparty, delta) in contributions(reference, expense.paid_by, details) {
                balances.add(counterparty, delta);
            }
        });
        Aggregated {
            value: balances,
            anomalies,
        }
    }

    /// Net position of every member across a group's expenses.
    ///
    /// The payer is credited with what the participants owe, every
    /// participant is debited their share. Positions sum to zero.
    pub fn compute_group_positions(expenses: &[Expense]) -> Aggregated<Balances> {
        let mut positions = Balances::new();
        let anomalies = fold_valid(expenses, |expense, details| {
            positions.add(expense.paid_by, details.total());
            for participant in &details.participants {
                positions.add(participant.profile_id, -participant.amount);
            }
        });
        Aggregated {
            value: positions,
            anomalies,
        }
    }

    /// Deltas that a single expense adds to the balances of `reference`.
    ///
    /// Empty when the reference is not a split participant, when the
    /// expense has no split, or when the expense is not usable.
    pub fn expense_contributions(
        reference: ProfileId,
        expense: &Expense,
    ) -> Vec<(ProfileId, Decimal)> {
        match check_expense(expense) {
            Ok(Some(details)) => contributions(reference, expense.paid_by, details),
            Ok(None) | Err(_) => Vec::new(),
        }
    }
}

/// Runs `fold` for every usable expense and collects anomalies for the rest.
fn fold_valid<'a>(
    expenses: &'a [Expense],
    mut fold: impl FnMut(&'a Expense, &'a SplitDetails),
) -> Vec<ExpenseAnomaly> {
    let mut anomalies = Vec::new();
    for expense in expenses {
        match check_expense(expense) {
            Ok(Some(details)) => fold(expense, details),
            Ok(None) => {}
            Err(kind) => anomalies.push(ExpenseAnomaly {
                expense_id: expense.id,
                kind,
            }),
        }
    }
    anomalies
}

fn contributions(
    reference: ProfileId,
    paid_by: ProfileId,
    details: &SplitDetails,
) -> Vec<(ProfileId, Decimal)> {
    if !details.involves(reference) {
        return Vec::new();
    }
    if paid_by == reference {
        details
            .participants
            .iter()
            .filter(|p| p.profile_id != reference)
            .map(|p| (p.profile_id, p.amount))
            .collect()
    } else {
        let own = details.share_of(reference).unwrap_or_default();
        vec![(paid_by, -own)]
    }
}

/// Returns the split to fold, `None` for a personal expense without one.
fn check_expense(expense: &Expense) -> Result<Option<&SplitDetails>, AnomalyKind> {
    if expense.amount < Decimal::ZERO {
        return Err(AnomalyKind::NegativeAmount);
    }
    let Some(details) = expense.split_details.as_ref() else {
        return if expense.is_group_expense {
            Err(AnomalyKind::MissingSplitDetails)
        } else {
            Ok(None)
        };
    };
    if details.participants.is_empty() {
        return Err(AnomalyKind::EmptySplit);
    }
    let mut seen = HashSet::with_capacity(details.participants.len());
    for participant in &details.participants {
        if !seen.insert(participant.profile_id) {
            return Err(AnomalyKind::DuplicateParticipant(participant.profile_id));
        }
        if participant.amount < Decimal::ZERO {
            return Err(AnomalyKind::NegativeShare(participant.profile_id));
        }
    }
    Ok(Some(details))
}
