//! Property-based tests for balance aggregation.
//!
//! - Reordering the expense list never changes balances
//! - A single expense moves exactly the money its split assigns
//! - Group positions always net to zero

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tally_shared::types::{ExpenseId, GroupId, ProfileId};
use uuid::Uuid;

use super::aggregator::BalanceAggregator;
use crate::expense::Expense;
use crate::split::{SplitCalculator, SplitStrategy};

const MEMBERS: u128 = 5;

fn pid(n: u128) -> ProfileId {
    ProfileId::from_uuid(Uuid::from_u128(n))
}

/// Builds a group expense whose split comes from the calculator.
fn make_expense(
    id: u128,
    total: Decimal,
    paid_by: ProfileId,
    participants: &[ProfileId],
) -> Expense {
    let split = SplitCalculator::calculate(total, participants, &SplitStrategy::Equal).unwrap();
    Expense {
        id: ExpenseId::from_uuid(Uuid::from_u128(id)),
        description: "shared".to_string(),
        amount: total,
        category_id: None,
        expense_date: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
        is_group_expense: true,
        group_id: Some(GroupId::from_uuid(Uuid::from_u128(77))),
        paid_by,
        involved: participants.to_vec(),
        split_details: Some(split.to_details()),
        notes: None,
    }
}

/// Strategy to generate one group expense among a small fixed member set.
fn expense_strategy(id: u128) -> impl Strategy<Value = Expense> {
    (
        1i64..10_000_000i64,
        1..=MEMBERS,
        prop::sample::subsequence((1..=MEMBERS).collect::<Vec<_>>(), 1..=MEMBERS as usize),
    )
        .prop_map(move |(cents, payer, members)| {
            let participants: Vec<_> = members.into_iter().map(pid).collect();
            make_expense(id, Decimal::new(cents, 2), pid(payer), &participants)
        })
}

/// Strategy to generate 0 to 12 group expenses.
fn expenses_strategy() -> impl Strategy<Value = Vec<Expense>> {
    (0u128..12).prop_flat_map(|n| (0..n).map(expense_strategy).collect::<Vec<_>>())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* expense list and reference, reversing the list yields the
    /// same balances.
    #[test]
    fn prop_balances_invariant_under_reordering(
        expenses in expenses_strategy(),
        reference in 1..=MEMBERS,
    ) {
        let forward = BalanceAggregator::compute_balances(pid(reference), &expenses);
        let mut reversed = expenses.clone();
        reversed.reverse();
        let backward = BalanceAggregator::compute_balances(pid(reference), &reversed);

        prop_assert_eq!(forward.value, backward.value);
    }

    /// *For any* single expense paid by the reference, the amounts added to
    /// other participants sum to the total minus the payer's own share.
    #[test]
    fn prop_payer_contributions_conserve_money(expense in expense_strategy(1)) {
        let payer = expense.paid_by;
        let contributions = BalanceAggregator::expense_contributions(payer, &expense);
        let added: Decimal = contributions.iter().map(|(_, delta)| *delta).sum();

        let details = expense.split_details.as_ref().unwrap();
        let own = details.share_of(payer).unwrap_or_default();
        if details.involves(payer) {
            prop_assert_eq!(added, expense.amount - own);
            prop_assert!(contributions.iter().all(|(p, d)| *p != payer && *d >= Decimal::ZERO));
        } else {
            prop_assert!(contributions.is_empty());
        }
    }

    /// *For any* expense list, the net positions of all members sum to zero.
    #[test]
    fn prop_group_positions_sum_to_zero(expenses in expenses_strategy()) {
        let positions = BalanceAggregator::compute_group_positions(&expenses);
        prop_assert!(positions.is_clean());
        prop_assert_eq!(positions.value.net_total(), Decimal::ZERO);
    }

    /// *For any* reference, what others owe the reference matches the
    /// reference's group position.
    #[test]
    fn prop_balances_agree_with_group_position(
        expenses in expenses_strategy(),
        reference in 1..=MEMBERS,
    ) {
        let balances = BalanceAggregator::compute_balances(pid(reference), &expenses);
        let positions = BalanceAggregator::compute_group_positions(&expenses);

        // Expenses that the reference paid for without being a participant
        // move their position but are not folded into their balances.
        let outside: Decimal = expenses
            .iter()
            .filter(|e| e.paid_by == pid(reference))
            .filter_map(|e| e.split_details.as_ref())
            .filter(|d| !d.involves(pid(reference)))
            .map(|d| d.total())
            .sum();

        prop_assert_eq!(
            balances.value.net_total() + outside,
            positions.value.get(pid(reference)).unwrap_or_default()
        );
    }
}

#[test]
fn test_equal_split_balances_both_directions() {
    let expense = make_expense(1, dec!(50), pid(1), &[pid(1), pid(2)]);

    let as_b = BalanceAggregator::compute_balances(pid(2), std::slice::from_ref(&expense));
    assert_eq!(as_b.value.iter().collect::<Vec<_>>(), vec![(pid(1), dec!(-25.00))]);

    let as_a = BalanceAggregator::compute_balances(pid(1), &[expense]);
    assert_eq!(as_a.value.iter().collect::<Vec<_>>(), vec![(pid(2), dec!(25.00))]);
}
