//! Property-based tests for the split calculator.
//!
//! - Conservation: shares sum to the total exactly
//! - Coverage: shares name exactly the participant list, in order
//! - Determinism: identical input gives identical output
//! - No share is ever negative

use proptest::prelude::*;
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tally_shared::types::ProfileId;
use uuid::Uuid;

use super::calculator::SplitCalculator;
use super::error::SplitError;
use super::types::{SplitResult, SplitStrategy};

fn pid(n: u128) -> ProfileId {
    ProfileId::from_uuid(Uuid::from_u128(n))
}

/// Strategy to generate a non-negative amount (0.00 to 1,000,000.00).
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate 1 to 12 distinct participants in random order.
fn participants() -> impl Strategy<Value = Vec<ProfileId>> {
    (1u128..=12)
        .prop_flat_map(|n| Just((1..=n).map(pid).collect::<Vec<_>>()).prop_shuffle())
}

/// Splits `units` hundredths into `parts` non-negative pieces summing to it.
fn pieces(units: i64, parts: usize) -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec(0..=units, parts.saturating_sub(1)).prop_map(move |mut cuts| {
        cuts.push(0);
        cuts.push(units);
        cuts.sort_unstable();
        cuts.windows(2)
            .map(|w| Decimal::new(w[1] - w[0], 2))
            .collect()
    })
}

/// Strategy to generate `(participants, percentage strategy)` with 2+ participants.
fn percentage_case() -> impl Strategy<Value = (Vec<ProfileId>, SplitStrategy)> {
    participants()
        .prop_filter("needs two participants", |p| p.len() >= 2)
        .prop_flat_map(|ids| {
            let n = ids.len();
            (Just(ids), pieces(10_000, n))
        })
        .prop_map(|(ids, percentages)| {
            let strategy = SplitStrategy::percentages(ids.iter().copied().zip(percentages));
            (ids, strategy)
        })
}

/// Strategy to generate `(total, participants, custom strategy)` with 2+ participants.
fn custom_case() -> impl Strategy<Value = (Decimal, Vec<ProfileId>, SplitStrategy)> {
    (0i64..10_000_000i64, participants())
        .prop_filter("needs two participants", |(_, p)| p.len() >= 2)
        .prop_flat_map(|(cents, ids)| {
            let n = ids.len();
            (Just(Decimal::new(cents, 2)), Just(ids), pieces(cents, n))
        })
        .prop_map(|(total, ids, amounts)| {
            let strategy = SplitStrategy::custom(ids.iter().copied().zip(amounts));
            (total, ids, strategy)
        })
}

fn assert_well_formed(
    result: &SplitResult,
    total: Decimal,
    participants: &[ProfileId],
) -> Result<(), TestCaseError> {
    prop_assert_eq!(result.total(), total, "shares must sum to the total");
    prop_assert_eq!(
        result.participants().collect::<Vec<_>>(),
        participants.to_vec(),
        "shares must cover the participants in order"
    );
    for share in &result.shares {
        prop_assert!(share.amount >= Decimal::ZERO, "negative share {}", share.amount);
        prop_assert_eq!(share.amount.round_dp(2), share.amount);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* non-negative total and participant list, an equal split
    /// conserves the total and covers every participant.
    #[test]
    fn prop_equal_split_conserves_total(
        total in amount(),
        participants in participants(),
    ) {
        let result =
            SplitCalculator::calculate(total, &participants, &SplitStrategy::Equal).unwrap();
        assert_well_formed(&result, total, &participants)?;
    }

    /// *For any* equal split, shares differ from each other by at most the
    /// rounding residual carried by the first participant.
    #[test]
    fn prop_equal_split_tail_shares_identical(
        total in amount(),
        participants in participants(),
    ) {
        let result =
            SplitCalculator::calculate(total, &participants, &SplitStrategy::Equal).unwrap();
        let tail: Vec<_> = result.shares.iter().skip(1).map(|s| s.amount).collect();
        if let Some(first) = tail.first() {
            prop_assert!(tail.iter().all(|a| a == first) || result.shares[0].amount.is_zero());
        }
    }

    /// *For any* percentages summing to 100, the split conserves the total.
    #[test]
    fn prop_percentage_split_conserves_total(
        total in amount(),
        (participants, strategy) in percentage_case(),
    ) {
        let result = SplitCalculator::calculate(total, &participants, &strategy).unwrap();
        assert_well_formed(&result, total, &participants)?;
    }

    /// *For any* custom amounts summing to the total, the split returns them unchanged.
    #[test]
    fn prop_custom_split_is_exact(
        (total, participants, strategy) in custom_case(),
    ) {
        let result = SplitCalculator::calculate(total, &participants, &strategy).unwrap();
        assert_well_formed(&result, total, &participants)?;

        let SplitStrategy::Custom(amounts) = &strategy else {
            unreachable!("custom_case only builds custom strategies");
        };
        for share in &result.shares {
            prop_assert_eq!(share.amount, amounts[&share.profile_id]);
        }
    }

    /// *For any* input, calling the calculator twice gives identical output.
    #[test]
    fn prop_split_is_deterministic(
        total in amount(),
        (participants, strategy) in percentage_case(),
    ) {
        let first = SplitCalculator::calculate(total, &participants, &strategy);
        let second = SplitCalculator::calculate(total, &participants, &strategy);
        prop_assert_eq!(first, second);
    }

    /// *For any* percentage split whose percentages miss 100 by more than
    /// the tolerance, the calculator rejects the parameters.
    #[test]
    fn prop_percentage_off_by_more_than_epsilon_rejected(
        total in amount(),
        (participants, strategy) in percentage_case(),
        drift in 2i64..100,
    ) {
        let SplitStrategy::Percentage(mut percentages) = strategy else {
            unreachable!("percentage_case only builds percentage strategies");
        };
        let (first, value) = percentages.iter().next().map(|(k, v)| (*k, *v)).unwrap();
        let lowered = value - Decimal::new(drift, 2);
        prop_assume!(lowered >= Decimal::ZERO);
        percentages.insert(first, lowered);

        let strategy = SplitStrategy::Percentage(percentages);
        let result = SplitCalculator::calculate(total, &participants, &strategy);
        prop_assert!(matches!(result, Err(SplitError::InvalidStrategyParameters(_))));
    }
}

#[rstest]
#[case::even_three_way(dec!(30.00), &[1, 2, 3], &[dec!(10.00), dec!(10.00), dec!(10.00)])]
#[case::rounding_residual(dec!(10.00), &[1, 2, 3], &[dec!(3.34), dec!(3.33), dec!(3.33)])]
#[case::personal(dec!(7.25), &[1], &[dec!(7.25)])]
fn test_equal_split_scenarios(
    #[case] total: Decimal,
    #[case] ids: &[u128],
    #[case] expected: &[Decimal],
) {
    let participants: Vec<_> = ids.iter().copied().map(pid).collect();
    let result = SplitCalculator::calculate(total, &participants, &SplitStrategy::Equal).unwrap();

    let amounts: Vec<_> = result.shares.iter().map(|s| s.amount).collect();
    assert_eq!(amounts, expected);
    assert_eq!(result.total(), total);
}

#[test]
fn test_percentage_sixty_forty() {
    let strategy = SplitStrategy::percentages([(pid(1), dec!(60)), (pid(2), dec!(40))]);
    let result = SplitCalculator::calculate(dec!(100.00), &[pid(1), pid(2)], &strategy).unwrap();

    assert_eq!(result.share_of(pid(1)), Some(dec!(60.00)));
    assert_eq!(result.share_of(pid(2)), Some(dec!(40.00)));
}

#[rstest]
#[case::sums_to_ninety(&[dec!(60), dec!(30)])]
#[case::sums_to_one_hundred_ten(&[dec!(60), dec!(50)])]
#[case::just_outside_tolerance(&[dec!(60), dec!(39.98)])]
fn test_percentage_sum_mismatch_rejected(#[case] percentages: &[Decimal]) {
    let strategy = SplitStrategy::percentages([(pid(1), percentages[0]), (pid(2), percentages[1])]);
    let err = SplitCalculator::calculate(dec!(100.00), &[pid(1), pid(2)], &strategy).unwrap_err();

    assert!(matches!(err, SplitError::InvalidStrategyParameters(_)));
    assert_eq!(err.error_code(), "INVALID_STRATEGY_PARAMETERS");
}
