//! Balance types.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use tally_shared::types::{ProfileId, is_settled};

/// Net signed amounts per profile, iterated in profile order.
///
/// Relative to a reference participant a positive amount means the
/// counterparty owes the reference, a negative amount means the reference
/// owes the counterparty. As group positions a positive amount means the
/// member is owed money by the group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Balances(BTreeMap<ProfileId, Decimal>);

impl Balances {
    /// Creates an empty balance sheet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `delta` to the entry of `profile_id`.
    pub fn add(&mut self, profile_id: ProfileId, delta: Decimal) {
        *self.0.entry(profile_id).or_default() += delta;
    }

    /// Net amount of a profile, if it has an entry.
    #[must_use]
    pub fn get(&self, profile_id: ProfileId) -> Option<Decimal> {
        self.0.get(&profile_id).copied()
    }

    /// All entries in profile order, settled ones included.
    pub fn iter(&self) -> impl Iterator<Item = (ProfileId, Decimal)> + '_ {
        self.0.iter().map(|(id, amount)| (*id, *amount))
    }

    /// Entries for display: settled ones are left out.
    pub fn unsettled(&self) -> impl Iterator<Item = BalanceEntry> + '_ {
        self.iter()
            .filter(|(_, amount)| !is_settled(*amount))
            .map(|(profile_id, amount)| BalanceEntry { profile_id, amount })
    }

    /// Sum of every entry, settled ones included.
    #[must_use]
    pub fn net_total(&self) -> Decimal {
        self.0.values().copied().sum()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(ProfileId, Decimal)> for Balances {
    fn from_iter<I: IntoIterator<Item = (ProfileId, Decimal)>>(iter: I) -> Self {
        let mut balances = Self::new();
        for (profile_id, delta) in iter {
            balances.add(profile_id, delta);
        }
        balances
    }
}

/// Which way money flows for one balance entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceDirection {
    /// The counterparty owes the reference participant.
    OwesYou,
    /// The reference participant owes the counterparty.
    YouOwe,
    /// Nothing is owed either way.
    Settled,
}

/// One unsettled balance line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BalanceEntry {
    /// Counterparty.
    pub profile_id: ProfileId,
    /// Signed net amount.
    pub amount: Decimal,
}

impl BalanceEntry {
    /// Direction of the balance.
    #[must_use]
    pub fn direction(&self) -> BalanceDirection {
        if is_settled(self.amount) {
            BalanceDirection::Settled
        } else if self.amount.is_sign_positive() {
            BalanceDirection::OwesYou
        } else {
            BalanceDirection::YouOwe
        }
    }
}
