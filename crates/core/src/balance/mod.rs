//! Balance aggregation.
//!
//! Folds stored group expenses into net balances:
//! - Per counterparty, relative to one reference participant ("who owes whom")
//! - Per member, as net positions across a whole group
//!
//! Both folds work on the stored `split_details`, not on the split strategy,
//! and skip records that cannot be used.

pub mod aggregator;
pub mod types;

#[cfg(test)]
mod aggregator_props;

pub use aggregator::BalanceAggregator;
pub use types::{BalanceDirection, BalanceEntry, Balances};
