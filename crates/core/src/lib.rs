//! Core business logic for Tally.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Split rules, balance folding and reporting aggregates live here; persistence
//! is reached only through the [`expense::ExpenseRepository`] port.
//!
//! # Modules
//!
//! - `split` - Turning a total and a split strategy into per-participant shares
//! - `balance` - Folding stored group expenses into net pairwise balances
//! - `stats` - Totals, category breakdown and monthly totals for reporting
//! - `expense` - Expense records, the repository port and the orchestration service
//! - `integrity` - Data-integrity anomalies found while folding stored records

pub mod balance;
pub mod expense;
pub mod integrity;
pub mod split;
pub mod stats;
