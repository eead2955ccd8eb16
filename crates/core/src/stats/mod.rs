//! Expense statistics for reporting.
//!
//! This module provides pure aggregation over already-fetched expenses:
//! - Total, count and average amount
//! - Category breakdown with an uncategorized bucket
//! - Monthly totals in the reporting timezone

pub mod service;
pub mod types;


pub use service::StatisticsService;
pub use types::*;
