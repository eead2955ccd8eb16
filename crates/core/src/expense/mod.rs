//! Expense records and their orchestration.
//!
//! This module ties the pure calculators to persistence:
//! - Expense, filter and category types
//! - The repository port implemented by the db crate
//! - Expense creation with validation and split calculation
//! - Balances and statistics over stored expenses

mod error;
mod service;
mod types;

pub use error::ExpenseError;
pub use service::{ExpenseRepository, ExpenseService};
pub use types::{
    Category, CreateExpenseInput, Expense, ExpenseFilter, NewExpense, default_categories,
};
