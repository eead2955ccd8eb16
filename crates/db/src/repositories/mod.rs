//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod category;
pub mod expense;

pub use category::{CategoryError, CategoryRepository};
pub use expense::ExpenseStore;
