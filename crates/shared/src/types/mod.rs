//! Common types used across the application.

pub mod id;
pub mod money;
pub mod pagination;

pub use id::*;
pub use money::{
    Currency, MAX_AMOUNT, MINOR_UNIT_DP, SETTLED_EPSILON, SPLIT_EPSILON, is_settled,
    round_currency,
};
pub use pagination::PageRequest;
