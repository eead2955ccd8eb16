//! Expense split computation.
//!
//! This module turns a total amount, an ordered participant list and a
//! [`SplitStrategy`] into per-participant owed amounts:
//! - Strategy and result types, including the stored `split_details` shape
//! - Parameter validation with typed errors
//! - Round-half-up shares with the rounding residual absorbed by the first participant
//! - Form-level split requests relative to the acting participant

pub mod calculator;
pub mod error;
pub mod request;
pub mod types;

#[cfg(test)]
mod calculator_props;

pub use calculator::SplitCalculator;
pub use error::{ParameterIssue, SplitError};
pub use request::SplitRequest;
pub use types::{SplitDetails, SplitParticipant, SplitResult, SplitShare, SplitStrategy, SplitType};
