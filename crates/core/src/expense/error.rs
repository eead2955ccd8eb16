//! Expense error types.

use tally_shared::AppError;
use tally_shared::types::ProfileId;
use thiserror::Error;

use crate::split::SplitError;

/// Expense operation errors.
#[derive(Debug, Error)]
pub enum ExpenseError {
    /// Description is blank.
    #[error("description must not be empty")]
    EmptyDescription,

    /// Amount is below zero.
    #[error("amount must not be negative")]
    NegativeAmount,

    /// The acting profile neither paid nor is involved.
    #[error("you can only create expenses you are involved in")]
    NotInvolved,

    /// A participant of a group expense is not a member of the group.
    #[error("profile {0} is not a member of the group")]
    NotGroupMember(ProfileId),

    /// The split could not be computed.
    #[error(transparent)]
    Split(#[from] SplitError),

    /// Repository operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl ExpenseError {
    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyDescription => "EMPTY_DESCRIPTION",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::NotInvolved => "NOT_INVOLVED",
            Self::NotGroupMember(_) => "NOT_GROUP_MEMBER",
            Self::Split(e) => e.error_code(),
            Self::Repository(_) => "REPOSITORY_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::EmptyDescription | Self::NegativeAmount | Self::NotGroupMember(_) => 400,
            Self::Split(e) => e.http_status_code(),
            Self::NotInvolved => 403,
            Self::Repository(_) => 500,
        }
    }
}

impl From<ExpenseError> for AppError {
    fn from(err: ExpenseError) -> Self {
        match err {
            ExpenseError::NotInvolved => Self::Forbidden(err.to_string()),
            ExpenseError::Repository(msg) => Self::Database(msg),
            ExpenseError::EmptyDescription
            | ExpenseError::NegativeAmount
            | ExpenseError::NotGroupMember(_)
            | ExpenseError::Split(_) => Self::Validation(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::split::ParameterIssue;
    use rust_decimal_macros::dec;

    #[test]
    fn test_split_errors_keep_their_code() {
        let err = ExpenseError::from(SplitError::from(ParameterIssue::PercentageSum {
            sum: dec!(90),
        }));
        assert_eq!(err.error_code(), "INVALID_STRATEGY_PARAMETERS");
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(
            err.to_string(),
            "Invalid split parameters: percentages sum to 90, expected 100"
        );
    }

    #[test]
    fn test_conversion_to_app_error() {
        let app: AppError = ExpenseError::NotInvolved.into();
        assert_eq!(app.status_code(), 403);

        let app: AppError = ExpenseError::repository("connection reset").into();
        assert_eq!(app.error_code(), "DATABASE_ERROR");
        assert_eq!(app.to_string(), "Database error: connection reset");

        let app: AppError = ExpenseError::EmptyDescription.into();
        assert!(app.is_recoverable());
    }
}
