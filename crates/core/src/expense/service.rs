//! Expense service implementation.

use std::sync::Arc;

use chrono::Utc;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use tally_shared::types::{GroupId, PageRequest, ProfileId, round_currency};
use tracing::{debug, info, warn};

use super::error::ExpenseError;
use super::types::{Category, CreateExpenseInput, Expense, ExpenseFilter, NewExpense};
use crate::balance::{BalanceAggregator, Balances};
use crate::integrity::Aggregated;
use crate::split::{SplitCalculator, SplitRequest, SplitResult};
use crate::stats::{ExpenseStats, StatisticsService, StatsOptions};

/// Repository trait for expense persistence.
///
/// This trait is implemented by the db crate to provide actual database operations.
pub trait ExpenseRepository: Send + Sync {
    /// All expenses of a group, in any order.
    fn fetch_group_expenses(
        &self,
        group_id: GroupId,
    ) -> impl std::future::Future<Output = Result<Vec<Expense>, ExpenseError>> + Send;

    /// Expenses the profile is involved in that match `filter`, newest first.
    fn fetch_expenses(
        &self,
        profile_id: ProfileId,
        filter: &ExpenseFilter,
    ) -> impl std::future::Future<Output = Result<Vec<Expense>, ExpenseError>> + Send;

    /// Profiles that belong to a group.
    fn fetch_group_member_ids(
        &self,
        group_id: GroupId,
    ) -> impl std::future::Future<Output = Result<Vec<ProfileId>, ExpenseError>> + Send;

    /// Stores a new expense and returns it with its assigned ID.
    fn save_expense(
        &self,
        expense: NewExpense,
    ) -> impl std::future::Future<Output = Result<Expense, ExpenseError>> + Send;

    /// The category catalog.
    fn fetch_categories(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Category>, ExpenseError>> + Send;
}

/// Expense service: validates and stores expenses, and derives balances
/// and statistics from stored ones.
pub struct ExpenseService<R: ExpenseRepository> {
    repo: Arc<R>,
}

impl<R: ExpenseRepository> ExpenseService<R> {
    /// Create a new expense service.
    #[must_use]
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Live split preview for the expense form.
    ///
    /// Returns `None` while the form input cannot be split yet.
    #[must_use]
    pub fn preview_split(
        actor: ProfileId,
        total: Decimal,
        participants: &[ProfileId],
        request: SplitRequest,
    ) -> Option<SplitResult> {
        let strategy = request.resolve(actor, total, participants).ok()?;
        SplitCalculator::preview(total, participants, &strategy)
    }

    /// Validates, splits and stores a new expense.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Description is blank or amount is negative
    /// - The actor neither paid nor is involved
    /// - A participant of a group expense is not a group member
    /// - The split request does not fit the involved profiles, for example a
    ///   percentage or custom split of a one-person expense
    /// - The repository fails
    pub async fn create_expense(
        &self,
        actor: ProfileId,
        input: CreateExpenseInput,
    ) -> Result<Expense, ExpenseError> {
        let description = input.description.trim();
        if description.is_empty() {
            return Err(ExpenseError::EmptyDescription);
        }
        if input.amount < Decimal::ZERO {
            return Err(ExpenseError::NegativeAmount);
        }
        let amount = round_currency(input.amount);

        let involved = if input.involved.is_empty() {
            vec![input.paid_by]
        } else {
            input.involved
        };
        if input.paid_by != actor && !involved.contains(&actor) {
            return Err(ExpenseError::NotInvolved);
        }

        if let Some(group_id) = input.group_id {
            let members = self.repo.fetch_group_member_ids(group_id).await?;
            if let Some(outsider) = std::iter::once(&input.paid_by)
                .chain(&involved)
                .find(|id| !members.contains(*id))
            {
                return Err(ExpenseError::NotGroupMember(*outsider));
            }
        }
        let strategy = input.split.resolve(actor, amount, &involved)?;
        let split = SplitCalculator::calculate(amount, &involved, &strategy)?;

        let expense = self
            .repo
            .save_expense(NewExpense {
                description: description.to_string(),
                amount,
                category_id: input.category_id,
                expense_date: input.expense_date,
                is_group_expense: input.group_id.is_some(),
                group_id: input.group_id,
                paid_by: input.paid_by,
                involved,
                split_details: Some(split.to_details()),
                notes: input.notes,
            })
            .await?;

        info!(
            expense_id = %expense.id,
            paid_by = %expense.paid_by,
            amount = %expense.amount,
            split_type = %split.split_type,
            "Expense created"
        );
        Ok(expense)
    }

    /// Lists expenses the profile is involved in, newest first.
    pub async fn list_expenses(
        &self,
        profile_id: ProfileId,
        filter: &ExpenseFilter,
    ) -> Result<Vec<Expense>, ExpenseError> {
        self.repo.fetch_expenses(profile_id, filter).await
    }

    /// Expenses of the last `days` days, at most `limit` of them.
    pub async fn recent_expenses(
        &self,
        profile_id: ProfileId,
        days: i64,
        limit: u64,
    ) -> Result<Vec<Expense>, ExpenseError> {
        let filter = ExpenseFilter::recent(Utc::now(), days, limit);
        self.repo.fetch_expenses(profile_id, &filter).await
    }

    /// Net balances of every counterparty relative to `reference` in a group.
    ///
    /// Unusable records are logged and left out.
    pub async fn group_balances(
        &self,
        reference: ProfileId,
        group_id: GroupId,
    ) -> Result<Balances, ExpenseError> {
        let expenses = self.repo.fetch_group_expenses(group_id).await?;
        let balances = report(
            BalanceAggregator::compute_balances(reference, &expenses),
            "group balances",
        );
        debug!(
            group_id = %group_id,
            reference = %reference,
            counterparties = balances.len(),
            "Computed group balances"
        );
        Ok(balances)
    }

    /// Net position of every member of a group.
    pub async fn group_positions(&self, group_id: GroupId) -> Result<Balances, ExpenseError> {
        let expenses = self.repo.fetch_group_expenses(group_id).await?;
        let positions = report(
            BalanceAggregator::compute_group_positions(&expenses),
            "group positions",
        );
        debug!(
            group_id = %group_id,
            members = positions.len(),
            net = %positions.net_total(),
            "Computed group positions"
        );
        Ok(positions)
    }

    /// Statistics over every expense the profile is involved in that
    /// matches `filter`.
    ///
    /// The page window of `filter` is ignored. Months are bucketed in
    /// `timezone`.
    pub async fn statistics(
        &self,
        profile_id: ProfileId,
        filter: &ExpenseFilter,
        timezone: Tz,
    ) -> Result<ExpenseStats, ExpenseError> {
        let filter = ExpenseFilter {
            page: PageRequest::unbounded(),
            ..filter.clone()
        };
        let expenses = self.repo.fetch_expenses(profile_id, &filter).await?;
        let categories = self.repo.fetch_categories().await?;
        let options = StatsOptions::in_timezone(timezone).with_categories(&categories);

        let stats = report(
            StatisticsService::compute_statistics(&expenses, &options),
            "statistics",
        );
        debug!(
            profile_id = %profile_id,
            expense_count = stats.expense_count,
            total = %stats.total_amount,
            "Computed expense statistics"
        );
        Ok(stats)
    }
}

/// Logs skipped records and unwraps the aggregate.
fn report<T>(aggregated: Aggregated<T>, what: &str) -> T {
    for anomaly in &aggregated.anomalies {
        warn!(
            expense_id = %anomaly.expense_id,
            anomaly = %anomaly.kind,
            "Skipped expense while computing {what}"
        );
    }
    aggregated.into_value()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use tally_shared::types::{CategoryId, ExpenseId};
    use uuid::Uuid;

    use super::*;
    use crate::expense::default_categories;
    use crate::split::{ParameterIssue, SplitError, SplitType};

    fn pid(n: u128) -> ProfileId {
        ProfileId::from_uuid(Uuid::from_u128(n))
    }

    fn gid(n: u128) -> GroupId {
        GroupId::from_uuid(Uuid::from_u128(n))
    }

    /// In-memory repository for service tests.
    #[derive(Default)]
    struct InMemoryRepo {
        expenses: Mutex<Vec<Expense>>,
        members: Vec<(GroupId, ProfileId)>,
    }

    impl InMemoryRepo {
        fn with_group(group_id: GroupId, members: &[ProfileId]) -> Self {
            Self {
                members: members.iter().map(|m| (group_id, *m)).collect(),
                ..Self::default()
            }
        }
    }

    impl ExpenseRepository for InMemoryRepo {
        async fn fetch_group_expenses(
            &self,
            group_id: GroupId,
        ) -> Result<Vec<Expense>, ExpenseError> {
            let expenses = self.expenses.lock().unwrap();
            Ok(expenses
                .iter()
                .filter(|e| e.group_id == Some(group_id))
                .cloned()
                .collect())
        }

        async fn fetch_expenses(
            &self,
            profile_id: ProfileId,
            filter: &ExpenseFilter,
        ) -> Result<Vec<Expense>, ExpenseError> {
            let mut expenses: Vec<Expense> = self
                .expenses
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.involved.contains(&profile_id) && filter.matches(e))
                .cloned()
                .collect();
            expenses.sort_by(|a, b| b.expense_date.cmp(&a.expense_date));
            Ok(filter.page.apply(expenses.into_iter()).collect())
        }

        async fn fetch_group_member_ids(
            &self,
            group_id: GroupId,
        ) -> Result<Vec<ProfileId>, ExpenseError> {
            Ok(self
                .members
                .iter()
                .filter(|(g, _)| *g == group_id)
                .map(|(_, p)| *p)
                .collect())
        }

        async fn save_expense(&self, expense: NewExpense) -> Result<Expense, ExpenseError> {
            let mut expenses = self.expenses.lock().unwrap();
            let id = ExpenseId::from_uuid(Uuid::from_u128(expenses.len() as u128 + 1));
            let stored = expense.with_id(id);
            expenses.push(stored.clone());
            Ok(stored)
        }

        async fn fetch_categories(&self) -> Result<Vec<Category>, ExpenseError> {
            Ok(default_categories())
        }
    }

    fn input(description: &str, amount: Decimal, paid_by: ProfileId) -> CreateExpenseInput {
        CreateExpenseInput {
            description: description.to_string(),
            amount,
            category_id: Some(CategoryId::new("food")),
            expense_date: Utc.with_ymd_and_hms(2025, 5, 10, 19, 0, 0).unwrap(),
            group_id: None,
            paid_by,
            involved: Vec::new(),
            split: SplitRequest::Equal,
            notes: None,
        }
    }

    fn group_service() -> ExpenseService<InMemoryRepo> {
        ExpenseService::new(Arc::new(InMemoryRepo::with_group(
            gid(1),
            &[pid(1), pid(2), pid(3)],
        )))
    }

    #[tokio::test]
    async fn test_personal_expense_gets_full_amount_split() {
        let service = ExpenseService::new(Arc::new(InMemoryRepo::default()));
        let expense = service
            .create_expense(pid(1), input("  Lunch  ", dec!(12.345), pid(1)))
            .await
            .unwrap();

        assert_eq!(expense.description, "Lunch");
        assert_eq!(expense.amount, dec!(12.35));
        assert!(!expense.is_group_expense);
        assert_eq!(expense.involved, vec![pid(1)]);

        let details = expense.split_details.unwrap();
        assert_eq!(details.split_type, SplitType::Equal);
        assert_eq!(details.share_of(pid(1)), Some(dec!(12.35)));
    }

    #[tokio::test]
    async fn test_group_expense_with_percentage_request() {
        let service = group_service();
        let mut request = input("Dinner", dec!(100), pid(1));
        request.group_id = Some(gid(1));
        request.involved = vec![pid(1), pid(2), pid(3)];
        request.split = SplitRequest::Percentage {
            own_percentage: dec!(50),
        };

        let expense = service.create_expense(pid(1), request).await.unwrap();
        let details = expense.split_details.unwrap();

        assert!(expense.is_group_expense);
        assert_eq!(details.split_type, SplitType::Percentage);
        assert_eq!(details.share_of(pid(1)), Some(dec!(50.00)));
        assert_eq!(details.share_of(pid(2)), Some(dec!(25.00)));
        assert_eq!(details.share_of(pid(3)), Some(dec!(25.00)));
        assert_eq!(details.total(), dec!(100));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let service = group_service();

        let err = service
            .create_expense(pid(1), input("   ", dec!(5), pid(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, ExpenseError::EmptyDescription));

        let err = service
            .create_expense(pid(1), input("Refund", dec!(-5), pid(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, ExpenseError::NegativeAmount));

        let err = service
            .create_expense(pid(9), input("Taxi", dec!(5), pid(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, ExpenseError::NotInvolved));
        assert_eq!(err.http_status_code(), 403);
    }

    #[tokio::test]
    async fn test_group_expense_requires_membership() {
        let service = group_service();
        let mut request = input("Cinema", dec!(30), pid(1));
        request.group_id = Some(gid(1));
        request.involved = vec![pid(1), pid(4)];

        let err = service.create_expense(pid(1), request).await.unwrap_err();
        assert!(matches!(err, ExpenseError::NotGroupMember(p) if p == pid(4)));
    }

    #[tokio::test]
    async fn test_invalid_split_is_not_persisted() {
        let service = group_service();
        let mut request = input("Hotel", dec!(100), pid(1));
        request.group_id = Some(gid(1));
        request.involved = vec![pid(1), pid(2)];
        request.split = SplitRequest::Custom {
            own_amount: dec!(150),
        };

        let err = service.create_expense(pid(1), request).await.unwrap_err();
        assert!(matches!(
            err,
            ExpenseError::Split(SplitError::InvalidStrategyParameters(
                ParameterIssue::AmountExceedsTotal { .. }
            ))
        ));
        assert!(service.repo.expenses.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_group_balances_and_positions() {
        let service = group_service();
        for (payer, amount) in [(pid(1), dec!(90)), (pid(2), dec!(30))] {
            let mut request = input("Groceries", amount, payer);
            request.group_id = Some(gid(1));
            request.involved = vec![pid(1), pid(2), pid(3)];
            service.create_expense(payer, request).await.unwrap();
        }

        let balances = service.group_balances(pid(1), gid(1)).await.unwrap();
        assert_eq!(balances.get(pid(2)), Some(dec!(20)));
        assert_eq!(balances.get(pid(3)), Some(dec!(30)));

        let positions = service.group_positions(gid(1)).await.unwrap();
        assert_eq!(positions.get(pid(1)), Some(dec!(50)));
        assert_eq!(positions.get(pid(2)), Some(dec!(-10)));
        assert_eq!(positions.get(pid(3)), Some(dec!(-40)));
        assert_eq!(positions.net_total(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_group_balances_skip_corrupt_records() {
        let service = group_service();
        let mut request = input("Fuel", dec!(40), pid(2));
        request.group_id = Some(gid(1));
        request.involved = vec![pid(1), pid(2)];
        service.create_expense(pid(2), request).await.unwrap();

        service.repo.expenses.lock().unwrap().push(Expense {
            id: ExpenseId::from_uuid(Uuid::from_u128(99)),
            description: "legacy".to_string(),
            amount: dec!(500),
            category_id: None,
            expense_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            is_group_expense: true,
            group_id: Some(gid(1)),
            paid_by: pid(2),
            involved: vec![pid(1), pid(2)],
            split_details: None,
            notes: None,
        });

        let balances = service.group_balances(pid(1), gid(1)).await.unwrap();
        assert_eq!(balances.get(pid(2)), Some(dec!(-20)));
    }

    #[tokio::test]
    async fn test_statistics_resolve_category_names() {
        let service = group_service();
        service
            .create_expense(pid(1), input("Lunch", dec!(10), pid(1)))
            .await
            .unwrap();
        let mut uncategorized = input("Misc", dec!(5), pid(1));
        uncategorized.category_id = None;
        service.create_expense(pid(1), uncategorized).await.unwrap();

        let stats = service
            .statistics(pid(1), &ExpenseFilter::default(), Tz::UTC)
            .await
            .unwrap();

        assert_eq!(stats.expense_count, 2);
        assert_eq!(stats.average_amount, dec!(7.50));
        assert_eq!(stats.category_breakdown[0].category_name, "Food & Dining");
        assert_eq!(stats.category_breakdown[1].category_name, "Uncategorized");
        assert_eq!(stats.monthly_totals[0].month, "2025-05");
    }

    #[tokio::test]
    async fn test_personal_expense_keeps_requested_split() {
        let service = ExpenseService::new(Arc::new(InMemoryRepo::default()));
        let mut request = input("Concert tickets", dec!(100), pid(1));
        request.involved = vec![pid(1), pid(2)];
        request.split = SplitRequest::Custom {
            own_amount: dec!(90),
        };

        let expense = service.create_expense(pid(1), request).await.unwrap();
        let details = expense.split_details.unwrap();

        assert!(!expense.is_group_expense);
        assert_eq!(details.split_type, SplitType::Custom);
        assert_eq!(details.share_of(pid(1)), Some(dec!(90)));
        assert_eq!(details.share_of(pid(2)), Some(dec!(10)));
    }

    #[tokio::test]
    async fn test_uneven_split_of_one_person_expense_is_rejected() {
        let service = ExpenseService::new(Arc::new(InMemoryRepo::default()));
        let mut request = input("Book", dec!(20), pid(1));
        request.split = SplitRequest::Percentage {
            own_percentage: dec!(100),
        };

        let err = service.create_expense(pid(1), request).await.unwrap_err();
        assert!(matches!(
            err,
            ExpenseError::Split(SplitError::InsufficientParticipants {
                required: 2,
                actual: 1
            })
        ));
        assert!(service.repo.expenses.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_statistics_cover_more_than_one_page() {
        let service = ExpenseService::new(Arc::new(InMemoryRepo::default()));
        for _ in 0..60 {
            service
                .create_expense(pid(1), input("Coffee", dec!(1.00), pid(1)))
                .await
                .unwrap();
        }

        let stats = service
            .statistics(pid(1), &ExpenseFilter::default(), Tz::UTC)
            .await
            .unwrap();
        assert_eq!(stats.expense_count, 60);
        assert_eq!(stats.total_amount, dec!(60.00));

        let listed = service
            .list_expenses(pid(1), &ExpenseFilter::default())
            .await
            .unwrap();
        assert_eq!(listed.len(), 50);
    }

    #[tokio::test]
    async fn test_recent_expenses_with_huge_day_count() {
        let service = ExpenseService::new(Arc::new(InMemoryRepo::default()));
        let mut old = input("Deposit", dec!(300), pid(1));
        old.expense_date = Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap();
        service.create_expense(pid(1), old).await.unwrap();

        let recent = service.recent_expenses(pid(1), i64::MAX, 10).await.unwrap();
        assert_eq!(recent.len(), 1);
    }

    #[test]
    fn test_preview_split() {
        let preview = ExpenseService::<InMemoryRepo>::preview_split(
            pid(1),
            dec!(10),
            &[pid(1), pid(2), pid(3)],
            SplitRequest::Equal,
        )
        .unwrap();
        assert_eq!(preview.share_of(pid(1)), Some(dec!(3.34)));

        let invalid = ExpenseService::<InMemoryRepo>::preview_split(
            pid(1),
            dec!(10),
            &[pid(1), pid(2)],
            SplitRequest::Percentage {
                own_percentage: dec!(120),
            },
        );
        assert!(invalid.is_none());
    }
}
