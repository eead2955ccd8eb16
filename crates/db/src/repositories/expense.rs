//! Expense repository for database operations.
//!
//! Implements the core [`ExpenseRepository`] port on top of the `expenses`,
//! `group_members` and `categories` tables.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Select,
    Set,
};
use tracing::warn;

use super::category::CategoryRepository;
use crate::entities::{expenses, group_members};
use tally_core::expense::{
    Category, Expense, ExpenseError, ExpenseFilter, ExpenseRepository, NewExpense,
};
use tally_core::split::SplitDetails;
use tally_shared::types::{CategoryId, ExpenseId, GroupId, ProfileId};

/// Expense repository implementation.
#[derive(Clone)]
pub struct ExpenseStore {
    db: DatabaseConnection,
    categories: CategoryRepository,
}

impl ExpenseStore {
    /// Create a new expense repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        let categories = CategoryRepository::new(db.clone());
        Self { db, categories }
    }

    /// The category repository sharing this connection.
    #[must_use]
    pub const fn categories(&self) -> &CategoryRepository {
        &self.categories
    }
}

impl ExpenseRepository for ExpenseStore {
    async fn fetch_group_expenses(&self, group_id: GroupId) -> Result<Vec<Expense>, ExpenseError> {
        let models = expenses::Entity::find()
            .filter(expenses::Column::GroupId.eq(group_id.into_inner()))
            .all(&self.db)
            .await
            .map_err(|e| ExpenseError::repository(e.to_string()))?;

        Ok(models.into_iter().map(to_domain).collect())
    }

    async fn fetch_expenses(
        &self,
        profile_id: ProfileId,
        filter: &ExpenseFilter,
    ) -> Result<Vec<Expense>, ExpenseError> {
        let models = involved_query(profile_id, filter)
            .all(&self.db)
            .await
            .map_err(|e| ExpenseError::repository(e.to_string()))?;

        Ok(models.into_iter().map(to_domain).collect())
    }

    async fn fetch_group_member_ids(
        &self,
        group_id: GroupId,
    ) -> Result<Vec<ProfileId>, ExpenseError> {
        let members = group_members::Entity::find()
            .filter(group_members::Column::GroupId.eq(group_id.into_inner()))
            .all(&self.db)
            .await
            .map_err(|e| ExpenseError::repository(e.to_string()))?;

        Ok(members
            .into_iter()
            .map(|m| ProfileId::from_uuid(m.profile_id))
            .collect())
    }

    async fn save_expense(&self, expense: NewExpense) -> Result<Expense, ExpenseError> {
        let id = ExpenseId::new();
        let split_details = expense
            .split_details
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| ExpenseError::repository(e.to_string()))?;
        let now = Utc::now();

        let model = expenses::ActiveModel {
            id: Set(id.into_inner()),
            description: Set(expense.description.clone()),
            amount: Set(expense.amount),
            category_id: Set(expense.category_id.as_ref().map(|c| c.as_str().to_string())),
            expense_date: Set(expense.expense_date.into()),
            is_group_expense: Set(expense.is_group_expense),
            group_id: Set(expense.group_id.map(GroupId::into_inner)),
            paid_by_profile_id: Set(expense.paid_by.into_inner()),
            involved_profile_ids: Set(expense.involved.iter().map(|p| p.into_inner()).collect()),
            split_details: Set(split_details),
            notes: Set(expense.notes.clone()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        expenses::Entity::insert(model)
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| ExpenseError::repository(e.to_string()))?;

        Ok(expense.with_id(id))
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, ExpenseError> {
        self.categories
            .all()
            .await
            .map_err(|e| ExpenseError::repository(e.to_string()))
    }
}

/// Expenses whose `involved_profile_ids` contain the profile and that match
/// `filter`, newest first.
fn involved_query(profile_id: ProfileId, filter: &ExpenseFilter) -> Select<expenses::Entity> {
    let mut query = expenses::Entity::find().filter(Expr::cust_with_values(
        "? = ANY(involved_profile_ids)",
        [profile_id.into_inner()],
    ));

    if let Some(category_id) = &filter.category_id {
        query = query.filter(expenses::Column::CategoryId.eq(category_id.as_str()));
    }
    if let Some(is_group) = filter.is_group_expense {
        query = query.filter(expenses::Column::IsGroupExpense.eq(is_group));
    }
    if let Some(group_id) = filter.group_id {
        query = query.filter(expenses::Column::GroupId.eq(group_id.into_inner()));
    }
    if let Some(paid_by) = filter.paid_by {
        query = query.filter(expenses::Column::PaidByProfileId.eq(paid_by.into_inner()));
    }
    if let Some(from) = filter.date_from {
        query = query.filter(expenses::Column::ExpenseDate.gte(from));
    }
    if let Some(to) = filter.date_to {
        query = query.filter(expenses::Column::ExpenseDate.lte(to));
    }

    query
        .order_by_desc(expenses::Column::ExpenseDate)
        .order_by_asc(expenses::Column::Id)
        .limit(filter.page.query_limit())
        .offset(filter.page.offset)
}

/// Maps a stored row to the domain record.
///
/// A `split_details` payload that does not parse is dropped, so the record
/// still loads and the aggregators report it.
#[must_use]
pub fn to_domain(model: expenses::Model) -> Expense {
    let id = ExpenseId::from_uuid(model.id);
    let split_details = model.split_details.and_then(|json| {
        serde_json::from_value::<SplitDetails>(json)
            .inspect_err(|e| warn!(expense_id = %id, error = %e, "Malformed split details"))
            .ok()
    });

    Expense {
        id,
        description: model.description,
        amount: model.amount,
        category_id: model.category_id.map(CategoryId::new),
        expense_date: model.expense_date.with_timezone(&Utc),
        is_group_expense: model.is_group_expense,
        group_id: model.group_id.map(GroupId::from_uuid),
        paid_by: ProfileId::from_uuid(model.paid_by_profile_id),
        involved: model
            .involved_profile_ids
            .into_iter()
            .map(ProfileId::from_uuid)
            .collect(),
        split_details,
        notes: model.notes,
    }
}
