//! Expense records, query filters and categories.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{CategoryId, ExpenseId, GroupId, PageRequest, ProfileId};

use crate::split::{SplitDetails, SplitRequest};

/// A stored expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// Expense ID.
    pub id: ExpenseId,
    /// Short description.
    pub description: String,
    /// Total amount, two decimal places.
    pub amount: Decimal,
    /// Category, if one was picked.
    pub category_id: Option<CategoryId>,
    /// When the expense happened.
    pub expense_date: DateTime<Utc>,
    /// Whether the expense is shared within a group.
    pub is_group_expense: bool,
    /// Group the expense belongs to.
    pub group_id: Option<GroupId>,
    /// Who paid.
    pub paid_by: ProfileId,
    /// Everyone the expense concerns, payer included.
    pub involved: Vec<ProfileId>,
    /// Stored split, `None` for most personal expenses.
    pub split_details: Option<SplitDetails>,
    /// Free-text notes.
    pub notes: Option<String>,
}

impl Expense {
    /// Returns true if the profile paid for or is involved in the expense.
    #[must_use]
    pub fn involves(&self, profile_id: ProfileId) -> bool {
        self.paid_by == profile_id || self.involved.contains(&profile_id)
    }
}

/// An expense about to be stored. The ID is assigned by persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExpense {
    /// Short description.
    pub description: String,
    /// Total amount, two decimal places.
    pub amount: Decimal,
    /// Category.
    pub category_id: Option<CategoryId>,
    /// When the expense happened.
    pub expense_date: DateTime<Utc>,
    /// Group flag.
    pub is_group_expense: bool,
    /// Group.
    pub group_id: Option<GroupId>,
    /// Payer.
    pub paid_by: ProfileId,
    /// Involved profiles.
    pub involved: Vec<ProfileId>,
    /// Computed split.
    pub split_details: Option<SplitDetails>,
    /// Notes.
    pub notes: Option<String>,
}

impl NewExpense {
    /// Attaches the ID assigned by persistence.
    #[must_use]
    pub fn with_id(self, id: ExpenseId) -> Expense {
        Expense {
            id,
            description: self.description,
            amount: self.amount,
            category_id: self.category_id,
            expense_date: self.expense_date,
            is_group_expense: self.is_group_expense,
            group_id: self.group_id,
            paid_by: self.paid_by,
            involved: self.involved,
            split_details: self.split_details,
            notes: self.notes,
        }
    }
}

/// Form input for creating an expense.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateExpenseInput {
    /// Short description, must not be blank.
    pub description: String,
    /// Total amount, must not be negative.
    pub amount: Decimal,
    /// Category.
    pub category_id: Option<CategoryId>,
    /// When the expense happened.
    pub expense_date: DateTime<Utc>,
    /// Group for shared expenses. `None` makes it a personal expense.
    pub group_id: Option<GroupId>,
    /// Payer.
    pub paid_by: ProfileId,
    /// Involved profiles in display order. Empty means only the payer.
    #[serde(default)]
    pub involved: Vec<ProfileId>,
    /// How a group expense is split.
    #[serde(default = "default_split")]
    pub split: SplitRequest,
    /// Notes.
    pub notes: Option<String>,
}

const fn default_split() -> SplitRequest {
    SplitRequest::Equal
}

/// Filter for listing expenses.
///
/// Every set field must match. Results are newest first and windowed by
/// `page`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseFilter {
    /// Only this category.
    pub category_id: Option<CategoryId>,
    /// Only group (or only personal) expenses.
    pub is_group_expense: Option<bool>,
    /// Only this group.
    pub group_id: Option<GroupId>,
    /// Only expenses paid by this profile.
    pub paid_by: Option<ProfileId>,
    /// Inclusive lower bound on `expense_date`.
    pub date_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `expense_date`.
    pub date_to: Option<DateTime<Utc>>,
    /// Result window.
    #[serde(default)]
    pub page: PageRequest,
}

impl ExpenseFilter {
    /// Filter for one group.
    #[must_use]
    pub fn for_group(group_id: GroupId) -> Self {
        Self {
            group_id: Some(group_id),
            ..Self::default()
        }
    }

    /// Filter for the last `days` days up to `now`, at most `limit` records.
    ///
    /// Negative `days` count as zero. A window reaching past the earliest
    /// representable date starts there.
    #[must_use]
    pub fn recent(now: DateTime<Utc>, days: i64, limit: u64) -> Self {
        Self {
            date_from: Some(
                Duration::try_days(days.max(0))
                    .and_then(|span| now.checked_sub_signed(span))
                    .unwrap_or(DateTime::<Utc>::MIN_UTC),
            ),
            date_to: Some(now),
            page: PageRequest::first(limit),
            ..Self::default()
        }
    }

    /// Returns true if the expense passes every set field.
    ///
    /// Involvement and paging are not part of the predicate.
    #[must_use]
    pub fn matches(&self, expense: &Expense) -> bool {
        self.category_id
            .as_ref()
            .is_none_or(|c| expense.category_id.as_ref() == Some(c))
            && self
                .is_group_expense
                .is_none_or(|g| expense.is_group_expense == g)
            && self.group_id.is_none_or(|g| expense.group_id == Some(g))
            && self.paid_by.is_none_or(|p| expense.paid_by == p)
            && self.date_from.is_none_or(|from| expense.expense_date >= from)
            && self.date_to.is_none_or(|to| expense.expense_date <= to)
    }
}

/// An expense category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Slug key.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// Emoji icon.
    pub icon: Option<String>,
}

impl Category {
    fn new(id: &str, name: &str, icon: &str) -> Self {
        Self {
            id: CategoryId::new(id),
            name: name.to_string(),
            icon: Some(icon.to_string()),
        }
    }
}

/// The category catalog every installation starts with.
#[must_use]
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new("food", "Food & Dining", "🍽️"),
        Category::new("transport", "Transportation", "🚗"),
        Category::new("home", "Home & Utilities", "🏠"),
        Category::new("entertainment", "Entertainment", "🎬"),
        Category::new("shopping", "Shopping", "🛍️"),
        Category::new("health", "Health & Fitness", "🏥"),
        Category::new("travel", "Travel", "✈️"),
        Category::new("education", "Education", "📚"),
        Category::new("other", "Other", "📦"),
    ]
}
