//! Statistics data types.

use std::collections::HashMap;

use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::CategoryId;

use crate::expense::Category;

/// Display name of the bucket for expenses without a category.
pub const UNCATEGORIZED_NAME: &str = "Uncategorized";

/// Summary statistics over a set of expenses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseStats {
    /// Sum of all amounts.
    pub total_amount: Decimal,
    /// Number of expenses counted.
    pub expense_count: u64,
    /// Average amount, rounded to the minor unit. Zero without expenses.
    pub average_amount: Decimal,
    /// Totals per category, largest first.
    pub category_breakdown: Vec<CategoryTotal>,
    /// Totals per calendar month, oldest first.
    pub monthly_totals: Vec<MonthlyTotal>,
}

impl ExpenseStats {
    /// Statistics over no expenses.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            total_amount: Decimal::ZERO,
            expense_count: 0,
            average_amount: Decimal::ZERO,
            category_breakdown: Vec::new(),
            monthly_totals: Vec::new(),
        }
    }
}

/// Subtotal of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    /// Category key, `uncategorized` for expenses without one.
    pub category_id: CategoryId,
    /// Display name.
    pub category_name: String,
    /// Sum of amounts.
    pub total_amount: Decimal,
    /// Number of expenses.
    pub expense_count: u64,
}

/// Subtotal of one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    /// Month key, `YYYY-MM`.
    pub month: String,
    /// Sum of amounts.
    pub total_amount: Decimal,
    /// Number of expenses.
    pub expense_count: u64,
}

/// Category display names by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryCatalog(HashMap<CategoryId, String>);

impl CategoryCatalog {
    /// Display name for a category; unknown keys fall back to the key itself.
    #[must_use]
    pub fn name_of(&self, id: &CategoryId) -> String {
        if id.as_str() == CategoryId::UNCATEGORIZED {
            return UNCATEGORIZED_NAME.to_string();
        }
        self.0
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.as_str().to_string())
    }
}

impl From<&[Category]> for CategoryCatalog {
    fn from(categories: &[Category]) -> Self {
        Self(
            categories
                .iter()
                .map(|c| (c.id.clone(), c.name.clone()))
                .collect(),
        )
    }
}

/// Options for computing statistics.
#[derive(Debug, Clone)]
pub struct StatsOptions {
    /// Timezone in which expense dates are bucketed into months.
    pub timezone: Tz,
    /// Category names.
    pub categories: CategoryCatalog,
}

impl Default for StatsOptions {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            categories: CategoryCatalog::default(),
        }
    }
}

impl StatsOptions {
    /// Options for a timezone with an empty catalog.
    #[must_use]
    pub fn in_timezone(timezone: Tz) -> Self {
        Self {
            timezone,
            ..Self::default()
        }
    }

    /// Replaces the category catalog.
    #[must_use]
    pub fn with_categories(mut self, categories: &[Category]) -> Self {
        self.categories = CategoryCatalog::from(categories);
        self
    }
}
