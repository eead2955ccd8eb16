//! Statistics computation.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use tally_shared::types::{CategoryId, round_currency};

use super::types::{CategoryTotal, ExpenseStats, MonthlyTotal, StatsOptions};
use crate::expense::Expense;
use crate::integrity::{Aggregated, AnomalyKind, ExpenseAnomaly};

#[derive(Default)]
struct Subtotal {
    total: Decimal,
    count: u64,
}

impl Subtotal {
    fn add(&mut self, amount: Decimal) {
        self.total += amount;
        self.count += 1;
    }
}

/// Service for computing expense statistics.
pub struct StatisticsService;

impl StatisticsService {
    /// Computes totals, category breakdown and monthly totals.
    ///
    /// Expenses with a negative amount are skipped and reported. A missing
    /// or blank category counts as uncategorized. Every total is independent
    /// of input order.
    #[must_use]
    pub fn compute_statistics(
        expenses: &[Expense],
        options: &StatsOptions,
    ) -> Aggregated<ExpenseStats> {
        let mut overall = Subtotal::default();
        let mut by_category: HashMap<CategoryId, Subtotal> = HashMap::new();
        let mut by_month: BTreeMap<String, Subtotal> = BTreeMap::new();
        let mut anomalies = Vec::new();

        for expense in expenses {
            if expense.amount < Decimal::ZERO {
                anomalies.push(ExpenseAnomaly {
                    expense_id: expense.id,
                    kind: AnomalyKind::NegativeAmount,
                });
                continue;
            }

            overall.add(expense.amount);

            let category = expense
                .category_id
                .clone()
                .filter(|id| !id.as_str().trim().is_empty())
                .unwrap_or_else(CategoryId::uncategorized);
            by_category.entry(category).or_default().add(expense.amount);

            let month = expense
                .expense_date
                .with_timezone(&options.timezone)
                .format("%Y-%m")
                .to_string();
            by_month.entry(month).or_default().add(expense.amount);
        }

        let average_amount = if overall.count == 0 {
            Decimal::ZERO
        } else {
            round_currency(overall.total / Decimal::from(overall.count))
        };

        let mut category_breakdown: Vec<CategoryTotal> = by_category
            .into_iter()
            .map(|(category_id, subtotal)| CategoryTotal {
                category_name: options.categories.name_of(&category_id),
                category_id,
                total_amount: subtotal.total,
                expense_count: subtotal.count,
            })
            .collect();
        category_breakdown.sort_by(|a, b| {
            b.total_amount
                .cmp(&a.total_amount)
                .then_with(|| a.category_id.cmp(&b.category_id))
        });

        let monthly_totals = by_month
            .into_iter()
            .map(|(month, subtotal)| MonthlyTotal {
                month,
                total_amount: subtotal.total,
                expense_count: subtotal.count,
            })
            .collect();

        Aggregated {
            value: ExpenseStats {
                total_amount: overall.total,
                expense_count: overall.count,
                average_amount,
                category_breakdown,
                monthly_totals,
            },
            anomalies,
        }
    }
}
