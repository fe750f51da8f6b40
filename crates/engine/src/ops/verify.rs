use std::collections::HashMap;

use sea_orm::{QueryOrder, prelude::*};
use serde::Serialize;
use uuid::Uuid;

use crate::{Category, Expense, MoneyCents, ResultEngine, categories, expenses};

use super::{Engine, with_tx};

/// A category whose stored balances disagree with the expense ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BalanceIssue {
    pub category: Category,
    /// Sum of the amounts of all expenses referencing the category.
    pub ledger_total: MoneyCents,
}

impl BalanceIssue {
    pub fn invariant_holds(&self) -> bool {
        self.category.is_balanced()
    }

    pub fn matches_ledger(&self) -> bool {
        self.category.actual_balance == self.ledger_total
    }
}

/// Result of [`Engine::verify_balances`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BalanceReport {
    pub categories_checked: usize,
    pub issues: Vec<BalanceIssue>,
    /// Expenses pointing at a category that no longer exists.
    pub orphaned_expenses: Vec<Uuid>,
}

impl BalanceReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty() && self.orphaned_expenses.is_empty()
    }
}

impl Engine {
    /// Recomputes every category's actual balance from the expense ledger.
    ///
    /// Read-only: both tables are read in one transaction so the snapshot is
    /// consistent, and nothing is repaired.
    pub async fn verify_balances(&self) -> ResultEngine<BalanceReport> {
        let report = with_tx!(self, |db_tx| {
            let category_models = categories::Entity::find()
                .order_by_asc(categories::Column::Name)
                .all(&db_tx)
                .await?;
            let expense_models = expenses::Entity::find().all(&db_tx).await?;

            let mut totals: HashMap<Uuid, MoneyCents> = HashMap::new();
            let mut all_expenses: Vec<Expense> = Vec::with_capacity(expense_models.len());
            for model in expense_models {
                let expense = Expense::try_from(model)?;
                *totals.entry(expense.category_id).or_default() += expense.amount;
                all_expenses.push(expense);
            }

            let mut report = BalanceReport::default();
            for model in category_models {
                let category = Category::try_from(model)?;
                let ledger_total = totals.remove(&category.id).unwrap_or_default();
                let issue = BalanceIssue {
                    category,
                    ledger_total,
                };
                report.categories_checked += 1;
                if !issue.invariant_holds() || !issue.matches_ledger() {
                    report.issues.push(issue);
                }
            }
            report.orphaned_expenses = all_expenses
                .into_iter()
                .filter(|expense| totals.contains_key(&expense.category_id))
                .map(|expense| expense.id)
                .collect();
            Ok(report)
        })?;

        if !report.is_clean() {
            tracing::warn!(
                issues = report.issues.len(),
                orphaned = report.orphaned_expenses.len(),
                "ledger verification found inconsistencies"
            );
        }
        Ok(report)
    }
}
