//! Engine snapshots to JSON views.

use api_types::{
    category::CategoryView,
    expense::ExpenseView,
    verify::{BalanceIssueView, VerifyResponse},
};

pub(crate) fn map_category(category: engine::Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        planned_budget_minor: category.planned_budget.cents(),
        remaining_balance_minor: category.remaining_balance.cents(),
        actual_balance_minor: category.actual_balance.cents(),
    }
}

pub(crate) fn map_expense(expense: engine::Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        category_id: expense.category_id,
        amount_minor: expense.amount.cents(),
        date: expense.meta.date,
        description: expense.meta.description,
        payment_method: expense.meta.payment_method,
        entity_id: expense.meta.entity_id,
        entity_type: expense.meta.entity_type,
        created_at: expense.created_at,
    }
}

pub(crate) fn map_report(report: engine::BalanceReport) -> VerifyResponse {
    VerifyResponse {
        clean: report.is_clean(),
        categories_checked: report.categories_checked,
        issues: report
            .issues
            .into_iter()
            .map(|issue| BalanceIssueView {
                ledger_total_minor: issue.ledger_total.cents(),
                category: map_category(issue.category),
            })
            .collect(),
        orphaned_expenses: report.orphaned_expenses,
    }
}
