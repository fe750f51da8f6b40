//! JSON request and response bodies of the ledger HTTP API.
//!
//! Money is always an integer number of minor units (`*_minor` fields).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryCreate {
        pub name: String,
        /// Defaults to zero.
        pub planned_budget_minor: Option<i64>,
    }

    /// Partial update: absent fields are left untouched.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        pub name: Option<String>,
        pub planned_budget_minor: Option<i64>,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        pub planned_budget_minor: i64,
        pub remaining_balance_minor: i64,
        pub actual_balance_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryListResponse {
        pub categories: Vec<CategoryView>,
    }
}

pub mod expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseCreate {
        pub category_id: Uuid,
        /// Must be > 0.
        pub amount_minor: i64,
        pub date: Option<NaiveDate>,
        pub description: Option<String>,
        pub payment_method: Option<String>,
        pub entity_id: Option<i64>,
        pub entity_type: Option<String>,
    }

    /// Partial update: absent fields are left untouched, an empty string
    /// clears an optional text field.
    ///
    /// `date` and `entity_id` can only be replaced. Sending `null` counts as
    /// absent, so a stored date or entity id is never cleared.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        pub category_id: Option<Uuid>,
        pub amount_minor: Option<i64>,
        pub date: Option<NaiveDate>,
        pub description: Option<String>,
        pub payment_method: Option<String>,
        pub entity_id: Option<i64>,
        pub entity_type: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseListQuery {
        pub category_id: Option<Uuid>,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub category_id: Uuid,
        pub amount_minor: i64,
        pub date: Option<NaiveDate>,
        pub description: Option<String>,
        pub payment_method: Option<String>,
        pub entity_id: Option<i64>,
        pub entity_type: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseListResponse {
        pub expenses: Vec<ExpenseView>,
    }
}

pub mod transfer {
    use super::*;
    use crate::category::CategoryView;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferRequest {
        /// Must be > 0.
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransferResponse {
        pub message: String,
        pub amount_minor: i64,
        pub from_category: CategoryView,
        pub to_category: CategoryView,
    }
}

pub mod verify {
    use super::*;
    use crate::category::CategoryView;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceIssueView {
        pub category: CategoryView,
        /// Sum of the category's expenses.
        pub ledger_total_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct VerifyResponse {
        pub clean: bool,
        pub categories_checked: usize,
        pub issues: Vec<BalanceIssueView>,
        pub orphaned_expenses: Vec<Uuid>,
    }
}
