//! Budget ledger engine.
//!
//! Categories and expenses live in the database only; [`Engine`] is a thin
//! handle around a [`sea_orm::DatabaseConnection`] whose operations each run
//! inside one database transaction.
//!
//! - Category store: create/get/list/update/delete ([`Engine::create_category`] ...)
//! - Expense store: every balance-moving write is paired with a reconciliation
//!   step in the same transaction ([`Engine::create_expense`] ...)
//! - Transfer: [`Engine::transfer`] moves planned budget between two categories
//! - Verification: [`Engine::verify_balances`] recomputes balances from expenses

pub use categories::Category;
pub use commands::{CategoryPatch, ExpensePatch, NewExpenseCmd, TransferCmd};
pub use error::EngineError;
pub use expenses::{Expense, ExpenseMeta};
pub use money::MoneyCents;
pub use ops::{
    BalanceIssue, BalanceReport, DEFAULT_TX_TIMEOUT, Engine, EngineBuilder, ExpenseListFilter,
    TransferOutcome,
};

mod categories;
mod commands;
mod error;
mod expenses;
mod money;
mod ops;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
