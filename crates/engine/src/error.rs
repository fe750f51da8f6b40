//! The module contains the errors the engine can return.
//!
//! Validation failures ([`InvalidInput`], [`SameCategory`]) are raised before
//! any database transaction is opened. Every other variant is raised from
//! inside a transaction, which is then dropped without commit.
//!
//!  [`InvalidInput`]: EngineError::InvalidInput
//!  [`SameCategory`]: EngineError::SameCategory
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;
use uuid::Uuid;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("category {0} not found")]
    CategoryNotFound(Uuid),
    #[error("source and target category must differ")]
    SameCategory,
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("transaction timed out, retry later")]
    Timeout,
    #[error(transparent)]
    Database(DbErr),
}

impl EngineError {
    /// Whether the caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout | Self::Conflict(_))
    }
}

/// SQLite reports a RESTRICT violation with extended code 1811, which
/// `sql_err()` does not classify, so the message is checked as well.
pub(crate) fn is_foreign_key_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_)))
        || err.to_string().contains("FOREIGN KEY constraint failed")
}

impl From<DbErr> for EngineError {
    fn from(err: DbErr) -> Self {
        if is_foreign_key_violation(&err) {
            return Self::Conflict(err.to_string());
        }
        // SQLITE_BUSY / SQLITE_LOCKED: another writer held the lock past busy_timeout.
        let msg = err.to_string();
        if msg.contains("database is locked") || msg.contains("database table is locked") {
            return Self::Conflict("storage is busy".to_string());
        }
        Self::Database(err)
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::CategoryNotFound(a), Self::CategoryNotFound(b)) => a == b,
            (Self::SameCategory, Self::SameCategory) => true,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Timeout, Self::Timeout) => true,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
