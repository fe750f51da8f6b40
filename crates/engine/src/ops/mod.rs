use std::time::Duration;

use sea_orm::DatabaseConnection;

mod categories;
mod expenses;
mod reconcile;
mod transfer;
mod verify;

pub use expenses::ExpenseListFilter;
pub use transfer::TransferOutcome;
pub use verify::{BalanceIssue, BalanceReport};

/// Upper bound for a single database transaction.
pub const DEFAULT_TX_TIMEOUT: Duration = Duration::from_secs(5);

/// Run a block inside a DB transaction, committing on success.
///
/// An error or an early `return` inside the block drops the transaction
/// without commit, which rolls it back. The whole unit (begin, body, commit)
/// is bounded by `tx_timeout`; on expiry the future is dropped, the
/// transaction rolls back and `EngineError::Timeout` is returned.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let run = async {
            let $tx = ::sea_orm::TransactionTrait::begin(&$self.database).await?;
            let result: $crate::ResultEngine<_> = $body;
            let value = result?;
            $tx.commit().await?;
            Ok::<_, $crate::EngineError>(value)
        };
        match ::tokio::time::timeout($self.tx_timeout, run).await {
            Ok(result) => result,
            Err(_) => {
                ::tracing::warn!(timeout = ?$self.tx_timeout, "transaction timed out, rolled back");
                Err($crate::EngineError::Timeout)
            }
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    tx_timeout: Duration,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    tx_timeout: Option<Duration>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Bound every transaction to `timeout` (default [`DEFAULT_TX_TIMEOUT`]).
    pub fn tx_timeout(mut self, timeout: Duration) -> EngineBuilder {
        self.tx_timeout = Some(timeout);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> crate::ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            tx_timeout: self.tx_timeout.unwrap_or(DEFAULT_TX_TIMEOUT),
        })
    }
}
