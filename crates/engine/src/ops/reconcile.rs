//! Keeps category balances in step with the expense ledger.
//!
//! Every step is a single relative update
//! (`actual += delta, remaining -= delta`) executed on the caller's
//! transaction, so the invariant `remaining = planned - actual` is preserved
//! row by row and no intermediate state is ever committed. A step that finds
//! no category row fails with `CategoryNotFound`; the caller's transaction is
//! then dropped and the paired expense write never commits.
//!
//! Every relative update carries a guard that keeps the new balance within
//! [`MoneyCents::MAX_ABS`]. SQLite turns an overflowing integer sum into a
//! REAL, so an unguarded update could store a value no longer readable as
//! `i64`. A guarded update that matches nothing on an existing row is
//! reported as `InvalidInput`.

use sea_orm::{
    DatabaseTransaction, PaginatorTrait, QueryFilter, prelude::*,
    sea_query::{Expr, SimpleExpr},
};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, categories};

/// `expr` lies within `[-MAX_ABS, MAX_ABS]`.
pub(super) fn within_limit(expr: impl Into<SimpleExpr>) -> SimpleExpr {
    let limit = MoneyCents::MAX_ABS.cents();
    Expr::expr(expr).between(-limit, limit)
}

pub(super) async fn category_exists(
    db_tx: &DatabaseTransaction,
    category_id: Uuid,
) -> ResultEngine<bool> {
    let count = categories::Entity::find_by_id(category_id.to_string())
        .count(db_tx)
        .await?;
    Ok(count > 0)
}

pub(super) fn balance_out_of_range(category_id: Uuid) -> EngineError {
    EngineError::InvalidInput(format!(
        "balance of category {category_id} would exceed {} in magnitude",
        MoneyCents::MAX_ABS
    ))
}

pub(super) struct Reconciler<'a> {
    db_tx: &'a DatabaseTransaction,
}

impl<'a> Reconciler<'a> {
    pub(super) fn new(db_tx: &'a DatabaseTransaction) -> Self {
        Self { db_tx }
    }

    pub(super) async fn on_expense_created(
        &self,
        category_id: Uuid,
        amount: MoneyCents,
    ) -> ResultEngine<()> {
        self.apply_delta(category_id, amount).await
    }

    pub(super) async fn on_expense_removed(
        &self,
        category_id: Uuid,
        amount: MoneyCents,
    ) -> ResultEngine<()> {
        self.apply_delta(category_id, -amount).await
    }

    /// Applies `new - old` once instead of a remove/create pair.
    pub(super) async fn on_expense_amount_changed(
        &self,
        category_id: Uuid,
        old_amount: MoneyCents,
        new_amount: MoneyCents,
    ) -> ResultEngine<()> {
        let delta = new_amount
            .checked_sub(old_amount)
            .ok_or_else(|| EngineError::InvalidInput("amount out of range".to_string()))?;
        self.apply_delta(category_id, delta).await
    }

    /// Expense reassigned to another category, possibly with a new amount.
    ///
    /// Both rows are touched in ascending id order.
    pub(super) async fn on_expense_moved(
        &self,
        from_category_id: Uuid,
        to_category_id: Uuid,
        old_amount: MoneyCents,
        new_amount: MoneyCents,
    ) -> ResultEngine<()> {
        if from_category_id == to_category_id {
            return self
                .on_expense_amount_changed(from_category_id, old_amount, new_amount)
                .await;
        }
        let mut steps = [(from_category_id, -old_amount), (to_category_id, new_amount)];
        steps.sort_by_key(|(id, _)| *id);
        for (category_id, delta) in steps {
            self.apply_delta(category_id, delta).await?;
        }
        Ok(())
    }

    async fn apply_delta(&self, category_id: Uuid, delta: MoneyCents) -> ResultEngine<()> {
        let actual = Expr::col(categories::Column::ActualBalanceMinor).add(delta.cents());
        let remaining = Expr::col(categories::Column::RemainingBalanceMinor).sub(delta.cents());
        let result = categories::Entity::update_many()
            .col_expr(categories::Column::ActualBalanceMinor, actual.clone())
            .col_expr(categories::Column::RemainingBalanceMinor, remaining.clone())
            .filter(categories::Column::Id.eq(category_id.to_string()))
            .filter(within_limit(actual))
            .filter(within_limit(remaining))
            .exec(self.db_tx)
            .await?;
        if result.rows_affected == 0 {
            if category_exists(self.db_tx, category_id).await? {
                tracing::warn!(%category_id, delta = %delta, "reconciliation would overflow, aborting");
                return Err(balance_out_of_range(category_id));
            }
            tracing::warn!(%category_id, "reconciliation target missing, aborting");
            return Err(EngineError::CategoryNotFound(category_id));
        }
        tracing::debug!(%category_id, delta = %delta, "category balances reconciled");
        Ok(())
    }
}
