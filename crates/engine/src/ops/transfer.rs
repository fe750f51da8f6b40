use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*, sea_query::Expr};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    Category, EngineError, MoneyCents, ResultEngine, TransferCmd, categories,
    util::require_positive,
};

use super::{
    Engine,
    reconcile::{balance_out_of_range, category_exists, within_limit},
    with_tx,
};

/// Both categories as committed by a transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransferOutcome {
    pub amount: MoneyCents,
    pub from_category: Category,
    pub to_category: Category,
}

/// One leg: shifts planned budget and remaining balance together, which keeps
/// `remaining = planned - actual` intact.
async fn apply_budget_leg(
    db_tx: &DatabaseTransaction,
    category_id: Uuid,
    delta: MoneyCents,
) -> ResultEngine<()> {
    let planned = Expr::col(categories::Column::PlannedBudgetMinor).add(delta.cents());
    let remaining = Expr::col(categories::Column::RemainingBalanceMinor).add(delta.cents());
    let result = categories::Entity::update_many()
        .col_expr(categories::Column::PlannedBudgetMinor, planned.clone())
        .col_expr(categories::Column::RemainingBalanceMinor, remaining.clone())
        .filter(categories::Column::Id.eq(category_id.to_string()))
        .filter(within_limit(planned))
        .filter(within_limit(remaining))
        .exec(db_tx)
        .await?;
    if result.rows_affected == 0 {
        if category_exists(db_tx, category_id).await? {
            return Err(balance_out_of_range(category_id));
        }
        return Err(EngineError::CategoryNotFound(category_id));
    }
    Ok(())
}

async fn load_category(db_tx: &DatabaseTransaction, category_id: Uuid) -> ResultEngine<Category> {
    let model = categories::Entity::find_by_id(category_id.to_string())
        .one(db_tx)
        .await?
        .ok_or(EngineError::CategoryNotFound(category_id))?;
    Category::try_from(model)
}

impl Engine {
    /// Moves `amount` of planned budget from one category to another.
    ///
    /// Both legs run in one transaction and touch the rows in ascending id
    /// order, so two opposite transfers running at once queue up instead of
    /// deadlocking. A missing category on either leg rolls back the whole
    /// transfer. There is no floor: the source budget may go negative.
    pub async fn transfer(&self, cmd: TransferCmd) -> ResultEngine<TransferOutcome> {
        let TransferCmd {
            from_category_id,
            to_category_id,
            amount,
        } = cmd;
        require_positive(amount, "amount")?;
        if from_category_id == to_category_id {
            return Err(EngineError::SameCategory);
        }

        let outcome = with_tx!(self, |db_tx| {
            let mut legs = [(from_category_id, -amount), (to_category_id, amount)];
            legs.sort_by_key(|(category_id, _)| *category_id);
            for (category_id, delta) in legs {
                apply_budget_leg(&db_tx, category_id, delta).await?;
            }

            Ok(TransferOutcome {
                amount,
                from_category: load_category(&db_tx, from_category_id).await?,
                to_category: load_category(&db_tx, to_category_id).await?,
            })
        })
        .inspect_err(|err| {
            tracing::warn!(
                %from_category_id,
                %to_category_id,
                amount = %amount,
                "transfer aborted: {err}"
            );
        })?;

        tracing::info!(
            %from_category_id,
            %to_category_id,
            amount = %amount,
            "budget transferred"
        );
        Ok(outcome)
    }
}
