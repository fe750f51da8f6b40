use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder,
    prelude::*,
    sea_query::{Expr, SimpleExpr},
};
use uuid::Uuid;

use crate::{
    EngineError, Expense, ExpensePatch, NewExpenseCmd, ResultEngine, expenses,
    util::{normalize_optional_text, require_positive},
};

use super::{Engine, reconcile::Reconciler, with_tx};

/// Optional filters for [`Engine::list_expenses`].
#[derive(Clone, Debug, Default)]
pub struct ExpenseListFilter {
    pub category_id: Option<Uuid>,
}

fn expense_not_found(id: Uuid) -> EngineError {
    EngineError::KeyNotFound(format!("expense {id}"))
}

/// Takes the row's write lock before anything is read.
///
/// SQLite has no `SELECT ... FOR UPDATE`; a no-op update makes this
/// transaction the writer up front, so a later write cannot fail with a lock
/// upgrade conflict against a concurrent writer.
async fn lock_expense(db_tx: &DatabaseTransaction, id: Uuid) -> ResultEngine<expenses::Model> {
    let result = expenses::Entity::update_many()
        .col_expr(
            expenses::Column::Id,
            SimpleExpr::from(Expr::col(expenses::Column::Id)),
        )
        .filter(expenses::Column::Id.eq(id.to_string()))
        .exec(db_tx)
        .await?;
    if result.rows_affected == 0 {
        return Err(expense_not_found(id));
    }
    expenses::Entity::find_by_id(id.to_string())
        .one(db_tx)
        .await?
        .ok_or_else(|| expense_not_found(id))
}

fn text_patch(value: Option<&str>) -> ActiveValue<Option<String>> {
    match value {
        Some(value) => ActiveValue::Set(normalize_optional_text(Some(value))),
        None => ActiveValue::NotSet,
    }
}

impl Engine {
    /// Posts an expense and reconciles its category in the same transaction.
    ///
    /// Fails with `CategoryNotFound` (nothing written) if the category does not
    /// exist.
    pub async fn create_expense(&self, cmd: NewExpenseCmd) -> ResultEngine<Expense> {
        require_positive(cmd.amount, "amount")?;
        let NewExpenseCmd {
            category_id,
            amount,
            mut meta,
        } = cmd;
        meta.description = normalize_optional_text(meta.description.as_deref());
        meta.payment_method = normalize_optional_text(meta.payment_method.as_deref());
        meta.entity_type = normalize_optional_text(meta.entity_type.as_deref());

        let expense = Expense::new(category_id, amount, meta);
        with_tx!(self, |db_tx| {
            Reconciler::new(&db_tx)
                .on_expense_created(category_id, amount)
                .await?;
            expenses::ActiveModel::from(&expense).insert(&db_tx).await?;
            Ok(())
        })?;

        tracing::info!(
            expense_id = %expense.id,
            %category_id,
            amount = %amount,
            "expense posted"
        );
        Ok(expense)
    }

    pub async fn expense(&self, expense_id: Uuid) -> ResultEngine<Expense> {
        let model = expenses::Entity::find_by_id(expense_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| expense_not_found(expense_id))?;
        Expense::try_from(model)
    }

    /// Expenses ordered by date, then posting time; undated expenses first.
    pub async fn list_expenses(&self, filter: &ExpenseListFilter) -> ResultEngine<Vec<Expense>> {
        let mut query = expenses::Entity::find();
        if let Some(category_id) = filter.category_id {
            query = query.filter(expenses::Column::CategoryId.eq(category_id.to_string()));
        }
        query
            .order_by_asc(expenses::Column::Date)
            .order_by_asc(expenses::Column::CreatedAt)
            .order_by_asc(expenses::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Expense::try_from)
            .collect()
    }

    /// Writes only the fields present in `patch`.
    ///
    /// An amount change or a category reassignment is reconciled in the same
    /// transaction as a single delta per affected category.
    pub async fn update_expense(
        &self,
        expense_id: Uuid,
        patch: ExpensePatch,
    ) -> ResultEngine<Expense> {
        if patch.is_empty() {
            return Err(EngineError::InvalidInput(
                "provide at least one field to update".to_string(),
            ));
        }
        if let Some(amount) = patch.amount {
            require_positive(amount, "amount")?;
        }

        let expense = with_tx!(self, |db_tx| {
            let current = lock_expense(&db_tx, expense_id).await?;
            let current = Expense::try_from(current)?;

            if patch.touches_balances() {
                let new_category_id = patch.category_id.unwrap_or(current.category_id);
                let new_amount = patch.amount.unwrap_or(current.amount);
                Reconciler::new(&db_tx)
                    .on_expense_moved(
                        current.category_id,
                        new_category_id,
                        current.amount,
                        new_amount,
                    )
                    .await?;
            }

            let active = expenses::ActiveModel {
                id: ActiveValue::Unchanged(expense_id.to_string()),
                category_id: patch
                    .category_id
                    .map_or(ActiveValue::NotSet, |id| ActiveValue::Set(id.to_string())),
                amount_minor: patch
                    .amount
                    .map_or(ActiveValue::NotSet, |amount| ActiveValue::Set(amount.cents())),
                date: patch
                    .date
                    .map_or(ActiveValue::NotSet, |date| ActiveValue::Set(Some(date))),
                description: text_patch(patch.description.as_deref()),
                payment_method: text_patch(patch.payment_method.as_deref()),
                entity_id: patch
                    .entity_id
                    .map_or(ActiveValue::NotSet, |id| ActiveValue::Set(Some(id))),
                entity_type: text_patch(patch.entity_type.as_deref()),
                created_at: ActiveValue::NotSet,
            };
            let model = active.update(&db_tx).await?;
            Expense::try_from(model)
        })?;

        tracing::info!(
            %expense_id,
            category_id = %expense.category_id,
            amount = %expense.amount,
            reconciled = patch.touches_balances(),
            "expense updated"
        );
        Ok(expense)
    }

    /// Removes an expense and reverses its effect on the category.
    pub async fn delete_expense(&self, expense_id: Uuid) -> ResultEngine<()> {
        let removed = with_tx!(self, |db_tx| {
            let current = lock_expense(&db_tx, expense_id).await?;
            let current = Expense::try_from(current)?;

            expenses::Entity::delete_by_id(expense_id.to_string())
                .exec(&db_tx)
                .await?;
            Reconciler::new(&db_tx)
                .on_expense_removed(current.category_id, current.amount)
                .await?;
            Ok(current)
        })?;

        tracing::info!(
            %expense_id,
            category_id = %removed.category_id,
            amount = %removed.amount,
            "expense deleted"
        );
        Ok(())
    }
}
