use sea_orm::{
    PaginatorTrait, QueryFilter, QueryOrder, prelude::*,
    sea_query::{Expr, SimpleExpr},
};
use uuid::Uuid;

use crate::{
    Category, CategoryPatch, EngineError, MoneyCents, ResultEngine, categories,
    error::is_foreign_key_violation,
    expenses,
    util::{normalize_required_name, require_non_negative},
};

use super::{
    Engine,
    reconcile::{balance_out_of_range, category_exists, within_limit},
    with_tx,
};

fn category_not_found(id: Uuid) -> EngineError {
    EngineError::KeyNotFound(format!("category {id}"))
}

impl Engine {
    /// Creates a category with `remaining = planned_budget` and nothing spent.
    pub async fn create_category(
        &self,
        name: &str,
        planned_budget: MoneyCents,
    ) -> ResultEngine<Category> {
        let name = normalize_required_name(name, "category")?;
        require_non_negative(planned_budget, "planned_budget")?;

        let category = Category::new(name, planned_budget);
        with_tx!(self, |db_tx| {
            categories::ActiveModel::from(&category)
                .insert(&db_tx)
                .await?;
            Ok(())
        })?;

        tracing::info!(
            category_id = %category.id,
            name = %category.name,
            planned_budget = %category.planned_budget,
            "category created"
        );
        Ok(category)
    }

    /// Reads one category straight from the store.
    pub async fn category(&self, category_id: Uuid) -> ResultEngine<Category> {
        let model = categories::Entity::find_by_id(category_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| category_not_found(category_id))?;
        Category::try_from(model)
    }

    /// All categories, ordered by name.
    pub async fn list_categories(&self) -> ResultEngine<Vec<Category>> {
        categories::Entity::find()
            .order_by_asc(categories::Column::Name)
            .order_by_asc(categories::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Category::try_from)
            .collect()
    }

    /// Writes only the fields present in `patch`.
    ///
    /// The update is one conditional statement. A new planned budget shifts
    /// the remaining balance by `new - old`, evaluated against the row's
    /// current values, so spending posted concurrently is never lost.
    pub async fn update_category(
        &self,
        category_id: Uuid,
        patch: CategoryPatch,
    ) -> ResultEngine<Category> {
        if patch.is_empty() {
            return Err(EngineError::InvalidInput(
                "provide at least one of name or planned_budget".to_string(),
            ));
        }
        let name = patch
            .name
            .as_deref()
            .map(|name| normalize_required_name(name, "category"))
            .transpose()?;
        if let Some(planned_budget) = patch.planned_budget {
            require_non_negative(planned_budget, "planned_budget")?;
        }

        let category = with_tx!(self, |db_tx| {
            let mut update = categories::Entity::update_many()
                .filter(categories::Column::Id.eq(category_id.to_string()));
            if let Some(name) = &name {
                update = update.col_expr(categories::Column::Name, Expr::value(name.clone()));
            }
            if let Some(planned_budget) = patch.planned_budget {
                let remaining = Expr::expr(
                    Expr::col(categories::Column::RemainingBalanceMinor)
                        .add(planned_budget.cents()),
                )
                .sub(Expr::col(categories::Column::PlannedBudgetMinor));
                update = update
                    .col_expr(categories::Column::RemainingBalanceMinor, remaining.clone())
                    .col_expr(
                        categories::Column::PlannedBudgetMinor,
                        Expr::value(planned_budget.cents()),
                    )
                    .filter(within_limit(remaining));
            }
            let result = update.exec(&db_tx).await?;
            if result.rows_affected == 0 {
                if patch.planned_budget.is_some() && category_exists(&db_tx, category_id).await? {
                    return Err(balance_out_of_range(category_id));
                }
                return Err(category_not_found(category_id));
            }

            let model = categories::Entity::find_by_id(category_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| category_not_found(category_id))?;
            Category::try_from(model)
        })?;

        tracing::info!(
            %category_id,
            renamed = name.is_some(),
            planned_budget = ?patch.planned_budget.map(|b| b.to_string()),
            "category updated"
        );
        Ok(category)
    }

    /// Deletes a category that no expense references.
    ///
    /// Categories with expenses are rejected with `Conflict`; delete or
    /// reassign the expenses first.
    pub async fn delete_category(&self, category_id: Uuid) -> ResultEngine<()> {
        let in_use = || EngineError::Conflict(format!("category {category_id} still has expenses"));

        with_tx!(self, |db_tx| {
            // Take the write lock on the row before counting, so no expense
            // can be posted against it between the count and the delete.
            let touched = categories::Entity::update_many()
                .col_expr(
                    categories::Column::Name,
                    SimpleExpr::from(Expr::col(categories::Column::Name)),
                )
                .filter(categories::Column::Id.eq(category_id.to_string()))
                .exec(&db_tx)
                .await?;
            if touched.rows_affected == 0 {
                return Err(category_not_found(category_id));
            }

            let dependents = expenses::Entity::find()
                .filter(expenses::Column::CategoryId.eq(category_id.to_string()))
                .count(&db_tx)
                .await?;
            if dependents > 0 {
                return Err(in_use());
            }

            // The RESTRICT foreign key stays as a backstop.
            categories::Entity::delete_by_id(category_id.to_string())
                .exec(&db_tx)
                .await
                .map_err(|err| {
                    if is_foreign_key_violation(&err) {
                        in_use()
                    } else {
                        EngineError::from(err)
                    }
                })?;
            Ok(())
        })
        .inspect_err(|err| {
            if matches!(err, EngineError::Conflict(_)) {
                tracing::warn!(%category_id, "category delete rejected: {err}");
            }
        })?;

        tracing::info!(%category_id, "category deleted");
        Ok(())
    }
}
