//! Expenses API endpoints.

use api_types::expense::{
    ExpenseCreate, ExpenseListQuery, ExpenseListResponse, ExpenseUpdate, ExpenseView,
};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use engine::{ExpenseListFilter, ExpenseMeta, ExpensePatch, MoneyCents, NewExpenseCmd};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views::map_expense};

pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<ExpenseCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let Json(payload) = payload?;
    let cmd = NewExpenseCmd::new(payload.category_id, MoneyCents::new(payload.amount_minor)).meta(
        ExpenseMeta {
            date: payload.date,
            description: payload.description,
            payment_method: payload.payment_method,
            entity_id: payload.entity_id,
            entity_type: payload.entity_type,
        },
    );
    let expense = state
        .detached(move |engine| async move { engine.create_expense(cmd).await })
        .await?;
    Ok((StatusCode::CREATED, Json(map_expense(expense))))
}

pub async fn list(
    State(state): State<ServerState>,
    query: Result<Query<ExpenseListQuery>, QueryRejection>,
) -> Result<Json<ExpenseListResponse>, ServerError> {
    let Query(query) = query?;
    let filter = ExpenseListFilter {
        category_id: query.category_id,
    };
    let expenses = state
        .engine
        .list_expenses(&filter)
        .await?
        .into_iter()
        .map(map_expense)
        .collect();
    Ok(Json(ExpenseListResponse { expenses }))
}

pub async fn get(
    State(state): State<ServerState>,
    expense_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ExpenseView>, ServerError> {
    let Path(expense_id) = expense_id?;
    let expense = state.engine.expense(expense_id).await?;
    Ok(Json(map_expense(expense)))
}

pub async fn update(
    State(state): State<ServerState>,
    expense_id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ExpenseUpdate>, JsonRejection>,
) -> Result<Json<ExpenseView>, ServerError> {
    let Path(expense_id) = expense_id?;
    let Json(payload) = payload?;
    let patch = ExpensePatch {
        category_id: payload.category_id,
        amount: payload.amount_minor.map(MoneyCents::new),
        date: payload.date,
        description: payload.description,
        payment_method: payload.payment_method,
        entity_id: payload.entity_id,
        entity_type: payload.entity_type,
    };
    if patch.is_empty() {
        return Err(ServerError::Generic(
            "provide at least one field to update".to_string(),
        ));
    }

    let expense = state
        .detached(move |engine| async move { engine.update_expense(expense_id, patch).await })
        .await?;
    Ok(Json(map_expense(expense)))
}

pub async fn delete(
    State(state): State<ServerState>,
    expense_id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ServerError> {
    let Path(expense_id) = expense_id?;
    state
        .detached(move |engine| async move { engine.delete_expense(expense_id).await })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
