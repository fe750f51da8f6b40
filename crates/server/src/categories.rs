//! Categories API endpoints.

use api_types::{
    category::{CategoryCreate, CategoryListResponse, CategoryUpdate, CategoryView},
    verify::VerifyResponse,
};
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use engine::{CategoryPatch, MoneyCents};
use uuid::Uuid;

use crate::{
    ServerError,
    server::ServerState,
    views::{map_category, map_report},
};

pub async fn create(
    State(state): State<ServerState>,
    payload: Result<Json<CategoryCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let Json(payload) = payload?;
    let planned_budget = MoneyCents::new(payload.planned_budget_minor.unwrap_or(0));
    let category = state
        .detached(move |engine| async move {
            engine.create_category(&payload.name, planned_budget).await
        })
        .await?;
    Ok((StatusCode::CREATED, Json(map_category(category))))
}

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<CategoryListResponse>, ServerError> {
    let categories = state
        .engine
        .list_categories()
        .await?
        .into_iter()
        .map(map_category)
        .collect();
    Ok(Json(CategoryListResponse { categories }))
}

pub async fn get(
    State(state): State<ServerState>,
    category_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<CategoryView>, ServerError> {
    let Path(category_id) = category_id?;
    let category = state.engine.category(category_id).await?;
    Ok(Json(map_category(category)))
}

pub async fn update(
    State(state): State<ServerState>,
    category_id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CategoryUpdate>, JsonRejection>,
) -> Result<Json<CategoryView>, ServerError> {
    let Path(category_id) = category_id?;
    let Json(payload) = payload?;
    if payload.name.is_none() && payload.planned_budget_minor.is_none() {
        return Err(ServerError::Generic(
            "provide at least one of name or planned_budget_minor".to_string(),
        ));
    }

    let patch = CategoryPatch {
        name: payload.name,
        planned_budget: payload.planned_budget_minor.map(MoneyCents::new),
    };
    let category = state
        .detached(move |engine| async move { engine.update_category(category_id, patch).await })
        .await?;
    Ok(Json(map_category(category)))
}

pub async fn delete(
    State(state): State<ServerState>,
    category_id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ServerError> {
    let Path(category_id) = category_id?;
    state
        .detached(move |engine| async move { engine.delete_category(category_id).await })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Recomputes balances from the expense ledger; read-only.
pub async fn verify(State(state): State<ServerState>) -> Result<Json<VerifyResponse>, ServerError> {
    let report = state.engine.verify_balances().await?;
    Ok(Json(map_report(report)))
}
