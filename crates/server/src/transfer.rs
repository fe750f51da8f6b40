//! Budget transfer endpoint.

use api_types::transfer::{TransferRequest, TransferResponse};
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use engine::{MoneyCents, TransferCmd};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views::map_category};

pub async fn transfer(
    State(state): State<ServerState>,
    ids: Result<Path<(Uuid, Uuid)>, PathRejection>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<Json<TransferResponse>, ServerError> {
    let Path((from_category_id, to_category_id)) = ids?;
    let Json(payload) = payload?;
    let cmd = TransferCmd::new(
        from_category_id,
        to_category_id,
        MoneyCents::new(payload.amount_minor),
    );

    let outcome = state
        .detached(move |engine| async move { engine.transfer(cmd).await })
        .await?;
    Ok(Json(TransferResponse {
        message: format!(
            "transferred {} from {} to {}",
            outcome.amount, outcome.from_category.name, outcome.to_category.name
        ),
        amount_minor: outcome.amount.cents(),
        from_category: map_category(outcome.from_category),
        to_category: map_category(outcome.to_category),
    }))
}
