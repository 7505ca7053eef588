use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::reflow::TextBlock;
use crate::state::AppState;

#[derive(Serialize)]
pub struct RegisterResponse {
    pub id: String,
    pub lines: Vec<String>,
}

/// GET /api/v1/blocks
pub async fn handle_list_blocks(
    State(state): State<AppState>,
) -> Result<Json<Vec<TextBlock>>, AppError> {
    Ok(Json(state.reflow.blocks().await?))
}

/// POST /api/v1/blocks/:id
///
/// Registers the element as a block and returns the lines of its first pass.
pub async fn handle_register_block(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RegisterResponse>, AppError> {
    let lines = state.reflow.register(id.clone()).await?;
    Ok(Json(RegisterResponse { id, lines }))
}

/// DELETE /api/v1/blocks/:id
pub async fn handle_unregister_block(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    match state.reflow.unregister(id.clone()).await? {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(AppError::NotFound(format!("block '{id}'"))),
    }
}
