use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::layout::FontDescriptor;
use crate::reflow::{ElementSpec, ElementWidth, ReflowReport};
use crate::state::AppState;

#[derive(Serialize)]
pub struct StatusResponse {
    pub resizing: bool,
    pub transitions_suppressed: bool,
    pub registered: usize,
    pub passes: u64,
    pub last_report: Option<ReflowReport>,
    pub viewport_width_px: f32,
    pub quiet_period_ms: u64,
}

#[derive(Deserialize)]
pub struct ViewportRequest {
    pub width: f32,
}

#[derive(Deserialize)]
pub struct ElementRequest {
    #[serde(default)]
    pub source_text: Option<String>,
    pub font: FontDescriptor,
    pub width: ElementWidth,
}

#[derive(Serialize)]
pub struct ElementResponse {
    pub id: String,
    pub content: String,
}

/// GET /api/v1/status
pub async fn handle_status(State(state): State<AppState>) -> Result<Json<StatusResponse>, AppError> {
    let (status, (transitions_suppressed, viewport_width_px)) = state
        .reflow
        .status_with(|doc| (doc.transitions_suppressed(), doc.viewport_width()))
        .await?;

    Ok(Json(StatusResponse {
        resizing: status.resizing,
        transitions_suppressed,
        registered: status.registered,
        passes: status.passes,
        last_report: status.last_report,
        viewport_width_px,
        quiet_period_ms: status.quiet_period_ms,
    }))
}

/// POST /api/v1/document/ready
pub async fn handle_document_ready(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.reflow.with_environment(|doc| doc.mark_ready()).await?;
    state.reflow.content_ready().await?;
    Ok(StatusCode::ACCEPTED)
}

/// POST /api/v1/viewport
///
/// Sets the viewport width and delivers one resize signal. The reflow itself runs
/// after the quiet period, so the response does not wait for it.
pub async fn handle_viewport(
    State(state): State<AppState>,
    Json(req): Json<ViewportRequest>,
) -> Result<StatusCode, AppError> {
    if !req.width.is_finite() || req.width < 0.0 {
        return Err(AppError::Validation(format!(
            "viewport width must be a non-negative number, got {}",
            req.width
        )));
    }

    let width = req.width;
    state
        .reflow
        .with_environment(move |doc| doc.set_viewport_width(width))
        .await?;
    state.reflow.resize().await?;
    Ok(StatusCode::ACCEPTED)
}

/// GET /api/v1/elements/:id
pub async fn handle_get_element(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ElementResponse>, AppError> {
    let lookup = id.clone();
    let content = state
        .reflow
        .with_environment(move |doc| doc.content(&lookup).map(str::to_string))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("element '{id}'")))?;
    Ok(Json(ElementResponse { id, content }))
}

/// PUT /api/v1/elements/:id
pub async fn handle_put_element(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ElementRequest>,
) -> Result<StatusCode, AppError> {
    insert_element(&state, id, req).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/elements
pub async fn handle_create_element(
    State(state): State<AppState>,
    Json(req): Json<ElementRequest>,
) -> Result<(StatusCode, Json<ElementResponse>), AppError> {
    let id = Uuid::new_v4().to_string();
    let content = req.source_text.clone().unwrap_or_default();
    insert_element(&state, id.clone(), req).await?;
    Ok((StatusCode::CREATED, Json(ElementResponse { id, content })))
}

/// DELETE /api/v1/elements/:id
///
/// Removes the element from the page only; a registered block for it stays registered.
pub async fn handle_delete_element(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let lookup = id.clone();
    let removed = state
        .reflow
        .with_environment(move |doc| doc.remove(&lookup))
        .await?;
    if !removed {
        return Err(AppError::NotFound(format!("element '{id}'")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn insert_element(state: &AppState, id: String, req: ElementRequest) -> Result<(), AppError> {
    validate_width(req.width)?;
    let spec = ElementSpec {
        id,
        source_text: req.source_text,
        font: req.font,
        width: req.width,
    };
    state.reflow.with_environment(move |doc| doc.insert(spec)).await
}

fn validate_width(width: ElementWidth) -> Result<(), AppError> {
    let value = match width {
        ElementWidth::Fixed(px) => px,
        ElementWidth::Viewport(fraction) => fraction,
    };
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "element width must be a non-negative number, got {value}"
        )))
    }
}
