pub mod blocks;
pub mod document;
pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/status", get(document::handle_status))
        .route("/api/v1/document/ready", post(document::handle_document_ready))
        .route("/api/v1/viewport", post(document::handle_viewport))
        .route("/api/v1/elements", post(document::handle_create_element))
        .route(
            "/api/v1/elements/:id",
            put(document::handle_put_element)
                .get(document::handle_get_element)
                .delete(document::handle_delete_element),
        )
        .route("/api/v1/blocks", get(blocks::handle_list_blocks))
        .route(
            "/api/v1/blocks/:id",
            post(blocks::handle_register_block).delete(blocks::handle_unregister_block),
        )
        .with_state(state)
}
