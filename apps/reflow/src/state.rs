use crate::reflow::{Document, ReflowHandle};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Client for the reflow driver task, which owns the document and the block registry.
    pub reflow: ReflowHandle<Document>,
}
