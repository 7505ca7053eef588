//! The host environment as seen by the coordinator.
//!
//! Element discovery, computed style and width reads, content writes, and the global
//! transition toggle all go through [`Environment`], so the coordinator can run against
//! the in-memory [`Document`](crate::reflow::document::Document) or a scripted fake.

use crate::errors::ReflowError;
use crate::layout::FontDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadyState {
    Loading,
    Complete,
}

/// An element carrying the source-text marker, as found by discovery.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveredElement {
    pub id: String,
    pub source_text: Option<String>,
}

/// Live reads for one element at the moment of a reflow pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSnapshot {
    pub source_text: Option<String>,
    pub container_width_px: f32,
    pub font: FontDescriptor,
}

pub trait Environment: Send {
    fn ready_state(&self) -> ReadyState;

    fn discover(&self) -> Vec<DiscoveredElement>;

    /// `None` when the element has been removed from the page.
    fn element(&self, id: &str) -> Option<ElementSnapshot>;

    /// Restores the plain source text so the container is measured without stale line markup.
    fn reset_content(&mut self, id: &str, text: &str) -> Result<(), ReflowError>;

    fn replace_content(&mut self, id: &str, markup: &str) -> Result<(), ReflowError>;

    /// The single document-wide transition toggle.
    fn set_transitions_suppressed(&mut self, suppressed: bool);
}
