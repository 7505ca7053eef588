//! In-memory page model implementing [`Environment`].
//!
//! Elements keep the pieces the reflow core reads (source text, computed font, width) and
//! the content it writes. Widths may be fixed or a fraction of the viewport, so changing
//! the viewport moves container widths the way percentage-width CSS does.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::errors::ReflowError;
use crate::layout::FontDescriptor;
use crate::reflow::environment::{DiscoveredElement, ElementSnapshot, Environment, ReadyState};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ElementWidth {
    /// Fixed width in px.
    Fixed(f32),
    /// Fraction of the viewport width (1.0 = full width).
    Viewport(f32),
}

impl ElementWidth {
    fn resolve(self, viewport_width_px: f32) -> f32 {
        match self {
            ElementWidth::Fixed(px) => px,
            ElementWidth::Viewport(fraction) => fraction * viewport_width_px,
        }
    }
}

/// Description of an element to place on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSpec {
    pub id: String,
    /// The source-text marker attribute. Absent means the element is not reflowable.
    #[serde(default)]
    pub source_text: Option<String>,
    pub font: FontDescriptor,
    pub width: ElementWidth,
}

#[derive(Debug, Clone, PartialEq)]
struct Element {
    spec: ElementSpec,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct Fixture {
    #[serde(default)]
    ready_state: Option<ReadyState>,
    elements: Vec<ElementSpec>,
}

#[derive(Debug, Clone)]
pub struct Document {
    viewport_width_px: f32,
    ready_state: ReadyState,
    elements: BTreeMap<String, Element>,
    transitions_suppressed: bool,
}

impl Document {
    pub fn new(viewport_width_px: f32, ready_state: ReadyState) -> Self {
        Self {
            viewport_width_px,
            ready_state,
            elements: BTreeMap::new(),
            transitions_suppressed: false,
        }
    }

    /// Loads elements from a JSON fixture: `{ "ready_state"?: ..., "elements": [ElementSpec] }`.
    pub fn from_fixture(path: &Path, viewport_width_px: f32) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read page fixture {}", path.display()))?;
        let fixture: Fixture = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid page fixture {}", path.display()))?;

        let mut document = Self::new(
            viewport_width_px,
            fixture.ready_state.unwrap_or(ReadyState::Complete),
        );
        for spec in fixture.elements {
            document.insert(spec);
        }
        Ok(document)
    }

    /// Inserts or replaces an element. Its initial content is the source text.
    pub fn insert(&mut self, spec: ElementSpec) {
        let content = spec.source_text.clone().unwrap_or_default();
        self.elements
            .insert(spec.id.clone(), Element { spec, content });
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.elements.remove(id).is_some()
    }

    pub fn set_viewport_width(&mut self, px: f32) {
        self.viewport_width_px = px.max(0.0);
    }

    pub fn viewport_width(&self) -> f32 {
        self.viewport_width_px
    }

    pub fn mark_ready(&mut self) {
        self.ready_state = ReadyState::Complete;
    }

    pub fn content(&self, id: &str) -> Option<&str> {
        self.elements.get(id).map(|e| e.content.as_str())
    }

    pub fn transitions_suppressed(&self) -> bool {
        self.transitions_suppressed
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    fn element_mut(&mut self, id: &str) -> Result<&mut Element, ReflowError> {
        self.elements
            .get_mut(id)
            .ok_or_else(|| ReflowError::StaleElement { id: id.to_string() })
    }
}

impl Environment for Document {
    fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    fn discover(&self) -> Vec<DiscoveredElement> {
        self.elements
            .values()
            .map(|e| DiscoveredElement {
                id: e.spec.id.clone(),
                source_text: e.spec.source_text.clone(),
            })
            .collect()
    }

    fn element(&self, id: &str) -> Option<ElementSnapshot> {
        self.elements.get(id).map(|e| ElementSnapshot {
            source_text: e.spec.source_text.clone(),
            container_width_px: e.spec.width.resolve(self.viewport_width_px),
            font: e.spec.font.clone(),
        })
    }

    fn reset_content(&mut self, id: &str, text: &str) -> Result<(), ReflowError> {
        self.element_mut(id)?.content = text.to_string();
        Ok(())
    }

    fn replace_content(&mut self, id: &str, markup: &str) -> Result<(), ReflowError> {
        self.element_mut(id)?.content = markup.to_string();
        Ok(())
    }

    fn set_transitions_suppressed(&mut self, suppressed: bool) {
        self.transitions_suppressed = suppressed;
    }
}
