//! Reflow coordinator: owns the block registry and runs packing passes over it.
//!
//! Every failure is contained to the block it happened in: a pass always visits every
//! registered block, and nothing here returns an error for the pass as a whole.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::errors::ReflowError;
use crate::layout::markup::render_lines;
use crate::layout::{pack, FontDescriptor, MeasurementService};
use crate::reflow::debounce::{ResizeDebounce, ResizeTransition};
use crate::reflow::environment::Environment;

// ────────────────────────────────────────────────────────────────────────────
// Data model
// ────────────────────────────────────────────────────────────────────────────

/// A registered text block. Width and font are refreshed on every successful pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBlock {
    pub id: String,
    pub original_text: String,
    pub container_width_px: f32,
    pub font: FontDescriptor,
}

/// Block id → block. Iteration is ordered by id.
pub type Registry = BTreeMap<String, TextBlock>;

/// Outcome of one pass over the registry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReflowReport {
    pub reflowed: usize,
    /// Blocks whose element was gone; their registry entries are kept.
    pub stale: usize,
    pub failed: usize,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinatorStatus {
    pub resizing: bool,
    pub quiet_period_ms: u64,
    pub registered: usize,
    pub passes: u64,
    pub last_report: Option<ReflowReport>,
}

// ────────────────────────────────────────────────────────────────────────────
// Coordinator
// ────────────────────────────────────────────────────────────────────────────

pub struct Coordinator<E> {
    env: E,
    measurement: MeasurementService,
    registry: Registry,
    debounce: ResizeDebounce,
    passes: u64,
    last_report: Option<ReflowReport>,
}

impl<E: Environment> Coordinator<E> {
    pub fn new(env: E, measurement: MeasurementService, quiet_period: Duration) -> Self {
        Self {
            env,
            measurement,
            registry: Registry::new(),
            debounce: ResizeDebounce::new(quiet_period),
            passes: 0,
            last_report: None,
        }
    }

    pub fn environment(&self) -> &E {
        &self.env
    }

    pub fn environment_mut(&mut self) -> &mut E {
        &mut self.env
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn status(&self) -> CoordinatorStatus {
        CoordinatorStatus {
            resizing: self.debounce.is_resizing(),
            quiet_period_ms: self.debounce.quiet_period().as_millis() as u64,
            registered: self.registry.len(),
            passes: self.passes,
            last_report: self.last_report.clone(),
        }
    }

    /// Discovers marked elements and registers every one that has source text.
    /// Returns how many blocks were registered.
    pub fn init(&mut self) -> usize {
        let discovered = self.env.discover();
        let mut registered = 0;

        for element in discovered {
            let has_text = element
                .source_text
                .as_deref()
                .is_some_and(|text| !text.trim().is_empty());
            if !has_text {
                debug!(block = %element.id, "Skipping element without source text");
                continue;
            }

            match self.register_element(&element.id) {
                Ok(_) => registered += 1,
                Err(e) => {
                    // Registered, but its first pass failed.
                    registered += 1;
                    warn!(block = %element.id, error = %e, "Initial reflow failed");
                }
            }
        }

        info!(registered, "Hero text blocks initialised");
        registered
    }

    /// Builds a block from the live element and registers it.
    pub fn register_element(&mut self, id: &str) -> Result<Vec<String>, ReflowError> {
        let snapshot = self
            .env
            .element(id)
            .ok_or_else(|| ReflowError::StaleElement { id: id.to_string() })?;
        let original_text = snapshot
            .source_text
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| ReflowError::MissingSourceText { id: id.to_string() })?;

        self.register(TextBlock {
            id: id.to_string(),
            original_text,
            container_width_px: snapshot.container_width_px,
            font: snapshot.font,
        })
    }

    /// Adds or overwrites the block, then reflows that block alone.
    ///
    /// The block stays registered even if this first pass fails.
    pub fn register(&mut self, block: TextBlock) -> Result<Vec<String>, ReflowError> {
        let id = block.id.clone();
        self.registry.insert(id.clone(), block);
        self.reflow_block(&id)
    }

    pub fn unregister(&mut self, id: &str) -> Option<TextBlock> {
        self.registry.remove(id)
    }

    /// One pass over every registered block.
    pub fn reflow_all(&mut self) -> ReflowReport {
        let ids: Vec<String> = self.registry.keys().cloned().collect();
        let (mut reflowed, mut stale, mut failed) = (0, 0, 0);

        for id in &ids {
            match self.reflow_block(id) {
                Ok(_) => reflowed += 1,
                Err(ReflowError::StaleElement { .. }) => {
                    debug!(block = %id, "Element gone; skipping");
                    stale += 1;
                }
                Err(e) => {
                    warn!(block = %id, error = %e, "Reflow failed for block");
                    failed += 1;
                }
            }
        }

        self.passes += 1;
        let report = ReflowReport {
            reflowed,
            stale,
            failed,
            completed_at: Utc::now(),
        };
        debug!(
            pass = self.passes,
            reflowed, stale, failed, "Reflow pass complete"
        );
        self.last_report = Some(report.clone());
        report
    }

    /// Feeds one resize signal into the debounce. Transitions are suppressed on burst entry only.
    pub fn handle_resize(&mut self, now: Instant) -> ResizeTransition {
        let transition = self.debounce.on_resize(now);
        if transition == ResizeTransition::Entered {
            self.env.set_transitions_suppressed(true);
            debug!("Resize burst started; transitions suppressed");
        }
        transition
    }

    /// When the quiet period has elapsed, runs the pass and lifts transition suppression.
    pub fn fire_if_due(&mut self, now: Instant) -> Option<ReflowReport> {
        if !self.debounce.fire(now) {
            return None;
        }
        let report = self.reflow_all();
        self.env.set_transitions_suppressed(false);
        Some(report)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    fn reflow_block(&mut self, id: &str) -> Result<Vec<String>, ReflowError> {
        let stale = || ReflowError::StaleElement { id: id.to_string() };
        let original_text = self
            .registry
            .get(id)
            .map(|block| block.original_text.clone())
            .ok_or_else(stale)?;

        self.env.reset_content(id, &original_text)?;
        let snapshot = self.env.element(id).ok_or_else(stale)?;

        let lines = pack(
            &mut self.measurement,
            &original_text,
            &snapshot.font,
            snapshot.container_width_px,
        )?;
        self.env.replace_content(id, &render_lines(&lines))?;

        if let Some(block) = self.registry.get_mut(id) {
            block.container_width_px = snapshot.container_width_px;
            block.font = snapshot.font;
        }

        debug!(
            block = %id,
            lines = lines.len(),
            width = snapshot.container_width_px,
            "Block reflowed"
        );
        Ok(lines)
    }
}
