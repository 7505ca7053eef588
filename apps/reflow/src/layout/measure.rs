//! One lazily created text-measurement surface, reused for every call.
//!
//! The raw surface never leaves this module. Callers go through [`TextMeasure`], which
//! pairs "set font" and "measure" so no call can observe a font left behind by another.

use tracing::debug;

use crate::errors::ReflowError;
use crate::layout::font::FontDescriptor;
use crate::layout::font_metrics::MetricTableProvider;

/// An off-screen text-metrics context.
pub trait MeasureSurface: Send {
    /// Sets the active font, e.g. `"700 48px Inter, sans-serif"`.
    fn set_font(&mut self, font: &str);

    /// Advance width of `text` in CSS px under the active font.
    fn measure_text(&self, text: &str) -> f32;
}

/// Host capability that can produce a measurement surface.
///
/// Returning `None` means the environment cannot measure text at all.
pub trait SurfaceProvider: Send {
    fn create_surface(&self) -> Option<Box<dyn MeasureSurface>>;
}

/// The seam the line packer measures through.
pub trait TextMeasure {
    fn measure_width(&mut self, text: &str, font: &FontDescriptor) -> Result<f32, ReflowError>;
}

pub struct MeasurementService {
    provider: Box<dyn SurfaceProvider>,
    surface: Option<Box<dyn MeasureSurface>>,
}

impl MeasurementService {
    pub fn new(provider: impl SurfaceProvider + 'static) -> Self {
        Self {
            provider: Box::new(provider),
            surface: None,
        }
    }

    /// Service backed by the built-in static metric tables.
    pub fn with_metric_tables() -> Self {
        Self::new(MetricTableProvider)
    }
}

impl TextMeasure for MeasurementService {
    fn measure_width(&mut self, text: &str, font: &FontDescriptor) -> Result<f32, ReflowError> {
        let surface = match self.surface.take() {
            Some(surface) => surface,
            None => {
                let surface = self
                    .provider
                    .create_surface()
                    .ok_or(ReflowError::MeasurementUnavailable)?;
                debug!("Measurement surface created");
                surface
            }
        };
        let surface = self.surface.insert(surface);

        if text.is_empty() {
            return Ok(0.0);
        }

        surface.set_font(&font.css_font());
        let width = surface.measure_text(text);
        Ok(if width.is_finite() && width > 0.0 {
            width
        } else {
            0.0
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Records every font it is given and reports 10px per char.
    struct RecordingSurface {
        fonts: Arc<Mutex<Vec<String>>>,
        width_override: Option<f32>,
    }

    impl MeasureSurface for RecordingSurface {
        fn set_font(&mut self, font: &str) {
            self.fonts.lock().unwrap().push(font.to_string());
        }

        fn measure_text(&self, text: &str) -> f32 {
            self.width_override
                .unwrap_or(text.chars().count() as f32 * 10.0)
        }
    }

    struct CountingProvider {
        created: Arc<AtomicUsize>,
        fonts: Arc<Mutex<Vec<String>>>,
        width_override: Option<f32>,
    }

    impl SurfaceProvider for CountingProvider {
        fn create_surface(&self) -> Option<Box<dyn MeasureSurface>> {
            self.created.fetch_add(1, Ordering::SeqCst);
            Some(Box::new(RecordingSurface {
                fonts: Arc::clone(&self.fonts),
                width_override: self.width_override,
            }))
        }
    }

    struct UnavailableProvider;

    impl SurfaceProvider for UnavailableProvider {
        fn create_surface(&self) -> Option<Box<dyn MeasureSurface>> {
            None
        }
    }

    type Recorded = (MeasurementService, Arc<AtomicUsize>, Arc<Mutex<Vec<String>>>);

    fn counting(width_override: Option<f32>) -> Recorded {
        let created = Arc::new(AtomicUsize::new(0));
        let fonts = Arc::new(Mutex::new(Vec::new()));
        let service = MeasurementService::new(CountingProvider {
            created: Arc::clone(&created),
            fonts: Arc::clone(&fonts),
            width_override,
        });
        (service, created, fonts)
    }

    fn font() -> FontDescriptor {
        FontDescriptor::new("700", "48px", "Inter")
    }

    #[test]
    fn test_surface_is_created_lazily_and_once() {
        let (mut service, created, _) = counting(None);
        assert!(service.surface.is_none());
        assert_eq!(created.load(Ordering::SeqCst), 0);

        for word in ["one", "two", "three"] {
            service.measure_width(word, &font()).unwrap();
        }

        assert!(service.surface.is_some());
        assert_eq!(created.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_font_is_set_before_every_measurement() {
        let (mut service, _, fonts) = counting(None);
        let other = FontDescriptor::new("400", "12px", "serif");

        service.measure_width("a", &font()).unwrap();
        service.measure_width("b", &other).unwrap();

        assert_eq!(
            *fonts.lock().unwrap(),
            vec!["700 48px Inter".to_string(), "400 12px serif".to_string()]
        );
    }

    #[test]
    fn test_measure_width_returns_surface_width() {
        let (mut service, _, _) = counting(None);
        let width = service.measure_width("hero", &font()).unwrap();
        assert!((width - 40.0).abs() < 1e-4);
    }

    #[test]
    fn test_empty_string_is_zero() {
        let (mut service, _, _) = counting(Some(99.0));
        assert_eq!(service.measure_width("", &font()).unwrap(), 0.0);
    }

    #[test]
    fn test_negative_and_nan_widths_clamp_to_zero() {
        let (mut negative, _, _) = counting(Some(-5.0));
        let (mut nan, _, _) = counting(Some(f32::NAN));
        assert_eq!(negative.measure_width("x", &font()).unwrap(), 0.0);
        assert_eq!(nan.measure_width("x", &font()).unwrap(), 0.0);
    }

    #[test]
    fn test_unavailable_capability_is_an_error() {
        let mut service = MeasurementService::new(UnavailableProvider);
        let err = service.measure_width("x", &font()).unwrap_err();
        assert!(matches!(err, ReflowError::MeasurementUnavailable));
        assert!(service.surface.is_none());
    }

    #[test]
    fn test_metric_table_service_measures_real_text() {
        let mut service = MeasurementService::with_metric_tables();
        let width = service.measure_width("Hello world", &font()).unwrap();
        assert!(width > 0.0);
    }
}
