//! Static font-metric measurement surface.
//!
//! Character widths are in em units (relative to font size). One base table describes a
//! humanist sans-serif; other families are expressed as a width scale over it. This is an
//! approximation of real glyph advances, but it is deterministic and needs no host.
//! The table covers ASCII 0x20..=0x7E (95 printable characters), index = (char as usize) - 32.

use serde::{Deserialize, Serialize};

use crate::layout::font::{FontDescriptor, DEFAULT_FONT_SIZE_PX};
use crate::layout::measure::{MeasureSurface, SurfaceProvider};

/// Weights at or above this value are treated as bold.
const BOLD_THRESHOLD: u16 = 600;
/// Bold glyphs run wider than regular ones.
const BOLD_WIDTH_FACTOR: f32 = 1.06;
/// Per-character advance for monospace families.
const MONOSPACE_ADVANCE_EM: f32 = 0.60;

// ────────────────────────────────────────────────────────────────────────────
// Family classification
// ────────────────────────────────────────────────────────────────────────────

/// Families the surface knows how to approximate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FamilyClass {
    Inter,
    Lato,
    EbGaramond,
    Oswald,
    ComputerModern,
    Serif,
    SansSerif,
    Monospace,
}

impl FamilyClass {
    /// Resolves a CSS family list; the first recognised entry wins, unknown lists read as sans-serif.
    pub fn resolve(font: &FontDescriptor) -> Self {
        font.families()
            .iter()
            .find_map(|name| Self::from_name(name))
            .unwrap_or(FamilyClass::SansSerif)
    }

    fn from_name(name: &str) -> Option<Self> {
        let class = match name {
            "inter" => FamilyClass::Inter,
            "lato" => FamilyClass::Lato,
            "eb garamond" | "garamond" => FamilyClass::EbGaramond,
            "oswald" => FamilyClass::Oswald,
            "computer modern" | "cmu serif" | "latin modern roman" => FamilyClass::ComputerModern,
            "serif" | "georgia" | "times" | "times new roman" => FamilyClass::Serif,
            "sans-serif" | "system-ui" | "helvetica" | "arial" => FamilyClass::SansSerif,
            "monospace" | "courier" | "courier new" | "menlo" => FamilyClass::Monospace,
            _ => return None,
        };
        Some(class)
    }

    /// Width relative to the base table.
    fn scale(self) -> f32 {
        match self {
            FamilyClass::Inter | FamilyClass::SansSerif => 1.00,
            FamilyClass::Lato => 1.05,
            FamilyClass::EbGaramond => 0.85,
            FamilyClass::Oswald => 0.68,
            FamilyClass::ComputerModern | FamilyClass::Serif => 0.90,
            FamilyClass::Monospace => 1.00,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table, widths in em at 1em.
pub struct FontMetricTable {
    widths: [f32; 95],
    /// Fallback width for non-ASCII characters (codepoints > 0x7E).
    pub average_char_width: f32,
}

impl FontMetricTable {
    /// Width of a string in em units under this table.
    pub fn measure_em(&self, s: &str) -> f32 {
        s.chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    self.widths[code - 32]
                } else {
                    self.average_char_width
                }
            })
            .sum()
    }
}

/// Humanist sans-serif base table.
static BASE_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
        0.25, 0.30, 0.38, 0.56, 0.56, 0.89, 0.67, 0.22, 0.33, 0.33, 0.39, 0.59, 0.28, 0.33, 0.28, 0.31,
        // 0     1     2     3     4     5     6     7     8     9
        0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56,
        // :     ;     <     =     >     ?     @
        0.28, 0.28, 0.59, 0.59, 0.59, 0.50, 1.02,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
        0.67, 0.61, 0.61, 0.67, 0.56, 0.50, 0.67, 0.67, 0.25, 0.39, 0.61, 0.53, 0.78,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
        0.67, 0.72, 0.56, 0.72, 0.61, 0.50, 0.56, 0.67, 0.67, 0.89, 0.61, 0.61, 0.56,
        // [     \     ]     ^     _     `
        0.28, 0.31, 0.28, 0.47, 0.56, 0.34,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
        0.56, 0.56, 0.50, 0.56, 0.56, 0.31, 0.56, 0.56, 0.22, 0.22, 0.53, 0.22, 0.83,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
        0.56, 0.56, 0.56, 0.56, 0.33, 0.44, 0.39, 0.56, 0.50, 0.72, 0.50, 0.50, 0.44,
        // {     |     }     ~
        0.33, 0.26, 0.33, 0.59,
    ],
    average_char_width: 0.52,
};

// ────────────────────────────────────────────────────────────────────────────
// Surface
// ────────────────────────────────────────────────────────────────────────────

/// Resolved state of the active font string.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ActiveFont {
    class: FamilyClass,
    size_px: f32,
    bold: bool,
}

impl Default for ActiveFont {
    fn default() -> Self {
        Self {
            class: FamilyClass::SansSerif,
            size_px: DEFAULT_FONT_SIZE_PX,
            bold: false,
        }
    }
}

/// Measurement surface that answers from [`BASE_TABLE`].
#[derive(Debug, Default)]
pub struct MetricTableSurface {
    active: ActiveFont,
}

impl MeasureSurface for MetricTableSurface {
    fn set_font(&mut self, font: &str) {
        // An unparseable font string leaves the previous font active, like a canvas does.
        if let Some(font) = FontDescriptor::parse(font) {
            self.active = ActiveFont {
                class: FamilyClass::resolve(&font),
                size_px: font.size_px(),
                bold: font.weight_value() >= BOLD_THRESHOLD,
            };
        }
    }

    fn measure_text(&self, text: &str) -> f32 {
        let ActiveFont {
            class,
            size_px,
            bold,
        } = self.active;

        let em = match class {
            FamilyClass::Monospace => text.chars().count() as f32 * MONOSPACE_ADVANCE_EM,
            _ => BASE_TABLE.measure_em(text) * class.scale(),
        };
        let weight_factor = if bold { BOLD_WIDTH_FACTOR } else { 1.0 };
        em * weight_factor * size_px
    }
}

/// Provider for [`MetricTableSurface`]; always available.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricTableProvider;

impl SurfaceProvider for MetricTableProvider {
    fn create_surface(&self) -> Option<Box<dyn MeasureSurface>> {
        Some(Box::new(MetricTableSurface::default()))
    }
}
