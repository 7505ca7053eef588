//! Greedy, word-granular line filling driven by measured widths.
//!
//! Each candidate line is measured whole (`"current word"`), not as a sum of word widths,
//! so kerning and spacing come from the measurement surface rather than from assumptions.
//! Words are never split or truncated: a word wider than the target gets a line to itself.

use crate::errors::ReflowError;
use crate::layout::font::FontDescriptor;
use crate::layout::measure::TextMeasure;

/// Packs `text` into visual lines no wider than `max_width_px`.
///
/// Words are separated by single spaces only, so a no-break space keeps its two halves
/// together. Runs of spaces collapse; leading/trailing whitespace is ignored. Empty text
/// yields no lines. A NaN width behaves like zero (one word per line).
pub fn pack<M>(
    measure: &mut M,
    text: &str,
    font: &FontDescriptor,
    max_width_px: f32,
) -> Result<Vec<String>, ReflowError>
where
    M: TextMeasure + ?Sized,
{
    let max_width = if max_width_px.is_nan() {
        0.0
    } else {
        max_width_px
    };

    let mut lines: Vec<String> = Vec::new();
    let mut current_line = String::new();

    for word in text.trim().split(' ').filter(|word| !word.is_empty()) {
        let candidate = if current_line.is_empty() {
            word.to_string()
        } else {
            format!("{current_line} {word}")
        };

        let width = measure.measure_width(&candidate, font)?;

        if width > max_width && !current_line.is_empty() {
            lines.push(std::mem::replace(&mut current_line, word.to_string()));
        } else {
            current_line = candidate;
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    Ok(lines)
}
