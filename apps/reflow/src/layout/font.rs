//! Font descriptors: the `weight size family` triple read from an element's computed style.
//!
//! A descriptor is an immutable value captured at measurement time. The measurement
//! surface only ever sees it serialized through [`FontDescriptor::css_font`], so
//! [`FontDescriptor::parse`] is the inverse used on the surface side.

use serde::{Deserialize, Serialize};

/// Size assumed when a computed font size cannot be interpreted.
pub const DEFAULT_FONT_SIZE_PX: f32 = 16.0;

/// Root font size used to resolve `em` / `rem` sizes.
const ROOT_FONT_SIZE_PX: f32 = 16.0;

const NORMAL_WEIGHT: u16 = 400;
const BOLD_WEIGHT: u16 = 700;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontDescriptor {
    pub weight: String,
    pub size: String,
    pub family: String,
}

impl FontDescriptor {
    pub fn new(
        weight: impl Into<String>,
        size: impl Into<String>,
        family: impl Into<String>,
    ) -> Self {
        Self {
            weight: weight.into(),
            size: size.into(),
            family: family.into(),
        }
    }

    /// The exact font string handed to the measurement surface: `"{weight} {size} {family}"`.
    pub fn css_font(&self) -> String {
        format!("{} {} {}", self.weight, self.size, self.family)
    }

    /// Parses a `"{weight} {size} {family}"` string back into a descriptor.
    ///
    /// The family is everything after the second space, so family lists such as
    /// `"Inter", sans-serif` survive intact. Returns `None` if any part is missing.
    pub fn parse(css_font: &str) -> Option<Self> {
        let mut parts = css_font.trim().splitn(3, ' ');
        let weight = parts.next()?.trim();
        let size = parts.next()?.trim();
        let family = parts.next()?.trim();
        if weight.is_empty() || size.is_empty() || family.is_empty() {
            return None;
        }
        Some(Self::new(weight, size, family))
    }

    /// Font size resolved to CSS pixels.
    pub fn size_px(&self) -> f32 {
        parse_size_px(&self.size)
    }

    /// Numeric weight (`normal` = 400, `bold` = 700). Unknown values read as normal.
    pub fn weight_value(&self) -> u16 {
        match self.weight.trim().to_ascii_lowercase().as_str() {
            "normal" => NORMAL_WEIGHT,
            "bold" | "bolder" => BOLD_WEIGHT,
            "lighter" => 300,
            other => other.parse::<u16>().unwrap_or(NORMAL_WEIGHT),
        }
    }

    /// Family names in priority order, lowercased with quotes stripped.
    pub fn families(&self) -> Vec<String> {
        self.family
            .split(',')
            .map(|name| {
                name.trim()
                    .trim_matches(|c| c == '"' || c == '\'')
                    .trim()
                    .to_ascii_lowercase()
            })
            .filter(|name| !name.is_empty())
            .collect()
    }
}

fn parse_size_px(size: &str) -> f32 {
    let size = size.trim().to_ascii_lowercase();
    let (number, factor) = if let Some(n) = size.strip_suffix("px") {
        (n, 1.0)
    } else if let Some(n) = size.strip_suffix("pt") {
        (n, 96.0 / 72.0)
    } else if let Some(n) = size.strip_suffix("rem") {
        (n, ROOT_FONT_SIZE_PX)
    } else if let Some(n) = size.strip_suffix("em") {
        (n, ROOT_FONT_SIZE_PX)
    } else {
        (size.as_str(), 1.0)
    };

    match number.trim().parse::<f32>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value * factor,
        _ => DEFAULT_FONT_SIZE_PX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hero_font() -> FontDescriptor {
        FontDescriptor::new("700", "48px", "\"Inter\", sans-serif")
    }

    #[test]
    fn test_css_font_joins_with_single_spaces() {
        assert_eq!(hero_font().css_font(), "700 48px \"Inter\", sans-serif");
    }

    #[test]
    fn test_parse_inverts_css_font() {
        let font = hero_font();
        assert_eq!(FontDescriptor::parse(&font.css_font()), Some(font));
    }

    #[test]
    fn test_parse_rejects_incomplete_strings() {
        assert_eq!(FontDescriptor::parse(""), None);
        assert_eq!(FontDescriptor::parse("700 48px"), None);
    }

    #[test]
    fn test_size_px_units() {
        let px = FontDescriptor::new("400", "20px", "serif");
        let pt = FontDescriptor::new("400", "12pt", "serif");
        let rem = FontDescriptor::new("400", "2rem", "serif");
        let em = FontDescriptor::new("400", "1.5em", "serif");
        let bare = FontDescriptor::new("400", "30", "serif");
        assert!((px.size_px() - 20.0).abs() < 1e-4);
        assert!((pt.size_px() - 16.0).abs() < 1e-4);
        assert!((rem.size_px() - 32.0).abs() < 1e-4);
        assert!((em.size_px() - 24.0).abs() < 1e-4);
        assert!((bare.size_px() - 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_size_px_garbage_falls_back() {
        let font = FontDescriptor::new("400", "huge", "serif");
        assert_eq!(font.size_px(), DEFAULT_FONT_SIZE_PX);
    }

    #[test]
    fn test_weight_keywords() {
        assert_eq!(FontDescriptor::new("bold", "1px", "a").weight_value(), 700);
        assert_eq!(FontDescriptor::new("normal", "1px", "a").weight_value(), 400);
        assert_eq!(FontDescriptor::new("600", "1px", "a").weight_value(), 600);
        assert_eq!(FontDescriptor::new("??", "1px", "a").weight_value(), 400);
    }

    #[test]
    fn test_families_strip_quotes_and_case() {
        let font = FontDescriptor::new("400", "16px", "'EB Garamond', \"Georgia\", serif");
        assert_eq!(font.families(), vec!["eb garamond", "georgia", "serif"]);
    }
}
