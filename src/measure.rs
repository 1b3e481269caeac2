//! Text measurement.
//!
//! Label placement needs the rendered width of each label before it can
//! pick a final position. The chart asks a [`TextMeasurer`] instead of a
//! rendering surface, so layout runs the same headless as in a browser.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font_size: f64,
}

impl TextStyle {
    pub const fn new(font_size: f64) -> Self {
        Self { font_size }
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::new(12.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TextExtent {
    pub width: f64,
    pub height: f64,
}

impl TextExtent {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextExtent;
}

impl<M: TextMeasurer + ?Sized> TextMeasurer for &M {
    fn measure(&self, text: &str, style: &TextStyle) -> TextExtent {
        (**self).measure(text, style)
    }
}

/// Width estimate from average glyph advances of a proportional sans-serif.
///
/// Good to a few pixels for Latin text, which is all label placement needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontMetrics {
    /// Em fraction for narrow glyphs (`i`, `l`, punctuation).
    pub narrow: f64,
    /// Em fraction for ordinary lowercase and digits.
    pub regular: f64,
    /// Em fraction for capitals and wide glyphs (`m`, `w`).
    pub wide: f64,
    /// Line box height as a multiple of the font size.
    pub line_height: f64,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            narrow: 0.28,
            regular: 0.55,
            wide: 0.72,
            line_height: 1.2,
        }
    }
}

impl FontMetrics {
    fn advance(&self, ch: char) -> f64 {
        match ch {
            'i' | 'j' | 'l' | 'I' | '.' | ',' | ':' | ';' | '\'' | '!' | '|' | ' ' => self.narrow,
            'm' | 'w' | 'M' | 'W' | '%' | '@' => self.wide,
            c if c.is_uppercase() => self.wide * 0.92,
            _ => self.regular,
        }
    }
}

impl TextMeasurer for FontMetrics {
    fn measure(&self, text: &str, style: &TextStyle) -> TextExtent {
        let em: f64 = text.chars().map(|c| self.advance(c)).sum();
        TextExtent {
            width: em * style.font_size,
            height: if text.is_empty() {
                0.0
            } else {
                style.font_size * self.line_height
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_no_extent() {
        let m = FontMetrics::default();
        assert_eq!(m.measure("", &TextStyle::default()), TextExtent::default());
    }

    #[test]
    fn wider_text_measures_wider() {
        let m = FontMetrics::default();
        let style = TextStyle::new(12.0);
        let short = m.measure("ill", &style);
        let long = m.measure("Mammoth", &style);
        assert!(long.width > short.width);
        assert_eq!(long.height, short.height);
        assert!((long.height - 14.4).abs() < 1e-9);
    }

    #[test]
    fn scales_with_font_size() {
        let m = FontMetrics::default();
        let a = m.measure("More Likely", &TextStyle::new(10.0));
        let b = m.measure("More Likely", &TextStyle::new(20.0));
        assert!((b.width - 2.0 * a.width).abs() < 1e-9);
    }
}
