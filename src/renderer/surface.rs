//! Drawing capability used by the layout engine
//!
//! The engine only ever talks to a `DrawSurface`, so the same layout code
//! drives the SVG backend and the recording backend used in tests.

use unicode_width::UnicodeWidthStr;

use crate::layout::Point;

use super::path::Path;

/// Font of one text run
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub family: String,
    pub size_px: f64,
    pub bold: bool,
    pub italic: bool,
}

/// Stroke state for one path
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub colour: String,
    pub width: f64,
    /// Alternating dash and gap lengths; empty for a solid line
    pub dash: Vec<f64>,
}

impl Stroke {
    pub fn solid(colour: impl Into<String>, width: f64) -> Self {
        Self {
            colour: colour.into(),
            width,
            dash: Vec::new(),
        }
    }

    pub fn dashed(colour: impl Into<String>, width: f64, dash: &[f64]) -> Self {
        Self {
            colour: colour.into(),
            width,
            dash: dash.to_vec(),
        }
    }
}

/// Text measurement
pub trait TextMeasure {
    /// Advance width of `text` in pixels
    fn measure_text(&self, text: &str, font: &Font) -> f64 {
        approximate_text_width(text, font)
    }
}

pub trait DrawSurface: TextMeasure {
    fn size(&self) -> (f64, f64);

    /// Resize and drop everything drawn so far
    fn resize(&mut self, width: f64, height: f64);

    fn clear(&mut self);

    fn fill_path(&mut self, path: &Path, colour: &str);

    fn stroke_path(&mut self, path: &Path, stroke: &Stroke);

    fn fill_circle(&mut self, centre: Point, radius: f64, colour: &str);

    /// Draw one run with its baseline starting at `at`
    fn fill_text(&mut self, text: &str, at: Point, font: &Font, colour: &str);
}

/// Width estimate from terminal cell widths and a per-family advance factor
pub fn approximate_text_width(text: &str, font: &Font) -> f64 {
    let cells = UnicodeWidthStr::width(text) as f64;
    let factor = match font.family.as_str() {
        "monospace" => 0.6,
        "serif" => 0.5,
        _ => 0.55,
    };
    let weight = if font.bold { 1.08 } else { 1.0 };
    cells * font.size_px * factor * weight
}
