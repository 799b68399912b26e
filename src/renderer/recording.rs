//! Surface that records drawing calls instead of producing output

use crate::layout::Point;

use super::path::Path;
use super::surface::{DrawSurface, Font, Stroke, TextMeasure};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillPath { path: Path, colour: String },
    StrokePath { path: Path, stroke: Stroke },
    FillCircle { centre: Point, radius: f64, colour: String },
    FillText { text: String, at: Point, font: Font, colour: String },
}

#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    width: f64,
    height: f64,
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Text of every run, in drawing order
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::FillText { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Fills painted with exactly this colour
    pub fn fills_with(&self, colour: &str) -> Vec<&Path> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::FillPath { path, colour: c } if c == colour => Some(path),
                _ => None,
            })
            .collect()
    }

    /// Strokes drawn with exactly this colour
    pub fn strokes_with(&self, colour: &str) -> Vec<(&Path, &Stroke)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::StrokePath { path, stroke } if stroke.colour == colour => {
                    Some((path, stroke))
                }
                _ => None,
            })
            .collect()
    }
}

impl TextMeasure for RecordingSurface {}

impl DrawSurface for RecordingSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.clear();
    }

    fn clear(&mut self) {
        self.ops.clear();
    }

    fn fill_path(&mut self, path: &Path, colour: &str) {
        self.ops.push(DrawOp::FillPath {
            path: path.clone(),
            colour: colour.to_string(),
        });
    }

    fn stroke_path(&mut self, path: &Path, stroke: &Stroke) {
        self.ops.push(DrawOp::StrokePath {
            path: path.clone(),
            stroke: stroke.clone(),
        });
    }

    fn fill_circle(&mut self, centre: Point, radius: f64, colour: &str) {
        self.ops.push(DrawOp::FillCircle {
            centre,
            radius,
            colour: colour.to_string(),
        });
    }

    fn fill_text(&mut self, text: &str, at: Point, font: &Font, colour: &str) {
        self.ops.push(DrawOp::FillText {
            text: text.to_string(),
            at,
            font: font.clone(),
            colour: colour.to_string(),
        });
    }
}
