//! Mutable context of one layout attempt

use serde_json::Value;

use crate::parser::{max_fragment_depth, Document, StyleMap};
use crate::renderer::DrawSurface;
use crate::style::{non_negative, FontSet, Props, Resolver, TextStyle};
use crate::text::{measure, Tag, TextBlock};

use super::actor::ActorRegistry;
use super::config::LayoutConfig;
use super::types::Point;

const DEFAULT_GLOBAL_SPACING: f64 = 30.0;

/// A fragment whose children are being drawn
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveFragment {
    pub start_x: f64,
    pub end_x: f64,
    pub colour: String,
    pub border_colour: String,
    pub border_width: f64,
    pub border_dash: Vec<f64>,
}

/// Everything one layout attempt reads and mutates
///
/// Rebuilt from scratch for every attempt of the growth loop; only the
/// negative-x offset survives from one attempt to the next.
#[derive(Debug)]
pub struct Working<'a> {
    pub document: &'a Document,
    pub global_spacing: f64,
    pub window_padding: f64,
    pub fragment_spacing: f64,
    pub start_x: f64,
    pub start_y: f64,
    pub max_fragment_depth: usize,
    pub tags: Vec<Tag>,
    pub fonts: FontSet,
    pub debug: bool,
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Leftmost x any element wanted to use, when below zero
    pub negative_x: f64,
    pub actors: ActorRegistry,
    pub active_fragments: Vec<ActiveFragment>,
    max_width: f64,
    max_height: f64,
    call_count: u32,
}

impl<'a> Working<'a> {
    pub fn new(
        document: &'a Document,
        config: &LayoutConfig,
        canvas: (f64, f64),
        negative_x: f64,
        debug: bool,
    ) -> Self {
        let params = Props::new(&document.params);
        let global_spacing = params
            .get("globalSpacing")
            .and_then(non_negative)
            .unwrap_or(DEFAULT_GLOBAL_SPACING);
        let window_padding = params
            .get("windowPadding")
            .and_then(non_negative)
            .unwrap_or(global_spacing);
        let fragment_spacing = params
            .section("fragment")
            .get("fragmentSpacing")
            .and_then(non_negative)
            .unwrap_or(global_spacing);

        let depth = max_fragment_depth(&document.lines);
        let shift = if negative_x < 0.0 {
            -negative_x + window_padding
        } else {
            0.0
        };

        let tags = match params.get("tags").and_then(Value::as_array) {
            Some(items) => items
                .iter()
                .filter_map(Value::as_str)
                .filter_map(Tag::parse)
                .collect(),
            None => Vec::new(),
        };

        Self {
            document,
            global_spacing,
            window_padding,
            fragment_spacing,
            start_x: window_padding + shift + depth as f64 * fragment_spacing,
            start_y: window_padding,
            max_fragment_depth: depth,
            tags,
            fonts: FontSet::new(config.fonts.iter().cloned()),
            debug,
            canvas_width: canvas.0,
            canvas_height: canvas.1,
            negative_x,
            actors: ActorRegistry::default(),
            active_fragments: Vec::new(),
            max_width: 0.0,
            max_height: 0.0,
            call_count: 0,
        }
    }

    /// Document-level `params`
    pub fn params(&self) -> Props<'a> {
        Props::new(&self.document.params)
    }

    /// Document defaults for one element kind, e.g. `params.call`
    pub fn defaults(&self, kind: &str) -> Props<'a> {
        self.params().section(kind)
    }

    pub fn resolver<'s>(&self, local: &'s StyleMap, kind: &str) -> Resolver<'s>
    where
        'a: 's,
    {
        Resolver::new(Props::new(local), self.defaults(kind))
    }

    pub fn text_style(&self, local: Props, document: Props, fallback: &TextStyle) -> TextStyle {
        TextStyle::resolve(&self.fonts, local, document, fallback)
    }

    /// Measure lines with the document's tags applied
    pub fn measure(&self, surface: &dyn DrawSurface, style: &TextStyle, lines: &[String]) -> TextBlock {
        measure(Some(surface), style, lines, &self.tags)
    }

    /// Record a reached point and hand it back
    pub fn track(&mut self, x: f64, y: f64) -> Point {
        if x.is_finite() && x > self.max_width {
            self.max_width = x;
        }
        if y.is_finite() && y > self.max_height {
            self.max_height = y;
        }
        Point::new(x, y)
    }

    pub fn track_point(&mut self, point: Point) -> Point {
        self.track(point.x, point.y)
    }

    pub fn max_width(&self) -> f64 {
        self.max_width
    }

    pub fn max_height(&self) -> f64 {
        self.max_height
    }

    /// Hand out the next sequence number
    pub fn next_call_number(&mut self) -> u32 {
        self.call_count += 1;
        self.call_count
    }

    pub fn call_count(&self) -> u32 {
        self.call_count
    }

    /// Number of open fragments
    pub fn depth(&self) -> usize {
        self.active_fragments.len()
    }

    /// Remember content left of the canvas so the next attempt can shift right
    pub fn note_left_edge(&mut self, x: f64) {
        if x < self.negative_x {
            self.negative_x = x - 10.0;
        }
    }
}
