use serde_json::Value;

use crate::parser::BlankLine;
use crate::renderer::DrawSurface;
use crate::style::positive;

use super::super::actor::{draw_timelines, timeline_extent};
use super::super::shapes::draw_active_fragments;
use super::super::types::Point;
use super::super::working::Working;
use super::{Comment, Element};

/// Vertical spacer that can also reserve width and carry a comment
#[derive(Debug, Clone, Copy)]
pub struct Blank<'l> {
    line: Option<&'l BlankLine>,
}

impl<'l> Blank<'l> {
    pub fn new(line: &'l BlankLine) -> Self {
        Self { line: Some(line) }
    }

    /// A bare gap of one global spacing, without timelines
    pub fn gap() -> Self {
        Self { line: None }
    }
}

fn size(value: Option<&Value>) -> f64 {
    value.and_then(positive).unwrap_or(0.0)
}

impl Element for Blank<'_> {
    fn draw(
        &self,
        working: &mut Working,
        surface: &mut dyn DrawSurface,
        start_y: f64,
        mimic: bool,
    ) -> Option<Point> {
        let Some(line) = self.line else {
            return Some(Point::new(0.0, start_y + working.global_spacing));
        };
        let gs = working.global_spacing;
        let width = size(line.width.as_ref());
        let height = size(line.height.as_ref());
        let left = working.window_padding
            + working.depth() as f64 * working.fragment_spacing
            + size(line.xoffset.as_ref());

        let comment = line.comment.as_ref().map(Comment::new);
        let mut bottom = start_y + height;
        if let Some(c) = &comment {
            bottom = c.draw(working, surface, left + 2.0 * gs, start_y + gs, 0.0, 0.0, true).y + height + 1.0;
        }
        let extent = timeline_extent(working, start_y, bottom - start_y) - start_y;

        draw_active_fragments(working, surface, start_y, extent, mimic);
        draw_timelines(working, surface, start_y, extent, None, mimic);
        if let Some(c) = &comment {
            c.draw(working, surface, left + 2.0 * gs, start_y + gs, 0.0, 0.0, mimic);
        }

        working.track(left + width, bottom);
        Some(working.track(0.0, start_y + extent))
    }
}
