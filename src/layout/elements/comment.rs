//! Folded note with a dashed elbow back to its anchor

use crate::parser::StyledText;
use crate::renderer::{DrawSurface, Path, Stroke};
use crate::style::{at_least, Align, Props, TextStyle};

use super::super::shapes::{LineStyle, TextBox};
use super::super::types::Point;
use super::super::working::Working;

const SHADOW_COLOUR: &str = "rgb(210,210,210)";
const SHADOW_OFFSET: f64 = 3.0;
const MAX_FOLD: f64 = 30.0;

/// A comment attached to some other element
#[derive(Debug, Clone, Copy)]
pub struct Comment<'l> {
    note: &'l StyledText,
}

impl<'l> Comment<'l> {
    pub fn new(note: &'l StyledText) -> Self {
        Self { note }
    }

    /// Draw the note with its top-left at `start + (gap_right, 0)`
    ///
    /// The connector runs from the note's left edge back to `start_x` and
    /// down to `gap_below` under the note. Returns the start point unchanged
    /// when the position or gaps cannot hold a note.
    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &self,
        working: &mut Working,
        surface: &mut dyn DrawSurface,
        start_x: f64,
        start_y: f64,
        gap_below: f64,
        gap_right: f64,
        mimic: bool,
    ) -> Point {
        let start = Point::new(start_x, start_y);
        let usable = [start_x, start_y, gap_below, gap_right]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0);
        if !usable {
            return start;
        }

        let local = Props::new(&self.note.style);
        let defaults = working.defaults("comment");
        let r = working.resolver(&self.note.style, "comment");
        let radius = r.positive("radius", 5.0).max(1.0);
        if gap_right > 0.0 && gap_right < radius + 1.0 {
            return start;
        }

        let mut style = working.text_style(local, defaults, &TextStyle::comment());
        style.font_size_px = r.get("fontSizePx", 14.0, at_least(6.0));
        style.spacing = r.get("spacing", 1.0, at_least(1.0));
        style.align = Align::Left;

        let line = LineStyle {
            colour: r.colour("lineColour", "rgb(0,0,0)"),
            width: r.non_negative("lineWidth", 1.0),
            dash: r.dash("lineDash", &[4.0, 2.0]),
        };

        let lines = self.note.text.lines();
        let block = working.measure(&*surface, &style, &lines);
        let (w, h) = (block.width, block.height);
        let fold = r
            .get("foldSizePx", 10.0, at_least(1.0))
            .min(w / 4.0)
            .min(h / 4.0)
            .min(MAX_FOLD);

        let x = start_x + gap_right;
        let y = start_y;

        if !mimic {
            let (sx, sy) = (x + SHADOW_OFFSET, y + SHADOW_OFFSET);
            let shadow = Path::polygon(&[
                Point::new(sx, sy),
                Point::new(sx + w - fold, sy),
                Point::new(sx + w, sy + fold),
                Point::new(sx + w, sy + h),
                Point::new(sx, sy + h),
            ]);
            surface.fill_path(&shadow, SHADOW_COLOUR);

            let body = Path::polygon(&[
                Point::new(x, y),
                Point::new(x + w - fold, y),
                Point::new(x + w - fold, y + fold),
                Point::new(x + w, y + fold),
                Point::new(x + w, y + h),
                Point::new(x, y + h),
            ]);
            surface.fill_path(&body, &style.bg_colour);

            let outline = Path::new()
                .move_to(x, y)
                .line_to(x + w - fold, y)
                .line_to(x + w - fold, y + fold)
                .line_to(x + w, y + fold)
                .move_to(x + w - fold, y)
                .line_to(x + w, y + fold)
                .line_to(x + w, y + h)
                .line_to(x, y + h)
                .line_to(x, y);
            let border = Stroke::dashed(style.border_colour.clone(), style.border_width, &style.border_dash);
            if border.width > 0.0 {
                surface.stroke_path(&outline, &border);
            }
        }
        working.track(x + w + SHADOW_OFFSET, y + h + SHADOW_OFFSET);

        TextBox::new(&lines, &style, y, x)
            .plain()
            .measured(&block)
            .draw(working, surface, mimic);

        let bottom = y + h + gap_below;
        if !mimic && gap_right > 0.0 && gap_below > 0.0 {
            let mid = y + h / 2.0;
            let connector = Path::new()
                .move_to(x, mid)
                .line_to(start_x + radius, mid)
                .arc_to(start_x, mid, start_x, mid + radius, radius)
                .line_to(start_x, bottom);
            surface.stroke_path(&connector, &line.stroke());
        }
        working.track(x + w, bottom)
    }
}
