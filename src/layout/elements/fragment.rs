use serde_json::Value;

use crate::parser::{BlankLine, FragmentLine, StyledText};
use crate::renderer::{DrawSurface, Path, Stroke};
use crate::style::{colour, Props, Resolver, TextStyle};

use super::super::actor::{draw_timelines, timeline_extent};
use super::super::shapes::{draw_active_fragments, draw_rectangle, BoxStyle, TextBox};
use super::super::types::{Borders, Point, Rect};
use super::super::working::{ActiveFragment, Working};
use super::{draw_debug_line, draw_lines, Blank, Comment, Element};

const TRANSPARENT: &str = "rgba(0,0,0,0)";
const MAX_TAB_OFFSET: f64 = 10.0;

/// Combined fragment (`alt`, `loop`, `opt`...) around a nested list of lines
///
/// Opens with a banner holding the folded title tab and the condition,
/// draws its children with one more entry on the active-fragment stack so
/// every child paints this fragment's side bands, then closes with an end
/// cap.
#[derive(Debug, Clone, Copy)]
pub struct Fragment<'l> {
    line: &'l FragmentLine,
}

/// Style of the text parts: their own overrides when given as objects,
/// otherwise the fragment line's
fn text_props<'a>(part: Option<&'a StyledText>, line: &'a FragmentLine) -> Props<'a> {
    match part {
        Some(text) if !text.style.is_empty() => Props::new(&text.style),
        _ => Props::new(&line.style),
    }
}

impl<'l> Fragment<'l> {
    pub fn new(line: &'l FragmentLine) -> Self {
        Self { line }
    }

    /// `"type title"` followed by any further title lines
    fn title(&self) -> Vec<String> {
        let kind = self.line.fragment_type.as_deref().unwrap_or("");
        let mut lines = self
            .line
            .title
            .as_ref()
            .map(|t| t.text.lines())
            .unwrap_or_default();
        match lines.first_mut() {
            Some(first) => *first = format!("{kind} {first}"),
            None => lines.push(format!("{kind} ")),
        }
        lines
    }

    fn condition(&self) -> Vec<String> {
        match &self.line.condition {
            Some(condition) => condition.text.lines(),
            None => vec![String::new()],
        }
    }

    /// Band painted behind every child line
    fn band(&self, working: &Working, depth: usize) -> ActiveFragment {
        let defaults = working.defaults("fragment");
        let r = Resolver::new(Props::new(&self.line.style), defaults);
        let colour = Props::new(&self.line.style)
            .get("bgColour")
            .and_then(colour)
            .or_else(|| {
                defaults
                    .get("bgColours")
                    .and_then(Value::as_array)
                    .and_then(|colours| colours.get(depth))
                    .and_then(colour)
            })
            .unwrap_or_else(|| "rgb(255,255,255)".to_string());

        let start_x = working.window_padding + depth as f64 * working.fragment_spacing;
        ActiveFragment {
            start_x,
            end_x: working.canvas_width - start_x,
            colour,
            border_colour: r.colour("borderColour", "rgb(0,0,0)"),
            border_width: r.non_negative("borderWidth", 1.0),
            border_dash: r.dash("borderDash", &[]),
        }
    }
}

impl Element for Fragment<'_> {
    fn draw(
        &self,
        working: &mut Working,
        surface: &mut dyn DrawSurface,
        start_y: f64,
        mimic: bool,
    ) -> Option<Point> {
        let line = self.line;
        let gs = working.global_spacing;
        let band = self.band(working, working.depth());
        let width = if band.end_x - band.start_x > 0.0 {
            band.end_x - band.start_x
        } else {
            gs
        };
        let box_style = BoxStyle {
            fill: band.colour.clone(),
            stroke: Stroke::dashed(band.border_colour.clone(), band.border_width, &band.border_dash),
        };

        let title_defaults = working.defaults("fragment").section("title");
        let title_local = line.title.as_ref().map(|t| Props::new(&t.style)).unwrap_or_default();
        let title_r = Resolver::new(title_local, title_defaults);
        let tab_colour = title_r.colour("bgColour", "rgba(200,200,0,0.8)");
        let title_style = working
            .text_style(text_props(line.title.as_ref(), line), title_defaults, &TextStyle::fragment_title())
            .with_foreground(&title_r.colour("fgColour", "rgb(0,0,0)"))
            .with_background(TRANSPARENT);
        let condition_defaults = working.defaults("fragment").section("condition");
        let condition_style = working
            .text_style(
                text_props(line.condition.as_ref(), line),
                condition_defaults,
                &TextStyle::fragment_condition(),
            )
            .with_background(TRANSPARENT);
        let (title, condition) = (self.title(), self.condition());

        let comment = line.comment.as_ref().map(Comment::new);
        let anchor = band.start_x + gs;
        let gap_right = 1.5 * gs;
        let top = match &comment {
            Some(c) => c.draw(working, surface, anchor, start_y + gs, gs, gap_right, true).y,
            None => start_y + gs,
        };
        let title_box = TextBox::new(&title, &title_style, top, band.start_x).plain();
        let title_end = title_box.draw(working, surface, true);
        let condition_box = TextBox::new(&condition, &condition_style, title_end.y, band.start_x).plain();
        let condition_end = condition_box.draw(working, surface, true);
        let height = timeline_extent(working, start_y, condition_end.y - start_y) - start_y;

        draw_active_fragments(working, surface, start_y, height, mimic);
        let banner = Rect::new(band.start_x, top, width, height - (top - start_y));
        draw_rectangle(surface, &box_style, banner, 0.0, Borders::ALL.without_bottom(), mimic);
        let y = draw_timelines(working, surface, start_y, height, None, mimic).y;

        if !mimic {
            let offset = ((title_end.y - top) / 2.0).clamp(0.0, MAX_TAB_OFFSET);
            let tab = Path::polygon(&[
                Point::new(band.start_x, top),
                Point::new(band.start_x, title_end.y),
                title_end,
                Point::new(title_end.x + offset, title_end.y - offset),
                Point::new(title_end.x + offset, top),
            ]);
            surface.fill_path(&tab, &tab_colour);
            if band.border_width > 0.0 {
                surface.stroke_path(&tab, &box_style.stroke);
            }
        }
        title_box.draw(working, surface, mimic);
        condition_box.draw(working, surface, mimic);
        if let Some(c) = &comment {
            c.draw(working, surface, anchor, start_y + gs, gs, gap_right, mimic);
        }

        let start_x = band.start_x;
        working.active_fragments.push(band);
        let end = draw_lines(working, surface, y, &line.lines, mimic);
        let filler = BlankLine {
            width: Some(Value::from(title_end.x.max(condition_end.x))),
            height: Some(Value::from(0)),
            ..BlankLine::default()
        };
        let end = Blank::new(&filler)
            .draw(working, surface, end.y, mimic)
            .unwrap_or(end);
        working.active_fragments.pop();

        let end_top = end.y;
        if working.debug && !mimic {
            draw_debug_line(working, surface, end_top, &end_top.to_string());
        }
        let end_height = timeline_extent(working, end_top, 2.0 * gs) - end_top;
        draw_active_fragments(working, surface, end_top, end_height, mimic);
        let cap = Rect::new(start_x, end_top, width, end_height - gs);
        draw_rectangle(surface, &box_style, cap, 0.0, Borders::ALL.without_top(), mimic);
        let y = draw_timelines(working, surface, end_top, end_height, None, mimic).y;

        Some(working.track(0.0, y))
    }
}
