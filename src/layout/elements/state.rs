use crate::parser::StateLine;
use crate::renderer::DrawSurface;
use crate::style::{Props, TextStyle};

use super::super::actor::{draw_timelines, timeline_extent};
use super::super::shapes::{draw_active_fragments, TextBox};
use super::super::types::Point;
use super::super::working::Working;
use super::{Comment, Element};

/// Rounded box centred on an actor's lane
#[derive(Debug, Clone, Copy)]
pub struct State<'l> {
    line: &'l StateLine,
}

impl<'l> State<'l> {
    pub fn new(line: &'l StateLine) -> Self {
        Self { line }
    }
}

impl Element for State<'_> {
    fn draw(
        &self,
        working: &mut Working,
        surface: &mut dyn DrawSurface,
        start_y: f64,
        mimic: bool,
    ) -> Option<Point> {
        let line = self.line;
        let defaults = working.defaults("state");
        let style = working.text_style(Props::new(&line.style), defaults, &TextStyle::state());
        let radius = working.resolver(&line.style, "state").non_negative("radius", 5.0);
        let gs = working.global_spacing;

        let lines = line.text.as_ref().map(|t| t.lines()).unwrap_or_default();
        let block = working.measure(&*surface, &style, &lines);

        let middle = match line.actor.as_deref().and_then(|alias| working.actors.index_of(alias)) {
            Some(index) => working.actors.lane(index).middle,
            None => working.max_width() / 2.0,
        };
        if !middle.is_finite() || middle < 0.0 {
            return None;
        }
        let left = middle - block.width / 2.0;

        let comment = line.comment.as_ref().map(Comment::new);
        let top = match &comment {
            Some(c) => c.draw(working, surface, left + gs, start_y + gs, gs, gs, true).y,
            None => start_y + gs,
        };
        working.note_left_edge(left);

        let state_box = TextBox::new(&lines, &style, top, left)
            .radius(radius)
            .measured(&block);
        let bottom = state_box.draw(working, surface, true).y;
        let height = timeline_extent(working, start_y, bottom - start_y + 1.0) - start_y;

        draw_active_fragments(working, surface, start_y, height, mimic);
        draw_timelines(working, surface, start_y, height, None, mimic);
        if let Some(c) = &comment {
            c.draw(working, surface, left + gs, start_y + gs, gs, gs, mimic);
        }
        let end = state_box.draw(working, surface, mimic);
        Some(working.track(end.x, start_y + height))
    }
}
