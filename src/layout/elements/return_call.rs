use crate::parser::ReturnLine;
use crate::renderer::DrawSurface;
use crate::style::{Props, TextStyle};

use super::super::actor::{draw_timelines, lookup, timeline_extent};
use super::super::shapes::{draw_active_fragments, draw_arrowhead, draw_line, LineStyle, TextBox};
use super::super::types::Point;
use super::super::working::Working;
use super::{hanging_label, Comment, Element, Span};

/// Dashed answer travelling back to the caller
#[derive(Debug, Clone, Copy)]
pub struct Return<'l> {
    line: &'l ReturnLine,
    number: u32,
}

impl<'l> Return<'l> {
    pub fn new(line: &'l ReturnLine, working: &mut Working) -> Self {
        Self {
            line,
            number: working.next_call_number(),
        }
    }
}

impl Element for Return<'_> {
    fn draw(
        &self,
        working: &mut Working,
        surface: &mut dyn DrawSurface,
        start_y: f64,
        mimic: bool,
    ) -> Option<Point> {
        let line = self.line;
        let from = lookup(working, &line.from)?;
        let to = lookup(working, &line.to)?;
        if from == to {
            return None;
        }

        let gs = working.global_spacing;
        let r = working.resolver(&line.style, "return");
        let stroke = LineStyle {
            colour: r.colour("lineColour", "rgb(0,0,0)"),
            width: r.positive("lineWidth", 1.0),
            dash: r.dash("lineDash", &[6.0, 3.0]),
        };
        let arrow = r.positive("arrowSize", 5.0);
        let defaults = working.defaults("return");
        let style = working.text_style(Props::new(&line.style), defaults, &TextStyle::return_call());

        let label = hanging_label(self.number, line.text.as_ref());
        let block = working.measure(&*surface, &style, &label);
        let text_h = block.height;
        let span = Span::between(working, from, to);
        let anchor_x = span.anchor(arrow);

        let comment = line.comment.as_ref().map(Comment::new);
        let call_y = match &comment {
            Some(c) => c.draw(working, surface, anchor_x + gs, start_y + gs, text_h, gs, true).y,
            None => start_y + text_h + gs,
        };
        let height = timeline_extent(working, start_y, call_y + arrow - start_y + 1.0) - start_y;

        draw_active_fragments(working, surface, start_y, height, mimic);
        let (open, close) = (call_y - arrow, call_y + arrow);
        working
            .actors
            .set_flow(from, Some(open), (!line.continue_from_flow).then_some(close));
        working
            .actors
            .set_flow(to, Some(open), line.break_to_flow.then_some(close));
        draw_timelines(working, surface, start_y, height, None, mimic);

        if let Some(c) = &comment {
            c.draw(working, surface, anchor_x + gs, start_y + gs, text_h, gs, mimic);
        }

        let gap_to_text = if comment.is_some() { 2.0 * gs } else { gs };
        let text_end = TextBox::new(&label, &style, call_y - text_h, anchor_x + gap_to_text)
            .plain()
            .measured(&block)
            .draw(working, surface, mimic);
        working.track_point(text_end);

        let (tail, tip) = (Point::new(span.start, call_y), Point::new(span.end, call_y));
        draw_line(surface, tail, tip, &stroke, mimic);
        draw_arrowhead(surface, tip, span.direction, arrow, line.arrow, &stroke, mimic);
        if line.reverse_from_arrow {
            draw_arrowhead(surface, tail, -span.direction, arrow, line.arrow, &stroke, mimic);
        }
        Some(working.track(0.0, start_y + height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::actor::draw_actors;
    use crate::layout::config::LayoutConfig;
    use crate::parser::{Document, Line};
    use crate::renderer::RecordingSurface;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn document(line: serde_json::Value) -> Document {
        serde_json::from_value(json!({
            "actors": [{"name": "A", "alias": "a"}, {"name": "B", "alias": "b"}],
            "lines": [line]
        }))
        .unwrap()
    }

    fn return_of(doc: &Document) -> &ReturnLine {
        match &doc.lines[0].line {
            Line::Return(line) => line,
            other => panic!("expected a return, got {other:?}"),
        }
    }

    fn setup<'d>(doc: &'d Document, surface: &mut RecordingSurface) -> (Working<'d>, f64) {
        let mut working = Working::new(doc, &LayoutConfig::default(), (1000.0, 1000.0), 0.0, false);
        let y = draw_actors(&mut working, surface, 30.0).unwrap().y;
        (working, y)
    }

    #[test]
    fn test_return_is_dashed() {
        let doc = document(json!({"type": "return", "from": "b", "to": "a", "text": "pong"}));
        let mut surface = RecordingSurface::new(1000.0, 1000.0);
        let (mut working, y) = setup(&doc, &mut surface);
        let element = Return::new(return_of(&doc), &mut working);
        element.draw(&mut working, &mut surface, y, false).unwrap();
        assert!(surface.texts().contains(&"1. pong"));
        let strokes = surface.strokes_with("rgb(0,0,0)");
        assert!(strokes.iter().any(|(_, stroke)| stroke.dash == vec![6.0, 3.0]));
    }

    #[test]
    fn test_same_actor_return_draws_nothing() {
        let doc = document(json!({"type": "return", "from": "a", "to": "a", "text": "x"}));
        let mut surface = RecordingSurface::new(1000.0, 1000.0);
        let (mut working, y) = setup(&doc, &mut surface);
        let element = Return::new(return_of(&doc), &mut working);
        assert_eq!(element.draw(&mut working, &mut surface, y, false), None);
    }

    #[test]
    fn test_flow_flags() {
        let doc = document(json!({
            "type": "return", "from": "b", "to": "a", "text": "x",
            "continueFromFlow": true, "breakToFlow": true
        }));
        let mut surface = RecordingSurface::new(1000.0, 1000.0);
        let (mut working, y) = setup(&doc, &mut surface);
        let element = Return::new(return_of(&doc), &mut working);
        element.draw(&mut working, &mut surface, y, false);
        assert!(working.actors.get("b").unwrap().continuing);
        assert!(!working.actors.get("a").unwrap().continuing);
    }

    #[test]
    fn test_fill_arrow_with_reverse() {
        let doc = document(json!({
            "type": "return", "from": "a", "to": "b", "text": "x",
            "arrow": "fill", "reverseFromArrow": true
        }));
        let mut surface = RecordingSurface::new(1000.0, 1000.0);
        let (mut working, y) = setup(&doc, &mut surface);
        let element = Return::new(return_of(&doc), &mut working);
        element.draw(&mut working, &mut surface, y, false);
        assert_eq!(surface.fills_with("rgb(0,0,0)").len(), 2);
    }

    #[test]
    fn test_mimic_matches_commit() {
        let doc = document(json!({
            "type": "return", "from": "a", "to": "b", "text": ["x", "y"], "comment": "done"
        }));
        let mut surface = RecordingSurface::new(1000.0, 1000.0);
        let (mut working, y) = setup(&doc, &mut surface);
        let drawn = surface.ops().len();
        let element = Return::new(return_of(&doc), &mut working);
        let mimic = element.draw(&mut working, &mut surface, y, true);
        assert_eq!(surface.ops().len(), drawn);
        let commit = element.draw(&mut working, &mut surface, y, false);
        assert_eq!(mimic, commit);
    }
}
