use crate::parser::{ArrowStyle, CallLine};
use crate::renderer::{DrawSurface, Path};
use crate::style::{all_numeric, Props, TextStyle};

use super::super::actor::{draw_timelines, lookup, timeline_extent, FlowBreak};
use super::super::shapes::{draw_active_fragments, draw_arrowhead, draw_line, LineStyle, TextBox};
use super::super::types::Point;
use super::super::working::Working;
use super::{hanging_label, inline_label, Comment, Element, Span};

/// Message from one actor to another, or to itself
#[derive(Debug, Clone, Copy)]
pub struct Call<'l> {
    line: &'l CallLine,
    number: u32,
}

impl<'l> Call<'l> {
    pub fn new(line: &'l CallLine, working: &mut Working) -> Self {
        Self {
            line,
            number: working.next_call_number(),
        }
    }

    fn head(&self) -> ArrowStyle {
        if self.line.asynchronous {
            ArrowStyle::Open
        } else {
            ArrowStyle::Fill
        }
    }

    fn line_style(&self, working: &Working, dashed: bool) -> (LineStyle, f64) {
        let r = working.resolver(&self.line.style, "call");
        let dash = if dashed {
            self.line
                .style
                .get("lineDash")
                .and_then(all_numeric)
                .unwrap_or_default()
        } else {
            Vec::new()
        };
        let style = LineStyle {
            colour: r.colour("lineColour", "rgb(0,0,0)"),
            width: r.positive("lineWidth", 1.0),
            dash,
        };
        (style, r.positive("arrowSize", 5.0))
    }

    fn draw_self(
        &self,
        working: &mut Working,
        surface: &mut dyn DrawSurface,
        lane: usize,
        start_y: f64,
        mimic: bool,
    ) -> Point {
        let line = self.line;
        let gs = working.global_spacing;
        let defaults = working.defaults("call");
        let style = working.text_style(Props::new(&line.style), defaults, &TextStyle::self_call());
        let (stroke, arrow) = self.line_style(working, true);
        let radius = working.resolver(&line.style, "call").non_negative("radius", 5.0);

        let actor = working.actors.lane(lane);
        let x = actor.middle + actor.flow_width / 2.0;

        let comment = line.comment.as_ref().map(Comment::new);
        let call_y = match &comment {
            Some(c) => c.draw(working, surface, x + gs, start_y + gs, gs, gs, true).y,
            None => start_y + gs,
        };
        let min = call_y + 2.0 * stroke.width + gs + arrow - start_y;
        let height = timeline_extent(working, start_y, min) - start_y;

        draw_active_fragments(working, surface, start_y, height, mimic);
        let end = if line.break_from_flow || line.break_flow || line.break_to_flow {
            Some(call_y + gs + arrow)
        } else {
            None
        };
        working.actors.set_flow(lane, Some(call_y), end);
        let flow_break = line.asynchronous.then(|| FlowBreak {
            lane,
            at: call_y + gs / 2.0,
            gap: gs / 2.0,
        });
        draw_timelines(working, surface, start_y, height, flow_break, mimic);

        if let Some(c) = &comment {
            c.draw(working, surface, x + gs, start_y + gs, gs, gs, mimic);
        }

        let far = x + 2.0 * gs;
        if !mimic {
            let lasso = Path::new()
                .move_to(x, call_y)
                .line_to(far - radius, call_y)
                .arc_to(far, call_y, far, call_y + radius, radius)
                .line_to(far, call_y + gs - radius)
                .arc_to(far, call_y + gs, far - radius, call_y + gs, radius)
                .line_to(x, call_y + gs);
            surface.stroke_path(&lasso, &stroke.stroke());
        }
        draw_arrowhead(surface, Point::new(x, call_y + gs), -1.0, arrow, self.head(), &stroke, mimic);

        let label = inline_label(self.number, line.text.as_ref());
        let text_end = TextBox::new(&label, &style, call_y, far)
            .plain()
            .draw(working, surface, mimic);
        working.track_point(text_end);
        working.track(0.0, start_y + height)
    }

    fn draw_across(
        &self,
        working: &mut Working,
        surface: &mut dyn DrawSurface,
        from: usize,
        to: usize,
        start_y: f64,
        mimic: bool,
    ) -> Point {
        let line = self.line;
        let gs = working.global_spacing;
        let defaults = working.defaults("call");
        let style = working.text_style(Props::new(&line.style), defaults, &TextStyle::call());
        let (stroke, arrow) = self.line_style(working, false);

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
        let text_y = call_y - text_h;
        let height = timeline_extent(working, start_y, call_y + arrow - start_y + gs / 3.0) - start_y;

        draw_active_fragments(working, surface, start_y, height, mimic);
        let close = call_y + gs / 3.0;
        working
            .actors
            .set_flow(from, Some(call_y), line.break_from_flow.then_some(close));
        working
            .actors
            .set_flow(to, Some(call_y), line.break_to_flow.then_some(close));
        draw_timelines(working, surface, start_y, height, None, mimic);

        if let Some(c) = &comment {
            c.draw(working, surface, anchor_x + gs, start_y + gs, text_h, gs, mimic);
        }

        let gap_to_text = if comment.is_some() { 2.0 * gs } else { gs };
        let text_end = TextBox::new(&label, &style, text_y, anchor_x + gap_to_text)
            .plain()
            .measured(&block)
            .draw(working, surface, mimic);
        working.track_point(text_end);

        let tip = Point::new(span.end, call_y);
        draw_line(surface, Point::new(span.start, call_y), tip, &stroke, mimic);
        draw_arrowhead(surface, tip, span.direction, arrow, self.head(), &stroke, mimic);
        working.track(0.0, start_y + height)
    }
}

impl Element for Call<'_> {
    fn draw(
        &self,
        working: &mut Working,
        surface: &mut dyn DrawSurface,
        start_y: f64,
        mimic: bool,
    ) -> Option<Point> {
        let from = lookup(working, &self.line.from)?;
        let to = lookup(working, &self.line.to)?;
        Some(if from == to {
            self.draw_self(working, surface, from, start_y, mimic)
        } else {
            self.draw_across(working, surface, from, to, start_y, mimic)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::actor::draw_actors;
    use crate::layout::config::LayoutConfig;
    use crate::parser::{Document, Line};
    use crate::renderer::path::num;
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

    fn call_of(doc: &Document) -> &CallLine {
        match &doc.lines[0].line {
            Line::Call(line) => line,
            other => panic!("expected a call, got {other:?}"),
        }
    }

    fn setup<'d>(doc: &'d Document, surface: &mut RecordingSurface) -> (Working<'d>, f64) {
        let mut working = Working::new(doc, &LayoutConfig::default(), (1000.0, 1000.0), 0.0, false);
        let y = draw_actors(&mut working, surface, 30.0).unwrap().y;
        (working, y)
    }

    #[test]
    fn test_rightward_call_is_numbered() {
        let doc = document(json!({"type": "call", "from": "a", "to": "b", "text": "ping"}));
        let mut surface = RecordingSurface::new(1000.0, 1000.0);
        let (mut working, y) = setup(&doc, &mut surface);
        let call = Call::new(call_of(&doc), &mut working);
        let end = call.draw(&mut working, &mut surface, y, false).unwrap();
        assert!(end.y > y);
        assert!(surface.texts().contains(&"1. ping"));

        let b = working.actors.get("b").unwrap();
        let tip = b.middle - b.flow_width / 2.0;
        let heads = surface.fills_with("rgb(0,0,0)");
        assert!(heads.iter().any(|p| p.to_svg_d().starts_with(&format!("M{} ", num(tip)))));
    }

    #[test]
    fn test_comparison_in_label_is_drawn_whole() {
        let doc = document(json!({"type": "call", "from": "a", "to": "b", "text": "if x < y then retry"}));
        let mut surface = RecordingSurface::new(1000.0, 1000.0);
        let (mut working, y) = setup(&doc, &mut surface);
        let call = Call::new(call_of(&doc), &mut working);
        call.draw(&mut working, &mut surface, y, false).unwrap();
        assert!(surface.texts().join("").contains("1. if x < y then retry"));
    }

    #[test]
    fn test_unknown_actor_draws_nothing() {
        let doc = document(json!({"type": "call", "from": "a", "to": "zzz", "text": "x"}));
        let mut surface = RecordingSurface::new(1000.0, 1000.0);
        let (mut working, y) = setup(&doc, &mut surface);
        let drawn = surface.ops().len();
        let call = Call::new(call_of(&doc), &mut working);
        assert_eq!(call.draw(&mut working, &mut surface, y, false), None);
        assert_eq!(surface.ops().len(), drawn);
    }

    #[test]
    fn test_call_opens_both_bars() {
        let doc = document(json!({"type": "call", "from": "a", "to": "b", "text": "go"}));
        let mut surface = RecordingSurface::new(1000.0, 1000.0);
        let (mut working, y) = setup(&doc, &mut surface);
        let call = Call::new(call_of(&doc), &mut working);
        call.draw(&mut working, &mut surface, y, false);
        assert!(working.actors.lanes().iter().all(|lane| lane.continuing));
    }

    #[test]
    fn test_break_from_flow_closes_bar() {
        let doc = document(json!({
            "type": "call", "from": "a", "to": "b", "text": "go", "breakFromFlow": true
        }));
        let mut surface = RecordingSurface::new(1000.0, 1000.0);
        let (mut working, y) = setup(&doc, &mut surface);
        let call = Call::new(call_of(&doc), &mut working);
        call.draw(&mut working, &mut surface, y, false);
        assert!(!working.actors.get("a").unwrap().continuing);
        assert!(working.actors.get("b").unwrap().continuing);
    }

    #[test]
    fn test_self_call_label_and_lasso() {
        let doc = document(json!({
            "type": "call", "from": "a", "to": "a", "text": ["think", "hard"], "async": true
        }));
        let mut surface = RecordingSurface::new(1000.0, 1000.0);
        let (mut working, y) = setup(&doc, &mut surface);
        let call = Call::new(call_of(&doc), &mut working);
        let end = call.draw(&mut working, &mut surface, y, false).unwrap();
        assert!(end.y >= y + 2.0 * working.global_spacing);
        let texts = surface.texts();
        assert!(texts.contains(&"1. think"));
        assert!(texts.contains(&"hard"));
    }

    #[test]
    fn test_mimic_matches_commit() {
        for line in [
            json!({"type": "call", "from": "b", "to": "a", "text": ["x", "y"], "comment": "c"}),
            json!({"type": "call", "from": "a", "to": "a", "text": "self", "comment": "c"}),
        ] {
            let doc = document(line);
            let mut surface = RecordingSurface::new(1000.0, 1000.0);
            let (mut working, y) = setup(&doc, &mut surface);
            let drawn = surface.ops().len();
            let call = Call::new(call_of(&doc), &mut working);
            let mimic = call.draw(&mut working, &mut surface, y, true);
            assert_eq!(surface.ops().len(), drawn);
            let commit = call.draw(&mut working, &mut surface, y, false);
            assert_eq!(mimic, commit);
        }
    }
}
