use crate::parser::{ArrowStyle, ReferenceLine, Text};
use crate::renderer::DrawSurface;
use crate::style::{Props, TextStyle};

use super::super::actor::{draw_timelines, lookup, timeline_extent};
use super::super::shapes::{draw_active_fragments, draw_arrowhead, draw_line, LineStyle, TextBox};
use super::super::types::Point;
use super::super::working::Working;
use super::{hanging_label, Comment, Element};

const RETURN_DASH: [f64; 2] = [6.0, 3.0];

/// Call into a boxed reference to another diagram
///
/// With `to` and `returnText` the box also answers back to `to` with a
/// dashed, separately numbered return.
#[derive(Debug, Clone, Copy)]
pub struct Reference<'l> {
    line: &'l ReferenceLine,
    number: u32,
    return_number: Option<u32>,
}

impl<'l> Reference<'l> {
    pub fn new(line: &'l ReferenceLine, working: &mut Working) -> Self {
        let number = working.next_call_number();
        let return_number = (line.to.is_some() && line.return_text.is_some())
            .then(|| working.next_call_number());
        Self {
            line,
            number,
            return_number,
        }
    }
}

/// Label of a call from a lane into a box, and where that box starts
pub(super) struct BoxedCall {
    pub label: Vec<String>,
    pub style: TextStyle,
    pub start_x: f64,
    pub label_x: f64,
    pub label_h: f64,
    pub box_x: f64,
}

impl BoxedCall {
    /// Lay out the label right of `lane`; the box also clears `extra_widths`
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        working: &Working,
        surface: &dyn DrawSurface,
        lane: usize,
        label: Vec<String>,
        style: TextStyle,
        gap_to_text: f64,
        arrow: f64,
        extra_widths: &[f64],
    ) -> Self {
        let block = working.measure(surface, &style, &label);
        let actor = working.actors.lane(lane);
        let widest = extra_widths.iter().copied().fold(block.width, f64::max);
        Self {
            start_x: actor.bar_right(),
            label_x: actor.bar_right() + gap_to_text,
            label_h: block.height,
            box_x: actor.middle + gap_to_text + widest + 3.0 * arrow,
            label,
            style,
        }
    }

    /// Label, line and arrowhead at `y`
    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &self,
        working: &mut Working,
        surface: &mut dyn DrawSurface,
        y: f64,
        stroke: &LineStyle,
        arrow: f64,
        head: ArrowStyle,
        mimic: bool,
    ) {
        let end = TextBox::new(&self.label, &self.style, y - self.label_h, self.label_x)
            .plain()
            .draw(working, surface, mimic);
        working.track_point(end);

        let tip = Point::new(self.box_x, y);
        draw_line(surface, Point::new(self.start_x, y), tip, stroke, mimic);
        draw_arrowhead(surface, tip, 1.0, arrow, head, stroke, mimic);
    }
}

/// The box lines: a bold heading then the given text split on newlines
fn box_lines(heading: &str, text: Option<&Text>) -> Vec<String> {
    std::iter::once(heading.to_string())
        .chain(text.map(Text::split_lines).unwrap_or_default())
        .collect()
}

impl Element for Reference<'_> {
    fn draw(
        &self,
        working: &mut Working,
        surface: &mut dyn DrawSurface,
        start_y: f64,
        mimic: bool,
    ) -> Option<Point> {
        let line = self.line;
        let from = lookup(working, &line.from)?;
        let back = match (&line.to, self.return_number) {
            (Some(alias), Some(number)) => Some((lookup(working, alias)?, number)),
            _ => None,
        };

        let gs = working.global_spacing;
        let local = Props::new(&line.style);
        let r = working.resolver(&line.style, "reference");
        let dash = if line.dashed { RETURN_DASH.to_vec() } else { Vec::new() };
        let stroke = LineStyle {
            colour: r.colour("lineColour", "rgb(0,0,0)"),
            width: r.positive("lineWidth", 1.0),
            dash: r.dash("lineDash", &dash),
        };
        let arrow = r.positive("arrowSize", 5.0);
        let head = if line.asynchronous { ArrowStyle::Open } else { ArrowStyle::Fill };

        let label_style = working.text_style(local, working.defaults("call"), &TextStyle::return_call());
        let box_style = working.text_style(local, working.defaults("reference"), &TextStyle::reference_box());
        let gap_to_text = if line.comment.is_some() { 2.0 * gs } else { gs };

        let return_label = back.map(|(_, number)| hanging_label(number, line.return_text.as_ref()));
        let return_block = return_label
            .as_ref()
            .map(|label| working.measure(&*surface, &label_style, label));
        let extra: Vec<f64> = return_block.iter().map(|b| b.width).collect();

        let call = BoxedCall::new(
            working,
            &*surface,
            from,
            hanging_label(self.number, line.text.as_ref()),
            label_style.clone(),
            gap_to_text,
            arrow,
            &extra,
        );

        let lines = box_lines("<b>Ref:", Some(&line.reference));
        let ref_block = working.measure(&*surface, &box_style, &lines);
        let return_h = return_block.as_ref().map_or(0.0, |b| b.height);
        let box_h = ref_block.height + return_h;

        let comment = line.comment.as_ref().map(Comment::new);
        let anchor = call.start_x + gs;
        let top = match &comment {
            Some(c) => c.draw(working, surface, anchor, start_y + gs, call.label_h, gs, true).y,
            None => start_y + gs,
        };
        let call_y = top + ref_block.height / 2.0;
        let return_y = call_y + return_h;
        let height = timeline_extent(working, start_y, top + box_h - start_y + 1.0) - start_y;

        draw_active_fragments(working, surface, start_y, height, mimic);
        let from_end = line.break_from_flow.then_some(call_y + arrow);
        working.actors.set_flow(from, Some(call_y - arrow), from_end);
        if let Some((to, _)) = back {
            let to_end = line.break_to_flow.then_some(return_y + arrow);
            if to == from {
                working.actors.set_flow(to, Some(call_y - arrow), to_end);
            } else {
                working.actors.set_flow(to, Some(return_y - arrow), to_end);
            }
        }
        draw_timelines(working, surface, start_y, height, None, mimic);

        if let Some(c) = &comment {
            let below = call.label_h + ref_block.height / 2.0;
            c.draw(working, surface, anchor, start_y + gs, below, gs, mimic);
        }

        call.draw(working, surface, call_y, &stroke, arrow, head, mimic);
        let box_end = TextBox::new(&lines, &box_style, top, call.box_x)
            .size(None, Some(box_h))
            .measured(&ref_block)
            .draw(working, surface, mimic);
        working.track_point(box_end);

        if let (Some((to, _)), Some(label), Some(block)) = (back, &return_label, &return_block) {
            let lane = working.actors.lane(to);
            let (tail_x, tip_x, label_x, direction) = if lane.middle < call.box_x {
                (call.box_x, lane.bar_right(), lane.bar_right() + gs, -1.0)
            } else {
                (box_end.x, lane.bar_left(), box_end.x + gs, 1.0)
            };
            let back_stroke = LineStyle {
                dash: RETURN_DASH.to_vec(),
                ..stroke.clone()
            };
            let tip = Point::new(tip_x, return_y);
            draw_line(surface, Point::new(tail_x, return_y), tip, &back_stroke, mimic);
            draw_arrowhead(surface, tip, direction, arrow, ArrowStyle::Open, &back_stroke, mimic);
            let end = TextBox::new(label, &label_style, return_y - block.height, label_x)
                .plain()
                .measured(block)
                .draw(working, surface, mimic);
            working.track_point(end);
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

    fn reference_of(doc: &Document) -> &ReferenceLine {
        match &doc.lines[0].line {
            Line::Reference(line) => line,
            other => panic!("expected a reference, got {other:?}"),
        }
    }

    fn setup<'d>(doc: &'d Document, surface: &mut RecordingSurface) -> (Working<'d>, f64) {
        let mut working = Working::new(doc, &LayoutConfig::default(), (1000.0, 1000.0), 0.0, false);
        let y = draw_actors(&mut working, surface, 30.0).unwrap().y;
        (working, y)
    }

    #[test]
    fn test_box_lines_split_newlines() {
        let text = Text::Single("login\nflow".to_string());
        assert_eq!(box_lines("<b>Ref:", Some(&text)), vec!["<b>Ref:", "login", "flow"]);
    }

    #[test]
    fn test_reference_box() {
        let doc = document(json!({
            "type": "reference", "from": "a", "text": "see", "reference": "login\nflow"
        }));
        let mut surface = RecordingSurface::new(1000.0, 1000.0);
        let (mut working, y) = setup(&doc, &mut surface);
        let element = Reference::new(reference_of(&doc), &mut working);
        assert_eq!(working.call_count(), 1);
        element.draw(&mut working, &mut surface, y, false).unwrap();

        let texts = surface.texts();
        assert!(texts.contains(&"1. see"));
        assert!(texts.contains(&"Ref:"));
        assert!(texts.contains(&"flow"));
        assert_eq!(surface.fills_with("rgba(80,160,240,1)").len(), 1);
    }

    #[test]
    fn test_return_takes_second_number() {
        let doc = document(json!({
            "type": "reference", "from": "a", "to": "b", "text": "see",
            "returnText": "back", "reference": "sub"
        }));
        let mut surface = RecordingSurface::new(1000.0, 1000.0);
        let (mut working, y) = setup(&doc, &mut surface);
        let element = Reference::new(reference_of(&doc), &mut working);
        assert_eq!(working.call_count(), 2);
        element.draw(&mut working, &mut surface, y, false).unwrap();
        assert!(surface.texts().contains(&"2. back"));
        let dashed = surface
            .strokes_with("rgb(0,0,0)")
            .into_iter()
            .filter(|(_, s)| s.dash == RETURN_DASH.to_vec())
            .count();
        assert_eq!(dashed, 1);
    }

    #[test]
    fn test_missing_from_draws_nothing() {
        let doc = document(json!({"type": "reference", "from": "zzz", "reference": "sub"}));
        let mut surface = RecordingSurface::new(1000.0, 1000.0);
        let (mut working, y) = setup(&doc, &mut surface);
        let element = Reference::new(reference_of(&doc), &mut working);
        assert_eq!(element.draw(&mut working, &mut surface, y, false), None);
    }

    #[test]
    fn test_mimic_matches_commit() {
        let doc = document(json!({
            "type": "reference", "from": "b", "to": "a", "text": ["x", "y"],
            "returnText": "z", "reference": ["one", "two"], "comment": "c"
        }));
        let mut surface = RecordingSurface::new(1000.0, 1000.0);
        let (mut working, y) = setup(&doc, &mut surface);
        let drawn = surface.ops().len();
        let element = Reference::new(reference_of(&doc), &mut working);
        let mimic = element.draw(&mut working, &mut surface, y, true);
        assert_eq!(surface.ops().len(), drawn);
        let commit = element.draw(&mut working, &mut surface, y, false);
        assert_eq!(mimic, commit);
    }
}
