use crate::parser::ConditionLine;
use crate::renderer::DrawSurface;
use crate::style::{Props, TextStyle};

use super::super::actor::{draw_timelines, timeline_extent};
use super::super::shapes::{draw_active_fragments, draw_line, LineStyle, TextBox};
use super::super::types::Point;
use super::super::working::Working;
use super::{Comment, Element};

const TRANSPARENT: &str = "rgba(0,0,0,0)";

/// Dashed divider across the innermost open fragment, e.g. an `else` branch
#[derive(Debug, Clone, Copy)]
pub struct Condition<'l> {
    line: &'l ConditionLine,
}

impl<'l> Condition<'l> {
    pub fn new(line: &'l ConditionLine) -> Self {
        Self { line }
    }

    /// First line of the condition text
    fn text(&self) -> Vec<String> {
        let first = self
            .line
            .condition
            .as_ref()
            .and_then(|c| c.text.lines().into_iter().next())
            .unwrap_or_default();
        vec![first]
    }
}

impl Element for Condition<'_> {
    fn draw(
        &self,
        working: &mut Working,
        surface: &mut dyn DrawSurface,
        start_y: f64,
        mimic: bool,
    ) -> Option<Point> {
        let gs = working.global_spacing;
        let Some(fragment) = working.active_fragments.last() else {
            return Some(draw_timelines(working, surface, start_y, gs, None, mimic));
        };
        let (start_x, end_x) = (fragment.start_x, fragment.end_x);

        let line = self.line;
        let r = working.resolver(&line.style, "fragment");
        let stroke = LineStyle {
            colour: r.colour("lineColour", "rgb(0,0,0)"),
            width: r.non_negative("lineWidth", 1.0),
            dash: r.dash("lineDash", &[4.0, 3.0]),
        };

        let local = match &line.condition {
            Some(condition) if !condition.style.is_empty() => Props::new(&condition.style),
            _ => Props::new(&line.style),
        };
        let defaults = working.defaults("fragment").section("condition");
        let style = working
            .text_style(local, defaults, &TextStyle::fragment_condition())
            .with_background(TRANSPARENT);
        let text = self.text();

        let comment = line.comment.as_ref().map(Comment::new);
        let cond_y = match &comment {
            Some(c) => c.draw(working, surface, start_x + gs, start_y + gs, gs, gs, true).y,
            None => start_y + gs,
        };
        let label = TextBox::new(&text, &style, cond_y + stroke.width, start_x).plain();
        let text_end = label.draw(working, surface, true);
        let height = timeline_extent(working, start_y, text_end.y - start_y) - start_y;

        draw_active_fragments(working, surface, start_y, height, mimic);
        draw_timelines(working, surface, start_y, height, None, mimic);
        if let Some(c) = &comment {
            c.draw(working, surface, start_x + gs, start_y + gs, gs, gs, mimic);
        }
        draw_line(
            surface,
            Point::new(start_x, cond_y),
            Point::new(end_x, cond_y),
            &stroke,
            mimic,
        );
        let text_end = label.draw(working, surface, mimic);
        working.track_point(text_end);

        Some(working.track(0.0, start_y + height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::actor::draw_actors;
    use crate::layout::config::LayoutConfig;
    use crate::layout::working::ActiveFragment;
    use crate::parser::Document;
    use crate::renderer::path::num;
    use crate::renderer::RecordingSurface;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn document() -> Document {
        serde_json::from_value(json!({"actors": [{"name": "A", "alias": "a"}]})).unwrap()
    }

    fn condition(value: serde_json::Value) -> ConditionLine {
        serde_json::from_value(value).unwrap()
    }

    fn open_fragment(working: &mut Working) {
        working.active_fragments.push(ActiveFragment {
            start_x: 30.0,
            end_x: 470.0,
            colour: "rgb(240,240,240)".to_string(),
            border_colour: "rgb(0,0,0)".to_string(),
            border_width: 1.0,
            border_dash: Vec::new(),
        });
    }

    #[test]
    fn test_without_fragment_only_timelines() {
        let doc = document();
        let mut working = Working::new(&doc, &LayoutConfig::default(), (500.0, 500.0), 0.0, false);
        let mut surface = RecordingSurface::new(500.0, 500.0);
        let y = draw_actors(&mut working, &mut surface, 30.0).unwrap().y;
        let line = condition(json!({"condition": "else"}));
        let end = Condition::new(&line).draw(&mut working, &mut surface, y, false).unwrap();
        // 30 is a whole number of [3,3] periods
        assert_eq!(end.y, y + 30.0);
        assert!(!surface.texts().contains(&"else"));
    }

    #[test]
    fn test_divider_spans_fragment() {
        let doc = document();
        let mut working = Working::new(&doc, &LayoutConfig::default(), (500.0, 500.0), 0.0, false);
        let mut surface = RecordingSurface::new(500.0, 500.0);
        let y = draw_actors(&mut working, &mut surface, 30.0).unwrap().y;
        open_fragment(&mut working);
        let line = condition(json!({"condition": ["else", "ignored"]}));
        Condition::new(&line).draw(&mut working, &mut surface, y, false).unwrap();

        assert!(surface.texts().contains(&"else"));
        assert!(!surface.texts().contains(&"ignored"));
        let divider_y = y + working.global_spacing;
        let dashed: Vec<String> = surface
            .strokes_with("rgb(0,0,0)")
            .into_iter()
            .filter(|(_, stroke)| stroke.dash == vec![4.0, 3.0])
            .map(|(path, _)| path.to_svg_d())
            .collect();
        let y = num(divider_y);
        assert_eq!(dashed, vec![format!("M30 {y} L470 {y}")]);
    }

    #[test]
    fn test_mimic_matches_commit() {
        let doc = document();
        let mut working = Working::new(&doc, &LayoutConfig::default(), (500.0, 500.0), 0.0, false);
        let mut surface = RecordingSurface::new(500.0, 500.0);
        let y = draw_actors(&mut working, &mut surface, 30.0).unwrap().y;
        open_fragment(&mut working);
        let line = condition(json!({"condition": {"text": "x > 1", "fontSizePx": 20}, "comment": "c"}));
        let element = Condition::new(&line);
        let drawn = surface.ops().len();
        let mimic = element.draw(&mut working, &mut surface, y, true);
        assert_eq!(surface.ops().len(), drawn);
        let commit = element.draw(&mut working, &mut surface, y, false);
        assert_eq!(mimic, commit);
    }
}
