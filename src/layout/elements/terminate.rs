use crate::parser::{ArrowStyle, TerminateLine};
use crate::renderer::DrawSurface;
use crate::style::{Props, TextStyle};

use super::super::actor::{draw_timelines, lookup, timeline_extent};
use super::super::shapes::{draw_active_fragments, LineStyle, TextBox};
use super::super::types::Point;
use super::super::working::Working;
use super::reference::BoxedCall;
use super::{hanging_label, Comment, Element};

const TOMBSTONE_RADIUS: f64 = 7.0;
/// Arrow size used to place the box when no arrowhead is drawn
const PLACEMENT_ARROW: f64 = 5.0;

/// Call that ends the sender's activity, in a black box or a tombstone
#[derive(Debug, Clone, Copy)]
pub struct Terminate<'l> {
    line: &'l TerminateLine,
    number: u32,
}

impl<'l> Terminate<'l> {
    pub fn new(line: &'l TerminateLine, working: &mut Working) -> Self {
        Self {
            line,
            number: working.next_call_number(),
        }
    }
}

impl Element for Terminate<'_> {
    fn draw(
        &self,
        working: &mut Working,
        surface: &mut dyn DrawSurface,
        start_y: f64,
        mimic: bool,
    ) -> Option<Point> {
        let line = self.line;
        let from = lookup(working, &line.from)?;

        let gs = working.global_spacing;
        let local = Props::new(&line.style);
        let r = working.resolver(&line.style, "terminate");
        let dash: &[f64] = if line.dashed { &[6.0, 3.0] } else { &[] };
        let stroke = LineStyle {
            colour: r.colour("lineColour", "rgb(0,0,0)"),
            width: r.positive("lineWidth", 1.0),
            dash: r.dash("lineDash", dash),
        };
        let arrow = r.non_negative("arrowSize", 0.0);
        let placement = if arrow > 0.0 { arrow } else { PLACEMENT_ARROW };
        let head = if line.asynchronous { ArrowStyle::Open } else { ArrowStyle::Fill };

        let label_style = working.text_style(local, working.defaults("call"), &TextStyle::return_call());
        let box_style = working.text_style(local, working.defaults("terminate"), &TextStyle::terminate_box());
        let gap_to_text = if line.comment.is_some() { 2.0 * gs } else { gs };
        let call = BoxedCall::new(
            working,
            &*surface,
            from,
            hanging_label(self.number, line.text.as_ref()),
            label_style,
            gap_to_text,
            placement,
            &[],
        );

        let lines: Option<Vec<String>> = line.terminatetxt.as_ref().map(|text| {
            std::iter::once(String::new())
                .chain(text.split_lines())
                .collect()
        });
        let box_h = match &lines {
            Some(lines) => working.measure(&*surface, &box_style, lines).height,
            None => 2.0 * TOMBSTONE_RADIUS,
        };

        let comment = line.comment.as_ref().map(Comment::new);
        let anchor = call.start_x + gs;
        let top = match &comment {
            Some(c) => c.draw(working, surface, anchor, start_y + gs, call.label_h, gs, true).y,
            None => start_y + gs,
        };
        let call_y = top + box_h / 2.0;
        let height = timeline_extent(working, start_y, top + box_h - start_y + 1.0) - start_y;

        draw_active_fragments(working, surface, start_y, height, mimic);
        let from_end = line.break_from_flow.then_some(call_y + placement);
        working.actors.set_flow(from, Some(call_y - placement), from_end);
        draw_timelines(working, surface, start_y, height, None, mimic);

        if let Some(c) = &comment {
            c.draw(working, surface, anchor, start_y + gs, call.label_h, gs, mimic);
        }

        call.draw(working, surface, call_y, &stroke, arrow, head, mimic);
        match &lines {
            Some(lines) => {
                let end = TextBox::new(lines, &box_style, top, call.box_x).draw(working, surface, mimic);
                working.track_point(end);
            }
            None => {
                let centre = Point::new(call.box_x + TOMBSTONE_RADIUS, call_y);
                if !mimic {
                    surface.fill_circle(centre, TOMBSTONE_RADIUS, &stroke.colour);
                }
                working.track(centre.x + TOMBSTONE_RADIUS, centre.y + TOMBSTONE_RADIUS);
            }
        }

        Some(working.track(0.0, start_y + height))
    }
}
