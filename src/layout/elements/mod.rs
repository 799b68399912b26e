//! Element drawers and the line dispatcher
//!
//! Every line kind is a small struct borrowing its parsed line. Drawing
//! follows the two-pass protocol: an element first runs its own geometry in
//! mimic mode to learn how tall it is, then paints fragment bands, timelines
//! and its own content for that height. An element that cannot draw returns
//! `None` and the dispatcher puts a red error box in its place.

mod blank;
mod call;
mod comment;
mod condition;
mod fragment;
mod reference;
mod return_call;
mod state;
mod terminate;

pub use blank::Blank;
pub use call::Call;
pub use comment::Comment;
pub use condition::Condition;
pub use fragment::Fragment;
pub use reference::Reference;
pub use return_call::Return;
pub use state::State;
pub use terminate::Terminate;

use serde_json::Value;
use tracing::{debug, warn};

use crate::parser::{Line, LineNode, StateLine, StyleMap, Text};
use crate::renderer::{DrawSurface, Path, Stroke};
use crate::style::{non_negative, Align, TextStyle};

use super::shapes::TextBox;
use super::types::Point;
use super::working::Working;

const ERROR_COLOUR: &str = "rgb(255,0,0)";
const ERROR_BORDER_WIDTH: f64 = 3.0;

/// A drawable line
pub trait Element {
    /// Draw starting at `start_y` and return the bottom-right extent
    ///
    /// `None` means nothing was drawn.
    fn draw(
        &self,
        working: &mut Working,
        surface: &mut dyn DrawSurface,
        start_y: f64,
        mimic: bool,
    ) -> Option<Point>;
}

/// Build the drawer for one line, or the text of its error box
///
/// Numbered kinds take their sequence numbers here, so every line is
/// numbered exactly once per layout attempt.
fn element<'l>(node: &'l LineNode, working: &mut Working) -> Result<Box<dyn Element + 'l>, String> {
    Ok(match &node.line {
        Line::Blank(line) => match line.height.as_ref().and_then(non_negative) {
            Some(_) => Box::new(Blank::new(line)),
            None => return Err(unrecognised_text(&node.source)),
        },
        Line::Fragment(line) => Box::new(Fragment::new(line)),
        Line::State(line) => Box::new(State::new(line)),
        Line::Condition(line) => Box::new(Condition::new(line)),
        Line::Call(line) => Box::new(Call::new(line, working)),
        Line::Return(line) => Box::new(Return::new(line, working)),
        Line::Reference(line) => Box::new(Reference::new(line, working)),
        Line::Terminate(line) => Box::new(Terminate::new(line, working)),
        Line::Untyped => {
            warn!(line = %describe(&node.source), "line has no type");
            return Err(format!(
                "<b>ERROR IN LINE - NO TYPE IDENTIFIER:</b> {}",
                escaped_json(&node.source)
            ));
        }
        Line::Unrecognised(kind) => {
            warn!(kind = %kind, "unrecognised line type");
            return Err(unrecognised_text(&node.source));
        }
        Line::Malformed { kind, reason } => {
            warn!(kind = %kind, reason = %reason, "line does not fit its type");
            if node.line.is_numbered() {
                working.next_call_number();
            }
            return Err(failed_text(&node.source));
        }
    })
}

/// Draw `lines` one below the other from `start_y`
pub fn draw_lines(
    working: &mut Working,
    surface: &mut dyn DrawSurface,
    start_y: f64,
    lines: &[LineNode],
    mimic: bool,
) -> Point {
    let mut end = Point::new(0.0, start_y);
    for node in lines {
        let top = end.y;
        debug!(kind = node.line.kind(), y = top, "drawing line");

        end = match element(node, working) {
            Ok(drawer) => match drawer.draw(working, surface, top, mimic) {
                Some(point) => point,
                None => {
                    warn!(kind = node.line.kind(), y = top, "line drew nothing");
                    error_box(working, surface, top, failed_text(&node.source), mimic)
                }
            },
            Err(text) => error_box(working, surface, top, text, mimic),
        };

        if working.debug && !mimic {
            draw_debug_line(working, surface, top, &debug_label(top, &node.source));
        }
    }
    working.track_point(end)
}

/// Red-bordered state box holding an error message
fn error_box(
    working: &mut Working,
    surface: &mut dyn DrawSurface,
    start_y: f64,
    text: String,
    mimic: bool,
) -> Point {
    let mut style = StyleMap::new();
    style.insert("borderWidth".to_string(), Value::from(ERROR_BORDER_WIDTH));
    style.insert("borderColour".to_string(), Value::from(ERROR_COLOUR));
    let line = StateLine {
        actor: None,
        text: Some(Text::Single(text)),
        comment: None,
        style,
    };
    State::new(&line)
        .draw(working, surface, start_y, mimic)
        .unwrap_or(Point::new(0.0, start_y))
}

fn failed_text(source: &Value) -> String {
    format!("<b>ERROR IN LINE:</b> {}", escaped_json(source))
}

fn unrecognised_text(source: &Value) -> String {
    format!(
        "<b>ERROR IN LINE - NO RECOGNISED TYPE IDENTIFIER:</b> {}",
        escape_markup(&describe(source))
    )
}

fn escaped_json(source: &Value) -> String {
    escape_markup(&source.to_string())
}

/// Keep `<` and `>` in user JSON from being read as markup
fn escape_markup(text: &str) -> String {
    text.replace('<', "&lt;").replace('>', "&gt;")
}

/// `key: "text", key: 3` rendering of an object
fn describe(value: &Value) -> String {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| match value {
                Value::String(s) => format!("{key}: \"{s}\""),
                other => format!("{key}: {other}"),
            })
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// `y:JSON` with nested fragment lines elided
fn debug_label(top: f64, source: &Value) -> String {
    let mut copy = source.clone();
    if let Some(lines) = copy.get_mut("lines").filter(|l| l.is_array()) {
        *lines = Value::from("[...]");
    }
    format!("{top}:{}", escaped_json(&copy))
}

/// Dashed rule across the canvas with a small monospace label under it
pub(crate) fn draw_debug_line(working: &Working, surface: &mut dyn DrawSurface, top: f64, label: &str) {
    let rule = Path::line(Point::new(0.0, top), Point::new(working.canvas_width, top));
    surface.stroke_path(&rule, &Stroke::dashed("rgb(0,0,0)", 1.0, &[2.0, 2.0]));

    let style = TextStyle {
        font_family: "monospace".to_string(),
        font_size_px: 8.0,
        padding: 5.0,
        spacing: 1.0,
        align: Align::Left,
        ..TextStyle::default()
    };
    let lines = vec![label.to_string()];
    TextBox::new(&lines, &style, top + 5.0, 10.0)
        .plain()
        .draw(working, surface, false);
}

/// Horizontal run of a line between two different lanes
#[derive(Debug, Clone, Copy, PartialEq)]
struct Span {
    /// Edge of the source lane's activation bar
    start: f64,
    /// Edge of the target lane's activation bar, where the arrow tip sits
    end: f64,
    /// `1.0` pointing right, `-1.0` pointing left
    direction: f64,
}

impl Span {
    fn between(working: &Working, from: usize, to: usize) -> Self {
        let (source, target) = (working.actors.lane(from), working.actors.lane(to));
        if source.middle < target.middle {
            Self {
                start: source.bar_right(),
                end: target.bar_left(),
                direction: 1.0,
            }
        } else {
            Self {
                start: source.bar_left(),
                end: target.bar_right(),
                direction: -1.0,
            }
        }
    }

    /// Where labels and comments hang: right of the start, or clear of the arrowhead
    fn anchor(&self, arrow: f64) -> f64 {
        if self.direction > 0.0 {
            self.start
        } else {
            self.end + 2.0 * arrow
        }
    }
}

/// `"N. text"`, with further lines hung under the first
fn inline_label(number: u32, text: Option<&Text>) -> Vec<String> {
    let mut lines = text.map(Text::lines).unwrap_or_default();
    match lines.first_mut() {
        Some(first) => *first = format!("{number}. {first}"),
        None => lines.push(format!("{number}. ")),
    }
    lines
}

/// `"N. "` followed by each line hung to its right
fn hanging_label(number: u32, text: Option<&Text>) -> Vec<String> {
    match text {
        Some(Text::Lines(lines)) => std::iter::once(format!("{number}. "))
            .chain(lines.iter().map(|line| format!("<hang>{line}")))
            .collect(),
        Some(Text::Single(line)) => vec![format!("{number}. {line}")],
        None => vec![format!("{number}. ")],
    }
}
