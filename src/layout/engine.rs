//! Layout computation engine
//!
//! A diagram is drawn top to bottom in one pass over the document:
//!
//! 1. **Background**: the whole canvas is painted white
//! 2. **Headers**: title, version and description boxes, then a gap
//! 3. **Actors**: the lane headers side by side
//! 4. **Lines**: every line through the element dispatcher
//! 5. **Tail**: running activation bars are closed and a short final timeline drawn
//!
//! Every drawer reports how far it reached. When the content outgrows the
//! canvas, or something was placed left of x = 0, the canvas is grown (or
//! the diagram shifted) and the whole pass runs again from scratch.
//!
//! ## Key Functions
//!
//! - [`compute`]: growth loop around one drawing pass

use tracing::{debug, info};

use crate::parser::{numbered_line_count, Document, StyledText};
use crate::renderer::DrawSurface;
use crate::style::{boolean, positive, Props, TextStyle};

use super::actor::{draw_actors, draw_timelines};
use super::config::LayoutConfig;
use super::elements::{draw_lines, Blank, Element};
use super::error::LayoutError;
use super::shapes::{draw_rectangle, BoxStyle, TextBox};
use super::types::*;
use super::working::Working;

const BACKGROUND: &str = "rgb(255,255,255)";

/// Height of the timelines drawn below the last line
const FINAL_TIMELINE: f64 = 20.0;

/// Lay out and draw `doc` onto `surface`
///
/// The surface is resized before every attempt, so when this returns it
/// holds exactly the settled drawing.
pub fn compute(
    doc: &Document,
    config: &LayoutConfig,
    surface: &mut dyn DrawSurface,
    debug: bool,
) -> Result<LayoutResult, LayoutError> {
    let (mut width, mut height) = config.initial_size;
    let mut negative_x = 0.0;

    for attempt in 1..=config.max_attempts {
        surface.resize(width, height);
        let mut working = Working::new(doc, config, (width, height), negative_x, debug);
        debug!(attempt, width, height, negative_x, "layout attempt");

        let end = draw_diagram(&mut working, surface)?;

        let need_w = working.max_width()
            + working.window_padding
            + working.max_fragment_depth as f64 * working.fragment_spacing;
        let need_h = working.max_height() + working.window_padding;
        let shifted = working.negative_x != negative_x;

        if need_w <= width && need_h <= height && !shifted {
            debug!(attempt, width, height, "canvas settled");
            return Ok(LayoutResult {
                width,
                height,
                start_x: working.start_x,
                end,
                actors: working
                    .actors
                    .lanes()
                    .iter()
                    .map(|lane| ActorGeometry {
                        alias: lane.alias.clone(),
                        left: lane.left,
                        top: lane.top,
                        width: lane.width,
                        height: lane.height,
                        middle: lane.middle,
                    })
                    .collect(),
                max_fragment_depth: working.max_fragment_depth,
                call_count: working.call_count(),
                attempts: attempt,
            });
        }

        let grown = (width.max(need_w.ceil()), height.max(need_h.ceil()));
        info!(
            from = %format!("{width}x{height}"),
            to = %format!("{}x{}", grown.0, grown.1),
            negative_x = working.negative_x,
            "canvas too small, redrawing"
        );
        (width, height) = grown;
        negative_x = working.negative_x;
    }

    Err(LayoutError::CanvasDidNotSettle {
        attempts: config.max_attempts,
    })
}

/// One full drawing pass; returns the bottom of the final timelines
fn draw_diagram(working: &mut Working, surface: &mut dyn DrawSurface) -> Result<Point, LayoutError> {
    let canvas = Rect::new(0.0, 0.0, working.canvas_width, working.canvas_height);
    draw_rectangle(surface, &BoxStyle::filled(BACKGROUND), canvas, 0.0, Borders::NONE, false);

    let document = working.document;
    let mut y = working.start_y;
    let headers = [
        ("title", "Title", &document.title),
        ("version", "Version", &document.version),
        ("description", "Description", &document.description),
    ];
    for (key, label, text) in headers {
        if let Some(text) = text {
            y = draw_header(working, surface, y, key, label, text).y;
            debug!(key, y, "header drawn");
        }
    }
    if y != working.start_y {
        y = Blank::gap().draw(working, surface, y, false).map_or(y, |end| end.y);
    }

    let end = draw_actors(working, surface, y)?;
    debug!(
        actors = working.actors.len(),
        numbered = numbered_line_count(&document.lines),
        y = end.y,
        "actors drawn"
    );

    let end = draw_lines(working, surface, end.y, &document.lines, false);
    working.actors.close_continuing(end.y);
    Ok(draw_timelines(working, surface, end.y, FINAL_TIMELINE, None, false))
}

/// `<b>Label:</b>` followed by the header lines hung beside it
fn header_lines(label: &str, text: &StyledText) -> Vec<String> {
    std::iter::once(format!("<b>{label}:</b> "))
        .chain(text.text.lines().into_iter().map(|line| format!("<hang>{line}")))
        .collect()
}

fn draw_header(
    working: &mut Working,
    surface: &mut dyn DrawSurface,
    top: f64,
    key: &str,
    label: &str,
    text: &StyledText,
) -> Point {
    let params: Props = working.defaults(key);
    let style = working.text_style(Props::new(&text.style), params, &TextStyle::header());
    let border = |side: &str| params.get(side).and_then(boolean).unwrap_or(false);
    let borders = Borders {
        top: border("drawTopBorder"),
        right: border("drawRightBorder"),
        bottom: border("drawBottomBorder"),
        left: border("drawLeftBorder"),
    };

    let lines = header_lines(label, text);
    let end = TextBox::new(&lines, &style, top, working.start_x)
        .size(
            params.get("width").and_then(positive),
            params.get("height").and_then(positive),
        )
        .radius(params.get("cornerRadius").and_then(positive).unwrap_or(0.0))
        .borders(borders)
        .draw(working, surface, false);
    working.track_point(end)
}
