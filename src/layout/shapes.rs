//! Drawing primitives shared by the element drawers
//!
//! Every primitive takes a `mimic` flag: in mimic mode the geometry is
//! computed and returned but nothing reaches the surface.

use std::borrow::Cow;

use crate::parser::ArrowStyle;
use crate::renderer::{DrawSurface, Font, Path, Stroke};
use crate::style::{is_transparent, is_valid_colour, Align, TextStyle};
use crate::text::TextBlock;

use super::types::{Borders, Point, Rect};
use super::working::Working;

/// Fill and border of a rectangle
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStyle {
    pub fill: String,
    pub stroke: Stroke,
}

impl BoxStyle {
    /// Background and border of a text style
    pub fn of_text(style: &TextStyle) -> Self {
        Self {
            fill: style.bg_colour.clone(),
            stroke: Stroke::dashed(style.border_colour.clone(), style.border_width, &style.border_dash),
        }
    }

    /// Fill only
    pub fn filled(colour: &str) -> Self {
        Self {
            fill: colour.to_string(),
            stroke: Stroke::solid(colour, 0.0),
        }
    }

    fn paints_fill(&self) -> bool {
        is_valid_colour(&self.fill) && !is_transparent(&self.fill)
    }

    fn paints_border(&self) -> bool {
        self.stroke.width > 0.0 && is_valid_colour(&self.stroke.colour)
    }
}

/// Fill and stroke a rectangle
///
/// Rounded rectangles always stroke the whole outline; square ones stroke
/// only the requested edges. Returns `None` for a negative or non-finite size.
pub fn draw_rectangle(
    surface: &mut dyn DrawSurface,
    style: &BoxStyle,
    rect: Rect,
    radius: f64,
    borders: Borders,
    mimic: bool,
) -> Option<Point> {
    let Rect {
        left,
        top,
        width,
        height,
    } = rect;
    let finite = [left, top, width, height].iter().all(|v| v.is_finite());
    if !finite || width < 0.0 || height < 0.0 {
        return None;
    }
    if mimic {
        return Some(rect.bottom_right());
    }

    if radius > 0.0 {
        let outline = Path::rounded_rect(left, top, width, height, radius);
        if style.paints_fill() {
            surface.fill_path(&outline, &style.fill);
        }
        if style.paints_border() {
            surface.stroke_path(&outline, &style.stroke);
        }
        return Some(rect.bottom_right());
    }

    if style.paints_fill() {
        surface.fill_path(&Path::rect(left, top, width, height), &style.fill);
    }
    if style.paints_border() && borders != Borders::NONE {
        let outline = if borders.is_all() {
            Path::rect(left, top, width, height)
        } else {
            let edge = |path: Path, on: bool, x: f64, y: f64| {
                if on {
                    path.line_to(x, y)
                } else {
                    path.move_to(x, y)
                }
            };
            let path = Path::new().move_to(left, top);
            let path = edge(path, borders.left, left, top + height);
            let path = edge(path, borders.bottom, left + width, top + height);
            let path = edge(path, borders.right, left + width, top);
            edge(path, borders.top, left, top)
        };
        surface.stroke_path(&outline, &style.stroke);
    }
    Some(rect.bottom_right())
}

/// A box of marked-up text lines
///
/// Width and height default to the measured block. When a fixed width is
/// too narrow the overflowing run is truncated and the rest of its line is
/// dropped; lines below a fixed height are not drawn.
#[derive(Debug, Clone)]
pub struct TextBox<'t> {
    lines: &'t [String],
    style: &'t TextStyle,
    top: f64,
    left: f64,
    width: Option<f64>,
    height: Option<f64>,
    radius: f64,
    borders: Borders,
    background: bool,
    measured: Option<&'t TextBlock>,
}

impl<'t> TextBox<'t> {
    pub fn new(lines: &'t [String], style: &'t TextStyle, top: f64, left: f64) -> Self {
        Self {
            lines,
            style,
            top,
            left,
            width: None,
            height: None,
            radius: 0.0,
            borders: Borders::ALL,
            background: true,
            measured: None,
        }
    }

    /// Text only, no background or border
    pub fn plain(mut self) -> Self {
        self.borders = Borders::NONE;
        self.background = false;
        self.radius = 0.0;
        self
    }

    pub fn size(mut self, width: Option<f64>, height: Option<f64>) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn borders(mut self, borders: Borders) -> Self {
        self.borders = borders;
        self
    }

    /// Reuse an earlier measurement of the same lines
    pub fn measured(mut self, block: &'t TextBlock) -> Self {
        self.measured = Some(block);
        self
    }

    /// Draw the box and return its bottom-right corner
    pub fn draw(&self, working: &Working, surface: &mut dyn DrawSurface, mimic: bool) -> Point {
        let block: Cow<TextBlock> = match self.measured {
            Some(block) => Cow::Borrowed(block),
            None => Cow::Owned(working.measure(&*surface, self.style, self.lines)),
        };
        let box_w = self.width.unwrap_or(block.width);
        let box_h = self.height.unwrap_or(block.height);
        let end = Point::new(self.left + box_w, self.top + box_h);

        let mut box_style = BoxStyle::of_text(self.style);
        if !self.background {
            box_style.fill.clear();
        }
        let rect = Rect::new(self.left, self.top, box_w, box_h);
        draw_rectangle(surface, &box_style, rect, self.radius, self.borders, mimic);
        if mimic {
            return end;
        }

        self.draw_lines(surface, &block, box_w, box_h);
        end
    }

    fn draw_lines(&self, surface: &mut dyn DrawSurface, block: &TextBlock, box_w: f64, box_h: f64) {
        let style = self.style;
        let vpad = style.vertical_padding();
        let top_padding = if box_h > block.height {
            vpad / 2.0 + (box_h - block.height) / 2.0
        } else {
            vpad / 2.0
        };
        let right_edge = self.left + box_w;

        let mut base = self.top + top_padding;
        let mut previous: Option<(f64, f64, f64, bool)> = None; // left, right, base, hang

        for (i, line) in block.lines.iter().enumerate() {
            let gap = if i > 0 { block.inter_line_gap } else { 0.0 };
            let mut x = match style.align {
                Align::Centre if line.width < box_w => {
                    base += line.height + gap;
                    self.left + box_w / 2.0 - line.width / 2.0
                }
                Align::Right if line.width + style.padding < box_w => {
                    base += line.height + gap;
                    right_edge - line.width - style.padding / 2.0
                }
                _ => match previous {
                    Some((_, prev_right, prev_base, false)) if line.hang => {
                        base = prev_base;
                        prev_right
                    }
                    Some((prev_left, _, _, true)) if line.hang => {
                        base += line.height + gap;
                        prev_left
                    }
                    _ => {
                        let next = block.lines.get(i + 1);
                        base += match next {
                            Some(n) if n.hang && n.height > line.height => n.height,
                            _ => line.height,
                        };
                        base += gap;
                        self.left + style.padding / 2.0
                    }
                },
            };

            if base > self.top + box_h {
                break;
            }

            let line_left = x;
            for run in &line.runs {
                if x + run.width > right_edge {
                    if let Some(text) = truncate_to_width(surface, &run.text, &run.font, right_edge - x) {
                        surface.fill_text(&text, Point::new(x, base), &run.font, &run.colour);
                    }
                    x += run.width;
                    break;
                }
                surface.fill_text(&run.text, Point::new(x, base), &run.font, &run.colour);
                x += run.width;
            }
            previous = Some((line_left, x, base, line.hang));
        }
    }
}

/// Drop characters from the end, two at a time, until the text fits
fn truncate_to_width(surface: &dyn DrawSurface, text: &str, font: &Font, width: f64) -> Option<String> {
    if width <= 0.0 {
        return None;
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        let candidate: String = chars.iter().collect();
        if surface.measure_text(&candidate, font) <= width {
            return Some(candidate);
        }
        let keep = chars.len().saturating_sub(2);
        chars.truncate(keep);
    }
    None
}

/// Paint the side bands of every open fragment over `[top, top + height]`
pub fn draw_active_fragments(
    working: &Working,
    surface: &mut dyn DrawSurface,
    top: f64,
    height: f64,
    mimic: bool,
) {
    for fragment in &working.active_fragments {
        let style = BoxStyle {
            fill: fragment.colour.clone(),
            stroke: Stroke::dashed(
                fragment.border_colour.clone(),
                fragment.border_width,
                &fragment.border_dash,
            ),
        };
        let rect = Rect::new(fragment.start_x, top, fragment.end_x - fragment.start_x, height);
        draw_rectangle(surface, &style, rect, 0.0, Borders::SIDES, mimic);
    }
}

/// Line stroke shared by calls and returns
#[derive(Debug, Clone, PartialEq)]
pub struct LineStyle {
    pub colour: String,
    pub width: f64,
    pub dash: Vec<f64>,
}

impl LineStyle {
    pub fn stroke(&self) -> Stroke {
        Stroke::dashed(self.colour.clone(), self.width, &self.dash)
    }

    pub fn solid(&self) -> Stroke {
        Stroke::solid(self.colour.clone(), self.width)
    }
}

/// Draw an arrowhead whose tip sits at `tip`
///
/// `direction` is `1.0` for an arrow pointing right and `-1.0` for one
/// pointing left; the head extends `2 * size` back from the tip and `size`
/// either side of the line.
pub fn draw_arrowhead(
    surface: &mut dyn DrawSurface,
    tip: Point,
    direction: f64,
    size: f64,
    kind: ArrowStyle,
    line: &LineStyle,
    mimic: bool,
) {
    if mimic || size <= 0.0 {
        return;
    }
    let back = tip.x - direction * 2.0 * size;
    let upper = Point::new(back, tip.y - size);
    let lower = Point::new(back, tip.y + size);

    match kind {
        ArrowStyle::Fill => {
            surface.fill_path(&Path::polygon(&[tip, upper, lower]), &line.colour);
        }
        ArrowStyle::Open => {
            let barbs = Path::new()
                .move_to(upper.x, upper.y)
                .line_to(tip.x, tip.y)
                .line_to(lower.x, lower.y);
            surface.stroke_path(&barbs, &line.solid());
        }
        ArrowStyle::Cross => {
            let cross = Path::new()
                .move_to(upper.x, upper.y)
                .line_to(tip.x, lower.y)
                .move_to(lower.x, lower.y)
                .line_to(tip.x, upper.y);
            surface.stroke_path(&cross, &line.solid());
        }
        ArrowStyle::Empty => {
            let head = Path::polygon(&[tip, upper, lower]);
            surface.fill_path(&head, "rgb(255,255,255)");
            surface.stroke_path(&head, &line.solid());
        }
    }
}

/// Straight line between two points
pub fn draw_line(surface: &mut dyn DrawSurface, from: Point, to: Point, line: &LineStyle, mimic: bool) {
    if !mimic {
        surface.stroke_path(&Path::line(from, to), &line.stroke());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::config::LayoutConfig;
    use crate::parser::Document;
    use crate::renderer::{DrawOp, RecordingSurface};
    use pretty_assertions::assert_eq;

    fn boxed() -> BoxStyle {
        BoxStyle {
            fill: "rgb(10,20,30)".to_string(),
            stroke: Stroke::solid("rgb(0,0,0)", 1.0),
        }
    }

    #[test]
    fn test_rectangle_rejects_negative_size() {
        let mut surface = RecordingSurface::new(100.0, 100.0);
        let rect = Rect::new(0.0, 0.0, -1.0, 10.0);
        assert_eq!(
            draw_rectangle(&mut surface, &boxed(), rect, 0.0, Borders::ALL, false),
            None
        );
        assert!(surface.ops().is_empty());
    }

    #[test]
    fn test_mimic_rectangle_draws_nothing() {
        let mut surface = RecordingSurface::new(100.0, 100.0);
        let end = draw_rectangle(
            &mut surface,
            &boxed(),
            Rect::new(5.0, 5.0, 10.0, 20.0),
            3.0,
            Borders::ALL,
            true,
        );
        assert_eq!(end, Some(Point::new(15.0, 25.0)));
        assert!(surface.ops().is_empty());
    }

    #[test]
    fn test_partial_borders() {
        let mut surface = RecordingSurface::new(100.0, 100.0);
        draw_rectangle(
            &mut surface,
            &boxed(),
            Rect::new(0.0, 0.0, 10.0, 20.0),
            0.0,
            Borders::SIDES,
            false,
        );
        let strokes = surface.strokes_with("rgb(0,0,0)");
        assert_eq!(strokes.len(), 1);
        assert_eq!(strokes[0].0.to_svg_d(), "M0 0 L0 20 M10 20 L10 0 M0 0");
    }

    #[test]
    fn test_transparent_fill_is_skipped() {
        let mut surface = RecordingSurface::new(100.0, 100.0);
        let style = BoxStyle {
            fill: "rgba(0,0,0,0)".to_string(),
            stroke: Stroke::solid("rgb(0,0,0)", 0.0),
        };
        draw_rectangle(
            &mut surface,
            &style,
            Rect::new(0.0, 0.0, 10.0, 10.0),
            0.0,
            Borders::ALL,
            false,
        );
        assert!(surface.ops().is_empty());
    }

    #[test]
    fn test_arrowhead_kinds() {
        let line = LineStyle {
            colour: "rgb(1,2,3)".to_string(),
            width: 1.0,
            dash: vec![6.0, 3.0],
        };
        let tip = Point::new(50.0, 10.0);
        let mut surface = RecordingSurface::new(100.0, 100.0);
        draw_arrowhead(&mut surface, tip, 1.0, 5.0, ArrowStyle::Fill, &line, false);
        assert_eq!(
            surface.fills_with("rgb(1,2,3)")[0].to_svg_d(),
            "M50 10 L40 5 L40 15 Z"
        );

        let mut surface = RecordingSurface::new(100.0, 100.0);
        draw_arrowhead(&mut surface, tip, -1.0, 5.0, ArrowStyle::Open, &line, false);
        let (path, stroke) = surface.strokes_with("rgb(1,2,3)")[0];
        assert_eq!(path.to_svg_d(), "M60 5 L50 10 L60 15");
        assert!(stroke.dash.is_empty());

        let mut surface = RecordingSurface::new(100.0, 100.0);
        draw_arrowhead(&mut surface, tip, 1.0, 5.0, ArrowStyle::Empty, &line, true);
        assert!(surface.ops().is_empty());
    }

    fn document() -> Document {
        serde_json::from_str("{}").unwrap()
    }

    #[test]
    fn test_text_box_places_baselines() {
        let doc = document();
        let working = Working::new(&doc, &LayoutConfig::default(), (500.0, 500.0), 0.0, false);
        let mut surface = RecordingSurface::new(500.0, 500.0);
        let style = TextStyle {
            font_size_px: 10.0,
            padding: 10.0,
            spacing: 1.0,
            ..TextStyle::default()
        };
        let lines = vec!["one".to_string(), "two".to_string()];
        let end = TextBox::new(&lines, &style, 100.0, 20.0).plain().draw(&working, &mut surface, false);
        assert_eq!(end.y, 100.0 + 20.0 + 10.0);

        let bases: Vec<f64> = surface
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::FillText { at, .. } => Some(at.y),
                _ => None,
            })
            .collect();
        assert_eq!(bases, vec![115.0, 125.0]);
    }

    #[test]
    fn test_hang_line_shares_baseline() {
        let doc = document();
        let working = Working::new(&doc, &LayoutConfig::default(), (500.0, 500.0), 0.0, false);
        let mut surface = RecordingSurface::new(500.0, 500.0);
        let style = TextStyle {
            font_size_px: 10.0,
            padding: 0.0,
            spacing: 1.0,
            ..TextStyle::default()
        };
        let lines = vec!["1. ".to_string(), "<hang>call".to_string()];
        TextBox::new(&lines, &style, 0.0, 0.0).plain().draw(&working, &mut surface, false);
        let placed: Vec<(String, Point)> = surface
            .ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::FillText { text, at, .. } => Some((text.clone(), *at)),
                _ => None,
            })
            .collect();
        assert_eq!(placed.len(), 2);
        assert_eq!(placed[0].1.y, placed[1].1.y);
        assert!(placed[1].1.x > placed[0].1.x);
    }

    #[test]
    fn test_narrow_box_truncates() {
        let doc = document();
        let working = Working::new(&doc, &LayoutConfig::default(), (500.0, 500.0), 0.0, false);
        let mut surface = RecordingSurface::new(500.0, 500.0);
        let style = TextStyle::default();
        let lines = vec!["a rather long label".to_string()];
        TextBox::new(&lines, &style, 0.0, 0.0)
            .size(Some(40.0), None)
            .draw(&working, &mut surface, false);
        let texts = surface.texts();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].len() < "a rather long label".len());
    }
}
