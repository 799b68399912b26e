//! Vector paths built from move, line and arc-to segments
//!
//! Arc-to follows the canvas convention: a circular arc of the given radius
//! tangent to the line from the current point to `corner` and to the line
//! from `corner` to `to`. It is resolved to an SVG arc only when the path is
//! serialised, since the tangent points depend on the current point.

use crate::layout::Point;

#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    MoveTo(Point),
    LineTo(Point),
    ArcTo { corner: Point, to: Point, radius: f64 },
    Close,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(mut self, x: f64, y: f64) -> Self {
        self.segments.push(PathSegment::MoveTo(Point::new(x, y)));
        self
    }

    pub fn line_to(mut self, x: f64, y: f64) -> Self {
        self.segments.push(PathSegment::LineTo(Point::new(x, y)));
        self
    }

    pub fn arc_to(mut self, x1: f64, y1: f64, x2: f64, y2: f64, radius: f64) -> Self {
        self.segments.push(PathSegment::ArcTo {
            corner: Point::new(x1, y1),
            to: Point::new(x2, y2),
            radius,
        });
        self
    }

    pub fn close(mut self) -> Self {
        self.segments.push(PathSegment::Close);
        self
    }

    /// Closed axis-aligned rectangle
    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Path::new()
            .move_to(x, y)
            .line_to(x + width, y)
            .line_to(x + width, y + height)
            .line_to(x, y + height)
            .close()
    }

    /// Closed rectangle with every corner rounded by `radius`
    pub fn rounded_rect(x: f64, y: f64, width: f64, height: f64, radius: f64) -> Self {
        let (right, bottom) = (x + width, y + height);
        Path::new()
            .move_to(x + radius, y)
            .line_to(right - radius, y)
            .arc_to(right, y, right, y + radius, radius)
            .line_to(right, bottom - radius)
            .arc_to(right, bottom, right - radius, bottom, radius)
            .line_to(x + radius, bottom)
            .arc_to(x, bottom, x, bottom - radius, radius)
            .line_to(x, y + radius)
            .arc_to(x, y, x + radius, y, radius)
            .close()
    }

    /// Closed polygon through the given points
    pub fn polygon(points: &[Point]) -> Self {
        let mut path = Path::new();
        for (i, p) in points.iter().enumerate() {
            path = if i == 0 {
                path.move_to(p.x, p.y)
            } else {
                path.line_to(p.x, p.y)
            };
        }
        path.close()
    }

    /// Single straight stroke
    pub fn line(from: Point, to: Point) -> Self {
        Path::new().move_to(from.x, from.y).line_to(to.x, to.y)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Convert to SVG path `d` attribute string
    pub fn to_svg_d(&self) -> String {
        let mut d = String::new();
        let mut current = Point::default();
        let mut subpath_start = Point::default();

        for seg in &self.segments {
            if !d.is_empty() {
                d.push(' ');
            }
            match seg {
                PathSegment::MoveTo(p) => {
                    d.push_str(&format!("M{} {}", num(p.x), num(p.y)));
                    current = *p;
                    subpath_start = *p;
                }
                PathSegment::LineTo(p) => {
                    d.push_str(&format!("L{} {}", num(p.x), num(p.y)));
                    current = *p;
                }
                PathSegment::ArcTo { corner, to, radius } => {
                    match arc_tangents(current, *corner, *to, *radius) {
                        Some((t1, t2, sweep)) => {
                            // SVG arc: A rx ry x-axis-rotation large-arc-flag sweep-flag x y
                            d.push_str(&format!(
                                "L{} {} A{} {} 0 0 {} {} {}",
                                num(t1.x),
                                num(t1.y),
                                num(*radius),
                                num(*radius),
                                u8::from(sweep),
                                num(t2.x),
                                num(t2.y)
                            ));
                            current = t2;
                        }
                        None => {
                            d.push_str(&format!("L{} {}", num(corner.x), num(corner.y)));
                            current = *corner;
                        }
                    }
                }
                PathSegment::Close => {
                    d.push('Z');
                    current = subpath_start;
                }
            }
        }
        d
    }
}

/// Tangent points and sweep flag of a canvas-style arc-to
fn arc_tangents(current: Point, corner: Point, to: Point, radius: f64) -> Option<(Point, Point, bool)> {
    if radius <= 0.0 {
        return None;
    }
    let (ux, uy) = (current.x - corner.x, current.y - corner.y);
    let (vx, vy) = (to.x - corner.x, to.y - corner.y);
    let (lu, lv) = (ux.hypot(uy), vx.hypot(vy));
    if lu == 0.0 || lv == 0.0 {
        return None;
    }
    let (ux, uy, vx, vy) = (ux / lu, uy / lu, vx / lv, vy / lv);
    let angle = (ux * vx + uy * vy).clamp(-1.0, 1.0).acos();
    if angle < 1e-9 || (std::f64::consts::PI - angle) < 1e-9 {
        return None;
    }
    let dist = radius / (angle / 2.0).tan();
    let t1 = Point::new(corner.x + ux * dist, corner.y + uy * dist);
    let t2 = Point::new(corner.x + vx * dist, corner.y + vy * dist);
    // incoming direction is -u, outgoing is v
    let cross = (-ux) * vy - (-uy) * vx;
    Some((t1, t2, cross > 0.0))
}

/// Coordinates rounded to two decimals without trailing zeros
pub fn num(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 {
        "0".to_string()
    } else {
        format!("{}", rounded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_straight_path() {
        let d = Path::new().move_to(0.0, 0.0).line_to(100.0, 0.0).line_to(100.0, 100.0).to_svg_d();
        assert_eq!(d, "M0 0 L100 0 L100 100");
    }

    #[test]
    fn test_rect_is_closed() {
        assert_eq!(Path::rect(1.0, 2.0, 3.0, 4.0).to_svg_d(), "M1 2 L4 2 L4 6 L1 6 Z");
    }

    #[test]
    fn test_right_angle_arc() {
        // heading right, then turning down: clockwise on screen
        let d = Path::new()
            .move_to(0.0, 0.0)
            .arc_to(10.0, 0.0, 10.0, 10.0, 5.0)
            .to_svg_d();
        insta::assert_snapshot!(d, @"M0 0 L5 0 A5 5 0 0 1 10 5");
    }

    #[test]
    fn test_counter_clockwise_arc() {
        let d = Path::new()
            .move_to(0.0, 10.0)
            .arc_to(10.0, 10.0, 10.0, 0.0, 5.0)
            .to_svg_d();
        assert_eq!(d, "M0 10 L5 10 A5 5 0 0 0 10 5");
    }

    #[test]
    fn test_collinear_arc_degrades_to_line() {
        let d = Path::new()
            .move_to(0.0, 0.0)
            .arc_to(10.0, 0.0, 20.0, 0.0, 5.0)
            .to_svg_d();
        assert_eq!(d, "M0 0 L10 0");
    }

    #[test]
    fn test_num_formatting() {
        assert_eq!(num(1.005), "1");
        assert_eq!(num(2.5), "2.5");
        assert_eq!(num(-0.001), "0");
        assert_eq!(num(1.0 / 3.0), "0.33");
    }
}
