//! SVG backend for the draw surface

use std::fmt::Write as _;

use crate::layout::Point;

use super::path::{num, Path};
use super::surface::{DrawSurface, Font, Stroke, TextMeasure};
use super::SvgConfig;

/// Keeps every drawing call as one SVG element until `build`
pub struct SvgSurface {
    config: SvgConfig,
    width: f64,
    height: f64,
    elements: Vec<String>,
}

impl SvgSurface {
    pub fn new(config: SvgConfig, width: f64, height: f64) -> Self {
        Self {
            config,
            width,
            height,
            elements: Vec::new(),
        }
    }

    /// Number of elements drawn since the last resize
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Serialise the drawing sized to the current canvas
    pub fn build(&self) -> String {
        let (pad, sep) = match self.config.indent {
            Some(spaces) => (" ".repeat(spaces), "\n"),
            None => (String::new(), ""),
        };

        let mut svg = String::new();
        if self.config.xml_declaration {
            svg.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
            svg.push_str(sep);
        }
        let (w, h) = (num(self.width), num(self.height));
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">{sep}"#
        );
        for element in &self.elements {
            svg.push_str(&pad);
            svg.push_str(element);
            svg.push_str(sep);
        }
        svg.push_str("</svg>");
        svg
    }

    fn class(&self, name: &str) -> String {
        format!(r#"class="{}{}""#, self.config.class_prefix, name)
    }
}

impl TextMeasure for SvgSurface {}

impl DrawSurface for SvgSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.clear();
    }

    fn clear(&mut self) {
        self.elements.clear();
    }

    fn fill_path(&mut self, path: &Path, colour: &str) {
        if path.is_empty() {
            return;
        }
        let element = format!(
            r#"<path {} d="{}" fill="{}"/>"#,
            self.class("fill"),
            path.to_svg_d(),
            escape_xml(colour)
        );
        self.elements.push(element);
    }

    fn stroke_path(&mut self, path: &Path, stroke: &Stroke) {
        if path.is_empty() || stroke.width <= 0.0 {
            return;
        }
        let element = format!(
            r#"<path {} d="{}" fill="none"{}/>"#,
            self.class("stroke"),
            path.to_svg_d(),
            stroke_attributes(stroke)
        );
        self.elements.push(element);
    }

    fn fill_circle(&mut self, centre: Point, radius: f64, colour: &str) {
        let element = format!(
            r#"<circle {} cx="{}" cy="{}" r="{}" fill="{}"/>"#,
            self.class("fill"),
            num(centre.x),
            num(centre.y),
            num(radius),
            escape_xml(colour)
        );
        self.elements.push(element);
    }

    fn fill_text(&mut self, text: &str, at: Point, font: &Font, colour: &str) {
        if text.is_empty() {
            return;
        }
        let element = format!(
            r#"<text {} x="{}" y="{}"{} fill="{}" xml:space="preserve">{}</text>"#,
            self.class("text"),
            num(at.x),
            num(at.y),
            font_attributes(font),
            escape_xml(colour),
            escape_xml(text)
        );
        self.elements.push(element);
    }
}

fn stroke_attributes(stroke: &Stroke) -> String {
    let mut attrs = format!(
        r#" stroke="{}" stroke-width="{}""#,
        escape_xml(&stroke.colour),
        num(stroke.width)
    );
    // all-zero patterns draw solid
    if stroke.dash.iter().any(|d| *d > 0.0) {
        let pattern: Vec<String> = stroke.dash.iter().map(|d| num(*d)).collect();
        let _ = write!(attrs, r#" stroke-dasharray="{}""#, pattern.join(" "));
    }
    attrs
}

fn font_attributes(font: &Font) -> String {
    let mut attrs = format!(
        r#" font-family="{}" font-size="{}""#,
        escape_xml(&font.family),
        num(font.size_px)
    );
    if font.bold {
        attrs.push_str(r#" font-weight="bold""#);
    }
    if font.italic {
        attrs.push_str(r#" font-style="italic""#);
    }
    attrs
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
