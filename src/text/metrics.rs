//! Text block measurement
//!
//! Lines are measured run by run: every markup change starts a new run with
//! its own font and colour. Bold, italic, colour and font carry over from
//! one line to the next until cleared; size changes and `<hang>` only apply
//! to the line they appear on.

use crate::renderer::{Font, TextMeasure};
use crate::style::{is_valid_colour, TextStyle};

use super::markup::{apply_tags, tokenize, unescape, Tag, Token};

/// Smallest size a run can shrink to through `<sz->` steps
const MIN_FONT_SIZE: f64 = 1.0;

/// One contiguous piece of text in a single font and colour
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub font: Font,
    pub colour: String,
    /// Offset of the run from the start of its line
    pub start_offset: f64,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineMetrics {
    pub runs: Vec<TextRun>,
    pub width: f64,
    /// Size of the tallest run on the line
    pub height: f64,
    pub hang: bool,
}

/// Measured block of lines, padding included
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub width: f64,
    pub height: f64,
    pub lines: Vec<LineMetrics>,
    pub inter_line_gap: f64,
}

/// Formatting that persists between lines
#[derive(Debug, Clone)]
struct Carry {
    family: String,
    size: f64,
    bold: bool,
    italic: bool,
    colour: String,
}

impl Carry {
    fn from_style(style: &TextStyle) -> Self {
        Self {
            family: style.font_family.clone(),
            size: style.font_size_px,
            bold: style.bold,
            italic: style.italic,
            colour: style.fg_colour.clone(),
        }
    }
}

/// Apply a `!!key=value` line; returns false when the line is ordinary text
fn apply_directive(line: &str, defaults: &mut Carry, carry: &mut Carry, style: &TextStyle) -> bool {
    let Some(rest) = line.strip_prefix("!!") else {
        return false;
    };
    let Some((key, value)) = rest.split_once('=') else {
        return false;
    };
    match key {
        "bold" => defaults.bold = value.eq_ignore_ascii_case("true"),
        "italic" => defaults.italic = value.eq_ignore_ascii_case("true"),
        "fontFamily" => {
            defaults.family = if value.is_empty() {
                style.font_family.clone()
            } else {
                value.to_string()
            }
        }
        "fontSizePx" => {
            defaults.size = value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| *v > 0.0)
                .map(f64::trunc)
                .unwrap_or(style.font_size_px)
        }
        "fgColour" => {
            defaults.colour = if is_valid_colour(value) {
                value.to_string()
            } else {
                style.fg_colour.clone()
            }
        }
        _ => return false,
    }
    *carry = defaults.clone();
    true
}

fn measure_line<M: TextMeasure + ?Sized>(
    measurer: Option<&M>,
    line: &str,
    defaults: &Carry,
    carry: &mut Carry,
) -> LineMetrics {
    let mut size = defaults.size;
    let mut height = defaults.size;
    let mut hang = false;
    let mut width = 0.0;
    let mut runs = Vec::new();

    for token in tokenize(line) {
        match token {
            Token::Bold => carry.bold = true,
            Token::BoldEnd => carry.bold = false,
            Token::Italic => carry.italic = true,
            Token::ItalicEnd => carry.italic = false,
            Token::Hang => hang = true,
            Token::Size(px) => {
                size = px.max(MIN_FONT_SIZE);
                height = height.max(size);
            }
            Token::SizeStep(step) => {
                size = (size + step).max(MIN_FONT_SIZE);
                height = height.max(size);
            }
            Token::SizeEnd => size = defaults.size,
            Token::Font(family) => carry.family = family,
            Token::FontEnd => carry.family = defaults.family.clone(),
            Token::Colour(colour) => {
                if is_valid_colour(&colour) {
                    carry.colour = colour;
                }
            }
            Token::ColourEnd => carry.colour = defaults.colour.clone(),
            Token::Text(text) => {
                let Some(measurer) = measurer else {
                    continue;
                };
                let text = unescape(&text);
                let font = Font {
                    family: carry.family.clone(),
                    size_px: size,
                    bold: carry.bold,
                    italic: carry.italic,
                };
                let run_width = measurer.measure_text(&text, &font);
                runs.push(TextRun {
                    text,
                    font,
                    colour: carry.colour.clone(),
                    start_offset: width,
                    width: run_width,
                });
                width += run_width;
            }
        }
    }

    LineMetrics {
        runs,
        width: width.ceil(),
        height,
        hang,
    }
}

/// Measure a block of lines
///
/// Without a measurer only heights are meaningful; widths are zero apart
/// from padding.
pub fn measure<M: TextMeasure + ?Sized>(
    measurer: Option<&M>,
    style: &TextStyle,
    lines: &[String],
    tags: &[Tag],
) -> TextBlock {
    let mut defaults = Carry::from_style(style);
    let mut carry = defaults.clone();
    let mut measured = Vec::new();

    for line in lines {
        let line = apply_tags(tags, line);
        if apply_directive(&line, &mut defaults, &mut carry, style) {
            continue;
        }
        measured.push(measure_line(measurer, &line, &defaults, &mut carry));
    }

    let gap = if style.spacing > 1.0 {
        style.font_size_px * (style.spacing - 1.0)
    } else {
        0.0
    };

    let mut width: f64 = 0.0;
    let mut height = 0.0;
    let mut hang_offset = 0.0;
    let mut previous: Option<&LineMetrics> = None;
    for line in &measured {
        match previous {
            Some(prev) if !prev.hang && line.hang => {
                hang_offset = prev.width;
                width = width.max(line.width + hang_offset);
                if line.height > prev.height {
                    height += line.height - prev.height;
                }
            }
            Some(prev) if prev.hang && line.hang => {
                width = width.max(line.width + hang_offset);
                height += line.height + gap;
            }
            _ => {
                width = width.max(line.width);
                height += line.height + gap;
                hang_offset = 0.0;
            }
        }
        previous = Some(line);
    }

    TextBlock {
        width: (width + style.padding).ceil(),
        height: (height + style.vertical_padding()).ceil(),
        lines: measured,
        inter_line_gap: gap,
    }
}

/// Block height without a surface to measure widths on
pub fn measure_height(style: &TextStyle, lines: &[String], tags: &[Tag]) -> f64 {
    measure::<dyn TextMeasure>(None, style, lines, tags).height
}
