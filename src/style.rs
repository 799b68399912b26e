//! Style resolution
//!
//! Every visual property is looked up in three tiers: the element's own
//! overrides, the document-level `params` section for its kind, and finally
//! a built-in default. A value only wins its tier when it passes the
//! property's validator.

use serde_json::Value;

use crate::parser::StyleMap;

/// Read-only view over a style map that may be absent
#[derive(Debug, Clone, Copy, Default)]
pub struct Props<'a>(Option<&'a StyleMap>);

impl<'a> Props<'a> {
    pub fn new(map: &'a StyleMap) -> Self {
        Props(Some(map))
    }

    pub fn empty() -> Self {
        Props(None)
    }

    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.0.and_then(|map| map.get(key))
    }

    /// Nested object under `key`
    pub fn section(&self, key: &str) -> Props<'a> {
        Props(self.get(key).and_then(Value::as_object))
    }

    pub fn is_empty(&self) -> bool {
        self.0.map_or(true, StyleMap::is_empty)
    }
}

/// First valid of element value, document value, fallback
pub fn resolve<T>(
    local: Option<&Value>,
    document: Option<&Value>,
    fallback: T,
    validator: impl Fn(&Value) -> Option<T>,
) -> T {
    local
        .and_then(&validator)
        .or_else(|| document.and_then(&validator))
        .unwrap_or(fallback)
}

/// `rgb(r,g,b)` with channels 0..=255, or `rgba(r,g,b,a)` with a in [0,1]
pub fn is_valid_colour(colour: &str) -> bool {
    let compact: String = colour.chars().filter(|c| !c.is_whitespace()).collect();
    let compact = compact.to_ascii_lowercase();

    let (body, with_alpha) = if let Some(rest) = compact.strip_prefix("rgba(") {
        (rest, true)
    } else if let Some(rest) = compact.strip_prefix("rgb(") {
        (rest, false)
    } else {
        return false;
    };
    let Some(body) = body.strip_suffix(')') else {
        return false;
    };

    let parts: Vec<&str> = body.split(',').collect();
    if parts.len() != if with_alpha { 4 } else { 3 } {
        return false;
    }
    let channels_ok = parts[..3].iter().all(|p| {
        !p.is_empty()
            && p.len() <= 3
            && p.chars().all(|c| c.is_ascii_digit())
            && p.parse::<u16>().map_or(false, |v| v <= 255)
    });
    if !channels_ok {
        return false;
    }
    if with_alpha {
        return parts[3]
            .parse::<f64>()
            .map_or(false, |a| (0.0..=1.0).contains(&a));
    }
    true
}

/// Fully transparent `rgba(...)` colours are not worth a fill
pub fn is_transparent(colour: &str) -> bool {
    let compact: String = colour.chars().filter(|c| !c.is_whitespace()).collect();
    compact
        .strip_suffix(')')
        .and_then(|c| c.rsplit(',').next())
        .filter(|_| compact.to_ascii_lowercase().starts_with("rgba("))
        .and_then(|a| a.parse::<f64>().ok())
        .map_or(false, |a| a == 0.0)
}

pub fn colour(value: &Value) -> Option<String> {
    value
        .as_str()
        .filter(|s| is_valid_colour(s))
        .map(|s| s.trim().to_string())
}

pub fn positive(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite() && *v > 0.0)
}

pub fn non_negative(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite() && *v >= 0.0)
}

pub fn at_least(min: f64) -> impl Fn(&Value) -> Option<f64> {
    move |value| value.as_f64().filter(|v| v.is_finite() && *v >= min)
}

/// Arrays of numbers only; an empty array is a valid solid dash
pub fn all_numeric(value: &Value) -> Option<Vec<f64>> {
    value.as_array()?.iter().map(Value::as_f64).collect()
}

pub fn non_empty_string(value: &Value) -> Option<String> {
    value
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn boolean(value: &Value) -> Option<bool> {
    value.as_bool()
}

/// Generic families plus any fonts registered with the layout config
#[derive(Debug, Clone, Default)]
pub struct FontSet {
    registered: Vec<String>,
}

impl FontSet {
    pub const GENERIC: [&'static str; 3] = ["monospace", "sans-serif", "serif"];

    pub fn new(registered: impl IntoIterator<Item = String>) -> Self {
        Self {
            registered: registered.into_iter().collect(),
        }
    }

    pub fn contains(&self, family: &str) -> bool {
        Self::GENERIC.contains(&family) || self.registered.iter().any(|f| f == family)
    }

    pub fn validate(&self, value: &Value) -> Option<String> {
        value
            .as_str()
            .filter(|family| self.contains(family))
            .map(str::to_string)
    }
}

/// Horizontal alignment of text lines inside their box
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Centre,
    Right,
}

impl Align {
    fn from_value(value: &Value) -> Option<Align> {
        match non_empty_string(value)?.to_lowercase().as_str() {
            "left" => Some(Align::Left),
            "center" | "centre" => Some(Align::Centre),
            "right" => Some(Align::Right),
            _ => None,
        }
    }
}

/// Resolved text and box style
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_family: String,
    pub font_size_px: f64,
    pub padding: f64,
    /// Vertical padding; falls back to `padding`
    pub vpadding: Option<f64>,
    pub spacing: f64,
    pub fg_colour: String,
    pub bg_colour: String,
    pub align: Align,
    pub border_colour: String,
    pub border_width: f64,
    pub border_dash: Vec<f64>,
    pub bold: bool,
    pub italic: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            font_size_px: 14.0,
            padding: 10.0,
            vpadding: None,
            spacing: 1.2,
            fg_colour: "rgb(0,0,0)".to_string(),
            bg_colour: "rgba(0,0,0,0)".to_string(),
            align: Align::Left,
            border_colour: "rgb(0,0,0)".to_string(),
            border_width: 0.0,
            border_dash: Vec::new(),
            bold: false,
            italic: false,
        }
    }
}

impl TextStyle {
    /// Resolve every text property against element and document tiers
    pub fn resolve(fonts: &FontSet, local: Props, document: Props, fallback: &TextStyle) -> Self {
        let pick = |key: &str| (local.get(key), document.get(key));

        let (l, d) = pick("fontFamily");
        let font_family = resolve(l, d, fallback.font_family.clone(), |v| fonts.validate(v));
        let (l, d) = pick("fontSizePx");
        let font_size_px = resolve(l, d, fallback.font_size_px, positive);
        let (l, d) = pick("padding");
        let padding = resolve(l, d, fallback.padding, non_negative);
        let (l, d) = pick("vpadding");
        let vpadding = resolve(l, d, fallback.vpadding, |v| non_negative(v).map(Some));
        let (l, d) = pick("spacing");
        let spacing = resolve(l, d, fallback.spacing, positive);
        let (l, d) = pick("fgColour");
        let fg_colour = resolve(l, d, fallback.fg_colour.clone(), colour);
        let (l, d) = pick("bgColour");
        let bg_colour = resolve(l, d, fallback.bg_colour.clone(), colour);
        let (l, d) = pick("align");
        let align = resolve(l, d, fallback.align, Align::from_value);
        let (l, d) = pick("borderColour");
        let border_colour = resolve(l, d, fallback.border_colour.clone(), colour);
        let (l, d) = pick("borderWidth");
        let border_width = resolve(l, d, fallback.border_width, non_negative);
        let (l, d) = pick("borderDash");
        let border_dash = resolve(l, d, fallback.border_dash.clone(), all_numeric);

        Self {
            font_family,
            font_size_px,
            padding,
            vpadding,
            spacing,
            fg_colour,
            bg_colour,
            align,
            border_colour,
            border_width,
            border_dash,
            bold: fallback.bold,
            italic: fallback.italic,
        }
    }

    pub fn vertical_padding(&self) -> f64 {
        self.vpadding.unwrap_or(self.padding)
    }

    pub fn with_background(mut self, colour: &str) -> Self {
        self.bg_colour = colour.to_string();
        self
    }

    pub fn with_foreground(mut self, colour: &str) -> Self {
        self.fg_colour = colour.to_string();
        self
    }

    /// Header lines (title, version, description)
    pub fn header() -> Self {
        Self::default()
    }

    pub fn actor() -> Self {
        Self {
            font_size_px: 18.0,
            padding: 18.0,
            spacing: 1.1,
            align: Align::Centre,
            bg_colour: "rgb(204,255,153)".to_string(),
            border_width: 1.0,
            ..Self::default()
        }
    }

    /// Label of a call between two lanes
    pub fn call() -> Self {
        Self {
            padding: 20.0,
            spacing: 1.0,
            ..Self::default()
        }
    }

    /// Label of a call from a lane to itself
    pub fn self_call() -> Self {
        Self {
            vpadding: Some(0.0),
            ..Self::call()
        }
    }

    pub fn return_call() -> Self {
        Self {
            padding: 15.0,
            spacing: 1.0,
            ..Self::default()
        }
    }

    pub fn reference_box() -> Self {
        Self {
            padding: 15.0,
            spacing: 1.0,
            bg_colour: "rgba(80,160,240,1)".to_string(),
            border_width: 1.0,
            ..Self::default()
        }
    }

    pub fn terminate_box() -> Self {
        Self {
            fg_colour: "rgb(255,255,255)".to_string(),
            bg_colour: "rgb(0,0,0)".to_string(),
            spacing: 1.0,
            border_width: 1.0,
            ..Self::default()
        }
    }

    pub fn state() -> Self {
        Self {
            spacing: 1.0,
            bg_colour: "rgb(255,255,0)".to_string(),
            border_width: 1.0,
            ..Self::default()
        }
    }

    pub fn comment() -> Self {
        Self {
            padding: 15.0,
            spacing: 1.0,
            bg_colour: "rgb(0,255,50)".to_string(),
            border_width: 1.0,
            ..Self::default()
        }
    }

    pub fn fragment_title() -> Self {
        Self {
            spacing: 1.0,
            ..Self::default()
        }
    }

    pub fn fragment_condition() -> Self {
        Self {
            font_size_px: 12.0,
            spacing: 1.0,
            ..Self::default()
        }
    }
}

/// Resolves one element's non-text properties against its document section
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    pub local: Props<'a>,
    pub document: Props<'a>,
}

impl<'a> Resolver<'a> {
    pub fn new(local: Props<'a>, document: Props<'a>) -> Self {
        Self { local, document }
    }

    pub fn get<T>(&self, key: &str, fallback: T, validator: impl Fn(&Value) -> Option<T>) -> T {
        resolve(self.local.get(key), self.document.get(key), fallback, validator)
    }

    pub fn colour(&self, key: &str, fallback: &str) -> String {
        self.get(key, fallback.to_string(), colour)
    }

    pub fn positive(&self, key: &str, fallback: f64) -> f64 {
        self.get(key, fallback, positive)
    }

    pub fn non_negative(&self, key: &str, fallback: f64) -> f64 {
        self.get(key, fallback, non_negative)
    }

    pub fn dash(&self, key: &str, fallback: &[f64]) -> Vec<f64> {
        self.get(key, fallback.to_vec(), all_numeric)
    }

    pub fn flag(&self, key: &str, fallback: bool) -> bool {
        self.get(key, fallback, boolean)
    }
}
