//! Document model for sequence diagrams
//!
//! A document is a set of actors (the lanes) and an ordered list of lines.
//! Lines are kept lenient: anything that cannot be understood becomes a
//! recovery variant the layout engine renders as an error box, so a single
//! bad line never aborts the whole diagram.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Raw style overrides carried by an element or a `params` section
pub type StyleMap = Map<String, Value>;

/// Text given either as one string or as a list of lines
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Text {
    Single(String),
    Lines(Vec<String>),
}

impl Default for Text {
    fn default() -> Self {
        Text::Single(String::new())
    }
}

impl Text {
    /// Lines as given; a single string stays one line
    pub fn lines(&self) -> Vec<String> {
        match self {
            Text::Single(s) => vec![s.clone()],
            Text::Lines(lines) => lines.clone(),
        }
    }

    /// Lines with embedded newlines split out of single strings
    pub fn split_lines(&self) -> Vec<String> {
        match self {
            Text::Single(s) => s.split('\n').map(str::to_string).collect(),
            Text::Lines(lines) => lines.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Text::Single(s) => s.is_empty(),
            Text::Lines(lines) => lines.iter().all(String::is_empty),
        }
    }
}

/// Text with optional style overrides
///
/// Accepts a plain string, an array of lines, or an object
/// `{ "text": ..., <style keys> }`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyledText {
    pub text: Text,
    pub style: StyleMap,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StyledTextRepr {
    Plain(Text),
    Styled {
        #[serde(default)]
        text: Text,
        #[serde(flatten)]
        style: StyleMap,
    },
}

impl<'de> Deserialize<'de> for StyledText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match StyledTextRepr::deserialize(deserializer)? {
            StyledTextRepr::Plain(text) => StyledText {
                text,
                style: StyleMap::new(),
            },
            StyledTextRepr::Styled { text, style } => StyledText { text, style },
        })
    }
}

/// Only a literal `true` switches a flag on
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}

/// Only a literal `false` switches a flag off
fn flag_on<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(!matches!(Value::deserialize(deserializer)?, Value::Bool(false)))
}

/// Anything but a string or a list of strings counts as no text
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Text>, D::Error> {
    Ok(Text::deserialize(Value::deserialize(deserializer)?).ok())
}

fn on() -> bool {
    true
}

/// Arrowhead glyph drawn at the end of a return
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArrowStyle {
    #[default]
    Open,
    Fill,
    Cross,
    Empty,
}

impl ArrowStyle {
    fn from_value(value: &Value) -> Self {
        match value.as_str().map(str::to_lowercase).as_deref() {
            Some("fill") => ArrowStyle::Fill,
            Some("cross") => ArrowStyle::Cross,
            Some("empty") => ArrowStyle::Empty,
            _ => ArrowStyle::Open,
        }
    }
}

fn arrow_style<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ArrowStyle, D::Error> {
    Ok(ArrowStyle::from_value(&Value::deserialize(deserializer)?))
}

/// Declared participant
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ActorSpec {
    #[serde(default)]
    pub name: Option<Text>,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(flatten)]
    pub style: StyleMap,
}

/// Interaction between two actors, or a self-call when `from == to`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallLine {
    pub from: String,
    pub to: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub text: Option<Text>,
    #[serde(default)]
    pub comment: Option<StyledText>,
    #[serde(default, rename = "async", deserialize_with = "flag")]
    pub asynchronous: bool,
    #[serde(default, deserialize_with = "flag")]
    pub break_from_flow: bool,
    #[serde(default, deserialize_with = "flag")]
    pub break_to_flow: bool,
    #[serde(default, deserialize_with = "flag")]
    pub break_flow: bool,
    #[serde(flatten)]
    pub style: StyleMap,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnLine {
    pub from: String,
    pub to: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub text: Option<Text>,
    #[serde(default)]
    pub comment: Option<StyledText>,
    #[serde(default, deserialize_with = "arrow_style")]
    pub arrow: ArrowStyle,
    #[serde(default, deserialize_with = "flag")]
    pub reverse_from_arrow: bool,
    #[serde(default, deserialize_with = "flag")]
    pub continue_from_flow: bool,
    #[serde(default, deserialize_with = "flag")]
    pub break_to_flow: bool,
    #[serde(flatten)]
    pub style: StyleMap,
}

/// Call into a referenced sub-diagram, optionally answered back to `to`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceLine {
    pub from: String,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub text: Option<Text>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub return_text: Option<Text>,
    pub reference: Text,
    #[serde(default)]
    pub comment: Option<StyledText>,
    #[serde(default, rename = "async", deserialize_with = "flag")]
    pub asynchronous: bool,
    #[serde(default, deserialize_with = "flag")]
    pub break_from_flow: bool,
    #[serde(default, deserialize_with = "flag")]
    pub break_to_flow: bool,
    #[serde(default, rename = "return", deserialize_with = "flag")]
    pub dashed: bool,
    #[serde(flatten)]
    pub style: StyleMap,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminateLine {
    pub from: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub text: Option<Text>,
    #[serde(default)]
    pub terminatetxt: Option<Text>,
    #[serde(default)]
    pub comment: Option<StyledText>,
    #[serde(default, rename = "async", deserialize_with = "flag")]
    pub asynchronous: bool,
    #[serde(default = "on", deserialize_with = "flag_on")]
    pub break_from_flow: bool,
    #[serde(default, rename = "return", deserialize_with = "flag")]
    pub dashed: bool,
    #[serde(flatten)]
    pub style: StyleMap,
}

/// Rounded box centred on an actor, or on the diagram when no actor is named
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StateLine {
    #[serde(default)]
    pub actor: Option<String>,
    #[serde(default)]
    pub text: Option<Text>,
    #[serde(default)]
    pub comment: Option<StyledText>,
    #[serde(flatten)]
    pub style: StyleMap,
}

/// Vertical spacer; numeric fields stay raw so bad geometry can be reported
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BlankLine {
    #[serde(default)]
    pub height: Option<Value>,
    #[serde(default)]
    pub width: Option<Value>,
    #[serde(default)]
    pub xoffset: Option<Value>,
    #[serde(default)]
    pub comment: Option<StyledText>,
    #[serde(flatten)]
    pub style: StyleMap,
}

/// Combined fragment (`alt`, `loop`, `opt`...) enclosing nested lines
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FragmentLine {
    #[serde(default)]
    pub fragment_type: Option<String>,
    #[serde(default)]
    pub title: Option<StyledText>,
    #[serde(default)]
    pub condition: Option<StyledText>,
    #[serde(default)]
    pub lines: Vec<LineNode>,
    #[serde(default)]
    pub comment: Option<StyledText>,
    #[serde(flatten)]
    pub style: StyleMap,
}

/// Dashed divider inside the innermost fragment
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConditionLine {
    #[serde(default)]
    pub condition: Option<StyledText>,
    #[serde(default)]
    pub comment: Option<StyledText>,
    #[serde(flatten)]
    pub style: StyleMap,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    Blank(BlankLine),
    Fragment(FragmentLine),
    State(StateLine),
    Condition(ConditionLine),
    Call(CallLine),
    Return(ReturnLine),
    Reference(ReferenceLine),
    Terminate(TerminateLine),
    /// No `type` key
    Untyped,
    /// A `type` nobody draws
    Unrecognised(String),
    /// Known type whose fields do not fit
    Malformed { kind: String, reason: String },
}

impl Line {
    pub fn kind(&self) -> &str {
        match self {
            Line::Blank(_) => "blank",
            Line::Fragment(_) => "fragment",
            Line::State(_) => "state",
            Line::Condition(_) => "condition",
            Line::Call(_) => "call",
            Line::Return(_) => "return",
            Line::Reference(_) => "reference",
            Line::Terminate(_) => "terminate",
            Line::Untyped => "untyped",
            Line::Unrecognised(kind) => kind,
            Line::Malformed { kind, .. } => kind,
        }
    }

    /// Lines that consume a sequence number, drawable or not
    pub fn is_numbered(&self) -> bool {
        match self {
            Line::Call(_) | Line::Return(_) | Line::Reference(_) | Line::Terminate(_) => true,
            Line::Malformed { kind, .. } => {
                matches!(kind.as_str(), "call" | "return" | "reference" | "terminate")
            }
            _ => false,
        }
    }
}

/// A line together with the JSON it was read from
#[derive(Debug, Clone, PartialEq)]
pub struct LineNode {
    pub line: Line,
    pub source: Value,
}

impl LineNode {
    pub fn from_value(source: Value) -> Self {
        let kind = source
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_lowercase);
        let line = match kind.as_deref() {
            None => Line::Untyped,
            Some("blank") => typed(&source, "blank", Line::Blank),
            Some("fragment") => typed(&source, "fragment", Line::Fragment),
            Some("state") => typed(&source, "state", Line::State),
            Some("condition") => typed(&source, "condition", Line::Condition),
            Some("call") => typed(&source, "call", Line::Call),
            Some("return") => typed(&source, "return", Line::Return),
            Some("reference") => typed(&source, "reference", Line::Reference),
            Some("terminate") => typed(&source, "terminate", Line::Terminate),
            Some(other) => Line::Unrecognised(other.to_string()),
        };
        LineNode { line, source }
    }
}

fn typed<T: DeserializeOwned>(source: &Value, kind: &str, wrap: fn(T) -> Line) -> Line {
    match serde_json::from_value::<T>(source.clone()) {
        Ok(element) => wrap(element),
        Err(err) => Line::Malformed {
            kind: kind.to_string(),
            reason: err.to_string(),
        },
    }
}

impl<'de> Deserialize<'de> for LineNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(LineNode::from_value(Value::deserialize(deserializer)?))
    }
}

/// A whole diagram
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub actors: Vec<ActorSpec>,
    #[serde(default)]
    pub lines: Vec<LineNode>,
    #[serde(default)]
    pub title: Option<StyledText>,
    #[serde(default)]
    pub version: Option<StyledText>,
    #[serde(default)]
    pub description: Option<StyledText>,
    /// Document-level style defaults, keyed by element kind
    #[serde(default)]
    pub params: StyleMap,
}

/// Deepest fragment nesting in a line list
pub fn max_fragment_depth(lines: &[LineNode]) -> usize {
    lines
        .iter()
        .map(|node| match &node.line {
            Line::Fragment(fragment) => 1 + max_fragment_depth(&fragment.lines),
            _ => 0,
        })
        .max()
        .unwrap_or(0)
}

/// Number of lines anywhere in the tree that consume a sequence number
pub fn numbered_line_count(lines: &[LineNode]) -> usize {
    lines
        .iter()
        .map(|node| match &node.line {
            Line::Fragment(fragment) => numbered_line_count(&fragment.lines),
            Line::Reference(r) if r.to.is_some() && r.return_text.is_some() => 2,
            line if line.is_numbered() => 1,
            _ => 0,
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(value: Value) -> Line {
        LineNode::from_value(value).line
    }

    #[test]
    fn test_type_tag_is_case_insensitive() {
        let line = node(json!({"type": "CALL", "from": "a", "to": "b", "text": "hi"}));
        assert!(matches!(line, Line::Call(_)));
    }

    #[test]
    fn test_missing_type_is_untyped() {
        assert_eq!(node(json!({"from": "a"})), Line::Untyped);
        assert_eq!(node(json!("just a string")), Line::Untyped);
    }

    #[test]
    fn test_unknown_type_is_unrecognised() {
        assert_eq!(
            node(json!({"type": "note"})),
            Line::Unrecognised("note".to_string())
        );
    }

    #[test]
    fn test_call_without_from_is_malformed() {
        match node(json!({"type": "call", "to": "b"})) {
            Line::Malformed { kind, .. } => assert_eq!(kind, "call"),
            other => panic!("expected malformed, got {:?}", other),
        }
    }

    #[test]
    fn test_non_string_text_is_dropped() {
        let Line::Call(call) = node(json!({"type": "call", "from": "a", "to": "b", "text": 42})) else {
            panic!("expected call");
        };
        assert_eq!(call.text, None);
        let Line::Reference(r) = node(json!({
            "type": "reference", "from": "a", "to": "b", "reference": "Sub",
            "text": ["ok"], "returnText": {"x": 1}
        })) else {
            panic!("expected reference");
        };
        assert_eq!(r.text, Some(Text::Lines(vec!["ok".to_string()])));
        assert_eq!(r.return_text, None);
    }

    #[test]
    fn test_malformed_interactions_still_count() {
        let lines: Vec<LineNode> = serde_json::from_value(json!([
            {"type": "call", "from": "a"},
            {"type": "terminate"},
            {"type": "state", "actor": 3},
            {"type": "return", "from": "b", "to": "a"}
        ]))
        .unwrap();
        assert!(lines[0].line.is_numbered());
        assert!(!lines[2].line.is_numbered());
        assert_eq!(numbered_line_count(&lines), 3);
    }

    #[test]
    fn test_flags_only_accept_literal_true() {
        let line = node(json!({
            "type": "call", "from": "a", "to": "b",
            "async": "true", "breakFromFlow": true, "breakToFlow": 1
        }));
        let Line::Call(call) = line else {
            panic!("expected call");
        };
        assert!(!call.asynchronous);
        assert!(call.break_from_flow);
        assert!(!call.break_to_flow);
    }

    #[test]
    fn test_terminate_breaks_flow_unless_false() {
        let Line::Terminate(t) = node(json!({"type": "terminate", "from": "a"})) else {
            panic!("expected terminate");
        };
        assert!(t.break_from_flow);
        let Line::Terminate(t) = node(json!({"type": "terminate", "from": "a", "breakFromFlow": false}))
        else {
            panic!("expected terminate");
        };
        assert!(!t.break_from_flow);
    }

    #[test]
    fn test_style_keys_are_kept() {
        let Line::State(state) = node(json!({"type": "state", "text": "x", "bgColour": "rgb(1,2,3)"}))
        else {
            panic!("expected state");
        };
        assert_eq!(state.style.get("bgColour"), Some(&json!("rgb(1,2,3)")));
    }

    #[test]
    fn test_styled_text_forms() {
        let plain: StyledText = serde_json::from_value(json!("note")).unwrap();
        assert_eq!(plain.text, Text::Single("note".into()));
        let lines: StyledText = serde_json::from_value(json!(["a", "b"])).unwrap();
        assert_eq!(lines.text.lines(), vec!["a", "b"]);
        let styled: StyledText =
            serde_json::from_value(json!({"text": "c", "fontSizePx": 9})).unwrap();
        assert_eq!(styled.text, Text::Single("c".into()));
        assert_eq!(styled.style.get("fontSizePx"), Some(&json!(9)));
    }

    #[test]
    fn test_arrow_style_is_lenient() {
        let Line::Return(r) =
            node(json!({"type": "return", "from": "a", "to": "b", "arrow": "Cross"}))
        else {
            panic!("expected return");
        };
        assert_eq!(r.arrow, ArrowStyle::Cross);
        let Line::Return(r) = node(json!({"type": "return", "from": "a", "to": "b", "arrow": 3}))
        else {
            panic!("expected return");
        };
        assert_eq!(r.arrow, ArrowStyle::Open);
    }

    #[test]
    fn test_fragment_depth_and_numbering() {
        let doc: Document = serde_json::from_value(json!({
            "actors": [],
            "lines": [
                {"type": "call", "from": "a", "to": "b"},
                {"type": "fragment", "lines": [
                    {"type": "fragment", "lines": [
                        {"type": "return", "from": "b", "to": "a"}
                    ]},
                    {"type": "reference", "from": "a", "to": "b",
                     "reference": "x", "returnText": "back"}
                ]},
                {"type": "state", "text": "s"}
            ]
        }))
        .unwrap();
        assert_eq!(max_fragment_depth(&doc.lines), 2);
        assert_eq!(numbered_line_count(&doc.lines), 4);
    }

    #[test]
    fn test_text_split_lines() {
        assert_eq!(Text::Single("a\nb".into()).split_lines(), vec!["a", "b"]);
        assert_eq!(Text::Single("a\nb".into()).lines(), vec!["a\nb"]);
    }
}
