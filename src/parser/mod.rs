//! Reader for JSON and YAML diagram documents

pub mod ast;

pub use ast::*;

use serde_json::Value;

use crate::error::{ParseError, Span};

/// Source notation of a document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputFormat {
    #[default]
    Json,
    Yaml,
}

/// Parse a JSON document
pub fn parse(source: &str) -> Result<Document, ParseError> {
    parse_as(source, InputFormat::Json)
}

/// Parse a document in the given notation
pub fn parse_as(source: &str, format: InputFormat) -> Result<Document, ParseError> {
    let value: Value = match format {
        InputFormat::Json => serde_json::from_str(source).map_err(|err| ParseError::Syntax {
            span: span_at(source, err.line(), err.column()),
            message: strip_position(&err.to_string()),
        })?,
        InputFormat::Yaml => serde_yaml::from_str(source).map_err(|err| {
            let start = err.location().map(|l| l.index()).unwrap_or(0);
            ParseError::Syntax {
                span: clamp_span(source, start),
                message: err.to_string(),
            }
        })?,
    };

    if !value.is_object() {
        return Err(ParseError::NotAnObject);
    }

    serde_json::from_value(value).map_err(|err| ParseError::Structure {
        message: err.to_string(),
    })
}

/// Byte span of one character at a 1-based line and column
fn span_at(source: &str, line: usize, column: usize) -> Span {
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    clamp_span(source, line_start + column.saturating_sub(1))
}

fn clamp_span(source: &str, start: usize) -> Span {
    let start = start.min(source.len());
    let end = (start + 1).min(source.len());
    start..end
}

/// serde_json appends "at line X column Y"; the span already says where
fn strip_position(message: &str) -> String {
    match message.rfind(" at line ") {
        Some(idx) => message[..idx].to_string(),
        None => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_document() {
        let doc = parse(
            r#"{"actors": [{"name": "A", "alias": "a"}],
                "lines": [{"type": "state", "actor": "a", "text": "idle"}]}"#,
        )
        .expect("Should parse");
        assert_eq!(doc.actors.len(), 1);
        assert_eq!(doc.lines.len(), 1);
        assert!(matches!(doc.lines[0].line, Line::State(_)));
    }

    #[test]
    fn test_parse_yaml_document() {
        let source = "actors:\n  - name: A\n    alias: a\nlines:\n  - type: call\n    from: a\n    to: a\n    text: self\n";
        let doc = parse_as(source, InputFormat::Yaml).expect("Should parse");
        assert_eq!(doc.actors[0].alias.as_deref(), Some("a"));
        assert!(matches!(doc.lines[0].line, Line::Call(_)));
    }

    #[test]
    fn test_syntax_error_has_span() {
        let source = "{\n  \"actors\": [,]\n}";
        match parse(source) {
            Err(ParseError::Syntax { span, message }) => {
                assert!(span.start > source.find('[').unwrap_or(0));
                assert!(span.end <= source.len());
                assert!(!message.contains("at line"));
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_top_level_must_be_object() {
        assert!(matches!(parse("[1, 2]"), Err(ParseError::NotAnObject)));
    }

    #[test]
    fn test_bad_actor_list_is_structural() {
        assert!(matches!(
            parse(r#"{"actors": 5}"#),
            Err(ParseError::Structure { .. })
        ));
    }
}
