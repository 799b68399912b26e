//! SVG output regression tests
//!
//! Rendering is deterministic: the same document must always produce the
//! same bytes, whatever the canvas growth loop had to do to get there.

use sequencer::{layout_document, parse, render, render_with_config, RenderConfig, SvgConfig};

const LOGIN: &str = r#"{
    "title": "Login",
    "version": "1.0",
    "description": ["How a user signs in", "with <b>two</b> steps"],
    "params": {"tags": ["<em>=<b><i>"]},
    "actors": [
        {"name": "Browser", "alias": "web"},
        {"name": ["Auth", "Service"], "alias": "auth", "bgColour": "rgb(200,220,255)"},
        {"name": "Store", "alias": "db"}
    ],
    "lines": [
        {"type": "call", "from": "web", "to": "auth", "text": "POST /login"},
        {
            "type": "fragment", "fragmentType": "alt", "title": "valid", "condition": "password ok",
            "lines": [
                {"type": "call", "from": "auth", "to": "db", "text": "load user", "comment": "cached"},
                {"type": "return", "from": "db", "to": "auth", "text": "user"},
                {"type": "condition", "condition": "otherwise"},
                {"type": "state", "actor": "auth", "text": "<em>locked"}
            ]
        },
        {"type": "return", "from": "auth", "to": "web", "text": "token", "arrow": "fill"},
        {"type": "terminate", "from": "web", "text": "done"}
    ]
}"#;

#[test]
fn test_render_is_byte_identical() {
    let first = render(LOGIN).expect("Should render");
    let second = render(LOGIN).expect("Should render");
    assert_eq!(first, second);
}

#[test]
fn test_svg_size_matches_settled_canvas() {
    let doc = parse(LOGIN).expect("Should parse");
    let (result, surface) = layout_document(&doc, &RenderConfig::default()).expect("Should lay out");
    assert!(result.attempts > 1);

    let svg = surface.build();
    let header = format!(
        r#"width="{}" height="{}" viewBox="0 0 {} {}""#,
        result.width, result.height, result.width, result.height
    );
    assert!(svg.contains(&header), "missing {header}");
}

#[test]
fn test_svg_structure() {
    let svg = render(LOGIN).expect("Should render");
    assert!(svg.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
    assert!(svg.ends_with("</svg>"));
    assert!(svg.contains(r#"class="sq-text""#));
    assert!(svg.contains(r#"fill="rgb(255,255,255)""#));
    assert!(svg.contains(r#"fill="rgb(200,220,255)""#));
    assert!(svg.contains(">1. POST /login</text>"));
    assert!(svg.contains(">alt valid</text>"));
    assert!(svg.contains(r#"font-style="italic""#));
    assert!(!svg.contains("&lt;em&gt;"));
}

#[test]
fn test_compact_output_has_no_newlines() {
    let config = RenderConfig::new().with_svg(SvgConfig::compact().with_xml_declaration(false));
    let svg = render_with_config(LOGIN, config).expect("Should render");
    assert!(svg.starts_with("<svg"));
    assert!(!svg.contains('\n'));
}
