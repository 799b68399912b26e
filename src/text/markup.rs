//! Inline markup lexer using logos
//!
//! Recognised tags are case-insensitive. Anything else between angle
//! brackets, and any stray `<`, is kept as literal text.

use logos::{Lexer, Logos};

#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token {
    #[regex("<[bB]>", priority = 10)]
    Bold,
    #[regex("</[bB]>", priority = 10)]
    BoldEnd,
    #[regex("<[iI]>", priority = 10)]
    Italic,
    #[regex("</[iI]>", priority = 10)]
    ItalicEnd,
    #[regex("<[hH][aA][nN][gG]>", priority = 10)]
    Hang,

    #[regex(
        r"<[rR][gG][bB]\( *[0-9]{1,3} *, *[0-9]{1,3} *, *[0-9]{1,3} *\) *>",
        rgb_colour,
        priority = 10
    )]
    Colour(String),
    #[regex("</[rR][gG][bB]>", priority = 10)]
    ColourEnd,

    #[regex(r"<[pP][xX][0-9]{1,3} *>", px_size, priority = 10)]
    Size(f64),
    #[regex("</[pP][xX]>", priority = 10)]
    SizeEnd,
    #[regex(r"<[sS][zZ][+\-]{1,3} *>", size_step, priority = 10)]
    SizeStep(f64),

    #[regex(r"<[fF][oO][nN][tT] *= *[a-zA-Z\-]+ *>", font_name, priority = 10)]
    Font(String),
    #[regex("</[fF][oO][nN][tT]>", priority = 10)]
    FontEnd,

    #[regex("[^<]+", literal)]
    #[regex("<[^<>]*>", literal, priority = 1)]
    #[token("<", literal)]
    Text(String),
}

fn literal(lex: &mut Lexer<Token>) -> String {
    lex.slice().to_string()
}

/// Body of a tag without its angle brackets
fn tag_body<'s>(lex: &Lexer<'s, Token>) -> &'s str {
    let slice = lex.slice();
    slice[1..slice.len() - 1].trim()
}

fn rgb_colour(lex: &mut Lexer<Token>) -> String {
    tag_body(lex)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase()
}

fn px_size(lex: &mut Lexer<Token>) -> Option<f64> {
    tag_body(lex)[2..].trim().parse().ok()
}

/// `+` grows and `-` shrinks by 2px per sign; mixed signs do nothing
fn size_step(lex: &mut Lexer<Token>) -> f64 {
    let signs = tag_body(lex)[2..].trim();
    let steps = signs.len() as f64;
    if signs.chars().all(|c| c == '+') {
        2.0 * steps
    } else if signs.chars().all(|c| c == '-') {
        -2.0 * steps
    } else {
        0.0
    }
}

fn font_name(lex: &mut Lexer<Token>) -> String {
    let body = tag_body(lex);
    body.split_once('=')
        .map(|(_, name)| name.trim().to_string())
        .unwrap_or_default()
}

/// Split one line of text into markup tokens
///
/// Whatever the lexer cannot match is passed through as text.
pub fn tokenize(line: &str) -> Vec<Token> {
    Token::lexer(line)
        .spanned()
        .map(|(token, span)| token.unwrap_or_else(|_| Token::Text(line[span].to_string())))
        .collect()
}

/// Turn `&lt;`/`&gt;` into angle brackets; `\&lt;` and `\&gt;` stay as written
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(idx) = rest.find(['\\', '&']) {
        out.push_str(&rest[..idx]);
        rest = &rest[idx..];
        if let Some(tail) = rest.strip_prefix("\\&lt;") {
            out.push_str("&lt;");
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("\\&gt;") {
            out.push_str("&gt;");
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("&lt;") {
            out.push('<');
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("&gt;") {
            out.push('>');
            rest = tail;
        } else {
            let ch = rest.chars().next().unwrap_or_default();
            out.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
    }
    out.push_str(rest);
    out
}

/// Markup macro of the form `<name>=replacement`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub pattern: String,
    pub replacement: String,
}

impl Tag {
    /// Parse `"<name>=replacement"`; the replacement may itself contain `=`
    pub fn parse(definition: &str) -> Option<Tag> {
        let split = definition.find(">=")?;
        let pattern = &definition[..=split];
        if !pattern.starts_with('<') || pattern.len() <= 2 {
            return None;
        }
        Some(Tag {
            pattern: pattern.to_string(),
            replacement: definition[split + 2..].to_string(),
        })
    }
}

/// Replace every occurrence of each tag, in declaration order
pub fn apply_tags(tags: &[Tag], line: &str) -> String {
    tags.iter().fold(line.to_string(), |acc, tag| {
        acc.replace(&tag.pattern, &tag.replacement)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_formatting_tags() {
        assert_eq!(
            tokenize("<b>Hi</B> <I>there</i>"),
            vec![
                Token::Bold,
                Token::Text("Hi".into()),
                Token::BoldEnd,
                Token::Text(" ".into()),
                Token::Italic,
                Token::Text("there".into()),
                Token::ItalicEnd,
            ]
        );
    }

    #[test]
    fn test_tokens_snapshot() {
        insta::assert_debug_snapshot!(tokenize("<hang>x"), @r###"
        [
            Hang,
            Text(
                "x",
            ),
        ]
        "###);
    }

    #[test]
    fn test_colour_and_size_tags() {
        assert_eq!(
            tokenize("<rgb( 255, 0,0 )>r</rgb><px20>big</px><sz++>"),
            vec![
                Token::Colour("rgb(255,0,0)".into()),
                Token::Text("r".into()),
                Token::ColourEnd,
                Token::Size(20.0),
                Token::Text("big".into()),
                Token::SizeEnd,
                Token::SizeStep(4.0),
            ]
        );
        assert_eq!(tokenize("<sz--->"), vec![Token::SizeStep(-6.0)]);
        assert_eq!(tokenize("<sz+->"), vec![Token::SizeStep(0.0)]);
    }

    #[test]
    fn test_font_tag() {
        assert_eq!(
            tokenize("<font=monospace>code</font>"),
            vec![
                Token::Font("monospace".into()),
                Token::Text("code".into()),
                Token::FontEnd,
            ]
        );
    }

    #[test]
    fn test_unknown_tags_are_literal() {
        assert_eq!(
            tokenize("a <u>b</u>"),
            vec![
                Token::Text("a ".into()),
                Token::Text("<u>".into()),
                Token::Text("b".into()),
                Token::Text("</u>".into()),
            ]
        );
    }

    fn plain(line: &str) -> String {
        tokenize(line)
            .into_iter()
            .map(|token| match token {
                Token::Text(text) => text,
                other => panic!("expected only text, got {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_stray_brackets_keep_following_text() {
        assert_eq!(plain("x < y"), "x < y");
        assert_eq!(plain("if a<b and c > d"), "if a<b and c > d");
        assert_eq!(plain("<<"), "<<");
        assert_eq!(plain("tail <"), "tail <");
        assert_eq!(plain("<px> and <rgb(1,2)>"), "<px> and <rgb(1,2)>");
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("&lt;b&gt;"), "<b>");
        assert_eq!(unescape("\\&lt;b\\&gt;"), "&lt;b&gt;");
        assert_eq!(unescape("a & b \\ c"), "a & b \\ c");
    }

    #[test]
    fn test_tags_replace_every_occurrence() {
        let tags = vec![Tag::parse("<warn>=<rgb(255,0,0)><b>").unwrap()];
        assert_eq!(
            apply_tags(&tags, "<warn>x <warn>y"),
            "<rgb(255,0,0)><b>x <rgb(255,0,0)><b>y"
        );
    }

    #[test]
    fn test_tag_definition_must_be_bracketed() {
        assert!(Tag::parse("warn=x").is_none());
        assert!(Tag::parse("<>=x").is_none());
        assert_eq!(
            Tag::parse("<eq>=a=b").map(|t| t.replacement),
            Some("a=b".to_string())
        );
    }
}
