//! SVG output options

#[derive(Debug, Clone, PartialEq)]
pub struct SvgConfig {
    /// Emit `<?xml ...?>` ahead of the root element
    pub xml_declaration: bool,

    /// Spaces per nesting level; `None` writes the document on a single line
    pub indent: Option<usize>,

    /// Prepended to the `fill`, `stroke` and `text` class names; may be empty
    pub class_prefix: String,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            xml_declaration: true,
            indent: Some(2),
            class_prefix: "sq-".to_string(),
        }
    }
}

impl SvgConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-line output, e.g. for inlining into HTML
    pub fn compact() -> Self {
        Self {
            indent: None,
            ..Self::default()
        }
    }

    pub fn with_xml_declaration(mut self, declaration: bool) -> Self {
        self.xml_declaration = declaration;
        self
    }

    pub fn with_indent(mut self, spaces: usize) -> Self {
        self.indent = Some(spaces);
        self
    }

    pub fn with_class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.class_prefix = prefix.into();
        self
    }
}
