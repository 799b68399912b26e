//! Sequencer - sequence diagrams from JSON or YAML documents
//!
//! This library provides a document reader, a layout engine and an SVG
//! renderer for UML-style sequence diagrams: actors side by side, calls and
//! returns between their timelines, nested fragments, states and comments.
//!
//! # Example
//!
//! ```rust
//! use sequencer::render;
//!
//! let svg = render(r#"{
//!     "actors": [{"name": "Client", "alias": "c"}, {"name": "Server", "alias": "s"}],
//!     "lines": [{"type": "call", "from": "c", "to": "s", "text": "ping"}]
//! }"#).unwrap();
//! assert!(svg.contains("<svg"));
//! assert!(svg.contains("ping"));
//! ```

pub mod error;
pub mod layout;
pub mod parser;
pub mod renderer;
pub mod style;
pub mod stylesheet;
pub mod text;

use std::borrow::Cow;

pub use error::ParseError;
pub use layout::{LayoutConfig, LayoutError, LayoutResult};
pub use parser::{parse, parse_as, Document, InputFormat};
pub use renderer::{SvgConfig, SvgSurface};
pub use stylesheet::{Stylesheet, StylesheetError};

use thiserror::Error;
use tracing::debug;

/// Errors that can occur during the render pipeline
#[derive(Debug, Error)]
pub enum RenderError {
    /// Error while reading the document
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error during layout
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),

    /// Error while loading a stylesheet
    #[error("stylesheet error: {0}")]
    Stylesheet(#[from] StylesheetError),
}

/// Configuration for the complete render pipeline
#[derive(Debug, Clone, Default)]
pub struct RenderConfig {
    /// Layout configuration
    pub layout: LayoutConfig,
    /// SVG output configuration
    pub svg: SvgConfig,
    /// Defaults for whatever the document's `params` leaves unset
    pub stylesheet: Stylesheet,
    /// Notation of the source text
    pub format: InputFormat,
    /// Debug mode: rule and label every line with its y position and JSON
    pub debug: bool,
}

impl RenderConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the layout configuration
    pub fn with_layout(mut self, config: LayoutConfig) -> Self {
        self.layout = config;
        self
    }

    /// Set the SVG configuration
    pub fn with_svg(mut self, config: SvgConfig) -> Self {
        self.svg = config;
        self
    }

    /// Set the stylesheet
    pub fn with_stylesheet(mut self, stylesheet: Stylesheet) -> Self {
        self.stylesheet = stylesheet;
        self
    }

    /// Set the source notation
    pub fn with_format(mut self, format: InputFormat) -> Self {
        self.format = format;
        self
    }

    /// Enable or disable debug mode
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Render a JSON document to SVG with default configuration
pub fn render(source: &str) -> Result<String, RenderError> {
    render_with_config(source, RenderConfig::default())
}

/// Render a document to SVG with custom configuration
///
/// # Example
///
/// ```rust
/// use sequencer::{render_with_config, InputFormat, RenderConfig, SvgConfig};
///
/// let config = RenderConfig::new()
///     .with_format(InputFormat::Yaml)
///     .with_svg(SvgConfig::compact());
///
/// let svg = render_with_config("actors:\n  - {name: A, alias: a}\n", config).unwrap();
/// assert!(svg.starts_with("<?xml"));
/// ```
pub fn render_with_config(source: &str, config: RenderConfig) -> Result<String, RenderError> {
    let doc = parse_as(source, config.format)?;
    render_document(&doc, &config)
}

/// Lay out an already parsed document and return the SVG text
pub fn render_document(doc: &Document, config: &RenderConfig) -> Result<String, RenderError> {
    let (_, svg) = layout_document(doc, config)?;
    Ok(svg.build())
}

/// Lay out a document onto a fresh SVG surface
///
/// Returns the settled geometry alongside the drawn surface.
pub fn layout_document(
    doc: &Document,
    config: &RenderConfig,
) -> Result<(LayoutResult, SvgSurface), RenderError> {
    let doc = with_stylesheet(doc, &config.stylesheet);
    let (width, height) = config.layout.initial_size;
    let mut surface = SvgSurface::new(config.svg.clone(), width, height);

    let result = layout::compute(&doc, &config.layout, &mut surface, config.debug)?;
    debug!(
        width = result.width,
        height = result.height,
        attempts = result.attempts,
        elements = surface.element_count(),
        "diagram rendered"
    );
    Ok((result, surface))
}

fn with_stylesheet<'d>(doc: &'d Document, stylesheet: &Stylesheet) -> Cow<'d, Document> {
    if stylesheet.is_empty() {
        return Cow::Borrowed(doc);
    }
    let mut doc = doc.clone();
    stylesheet.apply(&mut doc.params);
    Cow::Owned(doc)
}
