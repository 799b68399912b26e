//! Inline markup and text measurement

pub mod markup;
pub mod metrics;

pub use markup::{apply_tags, tokenize, unescape, Tag, Token};
pub use metrics::{measure, measure_height, LineMetrics, TextBlock, TextRun};
