//! Drawing backends
//!
//! The layout engine draws through the `DrawSurface` trait. `SvgSurface`
//! turns the calls into an SVG document; `RecordingSurface` keeps them as
//! plain values for inspection.

pub mod config;
pub mod path;
pub mod recording;
pub mod surface;
pub mod svg;

pub use config::SvgConfig;
pub use path::Path;
pub use recording::{DrawOp, RecordingSurface};
pub use surface::{DrawSurface, Font, Stroke, TextMeasure};
pub use svg::SvgSurface;
