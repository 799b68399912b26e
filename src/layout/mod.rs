//! Layout engine for sequence diagrams
//!
//! This module takes a parsed document and draws it onto a
//! [`DrawSurface`](crate::renderer::DrawSurface), growing the canvas until
//! everything fits, and reports the settled geometry as a [`LayoutResult`].

pub mod actor;
pub mod config;
pub mod elements;
pub mod engine;
pub mod error;
pub mod shapes;
pub mod types;
pub mod working;

pub use config::LayoutConfig;
pub use elements::{draw_lines, Element};
pub use engine::compute;
pub use error::LayoutError;
pub use types::*;
pub use working::Working;
