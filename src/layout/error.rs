//! Error types for the layout engine

use thiserror::Error;

/// Errors that stop a diagram from being laid out at all
#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    /// The document declares no actors
    #[error("diagram has no actors")]
    NoActors,

    /// An actor without a usable name
    #[error("actor #{index} has no name")]
    MissingActorName { index: usize },

    /// An actor without an alias, so no line can refer to it
    #[error("actor #{index} ('{name}') has no alias")]
    MissingActorAlias { index: usize, name: String },

    /// Two actors share an alias
    #[error("alias '{alias}' is declared more than once")]
    DuplicateAlias { alias: String },

    /// The canvas kept growing past the attempt limit
    #[error("canvas did not settle after {attempts} attempts")]
    CanvasDidNotSettle { attempts: usize },
}
