//! Core types for the layout engine

/// A 2D point in canvas coordinates (y grows downwards)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned box given by its top-left corner and size
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn bottom_right(&self) -> Point {
        Point::new(self.right(), self.bottom())
    }
}

/// Which edges of a rectangle get stroked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Borders {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl Borders {
    pub const ALL: Borders = Borders {
        top: true,
        right: true,
        bottom: true,
        left: true,
    };

    pub const NONE: Borders = Borders {
        top: false,
        right: false,
        bottom: false,
        left: false,
    };

    /// Left and right only, used by fragment side bands
    pub const SIDES: Borders = Borders {
        top: false,
        right: true,
        bottom: false,
        left: true,
    };

    pub fn without_top(self) -> Self {
        Self { top: false, ..self }
    }

    pub fn without_bottom(self) -> Self {
        Self {
            bottom: false,
            ..self
        }
    }

    pub fn is_all(&self) -> bool {
        *self == Borders::ALL
    }
}

/// Final geometry of one actor header
#[derive(Debug, Clone, PartialEq)]
pub struct ActorGeometry {
    pub alias: String,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub middle: f64,
}

/// Outcome of a completed layout
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResult {
    /// Settled canvas size
    pub width: f64,
    pub height: f64,
    /// Left edge of the outermost content
    pub start_x: f64,
    /// Bottom-right corner reached by the last drawn element
    pub end: Point,
    pub actors: Vec<ActorGeometry>,
    pub max_fragment_depth: usize,
    /// Sequence numbers handed out
    pub call_count: u32,
    /// Layout passes needed for the canvas to settle
    pub attempts: usize,
}

impl LayoutResult {
    pub fn actor(&self, alias: &str) -> Option<&ActorGeometry> {
        self.actors.iter().find(|a| a.alias == alias)
    }
}
