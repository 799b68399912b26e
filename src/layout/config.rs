//! Configuration for the layout engine

/// Configuration options for layout computation
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Canvas size of the first layout attempt
    pub initial_size: (f64, f64),

    /// Upper bound on grow-and-redraw attempts
    pub max_attempts: usize,

    /// Fonts accepted in `fontFamily` besides the generic families
    pub fonts: Vec<String>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            initial_size: (100.0, 100.0),
            max_attempts: 8,
            fonts: Vec::new(),
        }
    }
}

impl LayoutConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the size of the first canvas
    pub fn with_initial_size(mut self, width: f64, height: f64) -> Self {
        self.initial_size = (width, height);
        self
    }

    /// Set the attempt limit
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Register an additional font family
    pub fn with_font(mut self, family: impl Into<String>) -> Self {
        self.fonts.push(family.into());
        self
    }
}
