//! Row metadata

/// Row metadata
///
/// Only rows with custom settings are stored; default rows cost nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Row {
    /// Row index (0-based)
    pub index: u32,
    /// Custom height in points (None = default)
    pub height: Option<f64>,
}

impl Row {
    /// Create a new row with default settings
    pub fn new(index: u32) -> Self {
        Self {
            index,
            height: None,
        }
    }

    /// Check if this row has any custom settings
    pub fn has_custom_settings(&self) -> bool {
        self.height.is_some()
    }
}
