//! Option structs consumed by layout calls and backend initialization
//!
//! The builder methods mirror how call sites read: most calls pass
//! `LineOptions::default().bold()` style one-liners.

/// Formatting options for a single written row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineOptions {
    /// Bold text
    pub bold: bool,
    /// Wrap text (enables row auto-height on backends that support it)
    pub wrap_text: bool,
    /// Explicit start column, overriding the backend default
    pub index: Option<u16>,
}

impl LineOptions {
    /// Enable bold
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Enable text wrapping
    pub fn wrap(mut self) -> Self {
        self.wrap_text = true;
        self
    }

    /// Start the row at an explicit column
    pub fn at_index(mut self, index: u16) -> Self {
        self.index = Some(index);
        self
    }
}

/// Options for a horizontal table.
///
/// The line flags apply to every row of the table; the header row
/// additionally gets bold and wrap forced on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableOptions {
    /// Formatting applied to every table row
    pub line: LineOptions,
    /// Draw a border under the header row (skipped silently on backends
    /// without border support)
    pub border_bottom: bool,
}

impl TableOptions {
    /// Enable bold on all table rows
    pub fn bold(mut self) -> Self {
        self.line.bold = true;
        self
    }

    /// Enable wrapping on all table rows
    pub fn wrap(mut self) -> Self {
        self.line.wrap_text = true;
        self
    }

    /// Start table rows at an explicit column
    pub fn at_index(mut self, index: u16) -> Self {
        self.line.index = Some(index);
        self
    }

    /// Draw a border under the header row
    pub fn with_border_bottom(mut self) -> Self {
        self.border_bottom = true;
        self
    }
}

/// Options for the expensive backend initialization phase.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DocumentOptions {
    /// Default column width in characters (backend default if None)
    pub default_column_width: Option<f64>,
    /// Align cell content to the top of each row
    pub default_top_vertical_align: bool,
    /// Name of the first worksheet (derived from the filename if None)
    pub worksheet_name: Option<String>,
}

impl DocumentOptions {
    /// Set the default column width in characters
    pub fn with_default_column_width(mut self, width: f64) -> Self {
        self.default_column_width = Some(width);
        self
    }

    /// Align cell content to the top of each row
    pub fn with_top_vertical_align(mut self) -> Self {
        self.default_top_vertical_align = true;
        self
    }

    /// Name the first worksheet
    pub fn with_worksheet_name<S: Into<String>>(mut self, name: S) -> Self {
        self.worksheet_name = Some(name.into());
        self
    }
}
