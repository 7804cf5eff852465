//! Worksheet type

use std::collections::BTreeMap;

use crate::cell::{CellData, CellStorage, CellValue};
use crate::error::{Error, Result};
use crate::row::Row;
use crate::style::{Style, StylePool};
use crate::{MAX_COLS, MAX_ROWS};

/// A worksheet (single sheet in a workbook)
#[derive(Debug)]
pub struct Worksheet {
    /// Sheet name
    name: String,
    /// Cell storage
    cells: CellStorage,
    /// Deduplicated cell styles
    styles: StylePool,
    /// Rows with custom settings, keyed by row index
    rows: BTreeMap<u32, Row>,
    /// Columns with custom widths (in characters), keyed by column index
    column_widths: BTreeMap<u16, f64>,
    /// Default column width in characters, if customized
    default_column_width: Option<f64>,
    /// Freeze pane settings
    freeze_panes: Option<FreezePanes>,
}

/// Freeze pane settings (rows above / columns left of the split stay fixed)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreezePanes {
    /// First scrollable row (rows above are frozen)
    pub row: u32,
    /// First scrollable column (columns left are frozen)
    pub col: u16,
}

impl Worksheet {
    /// Create a new worksheet with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: CellStorage::new(),
            styles: StylePool::new(),
            rows: BTreeMap::new(),
            column_widths: BTreeMap::new(),
            default_column_width: None,
            freeze_panes: None,
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the sheet name
    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    // === Cell Access ===

    /// Get a cell by row and column indices
    pub fn cell_at(&self, row: u32, col: u16) -> Option<&CellData> {
        self.cells.get(row, col)
    }

    /// Get a cell value by indices ([`CellValue::Empty`] if unset)
    pub fn get_value_at(&self, row: u32, col: u16) -> CellValue {
        self.cells.value(row, col)
    }

    /// Set a cell value with the default style
    pub fn set_value_at(&mut self, row: u32, col: u16, value: CellValue) -> Result<()> {
        self.set_cell_at(row, col, value, 0)
    }

    /// Set a cell value with an explicit style index
    pub fn set_cell_at(
        &mut self,
        row: u32,
        col: u16,
        value: CellValue,
        style_index: u32,
    ) -> Result<()> {
        self.check_bounds(row, col)?;
        if self.styles.get(style_index).is_none() {
            return Err(Error::InvalidStyleIndex(style_index));
        }
        self.cells.set(row, col, CellData::with_style(value, style_index));
        Ok(())
    }

    /// Iterate all cells in row-major order
    pub fn iter_cells(&self) -> impl Iterator<Item = (u32, u16, &CellData)> {
        self.cells.iter()
    }

    /// Index of the last row holding any cell
    pub fn last_row(&self) -> Option<u32> {
        self.cells.last_row()
    }

    /// Index of the last occupied column in a row
    pub fn last_col_in_row(&self, row: u32) -> Option<u16> {
        self.cells.last_col_in_row(row)
    }

    /// Whether a row holds no cells
    pub fn row_is_empty(&self, row: u32) -> bool {
        self.cells.row_is_empty(row)
    }

    /// Number of stored cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    // === Styles ===

    /// Get or insert a style, returning its index for [`Self::set_cell_at`]
    pub fn add_style(&mut self, style: Style) -> u32 {
        self.styles.get_or_insert(style)
    }

    /// Get a style by index
    pub fn style_by_index(&self, index: u32) -> Option<&Style> {
        self.styles.get(index)
    }

    /// The style pool (writer access)
    pub fn styles(&self) -> &StylePool {
        &self.styles
    }

    // === Rows and Columns ===

    /// Set a custom row height in points
    pub fn set_row_height(&mut self, row: u32, height: f64) {
        self.rows.entry(row).or_insert_with(|| Row::new(row)).height = Some(height);
    }

    /// Get a row's custom height, if set
    pub fn row_height(&self, row: u32) -> Option<f64> {
        self.rows.get(&row).and_then(|r| r.height)
    }

    /// Iterate rows that carry custom settings
    pub fn custom_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.values().filter(|r| r.has_custom_settings())
    }

    /// Set a column width in characters
    pub fn set_column_width(&mut self, col: u16, width: f64) {
        self.column_widths.insert(col, width);
    }

    /// Get a column's custom width, if set
    pub fn column_width(&self, col: u16) -> Option<f64> {
        self.column_widths.get(&col).copied()
    }

    /// Iterate columns with custom widths
    pub fn custom_columns(&self) -> impl Iterator<Item = (u16, f64)> + '_ {
        self.column_widths.iter().map(|(&c, &w)| (c, w))
    }

    /// Set the default column width in characters
    pub fn set_default_column_width(&mut self, width: f64) {
        self.default_column_width = Some(width);
    }

    /// The default column width in characters, if customized
    pub fn default_column_width(&self) -> Option<f64> {
        self.default_column_width
    }

    /// The width that effectively applies to a column
    pub fn effective_column_width(&self, col: u16) -> Option<f64> {
        self.column_width(col).or(self.default_column_width)
    }

    // === Panes ===

    /// Freeze all rows above `row` (a horizontal split)
    pub fn freeze_rows(&mut self, row: u32) {
        self.freeze_panes = Some(FreezePanes { row, col: 0 });
    }

    /// Get the freeze pane settings, if any
    pub fn freeze_panes(&self) -> Option<FreezePanes> {
        self.freeze_panes
    }

    fn check_bounds(&self, row: u32, col: u16) -> Result<()> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_and_get() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_value_at(0, 1, CellValue::from("a")).unwrap();

        assert_eq!(sheet.get_value_at(0, 1), CellValue::String("a".into()));
        assert_eq!(sheet.get_value_at(0, 0), CellValue::Empty);
        assert_eq!(sheet.cell_count(), 1);
    }

    #[test]
    fn test_styled_cell() {
        let mut sheet = Worksheet::new("Sheet1");
        let bold = sheet.add_style(Style::new().bold(true));
        sheet.set_cell_at(2, 3, CellValue::from(1.0), bold).unwrap();

        let cell = sheet.cell_at(2, 3).unwrap();
        assert_eq!(cell.style_index, bold);
        assert!(sheet.style_by_index(bold).unwrap().font.bold);
    }

    #[test]
    fn test_unknown_style_index_rejected() {
        let mut sheet = Worksheet::new("Sheet1");
        let err = sheet.set_cell_at(0, 0, CellValue::from(1.0), 99).unwrap_err();
        assert!(matches!(err, Error::InvalidStyleIndex(99)));
    }

    #[test]
    fn test_bounds() {
        let mut sheet = Worksheet::new("Sheet1");
        assert!(sheet.set_value_at(MAX_ROWS, 0, CellValue::Empty).is_err());
        assert!(sheet.set_value_at(0, MAX_COLS, CellValue::Empty).is_err());
    }

    #[test]
    fn test_row_and_column_settings() {
        let mut sheet = Worksheet::new("Sheet1");
        sheet.set_row_height(4, 30.0);
        sheet.set_column_width(0, 5.0);
        sheet.set_default_column_width(23.0);

        assert_eq!(sheet.row_height(4), Some(30.0));
        assert_eq!(sheet.row_height(5), None);
        assert_eq!(sheet.effective_column_width(0), Some(5.0));
        assert_eq!(sheet.effective_column_width(7), Some(23.0));
    }

    #[test]
    fn test_freeze_rows() {
        let mut sheet = Worksheet::new("Sheet1");
        assert_eq!(sheet.freeze_panes(), None);
        sheet.freeze_rows(3);
        assert_eq!(sheet.freeze_panes(), Some(FreezePanes { row: 3, col: 0 }));
    }
}
