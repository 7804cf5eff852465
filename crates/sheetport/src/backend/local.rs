//! Local workbook backend
//!
//! Accumulates row writes into an in-memory workbook and serializes it
//! to an XLSX file on save. Construction is deliberately split in two
//! phases: the constructor only records names (so the export supervisor
//! can commit to a filename cheaply), while [`SheetBackend::finish_init`]
//! pays for the workbook model, the pre-built style set, and the default
//! column layout.

use std::io;
use std::path::PathBuf;

use sheetport_core::{
    CellValue, Style, VerticalAlignment, Workbook, Worksheet,
};
use sheetport_xlsx::XlsxWriter;

use crate::document::SheetBackend;
use crate::error::{Error, Result};
use crate::options::DocumentOptions;
use crate::style::StyleId;

/// Body text starts on column 1 instead of 0 (except for titles), so the
/// narrow first column reads as an indent.
const DEFAULT_CELL_INDEX: u16 = 1;

/// Default column width in characters
const DEFAULT_COLUMN_WIDTH: f64 = 23.0;

/// Width of the narrow first column, in characters
const FIRST_COLUMN_WIDTH: f64 = 5.0;

/// Default row height in points, the unit of wrap auto-height
const DEFAULT_ROW_HEIGHT: f64 = 15.0;

/// Font family used by every pre-built style
const FONT_NAME: &str = "Verdana";

/// A workbook written to local disk.
#[derive(Debug)]
pub struct LocalWorkbook {
    client_filename: String,
    token: String,
    storage_root: PathBuf,
    state: Option<WorkbookState>,
}

/// Everything the expensive initialization phase builds.
#[derive(Debug)]
struct WorkbookState {
    book: Workbook,
    styles: StyleTable,
    column_width: f64,
    saved: bool,
}

/// Explicit mapping from [`StyleId`] to a pre-built style index.
///
/// Spreadsheet engines cap how many native styles a document may hold,
/// so the whole set is created once during initialization and only ever
/// referenced afterwards, never per cell.
#[derive(Debug, Clone, Copy)]
struct StyleTable {
    default: u32,
    bold: u32,
    wrap: u32,
    bold_wrap: u32,
    title_1: u32,
    title_2: u32,
    title_3: u32,
}

impl StyleTable {
    fn build(sheet: &mut Worksheet, options: &DocumentOptions) -> Self {
        let vertical = if options.default_top_vertical_align {
            VerticalAlignment::Top
        } else {
            VerticalAlignment::Bottom
        };

        let body = |style: Style| style.font_name(FONT_NAME).font_size(10.0).vertical_alignment(vertical);
        let title = |size: f64| Style::new().font_name(FONT_NAME).font_size(size);

        Self {
            default: sheet.add_style(body(Style::new())),
            bold: sheet.add_style(body(Style::new().bold(true))),
            wrap: sheet.add_style(body(Style::new().wrap_text(true))),
            bold_wrap: sheet.add_style(body(Style::new().bold(true).wrap_text(true))),
            title_1: sheet.add_style(title(22.0)),
            title_2: sheet.add_style(title(18.0)),
            title_3: sheet.add_style(title(10.0).bold(true)),
        }
    }

    fn index_for(&self, style: StyleId) -> u32 {
        match style {
            StyleId::Default => self.default,
            StyleId::Bold => self.bold,
            StyleId::Wrap => self.wrap,
            StyleId::BoldWrap => self.bold_wrap,
            StyleId::Title1 => self.title_1,
            StyleId::Title2 => self.title_2,
            StyleId::Title3 => self.title_3,
        }
    }
}

impl LocalWorkbook {
    /// Record the client-visible filename and the uniqueness token.
    ///
    /// Cheap by design; the workbook engine is only built by
    /// [`SheetBackend::finish_init`].
    pub fn new<S: Into<String>, T: Into<String>>(client_filename: S, token: T) -> Self {
        Self {
            client_filename: client_filename.into(),
            token: token.into(),
            storage_root: std::env::temp_dir(),
            state: None,
        }
    }

    /// Change the directory the artifact is written into
    pub fn with_storage_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.storage_root = root.into();
        self
    }

    /// The uniqueness token in the server-side filename
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Server-side filename (disambiguated by the token)
    pub fn filename(&self) -> String {
        format!("{}{}.{}", self.client_filename, self.token, Self::EXTENSION)
    }

    /// Client-visible document name (token omitted)
    pub fn name(&self) -> String {
        format!("{}.{}", self.client_filename, Self::EXTENSION)
    }

    /// Full path of the on-disk artifact
    pub fn path(&self) -> PathBuf {
        self.storage_root.join(self.filename())
    }

    /// Name of the first worksheet, once initialized
    pub fn worksheet_name(&self) -> Option<&str> {
        self.state
            .as_ref()
            .and_then(|s| s.book.worksheet(0))
            .map(|ws| ws.name())
    }

    /// Rename the first worksheet
    pub fn set_worksheet_name(&mut self, name: &str) -> Result<()> {
        let state = self.state.as_mut().ok_or(Error::Uninitialized)?;
        state
            .book
            .set_sheet_name(0, name)
            .map_err(|e| Error::Configuration(e.to_string()))
    }

    /// The in-memory workbook, once initialized
    pub fn workbook(&self) -> Option<&Workbook> {
        self.state.as_ref().map(|s| &s.book)
    }

    fn state_mut(&mut self) -> Result<&mut WorkbookState> {
        self.state.as_mut().ok_or(Error::Uninitialized)
    }

    /// Worksheet name derived from the client filename: forbidden
    /// characters blanked, capitalized, clamped to the format limit.
    fn derive_sheet_name(client_filename: &str) -> String {
        let cleaned: String = client_filename
            .chars()
            .map(|c| {
                if matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\') {
                    ' '
                } else {
                    c
                }
            })
            .take(sheetport_core::MAX_SHEET_NAME_LEN)
            .collect();
        let cleaned = cleaned.trim().to_string();
        if cleaned.is_empty() {
            return "Sheet1".to_string();
        }

        let mut chars = cleaned.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => cleaned,
        }
    }
}

impl SheetBackend for LocalWorkbook {
    const EXTENSION: &'static str = "xlsx";

    fn first_row_index(&self) -> u32 {
        0
    }

    fn first_cell_index(&self) -> u16 {
        0
    }

    fn default_cell_index(&self) -> u16 {
        DEFAULT_CELL_INDEX
    }

    fn finish_init(&mut self, options: &DocumentOptions) -> Result<()> {
        let mut book = Workbook::new();

        let sheet_name = match &options.worksheet_name {
            Some(name) => name.clone(),
            None => Self::derive_sheet_name(&self.client_filename),
        };
        book.set_sheet_name(0, &sheet_name)
            .map_err(|e| Error::Configuration(e.to_string()))?;

        let sheet = book.worksheet_mut(0).expect("fresh workbook has one sheet");

        // The bounded style set, created exactly once
        let styles = StyleTable::build(sheet, options);

        // Default column widths, with a narrow first column for indent
        let column_width = options
            .default_column_width
            .unwrap_or(DEFAULT_COLUMN_WIDTH);
        sheet.set_default_column_width(column_width);
        sheet.set_column_width(0, FIRST_COLUMN_WIDTH);

        log::debug!("initialized workbook engine for {}", self.filename());

        self.state = Some(WorkbookState {
            book,
            styles,
            column_width,
            saved: false,
        });

        Ok(())
    }

    fn write_row(
        &mut self,
        row: u32,
        start_col: u16,
        cells: &[CellValue],
        style: StyleId,
    ) -> Result<()> {
        let state = self.state_mut()?;
        let style_index = state.styles.index_for(style);
        let column_width = state.column_width;
        let sheet = state
            .book
            .worksheet_mut(0)
            .expect("initialized workbook has one sheet");

        let mut col = start_col;
        for value in cells {
            if !value.is_empty() {
                sheet
                    .set_cell_at(row, col, value.clone(), style_index)
                    .map_err(|source| Error::CellWrite {
                        value: value.to_string(),
                        row,
                        col,
                        source,
                    })?;
            }
            col += 1;
        }

        // Wrapped rows get their height recomputed from content on every
        // write; cell text varies per row, so this is never cached.
        if style.wraps() {
            let height = wrap_height(cells, column_width);
            sheet.set_row_height(row, height);
        }

        Ok(())
    }

    fn set_row_height(&mut self, row: u32, height: f64) -> Result<()> {
        let state = self.state_mut()?;
        let sheet = state
            .book
            .worksheet_mut(0)
            .expect("initialized workbook has one sheet");
        sheet.set_row_height(row, height);
        Ok(())
    }

    fn supports_border_bottom(&self) -> bool {
        true
    }

    fn draw_border_bottom(&mut self, row: u32, start_col: u16, width: u16) -> Result<()> {
        let state = self.state_mut()?;
        let sheet = state
            .book
            .worksheet_mut(0)
            .expect("initialized workbook has one sheet");

        for col in start_col..start_col.saturating_add(width) {
            let (value, base_style) = match sheet.cell_at(row, col) {
                Some(cell) => (cell.value.clone(), cell.style_index),
                None => (CellValue::Empty, 0),
            };

            let bordered = sheet
                .style_by_index(base_style)
                .cloned()
                .unwrap_or_default()
                .border_bottom(sheetport_core::BorderLineStyle::Thin);
            let style_index = sheet.add_style(bordered);

            sheet
                .set_cell_at(row, col, value.clone(), style_index)
                .map_err(|source| Error::CellWrite {
                    value: value.to_string(),
                    row,
                    col,
                    source,
                })?;
        }

        Ok(())
    }

    fn freeze_rows_above(&mut self, row: u32) -> Result<()> {
        let state = self.state_mut()?;
        let sheet = state
            .book
            .worksheet_mut(0)
            .expect("initialized workbook has one sheet");
        sheet.freeze_rows(row);
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        let path = self.path();
        let state = self.state_mut()?;

        if state.saved {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::Other,
                "the workbook was already saved and its output handle closed",
            )));
        }

        XlsxWriter::write_file(&state.book, &path)?;
        state.saved = true;

        log::debug!("saved workbook to {}", path.display());
        Ok(())
    }
}

/// Estimated height in points for a wrapped row: per cell, every
/// rendered line counts `ceil(len / column_width)` visual lines; the
/// tallest cell wins.
fn wrap_height(cells: &[CellValue], column_width: f64) -> f64 {
    let max_lines = cells
        .iter()
        .filter(|value| !value.is_empty())
        .map(|value| {
            value
                .to_string()
                .lines()
                .map(|line| {
                    let len = line.chars().count() as f64;
                    if len <= column_width {
                        1
                    } else {
                        (len / column_width).ceil() as u32
                    }
                })
                .sum::<u32>()
        })
        .max()
        .unwrap_or(1)
        .max(1);

    f64::from(max_lines) * DEFAULT_ROW_HEIGHT
}
