//! The backend-polymorphic document and its layout engine
//!
//! [`Document`] owns the row cursor and turns heterogeneous layout calls
//! (single lines, horizontal tables, vertical header/value tables) into
//! ordered row writes against a [`SheetBackend`]. Backends only ever see
//! whole rows: a start column, the cell values, and a resolved
//! [`StyleId`].

use sheetport_core::CellValue;

use crate::error::{Error, Result};
use crate::options::{DocumentOptions, LineOptions, TableOptions};
use crate::style::{resolve_style, StyleId};

/// Height of the separator row written after a table header, in the
/// backend's row-height unit.
const TABLE_SEPARATOR_HEIGHT: f64 = 6.0;

/// The write capability a document target must provide.
///
/// Capabilities a backend lacks (borders, row heights, pane freezing)
/// default to accepted no-ops; layout calls never fail just because a
/// backend cannot render a hint.
pub trait SheetBackend {
    /// Artifact extension, also used as a routing token
    const EXTENSION: &'static str;

    /// Index of the first row (0 for the local workbook, 1 for the
    /// remote sheet)
    fn first_row_index(&self) -> u32;

    /// First writable column (where top-level titles start)
    fn first_cell_index(&self) -> u16;

    /// First data column (body text is indented to here)
    fn default_cell_index(&self) -> u16;

    /// Write one row of cells starting at `start_col`. Empty values are
    /// skipped entirely, not written as zero-valued cells.
    fn write_row(
        &mut self,
        row: u32,
        start_col: u16,
        cells: &[CellValue],
        style: StyleId,
    ) -> Result<()>;

    /// Set an explicit row height (backend unit)
    fn set_row_height(&mut self, _row: u32, _height: f64) -> Result<()> {
        Ok(())
    }

    /// Whether [`Self::draw_border_bottom`] has any effect
    fn supports_border_bottom(&self) -> bool {
        false
    }

    /// Draw a bottom border under `width` cells of an already-written row
    fn draw_border_bottom(&mut self, _row: u32, _start_col: u16, _width: u16) -> Result<()> {
        Ok(())
    }

    /// Freeze every row above `row`
    fn freeze_rows_above(&mut self, _row: u32) -> Result<()> {
        Ok(())
    }

    /// Expensive second-phase initialization (no-op for backends that
    /// fully initialize at construction)
    fn finish_init(&mut self, _options: &DocumentOptions) -> Result<()> {
        Ok(())
    }

    /// Persist the document
    fn save(&mut self) -> Result<()>;
}

/// A document being composed against some backend.
///
/// All layout operations return `&mut Self` for fluent chaining and
/// advance the row cursor by exactly the number of visual rows they
/// consume.
#[derive(Debug)]
pub struct Document<B: SheetBackend> {
    backend: B,
    current_row_index: u32,
}

impl<B: SheetBackend> Document<B> {
    /// Wrap a backend into a fresh document
    pub fn new(backend: B) -> Self {
        let current_row_index = backend.first_row_index();
        Self {
            backend,
            current_row_index,
        }
    }

    /// The row the next write lands on
    pub fn current_row_index(&self) -> u32 {
        self.current_row_index
    }

    /// The underlying backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The underlying backend, mutably
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Compose through a closure, for call sites that read better as a
    /// block than as a method chain
    pub fn write<F>(&mut self, compose: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        compose(self)?;
        Ok(self)
    }

    /// Write one row of values at the default data column.
    ///
    /// Fails with [`Error::InvalidArgument`] when given no values; always
    /// advances the cursor by exactly 1 otherwise.
    pub fn line<I, V>(&mut self, values: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        self.line_with(values, &LineOptions::default())
    }

    /// [`Self::line`] with explicit formatting options
    pub fn line_with<I, V>(&mut self, values: I, options: &LineOptions) -> Result<&mut Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        let cells: Vec<CellValue> = values.into_iter().map(Into::into).collect();
        if cells.is_empty() {
            return Err(Error::InvalidArgument(
                "line requires at least one value".into(),
            ));
        }

        let style = resolve_style(options);
        let start_col = options
            .index
            .unwrap_or_else(|| self.backend.default_cell_index());

        self.backend
            .write_row(self.current_row_index, start_col, &cells, style)?;
        self.current_row_index += 1;

        Ok(self)
    }

    /// Skip one row
    pub fn newline(&mut self) -> &mut Self {
        self.current_row_index += 1;
        self
    }

    /// Skip one row, giving the empty row an explicit height
    pub fn newline_sized(&mut self, height: f64) -> Result<&mut Self> {
        self.backend.set_row_height(self.current_row_index, height)?;
        self.current_row_index += 1;
        Ok(self)
    }

    /// Write a horizontal table: a header row, a thin separator row, then
    /// one row per entry of `rows`.
    ///
    /// Advances the cursor by `rows.len() + 2`.
    pub fn h_table<R, I, V, H, HV>(&mut self, rows: R, headers: H) -> Result<&mut Self>
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
        H: IntoIterator<Item = HV>,
        HV: Into<CellValue>,
    {
        self.h_table_with(rows, headers, &TableOptions::default())
    }

    /// [`Self::h_table`] with explicit options
    pub fn h_table_with<R, I, V, H, HV>(
        &mut self,
        rows: R,
        headers: H,
        options: &TableOptions,
    ) -> Result<&mut Self>
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
        H: IntoIterator<Item = HV>,
        HV: Into<CellValue>,
    {
        let headers: Vec<CellValue> = headers.into_iter().map(Into::into).collect();
        let header_count = headers.len() as u16;

        // Header row: caller flags merged with forced bold + wrap
        let header_options = LineOptions {
            bold: true,
            wrap_text: true,
            index: options.line.index,
        };
        self.line_with(headers, &header_options)?;

        // The border is drawn over the just-written header row and
        // occupies no rows of its own. Backends without border support
        // skip it silently.
        if options.border_bottom && self.backend.supports_border_bottom() {
            let start_col = options
                .line
                .index
                .unwrap_or_else(|| self.backend.default_cell_index());
            self.backend
                .draw_border_bottom(self.current_row_index - 1, start_col, header_count)?;
        }

        self.newline_sized(TABLE_SEPARATOR_HEIGHT)?;

        for row in rows {
            self.line_with(row, &options.line)?;
        }

        Ok(self)
    }

    /// Write a vertical table: one `[header, value]` row per index.
    ///
    /// The shorter of the two sequences is padded with empty cells, never
    /// truncating the longer one, and the header always comes first
    /// regardless of which side is longer. Advances the cursor by
    /// `max(len(values), len(headers))`.
    pub fn v_table<VI, V, H, HV>(&mut self, values: VI, headers: H) -> Result<&mut Self>
    where
        VI: IntoIterator<Item = V>,
        V: Into<CellValue>,
        H: IntoIterator<Item = HV>,
        HV: Into<CellValue>,
    {
        let values: Vec<CellValue> = values.into_iter().map(Into::into).collect();
        let headers: Vec<CellValue> = headers.into_iter().map(Into::into).collect();

        let rows = values.len().max(headers.len());
        if rows == 0 {
            return Err(Error::InvalidArgument(
                "v_table requires at least one header or value".into(),
            ));
        }

        for i in 0..rows {
            let header = headers.get(i).cloned().unwrap_or(CellValue::Empty);
            let value = values.get(i).cloned().unwrap_or(CellValue::Empty);
            self.line([header, value])?;
        }

        Ok(self)
    }

    /// Main document title
    pub fn title_1(&mut self, text: &str) -> Result<&mut Self> {
        self.title(text, StyleId::Title1)
    }

    /// Secondary title
    pub fn title_2(&mut self, text: &str) -> Result<&mut Self> {
        self.title(text, StyleId::Title2)
    }

    /// Inline body title; starts at the data column instead of the first
    /// column because it is used inside body text
    pub fn title_3(&mut self, text: &str) -> Result<&mut Self> {
        self.title(text, StyleId::Title3)
    }

    fn title(&mut self, text: &str, style: StyleId) -> Result<&mut Self> {
        let start_col = if style == StyleId::Title3 {
            self.backend.default_cell_index()
        } else {
            self.backend.first_cell_index()
        };

        self.backend.write_row(
            self.current_row_index,
            start_col,
            &[CellValue::from(text)],
            style,
        )?;
        self.current_row_index += 1;

        Ok(self)
    }

    /// Freeze everything above the cursor (consumes no rows)
    pub fn freezepane(&mut self) -> Result<&mut Self> {
        self.backend.freeze_rows_above(self.current_row_index)?;
        Ok(self)
    }

    /// Persist the document through its backend
    pub fn save(&mut self) -> Result<()> {
        self.backend.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Records every backend call for assertions.
    #[derive(Debug, Default)]
    struct RecordingBackend {
        rows: Vec<(u32, u16, Vec<CellValue>, StyleId)>,
        heights: Vec<(u32, f64)>,
        borders: Vec<(u32, u16, u16)>,
        frozen_above: Option<u32>,
        with_borders: bool,
        saved: bool,
    }

    impl RecordingBackend {
        fn with_borders() -> Self {
            Self {
                with_borders: true,
                ..Self::default()
            }
        }
    }

    impl SheetBackend for RecordingBackend {
        const EXTENSION: &'static str = "rec";

        fn first_row_index(&self) -> u32 {
            0
        }

        fn first_cell_index(&self) -> u16 {
            0
        }

        fn default_cell_index(&self) -> u16 {
            1
        }

        fn write_row(
            &mut self,
            row: u32,
            start_col: u16,
            cells: &[CellValue],
            style: StyleId,
        ) -> Result<()> {
            self.rows.push((row, start_col, cells.to_vec(), style));
            Ok(())
        }

        fn set_row_height(&mut self, row: u32, height: f64) -> Result<()> {
            self.heights.push((row, height));
            Ok(())
        }

        fn supports_border_bottom(&self) -> bool {
            self.with_borders
        }

        fn draw_border_bottom(&mut self, row: u32, start_col: u16, width: u16) -> Result<()> {
            self.borders.push((row, start_col, width));
            Ok(())
        }

        fn freeze_rows_above(&mut self, row: u32) -> Result<()> {
            self.frozen_above = Some(row);
            Ok(())
        }

        fn save(&mut self) -> Result<()> {
            self.saved = true;
            Ok(())
        }
    }

    fn strings(values: &[&str]) -> Vec<CellValue> {
        values.iter().map(|&v| CellValue::from(v)).collect()
    }

    #[test]
    fn test_line_advances_by_one() {
        let mut doc = Document::new(RecordingBackend::default());
        doc.line(["a", "b", "c"]).unwrap();
        assert_eq!(doc.current_row_index(), 1);
        doc.line(["single"]).unwrap();
        assert_eq!(doc.current_row_index(), 2);

        let rows = &doc.backend().rows;
        assert_eq!(rows[0], (0, 1, strings(&["a", "b", "c"]), StyleId::Default));
        assert_eq!(rows[1], (1, 1, strings(&["single"]), StyleId::Default));
    }

    #[test]
    fn test_line_with_no_values_is_invalid() {
        let mut doc = Document::new(RecordingBackend::default());
        let err = doc.line(Vec::<CellValue>::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(doc.current_row_index(), 0);
    }

    #[test]
    fn test_line_call_shapes_are_equivalent() {
        let mut doc_a = Document::new(RecordingBackend::default());
        let mut doc_b = Document::new(RecordingBackend::default());

        doc_a.line(["a", "b", "c"]).unwrap();
        doc_b.line(vec!["a", "b", "c"]).unwrap();

        assert_eq!(doc_a.backend().rows, doc_b.backend().rows);
    }

    #[test]
    fn test_line_style_and_index_options() {
        let mut doc = Document::new(RecordingBackend::default());
        doc.line_with(["x"], &LineOptions::default().bold().wrap().at_index(4))
            .unwrap();

        let (row, col, _, style) = doc.backend().rows[0].clone();
        assert_eq!((row, col), (0, 4));
        assert_eq!(style, StyleId::BoldWrap);
    }

    #[test]
    fn test_newline_writes_nothing() {
        let mut doc = Document::new(RecordingBackend::default());
        doc.newline();
        assert_eq!(doc.current_row_index(), 1);
        assert!(doc.backend().rows.is_empty());
        assert!(doc.backend().heights.is_empty());

        doc.newline_sized(6.0).unwrap();
        assert_eq!(doc.current_row_index(), 2);
        assert_eq!(doc.backend().heights, vec![(1, 6.0)]);
    }

    #[test]
    fn test_h_table_advances_rows_plus_two() {
        let data = vec![vec!["a1", "a2"], vec!["b1"], vec!["c1", "c2", "c3"]];

        for border in [false, true] {
            let mut doc = Document::new(RecordingBackend::with_borders());
            let options = if border {
                TableOptions::default().with_border_bottom()
            } else {
                TableOptions::default()
            };
            doc.h_table_with(data.clone(), ["H1", "H2"], &options).unwrap();
            assert_eq!(doc.current_row_index(), 2 + data.len() as u32);
        }
    }

    #[test]
    fn test_h_table_header_and_separator() {
        let mut doc = Document::new(RecordingBackend::default());
        doc.h_table(vec![vec!["v"]], ["H"]).unwrap();

        // Header row forced bold + wrap
        let (row, _, cells, style) = doc.backend().rows[0].clone();
        assert_eq!(row, 0);
        assert_eq!(cells, strings(&["H"]));
        assert_eq!(style, StyleId::BoldWrap);

        // One 6-unit separator row after the header
        assert_eq!(doc.backend().heights, vec![(1, 6.0)]);

        // Data row lands below the separator
        let (row, _, cells, style) = doc.backend().rows[1].clone();
        assert_eq!(row, 2);
        assert_eq!(cells, strings(&["v"]));
        assert_eq!(style, StyleId::Default);
    }

    #[test]
    fn test_h_table_border_over_header_row() {
        let mut doc = Document::new(RecordingBackend::with_borders());
        doc.h_table_with(
            vec![vec!["v"]],
            ["H1", "H2", "H3"],
            &TableOptions::default().with_border_bottom(),
        )
        .unwrap();

        // Drawn over the header row (row 0), three cells wide, no extra rows
        assert_eq!(doc.backend().borders, vec![(0, 1, 3)]);
        assert_eq!(doc.current_row_index(), 3);
    }

    #[test]
    fn test_h_table_border_skipped_without_capability() {
        let mut doc = Document::new(RecordingBackend::default());
        doc.h_table_with(
            vec![vec!["v"]],
            ["H"],
            &TableOptions::default().with_border_bottom(),
        )
        .unwrap();

        assert!(doc.backend().borders.is_empty());
        assert_eq!(doc.current_row_index(), 3);
    }

    #[test]
    fn test_h_table_data_rows_inherit_call_options() {
        let mut doc = Document::new(RecordingBackend::default());
        doc.h_table_with(
            vec![vec!["v"]],
            ["H"],
            &TableOptions::default().wrap(),
        )
        .unwrap();

        let (_, _, _, style) = doc.backend().rows[1].clone();
        assert_eq!(style, StyleId::Wrap);
    }

    #[test]
    fn test_v_table_pads_shorter_values() {
        let mut doc = Document::new(RecordingBackend::default());
        doc.v_table(["v1"], ["h1", "h2", "h3"]).unwrap();

        assert_eq!(doc.current_row_index(), 3);
        let rows = &doc.backend().rows;
        assert_eq!(rows[0].2, strings(&["h1", "v1"]));
        assert_eq!(rows[1].2, vec![CellValue::from("h2"), CellValue::Empty]);
        assert_eq!(rows[2].2, vec![CellValue::from("h3"), CellValue::Empty]);
    }

    #[test]
    fn test_v_table_pads_shorter_headers_keeping_order() {
        let mut doc = Document::new(RecordingBackend::default());
        doc.v_table(["v1", "v2", "v3"], ["h1"]).unwrap();

        assert_eq!(doc.current_row_index(), 3);
        let rows = &doc.backend().rows;
        // Header first even though values is the longer side
        assert_eq!(rows[0].2, strings(&["h1", "v1"]));
        assert_eq!(rows[1].2, vec![CellValue::Empty, CellValue::from("v2")]);
        assert_eq!(rows[2].2, vec![CellValue::Empty, CellValue::from("v3")]);
    }

    #[test]
    fn test_v_table_singletons_make_one_flat_row() {
        let mut doc = Document::new(RecordingBackend::default());
        doc.v_table(["x"], ["h"]).unwrap();

        assert_eq!(doc.current_row_index(), 1);
        assert_eq!(doc.backend().rows[0].2, strings(&["h", "x"]));
    }

    #[test]
    fn test_v_table_equal_lengths() {
        let mut doc = Document::new(RecordingBackend::default());
        doc.v_table(["v1", "v2"], ["h1", "h2"]).unwrap();

        assert_eq!(doc.current_row_index(), 2);
        assert_eq!(doc.backend().rows[0].2, strings(&["h1", "v1"]));
        assert_eq!(doc.backend().rows[1].2, strings(&["h2", "v2"]));
    }

    #[test]
    fn test_v_table_requires_input() {
        let mut doc = Document::new(RecordingBackend::default());
        let err = doc
            .v_table(Vec::<CellValue>::new(), Vec::<CellValue>::new())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_title_columns() {
        let mut doc = Document::new(RecordingBackend::default());
        doc.title_1("One")
            .unwrap()
            .title_2("Two")
            .unwrap()
            .title_3("Three")
            .unwrap();

        let rows = &doc.backend().rows;
        assert_eq!((rows[0].0, rows[0].1, rows[0].3), (0, 0, StyleId::Title1));
        assert_eq!((rows[1].0, rows[1].1, rows[1].3), (1, 0, StyleId::Title2));
        // Title 3 is indented to the data column
        assert_eq!((rows[2].0, rows[2].1, rows[2].3), (2, 1, StyleId::Title3));
        assert_eq!(doc.current_row_index(), 3);
    }

    #[test]
    fn test_freezepane_consumes_no_rows() {
        let mut doc = Document::new(RecordingBackend::default());
        doc.title_1("T").unwrap().freezepane().unwrap();

        assert_eq!(doc.backend().frozen_above, Some(1));
        assert_eq!(doc.current_row_index(), 1);
    }

    #[test]
    fn test_write_block_chains() {
        let mut doc = Document::new(RecordingBackend::default());
        doc.write(|d| {
            d.title_1("T")?.line(["a"])?.newline();
            Ok(())
        })
        .unwrap();
        assert_eq!(doc.current_row_index(), 3);
    }

    #[test]
    fn test_mixed_value_types() {
        let mut doc = Document::new(RecordingBackend::default());
        doc.line([
            CellValue::from("label"),
            CellValue::from(42.0),
            CellValue::from(true),
        ])
        .unwrap();

        assert_eq!(
            doc.backend().rows[0].2,
            vec![
                CellValue::String("label".into()),
                CellValue::Number(42.0),
                CellValue::Boolean(true)
            ]
        );
    }
}
