//! Spreadsheet ingestion: workbook bytes to a plain matrix
//!
//! The inverse direction is deliberately much simpler than export: the
//! first worksheet of a binary workbook becomes a matrix of scalars,
//! row by row. Empty rows come back as `[None]` and gaps inside a row
//! as `None`, so consumers can index the matrix without caring how
//! sparsely the sheet was written.

use std::io::Cursor;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use sheetport_core::{CellValue, Worksheet};
use sheetport_xlsx::XlsxReader;

use crate::error::Result;

/// A scalar read out of a cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Text content (dates render into this)
    Text(String),
    /// Numeric content
    Number(f64),
}

/// Convert workbook bytes into a matrix of scalars.
///
/// Fails with a format error if the bytes are not a valid XLSX package.
/// Numeric cells styled with a date format render as text, the way the
/// sheet would display them.
pub fn to_matrix(bytes: &[u8]) -> Result<Vec<Vec<Option<Scalar>>>> {
    let workbook = XlsxReader::read(Cursor::new(bytes))?;
    let Some(sheet) = workbook.worksheet(0) else {
        return Ok(Vec::new());
    };

    let Some(last_row) = sheet.last_row() else {
        return Ok(Vec::new());
    };

    let mut matrix = Vec::with_capacity(last_row as usize + 1);
    for row in 0..=last_row {
        if sheet.row_is_empty(row) {
            matrix.push(vec![None]);
            continue;
        }

        let last_col = sheet
            .last_col_in_row(row)
            .expect("non-empty row has a last column");
        let mut cells = Vec::with_capacity(last_col as usize + 1);
        for col in 0..=last_col {
            cells.push(read_scalar(sheet, row, col));
        }
        matrix.push(cells);
    }

    Ok(matrix)
}

fn read_scalar(sheet: &Worksheet, row: u32, col: u16) -> Option<Scalar> {
    let cell = sheet.cell_at(row, col)?;

    match &cell.value {
        CellValue::String(s) => Some(Scalar::Text(s.clone())),
        CellValue::Number(n) => {
            let is_date = sheet
                .style_by_index(cell.style_index)
                .map(|style| style.number_format.is_date())
                .unwrap_or(false);
            if is_date {
                Some(Scalar::Text(render_date(*n)))
            } else {
                Some(Scalar::Number(*n))
            }
        }
        // Matches the sheet's own notion of "no scalar here"
        CellValue::Boolean(_) | CellValue::Empty => None,
    }
}

/// Render an Excel serial date the way the sheet would display it.
///
/// Serial day 0 is 1899-12-30 (the convention absorbs the format's
/// historical leap-year quirk); the fraction is the time of day.
fn render_date(serial: f64) -> String {
    let days = serial.floor() as i64;
    let seconds = ((serial - serial.floor()) * 86_400.0).round() as i64;

    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
        .expect("fixed epoch date is valid")
        .and_hms_opt(0, 0, 0)
        .expect("midnight is valid");

    let moment: NaiveDateTime = epoch + Duration::days(days) + Duration::seconds(seconds);
    if seconds == 0 {
        moment.format("%Y-%m-%d").to_string()
    } else {
        moment.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
