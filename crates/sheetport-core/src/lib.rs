//! # sheetport-core
//!
//! Core data structures for the sheetport export library.
//!
//! This crate provides the in-memory workbook model that the local export
//! backend populates and the XLSX codec serializes:
//! - [`CellValue`] - Scalar cell values (numbers, strings, booleans)
//! - [`CellAddress`] - A1-style cell addressing
//! - [`Style`] - Cell formatting (font, alignment, borders)
//! - [`Workbook`], [`Worksheet`] - The document structures
//!
//! ## Example
//!
//! ```rust
//! use sheetport_core::{Workbook, CellValue};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//!
//! sheet.set_value_at(0, 0, CellValue::from("Hello")).unwrap();
//! sheet.set_value_at(0, 1, CellValue::from(42.0)).unwrap();
//! ```

pub mod cell;
pub mod error;
pub mod row;
pub mod style;
pub mod workbook;
pub mod worksheet;

// Re-exports for convenience
pub use cell::{CellAddress, CellData, CellStorage, CellValue};
pub use error::{Error, Result};
pub use row::Row;
pub use style::{
    Alignment, BorderLineStyle, BorderStyle, FontStyle, NumberFormat, Style, StylePool,
    VerticalAlignment,
};
pub use workbook::Workbook;
pub use worksheet::{FreezePanes, Worksheet};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
