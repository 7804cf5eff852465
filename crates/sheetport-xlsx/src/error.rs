//! Error types for sheetport-xlsx

use thiserror::Error;

/// Result type alias using [`XlsxError`]
pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Errors that can occur reading or writing an XLSX package
#[derive(Debug, Error)]
pub enum XlsxError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML parse error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The bytes are not a valid XLSX package
    #[error("Invalid XLSX format: {0}")]
    InvalidFormat(String),

    /// A required package part is missing
    #[error("Missing package part: {0}")]
    MissingPart(String),

    /// Workbook model error
    #[error(transparent)]
    Core(#[from] sheetport_core::Error),
}
