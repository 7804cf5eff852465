//! Error taxonomy for sheetport
//!
//! Five user-visible kinds: invalid layout arguments, unsatisfiable
//! backend configuration, authentication failures, I/O failures (cell
//! writes, persistence, and remote transport all fold into this kind),
//! and the generic export-worker failure.

use thiserror::Error;

use sheetport_remote::RemoteError;
use sheetport_xlsx::XlsxError;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the export library
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed layout call (e.g. a line with no values)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Unsatisfiable backend construction options
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Credential or session failure, surfaced on first real use
    #[error("authentication error: {0}")]
    Auth(String),

    /// A cell could not be written, with the offending value and its
    /// destination coordinates
    #[error("cannot write {value:?} at row {row}, column {col}: {source}")]
    CellWrite {
        value: String,
        row: u32,
        col: u16,
        source: sheetport_core::Error,
    },

    /// The backend was used before its expensive initialization phase
    #[error("the workbook engine has not been initialized")]
    Uninitialized,

    /// Filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Workbook encoding or decoding failure
    #[error(transparent)]
    Workbook(#[from] XlsxError),

    /// Remote service or transport failure
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The isolation worker reported a non-zero status; details are in
    /// the worker's log
    #[error("unexpected error during export")]
    Export,
}
