//! Document backends: a locally-written XLSX workbook and a remote
//! API-backed sheet.

mod local;
mod remote;

pub use local::LocalWorkbook;
pub use remote::{RemoteSheet, RemoteSheetOptions};
