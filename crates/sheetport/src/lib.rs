//! # sheetport
//!
//! Export structured record data into spreadsheet-shaped documents
//! (titles, lines, and two kinds of tables) against interchangeable
//! backends: a locally-written XLSX workbook or a remote API-backed
//! sheet.
//!
//! The pieces:
//! - [`Document`] - layout operations (`line`, `h_table`, `v_table`,
//!   titles) over any [`SheetBackend`], owning the row cursor
//! - [`LocalWorkbook`] / [`RemoteSheet`] - the two backends
//! - [`Exporter`] - the two-phase export supervisor, with optional
//!   process isolation for the expensive population step
//! - [`to_matrix`] - the much simpler ingestion direction
//!
//! ## Example
//!
//! ```rust
//! use sheetport::{
//!     Document, Exportable, ExportOptions, Exporter, ExporterConfig, IsolationMode, Result,
//!     SheetBackend,
//! };
//!
//! struct Deal {
//!     name: String,
//!     stage: String,
//! }
//!
//! impl Exportable for Deal {
//!     fn type_name(&self) -> &str {
//!         "Deal"
//!     }
//!
//!     fn compose<B: SheetBackend>(&self, doc: &mut Document<B>) -> Result<()> {
//!         doc.title_1("Deal summary")?
//!             .v_table([self.name.as_str(), self.stage.as_str()], ["Name", "Stage"])?;
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<()> {
//!     let deal = Deal {
//!         name: "Acme".into(),
//!         stage: "won".into(),
//!     };
//!     let exporter = Exporter::with_config(ExporterConfig {
//!         isolation: IsolationMode::InProcess,
//!         ..ExporterConfig::default()
//!     })?;
//!     let doc = exporter.to_workbook(&deal, ExportOptions::default(), None)?;
//!     println!("wrote {}", doc.backend().path().display());
//!     Ok(())
//! }
//! ```

mod backend;
mod document;
mod error;
mod export;
mod ingest;
mod options;
mod style;
mod token;

pub use backend::{LocalWorkbook, RemoteSheet, RemoteSheetOptions};
pub use document::{Document, SheetBackend};
pub use error::{Error, Result};
pub use export::{
    allowed_extensions, ConnectionGuard, ExportHooks, ExportOptions, Exportable, Exporter,
    ExporterConfig, IsolationMode, Target,
};
pub use ingest::{to_matrix, Scalar};
pub use options::{DocumentOptions, LineOptions, TableOptions};
pub use style::{resolve_style, StyleId};
pub use token::make_token;

// Re-export the value type layout calls accept, and the transport seam
// remote exports are wired through.
pub use sheetport_core::CellValue;
pub use sheetport_remote::{ProcessTransport, ProcessTransportConfig, Transport};
