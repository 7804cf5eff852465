//! Export supervisor behavior across both isolation strategies.
//!
//! The fork tests are Unix-only, like the capability itself.

use std::sync::atomic::{AtomicUsize, Ordering};

use sheetport::{
    CellValue, ConnectionGuard, Document, Error, ExportOptions, Exportable, Exporter,
    ExporterConfig, IsolationMode, Result, SheetBackend,
};

/// Counts hand-off calls on the supervising side.
#[derive(Default)]
struct ProbeConnection {
    released: AtomicUsize,
    reacquired: AtomicUsize,
}

impl ConnectionGuard for ProbeConnection {
    fn release(&self) -> Result<()> {
        self.released.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn reacquire(&self) -> Result<()> {
        self.reacquired.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct Report;

impl Exportable for Report {
    fn type_name(&self) -> &str {
        "Report"
    }

    fn compose<B: SheetBackend>(&self, doc: &mut Document<B>) -> Result<()> {
        doc.title_1("Report")?
            .line(["alpha", "beta"])?
            .v_table(["1", "2"], ["a", "b"])?;
        Ok(())
    }
}

struct BrokenReport;

impl Exportable for BrokenReport {
    fn type_name(&self) -> &str {
        "Report"
    }

    fn compose<B: SheetBackend>(&self, doc: &mut Document<B>) -> Result<()> {
        doc.line(Vec::<CellValue>::new())?;
        Ok(())
    }
}

fn exporter(root: &std::path::Path, isolation: IsolationMode) -> Exporter {
    Exporter::with_config(ExporterConfig {
        isolation,
        storage_root: root.to_path_buf(),
    })
    .unwrap()
}

#[test]
fn test_in_process_cursor_matches_composed_rows() {
    let dir = tempfile::tempdir().unwrap();
    let doc = exporter(dir.path(), IsolationMode::InProcess)
        .to_workbook(&Report, ExportOptions::default(), None)
        .unwrap();

    // title (1) + line (1) + v_table (2)
    assert_eq!(doc.current_row_index(), 4);
    assert!(doc.backend().path().exists());
}

#[cfg(unix)]
mod fork {
    use super::*;

    #[test]
    fn test_forked_export_writes_the_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let doc = exporter(dir.path(), IsolationMode::Fork)
            .to_workbook(&Report, ExportOptions::default(), None)
            .unwrap();

        // The worker populated and saved the file; read it back
        let bytes = std::fs::read(doc.backend().path()).unwrap();
        let matrix = sheetport::to_matrix(&bytes).unwrap();

        assert_eq!(matrix.len(), 4);
        assert_eq!(matrix[0][0], Some(sheetport::Scalar::Text("Report".into())));
    }

    #[test]
    fn test_forked_export_restores_the_connection() {
        let dir = tempfile::tempdir().unwrap();
        let probe = ProbeConnection::default();

        exporter(dir.path(), IsolationMode::Fork)
            .to_workbook(&Report, ExportOptions::default(), Some(&probe))
            .unwrap();

        assert_eq!(probe.released.load(Ordering::SeqCst), 1);
        assert_eq!(probe.reacquired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_worker_failure_surfaces_as_export_error() {
        let dir = tempfile::tempdir().unwrap();
        let probe = ProbeConnection::default();

        let err = exporter(dir.path(), IsolationMode::Fork)
            .to_workbook(&BrokenReport, ExportOptions::default(), Some(&probe))
            .unwrap_err();

        // The worker logged the detail; the caller sees one generic kind
        assert!(matches!(err, Error::Export));

        // The supervising side re-acquired its connection despite the
        // failure, exactly once
        assert_eq!(probe.released.load(Ordering::SeqCst), 1);
        assert_eq!(probe.reacquired.load(Ordering::SeqCst), 1);
    }
}

#[test]
fn test_in_process_failure_keeps_its_detail() {
    let dir = tempfile::tempdir().unwrap();
    let err = exporter(dir.path(), IsolationMode::InProcess)
        .to_workbook(&BrokenReport, ExportOptions::default(), None)
        .unwrap_err();

    assert!(matches!(err, Error::InvalidArgument(_)));
}
