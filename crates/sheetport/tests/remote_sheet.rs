//! Remote sheet backend driven through an in-memory service.
//!
//! The fake service implements the transport seam directly, so these
//! tests exercise the real client, protocol types, and backend logic
//! with no bridge process.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use sheetport::{
    Document, Error, ExportOptions, Exportable, Exporter, ExporterConfig, IsolationMode,
    RemoteSheet, RemoteSheetOptions, Result, SheetBackend, TableOptions,
};
use sheetport_remote::{
    CellValue as WireValue, Command, Request, Response, ResponseData, ResponseResult, Transport,
};

#[derive(Default)]
struct ServiceState {
    next_doc: u64,
    docs: HashMap<u64, Doc>,
    commands: Vec<Command>,
}

#[derive(Default)]
struct Doc {
    title: String,
    from_template: Option<String>,
    sheets: Vec<u64>,
    sheet_titles: HashMap<u64, String>,
    cells: HashMap<(u64, u32, u16), WireValue>,
    flushes: usize,
    deleted: Option<bool>,
}

/// In-memory stand-in for the sheet service.
struct FakeService {
    state: Arc<Mutex<ServiceState>>,
    /// Simulate an out-of-band session invalidation: documents resolve
    /// to no worksheets.
    lose_sheets: bool,
}

impl FakeService {
    fn new() -> (Self, Arc<Mutex<ServiceState>>) {
        let state = Arc::new(Mutex::new(ServiceState::default()));
        (
            Self {
                state: Arc::clone(&state),
                lose_sheets: false,
            },
            state,
        )
    }

    fn with_lost_sheets() -> Self {
        Self {
            state: Arc::new(Mutex::new(ServiceState::default())),
            lose_sheets: true,
        }
    }

    fn create_doc(state: &mut ServiceState, title: &str, template: Option<&str>) -> ResponseData {
        state.next_doc += 1;
        let id = state.next_doc;
        let sheet = id * 10 + 1;
        state.docs.insert(
            id,
            Doc {
                title: title.to_string(),
                from_template: template.map(str::to_string),
                sheets: vec![sheet],
                ..Doc::default()
            },
        );
        ResponseData::Document {
            document: id,
            key: format!("key-{id}"),
            url: format!("https://sheets.example/{id}"),
        }
    }
}

impl Transport for FakeService {
    fn send(&mut self, request: &Request) -> sheetport_remote::RemoteResult<Response> {
        let mut state = self.state.lock().unwrap();
        state.commands.push(request.command.clone());

        let data = match &request.command {
            Command::LoginCredentials { .. } | Command::LoginToken { .. } | Command::ResumeSession => {
                None
            }
            Command::CreateDocument { title } => {
                Some(Self::create_doc(&mut state, title, None))
            }
            Command::CopyDocument { template, title } => {
                Some(Self::create_doc(&mut state, title, Some(template)))
            }
            Command::ListSheets { document } => {
                let sheets = if self.lose_sheets {
                    Vec::new()
                } else {
                    state
                        .docs
                        .get(document)
                        .map(|d| d.sheets.clone())
                        .unwrap_or_default()
                };
                Some(ResponseData::Sheets { sheets })
            }
            Command::GetSheetTitle { document, sheet } => {
                let title = state
                    .docs
                    .get(document)
                    .and_then(|d| d.sheet_titles.get(sheet).cloned())
                    .unwrap_or_default();
                Some(ResponseData::Title { title })
            }
            Command::SetSheetTitle {
                document,
                sheet,
                title,
            } => {
                if let Some(doc) = state.docs.get_mut(document) {
                    doc.sheet_titles.insert(*sheet, title.clone());
                }
                None
            }
            Command::WriteCell {
                document,
                sheet,
                row,
                col,
                value,
            } => {
                if let Some(doc) = state.docs.get_mut(document) {
                    doc.cells.insert((*sheet, *row, *col), value.clone());
                }
                None
            }
            Command::FlushSheet { document, .. } => {
                if let Some(doc) = state.docs.get_mut(document) {
                    doc.flushes += 1;
                }
                None
            }
            Command::DeleteDocument {
                document,
                permanent,
            } => {
                if let Some(doc) = state.docs.get_mut(document) {
                    doc.deleted = Some(*permanent);
                }
                None
            }
            Command::Shutdown => None,
        };

        Ok(Response {
            id: request.id,
            result: ResponseResult::Ok { data },
        })
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

fn exporter() -> Exporter {
    Exporter::with_config(ExporterConfig {
        isolation: IsolationMode::InProcess,
        ..ExporterConfig::default()
    })
    .unwrap()
}

fn text(s: &str) -> WireValue {
    WireValue::String(s.to_string())
}

#[test]
fn test_export_writes_cells_one_by_one() {
    let (service, state) = FakeService::new();

    let doc = exporter()
        .to_remote_sheet(
            &Report,
            ExportOptions::default().with_filename("Pipeline"),
            Box::new(service),
        )
        .unwrap();

    // Rows are 1-based on this backend: title + line + two v_table rows
    assert_eq!(doc.current_row_index(), 5);
    assert_eq!(doc.backend().name(), "Pipeline");
    assert_eq!(doc.backend().key(), "key-1");
    assert_eq!(doc.backend().url(), "https://sheets.example/1");

    let state = state.lock().unwrap();
    let remote_doc = state.docs.get(&1).unwrap();
    let sheet = remote_doc.sheets[0];

    // First worksheet named after the document
    assert_eq!(
        remote_doc.sheet_titles.get(&sheet),
        Some(&"Pipeline".to_string())
    );

    // Titles pin to column 1, body text to column 2
    assert_eq!(remote_doc.cells.get(&(sheet, 1, 1)), Some(&text("Report")));
    assert_eq!(remote_doc.cells.get(&(sheet, 2, 2)), Some(&text("alpha")));
    assert_eq!(remote_doc.cells.get(&(sheet, 2, 3)), Some(&text("beta")));
    assert_eq!(remote_doc.cells.get(&(sheet, 3, 2)), Some(&text("a")));
    assert_eq!(remote_doc.cells.get(&(sheet, 3, 3)), Some(&text("1")));
    assert_eq!(remote_doc.cells.get(&(sheet, 4, 2)), Some(&text("b")));
    assert_eq!(remote_doc.cells.get(&(sheet, 4, 3)), Some(&text("2")));

    // save() flushed once
    assert_eq!(remote_doc.flushes, 1);
}

#[test]
fn test_capability_gaps_are_noops() {
    let (service, state) = FakeService::new();
    let options = RemoteSheetOptions::default();
    let backend = RemoteSheet::connect(Some("doc"), &options, Box::new(service)).unwrap();
    let mut doc = Document::new(backend);

    doc.freezepane()
        .unwrap()
        .h_table_with(
            vec![vec!["v"]],
            ["H"],
            &TableOptions::default().with_border_bottom(),
        )
        .unwrap();

    // Header + separator + one data row, despite no real border or
    // row-height support
    assert_eq!(doc.current_row_index(), 4);

    let state = state.lock().unwrap();
    let remote_doc = state.docs.get(&1).unwrap();
    let sheet = remote_doc.sheets[0];
    assert_eq!(remote_doc.cells.get(&(sheet, 1, 2)), Some(&text("H")));
    assert_eq!(remote_doc.cells.get(&(sheet, 3, 2)), Some(&text("v")));
}

#[test]
fn test_template_documents_are_cloned() {
    let (service, state) = FakeService::new();
    let options = RemoteSheetOptions::default().with_template("tpl-1");
    RemoteSheet::connect(Some("doc"), &options, Box::new(service)).unwrap();

    let state = state.lock().unwrap();
    assert_eq!(
        state.docs.get(&1).unwrap().from_template,
        Some("tpl-1".to_string())
    );
}

#[test]
fn test_ambiguous_auth_is_a_configuration_error() {
    for options in [
        // Username without password
        RemoteSheetOptions {
            username: Some("u".into()),
            ..RemoteSheetOptions::default()
        },
        // Credentials and token at once
        RemoteSheetOptions::default()
            .with_credentials("u", "p")
            .with_access_token("tok"),
    ] {
        let (service, _state) = FakeService::new();
        let err = RemoteSheet::connect(Some("doc"), &options, Box::new(service)).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}

#[test]
fn test_lost_session_fails_fast_with_auth_error() {
    let service = FakeService::with_lost_sheets();
    let err = RemoteSheet::connect(Some("doc"), &RemoteSheetOptions::default(), Box::new(service))
        .unwrap_err();

    match err {
        Error::Auth(message) => assert!(message.contains("scopes")),
        other => panic!("expected an auth error, got {other:?}"),
    }
}

#[test]
fn test_destroy_moves_to_trash_or_deletes() {
    let (service, state) = FakeService::new();
    let options = RemoteSheetOptions::default();
    let mut backend = RemoteSheet::connect(Some("doc"), &options, Box::new(service)).unwrap();

    backend.destroy().unwrap();
    assert_eq!(state.lock().unwrap().docs.get(&1).unwrap().deleted, Some(false));

    backend.destroy_permanently().unwrap();
    assert_eq!(state.lock().unwrap().docs.get(&1).unwrap().deleted, Some(true));
}

#[test]
fn test_access_token_auth_logs_in_with_token() {
    let (service, state) = FakeService::new();
    let options = RemoteSheetOptions::default().with_access_token("tok-123");
    RemoteSheet::connect(Some("doc"), &options, Box::new(service)).unwrap();

    let state = state.lock().unwrap();
    assert_eq!(
        state.commands[0],
        Command::LoginToken {
            token: "tok-123".into()
        }
    );
}
