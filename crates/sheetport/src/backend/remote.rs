//! Remote sheet backend
//!
//! Mirrors the layout operations against an API-backed sheet where every
//! cell write is an independent remote call. The service has no native
//! titles, borders, row heights or pane freezing; those hints are
//! accepted and dropped. Rows and columns are 1-based on this backend.

use sheetport_core::CellValue;
use sheetport_remote::{
    Auth, CellValue as WireValue, DocumentHandle, RemoteClient, Transport,
};

use crate::document::SheetBackend;
use crate::error::{Error, Result};
use crate::style::StyleId;

/// Document name used when the caller supplies none
const DEFAULT_DOCUMENT_NAME: &str = "sheetport export";

/// Construction options for [`RemoteSheet`].
///
/// Exactly one auth mode must be expressed: a username with a password,
/// an access token alone, or nothing at all to resume a saved session.
#[derive(Debug, Clone, Default)]
pub struct RemoteSheetOptions {
    /// Account username (requires `password`)
    pub username: Option<String>,
    /// Account password (requires `username`)
    pub password: Option<String>,
    /// Pre-issued access token
    pub access_token: Option<String>,
    /// Template document to clone (inheriting its styling) instead of
    /// creating a blank document
    pub template_document_id: Option<String>,
}

impl RemoteSheetOptions {
    /// Authenticate with an explicit username and password
    pub fn with_credentials<U: Into<String>, P: Into<String>>(
        mut self,
        username: U,
        password: P,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Authenticate with a pre-issued access token
    pub fn with_access_token<T: Into<String>>(mut self, token: T) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Clone the given template document instead of creating a blank one
    pub fn with_template<T: Into<String>>(mut self, template_id: T) -> Self {
        self.template_document_id = Some(template_id.into());
        self
    }

    fn resolve_auth(&self) -> Result<Auth> {
        match (&self.username, &self.password, &self.access_token) {
            (Some(username), Some(password), None) => Ok(Auth::Credentials {
                username: username.clone(),
                password: password.clone(),
            }),
            (None, None, Some(token)) => Ok(Auth::AccessToken(token.clone())),
            (None, None, None) => Ok(Auth::SavedSession),
            _ => Err(Error::Configuration(
                "remote sheet auth options are ambiguous: pass a username with a password, \
                 an access token alone, or nothing to resume a saved session"
                    .into(),
            )),
        }
    }
}

/// An API-backed sheet document.
#[derive(Debug)]
pub struct RemoteSheet {
    client: RemoteClient,
    document: DocumentHandle,
    filename: String,
    /// Lazily resolved and cached first-worksheet handle
    sheet: Option<u64>,
}

impl RemoteSheet {
    /// Authenticate, create (or clone) the document, and name its first
    /// worksheet after the document.
    pub fn connect(
        filename: Option<&str>,
        options: &RemoteSheetOptions,
        transport: Box<dyn Transport>,
    ) -> Result<Self> {
        let auth = options.resolve_auth()?;
        let mut client = RemoteClient::connect(transport, &auth)
            .map_err(|e| Error::Auth(format!("login to the sheet service failed: {e}")))?;

        let filename = filename.unwrap_or(DEFAULT_DOCUMENT_NAME).to_string();

        let document = match &options.template_document_id {
            Some(template) => client.copy_document(template, &filename)?,
            None => client.create_document(&filename)?,
        };

        log::debug!("created remote document {} ({})", document.key, filename);

        let mut backend = Self {
            client,
            document,
            filename,
            sheet: None,
        };

        let title = backend.filename.clone();
        backend.set_worksheet_name(&title)?;

        Ok(backend)
    }

    /// The service-side document key
    pub fn key(&self) -> &str {
        &self.document.key
    }

    /// The browser URL of the document
    pub fn url(&self) -> &str {
        &self.document.url
    }

    /// The document name
    pub fn name(&self) -> &str {
        &self.filename
    }

    /// Title of the first worksheet
    pub fn worksheet_name(&mut self) -> Result<String> {
        let sheet = self.sheet()?;
        Ok(self.client.sheet_title(self.document.id, sheet)?)
    }

    /// Rename the first worksheet
    pub fn set_worksheet_name(&mut self, name: &str) -> Result<()> {
        let sheet = self.sheet()?;
        self.client.set_sheet_title(self.document.id, sheet, name)?;
        Ok(())
    }

    /// Move the document to the service trash
    pub fn destroy(&mut self) -> Result<()> {
        self.client.delete_document(self.document.id, false)?;
        Ok(())
    }

    /// Delete the document permanently
    pub fn destroy_permanently(&mut self) -> Result<()> {
        self.client.delete_document(self.document.id, true)?;
        Ok(())
    }

    /// Drop the cached worksheet handle; the next access re-resolves it
    /// from the document.
    pub fn invalidate_sheet_handle(&mut self) {
        self.sheet = None;
    }

    /// Resolve and cache the first worksheet handle.
    ///
    /// An empty resolution means the session died out-of-band; failing
    /// here with a named cause beats a puzzling failure on some later
    /// write.
    fn sheet(&mut self) -> Result<u64> {
        if let Some(sheet) = self.sheet {
            return Ok(sheet);
        }

        let sheets = self.client.worksheets(self.document.id)?;
        match sheets.first() {
            Some(&sheet) => {
                self.sheet = Some(sheet);
                Ok(sheet)
            }
            None => Err(Error::Auth(
                "the document has no reachable worksheet; the session token is no longer \
                 valid, or the granted OAuth scopes do not cover the spreadsheet API"
                    .into(),
            )),
        }
    }
}

impl SheetBackend for RemoteSheet {
    const EXTENSION: &'static str = "remote_sheet";

    /// The service numbers rows from 1
    fn first_row_index(&self) -> u32 {
        1
    }

    fn first_cell_index(&self) -> u16 {
        1
    }

    /// Body text starts on the second column
    fn default_cell_index(&self) -> u16 {
        2
    }

    fn write_row(
        &mut self,
        row: u32,
        start_col: u16,
        cells: &[CellValue],
        _style: StyleId,
    ) -> Result<()> {
        let sheet = self.sheet()?;

        let mut col = start_col;
        for value in cells {
            if !value.is_empty() {
                self.client
                    .write_cell(self.document.id, sheet, row, col, wire_value(value))?;
            }
            col += 1;
        }

        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        let sheet = self.sheet()?;
        self.client.flush_sheet(self.document.id, sheet)?;
        Ok(())
    }
}

fn wire_value(value: &CellValue) -> WireValue {
    match value {
        CellValue::Empty => WireValue::Null,
        CellValue::Boolean(b) => WireValue::Bool(*b),
        CellValue::Number(n) => WireValue::Number(*n),
        CellValue::String(s) => WireValue::String(s.clone()),
    }
}
