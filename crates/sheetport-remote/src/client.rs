//! Typed client for the remote sheet service.

use crate::error::{RemoteError, RemoteResult};
use crate::protocol::{CellValue, Command, Request, Response, ResponseData, ResponseResult};
use crate::transport::Transport;

/// How to authenticate against the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    /// Explicit username and password.
    Credentials { username: String, password: String },
    /// A pre-issued access token.
    AccessToken(String),
    /// Resume a session previously saved on the bridge side.
    SavedSession,
}

/// A handle to a document created on the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHandle {
    /// Bridge-local handle id.
    pub id: u64,
    /// Service-side document key.
    pub key: String,
    /// Browser URL of the document.
    pub url: String,
}

/// The main handle for talking to the remote sheet service.
///
/// Commands are correlated to responses by request id; each call blocks
/// until the bridge answers.
pub struct RemoteClient {
    transport: Box<dyn Transport>,
    next_id: u64,
}

impl std::fmt::Debug for RemoteClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteClient")
            .field("next_id", &self.next_id)
            .finish_non_exhaustive()
    }
}

impl RemoteClient {
    /// Connect over the given transport and authenticate.
    pub fn connect(transport: Box<dyn Transport>, auth: &Auth) -> RemoteResult<Self> {
        let mut client = Self {
            transport,
            next_id: 1,
        };

        let login = match auth {
            Auth::Credentials { username, password } => Command::LoginCredentials {
                username: username.clone(),
                password: password.clone(),
            },
            Auth::AccessToken(token) => Command::LoginToken {
                token: token.clone(),
            },
            Auth::SavedSession => Command::ResumeSession,
        };
        client.call(login)?;

        Ok(client)
    }

    /// Send a command and wait for the response.
    fn call(&mut self, command: Command) -> RemoteResult<Option<ResponseData>> {
        let id = self.next_id;
        self.next_id += 1;

        let request = Request { id, command };
        let response: Response = self.transport.send(&request)?;

        if response.id != id {
            return Err(RemoteError::IdMismatch {
                expected: id,
                got: response.id,
            });
        }

        match response.result {
            ResponseResult::Ok { data } => Ok(data),
            ResponseResult::Error { message } => Err(RemoteError::ServiceError(message)),
        }
    }

    /// Create a new blank document.
    pub fn create_document(&mut self, title: &str) -> RemoteResult<DocumentHandle> {
        let data = self.call(Command::CreateDocument {
            title: title.to_string(),
        })?;
        Self::expect_document(data)
    }

    /// Clone a template document under a new title.
    pub fn copy_document(&mut self, template: &str, title: &str) -> RemoteResult<DocumentHandle> {
        let data = self.call(Command::CopyDocument {
            template: template.to_string(),
            title: title.to_string(),
        })?;
        Self::expect_document(data)
    }

    /// List a document's worksheet handles, in sheet order.
    pub fn worksheets(&mut self, document: u64) -> RemoteResult<Vec<u64>> {
        let data = self.call(Command::ListSheets { document })?;
        match data {
            Some(ResponseData::Sheets { sheets }) => Ok(sheets),
            _ => Err(RemoteError::UnexpectedResponse),
        }
    }

    /// Get a worksheet's title.
    pub fn sheet_title(&mut self, document: u64, sheet: u64) -> RemoteResult<String> {
        let data = self.call(Command::GetSheetTitle { document, sheet })?;
        match data {
            Some(ResponseData::Title { title }) => Ok(title),
            _ => Err(RemoteError::UnexpectedResponse),
        }
    }

    /// Set a worksheet's title.
    pub fn set_sheet_title(
        &mut self,
        document: u64,
        sheet: u64,
        title: &str,
    ) -> RemoteResult<()> {
        self.call(Command::SetSheetTitle {
            document,
            sheet,
            title: title.to_string(),
        })?;
        Ok(())
    }

    /// Write a single cell (1-based row and column).
    pub fn write_cell(
        &mut self,
        document: u64,
        sheet: u64,
        row: u32,
        col: u16,
        value: CellValue,
    ) -> RemoteResult<()> {
        self.call(Command::WriteCell {
            document,
            sheet,
            row,
            col,
            value,
        })?;
        Ok(())
    }

    /// Flush a worksheet's pending writes to the service.
    pub fn flush_sheet(&mut self, document: u64, sheet: u64) -> RemoteResult<()> {
        self.call(Command::FlushSheet { document, sheet })?;
        Ok(())
    }

    /// Move a document to the service trash, or delete it permanently.
    pub fn delete_document(&mut self, document: u64, permanent: bool) -> RemoteResult<()> {
        self.call(Command::DeleteDocument {
            document,
            permanent,
        })?;
        Ok(())
    }

    fn expect_document(data: Option<ResponseData>) -> RemoteResult<DocumentHandle> {
        match data {
            Some(ResponseData::Document { document, key, url }) => Ok(DocumentHandle {
                id: document,
                key,
                url,
            }),
            _ => Err(RemoteError::UnexpectedResponse),
        }
    }
}
