//! Protocol types for communication with the remote sheet bridge.
//!
//! The protocol is JSON lines: one JSON object per line in each direction.

use serde::{Deserialize, Serialize};

/// A command sent from the client to the bridge process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Monotonically increasing request ID for correlating responses.
    pub id: u64,
    /// The command to execute.
    #[serde(flatten)]
    pub command: Command,
}

/// Commands the client can send to the bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", content = "params")]
pub enum Command {
    /// Authenticate with an explicit username and password.
    LoginCredentials { username: String, password: String },

    /// Authenticate with a pre-issued access token.
    LoginToken { token: String },

    /// Resume a session previously saved on the bridge side.
    ResumeSession,

    /// Create a new blank document. Returns a document handle.
    CreateDocument { title: String },

    /// Clone a template document (inheriting its styling) under a new
    /// title. Returns a document handle.
    CopyDocument { template: String, title: String },

    /// List the worksheet handles of a document, in sheet order.
    ListSheets { document: u64 },

    /// Get a worksheet's title.
    GetSheetTitle { document: u64, sheet: u64 },

    /// Set a worksheet's title.
    SetSheetTitle {
        document: u64,
        sheet: u64,
        title: String,
    },

    /// Write a single cell (1-based row and column).
    WriteCell {
        document: u64,
        sheet: u64,
        row: u32,
        col: u16,
        value: CellValue,
    },

    /// Flush a worksheet's pending writes to the service.
    FlushSheet { document: u64, sheet: u64 },

    /// Move a document to the service trash, or delete it permanently.
    DeleteDocument { document: u64, permanent: bool },

    /// Shut down the bridge process.
    Shutdown,
}

/// A cell value that can be sent to the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

/// A response sent from the bridge back to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// The request ID this response corresponds to.
    pub id: u64,
    /// The result of the command.
    #[serde(flatten)]
    pub result: ResponseResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum ResponseResult {
    #[serde(rename = "ok")]
    Ok {
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<ResponseData>,
    },
    #[serde(rename = "error")]
    Error { message: String },
}

/// Payload carried by a successful response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseData {
    /// A document handle with its service-side key and URL.
    Document { document: u64, key: String, url: String },
    /// Worksheet handles in sheet order.
    Sheets { sheets: Vec<u64> },
    /// A worksheet title.
    Title { title: String },
}
