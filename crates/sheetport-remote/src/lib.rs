//! # sheetport-remote
//!
//! Client library for the remote sheet service used by sheetport's
//! `RemoteSheet` backend. The service is reached through a bridge process
//! speaking one JSON object per line over stdio; the [`Transport`] trait is
//! the seam, so tests (and alternative deployments) can substitute any
//! other carrier for the same protocol.
//!
//! # Architecture
//!
//! ```text
//! RemoteSheet backend (sheetport)
//!     └── RemoteClient (this crate)
//!           └── Transport: ProcessTransport | custom impl
//!                 └── remote sheet service
//! ```

mod client;
mod error;
mod protocol;
mod transport;

pub use client::{Auth, DocumentHandle, RemoteClient};
pub use error::{RemoteError, RemoteResult};
pub use protocol::{CellValue, Command, Request, Response, ResponseData, ResponseResult};
pub use transport::{ProcessTransport, ProcessTransportConfig, Transport};
