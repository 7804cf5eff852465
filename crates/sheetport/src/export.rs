//! Export supervisor
//!
//! Orchestrates a two-phase export: a cheap prepare step (filename,
//! token, document construction) followed by the expensive population
//! step (backend engine init plus the caller's composition routine).
//! For the local workbook the population step can run in a forked worker
//! process so the memory the encoding engine claims is returned to the
//! operating system when the worker exits; remote exports always
//! populate in-process since their per-cell calls hold no such memory.

use std::path::PathBuf;

use chrono::Local;
use sheetport_remote::Transport;

use crate::backend::{LocalWorkbook, RemoteSheet, RemoteSheetOptions};
use crate::document::{Document, SheetBackend};
use crate::error::{Error, Result};
use crate::options::DocumentOptions;
use crate::token::make_token;

/// Which backend an export runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Local XLSX workbook
    Workbook,
    /// Remote API-backed sheet
    RemoteSheet,
}

/// Per-export configuration assembled before the document is built.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Client-visible document name (defaults to
    /// `"Export of {type} {date}"`)
    pub filename: Option<String>,
    /// Backend initialization options
    pub document: DocumentOptions,
    /// Remote backend construction options (ignored for workbook
    /// exports)
    pub remote: RemoteSheetOptions,
}

impl ExportOptions {
    /// Override the client-visible document name
    pub fn with_filename<S: Into<String>>(mut self, filename: S) -> Self {
        self.filename = Some(filename.into());
        self
    }
}

/// Optional per-record export customization.
///
/// Records that need to tweak an export implement this and return it
/// from [`Exportable::hooks`]; the supervisor checks for it through the
/// typed optional, never through reflection.
pub trait ExportHooks {
    /// Adjust the export options before the document is prepared
    fn before_prepare(&self, _target: Target, _options: &mut ExportOptions) {}

    /// Replacement document options for this record, if any
    fn document_options(&self) -> Option<DocumentOptions> {
        None
    }
}

/// A record that can be exported.
pub trait Exportable {
    /// Type name used in the default document filename
    fn type_name(&self) -> &str;

    /// Issue layout operations against the document. Invoked exactly
    /// once per export, inside whichever process performs the
    /// population; failures must be raised as errors, never signalled
    /// by return value.
    fn compose<B: SheetBackend>(&self, doc: &mut Document<B>) -> Result<()>;

    /// Optional customization collaborator
    fn hooks(&self) -> Option<&dyn ExportHooks> {
        None
    }
}

/// A shared external connection that cannot cross the fork boundary.
///
/// Discipline is strict hand-off: the supervisor calls `release` before
/// forking and each side calls `reacquire` independently; the same live
/// connection object is never touched from both processes.
pub trait ConnectionGuard {
    /// Close the connection ahead of the fork
    fn release(&self) -> Result<()>;

    /// Re-open the connection on this side of the boundary
    fn reacquire(&self) -> Result<()>;
}

/// How the expensive population phase runs.
///
/// A declared capability, not a probed one: requesting [`Fork`] on a
/// platform that cannot fork is a configuration error, never a silent
/// fallback that could mask a worker bug.
///
/// [`Fork`]: IsolationMode::Fork
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationMode {
    /// Populate in a forked worker process
    Fork,
    /// Populate synchronously in the calling process
    InProcess,
}

impl IsolationMode {
    /// Whether this platform can fork a worker
    pub fn fork_supported() -> bool {
        cfg!(unix)
    }
}

impl Default for IsolationMode {
    fn default() -> Self {
        if Self::fork_supported() {
            IsolationMode::Fork
        } else {
            IsolationMode::InProcess
        }
    }
}

/// Supervisor configuration.
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    /// How the population phase runs
    pub isolation: IsolationMode,
    /// Directory workbook artifacts are written into
    pub storage_root: PathBuf,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            isolation: IsolationMode::default(),
            storage_root: std::env::temp_dir(),
        }
    }
}

/// The export supervisor.
pub struct Exporter {
    config: ExporterConfig,
}

impl Exporter {
    /// Supervisor with the platform-default configuration
    pub fn new() -> Self {
        Self {
            config: ExporterConfig::default(),
        }
    }

    /// Supervisor with explicit configuration.
    ///
    /// Fails with a configuration error when fork isolation is requested
    /// on a platform without fork support.
    pub fn with_config(config: ExporterConfig) -> Result<Self> {
        if config.isolation == IsolationMode::Fork && !IsolationMode::fork_supported() {
            return Err(Error::Configuration(
                "process isolation via fork is not available on this platform".into(),
            ));
        }
        Ok(Self { config })
    }

    /// Export a record to a local workbook file.
    ///
    /// Returns the document handle; in fork isolation the artifact on
    /// disk is the populated output and the handle carries its path,
    /// while the in-process path returns the fully populated document.
    /// `connection` is the caller's shared external connection, if it
    /// holds one across the export.
    pub fn to_workbook<E: Exportable>(
        &self,
        record: &E,
        options: ExportOptions,
        connection: Option<&dyn ConnectionGuard>,
    ) -> Result<Document<LocalWorkbook>> {
        let options = Self::prepared_options(record, Target::Workbook, options);
        let filename = Self::resolve_filename(record, &options);

        // Committing to the name is cheap; the workbook engine is only
        // initialized inside the populating process.
        let token = make_token();
        let backend =
            LocalWorkbook::new(filename, token).with_storage_root(self.config.storage_root.clone());
        let mut doc = Document::new(backend);

        match self.config.isolation {
            IsolationMode::Fork => {
                self.populate_isolated(record, &mut doc, &options, connection)?
            }
            IsolationMode::InProcess => Self::populate(record, &mut doc, &options)?,
        }

        Ok(doc)
    }

    /// Export a record to a remote sheet reached over `transport`.
    pub fn to_remote_sheet<E: Exportable>(
        &self,
        record: &E,
        options: ExportOptions,
        transport: Box<dyn Transport>,
    ) -> Result<Document<RemoteSheet>> {
        let options = Self::prepared_options(record, Target::RemoteSheet, options);
        let filename = Self::resolve_filename(record, &options);

        let backend = RemoteSheet::connect(Some(&filename), &options.remote, transport)?;
        let mut doc = Document::new(backend);

        Self::populate(record, &mut doc, &options)?;

        Ok(doc)
    }

    fn prepared_options<E: Exportable>(
        record: &E,
        target: Target,
        mut options: ExportOptions,
    ) -> ExportOptions {
        if let Some(hooks) = record.hooks() {
            hooks.before_prepare(target, &mut options);
            if let Some(document) = hooks.document_options() {
                options.document = document;
            }
        }
        options
    }

    fn resolve_filename<E: Exportable>(record: &E, options: &ExportOptions) -> String {
        options.filename.clone().unwrap_or_else(|| {
            format!(
                "Export of {} {}",
                record.type_name(),
                Local::now().format("%Y-%m-%d")
            )
        })
    }

    /// The expensive phase: backend engine init, the caller's
    /// composition routine, then save.
    fn populate<E: Exportable, B: SheetBackend>(
        record: &E,
        doc: &mut Document<B>,
        options: &ExportOptions,
    ) -> Result<()> {
        doc.backend_mut().finish_init(&options.document)?;
        record.compose(doc)?;
        doc.save()
    }

    /// Fork a worker for the expensive phase and block until it exits.
    ///
    /// The worker logs its own failures in full; the supervisor only
    /// sees the exit status and maps any non-zero code to a single
    /// generic export error. The supervising side's connection is
    /// restored on every path out of here.
    #[cfg(unix)]
    fn populate_isolated<E: Exportable>(
        &self,
        record: &E,
        doc: &mut Document<LocalWorkbook>,
        options: &ExportOptions,
        connection: Option<&dyn ConnectionGuard>,
    ) -> Result<()> {
        use nix::sys::wait::{waitpid, WaitStatus};
        use nix::unistd::{fork, ForkResult};

        // The shared connection cannot cross the fork boundary: hand it
        // off now and re-acquire independently on each side.
        if let Some(conn) = connection {
            conn.release()?;
        }

        match unsafe { fork() } {
            Ok(ForkResult::Parent { child }) => {
                let restored = match connection {
                    Some(conn) => conn.reacquire(),
                    None => Ok(()),
                };

                let status = waitpid(child, None);
                restored?;

                let code = match status {
                    Ok(WaitStatus::Exited(_, code)) => code,
                    Ok(status) => {
                        log::error!("export worker ended abnormally: {status:?}");
                        1
                    }
                    Err(e) => {
                        log::error!("failed to wait for export worker: {e}");
                        1
                    }
                };

                if code != 0 {
                    return Err(Error::Export);
                }
                Ok(())
            }
            Ok(ForkResult::Child) => {
                let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    if let Some(conn) = connection {
                        conn.reacquire()?;
                    }
                    Self::populate(record, doc, options)
                }));

                let code = match outcome {
                    Ok(Ok(())) => 0,
                    Ok(Err(e)) => {
                        log::error!("export worker failed: {e}");
                        1
                    }
                    Err(_) => {
                        log::error!("export worker panicked");
                        1
                    }
                };
                std::process::exit(code);
            }
            Err(e) => {
                let restored = match connection {
                    Some(conn) => conn.reacquire(),
                    None => Ok(()),
                };
                restored?;
                Err(Error::Io(std::io::Error::from_raw_os_error(e as i32)))
            }
        }
    }

    #[cfg(not(unix))]
    fn populate_isolated<E: Exportable>(
        &self,
        _record: &E,
        _doc: &mut Document<LocalWorkbook>,
        _options: &ExportOptions,
        _connection: Option<&dyn ConnectionGuard>,
    ) -> Result<()> {
        Err(Error::Configuration(
            "process isolation via fork is not available on this platform".into(),
        ))
    }
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Extensions the supervisor can target, for outer routing layers.
pub fn allowed_extensions() -> [&'static str; 2] {
    [LocalWorkbook::EXTENSION, RemoteSheet::EXTENSION]
}
