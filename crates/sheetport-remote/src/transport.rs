//! Transport seam: how protocol messages reach the service.

use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Stdio};

use crate::error::{RemoteError, RemoteResult};
use crate::protocol::{Request, Response};

/// Carries one request to the service and returns its response.
///
/// The bundled implementation is [`ProcessTransport`]; tests substitute
/// in-memory implementations of this trait.
pub trait Transport: Send {
    fn send(&mut self, request: &Request) -> RemoteResult<Response>;
}

/// Configuration for the bridge subprocess.
#[derive(Debug, Clone)]
pub struct ProcessTransportConfig {
    /// Path to the bridge executable.
    pub command: PathBuf,
    /// Arguments passed to the bridge.
    pub args: Vec<String>,
}

impl ProcessTransportConfig {
    /// Configuration for a bridge at the given path, no arguments
    pub fn new<P: Into<PathBuf>>(command: P) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
        }
    }
}

/// A transport that spawns the bridge process and speaks JSON lines over
/// its piped stdio. Bridge diagnostics go to our stderr.
pub struct ProcessTransport {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl ProcessTransport {
    /// Spawn the bridge process.
    pub fn spawn(config: &ProcessTransportConfig) -> RemoteResult<Self> {
        let mut cmd = std::process::Command::new(&config.command);
        cmd.args(&config.args);
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::inherit());

        let mut child = cmd.spawn()?;

        let stdin = child.stdin.take().expect("stdin was piped");
        let stdout = child.stdout.take().expect("stdout was piped");

        log::debug!("spawned sheet bridge: {}", config.command.display());

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }
}

impl Transport for ProcessTransport {
    fn send(&mut self, request: &Request) -> RemoteResult<Response> {
        let json = serde_json::to_string(request)?;

        writeln!(self.stdin, "{json}").map_err(|e| RemoteError::SendFailed(e.to_string()))?;
        self.stdin
            .flush()
            .map_err(|e| RemoteError::SendFailed(e.to_string()))?;

        let mut line = String::new();
        self.stdout
            .read_line(&mut line)
            .map_err(|e| RemoteError::ReadFailed(e.to_string()))?;

        if line.is_empty() {
            return Err(RemoteError::NotRunning);
        }

        Ok(serde_json::from_str(&line)?)
    }
}

impl Drop for ProcessTransport {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
