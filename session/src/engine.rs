//! Link to the external battle-simulation process
//!
//! The engine is a child process speaking newline-delimited text over
//! stdin/stdout. A writer task forwards outbound commands to stdin and a
//! reader task groups stdout lines into blank-line-delimited chunks, so the
//! dispatcher can drain a reactive burst with a bounded wait instead of
//! blocking on the stream.

use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::time::timeout;

use crate::SessionError;

/// Where to find the simulator and how long to wait on it.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Program spawned for each session.
    pub program: String,
    pub args: Vec<String>,
    /// Bound on the wait for the first reactive output chunk.
    pub settle: Duration,
    /// Quiet window after which a burst is considered finished.
    pub idle: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: "pokemon-showdown".to_string(),
            args: vec!["simulate-battle".to_string()],
            settle: Duration::from_secs(2),
            idle: Duration::from_millis(150),
        }
    }
}

/// Channel-backed handle to one engine process.
///
/// Tests stand in for the process with `from_channels`.
pub struct EngineLink {
    outbound: mpsc::UnboundedSender<String>,
    inbound: mpsc::UnboundedReceiver<String>,
    child: Option<Child>,
}

impl EngineLink {
    /// Spawn the simulator process and wire its stdio to channel tasks.
    pub fn spawn(config: &EngineConfig) -> Result<Self> {
        let mut child = Command::new(&config.program)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn simulator `{}`", config.program))?;

        let mut stdin = child.stdin.take().context("simulator stdin unavailable")?;
        let stdout = child.stdout.take().context("simulator stdout unavailable")?;

        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
        let (in_tx, in_rx) = mpsc::unbounded_channel::<String>();

        tokio::spawn(async move {
            while let Some(line) = out_rx.recv().await {
                if stdin.write_all(line.as_bytes()).await.is_err() {
                    break;
                }
            }
        });

        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            let mut chunk = String::new();
            while let Ok(Some(line)) = lines.next_line().await {
                if line.is_empty() {
                    if !chunk.is_empty() && in_tx.send(std::mem::take(&mut chunk)).is_err() {
                        break;
                    }
                } else {
                    if !chunk.is_empty() {
                        chunk.push('\n');
                    }
                    chunk.push_str(&line);
                }
            }
            if !chunk.is_empty() {
                let _ = in_tx.send(chunk);
            }
        });

        Ok(Self {
            outbound: out_tx,
            inbound: in_rx,
            child: Some(child),
        })
    }

    /// Build a link over raw channels, standing in for a live process.
    pub fn from_channels(
        outbound: mpsc::UnboundedSender<String>,
        inbound: mpsc::UnboundedReceiver<String>,
    ) -> Self {
        Self {
            outbound,
            inbound,
            child: None,
        }
    }

    /// Write one command line to the engine.
    pub fn send(&self, command: &str) -> Result<(), SessionError> {
        self.outbound.send(format!("{command}\n")).map_err(|_| {
            SessionError::EngineWrite("simulator is no longer accepting input".to_string())
        })
    }

    /// Collect the engine's reactive output. The first chunk is bounded by
    /// `settle` and the burst ends after `idle` of silence. Silence for the
    /// whole settle window yields an empty vec, never an error.
    pub async fn drain(&mut self, settle: Duration, idle: Duration) -> Vec<String> {
        let mut chunks = Vec::new();
        match timeout(settle, self.inbound.recv()).await {
            Ok(Some(chunk)) => chunks.push(chunk),
            Ok(None) | Err(_) => return chunks,
        }
        while let Ok(Some(chunk)) = timeout(idle, self.inbound.recv()).await {
            chunks.push(chunk);
        }
        chunks
    }

    /// Best-effort engine shutdown. Failure is logged, never raised.
    pub async fn shutdown(&mut self) {
        if let Some(child) = self.child.as_mut() {
            if let Err(e) = child.kill().await {
                tracing::warn!(error = %e, "failed to stop simulator process");
            }
        }
    }
}
