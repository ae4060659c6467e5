//! UCI engine process implementation using `tokio::process`.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::time::timeout;

use crate::{EngineError, EngineLauncher, MoveEngine};

/// Counter for naming engine processes in logs.
static NEXT_ENGINE_ID: AtomicU64 = AtomicU64::new(1);

/// Settings for UCI engine processes.
#[derive(Debug, Clone)]
pub struct UciConfig {
    /// Extra command-line arguments for the engine.
    pub args: Vec<String>,
    /// How long the engine may take to answer `uci` and `isready`.
    pub handshake_timeout: Duration,
    /// Slack on top of the move budget before a search counts as hung.
    pub response_grace: Duration,
    /// How long to wait for the process to exit after `quit`.
    pub quit_timeout: Duration,
}

impl Default for UciConfig {
    fn default() -> Self {
        Self {
            args: Vec::new(),
            handshake_timeout: Duration::from_secs(5),
            response_grace: Duration::from_millis(500),
            quit_timeout: Duration::from_secs(1),
        }
    }
}

/// Launches UCI engines from a binary located at startup.
#[derive(Debug, Clone)]
pub struct UciLauncher {
    program: PathBuf,
    config: UciConfig,
}

impl UciLauncher {
    /// Resolves `program` and returns a launcher for it.
    ///
    /// A path with a directory part must point at an existing file. A bare
    /// name is looked up on `PATH`.
    ///
    /// # Errors
    /// [`EngineError::NotFound`] if nothing matches.
    pub fn locate(
        program: impl AsRef<Path>,
        config: UciConfig,
    ) -> Result<Self, EngineError> {
        let program = program.as_ref();
        let resolved = resolve(program)
            .ok_or_else(|| EngineError::NotFound(program.to_path_buf()))?;
        tracing::info!(program = %resolved.display(), "engine binary located");
        Ok(Self {
            program: resolved,
            config,
        })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

fn resolve(program: &Path) -> Option<PathBuf> {
    if program.components().count() > 1 || program.is_absolute() {
        return program.is_file().then(|| program.to_path_buf());
    }
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

impl EngineLauncher for UciLauncher {
    type Engine = UciEngine;

    async fn launch(&self) -> Result<UciEngine, EngineError> {
        UciEngine::start(&self.program, self.config.clone()).await
    }
}

/// A running UCI engine process.
///
/// The child is killed if this value is dropped without
/// [`shutdown`](MoveEngine::shutdown).
pub struct UciEngine {
    id: u64,
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    config: UciConfig,
}

impl UciEngine {
    /// Spawns `program` and performs the UCI handshake.
    pub async fn start(
        program: &Path,
        config: UciConfig,
    ) -> Result<Self, EngineError> {
        let mut child = Command::new(program)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(EngineError::Spawn)?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::Protocol("stdin not captured".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::Protocol("stdout not captured".into()))?;

        let id = NEXT_ENGINE_ID.fetch_add(1, Ordering::Relaxed);
        let mut engine = Self {
            id,
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            config,
        };

        let deadline = engine.config.handshake_timeout;
        engine.send("uci").await?;
        engine
            .read_until(deadline, |line| (line == "uciok").then_some(()))
            .await?;
        engine.send("isready").await?;
        engine
            .read_until(deadline, |line| (line == "readyok").then_some(()))
            .await?;
        engine.send("ucinewgame").await?;

        tracing::debug!(engine = id, program = %program.display(), "engine ready");
        Ok(engine)
    }

    async fn send(&mut self, command: &str) -> Result<(), EngineError> {
        tracing::trace!(engine = self.id, command, "→ engine");
        self.stdin.write_all(command.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await?;
        Ok(())
    }

    /// Reads lines until `pick` returns `Some`, or `deadline` passes.
    async fn read_until<T>(
        &mut self,
        deadline: Duration,
        mut pick: impl FnMut(&str) -> Option<T>,
    ) -> Result<T, EngineError> {
        let id = self.id;
        let lines = &mut self.stdout;
        let read = async move {
            loop {
                let Some(line) = lines.next_line().await? else {
                    return Err(EngineError::Closed);
                };
                let line = line.trim();
                tracing::trace!(engine = id, line, "← engine");
                if let Some(value) = pick(line) {
                    return Ok(value);
                }
            }
        };
        timeout(deadline, read)
            .await
            .map_err(|_| EngineError::Timeout(deadline))?
    }
}

impl MoveEngine for UciEngine {
    async fn best_move(
        &mut self,
        fen: &str,
        budget: Duration,
    ) -> Result<String, EngineError> {
        self.send(&format!("position fen {fen}")).await?;
        self.send(&format!("go movetime {}", budget.as_millis())).await?;

        let deadline = budget + self.config.response_grace;
        let mv = self.read_until(deadline, parse_bestmove).await??;
        tracing::debug!(engine = self.id, %mv, "engine chose move");
        Ok(mv)
    }

    async fn shutdown(mut self) {
        let _ = self.send("quit").await;
        match timeout(self.config.quit_timeout, self.child.wait()).await {
            Ok(_) => tracing::debug!(engine = self.id, "engine exited"),
            Err(_) => {
                tracing::debug!(engine = self.id, "engine ignored quit, killing");
                let _ = self.child.kill().await;
            }
        }
    }
}

/// Parses a `bestmove` line.
///
/// Returns `None` for any other line (`info`, `id`, …), which the caller
/// should skip. `bestmove (none)` or a bare `bestmove` is an error: the
/// engine has no legal move to offer.
pub fn parse_bestmove(line: &str) -> Option<Result<String, EngineError>> {
    let mut parts = line.split_whitespace();
    if parts.next()? != "bestmove" {
        return None;
    }
    Some(match parts.next() {
        Some("(none)") | None => Err(EngineError::Protocol(
            "engine returned no move".into(),
        )),
        Some(mv) => Ok(mv.to_string()),
    })
}
