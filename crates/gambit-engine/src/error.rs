use std::path::PathBuf;
use std::time::Duration;

/// Errors that can occur while talking to an engine.
///
/// Every variant is fatal to the driver that owns the engine, never to
/// the session it plays in.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The engine binary couldn't be found.
    #[error("engine binary not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The engine process couldn't be started.
    #[error("failed to start engine: {0}")]
    Spawn(#[source] std::io::Error),

    /// Reading from or writing to the engine failed.
    #[error("engine i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// The engine didn't answer within the allowed time.
    #[error("engine did not respond within {0:?}")]
    Timeout(Duration),

    /// The engine closed its output.
    #[error("engine exited")]
    Closed,

    /// The engine answered with something we can't use.
    #[error("engine protocol violation: {0}")]
    Protocol(String),
}
