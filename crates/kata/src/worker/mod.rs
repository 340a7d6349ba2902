//! Worker process management
//!
//! Every judging run happens in a fresh `kata-worker` process. The host
//! writes one request to the worker's stdin and reads one response from its
//! stdout. Killing the process is the only way a run is ever cancelled.

use std::path::PathBuf;

use thiserror::Error;

pub use crate::worker::command::{DEFAULT_INHERITED_ENV, WorkerCommand};
pub use crate::worker::process::{WorkerExit, WorkerProcess};

mod command;
mod process;

/// Errors that occur while talking to a worker process
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("failed to spawn worker {}: {source}", path.display())]
    SpawnFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode worker request: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode worker response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("worker response exceeded {limit} bytes")]
    ResponseTooLarge { limit: usize },

    #[error("worker {0} stream is not available")]
    StreamClosed(&'static str),
}
