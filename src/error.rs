use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("unreadable glob match: {0}")]
    Glob(#[from] glob::GlobError),

    #[error("{path}:{line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// The file stem does not carry an integer timestamp in its third
    /// underscore-delimited segment.
    #[error("cannot extract timestamp from {name:?}: {reason}")]
    FileName { name: String, reason: String },

    #[error("timestamp {timestamp} appears in both {first} and {second}")]
    DuplicateTimestamp {
        timestamp: i64,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("unknown grid plane {0:?}, expected \"xy\" or \"xz\"")]
    UnknownPlane(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("frame rate {0} does not give a usable frame interval")]
    InvalidFps(f64),

    #[error("viewer window is not open")]
    WindowNotOpen,

    #[error("viewer error: {0}")]
    Viewer(#[from] rerun::RecordingStreamError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
