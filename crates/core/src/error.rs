//! Errors raised loading or saving an object program from disk.

use std::fmt;
use std::path::PathBuf;

/// Failure reading or writing an `ObjectProgram` to/from a file.
#[derive(Debug)]
pub enum ObjectIoError {
    Io { path: PathBuf, source: std::io::Error },
    Json { path: PathBuf, source: serde_json::Error },
}

impl fmt::Display for ObjectIoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectIoError::Io { path, source } => {
                write!(f, "{}: {source}", path.display())
            }
            ObjectIoError::Json { path, source } => {
                write!(f, "{}: malformed object file: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ObjectIoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ObjectIoError::Io { source, .. } => Some(source),
            ObjectIoError::Json { source, .. } => Some(source),
        }
    }
}
