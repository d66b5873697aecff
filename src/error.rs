use std::{
    num::{ParseFloatError, ParseIntError},
    path::PathBuf,
};
use thiserror::Error;

pub type JacquardResult<T> = std::result::Result<T, JacquardError>;

#[derive(Debug, Error)]
pub enum JacquardError {
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    ParseInt(#[from] ParseIntError),
    #[error(transparent)]
    ParseFloat(#[from] ParseFloatError),
    #[error("Unable to determine which variant caller produced {}", path.display())]
    UnknownCaller { path: PathBuf },
    #[error(
        "Input directory {} mixes output of multiple callers ({}); process one caller per directory",
        dir.display(),
        callers.join(", ")
    )]
    AmbiguousCaller { dir: PathBuf, callers: Vec<String> },
    #[error("Sample [{sample}] is missing expected file(s): {}", missing.join(", "))]
    IncompleteFileSet { sample: String, missing: Vec<String> },
    #[error("Malformed record in {} at line {line}: {message}", path.display())]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        message: String,
    },
    #[error("Cannot access {}: {message}", path.display())]
    DirectoryAccess { path: PathBuf, message: String },
    #[error("Invalid gzip header: {}", path.display())]
    InvalidGzipHeader { path: PathBuf },
}

impl JacquardError {
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    pub fn directory_access(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::DirectoryAccess {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[macro_export]
macro_rules! jacquard_error {
    ($($arg:tt)*) => {
        $crate::error::JacquardError::message(format!($($arg)*))
    };
}
