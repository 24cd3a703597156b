use std::path::PathBuf;
use thiserror::Error;

/// Why a single input line could not become a [`PaymentRecord`].
///
/// These never abort a run; the pipeline logs and skips the line.
///
/// [`PaymentRecord`]: crate::types::PaymentRecord
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    #[error("expected at least 4 fields, found {0}")]
    MissingField(usize),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("empty user id in field {0}")]
    EmptyUser(usize),

    #[error("line is not valid UTF-8 after byte {0}")]
    InvalidEncoding(usize),
}

#[derive(Error, Debug)]
pub enum FraudError {
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FraudError {
    pub fn open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FraudError::Open {
            path: path.into(),
            source,
        }
    }
}

pub type FraudResult<T> = Result<T, FraudError>;
