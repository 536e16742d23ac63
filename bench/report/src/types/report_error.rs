use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    #[error("Invalid result row at line {0}: {1}")]
    InvalidRow(usize, String),
    #[error("Cannot serialize result row: {0}")]
    CannotSerialize(String),
}
