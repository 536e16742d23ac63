use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Invalid configuration: {0}")]
    ConfigurationError(String),
    #[error("Cannot load configuration: {0}")]
    CannotLoadConfiguration(String),
    #[error("Role instance failed to launch: {0}")]
    LaunchError(String),
    #[error("Timed out after {0:?}")]
    TimeoutError(Duration),
    #[error("Insufficient data: {0}")]
    InsufficientDataError(String),
    #[error("Directory already exists: {}", .0.display())]
    DirectoryExistsError(PathBuf),
    #[error("Invalid trace: {0}")]
    InvalidTrace(String),
    #[error("Cannot serialize: {0}")]
    CannotSerialize(String),
    #[error("Trial panicked: {0}")]
    TrialPanicked(String),
    #[error("Report error: {0}")]
    ReportError(#[from] paxos_bench_report::report_error::ReportError),
}

impl BenchError {
    pub fn as_code(&self) -> &'static str {
        match self {
            BenchError::IoError(_) => "io_error",
            BenchError::ConfigurationError(_) => "configuration_error",
            BenchError::CannotLoadConfiguration(_) => "cannot_load_configuration",
            BenchError::LaunchError(_) => "launch_error",
            BenchError::TimeoutError(_) => "timeout_error",
            BenchError::InsufficientDataError(_) => "insufficient_data_error",
            BenchError::DirectoryExistsError(_) => "directory_exists_error",
            BenchError::InvalidTrace(_) => "invalid_trace",
            BenchError::CannotSerialize(_) => "cannot_serialize",
            BenchError::TrialPanicked(_) => "trial_panicked",
            BenchError::ReportError(_) => "report_error",
        }
    }
}

impl From<serde_json::Error> for BenchError {
    fn from(error: serde_json::Error) -> Self {
        BenchError::CannotSerialize(error.to_string())
    }
}
