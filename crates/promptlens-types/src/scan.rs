use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Structured reason a directory scan produced no listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ScanErrorCode {
    /// Directory absent
    #[error("ENOENT")]
    #[serde(rename = "ENOENT")]
    NotFound,

    /// Permission denied
    #[error("EACCES")]
    #[serde(rename = "EACCES")]
    PermissionDenied,

    /// Path exists but is not a directory
    #[error("ENOTDIR")]
    #[serde(rename = "ENOTDIR")]
    NotADirectory,

    /// Listing did not settle before the deadline
    #[error("TIMEOUT")]
    #[serde(rename = "TIMEOUT")]
    Timeout,

    /// Any other I/O failure
    #[error("UNKNOWN")]
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl ScanErrorCode {
    /// Classify an I/O error
    pub fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => ScanErrorCode::NotFound,
            io::ErrorKind::PermissionDenied => ScanErrorCode::PermissionDenied,
            io::ErrorKind::NotADirectory => ScanErrorCode::NotADirectory,
            io::ErrorKind::TimedOut => ScanErrorCode::Timeout,
            _ => ScanErrorCode::Unknown,
        }
    }
}

/// Outcome of listing one directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    /// Listing completed
    pub success: bool,
    /// Accepted entries, joined onto the scanned directory
    pub files: Vec<PathBuf>,
    /// Why the scan failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ScanErrorCode>,
    /// Deadline elapsed before the listing settled
    #[serde(default)]
    pub timed_out: bool,
}

impl ScanResult {
    /// Successful listing
    pub fn ok(files: Vec<PathBuf>) -> Self {
        Self {
            success: true,
            files,
            error: None,
            timed_out: false,
        }
    }

    /// Failed listing with a structured code
    pub fn failed(code: ScanErrorCode) -> Self {
        Self {
            success: false,
            files: Vec::new(),
            error: Some(code),
            timed_out: false,
        }
    }

    /// Listing abandoned at the deadline
    pub fn timed_out() -> Self {
        Self {
            success: false,
            files: Vec::new(),
            error: Some(ScanErrorCode::Timeout),
            timed_out: true,
        }
    }
}
