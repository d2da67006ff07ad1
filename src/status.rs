//! Exit status codes for the CLI
//!
//! rcurl follows curl's shell conventions with a reduced set of codes:
//! - 0: Success
//! - 1: Any error (invalid input, transport failures, HTTP status >= 400)

use std::process::{ExitCode, Termination};

/// Exit status codes following standard Unix conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitStatus {
    /// Successful execution
    Success = 0,
    /// Any fatal error, including an HTTP error status
    Error = 1,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status as u8)
    }
}

impl Termination for ExitStatus {
    fn report(self) -> ExitCode {
        ExitCode::from(self as u8)
    }
}

impl ExitStatus {
    /// Classify a received HTTP status code.
    ///
    /// Responses with a status of 400 or above fail the invocation even though
    /// the exchange itself completed.
    pub fn from_http_status(status_code: u16) -> Self {
        if status_code >= 400 {
            ExitStatus::Error
        } else {
            ExitStatus::Success
        }
    }
}
