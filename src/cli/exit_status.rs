use std::process::ExitCode;

/// Process exit status of an `ngi18n` command.
///
/// - `Success` (0): nothing to report
/// - `Failure` (1): problems found, fixes pending, identifier not located, or
///   config file already present
/// - `Error` (2): the command itself failed (unreadable file, bad config, unknown fix action)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
    Error,
}

impl ExitStatus {
    /// `Failure` when `failed`, otherwise `Success`.
    pub fn failure_if(failed: bool) -> Self {
        if failed { Self::Failure } else { Self::Success }
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::SUCCESS,
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}
