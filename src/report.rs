use std::process::ExitCode;

use crate::config::ProbeConfig;
use crate::error::ProbeError;
use crate::prober::ProbeOutcome;
use crate::util::sanitize_line;

/// Service label leading every status line.
const SERVICE: &str = "FTP";

/// Monitoring-plugin status codes. `Warning` is part of the contract
/// but currently produced by no probe path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok = 0,
    Warning = 1,
    Critical = 2,
    Unknown = 3,
}

impl StatusCode {
    pub fn exit_code(self) -> u8 {
        self as u8
    }
}

impl From<StatusCode> for ExitCode {
    fn from(code: StatusCode) -> Self {
        ExitCode::from(code.exit_code())
    }
}

/// Final single-line report and its exit status.
#[derive(Debug)]
pub struct ProbeReport {
    pub message: String,
    pub code: StatusCode,
}

/// Turn an orchestration outcome into the status line and exit code.
///
/// The success line carries a perf-data suffix in the common plugin
/// convention: `time=<s>s;<warn>;<crit>;<min>;<max>` with empty
/// thresholds and the configured timeout as the maximum.
pub fn render(outcome: &ProbeOutcome, config: &ProbeConfig) -> ProbeReport {
    let transcript = sanitize_line(&outcome.transcript);
    match &outcome.result {
        Ok(()) => {
            let elapsed = outcome.elapsed.as_secs_f64();
            ProbeReport {
                message: format!(
                    "{SERVICE} OK - {elapsed:.3} second response time on {} port {} [{transcript}]|time={elapsed:.6}s;;;0.000000;{:.6}",
                    config.host,
                    config.port,
                    config.timeout.as_secs_f64(),
                ),
                code: StatusCode::Ok,
            }
        }
        Err(err @ ProbeError::ConflictingAddressFamily) => ProbeReport {
            message: err.to_string(),
            code: StatusCode::Unknown,
        },
        Err(ProbeError::Unexpected(msg)) => ProbeReport {
            message: format!(
                "{SERVICE} connection failed with unexpected error: {}",
                sanitize_line(msg)
            ),
            code: StatusCode::Critical,
        },
        Err(err) => ProbeReport {
            message: format!(
                "{SERVICE} CRITICAL: {} on {} port {} [{transcript}]",
                sanitize_line(&err.to_string()),
                config.host,
                config.port,
            ),
            code: StatusCode::Critical,
        },
    }
}
