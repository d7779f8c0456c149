//! One-shot FTP/FTPS reachability probe with monitoring-plugin output:
//! one connection, one status line, one exit code.

pub mod cli;
pub mod config;
pub mod error;
pub mod prober;
pub mod report;
pub mod util;

pub use cli::Cli;
pub use config::{AddressFamily, ProbeConfig};
pub use error::ProbeError;
pub use prober::{ProbeOutcome, run_probe};
pub use report::{ProbeReport, StatusCode, render};
