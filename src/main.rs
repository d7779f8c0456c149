use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use ftp_probe::{Cli, ProbeConfig, ProbeReport, StatusCode};

#[tokio::main]
async fn main() -> ExitCode {
    // --version wins over parse errors so a monitoring host can always
    // identify the plugin
    if std::env::args().skip(1).any(|arg| arg == "-v" || arg == "--version") {
        print_version();
        return StatusCode::Ok.into();
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if err.kind() == ErrorKind::DisplayHelp => {
            let _ = err.print();
            return StatusCode::Ok.into();
        }
        Err(err) => {
            let _ = err.print();
            return StatusCode::Unknown.into();
        }
    };
    if cli.version {
        print_version();
        return StatusCode::Ok.into();
    }

    let report = match run(cli).await {
        Ok(report) => report,
        Err(err) => ProbeReport {
            message: format!("FTP connection failed with unexpected error: {err:#}"),
            code: StatusCode::Critical,
        },
    };
    println!("{}", report.message);
    report.code.into()
}

async fn run(cli: Cli) -> anyhow::Result<ProbeReport> {
    init_logging()?;

    let config = match ProbeConfig::from_cli(&cli) {
        Ok(config) => config,
        // contradictory flags never reach the orchestrator
        Err(err) => return Ok(ProbeReport { message: err.to_string(), code: err.status() }),
    };

    debug!(host = %config.host, port = config.port, ssl = config.ssl, "starting probe");
    let outcome = ftp_probe::run_probe(&config).await;
    Ok(ftp_probe::render(&outcome, &config))
}

fn print_version() {
    println!(
        "{} {} ({})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        env!("FTP_PROBE_RUSTC"),
    );
}

/// Diagnostics go to stderr so stdout stays a single status line.
fn init_logging() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing init: {e}"))
}
