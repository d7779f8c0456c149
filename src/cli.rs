use std::time::Duration;

use clap::Parser;

/// Command-line flags. `-v`/`--version` is additionally honored by a
/// pre-parse scan in main so the banner wins over invalid flag
/// combinations.
#[derive(Parser, Debug, Clone)]
#[command(name = "ftp-probe", disable_version_flag = true)]
#[command(about = "Monitoring probe that checks FTP service reachability")]
pub struct Cli {
    /// Timeout to wait for connection (e.g. 10s, 500ms)
    #[arg(long = "timeout", default_value = "10s", value_parser = parse_duration)]
    pub timeout: Duration,

    /// IP address or host name
    #[arg(short = 'H', long = "hostname", default_value = "127.0.0.1")]
    pub hostname: String,

    /// Port number
    #[arg(short = 'p', long = "port", default_value_t = 21)]
    pub port: u16,

    /// Use TLS
    #[arg(short = 'S', long = "ssl")]
    pub ssl: bool,

    /// Hostname to present for SNI
    #[arg(long = "sni", default_value = "")]
    pub sni: String,

    /// Use explicit TLS mode (AUTH TLS after the banner)
    #[arg(long = "explicit")]
    pub explicit: bool,

    /// Use tcp4 only
    #[arg(short = '4')]
    pub tcp4: bool,

    /// Use tcp6 only
    #[arg(short = '6')]
    pub tcp6: bool,

    /// Show version
    #[arg(short = 'v', long = "version")]
    pub version: bool,
}

/// Parse `10s` / `500ms` / `2m` style values; a bare number is taken
/// as seconds.
fn parse_duration(value: &str) -> Result<Duration, String> {
    let value = value.trim();
    let unit_start = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.len());
    let (number, unit) = value.split_at(unit_start);
    let number: f64 = number
        .parse()
        .map_err(|_| format!("invalid duration: {value:?}"))?;
    let secs = match unit {
        "" | "s" => number,
        "ms" => number / 1e3,
        "us" | "µs" => number / 1e6,
        "ns" => number / 1e9,
        "m" => number * 60.0,
        "h" => number * 3600.0,
        _ => return Err(format!("invalid duration unit: {unit:?}")),
    };
    if !secs.is_finite() || secs < 0.0 {
        return Err(format!("invalid duration: {value:?}"));
    }
    Ok(Duration::from_secs_f64(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_units() {
        assert_eq!(parse_duration("10s").unwrap(), Duration::from_secs(10));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
        assert_eq!(parse_duration("1ns").unwrap(), Duration::from_nanos(1));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
        assert_eq!(parse_duration("0.5s").unwrap(), Duration::from_millis(500));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("abc").is_err());
        assert!(parse_duration("10x").is_err());
        assert!(parse_duration("-1s").is_err());
    }

    #[test]
    fn flags_parse() {
        let cli = Cli::try_parse_from(["ftp-probe", "-S", "--explicit", "--sni", "x", "-v"]).unwrap();
        assert!(cli.ssl && cli.explicit && cli.version);
        assert_eq!(cli.sni, "x");
    }
}
