use std::net::SocketAddr;
use std::time::Duration;

use crate::cli::Cli;
use crate::error::ProbeError;

/// Restriction on which address family the probe may dial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFamily {
    Any,
    V4Only,
    V6Only,
}

impl AddressFamily {
    pub fn matches(self, addr: &SocketAddr) -> bool {
        match self {
            AddressFamily::Any => true,
            AddressFamily::V4Only => addr.is_ipv4(),
            AddressFamily::V6Only => addr.is_ipv6(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AddressFamily::Any => "tcp",
            AddressFamily::V4Only => "tcp4",
            AddressFamily::V6Only => "tcp6",
        }
    }
}

/// Validated, immutable input for one probe run.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub timeout: Duration,
    pub host: String,
    pub port: u16,
    pub ssl: bool,
    pub explicit: bool,
    pub sni: String,
    pub family: AddressFamily,
}

impl ProbeConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self, ProbeError> {
        let family = match (cli.tcp4, cli.tcp6) {
            (true, true) => return Err(ProbeError::ConflictingAddressFamily),
            (true, false) => AddressFamily::V4Only,
            (false, true) => AddressFamily::V6Only,
            (false, false) => AddressFamily::Any,
        };
        Ok(Self {
            timeout: cli.timeout,
            host: cli.hostname.clone(),
            port: cli.port,
            ssl: cli.ssl,
            explicit: cli.explicit,
            sni: cli.sni.clone(),
            family,
        })
    }

    /// Name presented during the TLS handshake: the SNI override when
    /// given, the target hostname otherwise.
    pub fn server_name(&self) -> &str {
        if self.sni.is_empty() { &self.host } else { &self.sni }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("ftp-probe").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults() {
        let config = ProbeConfig::from_cli(&parse(&[])).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 21);
        assert!(!config.ssl);
        assert!(!config.explicit);
        assert_eq!(config.family, AddressFamily::Any);
        assert_eq!(config.server_name(), "127.0.0.1");
    }

    #[test]
    fn conflicting_families_rejected() {
        let err = ProbeConfig::from_cli(&parse(&["-4", "-6"])).unwrap_err();
        assert!(matches!(err, ProbeError::ConflictingAddressFamily));
    }

    #[test]
    fn single_family_accepted() {
        let v4 = ProbeConfig::from_cli(&parse(&["-4"])).unwrap();
        assert_eq!(v4.family, AddressFamily::V4Only);
        let v6 = ProbeConfig::from_cli(&parse(&["-6"])).unwrap();
        assert_eq!(v6.family, AddressFamily::V6Only);
    }

    #[test]
    fn sni_overrides_hostname() {
        let config =
            ProbeConfig::from_cli(&parse(&["-H", "192.0.2.7", "--sni", "ftp.example.org"])).unwrap();
        assert_eq!(config.server_name(), "ftp.example.org");
    }

    #[test]
    fn family_matching() {
        let v4: SocketAddr = "192.0.2.1:21".parse().unwrap();
        let v6: SocketAddr = "[2001:db8::1]:21".parse().unwrap();
        assert!(AddressFamily::Any.matches(&v4) && AddressFamily::Any.matches(&v6));
        assert!(AddressFamily::V4Only.matches(&v4) && !AddressFamily::V4Only.matches(&v6));
        assert!(AddressFamily::V6Only.matches(&v6) && !AddressFamily::V6Only.matches(&v4));
    }
}
