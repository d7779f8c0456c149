use thiserror::Error;

use crate::report::StatusCode;

/// Terminal failure modes of one probe run. Nothing is retried: every
/// error is classified, printed, and becomes the exit status.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// -4 and -6 requested together.
    #[error("Both tcp4 and tcp6 are specified")]
    ConflictingAddressFamily,

    /// DNS resolution, TCP connect, or implicit TLS handshake failure.
    #[error(transparent)]
    Dial(#[from] std::io::Error),

    /// Failure during the control-channel exchange or explicit TLS
    /// upgrade.
    #[error("{0}")]
    Protocol(String),

    /// The orchestrator's deadline fired before the dial sequence
    /// resolved.
    #[error("connection or tls handshake timeout")]
    Timeout,

    /// Defensive fallback for anything outside the taxonomy above.
    #[error("{0}")]
    Unexpected(String),
}

impl ProbeError {
    /// Monitoring status this error classifies to.
    pub fn status(&self) -> StatusCode {
        match self {
            ProbeError::ConflictingAddressFamily => StatusCode::Unknown,
            _ => StatusCode::Critical,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert_eq!(ProbeError::ConflictingAddressFamily.status(), StatusCode::Unknown);
        assert_eq!(ProbeError::Timeout.status(), StatusCode::Critical);
        assert_eq!(ProbeError::Protocol("x".into()).status(), StatusCode::Critical);
        assert_eq!(
            ProbeError::Dial(std::io::Error::other("refused")).status(),
            StatusCode::Critical
        );
        assert_eq!(ProbeError::Unexpected("x".into()).status(), StatusCode::Critical);
    }

    #[test]
    fn timeout_text_is_fixed() {
        assert_eq!(ProbeError::Timeout.to_string(), "connection or tls handshake timeout");
    }
}
