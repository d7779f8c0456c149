pub mod dial;
pub mod session;
pub mod tls;

use std::time::Duration;

use tokio::io::BufReader;
use tokio::sync::oneshot;
use tokio::time::{Instant, timeout};
use tracing::debug;

use crate::config::ProbeConfig;
use crate::error::ProbeError;
use dial::{DialStrategy, ProbeStream};

/// FTP service-ready greeting.
const CODE_READY: u16 = 220;
/// AUTH TLS accepted.
const CODE_AUTH_OK: u16 = 234;

/// What one orchestration run produced.
#[derive(Debug)]
pub struct ProbeOutcome {
    pub transcript: String,
    pub result: Result<(), ProbeError>,
    pub elapsed: Duration,
}

/// Race the dial/handshake/quit sequence against the configured
/// deadline.
///
/// The sequence runs on its own task and hands back its result over a
/// single-slot channel, so it never blocks reporting to a receiver
/// that already gave up. Exactly one of {completion, timeout} decides
/// the outcome; the loser is abandoned, never awaited.
pub async fn run_probe(config: &ProbeConfig) -> ProbeOutcome {
    let (tx, rx) = oneshot::channel();
    let start = Instant::now();

    let task_config = config.clone();
    tokio::spawn(async move {
        let mut transcript = String::new();
        let result = attempt(&task_config, &mut transcript).await;
        // the receiver is gone once the deadline wins
        let _ = tx.send((transcript, result));
    });

    let (transcript, result) = match timeout(config.timeout, rx).await {
        Ok(Ok(completed)) => completed,
        Ok(Err(_closed)) => (
            String::new(),
            Err(ProbeError::Unexpected(
                "probe task ended without reporting a result".to_string(),
            )),
        ),
        Err(_deadline) => (String::new(), Err(ProbeError::Timeout)),
    };

    ProbeOutcome { transcript, result, elapsed: start.elapsed() }
}

/// Dial, read the greeting, negotiate explicit TLS when requested, and
/// close the session. Whatever was exchanged before a failure stays in
/// `transcript`.
async fn attempt(config: &ProbeConfig, transcript: &mut String) -> Result<(), ProbeError> {
    let strategy = DialStrategy::from_config(config)?;
    let stream = strategy.connect().await?;
    let mut stream = BufReader::new(stream);

    let banner = session::read_reply(&mut stream, transcript).await?;
    if banner.code != CODE_READY {
        return Err(ProbeError::Protocol(format!("unexpected greeting: {}", banner.line)));
    }

    let mut stream = if config.ssl && config.explicit {
        upgrade_tls(&strategy, stream, transcript).await?
    } else {
        stream
    };

    // reachability is proven; a server that drops the connection on
    // QUIT does not fail the probe
    match session::send_command(&mut stream, transcript, "QUIT").await {
        Ok(()) => {
            if let Err(e) = session::read_reply(&mut stream, transcript).await {
                debug!(error = %e, "quit reply not received");
            }
        }
        Err(e) => debug!(error = %e, "quit not sent"),
    }
    Ok(())
}

async fn upgrade_tls(
    strategy: &DialStrategy,
    mut stream: BufReader<ProbeStream>,
    transcript: &mut String,
) -> Result<BufReader<ProbeStream>, ProbeError> {
    session::send_command(&mut stream, transcript, "AUTH TLS").await?;
    let reply = session::read_reply(&mut stream, transcript).await?;
    if reply.code != CODE_AUTH_OK {
        return Err(ProbeError::Protocol(format!("AUTH TLS refused: {}", reply.line)));
    }
    // nothing is buffered past the 234 reply: the server only speaks
    // again in response to our ClientHello
    let plain = match stream.into_inner() {
        ProbeStream::Plain(tcp) => tcp,
        ProbeStream::Tls(_) => {
            return Err(ProbeError::Protocol("control channel already encrypted".to_string()));
        }
    };
    let Some(tls) = strategy.tls_client() else {
        return Err(ProbeError::Protocol("tls upgrade requested without tls material".to_string()));
    };
    let upgraded = tls
        .handshake(plain)
        .await
        .map_err(|e| ProbeError::Protocol(format!("tls upgrade handshake: {e}")))?;
    Ok(BufReader::new(ProbeStream::Tls(Box::new(upgraded))))
}
