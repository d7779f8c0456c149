use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use socket2::{SockRef, TcpKeepalive};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::client::TlsStream;
use tracing::debug;

use crate::config::{AddressFamily, ProbeConfig};
use crate::error::ProbeError;
use crate::prober::tls::TlsClient;

/// Keepalive applied to probe connections.
const KEEPALIVE: Duration = Duration::from_secs(30);

/// How one transport connection is opened for a probe attempt:
/// family-restricted resolution, TCP connect under the configured
/// timeout, and implicit TLS wrapping when requested. Explicit TLS
/// leaves the socket plain; the session layer upgrades it with the
/// same [`TlsClient`].
pub struct DialStrategy {
    host: String,
    port: u16,
    family: AddressFamily,
    timeout: Duration,
    explicit: bool,
    tls: Option<TlsClient>,
}

impl DialStrategy {
    pub fn from_config(config: &ProbeConfig) -> Result<Self, ProbeError> {
        let tls = if config.ssl {
            Some(TlsClient::new(config.server_name())?)
        } else {
            None
        };
        Ok(Self {
            host: config.host.clone(),
            port: config.port,
            family: config.family,
            timeout: config.timeout,
            explicit: config.explicit,
            tls,
        })
    }

    /// TLS material for the explicit upgrade path.
    pub fn tls_client(&self) -> Option<&TlsClient> {
        self.tls.as_ref()
    }

    /// Resolve, dial the first reachable candidate, and wrap it
    /// according to the configured mode.
    pub async fn connect(&self) -> Result<ProbeStream, ProbeError> {
        let addrs = self.resolve().await?;
        let mut last_err: Option<io::Error> = None;
        for addr in addrs {
            match timeout(self.timeout, TcpStream::connect(addr)).await {
                Ok(Ok(stream)) => {
                    set_keepalive(&stream)?;
                    debug!(%addr, "connected");
                    return self.wrap(stream).await;
                }
                Ok(Err(e)) => {
                    debug!(%addr, error = %e, "connect failed");
                    last_err = Some(e);
                }
                Err(_) => {
                    last_err = Some(io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("connect to {addr} timed out"),
                    ));
                }
            }
        }
        Err(ProbeError::Dial(last_err.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "no candidate addresses")
        })))
    }

    async fn resolve(&self) -> Result<Vec<SocketAddr>, ProbeError> {
        let addrs: Vec<SocketAddr> = tokio::net::lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(ProbeError::Dial)?
            .filter(|addr| self.family.matches(addr))
            .collect();
        if addrs.is_empty() {
            return Err(ProbeError::Dial(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no {} address found for {}", self.family.label(), self.host),
            )));
        }
        debug!(host = %self.host, candidates = addrs.len(), "resolved");
        Ok(addrs)
    }

    async fn wrap(&self, stream: TcpStream) -> Result<ProbeStream, ProbeError> {
        match &self.tls {
            Some(tls) if !self.explicit => {
                let tls_stream = tls.handshake(stream).await.map_err(ProbeError::Dial)?;
                Ok(ProbeStream::Tls(Box::new(tls_stream)))
            }
            _ => Ok(ProbeStream::Plain(stream)),
        }
    }
}

fn set_keepalive(stream: &TcpStream) -> io::Result<()> {
    let keepalive = TcpKeepalive::new().with_time(KEEPALIVE);
    SockRef::from(stream).set_tcp_keepalive(&keepalive)
}

/// Control-channel transport: bare TCP or TLS-wrapped.
pub enum ProbeStream {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl AsyncRead for ProbeStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            ProbeStream::Plain(s) => Pin::new(s).poll_read(cx, buf),
            ProbeStream::Tls(s) => Pin::new(s.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for ProbeStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            ProbeStream::Plain(s) => Pin::new(s).poll_write(cx, buf),
            ProbeStream::Tls(s) => Pin::new(s.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            ProbeStream::Plain(s) => Pin::new(s).poll_flush(cx),
            ProbeStream::Tls(s) => Pin::new(s.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            ProbeStream::Plain(s) => Pin::new(s).poll_shutdown(cx),
            ProbeStream::Tls(s) => Pin::new(s.as_mut()).poll_shutdown(cx),
        }
    }
}
