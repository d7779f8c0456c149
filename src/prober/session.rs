use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::error::ProbeError;

/// One parsed control-channel reply: the terminal line of a possibly
/// multi-line response.
#[derive(Debug)]
pub struct Reply {
    pub code: u16,
    pub line: String,
}

/// Read one full reply, appending every byte received to `transcript`.
pub async fn read_reply<S>(stream: &mut S, transcript: &mut String) -> Result<Reply, ProbeError>
where
    S: AsyncBufRead + Unpin,
{
    loop {
        let mut raw = Vec::new();
        let n = stream
            .read_until(b'\n', &mut raw)
            .await
            .map_err(|e| ProbeError::Protocol(format!("control channel read: {e}")))?;
        if n == 0 {
            return Err(ProbeError::Protocol(
                "control channel closed before a complete reply".to_string(),
            ));
        }
        let line = String::from_utf8_lossy(&raw).into_owned();
        transcript.push_str(&line);
        if let Some(reply) = parse_terminal_line(&line) {
            debug!(code = reply.code, "reply");
            return Ok(reply);
        }
        // continuation line of a multi-line reply, keep reading
    }
}

/// Send one command line, recording it in `transcript`.
pub async fn send_command<S>(
    stream: &mut S,
    transcript: &mut String,
    command: &str,
) -> Result<(), ProbeError>
where
    S: AsyncWrite + Unpin,
{
    let line = format!("{command}\r\n");
    stream
        .write_all(line.as_bytes())
        .await
        .map_err(|e| ProbeError::Protocol(format!("control channel write: {e}")))?;
    stream
        .flush()
        .await
        .map_err(|e| ProbeError::Protocol(format!("control channel write: {e}")))?;
    transcript.push_str(&line);
    debug!(command, "sent");
    Ok(())
}

/// A reply is terminal when the line starts with a three-digit code
/// followed by a space or end of line; `ddd-` marks a continuation.
fn parse_terminal_line(line: &str) -> Option<Reply> {
    let trimmed = line.trim_end_matches(['\r', '\n']);
    let bytes = trimmed.as_bytes();
    if bytes.len() < 3 || !bytes[..3].iter().all(u8::is_ascii_digit) {
        return None;
    }
    if bytes.len() > 3 && bytes[3] != b' ' {
        return None;
    }
    let code = trimmed[..3].parse().ok()?;
    Some(Reply { code, line: trimmed.to_string() })
}

#[cfg(test)]
mod tests {
    use tokio::io::BufReader;

    use super::*;

    #[test]
    fn terminal_line_detection() {
        let reply = parse_terminal_line("220 ready\r\n").unwrap();
        assert_eq!(reply.code, 220);
        assert_eq!(reply.line, "220 ready");

        let bare = parse_terminal_line("221\r\n").unwrap();
        assert_eq!(bare.code, 221);

        assert!(parse_terminal_line("220-welcome\r\n").is_none());
        assert!(parse_terminal_line("some free text\r\n").is_none());
        assert!(parse_terminal_line("22\r\n").is_none());
    }

    #[tokio::test]
    async fn multi_line_reply_is_consumed_whole() {
        let wire = b"220-welcome\r\nplain text line\r\n220 ready\r\n";
        let mut stream = BufReader::new(&wire[..]);
        let mut transcript = String::new();
        let reply = read_reply(&mut stream, &mut transcript).await.unwrap();
        assert_eq!(reply.code, 220);
        assert_eq!(reply.line, "220 ready");
        assert_eq!(transcript, "220-welcome\r\nplain text line\r\n220 ready\r\n");
    }

    #[tokio::test]
    async fn eof_is_a_protocol_error() {
        let mut stream = BufReader::new(&b"220-never finished\r\n"[..]);
        let mut transcript = String::new();
        let err = read_reply(&mut stream, &mut transcript).await.unwrap_err();
        assert!(matches!(err, ProbeError::Protocol(_)));
        // what did arrive stays in the transcript
        assert_eq!(transcript, "220-never finished\r\n");
    }

    #[tokio::test]
    async fn commands_are_crlf_terminated_and_recorded() {
        let (mut client, mut server) = tokio::io::duplex(64);
        let mut transcript = String::new();
        send_command(&mut client, &mut transcript, "QUIT").await.unwrap();
        assert_eq!(transcript, "QUIT\r\n");

        let mut received = [0u8; 6];
        tokio::io::AsyncReadExt::read_exact(&mut server, &mut received).await.unwrap();
        assert_eq!(&received, b"QUIT\r\n");
    }
}
