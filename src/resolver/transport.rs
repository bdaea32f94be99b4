//! Content-Length framed JSON-RPC messages over async byte streams.

use serde_json::Value;
use std::io;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("missing Content-Length header")]
    MissingContentLength,
    #[error("invalid Content-Length header")]
    InvalidContentLength,
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

pub type TransportResult<T> = Result<T, TransportError>;

/// Read one framed message. `Ok(None)` means the stream ended cleanly.
pub async fn read_message<R>(reader: &mut R) -> TransportResult<Option<Value>>
where
    R: AsyncBufRead + Unpin,
{
    let mut content_length: Option<usize> = None;
    let mut saw_header = false;

    loop {
        let mut line = String::new();
        let bytes = reader.read_line(&mut line).await?;
        if bytes == 0 {
            if !saw_header {
                return Ok(None);
            }
            return Err(TransportError::MissingContentLength);
        }
        saw_header = true;

        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            break;
        }

        if let Some((name, value)) = trimmed.split_once(':') {
            if name.eq_ignore_ascii_case("Content-Length") {
                let parsed = value
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| TransportError::InvalidContentLength)?;
                content_length = Some(parsed);
            }
        }
    }

    let Some(length) = content_length else {
        return Err(TransportError::MissingContentLength);
    };

    let mut body = vec![0_u8; length];
    reader.read_exact(&mut body).await?;
    let payload = serde_json::from_slice::<Value>(&body)?;
    Ok(Some(payload))
}

pub async fn write_message<W>(writer: &mut W, payload: &Value) -> TransportResult<()>
where
    W: AsyncWrite + Unpin,
{
    let bytes = serde_json::to_vec(payload)?;
    let header = format!("Content-Length: {}\r\n\r\n", bytes.len());
    writer.write_all(header.as_bytes()).await?;
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_write_then_read() {
        let mut buffer = Vec::new();
        write_message(&mut buffer, &json!({"jsonrpc": "2.0", "id": 1, "result": null}))
            .await
            .unwrap();
        write_message(&mut buffer, &json!({"jsonrpc": "2.0", "method": "exit"}))
            .await
            .unwrap();

        let mut reader = buffer.as_slice();
        let first = read_message(&mut reader).await.unwrap().unwrap();
        assert_eq!(first["id"], 1);
        let second = read_message(&mut reader).await.unwrap().unwrap();
        assert_eq!(second["method"], "exit");
        assert!(read_message(&mut reader).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_extra_headers_and_case() {
        let body = r#"{"id":7}"#;
        let raw = format!(
            "content-length: {}\r\nContent-Type: application/vscode-jsonrpc; charset=utf-8\r\n\r\n{}",
            body.len(),
            body
        );
        let mut reader = raw.as_bytes();
        let message = read_message(&mut reader).await.unwrap().unwrap();
        assert_eq!(message["id"], 7);
    }

    #[tokio::test]
    async fn test_header_errors() {
        let mut reader: &[u8] = b"Content-Type: text\r\n\r\n{}";
        assert!(matches!(
            read_message(&mut reader).await,
            Err(TransportError::MissingContentLength)
        ));

        let mut reader: &[u8] = b"Content-Length: lots\r\n\r\n{}";
        assert!(matches!(
            read_message(&mut reader).await,
            Err(TransportError::InvalidContentLength)
        ));

        let mut reader: &[u8] = b"Content-Length: 3\r\n\r\n{x}";
        assert!(matches!(
            read_message(&mut reader).await,
            Err(TransportError::InvalidJson(_))
        ));
    }

    #[tokio::test]
    async fn test_truncated_stream() {
        let mut reader: &[u8] = b"Content-Length: 10\r\n";
        assert!(matches!(
            read_message(&mut reader).await,
            Err(TransportError::MissingContentLength)
        ));

        let mut reader: &[u8] = b"Content-Length: 10\r\n\r\n{}";
        assert!(matches!(read_message(&mut reader).await, Err(TransportError::Io(_))));
    }
}
