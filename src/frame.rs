//! Newline framing between a byte stream and the `rmcp` service.
//!
//! `rmcp` ends a session on the first line it cannot decode. Lines are screened here first:
//! anything that is not a well-formed client message is answered with a JSON-RPC error and
//! never reaches the service.

use rmcp::ErrorData as McpError;
use rmcp::model::{ClientJsonRpcMessage, ErrorCode};
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

/// What to do with one input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Screened {
    Forward,
    /// Error response to write back instead of forwarding.
    Reject(Value),
    /// Blank lines and undecodable notifications.
    Skip,
}

fn rejection(id: Value, code: ErrorCode, message: String) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": McpError::new(code, message, None),
    })
}

pub fn screen(line: &[u8]) -> Screened {
    let line = line.trim_ascii();
    if line.is_empty() {
        return Screened::Skip;
    }
    let value: Value = match serde_json::from_slice(line) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(error = %err, "malformed frame");
            return Screened::Reject(rejection(
                Value::Null,
                ErrorCode::PARSE_ERROR,
                format!("Parse error: {err}"),
            ));
        }
    };

    let id = value.get("id").cloned();
    if let Some(id) = &id {
        if !(id.is_string() || id.is_number()) {
            tracing::debug!(%id, "request id is neither string nor number");
            return Screened::Reject(rejection(
                Value::Null,
                ErrorCode::INVALID_REQUEST,
                "Invalid request: id must be a string or a number".to_string(),
            ));
        }
    }

    match serde_json::from_value::<ClientJsonRpcMessage>(value) {
        Ok(_) => Screened::Forward,
        Err(err) => match id {
            Some(id) => Screened::Reject(rejection(
                id,
                ErrorCode::INVALID_REQUEST,
                format!("Invalid request: {err}"),
            )),
            None => {
                tracing::debug!(error = %err, "dropping undecodable notification");
                Screened::Skip
            }
        },
    }
}

/// Copies screened lines from `input` into `service_in` until `input` ends.
pub async fn pump_input<R, W>(
    input: R,
    mut service_in: W,
    rejected: mpsc::UnboundedSender<Value>,
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut input = BufReader::new(input);
    let mut line = Vec::new();
    loop {
        line.clear();
        if input.read_until(b'\n', &mut line).await? == 0 {
            break;
        }
        match screen(&line) {
            Screened::Forward => {
                service_in.write_all(line.trim_ascii_end()).await?;
                service_in.write_all(b"\n").await?;
                service_in.flush().await?;
            }
            Screened::Reject(response) => {
                if rejected.send(response).is_err() {
                    break;
                }
            }
            Screened::Skip => {}
        }
    }
    tracing::info!("input closed");
    service_in.shutdown().await
}

/// Merges service output and rejections onto `output`, one frame per line.
pub async fn pump_output<R, W>(
    service_out: R,
    mut output: W,
    mut rejected: mpsc::UnboundedReceiver<Value>,
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut frames = BufReader::new(service_out).lines();
    loop {
        let line = tokio::select! {
            next = frames.next_line() => match next? {
                Some(line) => line,
                None => break,
            },
            Some(response) = rejected.recv() => response.to_string(),
        };
        write_line(&mut output, &line).await?;
    }
    while let Ok(response) = rejected.try_recv() {
        write_line(&mut output, &response.to_string()).await?;
    }
    Ok(())
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, line: &str) -> std::io::Result<()> {
    output.write_all(line.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await
}
