//! Postgres service detection over an open stream

use crate::protocol::{
    decode_message, encode_message, probe_startup, AuthenticationMessage, BackendMessage,
    ErrorFields, FrontendMessage,
};
use crate::{Error, Result};
use bytes::{Buf, BytesMut};
use serde::Serialize;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::Instant;

/// What the startup handshake revealed about a Postgres server
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostgresService {
    /// Whether the server asked for credentials (false for `trust`)
    pub auth_required: bool,
    /// Requested authentication method, when the server sent one
    pub auth_method: Option<String>,
    /// SQLSTATE of a startup rejection, e.g. `28000` for pg_hba refusals
    pub sqlstate: Option<String>,
    /// Message of a startup rejection
    pub message: Option<String>,
}

impl PostgresService {
    fn from_auth(auth: &AuthenticationMessage) -> Self {
        Self {
            auth_required: *auth != AuthenticationMessage::Ok,
            auth_method: Some(auth.method()),
            sqlstate: None,
            message: None,
        }
    }

    fn from_error(fields: ErrorFields) -> Self {
        Self {
            // A rejected startup still means the server gates access
            auth_required: true,
            auth_method: None,
            sqlstate: fields.code,
            message: fields.message,
        }
    }
}

/// Send a StartupMessage and classify the first reply.
///
/// Returns `Ok(Some(_))` for a Postgres reply, `Ok(None)` when the peer
/// answers with something else or hangs up, and `Err` when the exchange
/// fails at the I/O level or `deadline` passes.
pub async fn detect<S>(
    stream: &mut S,
    addr: &str,
    deadline: Instant,
) -> Result<Option<PostgresService>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let startup = encode_message(&probe_startup());
    write_all(stream, &startup, addr, deadline).await?;
    tracing::debug!("startup message sent");

    let mut buf = BytesMut::with_capacity(512);
    loop {
        match decode_message(&buf) {
            Ok((BackendMessage::NoticeResponse(notice), consumed)) => {
                tracing::debug!(%notice, "notice before startup reply");
                buf.advance(consumed);
                continue;
            }
            Ok((BackendMessage::Authentication(auth), _)) => {
                tracing::debug!(method = %auth.method(), "authentication request received");
                return Ok(Some(PostgresService::from_auth(&auth)));
            }
            Ok((BackendMessage::ErrorResponse(fields), _)) => {
                if fields.is_well_formed() {
                    tracing::debug!(error = %fields, "startup rejected by server");
                    return Ok(Some(PostgresService::from_error(fields)));
                }
                tracing::debug!("error response without severity/SQLSTATE");
                return Ok(None);
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {}
            Err(e) => {
                tracing::debug!(error = %e, "reply is not a Postgres message");
                return Ok(None);
            }
        }

        let read = tokio::time::timeout_at(deadline, stream.read_buf(&mut buf)).await;
        let n = match read {
            Ok(result) => result.map_err(|e| Error::io(addr, e))?,
            Err(_) => return Err(Error::Timeout { operation: "probe" }),
        };
        if n == 0 {
            tracing::debug!(buffered = buf.len(), "peer closed before a complete reply");
            return Ok(None);
        }
    }
}

/// Best-effort Terminate followed by shutdown, bounded by `deadline`
pub async fn terminate<S>(stream: &mut S, deadline: Instant)
where
    S: AsyncWrite + Unpin,
{
    let terminate = encode_message(&FrontendMessage::Terminate);
    let goodbye = async {
        stream.write_all(&terminate).await?;
        stream.shutdown().await
    };
    if let Ok(Err(e)) = tokio::time::timeout_at(deadline, goodbye).await {
        tracing::debug!(error = %e, "terminate not delivered");
    }
}

async fn write_all<S>(stream: &mut S, buf: &[u8], addr: &str, deadline: Instant) -> Result<()>
where
    S: AsyncWrite + Unpin,
{
    let write = async {
        stream.write_all(buf).await?;
        stream.flush().await
    };
    let written = tokio::time::timeout_at(deadline, write).await;
    match written {
        Ok(result) => result.map_err(|e| Error::io(addr, e)),
        Err(_) => Err(Error::Timeout { operation: "probe" }),
    }
}
