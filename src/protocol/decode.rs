//! Protocol message decoding
//!
//! Only the messages a server may send first in reply to a StartupMessage
//! are understood. Anything else is reported as `InvalidData`, which the
//! detector reads as "not Postgres".

use super::constants::{auth, tags};
use super::message::{AuthenticationMessage, BackendMessage, ErrorFields};
use bytes::BytesMut;
use std::io;

/// Largest startup-phase message accepted.
///
/// Real authentication requests and startup errors are a few hundred bytes;
/// a length header beyond this means the peer is not speaking the protocol.
pub const MAX_STARTUP_MESSAGE_LENGTH: usize = 8192;

/// Decode a backend message from the front of `data`
///
/// # Returns
/// `Ok((msg, consumed))` - Message and number of bytes consumed
/// `Err(e)` - `UnexpectedEof` if more bytes are needed, `InvalidData` or
/// `Unsupported` if the bytes are not a startup-phase message
pub fn decode_message(data: &BytesMut) -> io::Result<(BackendMessage, usize)> {
    if data.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "incomplete message header",
        ));
    }

    let tag = data[0];
    if !matches!(
        tag,
        tags::AUTHENTICATION | tags::ERROR_RESPONSE | tags::NOTICE_RESPONSE
    ) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("unknown message tag: 0x{:02X}", tag),
        ));
    }

    if data.len() < 5 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "incomplete message header",
        ));
    }

    let len = i32::from_be_bytes([data[1], data[2], data[3], data[4]]);
    if len < 4 || len as usize > MAX_STARTUP_MESSAGE_LENGTH {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("implausible message length {}", len),
        ));
    }
    let len = len as usize;

    if data.len() < len + 1 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "incomplete message body",
        ));
    }

    let msg_data = &data[5..len + 1];

    let msg = match tag {
        tags::AUTHENTICATION => decode_authentication(msg_data)?,
        tags::ERROR_RESPONSE => BackendMessage::ErrorResponse(decode_error_fields(msg_data)?),
        _ => BackendMessage::NoticeResponse(decode_error_fields(msg_data)?),
    };

    Ok((msg, len + 1))
}

fn decode_authentication(data: &[u8]) -> io::Result<BackendMessage> {
    if data.len() < 4 {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "auth type"));
    }
    let auth_type = i32::from_be_bytes([data[0], data[1], data[2], data[3]]);

    let auth_msg = match auth_type {
        auth::OK => AuthenticationMessage::Ok,
        auth::KERBEROS_V5 => AuthenticationMessage::KerberosV5,
        auth::CLEARTEXT_PASSWORD => AuthenticationMessage::CleartextPassword,
        auth::MD5_PASSWORD => {
            if data.len() < 8 {
                return Err(io::Error::new(io::ErrorKind::InvalidData, "salt data"));
            }
            let mut salt = [0u8; 4];
            salt.copy_from_slice(&data[4..8]);
            AuthenticationMessage::Md5Password { salt }
        }
        auth::GSS => AuthenticationMessage::Gss,
        auth::SSPI => AuthenticationMessage::Sspi,
        auth::SASL => {
            // Mechanism list: null-terminated strings, closed by an empty one
            let mechanisms = data[4..]
                .split(|&b| b == 0)
                .take_while(|m| !m.is_empty())
                .map(|m| String::from_utf8_lossy(m).to_string())
                .collect();
            AuthenticationMessage::Sasl { mechanisms }
        }
        _ => {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("unsupported auth type: {}", auth_type),
            ))
        }
    };

    Ok(BackendMessage::Authentication(auth_msg))
}

fn decode_error_fields(data: &[u8]) -> io::Result<ErrorFields> {
    let mut fields = ErrorFields::default();
    let mut offset = 0;

    while offset < data.len() {
        let field_type = data[offset];
        offset += 1;
        if field_type == 0 {
            break;
        }

        let end = data[offset..].iter().position(|&b| b == 0).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                "missing null terminator in error field",
            )
        })?;
        let value = String::from_utf8_lossy(&data[offset..offset + end]).to_string();
        offset += end + 1;

        match field_type {
            // 'V' is the non-localized severity (9.6+); prefer it when present
            b'V' => fields.severity = Some(value),
            b'S' if fields.severity.is_none() => fields.severity = Some(value),
            b'C' => fields.code = Some(value),
            b'M' => fields.message = Some(value),
            _ => {}
        }
    }

    Ok(fields)
}
