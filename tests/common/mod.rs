//! In-process fake Postgres server
//!
//! Speaks just enough of protocol 3.0 for the driver to log in, describe a
//! statement and run a simple query. Frontend messages are answered one at
//! a time in arrival order, so pipelined requests line up with their
//! replies.

#![allow(dead_code)]

use bytes::{BufMut, BytesMut};
use std::collections::HashMap;
use std::io;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const SSL_REQUEST_CODE: i32 = 80877103;

pub const INT4: u32 = 23;
pub const TEXT: u32 = 25;
pub const BOOL: u32 = 16;
pub const INT8: u32 = 20;
pub const DATE: u32 = 1082;
pub const TIMESTAMP: u32 = 1114;
pub const TIMESTAMPTZ: u32 = 1184;

type Columns = Vec<(&'static str, u32)>;
type Rows = Vec<Vec<Option<&'static str>>>;

/// Install a test subscriber once; `RUST_LOG` controls verbosity
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// How the fake answers a StartupMessage
#[derive(Debug, Clone)]
pub enum Auth {
    /// AuthenticationOk straight away
    Trust,
    /// Cleartext password exchange, 28P01 on mismatch
    Password(&'static str),
    /// Startup refused with a FATAL error
    Reject {
        code: &'static str,
        message: &'static str,
    },
}

/// Scripted server behavior
#[derive(Debug, Clone)]
pub struct FakePostgres {
    auth: Auth,
    database: Option<&'static str>,
    columns: Columns,
    rows: Rows,
    leading_commands: Vec<&'static str>,
    trailing_result: Option<(Columns, Rows)>,
    fail_prepare: Option<(&'static str, &'static str)>,
    fail_query: Option<(&'static str, &'static str)>,
    stall_queries: bool,
}

impl FakePostgres {
    pub fn new(auth: Auth) -> Self {
        Self {
            auth,
            database: None,
            columns: vec![("?column?", INT4)],
            rows: vec![vec![Some("1")]],
            leading_commands: Vec::new(),
            trailing_result: None,
            fail_prepare: None,
            fail_query: None,
            stall_queries: false,
        }
    }

    /// Only accept this database name; others get 3D000
    pub fn database(mut self, name: &'static str) -> Self {
        self.database = Some(name);
        self
    }

    /// Result set returned for every statement (and by Describe)
    pub fn result(mut self, columns: Columns, rows: Rows) -> Self {
        self.columns = columns;
        self.rows = rows;
        self
    }

    /// Row-less command tags sent ahead of the result set on a simple query
    pub fn leading_commands(mut self, tags: Vec<&'static str>) -> Self {
        self.leading_commands = tags;
        self
    }

    /// Second result set sent after the first on a simple query
    pub fn trailing_result(mut self, columns: Columns, rows: Rows) -> Self {
        self.trailing_result = Some((columns, rows));
        self
    }

    /// Answer Parse with an ERROR carrying `code` and `message`
    pub fn fail_prepare(mut self, code: &'static str, message: &'static str) -> Self {
        self.fail_prepare = Some((code, message));
        self
    }

    /// Answer a simple query with an ERROR carrying `code` and `message`
    pub fn fail_query(mut self, code: &'static str, message: &'static str) -> Self {
        self.fail_query = Some((code, message));
        self
    }

    /// Never answer a simple query
    pub fn stall_queries(mut self) -> Self {
        self.stall_queries = true;
        self
    }

    /// Listen on an ephemeral localhost port and serve every connection
    pub async fn spawn(self) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let script = self.clone();
                tokio::spawn(async move {
                    let _ = script.serve(socket).await;
                });
            }
        });

        port
    }

    async fn serve(&self, mut socket: TcpStream) -> io::Result<()> {
        let params = loop {
            let body = read_startup(&mut socket).await?;
            let version = i32::from_be_bytes([body[0], body[1], body[2], body[3]]);
            if version == SSL_REQUEST_CODE {
                socket.write_all(b"N").await?;
                continue;
            }
            break parse_params(&body[4..]);
        };

        match &self.auth {
            Auth::Trust => {}
            Auth::Password(expected) => {
                socket.write_all(&auth_request(3)).await?;
                let Some((b'p', body)) = read_message(&mut socket).await? else {
                    return Ok(());
                };
                let given = body.strip_suffix(b"\0").unwrap_or(&body);
                if given != expected.as_bytes() {
                    let user = params.get("user").cloned().unwrap_or_default();
                    let message = format!("password authentication failed for user \"{}\"", user);
                    socket
                        .write_all(&error_response("FATAL", "28P01", &message))
                        .await?;
                    return Ok(());
                }
            }
            Auth::Reject { code, message } => {
                socket
                    .write_all(&error_response("FATAL", code, message))
                    .await?;
                return Ok(());
            }
        }

        if let Some(expected) = self.database {
            let requested = params.get("database").map(String::as_str).unwrap_or("");
            if requested != expected {
                let message = format!("database \"{}\" does not exist", requested);
                socket
                    .write_all(&error_response("FATAL", "3D000", &message))
                    .await?;
                return Ok(());
            }
        }

        let mut reply = auth_request(0);
        reply.extend_from_slice(&parameter_status("server_version", "16.2"));
        reply.extend_from_slice(&ready_for_query());
        socket.write_all(&reply).await?;

        let mut failed = false;
        while let Some((tag, _body)) = read_message(&mut socket).await? {
            if failed && tag != b'S' {
                continue;
            }
            match tag {
                b'P' => match self.fail_prepare {
                    Some((code, message)) => {
                        socket
                            .write_all(&error_response("ERROR", code, message))
                            .await?;
                        failed = true;
                    }
                    None => socket.write_all(&simple(b'1')).await?,
                },
                b'D' => {
                    let mut reply = parameter_description();
                    reply.extend_from_slice(&row_description(&self.columns));
                    socket.write_all(&reply).await?;
                }
                b'C' => socket.write_all(&simple(b'3')).await?,
                b'S' => {
                    failed = false;
                    socket.write_all(&ready_for_query()).await?;
                }
                b'Q' => {
                    if self.stall_queries {
                        continue;
                    }
                    let mut reply = BytesMut::new();
                    if let Some((code, message)) = self.fail_query {
                        reply.extend_from_slice(&error_response("ERROR", code, message));
                    } else {
                        for tag in &self.leading_commands {
                            reply.extend_from_slice(&command_complete(tag));
                        }
                        reply.extend_from_slice(&result_set(&self.columns, &self.rows));
                        if let Some((columns, rows)) = &self.trailing_result {
                            reply.extend_from_slice(&result_set(columns, rows));
                        }
                    }
                    reply.extend_from_slice(&ready_for_query());
                    socket.write_all(&reply).await?;
                }
                b'X' => return Ok(()),
                _ => {}
            }
        }
        Ok(())
    }
}

/// Accept one connection, send `reply` after the first read, then drain
pub async fn spawn_banner_server(reply: &'static [u8]) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 512];
        let _ = socket.read(&mut buf).await;
        let _ = socket.write_all(reply).await;
        while matches!(socket.read(&mut buf).await, Ok(n) if n > 0) {}
    });

    port
}

/// A port with nothing listening on it
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

async fn read_startup(socket: &mut TcpStream) -> io::Result<Vec<u8>> {
    let len = socket.read_i32().await?;
    let mut body = vec![0u8; (len - 4) as usize];
    socket.read_exact(&mut body).await?;
    Ok(body)
}

async fn read_message(socket: &mut TcpStream) -> io::Result<Option<(u8, Vec<u8>)>> {
    let tag = match socket.read_u8().await {
        Ok(tag) => tag,
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    };
    let len = socket.read_i32().await?;
    let mut body = vec![0u8; (len - 4) as usize];
    socket.read_exact(&mut body).await?;
    Ok(Some((tag, body)))
}

fn parse_params(raw: &[u8]) -> HashMap<String, String> {
    let mut parts = raw
        .split(|b| *b == 0)
        .map(|s| String::from_utf8_lossy(s).into_owned());
    let mut params = HashMap::new();
    while let (Some(key), Some(value)) = (parts.next(), parts.next()) {
        if key.is_empty() {
            break;
        }
        params.insert(key, value);
    }
    params
}

fn frame(tag: u8, body: &[u8]) -> BytesMut {
    let mut buf = BytesMut::with_capacity(body.len() + 5);
    buf.put_u8(tag);
    buf.put_i32(body.len() as i32 + 4);
    buf.put_slice(body);
    buf
}

fn simple(tag: u8) -> BytesMut {
    frame(tag, &[])
}

fn auth_request(code: i32) -> BytesMut {
    frame(b'R', &code.to_be_bytes())
}

fn parameter_status(name: &str, value: &str) -> BytesMut {
    let mut body = BytesMut::new();
    body.put_slice(name.as_bytes());
    body.put_u8(0);
    body.put_slice(value.as_bytes());
    body.put_u8(0);
    frame(b'S', &body)
}

fn parameter_description() -> BytesMut {
    frame(b't', &0i16.to_be_bytes())
}

fn ready_for_query() -> BytesMut {
    frame(b'Z', b"I")
}

fn command_complete(tag: &str) -> BytesMut {
    let mut body = BytesMut::new();
    body.put_slice(tag.as_bytes());
    body.put_u8(0);
    frame(b'C', &body)
}

fn data_row(cells: &[Option<&str>]) -> BytesMut {
    let mut body = BytesMut::new();
    body.put_i16(cells.len() as i16);
    for cell in cells {
        match cell {
            Some(value) => {
                body.put_i32(value.len() as i32);
                body.put_slice(value.as_bytes());
            }
            None => body.put_i32(-1),
        }
    }
    frame(b'D', &body)
}

fn error_response(severity: &str, code: &str, message: &str) -> BytesMut {
    let mut body = BytesMut::new();
    for (field, value) in [(b'S', severity), (b'V', severity), (b'C', code), (b'M', message)] {
        body.put_u8(field);
        body.put_slice(value.as_bytes());
        body.put_u8(0);
    }
    body.put_u8(0);
    frame(b'E', &body)
}

fn row_description(columns: &[(&str, u32)]) -> BytesMut {
    let mut body = BytesMut::new();
    body.put_i16(columns.len() as i16);
    for (name, oid) in columns {
        body.put_slice(name.as_bytes());
        body.put_u8(0);
        body.put_i32(0); // table oid
        body.put_i16(0); // attribute number
        body.put_u32(*oid);
        body.put_i16(-1); // type size
        body.put_i32(-1); // type modifier
        body.put_i16(0); // text format
    }
    frame(b'T', &body)
}

fn result_set(columns: &[(&str, u32)], rows: &[Vec<Option<&str>>]) -> BytesMut {
    let mut buf = row_description(columns);
    for row in rows {
        buf.extend_from_slice(&data_row(row));
    }
    buf.extend_from_slice(&command_complete(&format!("SELECT {}", rows.len())));
    buf
}
