//! Protocol message types

/// Frontend message (client → server)
#[derive(Debug, Clone)]
pub enum FrontendMessage {
    /// Startup message
    Startup {
        /// Protocol version
        version: i32,
        /// Connection parameters
        params: Vec<(String, String)>,
    },

    /// Terminate message
    Terminate,
}

/// Backend message (server → client) that can open a startup exchange
#[derive(Debug, Clone)]
pub enum BackendMessage {
    /// Authentication request
    Authentication(AuthenticationMessage),

    /// Error response
    ErrorResponse(ErrorFields),

    /// Notice response
    NoticeResponse(ErrorFields),
}

/// Authentication request kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationMessage {
    /// Authentication OK (no credentials required)
    Ok,

    /// Kerberos V5
    KerberosV5,

    /// Cleartext password required
    CleartextPassword,

    /// MD5 password required
    Md5Password {
        /// Salt for MD5 hash
        salt: [u8; 4],
    },

    /// GSSAPI
    Gss,

    /// SSPI
    Sspi,

    /// SASL authentication mechanisms available (Postgres 10+)
    Sasl {
        /// List of SASL mechanism names (e.g., ["SCRAM-SHA-256"])
        mechanisms: Vec<String>,
    },
}

impl AuthenticationMessage {
    /// Short name of the authentication method
    pub fn method(&self) -> String {
        match self {
            Self::Ok => "trust".into(),
            Self::KerberosV5 => "kerberos-v5".into(),
            Self::CleartextPassword => "cleartext".into(),
            Self::Md5Password { .. } => "md5".into(),
            Self::Gss => "gss".into(),
            Self::Sspi => "sspi".into(),
            Self::Sasl { mechanisms } if mechanisms.is_empty() => "sasl".into(),
            Self::Sasl { mechanisms } => mechanisms.join(","),
        }
    }
}

/// Error/notice fields
#[derive(Debug, Clone, Default)]
pub struct ErrorFields {
    /// Severity (ERROR, FATAL, etc.)
    pub severity: Option<String>,
    /// SQLSTATE code
    pub code: Option<String>,
    /// Human-readable message
    pub message: Option<String>,
}

impl ErrorFields {
    /// Whether the fields look like a genuine Postgres error: a severity and
    /// a five-character SQLSTATE.
    pub fn is_well_formed(&self) -> bool {
        self.severity.as_deref().is_some_and(|s| !s.is_empty())
            && self
                .code
                .as_deref()
                .is_some_and(|c| c.len() == 5 && c.bytes().all(|b| b.is_ascii_alphanumeric()))
    }
}

impl std::fmt::Display for ErrorFields {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref msg) = self.message {
            write!(f, "{}", msg)?;
        }
        if let Some(ref code) = self.code {
            write!(f, " ({})", code)?;
        }
        Ok(())
    }
}
