//! Postgres protocol constants used by the startup handshake

/// Protocol version 3.0
pub const PROTOCOL_VERSION: i32 = 0x0003_0000;

/// Message type tags
pub mod tags {
    /// Authentication request
    pub const AUTHENTICATION: u8 = b'R';

    /// Error response
    pub const ERROR_RESPONSE: u8 = b'E';

    /// Notice response
    pub const NOTICE_RESPONSE: u8 = b'N';

    /// Terminate (frontend)
    pub const TERMINATE: u8 = b'X';
}

/// Authentication request codes
pub mod auth {
    /// Authentication successful (trust)
    pub const OK: i32 = 0;

    /// Kerberos V5 (removed in Postgres 9.4, still a valid code)
    pub const KERBEROS_V5: i32 = 2;

    /// Cleartext password required
    pub const CLEARTEXT_PASSWORD: i32 = 3;

    /// MD5 password required
    pub const MD5_PASSWORD: i32 = 5;

    /// GSSAPI
    pub const GSS: i32 = 7;

    /// SSPI
    pub const SSPI: i32 = 9;

    /// SASL mechanisms available (Postgres 10+)
    pub const SASL: i32 = 10;
}

/// Startup parameters sent by the detector
pub mod startup {
    /// Role named in the probe's StartupMessage
    pub const PROBE_USER: &str = "postgres";

    /// Database named in the probe's StartupMessage
    pub const PROBE_DATABASE: &str = "postgres";
}
