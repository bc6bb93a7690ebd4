//! Postgres startup handshake codec
//!
//! The detector only needs to send a StartupMessage and recognize the
//! server's first reply, so this module covers exactly that slice of the
//! protocol. Everything after startup is handled by `tokio-postgres`.

pub mod constants;
pub mod decode;
pub mod encode;
pub mod message;

pub use decode::decode_message;
pub use encode::{encode_message, probe_startup};
pub use message::{AuthenticationMessage, BackendMessage, ErrorFields, FrontendMessage};
