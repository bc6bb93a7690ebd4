//! Connection management
//!
//! This module handles:
//! * TCP dialing with a bounded deadline
//! * Driver sessions (startup, authentication, teardown) over that socket

mod session;
mod transport;

pub use session::Session;
pub use transport::Transport;
