//! Utilities shared across database drivers.
//!
//! - [`tls`]: SSL mode parsing and the rustls setup for PostgreSQL

pub mod tls;

pub use tls::{SslMode, TlsBuilder};
