//! PostgreSQL driver.
//!
//! - [`PostgresConnection`]: tokio-postgres session, optional rustls TLS

mod connection;

pub use connection::PostgresConnection;
