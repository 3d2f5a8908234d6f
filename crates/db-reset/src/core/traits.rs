//! Core trait for talking to a database session.
//!
//! - [`Connection`]: an open session that can enumerate catalog rows and
//!   execute DDL
//!
//! The reset scripts only ever see this trait, so they run unchanged against
//! the real drivers and against the in-memory catalog used by the tests.

use async_trait::async_trait;

use crate::error::DriverError;

/// An open database session with autocommit semantics.
///
/// The session is owned by the caller and borrowed mutably for the duration
/// of a reset, so no other statement can interleave with the script.
///
/// # Result sets
///
/// [`query_column`](Connection::query_column) must consume and close its
/// result set before returning, including on error. Callers issue further
/// statements on the same session straight after enumerating, which not every
/// driver supports while a cursor is still open.
#[async_trait]
pub trait Connection: Send {
    /// Run a query and return the first column of every row as text.
    ///
    /// `NULL` values are skipped.
    async fn query_column(&mut self, sql: &str) -> Result<Vec<String>, DriverError>;

    /// Execute a statement that returns no rows.
    async fn execute(&mut self, sql: &str) -> Result<(), DriverError>;

    /// Release the session back to the server.
    ///
    /// Called exactly once by the session runner. Any later call on the
    /// connection fails.
    async fn release(&mut self) -> Result<(), DriverError>;

    /// Driver identifier for logging (e.g. "postgres", "mssql").
    fn driver_name(&self) -> &str;

    /// Round-trip a trivial query to check the session is usable.
    async fn ping(&mut self) -> Result<(), DriverError> {
        self.query_column("SELECT 1").await.map(|_| ())
    }
}
