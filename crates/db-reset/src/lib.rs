//! # db-reset
//!
//! Drop every user object from a database schema so it can be rebuilt from
//! scratch.
//!
//! Supported engines:
//!
//! - **PostgreSQL**: visible tables, dropped with `CASCADE`
//! - **MySQL/MariaDB**: views, then tables with foreign key checks off
//! - **Oracle**: views, indexes, tables and sequences (feature `oracle`, ODBC)
//! - **SQL Server**: views, foreign keys and tables
//!
//! ## Example
//!
//! ```rust,no_run
//! use db_reset::{run, Config, ConnectionImpl, ResetOutcome};
//!
//! #[tokio::main]
//! async fn main() -> db_reset::Result<()> {
//!     let config = Config::load("config.yaml")?;
//!     let mut conn = ConnectionImpl::open(&config.connection).await?;
//!     let owner = config.schema_owner()?;
//!     if let ResetOutcome::Completed(report) = run(&config.dialect, &mut conn, &owner).await? {
//!         println!("Dropped {} objects", report.objects_dropped());
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod dialect;
pub mod drivers;
pub mod error;
pub mod reset;

// Re-exports for convenient access
pub use config::{Config, ConnectionConfig, DriverKind};
pub use crate::core::Connection;
pub use dialect::Dialect;
pub use drivers::ConnectionImpl;
pub use error::{DriverError, ResetError, Result};
pub use reset::{reset, run, Phase, ResetOutcome, ResetReport};
