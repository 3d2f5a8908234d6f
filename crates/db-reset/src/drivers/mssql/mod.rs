//! Microsoft SQL Server driver.
//!
//! - [`MssqlConnection`]: Tiberius (TDS) session

mod connection;

pub use connection::MssqlConnection;
