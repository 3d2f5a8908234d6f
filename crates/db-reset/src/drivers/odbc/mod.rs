//! ODBC driver, used to reach Oracle.
//!
//! # Feature Flag
//!
//! Only available when the `oracle` feature is enabled:
//!
//! ```toml
//! [dependencies]
//! db-reset = { version = "0.3", features = ["oracle"] }
//! ```
//!
//! # Connection String
//!
//! Passed verbatim to the driver manager, for example:
//! ```text
//! Driver={Oracle 21 ODBC driver};Dbq=//db:1521/XEPDB1;Uid=scott;Pwd=tiger;
//! ```

mod connection;

pub use connection::OdbcConnection;
