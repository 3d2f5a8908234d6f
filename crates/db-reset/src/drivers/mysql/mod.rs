//! MySQL/MariaDB database driver.
//!
//! - [`MysqlConnection`]: mysql_async session
//!
//! # Supported Versions
//!
//! - MySQL 5.7+, 8.0+
//! - MariaDB 10.2+

mod connection;

pub use connection::MysqlConnection;
