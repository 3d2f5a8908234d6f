//! Database driver implementations.
//!
//! Each driver module implements [`Connection`] for one wire protocol:
//!
//! - [`postgres`]: PostgreSQL via tokio-postgres
//! - [`mysql`]: MySQL/MariaDB via mysql_async
//! - [`mssql`]: Microsoft SQL Server via Tiberius
//! - `odbc`: any ODBC data source, used for Oracle (feature `oracle`)
//! - [`common`]: shared utilities (TLS)
//!
//! # Static dispatch
//!
//! [`ConnectionImpl`] is an enum over the concrete drivers. The reset scripts
//! are generic over [`Connection`], so the compiler generates a match instead
//! of going through a vtable.

pub mod common;
pub mod mssql;
pub mod mysql;
#[cfg(feature = "oracle")]
pub mod odbc;
pub mod postgres;

pub use common::{SslMode, TlsBuilder};
pub use mssql::MssqlConnection;
pub use mysql::MysqlConnection;
#[cfg(feature = "oracle")]
pub use odbc::OdbcConnection;
pub use postgres::PostgresConnection;

use async_trait::async_trait;

use crate::config::{ConnectionConfig, DriverKind};
use crate::core::traits::Connection;
use crate::error::{DriverError, Result};

/// Enum-based static dispatch over the driver connections.
pub enum ConnectionImpl {
    Postgres(PostgresConnection),
    Mysql(MysqlConnection),
    Mssql(MssqlConnection),
    #[cfg(feature = "oracle")]
    Odbc(OdbcConnection),
}

impl ConnectionImpl {
    /// Open a connection with the driver named in the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ResetError::Connection` if the server cannot be reached and
    /// `ResetError::Config` if the driver is not compiled in.
    pub async fn open(config: &ConnectionConfig) -> Result<Self> {
        match config.driver {
            DriverKind::Postgres => Ok(ConnectionImpl::Postgres(
                PostgresConnection::connect(config).await?,
            )),
            DriverKind::Mysql => Ok(ConnectionImpl::Mysql(
                MysqlConnection::connect(config).await?,
            )),
            DriverKind::Mssql => Ok(ConnectionImpl::Mssql(
                MssqlConnection::connect(config).await?,
            )),
            #[cfg(feature = "oracle")]
            DriverKind::Odbc => Ok(ConnectionImpl::Odbc(OdbcConnection::connect(config).await?)),
            #[cfg(not(feature = "oracle"))]
            DriverKind::Odbc => Err(crate::error::ResetError::Config(
                "driver 'odbc' requires building with the 'oracle' feature".into(),
            )),
        }
    }
}

#[async_trait]
impl Connection for ConnectionImpl {
    async fn query_column(&mut self, sql: &str) -> std::result::Result<Vec<String>, DriverError> {
        match self {
            ConnectionImpl::Postgres(c) => c.query_column(sql).await,
            ConnectionImpl::Mysql(c) => c.query_column(sql).await,
            ConnectionImpl::Mssql(c) => c.query_column(sql).await,
            #[cfg(feature = "oracle")]
            ConnectionImpl::Odbc(c) => c.query_column(sql).await,
        }
    }

    async fn execute(&mut self, sql: &str) -> std::result::Result<(), DriverError> {
        match self {
            ConnectionImpl::Postgres(c) => c.execute(sql).await,
            ConnectionImpl::Mysql(c) => c.execute(sql).await,
            ConnectionImpl::Mssql(c) => c.execute(sql).await,
            #[cfg(feature = "oracle")]
            ConnectionImpl::Odbc(c) => c.execute(sql).await,
        }
    }

    async fn release(&mut self) -> std::result::Result<(), DriverError> {
        match self {
            ConnectionImpl::Postgres(c) => c.release().await,
            ConnectionImpl::Mysql(c) => c.release().await,
            ConnectionImpl::Mssql(c) => c.release().await,
            #[cfg(feature = "oracle")]
            ConnectionImpl::Odbc(c) => c.release().await,
        }
    }

    fn driver_name(&self) -> &str {
        match self {
            ConnectionImpl::Postgres(c) => c.driver_name(),
            ConnectionImpl::Mysql(c) => c.driver_name(),
            ConnectionImpl::Mssql(c) => c.driver_name(),
            #[cfg(feature = "oracle")]
            ConnectionImpl::Odbc(c) => c.driver_name(),
        }
    }

    async fn ping(&mut self) -> std::result::Result<(), DriverError> {
        match self {
            ConnectionImpl::Postgres(c) => c.ping().await,
            ConnectionImpl::Mysql(c) => c.ping().await,
            ConnectionImpl::Mssql(c) => c.ping().await,
            #[cfg(feature = "oracle")]
            ConnectionImpl::Odbc(c) => c.ping().await,
        }
    }
}
