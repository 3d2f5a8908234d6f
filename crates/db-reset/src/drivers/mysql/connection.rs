//! MySQL/MariaDB connection implementation.
//!
//! One mysql_async `Conn`, not a pool: `SET FOREIGN_KEY_CHECKS` is
//! session-scoped, so every statement of a reset has to travel over the same
//! session.

use async_trait::async_trait;
use mysql_async::prelude::*;
use mysql_async::{Conn, Opts, OptsBuilder, SslOpts};
use tracing::{info, warn};

use crate::config::ConnectionConfig;
use crate::core::traits::Connection;
use crate::drivers::common::SslMode;
use crate::error::{DriverError, ResetError, Result};

/// Session on a MySQL or MariaDB server.
pub struct MysqlConnection {
    conn: Option<Conn>,
}

impl MysqlConnection {
    /// Open a session from configuration.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let ssl_opts = match SslMode::parse(&config.ssl_mode)? {
            SslMode::Disable => {
                warn!("MySQL TLS is disabled. Credentials will be transmitted in plaintext.");
                None
            }
            SslMode::Require => Some(SslOpts::default().with_danger_accept_invalid_certs(true)),
            SslMode::VerifyCa => {
                Some(SslOpts::default().with_danger_skip_domain_validation(true))
            }
            SslMode::VerifyFull => Some(SslOpts::default()),
        };

        let mut builder = OptsBuilder::default()
            .ip_or_hostname(&config.host)
            .tcp_port(config.effective_port())
            .db_name(Some(&config.database))
            .user(Some(&config.user))
            .pass(Some(&config.password))
            // Use utf8mb4 for full Unicode support
            .init(vec!["SET NAMES utf8mb4"]);

        if let Some(ssl) = ssl_opts {
            builder = builder.ssl_opts(ssl);
        }

        let opts: Opts = builder.into();
        let conn = Conn::new(opts).await.map_err(|e| {
            ResetError::connection(
                e,
                format!(
                    "connecting to MySQL {}:{}/{}",
                    config.host,
                    config.effective_port(),
                    config.database
                ),
            )
        })?;

        info!(
            "Connected to MySQL: {}:{}/{}",
            config.host,
            config.effective_port(),
            config.database
        );

        Ok(Self { conn: Some(conn) })
    }

    fn conn(&mut self) -> std::result::Result<&mut Conn, DriverError> {
        self.conn
            .as_mut()
            .ok_or_else(|| DriverError::other("MySQL connection already released"))
    }
}

#[async_trait]
impl Connection for MysqlConnection {
    async fn query_column(&mut self, sql: &str) -> std::result::Result<Vec<String>, DriverError> {
        // `query` collects every row and drops the result set before returning
        let rows: Vec<Option<String>> = self.conn()?.query(sql).await?;
        Ok(rows.into_iter().flatten().collect())
    }

    async fn execute(&mut self, sql: &str) -> std::result::Result<(), DriverError> {
        self.conn()?.query_drop(sql).await?;
        Ok(())
    }

    async fn release(&mut self) -> std::result::Result<(), DriverError> {
        let conn = self
            .conn
            .take()
            .ok_or_else(|| DriverError::other("MySQL connection already released"))?;
        conn.disconnect().await?;
        Ok(())
    }

    fn driver_name(&self) -> &str {
        "mysql"
    }
}
