//! SQL Server connection implementation.
//!
//! A single Tiberius client over a tokio TCP stream.

use std::time::Duration;

use async_trait::async_trait;
use tiberius::{AuthMethod, Client, Config, EncryptionLevel};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{info, warn};

use crate::config::ConnectionConfig;
use crate::core::traits::Connection;
use crate::drivers::common::SslMode;
use crate::error::{DriverError, ResetError, Result};

/// TCP connect timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Session on a SQL Server instance.
pub struct MssqlConnection {
    client: Option<Client<Compat<TcpStream>>>,
}

impl MssqlConnection {
    /// Open a session from configuration.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let tds_config = build_config(config)?;
        let context = format!(
            "connecting to SQL Server {}:{}/{}",
            config.host,
            config.effective_port(),
            config.database
        );

        let tcp = tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect(tds_config.get_addr()))
            .await
            .map_err(|_| ResetError::connection("connect timed out", context.clone()))?
            .map_err(|e| ResetError::connection(e, context.clone()))?;
        tcp.set_nodelay(true).ok();

        let client = Client::connect(tds_config, tcp.compat_write())
            .await
            .map_err(|e| ResetError::connection(e, context))?;

        info!(
            "Connected to SQL Server: {}:{}/{}",
            config.host,
            config.effective_port(),
            config.database
        );

        Ok(Self {
            client: Some(client),
        })
    }

    fn client(&mut self) -> std::result::Result<&mut Client<Compat<TcpStream>>, DriverError> {
        self.client
            .as_mut()
            .ok_or_else(|| DriverError::other("SQL Server connection already released"))
    }
}

fn build_config(config: &ConnectionConfig) -> Result<Config> {
    let mut tds = Config::new();
    tds.host(&config.host);
    tds.port(config.effective_port());
    tds.database(&config.database);
    tds.application_name("db-reset");
    tds.authentication(AuthMethod::sql_server(&config.user, &config.password));

    match SslMode::parse(&config.ssl_mode)? {
        SslMode::Disable => {
            warn!("SQL Server TLS is disabled. Credentials will be transmitted in plaintext.");
            tds.encryption(EncryptionLevel::NotSupported);
        }
        SslMode::Require => {
            tds.trust_cert();
            tds.encryption(EncryptionLevel::Required);
        }
        SslMode::VerifyCa | SslMode::VerifyFull => {
            tds.encryption(EncryptionLevel::Required);
        }
    }

    Ok(tds)
}

#[async_trait]
impl Connection for MssqlConnection {
    async fn query_column(&mut self, sql: &str) -> std::result::Result<Vec<String>, DriverError> {
        // into_first_result drains the TDS stream before handing back the rows
        let rows = self
            .client()?
            .simple_query(sql)
            .await?
            .into_first_result()
            .await?;

        let mut values = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(value) = row.try_get::<&str, _>(0)? {
                values.push(value.to_string());
            }
        }
        Ok(values)
    }

    async fn execute(&mut self, sql: &str) -> std::result::Result<(), DriverError> {
        self.client()?.simple_query(sql).await?.into_results().await?;
        Ok(())
    }

    async fn release(&mut self) -> std::result::Result<(), DriverError> {
        let client = self
            .client
            .take()
            .ok_or_else(|| DriverError::other("SQL Server connection already released"))?;
        client.close().await?;
        Ok(())
    }

    fn driver_name(&self) -> &str {
        "mssql"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DriverKind;

    fn config(ssl_mode: &str) -> ConnectionConfig {
        ConnectionConfig {
            driver: DriverKind::Mssql,
            host: "db.internal".to_string(),
            port: None,
            database: "app_test".to_string(),
            user: "sa".to_string(),
            password: "secret".to_string(),
            ssl_mode: ssl_mode.to_string(),
            odbc_connection_string: None,
        }
    }

    #[test]
    fn test_build_config_uses_default_port() {
        let tds = build_config(&config("disable")).unwrap();
        assert_eq!(tds.get_addr(), "db.internal:1433");
    }

    #[test]
    fn test_build_config_rejects_unknown_ssl_mode() {
        assert!(build_config(&config("maybe")).is_err());
    }
}
