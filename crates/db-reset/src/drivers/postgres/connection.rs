//! PostgreSQL connection implementation.
//!
//! A single tokio-postgres client. The protocol task returned by `connect`
//! runs on its own tokio task until the session is released.

use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_postgres::{Client, Config as PgConfig, NoTls, SimpleQueryMessage};
use tracing::{debug, info, warn};

use crate::config::ConnectionConfig;
use crate::core::traits::Connection;
use crate::drivers::common::TlsBuilder;
use crate::error::{DriverError, ResetError, Result};

/// Connect timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Session on a PostgreSQL server.
pub struct PostgresConnection {
    client: Option<Client>,
    driver_task: Option<JoinHandle<()>>,
}

impl PostgresConnection {
    /// Open a session from configuration.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let mut pg_config = PgConfig::new();
        pg_config.host(&config.host);
        pg_config.port(config.effective_port());
        pg_config.dbname(&config.database);
        pg_config.user(&config.user);
        pg_config.password(&config.password);
        pg_config.application_name("db-reset");
        pg_config.keepalives(true);
        pg_config.keepalives_idle(Duration::from_secs(30));
        pg_config.connect_timeout(CONNECT_TIMEOUT);

        let context = format!(
            "connecting to PostgreSQL {}:{}/{}",
            config.host,
            config.effective_port(),
            config.database
        );

        let (client, driver_task) = match TlsBuilder::parse(&config.ssl_mode)?.build()? {
            None => {
                warn!("PostgreSQL TLS is disabled. Credentials will be transmitted in plaintext.");
                let (client, connection) = pg_config
                    .connect(NoTls)
                    .await
                    .map_err(|e| ResetError::connection(e, context.clone()))?;
                let task = tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        warn!("PostgreSQL connection closed with error: {}", e);
                    }
                });
                (client, task)
            }
            Some(tls) => {
                let (client, connection) = pg_config
                    .connect(tls)
                    .await
                    .map_err(|e| ResetError::connection(e, context.clone()))?;
                let task = tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        warn!("PostgreSQL connection closed with error: {}", e);
                    }
                });
                (client, task)
            }
        };

        info!(
            "Connected to PostgreSQL: {}:{}/{}",
            config.host,
            config.effective_port(),
            config.database
        );

        Ok(Self {
            client: Some(client),
            driver_task: Some(driver_task),
        })
    }

    fn client(&self) -> std::result::Result<&Client, DriverError> {
        self.client
            .as_ref()
            .ok_or_else(|| DriverError::other("PostgreSQL connection already released"))
    }
}

#[async_trait]
impl Connection for PostgresConnection {
    async fn query_column(&mut self, sql: &str) -> std::result::Result<Vec<String>, DriverError> {
        // simple_query buffers the whole response, the portal is closed on return
        let messages = self.client()?.simple_query(sql).await?;
        Ok(messages
            .iter()
            .filter_map(|msg| match msg {
                SimpleQueryMessage::Row(row) => row.get(0).map(str::to_string),
                _ => None,
            })
            .collect())
    }

    async fn execute(&mut self, sql: &str) -> std::result::Result<(), DriverError> {
        self.client()?.batch_execute(sql).await?;
        Ok(())
    }

    async fn release(&mut self) -> std::result::Result<(), DriverError> {
        let client = self
            .client
            .take()
            .ok_or_else(|| DriverError::other("PostgreSQL connection already released"))?;
        drop(client);

        // Dropping the client ends the protocol task once its queue drains.
        if let Some(task) = self.driver_task.take() {
            if let Err(e) = task.await {
                debug!("PostgreSQL connection task ended abnormally: {}", e);
            }
        }
        Ok(())
    }

    fn driver_name(&self) -> &str {
        "postgres"
    }
}
