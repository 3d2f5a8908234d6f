//! Configuration type definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Dialect selector (oracle, postgresql, mysql, sqlserver and aliases).
    ///
    /// Kept as a string: an unknown selector is reported as a warning when the
    /// reset runs, not rejected while loading the file.
    pub dialect: String,

    /// Owner whose tables are dropped on Oracle. Defaults to `connection.user`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_owner: Option<String>,

    /// Connection to the database being reset.
    pub connection: ConnectionConfig,
}

/// Driver used to open the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverKind {
    /// tokio-postgres
    Postgres,
    /// mysql_async
    Mysql,
    /// tiberius (TDS)
    Mssql,
    /// ODBC driver manager, used for Oracle
    Odbc,
}

impl DriverKind {
    /// Driver name as written in the configuration file.
    pub fn name(&self) -> &'static str {
        match self {
            DriverKind::Postgres => "postgres",
            DriverKind::Mysql => "mysql",
            DriverKind::Mssql => "mssql",
            DriverKind::Odbc => "odbc",
        }
    }

    /// Default TCP port, if the driver connects over TCP itself.
    pub fn default_port(&self) -> Option<u16> {
        match self {
            DriverKind::Postgres => Some(5432),
            DriverKind::Mysql => Some(3306),
            DriverKind::Mssql => Some(1433),
            DriverKind::Odbc => None,
        }
    }
}

/// Database connection configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Driver used to open the session.
    pub driver: DriverKind,

    /// Database host.
    #[serde(default)]
    pub host: String,

    /// Database port (driver default when omitted).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Database name.
    #[serde(default)]
    pub database: String,

    /// Username.
    #[serde(default)]
    pub user: String,

    /// Password.
    #[serde(default)]
    pub password: String,

    /// SSL mode (default: "disable").
    #[serde(default = "default_disable")]
    pub ssl_mode: String,

    /// Full ODBC connection string (required for driver `odbc`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub odbc_connection_string: Option<String>,
}

impl ConnectionConfig {
    /// Port to connect to, falling back to the driver default.
    pub fn effective_port(&self) -> u16 {
        self.port
            .or_else(|| self.driver.default_port())
            .unwrap_or_default()
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("driver", &self.driver)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("ssl_mode", &self.ssl_mode)
            .field(
                "odbc_connection_string",
                &self.odbc_connection_string.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

// Default value functions for serde
fn default_disable() -> String {
    "disable".to_string()
}
