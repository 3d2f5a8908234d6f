//! Configuration validation.

use super::{Config, DriverKind};
use crate::drivers::SslMode;
use crate::error::{ResetError, Result};

/// Validate the configuration.
///
/// The dialect selector is not checked here; an unknown selector is a
/// warning at reset time.
pub fn validate(config: &Config) -> Result<()> {
    let conn = &config.connection;

    match conn.driver {
        DriverKind::Odbc => {
            if conn
                .odbc_connection_string
                .as_deref()
                .map_or(true, |s| s.trim().is_empty())
            {
                return Err(ResetError::Config(
                    "connection.odbc_connection_string is required for driver 'odbc'".into(),
                ));
            }
            if !cfg!(feature = "oracle") {
                return Err(ResetError::Config(
                    "driver 'odbc' requires building with the 'oracle' feature".into(),
                ));
            }
        }
        DriverKind::Postgres | DriverKind::Mysql | DriverKind::Mssql => {
            if conn.host.is_empty() {
                return Err(ResetError::Config("connection.host is required".into()));
            }
            if conn.database.is_empty() {
                return Err(ResetError::Config("connection.database is required".into()));
            }
            if conn.user.is_empty() {
                return Err(ResetError::Config("connection.user is required".into()));
            }
        }
    }

    if let Some(0) = conn.port {
        return Err(ResetError::Config("connection.port must not be 0".into()));
    }

    SslMode::parse(&conn.ssl_mode)?;

    if let Some(owner) = &config.schema_owner {
        if owner.trim().is_empty() {
            return Err(ResetError::Config(
                "schema_owner must not be empty when set".into(),
            ));
        }
    }

    Ok(())
}
