//! Error types for the reset library.

use thiserror::Error;

/// Error raised by a database driver while talking to the server.
///
/// Each variant wraps the native error of one driver so the full error chain
/// survives up to the CLI.
#[derive(Error, Debug)]
pub enum DriverError {
    /// PostgreSQL (tokio-postgres) error
    #[error(transparent)]
    Postgres(#[from] tokio_postgres::Error),

    /// MySQL/MariaDB (mysql_async) error
    #[error(transparent)]
    Mysql(#[from] mysql_async::Error),

    /// SQL Server (tiberius) error
    #[error(transparent)]
    Mssql(#[from] tiberius::error::Error),

    /// ODBC driver manager error (Oracle)
    #[cfg(feature = "oracle")]
    #[error(transparent)]
    Odbc(#[from] odbc_api::Error),

    /// Any other driver failure, described by a message
    #[error("{0}")]
    Other(String),
}

impl DriverError {
    /// Create a free-form driver error.
    pub fn other(message: impl Into<String>) -> Self {
        DriverError::Other(message.into())
    }
}

/// Main error type for reset operations.
#[derive(Error, Debug)]
pub enum ResetError {
    /// Configuration error (invalid YAML, missing fields, unknown driver)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Opening, checking or releasing the connection failed
    #[error("Connection error: {message}\n  Context: {context}")]
    Connection { message: String, context: String },

    /// Enumerating objects from the system catalog failed
    #[error("Catalog query failed: {statement}")]
    CatalogQuery {
        statement: String,
        #[source]
        source: DriverError,
    },

    /// A generated DDL statement failed
    #[error("Drop statement failed: {statement}")]
    DropStatement {
        statement: String,
        #[source]
        source: DriverError,
    },

    /// A catalog returned a name that cannot be used as an identifier
    #[error("Invalid identifier: {0}")]
    Identifier(String),

    /// The dialect selector matches none of the known dialects
    #[error("Unsupported DBMS: {0}")]
    UnsupportedDialect(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ResetError {
    /// Create a Connection error with context about where it occurred
    pub fn connection(message: impl ToString, context: impl Into<String>) -> Self {
        ResetError::Connection {
            message: message.to_string(),
            context: context.into(),
        }
    }

    /// Create a CatalogQuery error
    pub fn catalog_query(statement: impl Into<String>, source: DriverError) -> Self {
        ResetError::CatalogQuery {
            statement: statement.into(),
            source,
        }
    }

    /// Create a DropStatement error
    pub fn drop_statement(statement: impl Into<String>, source: DriverError) -> Self {
        ResetError::DropStatement {
            statement: statement.into(),
            source,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            ResetError::UnsupportedDialect(_) => 0,
            ResetError::Config(_) | ResetError::Yaml(_) => 1,
            ResetError::Connection { .. } => 2,
            ResetError::CatalogQuery { .. } => 3,
            ResetError::DropStatement { .. } | ResetError::Identifier(_) => 4,
            ResetError::Json(_) => 5,
            ResetError::Io(_) => 7,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for reset operations.
pub type Result<T> = std::result::Result<T, ResetError>;
