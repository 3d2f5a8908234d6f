//! Supported database dialects.
//!
//! A [`Dialect`] selects which drop script runs. The set is closed: there are
//! exactly four engines and dispatch is a `match`, never a trait object.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{ResetError, Result};

/// Database engine whose catalog and DDL conventions drive the reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    Oracle,
    #[serde(rename = "postgresql")]
    PostgreSql,
    #[serde(rename = "mysql")]
    MySql,
    #[serde(rename = "sqlserver")]
    SqlServer,
}

impl Dialect {
    /// All supported dialects.
    pub const ALL: [Dialect; 4] = [
        Dialect::Oracle,
        Dialect::PostgreSql,
        Dialect::MySql,
        Dialect::SqlServer,
    ];

    /// Parse a dialect selector.
    ///
    /// Matching is case-insensitive and accepts the usual aliases.
    ///
    /// # Errors
    ///
    /// Returns `ResetError::UnsupportedDialect` if the selector names none of
    /// the supported engines.
    pub fn from_selector(selector: &str) -> Result<Self> {
        match selector.trim().to_lowercase().as_str() {
            "oracle" => Ok(Dialect::Oracle),
            "postgres" | "postgresql" | "pg" => Ok(Dialect::PostgreSql),
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "sqlserver" | "sql_server" | "mssql" => Ok(Dialect::SqlServer),
            _ => Err(ResetError::UnsupportedDialect(selector.to_string())),
        }
    }

    /// Canonical lower-case name.
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Oracle => "oracle",
            Dialect::PostgreSql => "postgresql",
            Dialect::MySql => "mysql",
            Dialect::SqlServer => "sqlserver",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = ResetError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_selector(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_from_selector() {
        assert_eq!(Dialect::from_selector("oracle").unwrap(), Dialect::Oracle);
        assert_eq!(Dialect::from_selector("ORACLE").unwrap(), Dialect::Oracle);
        assert_eq!(Dialect::from_selector("postgresql").unwrap(), Dialect::PostgreSql);
        assert_eq!(Dialect::from_selector("pg").unwrap(), Dialect::PostgreSql);
        assert_eq!(Dialect::from_selector("MySQL").unwrap(), Dialect::MySql);
        assert_eq!(Dialect::from_selector("mariadb").unwrap(), Dialect::MySql);
        assert_eq!(Dialect::from_selector("SQLSERVER").unwrap(), Dialect::SqlServer);
        assert_eq!(Dialect::from_selector("mssql").unwrap(), Dialect::SqlServer);
    }

    #[test]
    fn test_unknown_selector_is_unsupported() {
        let err = Dialect::from_selector("db2").unwrap_err();
        assert!(matches!(err, ResetError::UnsupportedDialect(ref s) if s == "db2"));
        assert!(Dialect::from_selector("").is_err());
    }

    #[test]
    fn test_name_round_trips_through_selector() {
        for dialect in Dialect::ALL {
            assert_eq!(Dialect::from_selector(dialect.name()).unwrap(), dialect);
            assert_eq!(dialect.to_string(), dialect.name());
        }
    }

    #[test]
    fn test_serializes_to_canonical_name() {
        for dialect in Dialect::ALL {
            assert_eq!(
                serde_json::to_value(dialect).unwrap(),
                serde_json::Value::String(dialect.name().to_string())
            );
        }
    }
}
