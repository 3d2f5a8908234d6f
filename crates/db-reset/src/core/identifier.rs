//! Identifier validation and quoting for generated DDL.
//!
//! Object names come straight out of the system catalogs and are spliced into
//! `DROP` statements. Identifiers cannot be bound as statement parameters, so
//! every name is validated and then quoted with the rules of its dialect:
//!
//! 1. Reject empty names, null bytes and over-long names
//! 2. Wrap in the dialect's delimiters (double quotes or backticks)
//! 3. Escape the closing delimiter inside the name by doubling it
//!
//! Quoting also preserves the exact case stored in the catalog, which matters
//! for Oracle and PostgreSQL where unquoted names are case-folded. SQL Server
//! names come back from the catalog already wrapped by `QUOTENAME` and are only
//! validated.

use crate::error::{ResetError, Result};

/// Maximum identifier length (conservative limit across databases).
/// - PostgreSQL: 63 bytes
/// - Oracle: 128 bytes (12.2+)
/// - SQL Server: 128 characters
/// - MySQL: 64 characters
const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Validate an identifier for security issues.
///
/// # Errors
///
/// Returns `ResetError::Identifier` for empty names, names containing a null
/// byte and names longer than the conservative cross-database maximum.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ResetError::Identifier(
            "Identifier cannot be empty".to_string(),
        ));
    }

    if name.contains('\0') {
        return Err(ResetError::Identifier(format!(
            "SECURITY: Identifier contains null byte (possible injection attempt): {:?}",
            name
        )));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(ResetError::Identifier(format!(
            "SECURITY: Identifier exceeds maximum length of {} bytes (got {} bytes): {:?}",
            MAX_IDENTIFIER_LENGTH,
            name.len(),
            name
        )));
    }

    Ok(())
}

/// Quote a PostgreSQL identifier.
///
/// ```ignore
/// assert_eq!(quote_pg("users")?, "\"users\"");
/// assert_eq!(quote_pg("table\"name")?, "\"table\"\"name\"");
/// ```
pub fn quote_pg(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

/// Quote an Oracle identifier.
///
/// Same delimiter rules as PostgreSQL; the name keeps the case it has in
/// `user_objects`, usually upper case.
pub fn quote_oracle(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

/// Quote a MySQL identifier using backticks.
///
/// ```ignore
/// assert_eq!(quote_mysql("users")?, "`users`");
/// assert_eq!(quote_mysql("table`name")?, "`table``name`");
/// ```
pub fn quote_mysql(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(format!("`{}`", name.replace('`', "``")))
}

/// Quote a string literal by doubling single quotes: `O'Brien` -> `'O''Brien'`.
pub fn quote_literal(value: &str) -> Result<String> {
    validate_identifier(value)?;
    Ok(format!("'{}'", value.replace('\'', "''")))
}
