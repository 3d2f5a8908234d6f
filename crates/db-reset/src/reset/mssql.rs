//! SQL Server reset: views, constraints off, foreign keys, tables.
//!
//! Catalog queries return names already quoted as `[schema].[name]` by
//! `QUOTENAME`, so they are spliced into the DDL as they are. `NOCHECK` only
//! stops constraint enforcement on DML; a table referenced by a foreign key
//! still cannot be dropped, so the foreign keys go before the tables.

use crate::core::identifier::validate_identifier;
use crate::core::traits::Connection;
use crate::error::Result;

use super::{enumerate, execute_all, OnFailure, Phase, ResetReport};

const VIEWS_QUERY: &str = "SELECT QUOTENAME(SCHEMA_NAME(o.uid)) + '.' + QUOTENAME(o.name) \
     FROM sysobjects o \
     WHERE OBJECTPROPERTY(o.id, N'IsView') = 1 \
     AND OBJECTPROPERTY(o.id, N'IsMSShipped') = 0";

const TABLES_QUERY: &str = "SELECT QUOTENAME(SCHEMA_NAME(schema_id)) + '.' + QUOTENAME(name) \
     FROM sys.tables WHERE is_ms_shipped = 0";

const FOREIGN_KEYS_QUERY: &str = "SELECT 'ALTER TABLE ' + QUOTENAME(SCHEMA_NAME(t.schema_id)) \
     + '.' + QUOTENAME(t.name) + ' DROP CONSTRAINT ' + QUOTENAME(fk.name) \
     FROM sys.foreign_keys fk \
     JOIN sys.tables t ON t.object_id = fk.parent_object_id \
     WHERE t.is_ms_shipped = 0";

/// Check a server-quoted name before it goes into DDL.
fn quoted(name: &str) -> Result<&str> {
    validate_identifier(name)?;
    Ok(name)
}

pub(super) async fn reset<C>(conn: &mut C, report: &mut ResetReport) -> Result<()>
where
    C: Connection + ?Sized,
{
    let views = enumerate(conn, VIEWS_QUERY).await?;
    execute_all(
        conn,
        report.begin(Phase::DropViews),
        views,
        |name| Ok(format!("DROP VIEW {}", quoted(name)?)),
        OnFailure::Abort,
    )
    .await?;

    // One list for both passes; every NOCHECK runs before any DROP TABLE
    let tables = enumerate(conn, TABLES_QUERY).await?;
    execute_all(
        conn,
        report.begin(Phase::DisableConstraints),
        tables.clone(),
        |name| Ok(format!("ALTER TABLE {} NOCHECK CONSTRAINT all", quoted(name)?)),
        OnFailure::Abort,
    )
    .await?;

    let foreign_keys = enumerate(conn, FOREIGN_KEYS_QUERY).await?;
    execute_all(
        conn,
        report.begin(Phase::DropForeignKeys),
        foreign_keys,
        |statement| Ok(statement.to_string()),
        OnFailure::Abort,
    )
    .await?;

    execute_all(
        conn,
        report.begin(Phase::DropTables),
        tables,
        |name| Ok(format!("DROP TABLE {}", quoted(name)?)),
        OnFailure::Abort,
    )
    .await
}
