//! PostgreSQL reset: every visible user table, dropped with `CASCADE`.
//!
//! `CASCADE` takes dependent views, foreign keys and owned sequences
//! (`serial`/identity columns) with each table. It can also take tables that
//! were enumerated but not dropped yet (inheritance children), hence
//! `IF EXISTS`.

use crate::core::identifier::quote_pg;
use crate::core::traits::Connection;
use crate::error::Result;

use super::{enumerate, execute_all, OnFailure, Phase, ResetReport};

const TABLES_QUERY: &str = "SELECT c.relname FROM pg_catalog.pg_class c \
     LEFT JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace \
     WHERE c.relkind = 'r' \
     AND n.nspname NOT IN ('pg_catalog', 'pg_toast') \
     AND pg_catalog.pg_table_is_visible(c.oid)";

pub(super) async fn reset<C>(conn: &mut C, report: &mut ResetReport) -> Result<()>
where
    C: Connection + ?Sized,
{
    let tables = enumerate(conn, TABLES_QUERY).await?;
    let phase = report.begin(Phase::DropTables);
    execute_all(
        conn,
        phase,
        tables,
        |name| Ok(format!("DROP TABLE IF EXISTS {} CASCADE", quote_pg(name)?)),
        OnFailure::Abort,
    )
    .await
}
