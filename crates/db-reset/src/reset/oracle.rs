//! Oracle reset: views, indexes, tables, sequences.
//!
//! Oracle has no cascade across object types, so the order matters. Index
//! drops are best effort: an index that belongs to a constraint, or that went
//! away with an earlier drop, fails and is recorded instead of aborting.

use crate::core::identifier::{quote_literal, quote_oracle};
use crate::core::traits::Connection;
use crate::error::{ResetError, Result};

use super::{enumerate, execute_all, OnFailure, Phase, ResetReport};

const VIEWS_QUERY: &str = "SELECT object_name FROM user_objects WHERE object_type = 'VIEW'";

// System-named indexes back constraints and are dropped with their table
const INDEXES_QUERY: &str = "SELECT object_name FROM user_objects \
     WHERE object_type = 'INDEX' AND object_name NOT LIKE 'SYS\\_%' ESCAPE '\\'";

const SEQUENCES_QUERY: &str = "SELECT sequence_name FROM user_sequences";

/// Catalog query for the owner's tables; a blank owner is a configuration error.
fn tables_query(schema_owner: &str) -> Result<String> {
    let owner = schema_owner.trim();
    if owner.is_empty() {
        return Err(ResetError::Config(
            "schema owner is required for Oracle".to_string(),
        ));
    }
    let literal = quote_literal(&owner.to_uppercase())
        .map_err(|e| ResetError::Config(format!("Invalid schema owner: {}", e)))?;
    Ok(format!(
        "SELECT table_name FROM all_tables WHERE owner = {}",
        literal
    ))
}

pub(super) async fn reset<C>(conn: &mut C, schema_owner: &str, report: &mut ResetReport) -> Result<()>
where
    C: Connection + ?Sized,
{
    // Built up front: nothing is dropped when the owner is unusable
    let tables_sql = tables_query(schema_owner)?;

    let views = enumerate(conn, VIEWS_QUERY).await?;
    execute_all(
        conn,
        report.begin(Phase::DropViews),
        views,
        |name| Ok(format!("DROP VIEW {}", quote_oracle(name)?)),
        OnFailure::Abort,
    )
    .await?;

    let indexes = enumerate(conn, INDEXES_QUERY).await?;
    execute_all(
        conn,
        report.begin(Phase::DropIndexes),
        indexes,
        |name| Ok(format!("DROP INDEX {}", quote_oracle(name)?)),
        OnFailure::Continue,
    )
    .await?;

    let tables = enumerate(conn, &tables_sql).await?;
    execute_all(
        conn,
        report.begin(Phase::DropTables),
        tables,
        |name| Ok(format!("DROP TABLE {} CASCADE CONSTRAINTS", quote_oracle(name)?)),
        OnFailure::Abort,
    )
    .await?;

    let sequences = enumerate(conn, SEQUENCES_QUERY).await?;
    execute_all(
        conn,
        report.begin(Phase::DropSequences),
        sequences,
        |name| Ok(format!("DROP SEQUENCE {}", quote_oracle(name)?)),
        OnFailure::Abort,
    )
    .await
}
