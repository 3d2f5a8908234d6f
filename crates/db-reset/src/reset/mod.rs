//! Dialect reset scripts and the session runner.
//!
//! Every dialect is a fixed, linear list of phases. A phase enumerates names
//! from the system catalog (fully buffered, the cursor is closed before
//! anything else runs) and then executes one DDL statement per name.
//!
//! | dialect    | phases                                                          |
//! |------------|-----------------------------------------------------------------|
//! | PostgreSQL | tables (`CASCADE`)                                              |
//! | MySQL      | views, FK checks off, tables, FK checks on (always)             |
//! | Oracle     | views, indexes (best effort), tables (`CASCADE CONSTRAINTS`), sequences |
//! | SQL Server | views, constraints off, foreign keys, tables                     |
//!
//! Failures abort the script, except inside Oracle's index phase where each
//! failure is logged, recorded in the [`ResetReport`] and skipped.
//! Statements already executed stay applied: there is no rollback.

mod mssql;
mod mysql;
mod oracle;
mod postgres;
pub mod report;

#[cfg(test)]
pub(crate) mod fake;

pub use report::{FailedStatement, Phase, PhaseReport, ResetReport};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::core::traits::Connection;
use crate::dialect::Dialect;
use crate::error::{ResetError, Result};

/// What a session run ended with.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResetOutcome {
    /// The dialect script ran to completion.
    Completed(ResetReport),
    /// The selector named no supported dialect; nothing was executed.
    Skipped { selector: String },
}

/// How a phase reacts to a failing statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OnFailure {
    Abort,
    Continue,
}

/// Drop every user object handled by `dialect`.
///
/// The connection is borrowed for the whole call and is not released here.
/// `schema_owner` scopes the Oracle table phase and is ignored by the other
/// dialects.
///
/// # Errors
///
/// `ResetError::CatalogQuery` if an enumeration fails and
/// `ResetError::DropStatement` if a statement fails outside Oracle's index
/// phase. Remaining phases are not run.
pub async fn reset<C>(dialect: Dialect, conn: &mut C, schema_owner: &str) -> Result<ResetReport>
where
    C: Connection + ?Sized,
{
    info!(
        "Resetting {} database via {} driver",
        dialect,
        conn.driver_name()
    );

    let mut report = ResetReport::new(dialect);
    match dialect {
        Dialect::Oracle => oracle::reset(conn, schema_owner, &mut report).await?,
        Dialect::PostgreSql => postgres::reset(conn, &mut report).await?,
        Dialect::MySql => mysql::reset(conn, &mut report).await?,
        Dialect::SqlServer => mssql::reset(conn, &mut report).await?,
    }
    report.finish();

    info!(
        "Dropped {} objects with {} statements ({} skipped after failure)",
        report.objects_dropped(),
        report.statements_executed(),
        report.failures().count()
    );
    Ok(report)
}

/// Resolve `selector`, run the matching reset and release the connection.
///
/// The connection is released exactly once whatever happens: after a
/// successful reset, after a fatal error and when the selector is
/// unsupported. A failing release is logged and never replaces the reset's
/// own result.
pub async fn run<C>(selector: &str, conn: &mut C, schema_owner: &str) -> Result<ResetOutcome>
where
    C: Connection + ?Sized,
{
    let outcome = match Dialect::from_selector(selector) {
        Ok(dialect) => reset(dialect, conn, schema_owner)
            .await
            .map(ResetOutcome::Completed),
        Err(ResetError::UnsupportedDialect(selector)) => {
            warn!("Unsupported DBMS: {}", selector);
            Ok(ResetOutcome::Skipped { selector })
        }
        Err(e) => Err(e),
    };

    if let Err(ref e) = outcome {
        error!("During execution: {}", e);
    }

    if let Err(e) = conn.release().await {
        warn!(
            "Failed to release {} connection: {}",
            conn.driver_name(),
            e
        );
    }

    if let Ok(ResetOutcome::Completed(_)) = outcome {
        info!("Reset successfully done.");
    }

    outcome
}

/// Run a catalog query and return the names it lists.
async fn enumerate<C>(conn: &mut C, sql: &str) -> Result<Vec<String>>
where
    C: Connection + ?Sized,
{
    debug!("Enumerating: {}", sql);
    conn.query_column(sql)
        .await
        .map_err(|e| ResetError::catalog_query(sql, e))
}

/// Execute one statement and record it in `phase`.
async fn execute<C>(conn: &mut C, phase: &mut PhaseReport, statement: String) -> Result<()>
where
    C: Connection + ?Sized,
{
    debug!("Executing: {}", statement);
    match conn.execute(&statement).await {
        Ok(()) => {
            phase.executed.push(statement);
            Ok(())
        }
        Err(e) => Err(ResetError::drop_statement(statement, e)),
    }
}

/// Render one statement per catalog name and execute them in order.
async fn execute_all<C, F>(
    conn: &mut C,
    phase: &mut PhaseReport,
    names: Vec<String>,
    render: F,
    on_failure: OnFailure,
) -> Result<()>
where
    C: Connection + ?Sized,
    F: Fn(&str) -> Result<String>,
{
    info!("Dropping {} {}", names.len(), phase.phase.label());

    for name in names {
        let result = match render(&name) {
            Ok(statement) => execute(conn, phase, statement).await,
            Err(e) => Err(e),
        };

        match (result, on_failure) {
            (Ok(()), _) => {}
            (Err(e), OnFailure::Abort) => return Err(e),
            (Err(ResetError::DropStatement { statement, source }), OnFailure::Continue) => {
                error!("Could not perform: {} ({})", statement, source);
                phase.failed.push(FailedStatement {
                    statement,
                    error: source.to_string(),
                });
            }
            (Err(e), OnFailure::Continue) => {
                error!("Could not build drop statement for {}: {}", name, e);
                phase.failed.push(FailedStatement {
                    statement: name,
                    error: e.to_string(),
                });
            }
        }
    }

    Ok(())
}
