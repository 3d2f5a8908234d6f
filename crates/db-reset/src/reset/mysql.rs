//! MySQL reset: views, then base tables with foreign key checks disabled.
//!
//! `FOREIGN_KEY_CHECKS` is session scoped. It is switched back on after the
//! table phase whether or not that phase succeeded.

use tracing::warn;

use crate::core::identifier::quote_mysql;
use crate::core::traits::Connection;
use crate::error::Result;

use super::{enumerate, execute, execute_all, OnFailure, Phase, ResetReport};

const VIEWS_QUERY: &str =
    "SELECT table_name FROM information_schema.views WHERE table_schema = DATABASE()";

const TABLES_QUERY: &str = "SELECT table_name FROM information_schema.tables \
     WHERE table_schema = DATABASE() AND table_type = 'BASE TABLE'";

const DISABLE_FK_CHECKS: &str = "SET FOREIGN_KEY_CHECKS = 0";
const ENABLE_FK_CHECKS: &str = "SET FOREIGN_KEY_CHECKS = 1";

pub(super) async fn reset<C>(conn: &mut C, report: &mut ResetReport) -> Result<()>
where
    C: Connection + ?Sized,
{
    let views = enumerate(conn, VIEWS_QUERY).await?;
    execute_all(
        conn,
        report.begin(Phase::DropViews),
        views,
        |name| Ok(format!("DROP VIEW IF EXISTS {}", quote_mysql(name)?)),
        OnFailure::Abort,
    )
    .await?;

    execute(
        conn,
        report.begin(Phase::DisableForeignKeyChecks),
        DISABLE_FK_CHECKS.to_string(),
    )
    .await?;

    let dropped = drop_tables(conn, report).await;

    let restored = execute(
        conn,
        report.begin(Phase::EnableForeignKeyChecks),
        ENABLE_FK_CHECKS.to_string(),
    )
    .await;

    match (dropped, restored) {
        (Err(e), Err(restore_err)) => {
            warn!("Could not re-enable foreign key checks: {}", restore_err);
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
        (Ok(()), restored) => restored,
    }
}

async fn drop_tables<C>(conn: &mut C, report: &mut ResetReport) -> Result<()>
where
    C: Connection + ?Sized,
{
    let tables = enumerate(conn, TABLES_QUERY).await?;
    execute_all(
        conn,
        report.begin(Phase::DropTables),
        tables,
        |name| Ok(format!("DROP TABLE IF EXISTS {}", quote_mysql(name)?)),
        OnFailure::Abort,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::super::fake::{FakeConnection, ObjectKind};
    use super::*;
    use crate::dialect::Dialect;
    use crate::error::ResetError;

    #[tokio::test]
    async fn test_phase_order_and_statements() {
        let mut conn = FakeConnection::new(Dialect::MySql)
            .with(ObjectKind::View, &["active_users"])
            .with(ObjectKind::Table, &["users", "orders"]);
        let mut report = ResetReport::new(Dialect::MySql);

        reset(&mut conn, &mut report).await.unwrap();

        assert_eq!(
            conn.statements,
            vec![
                "DROP VIEW IF EXISTS `active_users`",
                "SET FOREIGN_KEY_CHECKS = 0",
                "DROP TABLE IF EXISTS `users`",
                "DROP TABLE IF EXISTS `orders`",
                "SET FOREIGN_KEY_CHECKS = 1",
            ]
        );
        let phases: Vec<Phase> = report.phases.iter().map(|p| p.phase).collect();
        assert_eq!(
            phases,
            vec![
                Phase::DropViews,
                Phase::DisableForeignKeyChecks,
                Phase::DropTables,
                Phase::EnableForeignKeyChecks,
            ]
        );
        assert_eq!(report.objects_dropped(), 3);
        assert!(conn.foreign_key_checks);
        assert!(conn.is_empty());
    }

    #[tokio::test]
    async fn test_fk_checks_restored_after_table_failure() {
        let mut conn = FakeConnection::new(Dialect::MySql)
            .with(ObjectKind::Table, &["t1", "t2", "t3", "t4"])
            .failing_statement("DROP TABLE IF EXISTS `t2`");
        let mut report = ResetReport::new(Dialect::MySql);

        let err = reset(&mut conn, &mut report).await.unwrap_err();

        assert!(matches!(err, ResetError::DropStatement { ref statement, .. }
            if statement == "DROP TABLE IF EXISTS `t2`"));
        assert_eq!(
            conn.statements.last().map(String::as_str),
            Some("SET FOREIGN_KEY_CHECKS = 1")
        );
        assert!(conn.foreign_key_checks);
        assert_eq!(conn.remaining(ObjectKind::Table), vec!["t2", "t3", "t4"]);
    }

    #[tokio::test]
    async fn test_fk_checks_restored_after_table_enumeration_failure() {
        let mut conn = FakeConnection::new(Dialect::MySql)
            .with(ObjectKind::Table, &["t1"])
            .failing_query("information_schema.tables");
        let mut report = ResetReport::new(Dialect::MySql);

        let err = reset(&mut conn, &mut report).await.unwrap_err();

        assert!(matches!(err, ResetError::CatalogQuery { .. }));
        assert_eq!(
            conn.statements,
            vec!["SET FOREIGN_KEY_CHECKS = 0", "SET FOREIGN_KEY_CHECKS = 1"]
        );
        assert!(conn.foreign_key_checks);
    }

    #[tokio::test]
    async fn test_table_error_wins_over_restore_error() {
        let mut conn = FakeConnection::new(Dialect::MySql)
            .with(ObjectKind::Table, &["t1"])
            .failing_statement("DROP TABLE IF EXISTS `t1`")
            .failing_statement("SET FOREIGN_KEY_CHECKS = 1");
        let mut report = ResetReport::new(Dialect::MySql);

        let err = reset(&mut conn, &mut report).await.unwrap_err();

        assert!(matches!(err, ResetError::DropStatement { ref statement, .. }
            if statement == "DROP TABLE IF EXISTS `t1`"));
    }

    #[tokio::test]
    async fn test_view_failure_leaves_fk_checks_untouched() {
        let mut conn = FakeConnection::new(Dialect::MySql)
            .with(ObjectKind::View, &["v1"])
            .failing_statement("DROP VIEW IF EXISTS `v1`");
        let mut report = ResetReport::new(Dialect::MySql);

        assert!(reset(&mut conn, &mut report).await.is_err());
        assert_eq!(conn.statements, vec!["DROP VIEW IF EXISTS `v1`"]);
        assert!(conn.foreign_key_checks);
    }

    #[tokio::test]
    async fn test_empty_schema_only_toggles_checks() {
        let mut conn = FakeConnection::new(Dialect::MySql);
        let mut report = ResetReport::new(Dialect::MySql);

        reset(&mut conn, &mut report).await.unwrap();

        assert!(conn.drops().is_empty());
        assert_eq!(report.objects_dropped(), 0);
        assert_eq!(report.statements_executed(), 2);
    }
}
