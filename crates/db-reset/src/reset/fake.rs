//! In-memory catalog that answers the reset scripts' queries.
//!
//! The fake recognises each dialect's catalog queries by a marker substring
//! and interprets the `DROP` statements it receives, so a script can be run
//! end to end and the remaining objects inspected afterwards.

use async_trait::async_trait;

use crate::core::traits::Connection;
use crate::dialect::Dialect;
use crate::error::DriverError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ObjectKind {
    View,
    Table,
    Index,
    Sequence,
    /// SQL Server only: stored as the full `ALTER TABLE ... DROP CONSTRAINT`
    /// statement the catalog query generates.
    ForeignKey,
}

pub(crate) struct FakeConnection {
    dialect: Dialect,
    objects: Vec<(ObjectKind, String)>,
    /// Tables removed along with a table dropped with `CASCADE`.
    dependents: Vec<(String, Vec<String>)>,
    failing_statements: Vec<String>,
    failing_queries: Vec<String>,
    fail_release: bool,
    released: bool,
    /// Every statement attempted, in order, including failed ones.
    pub statements: Vec<String>,
    /// Every catalog query issued, in order.
    pub queries: Vec<String>,
    pub releases: usize,
    /// MySQL session flag toggled by `SET FOREIGN_KEY_CHECKS`.
    pub foreign_key_checks: bool,
}

impl FakeConnection {
    pub(crate) fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            objects: Vec::new(),
            dependents: Vec::new(),
            failing_statements: Vec::new(),
            failing_queries: Vec::new(),
            fail_release: false,
            released: false,
            statements: Vec::new(),
            queries: Vec::new(),
            releases: 0,
            foreign_key_checks: true,
        }
    }

    pub(crate) fn with(mut self, kind: ObjectKind, names: &[&str]) -> Self {
        self.objects
            .extend(names.iter().map(|name| (kind, name.to_string())));
        self
    }

    /// Make `DROP TABLE <table> CASCADE` also remove `tables`.
    pub(crate) fn cascading(mut self, table: &str, tables: &[&str]) -> Self {
        self.dependents.push((
            table.to_string(),
            tables.iter().map(|t| t.to_string()).collect(),
        ));
        self
    }

    /// Make the exact statement `sql` fail.
    pub(crate) fn failing_statement(mut self, sql: &str) -> Self {
        self.failing_statements.push(sql.to_string());
        self
    }

    /// Make every catalog query containing `marker` fail.
    pub(crate) fn failing_query(mut self, marker: &str) -> Self {
        self.failing_queries.push(marker.to_string());
        self
    }

    pub(crate) fn failing_release(mut self) -> Self {
        self.fail_release = true;
        self
    }

    pub(crate) fn remaining(&self, kind: ObjectKind) -> Vec<&str> {
        self.objects
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, name)| name.as_str())
            .collect()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Attempted statements that start with `DROP `.
    pub(crate) fn drops(&self) -> Vec<&str> {
        self.statements
            .iter()
            .filter(|s| s.starts_with("DROP "))
            .map(String::as_str)
            .collect()
    }

    fn kind_for_query(&self, sql: &str) -> Option<ObjectKind> {
        let markers: &[(&str, ObjectKind)] = match self.dialect {
            Dialect::Oracle => &[
                ("object_type = 'VIEW'", ObjectKind::View),
                ("object_type = 'INDEX'", ObjectKind::Index),
                ("all_tables", ObjectKind::Table),
                ("user_sequences", ObjectKind::Sequence),
            ],
            Dialect::PostgreSql => &[("pg_class", ObjectKind::Table)],
            Dialect::MySql => &[
                ("information_schema.views", ObjectKind::View),
                ("information_schema.tables", ObjectKind::Table),
            ],
            // sys.foreign_keys queries also join sys.tables
            Dialect::SqlServer => &[
                ("IsView", ObjectKind::View),
                ("sys.foreign_keys", ObjectKind::ForeignKey),
                ("sys.tables", ObjectKind::Table),
            ],
        };
        markers
            .iter()
            .find(|(marker, _)| sql.contains(marker))
            .map(|(_, kind)| *kind)
    }

    fn remove(&mut self, kind: ObjectKind, name: &str) -> Result<(), DriverError> {
        match self
            .objects
            .iter()
            .position(|(k, n)| *k == kind && n == name)
        {
            Some(pos) => {
                self.objects.remove(pos);
                Ok(())
            }
            None => Err(DriverError::other(format!(
                "{:?} {} does not exist",
                kind, name
            ))),
        }
    }

    fn apply(&mut self, sql: &str) -> Result<(), DriverError> {
        match sql {
            "SET FOREIGN_KEY_CHECKS = 0" => {
                self.foreign_key_checks = false;
                return Ok(());
            }
            "SET FOREIGN_KEY_CHECKS = 1" => {
                self.foreign_key_checks = true;
                return Ok(());
            }
            _ => {}
        }

        if sql.contains(" NOCHECK CONSTRAINT ") {
            return Ok(());
        }
        if sql.contains(" DROP CONSTRAINT ") {
            return self.remove(ObjectKind::ForeignKey, sql);
        }

        let (kind, rest) = if let Some(rest) = sql.strip_prefix("DROP VIEW ") {
            (ObjectKind::View, rest)
        } else if let Some(rest) = sql.strip_prefix("DROP INDEX ") {
            (ObjectKind::Index, rest)
        } else if let Some(rest) = sql.strip_prefix("DROP TABLE ") {
            (ObjectKind::Table, rest)
        } else if let Some(rest) = sql.strip_prefix("DROP SEQUENCE ") {
            (ObjectKind::Sequence, rest)
        } else {
            return Err(DriverError::other(format!("unexpected statement: {}", sql)));
        };

        if kind == ObjectKind::Table {
            if self.dialect == Dialect::MySql && self.foreign_key_checks {
                return Err(DriverError::other(
                    "Cannot drop table referenced by a foreign key constraint",
                ));
            }
            if self.dialect == Dialect::SqlServer && !self.remaining(ObjectKind::ForeignKey).is_empty()
            {
                return Err(DriverError::other(
                    "Could not drop object because it is referenced by a FOREIGN KEY constraint",
                ));
            }
        }

        let (if_exists, rest) = match rest.strip_prefix("IF EXISTS ") {
            Some(rest) => (true, rest),
            None => (false, rest),
        };
        let (cascade, rest) = if let Some(rest) = rest.strip_suffix(" CASCADE CONSTRAINTS") {
            (true, rest)
        } else if let Some(rest) = rest.strip_suffix(" CASCADE") {
            (true, rest)
        } else {
            (false, rest)
        };
        let name = unquote(rest);

        if if_exists && !self.objects.iter().any(|(k, n)| *k == kind && *n == name) {
            return Ok(());
        }
        self.remove(kind, &name)?;

        if cascade && kind == ObjectKind::Table {
            let dependents = self
                .dependents
                .iter()
                .find(|(table, _)| *table == name)
                .map(|(_, tables)| tables.clone())
                .unwrap_or_default();
            self.objects
                .retain(|(k, n)| !(*k == ObjectKind::Table && dependents.contains(n)));
        }
        Ok(())
    }
}

/// Strip one level of `"` or backtick delimiters, collapsing doubled ones.
fn unquote(name: &str) -> String {
    for delim in ['"', '`'] {
        if name.len() >= 2 && name.starts_with(delim) && name.ends_with(delim) {
            let doubled: String = [delim, delim].iter().collect();
            return name[1..name.len() - 1].replace(&doubled, &delim.to_string());
        }
    }
    name.to_string()
}

#[async_trait]
impl Connection for FakeConnection {
    async fn query_column(&mut self, sql: &str) -> Result<Vec<String>, DriverError> {
        if self.released {
            return Err(DriverError::other("connection released"));
        }
        self.queries.push(sql.to_string());
        if self.failing_queries.iter().any(|m| sql.contains(m.as_str())) {
            return Err(DriverError::other("catalog unavailable"));
        }
        let names = match self.kind_for_query(sql) {
            Some(kind) => self
                .remaining(kind)
                .into_iter()
                .map(str::to_string)
                .collect(),
            None => Vec::new(),
        };
        Ok(names)
    }

    async fn execute(&mut self, sql: &str) -> Result<(), DriverError> {
        if self.released {
            return Err(DriverError::other("connection released"));
        }
        self.statements.push(sql.to_string());
        if self.failing_statements.iter().any(|s| s == sql) {
            return Err(DriverError::other(format!("statement rejected: {}", sql)));
        }
        self.apply(sql)
    }

    async fn release(&mut self) -> Result<(), DriverError> {
        self.releases += 1;
        self.released = true;
        if self.fail_release {
            return Err(DriverError::other("socket closed"));
        }
        Ok(())
    }

    fn driver_name(&self) -> &str {
        "fake"
    }
}
