//! Per-run record of what a reset did.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::dialect::Dialect;

/// One step of a dialect script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    DropViews,
    DropIndexes,
    DropForeignKeys,
    DropTables,
    DropSequences,
    DisableForeignKeyChecks,
    EnableForeignKeyChecks,
    DisableConstraints,
}

impl Phase {
    /// Human readable label used in log lines.
    pub fn label(&self) -> &'static str {
        match self {
            Phase::DropViews => "views",
            Phase::DropIndexes => "indexes",
            Phase::DropForeignKeys => "foreign keys",
            Phase::DropTables => "tables",
            Phase::DropSequences => "sequences",
            Phase::DisableForeignKeyChecks => "disable foreign key checks",
            Phase::EnableForeignKeyChecks => "enable foreign key checks",
            Phase::DisableConstraints => "disable constraints",
        }
    }
}

/// A statement that failed without aborting its phase.
#[derive(Debug, Clone, Serialize)]
pub struct FailedStatement {
    pub statement: String,
    pub error: String,
}

/// Statements issued by one phase, in order.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseReport {
    pub phase: Phase,
    /// Statements that succeeded.
    pub executed: Vec<String>,
    /// Statements that failed and were skipped.
    pub failed: Vec<FailedStatement>,
}

impl PhaseReport {
    fn new(phase: Phase) -> Self {
        Self {
            phase,
            executed: Vec::new(),
            failed: Vec::new(),
        }
    }
}

/// Result of a completed reset.
#[derive(Debug, Clone, Serialize)]
pub struct ResetReport {
    pub dialect: Dialect,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub phases: Vec<PhaseReport>,
}

impl ResetReport {
    pub(crate) fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            started_at: Utc::now(),
            completed_at: None,
            phases: Vec::new(),
        }
    }

    /// Open a new phase and return it for recording.
    pub(crate) fn begin(&mut self, phase: Phase) -> &mut PhaseReport {
        self.phases.push(PhaseReport::new(phase));
        let last = self.phases.len() - 1;
        &mut self.phases[last]
    }

    pub(crate) fn finish(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    /// Report for a phase, if the script reached it.
    pub fn phase(&self, phase: Phase) -> Option<&PhaseReport> {
        self.phases.iter().find(|p| p.phase == phase)
    }

    /// Number of statements that succeeded across all phases.
    pub fn statements_executed(&self) -> usize {
        self.phases.iter().map(|p| p.executed.len()).sum()
    }

    /// Number of `DROP` statements that succeeded.
    pub fn objects_dropped(&self) -> usize {
        self.phases
            .iter()
            .flat_map(|p| p.executed.iter())
            .filter(|s| s.starts_with("DROP ") || s.contains(" DROP CONSTRAINT "))
            .count()
    }

    /// Statements that failed without aborting the reset.
    pub fn failures(&self) -> impl Iterator<Item = &FailedStatement> {
        self.phases.iter().flat_map(|p| p.failed.iter())
    }

    /// Wall-clock duration in seconds, once finished.
    pub fn duration_seconds(&self) -> Option<f64> {
        self.completed_at
            .map(|end| (end - self.started_at).num_milliseconds() as f64 / 1000.0)
    }

    /// Serialize the report as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
