//! Sequential driver for a migration plan.
//!
//! Each file moves through `Reading → Transforming → Persisting → Executing`.
//! The first error stops the whole run; it is reported together with the
//! file and the stage that failed. The executor is closed whether the run
//! succeeds or not.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::PathsConfig;
use crate::engine::{ExecutionReport, ScriptExecutor};
use crate::error::{MigrateError, MigrateResult};
use crate::plan::{MigrationPlan, PlanEntry, Source};
use crate::transform::Transformer;

/// Where a file is in its load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Idle,
    Reading,
    Transforming,
    Persisting,
    Executing,
    Succeeded,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Reading => "reading",
            Stage::Transforming => "transforming",
            Stage::Persisting => "persisting",
            Stage::Executing => "executing",
            Stage::Succeeded => "succeeded",
            Stage::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Result of loading one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    pub file: String,
    /// Rewritten script on disk, for dumps.
    pub written: Option<PathBuf>,
    pub report: ExecutionReport,
}

/// Result of a complete run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub files: Vec<FileOutcome>,
    pub total: ExecutionReport,
}

/// Drives a plan from disk to the executor.
pub struct Migration<'a> {
    plan: &'a MigrationPlan,
    paths: &'a PathsConfig,
    transformer: &'a Transformer,
}

impl<'a> Migration<'a> {
    pub fn new(plan: &'a MigrationPlan, paths: &'a PathsConfig, transformer: &'a Transformer) -> Self {
        Self {
            plan,
            paths,
            transformer,
        }
    }

    /// Run the whole plan. `on_file` is called after each file succeeds.
    pub async fn run<E, F>(&self, mut executor: E, mut on_file: F) -> MigrateResult<RunSummary>
    where
        E: ScriptExecutor,
        F: FnMut(&FileOutcome),
    {
        let result = self.run_entries(&mut executor, &mut on_file).await;

        let closed = executor.close().await;
        if let Err(e) = &closed {
            warn!(error = %e, "Failed to close executor");
        }

        let summary = result?;
        closed?;
        info!(files = summary.files.len(), "Migration completed");
        Ok(summary)
    }

    async fn run_entries<E, F>(&self, executor: &mut E, on_file: &mut F) -> MigrateResult<RunSummary>
    where
        E: ScriptExecutor,
        F: FnMut(&FileOutcome),
    {
        let mut summary = RunSummary::default();

        for entry in self.plan.entries() {
            let mut stage = Stage::Idle;
            match self.load(entry, executor, &mut stage).await {
                Ok(outcome) => {
                    debug!(file = entry.file, stage = %Stage::Succeeded, "File done");
                    summary.total.merge(outcome.report);
                    on_file(&outcome);
                    summary.files.push(outcome);
                }
                Err(e) => {
                    warn!(file = entry.file, stage = %stage, error = %e, "File failed");
                    return Err(e.at(entry.file, stage));
                }
            }
        }

        Ok(summary)
    }

    async fn load<E: ScriptExecutor>(
        &self,
        entry: &PlanEntry,
        executor: &mut E,
        stage: &mut Stage,
    ) -> MigrateResult<FileOutcome> {
        let (script, written) = self.prepare(entry, stage)?;

        *stage = Stage::Executing;
        debug!(file = entry.file, stage = %stage);
        let report = executor.execute(&script).await?;
        info!(
            file = entry.file,
            statements = report.statements,
            rows_affected = report.rows_affected,
            "Executed"
        );

        Ok(FileOutcome {
            file: entry.file.to_string(),
            written,
            report,
        })
    }

    /// Read, rewrite and persist one entry without executing it.
    pub fn prepare(&self, entry: &PlanEntry, stage: &mut Stage) -> MigrateResult<(String, Option<PathBuf>)> {
        *stage = Stage::Reading;
        debug!(file = entry.file, stage = %stage);
        let path = self.input_path(entry);
        let raw = read_script(&path)?;

        if !entry.is_rewritten() {
            return Ok((raw, None));
        }

        *stage = Stage::Transforming;
        debug!(file = entry.file, stage = %stage);
        let script = self.transformer.rewrite_dump(entry.table, &raw)?;

        *stage = Stage::Persisting;
        debug!(file = entry.file, stage = %stage);
        let out = self
            .paths
            .output_dir()
            .join(entry.output_file(&self.paths.output_suffix));
        write_script(&out, &script)?;

        Ok((script, Some(out)))
    }

    /// Full path of an entry's input file.
    pub fn input_path(&self, entry: &PlanEntry) -> PathBuf {
        match entry.source {
            Source::Scripts => self.paths.scripts_dir().join(entry.file),
            Source::Dumps => self.paths.dumps_dir().join(entry.file),
        }
    }
}

/// Read a UTF-8 script.
pub fn read_script(path: &Path) -> MigrateResult<String> {
    std::fs::read_to_string(path).map_err(|source| MigrateError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a script, creating its folder when missing.
pub fn write_script(path: &Path, script: &str) -> MigrateResult<()> {
    let to_err = |source: std::io::Error| MigrateError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(to_err)?;
    }
    std::fs::write(path, script).map_err(to_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::DryRunExecutor;
    use crate::transform::Table;

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Transforming.to_string(), "transforming");
        assert_eq!(Stage::Executing.to_string(), "executing");
    }

    #[test]
    fn test_input_paths() {
        let plan = MigrationPlan::default();
        let paths = PathsConfig {
            root: PathBuf::from("/data"),
            ..Default::default()
        };
        let transformer = Transformer::default();
        let migration = Migration::new(&plan, &paths, &transformer);

        assert_eq!(
            migration.input_path(&PlanEntry::script("limpiar_BBDD.sql")),
            PathBuf::from("/data/Scripts/limpiar_BBDD.sql")
        );
        assert_eq!(
            migration.input_path(&PlanEntry::table(Table::Activos, "hitachi_activos.sql")),
            PathBuf::from("/data/DumpFolder/hitachi_activos.sql")
        );
    }

    #[tokio::test]
    async fn test_missing_file_fails_while_reading() {
        let plan = MigrationPlan::new(vec![PlanEntry::dump("hitachi_empresas.sql")]);
        let paths = PathsConfig {
            root: PathBuf::from("/nonexistent-gsmao-root"),
            ..Default::default()
        };
        let transformer = Transformer::default();
        let migration = Migration::new(&plan, &paths, &transformer);

        let err = migration.run(DryRunExecutor::new(), |_| {}).await.unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Reading));
        assert!(err.to_string().starts_with("hitachi_empresas.sql: failed while reading"));
    }
}
