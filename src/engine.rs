//! Script execution against the target database.
//!
//! A script is submitted as one multi-statement text batch over a single
//! MySQL connection. Per-statement feedback (rows affected or rows returned)
//! is collected into an [`ExecutionReport`].

use std::str::FromStr;

use futures::TryStreamExt;
use serde::Serialize;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{Connection, Either, Executor};
use tracing::{debug, info};

use crate::ast::StatementKind;
use crate::config::DatabaseConfig;
use crate::error::{MigrateError, MigrateResult};

/// Feedback from executing one script.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    /// Statements that produced a result.
    pub statements: usize,
    pub rows_affected: u64,
    pub rows_returned: u64,
}

impl ExecutionReport {
    pub fn merge(&mut self, other: ExecutionReport) {
        self.statements += other.statements;
        self.rows_affected += other.rows_affected;
        self.rows_returned += other.rows_returned;
    }
}

/// Something that can run a whole script.
#[allow(async_fn_in_trait)]
pub trait ScriptExecutor {
    /// Run every statement of `script`, stopping at the first failure.
    async fn execute(&mut self, script: &str) -> MigrateResult<ExecutionReport>;

    /// Release the underlying connection.
    async fn close(self) -> MigrateResult<()>
    where
        Self: Sized;
}

/// Executes scripts over one MySQL connection.
pub struct MySqlExecutor {
    conn: MySqlConnection,
}

impl MySqlExecutor {
    /// Connect using the `[database]` configuration.
    pub async fn connect(config: &DatabaseConfig) -> MigrateResult<Self> {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.schema);

        info!(host = %config.host, schema = %config.schema, "Connecting");
        Self::connect_with(options, config).await
    }

    /// Connect using a `mysql://` URL; the timeout still comes from `config`.
    pub async fn connect_url(url: &str, config: &DatabaseConfig) -> MigrateResult<Self> {
        let options = MySqlConnectOptions::from_str(url)
            .map_err(|e| MigrateError::Connection(format!("Invalid database URL: {}", e)))?;
        info!("Connecting with database URL");
        Self::connect_with(options, config).await
    }

    async fn connect_with(options: MySqlConnectOptions, config: &DatabaseConfig) -> MigrateResult<Self> {
        let conn = tokio::time::timeout(config.timeout(), MySqlConnection::connect_with(&options))
            .await
            .map_err(|_| {
                MigrateError::Connection(format!(
                    "Timed out after {}s",
                    config.connect_timeout
                ))
            })?
            .map_err(|e| MigrateError::Connection(e.to_string()))?;

        Ok(Self { conn })
    }
}

impl ScriptExecutor for MySqlExecutor {
    async fn execute(&mut self, script: &str) -> MigrateResult<ExecutionReport> {
        let mut report = ExecutionReport::default();
        let conn = &mut self.conn;
        let mut stream = conn.fetch_many(script);

        while let Some(step) = stream
            .try_next()
            .await
            .map_err(|e| MigrateError::Execution(e.to_string()))?
        {
            match step {
                Either::Left(result) => {
                    report.statements += 1;
                    report.rows_affected += result.rows_affected();
                    debug!(affected = result.rows_affected(), "Statement done");
                }
                Either::Right(_row) => {
                    report.rows_returned += 1;
                }
            }
        }

        if report.rows_returned > 0 {
            debug!(rows = report.rows_returned, "Rows returned");
        }
        Ok(report)
    }

    async fn close(self) -> MigrateResult<()> {
        self.conn
            .close()
            .await
            .map_err(|e| MigrateError::Connection(e.to_string()))
    }
}

/// Counts statements instead of running them.
#[derive(Debug, Default)]
pub struct DryRunExecutor {
    scripts: usize,
}

impl DryRunExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts seen so far.
    pub fn scripts(&self) -> usize {
        self.scripts
    }
}

impl ScriptExecutor for DryRunExecutor {
    async fn execute(&mut self, script: &str) -> MigrateResult<ExecutionReport> {
        self.scripts += 1;
        let statements = script
            .lines()
            .filter(|line| {
                let trimmed = line.trim();
                !trimmed.is_empty() && !trimmed.starts_with("--") && trimmed.ends_with(';')
            })
            .count();
        let inserts = script
            .lines()
            .filter(|line| StatementKind::of(line) == StatementKind::Insert)
            .count();
        debug!(statements, inserts, "Dry run");

        Ok(ExecutionReport {
            statements,
            ..Default::default()
        })
    }

    async fn close(self) -> MigrateResult<()> {
        Ok(())
    }
}
