//! # gsmao-migrate
//!
//! One-shot loader that moves the legacy GSMAO MySQL dumps into the new
//! schema.
//!
//! For every file of a fixed plan the loader reads the dump, keeps only its
//! `LOCK TABLES` / `INSERT INTO` / `UNLOCK TABLES` lines, rewrites them for
//! the new table layout, writes the result next to the inputs and executes
//! it. The first failure stops the run.
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use gsmao_migrate::prelude::*;
//!
//! let transformer = Transformer::new(Lookups::default());
//! let sql = transformer.apply(Table::Activos, dump)?;
//! ```
//!
//! ## Rewrite shapes
//!
//! | Shape          | Tables                                                       |
//! |----------------|--------------------------------------------------------------|
//! | Inject columns | plantas, componentes, incidencias, resoluciones, mecanismos  |
//! | Rename         | estados, tipos de orden                                      |
//! | Restructure    | centros de coste, localizaciones, activos, ordenes, ...      |

pub mod ast;
pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod lookup;
pub mod parser;
pub mod plan;
pub mod schema;
pub mod transform;
pub mod transpiler;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::config::MigrationConfig;
    pub use crate::driver::{FileOutcome, Migration, RunSummary, Stage};
    pub use crate::engine::{DryRunExecutor, ExecutionReport, MySqlExecutor, ScriptExecutor};
    pub use crate::error::*;
    pub use crate::lookup::{LookupTable, Lookups};
    pub use crate::parser::parse_insert;
    pub use crate::plan::{MigrationPlan, PlanEntry};
    pub use crate::transform::{filter_statements, Table, Transform, Transformer};
    pub use crate::transpiler::ToSql;
}

/// Tokenize a bulk `INSERT INTO` line.
///
/// # Example
///
/// ```
/// use gsmao_migrate::parse;
///
/// let stmt = parse("INSERT INTO `estados` VALUES (1,'Abierta'),(2,'Cerrada');").unwrap();
/// assert_eq!(stmt.table, "estados");
/// assert_eq!(stmt.rows.len(), 2);
/// ```
pub fn parse(line: &str) -> Result<ast::InsertStatement, error::MigrateError> {
    parser::parse_insert(line)
}
