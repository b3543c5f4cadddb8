//! gsmao-migrate: the GSMAO dump loader CLI
//!
//! # Usage
//!
//! ```bash
//! # Rewrite and load every dump
//! gsmao-migrate run --config migration.toml
//!
//! # Rewrite and persist only, no database
//! gsmao-migrate run --dry-run
//!
//! # Rewrite one dump to stdout
//! gsmao-migrate transform DumpFolder/hitachi_activos.sql
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use gsmao_migrate::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gsmao-migrate")]
#[command(version)]
#[command(about = "Rewrite the legacy GSMAO dumps and load them into the new schema", long_about = None)]
#[command(after_help = "EXAMPLES:
    gsmao-migrate run --config migration.toml
    gsmao-migrate run --dry-run
    gsmao-migrate transform DumpFolder/hitachi_ordenes.sql -o ordenes.sql
    gsmao-migrate plan --format json")]
struct Cli {
    /// Configuration file (defaults to ./migration.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite, persist and execute every file of the plan, in order
    Run {
        /// Rewrite and persist, but don't touch the database
        #[arg(short, long)]
        dry_run: bool,

        /// MySQL connection URL, replaces the [database] section
        #[arg(long, env = "GSMAO_DATABASE_URL", hide_env_values = true)]
        database_url: Option<String>,

        /// Database password, replaces [database].password
        #[arg(long, env = "GSMAO_DB_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Summary format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Rewrite a single dump without loading it
    Transform {
        /// Dump file to rewrite
        file: PathBuf,

        /// Table rewrite to apply (inferred from the file name by default)
        #[arg(short, long)]
        table: Option<Table>,

        /// Skip the LOCK/INSERT/UNLOCK line filter
        #[arg(long)]
        no_filter: bool,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the load order
    Plan {
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Commands::Run {
            dry_run,
            database_url,
            password,
            format,
        } => {
            run_migration(
                &cli,
                *dry_run,
                database_url.as_deref(),
                password.as_deref(),
                *format,
            )
            .await
        }
        Commands::Transform {
            file,
            table,
            no_filter,
            output,
        } => transform_file(&cli, file, *table, *no_filter, output.as_deref()),
        Commands::Plan { format } => show_plan(&cli, *format),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "gsmao_migrate=debug" } else { "gsmao_migrate=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<MigrationConfig> {
    let (config, source) = MigrationConfig::load(cli.config.as_deref())?;
    if cli.verbose {
        match source {
            Some(path) => println!("{} {}", "Config:".dimmed(), path.display()),
            None => println!("{} {}", "Config:".dimmed(), "built-in defaults".dimmed()),
        }
    }
    Ok(config)
}

async fn run_migration(
    cli: &Cli,
    dry_run: bool,
    database_url: Option<&str>,
    password: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let mut config = load_config(cli)?;
    if let Some(password) = password {
        config.database.password = password.to_string();
    }

    let transformer = Transformer::new(Lookups::with_overrides(&config.lookups));
    let plan = MigrationPlan::default();
    let migration = Migration::new(&plan, &config.paths, &transformer);

    println!("{}", "GSMAO dump migration".cyan().bold());
    println!(
        "{} {} files from {}",
        "Plan:".dimmed(),
        plan.len().to_string().cyan(),
        config.paths.root.display()
    );
    println!();

    let progress = |outcome: &FileOutcome| {
        let name = outcome
            .written
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| outcome.file.clone());
        println!(
            "{} {} {}",
            "✓".green(),
            name.white(),
            format!(
                "({} statements, {} rows affected)",
                outcome.report.statements, outcome.report.rows_affected
            )
            .dimmed()
        );
    };

    let outcome = if dry_run {
        println!("{}", "Dry run: scripts are rewritten but not executed".yellow());
        migration.run(DryRunExecutor::new(), progress).await
    } else {
        let executor = match database_url {
            Some(url) => MySqlExecutor::connect_url(url, &config.database).await,
            None => MySqlExecutor::connect(&config.database).await,
        }
        .context("Cannot open the target database")?;
        migration.run(executor, progress).await
    };

    let summary = match outcome {
        Ok(summary) => summary,
        Err(e) => {
            println!();
            if let Some(stage) = e.stage() {
                println!("{} {}", "✗ Migration stopped while".red().bold(), stage.to_string().red().bold());
            }
            return Err(e.into());
        }
    };

    println!();
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Table => {
            println!(
                "{} {} files, {} statements, {} rows affected",
                "Total:".white().bold(),
                summary.files.len().to_string().cyan(),
                summary.total.statements.to_string().cyan(),
                summary.total.rows_affected.to_string().cyan()
            );
        }
    }
    println!("{}", "✓ Migration completed".green().bold());
    Ok(())
}

fn transform_file(
    cli: &Cli,
    file: &Path,
    table: Option<Table>,
    no_filter: bool,
    output: Option<&Path>,
) -> Result<()> {
    let config = load_config(cli)?;
    let transformer = Transformer::new(Lookups::with_overrides(&config.lookups));

    let table = table.or_else(|| {
        file.file_name()
            .and_then(|n| n.to_str())
            .and_then(Table::for_file)
    });
    if cli.verbose {
        let label = table.map(|t| t.name()).unwrap_or("none");
        eprintln!("{} {}", "Table rewrite:".dimmed(), label.cyan());
    }

    let dump = gsmao_migrate::driver::read_script(file)?;
    let script = match (no_filter, table) {
        (true, Some(table)) => transformer.apply(table, &dump)?,
        (true, None) => dump,
        (false, table) => transformer.rewrite_dump(table, &dump)?,
    };

    match output {
        Some(path) => {
            gsmao_migrate::driver::write_script(path, &script)?;
            println!("{} Wrote {}", "✓".green(), path.display().to_string().cyan());
        }
        None => println!("{}", script),
    }
    Ok(())
}

fn show_plan(cli: &Cli, format: OutputFormat) -> Result<()> {
    let config = load_config(cli)?;
    let plan = MigrationPlan::default();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        OutputFormat::Table => {
            println!(
                "{:3} {:55} {:16} {}",
                "#".white().bold(),
                "File".white().bold(),
                "Rewrite".white().bold(),
                "Output".white().bold()
            );
            println!("{}", "─".repeat(110).dimmed());

            for (i, entry) in plan.entries().iter().enumerate() {
                let rewrite = match entry.table {
                    Some(table) => {
                        let transform = table.transform();
                        format!("{} → {}", transform.kind(), transform.target_name())
                    }
                    None if entry.is_rewritten() => "filter".to_string(),
                    None => "verbatim".to_string(),
                };
                let output = if entry.is_rewritten() {
                    entry.output_file(&config.paths.output_suffix)
                } else {
                    "-".to_string()
                };
                println!(
                    "{:3} {:55} {:16} {}",
                    (i + 1).to_string().cyan(),
                    entry.file.white(),
                    rewrite.yellow(),
                    output.dimmed()
                );
            }
        }
    }
    Ok(())
}
