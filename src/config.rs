//! Migration configuration.
//!
//! Loaded from TOML. Every section is optional; missing values fall back to
//! the defaults the loader was written against.
//!
//! ```toml
//! [database]
//! host = "localhost"
//! user = "gsmao"
//! schema = "demo_gsmao_migracion"
//!
//! [paths]
//! root = "/srv/migracion"
//!
//! [lookups.activity]
//! "0" = "1"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{MigrateError, MigrateResult};
use crate::lookup::LookupOverrides;

/// File looked up in the working directory when no path is given.
pub const LOCAL_CONFIG: &str = "migration.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MigrationConfig {
    pub database: DatabaseConfig,
    pub paths: PathsConfig,
    pub lookups: LookupOverrides,
}

/// Target MySQL server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub schema: String,
    /// Seconds to wait for the connection to be established.
    pub connect_timeout: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            user: "gsmao".to_string(),
            password: String::new(),
            schema: "demo_gsmao_migracion".to_string(),
            connect_timeout: 300,
        }
    }
}

impl DatabaseConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }
}

/// Input and output folders.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Base directory for the relative folders below.
    pub root: PathBuf,
    pub dumps: PathBuf,
    pub scripts: PathBuf,
    pub output: PathBuf,
    /// Appended to the stem of every persisted file.
    pub output_suffix: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            dumps: PathBuf::from("DumpFolder"),
            scripts: PathBuf::from("Scripts"),
            output: PathBuf::from("FicherosModificados_Datos"),
            output_suffix: "_modificado".to_string(),
        }
    }
}

impl PathsConfig {
    pub fn dumps_dir(&self) -> PathBuf {
        self.root.join(&self.dumps)
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.root.join(&self.scripts)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.output)
    }
}

impl MigrationConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml(text: &str) -> MigrateResult<Self> {
        toml::from_str(text).map_err(|e| MigrateError::Config(e.to_string()))
    }

    /// Load a configuration file.
    pub fn from_file(path: &Path) -> MigrateResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| MigrateError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
            .map_err(|e| MigrateError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Resolve the configuration to use.
    ///
    /// An explicit path must exist. Otherwise `migration.toml` in the working
    /// directory, then the user config directory, then built-in defaults.
    pub fn load(explicit: Option<&Path>) -> MigrateResult<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::from_file(path)?, Some(path.to_path_buf())));
        }

        for candidate in Self::candidates() {
            if candidate.is_file() {
                return Ok((Self::from_file(&candidate)?, Some(candidate)));
            }
        }

        Ok((Self::default(), None))
    }

    fn candidates() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("gsmao-migrate").join("config.toml"));
        }
        paths
    }
}
