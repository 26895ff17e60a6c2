//! Configuration loading from disk.
//!
//! Two sources under the config root, in order: `config` (main) and `my`
//! (local override, only when present). Each source is merged at most once
//! per loader; a later source overrides only the keys it defines.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};

use toml::{Table, Value};

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::escalation::{Escalation, Escalator, Fault, FaultKind, Site};

pub const MAIN_SOURCE: &str = "config";
pub const OVERRIDE_SOURCE: &str = "my";

/// Error type for reading a single source.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Schema(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Schema(e) => write!(f, "Schema error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse one TOML source into a table.
pub fn read_source(path: &Path) -> Result<Table, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    content.parse::<Table>().map_err(ConfigError::Parse)
}

/// Merge `source` into `target`. Nested tables merge key by key; anything
/// else replaces the previous value.
pub fn merge_tables(target: &mut Table, source: Table) {
    for (key, value) in source {
        if let Value::Table(incoming) = value {
            if let Some(Value::Table(existing)) = target.get_mut(&key) {
                merge_tables(existing, incoming);
                continue;
            }
            target.insert(key, Value::Table(incoming));
        } else {
            target.insert(key, value);
        }
    }
}

/// Accumulates configuration sources for the life of the process.
#[derive(Debug)]
pub struct ConfigLoader {
    root: PathBuf,
    merged: Table,
    loaded: HashSet<PathBuf>,
}

impl ConfigLoader {
    pub fn new(config_root: impl Into<PathBuf>) -> Self {
        Self {
            root: config_root.into(),
            merged: Table::new(),
            loaded: HashSet::new(),
        }
    }

    /// Sources merged so far, in no particular order.
    pub fn loaded_sources(&self) -> impl Iterator<Item = &Path> {
        self.loaded.iter().map(PathBuf::as_path)
    }

    /// Merge the pending sources and return the resulting configuration.
    ///
    /// A missing main source is tolerated (and escalated as a notice) when the
    /// override exists; with neither present loading fails.
    #[track_caller]
    pub fn load(&mut self, escalator: &Escalator) -> Result<AppConfig, Fault> {
        let caller = Site::from_location(Location::caller(), "ConfigLoader::load");

        let main = self.root.join(MAIN_SOURCE);
        let local = self.root.join(OVERRIDE_SOURCE);
        let extensions: Vec<PathBuf> = if local.is_file() { vec![local] } else { Vec::new() };

        let sources = if !main.is_file() {
            let notice = Fault::new(
                FaultKind::MainConfigMissing,
                format!("config file {} not found", main.display()),
            )
            .called_by(caller);
            if extensions.is_empty() {
                return Err(Fault::new(
                    FaultKind::ConfigMissing,
                    format!("config file {} not found and no {} override", main.display(), OVERRIDE_SOURCE),
                )
                .called_by(caller));
            }
            if let Escalation::Fatal(_) = escalator.fail(&notice, None) {
                return Err(notice);
            }
            extensions
        } else {
            std::iter::once(main).chain(extensions).collect()
        };

        for source in sources {
            if self.loaded.contains(&source) {
                continue;
            }
            let table = read_source(&source).map_err(|e| {
                Fault::new(
                    FaultKind::ConfigInvalid,
                    format!("config file {} is invalid: {}", source.display(), e),
                )
                .called_by(caller)
            })?;
            merge_tables(&mut self.merged, table);
            tracing::debug!(source = %source.display(), "Config source merged");
            self.loaded.insert(source);
        }

        let config: AppConfig = Value::Table(self.merged.clone())
            .try_into()
            .map_err(|e| config_fault(ConfigError::Schema(e), caller))?;
        validate_config(&config).map_err(|e| config_fault(ConfigError::Validation(e), caller))?;

        Ok(config)
    }
}

#[track_caller]
fn config_fault(error: ConfigError, caller: Site) -> Fault {
    Fault::new(FaultKind::ConfigInvalid, format!("config rejected: {}", error)).called_by(caller)
}
