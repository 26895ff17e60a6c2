//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve paths, load configuration, apply debug and timezone settings
//! - Open the database pool and check the core classes
//! - Produce the Router, or stop at the first failing state
//!
//! # Design Decisions
//! - Fail fast: any bootstrap fault is fatal
//! - Steps run in order, never concurrently, and never run twice

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::{AppConfig, ConfigLoader};
use crate::db::Connector;
use crate::escalation::{user_message, Escalation, Escalator, Fault, FaultKind, UserNotice};
use crate::lifecycle::paths::PathSet;
use crate::observability::logging::{directive_for_level, LogHandle};
use crate::registry::builtin;
use crate::registry::{CoreObject, Factories, Library, Method, APP_METHODS, CORE_CLASSES};
use crate::routing::Router;

/// Core class checked (not instantiated) before the router is ready.
pub const BOOT_CLASS: &str = "dao";

/// Bootstrap progress. Each state is entered once, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BootState {
    Uninitialized,
    PathsResolved,
    ConfigLoaded,
    DebugFlagSet,
    TimezoneSet,
    DbConnected,
    Ready,
}

impl fmt::Display for BootState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Where the application lives.
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub base_path: PathBuf,
    pub app_name: String,
    /// Overrides `<base>/app/<app_name>/` when set.
    pub app_root: Option<PathBuf>,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("."),
            app_name: "admin".to_string(),
            app_root: None,
        }
    }
}

/// Bootstrap stopped; the process should print the notice and exit.
#[derive(Debug, Error)]
#[error("bootstrap halted in state {state}: {fault}")]
pub struct BootError {
    pub state: BootState,
    pub fault: Fault,
    pub notice: UserNotice,
}

/// Builds a Router by walking the bootstrap states.
pub struct Bootstrap {
    options: AppOptions,
    methods: Factories<dyn Method>,
    classes: Factories<CoreObject>,
    log: Option<LogHandle>,
    state: BootState,
}

impl Bootstrap {
    pub fn new(options: AppOptions) -> Self {
        Self {
            options,
            methods: Factories::new(),
            classes: builtin::core_classes(),
            log: None,
            state: BootState::Uninitialized,
        }
    }

    /// Application methods the router may resolve.
    pub fn methods(mut self, methods: Factories<dyn Method>) -> Self {
        self.methods = methods;
        self
    }

    /// Core classes; defaults to the built-in set.
    pub fn core_classes(mut self, classes: Factories<CoreObject>) -> Self {
        self.classes = classes;
        self
    }

    /// Filter handle the debug step adjusts.
    pub fn log_handle(mut self, handle: LogHandle) -> Self {
        self.log = Some(handle);
        self
    }

    pub fn state(&self) -> BootState {
        self.state
    }

    fn advance(&mut self, next: BootState) {
        tracing::debug!(from = %self.state, to = %next, "Bootstrap state");
        self.state = next;
    }

    fn halt(&self, escalator: &Escalator, fault: Fault) -> BootError {
        let notice = match escalator.fail(&fault, None) {
            Escalation::Fatal(notice) => notice,
            Escalation::Logged => UserNotice {
                code: fault.code(),
                message: user_message(fault.code()),
                class: fault.kind().class(),
            },
        };
        BootError {
            state: self.state,
            fault,
            notice,
        }
    }

    fn apply_debug(&self, config: &AppConfig) {
        let Some(handle) = &self.log else { return };
        let result = if config.debug {
            handle.enable_debug()
        } else if std::env::var_os("RUST_LOG").is_none() {
            handle.set_directive(&directive_for_level(&config.observability.log_level))
        } else {
            Ok(())
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to adjust log filter");
        }
    }

    fn apply_timezone(escalator: &Escalator, config: &AppConfig) {
        if let Some(zone) = config.time_zone() {
            escalator.set_zone(zone);
            tracing::info!(timezone = %zone, "Timezone set");
        }
    }

    /// Walk every state up to `Ready`.
    pub async fn run(mut self, connector: &dyn Connector) -> Result<Router, BootError> {
        let detached = Escalator::detached();
        let paths = PathSet::resolve(
            &self.options.base_path,
            &self.options.app_name,
            self.options.app_root.as_deref(),
        )
        .map_err(|fault| self.halt(&detached, fault))?;
        self.advance(BootState::PathsResolved);

        let escalator = Escalator::new(paths.log_root());
        let mut loader = ConfigLoader::new(paths.config_root());
        let config = loader.load(&escalator).map_err(|fault| self.halt(&escalator, fault))?;
        self.advance(BootState::ConfigLoaded);

        self.apply_debug(&config);
        self.advance(BootState::DebugFlagSet);

        Self::apply_timezone(&escalator, &config);
        self.advance(BootState::TimezoneSet);

        let db = match connector.connect(&config.db).await {
            Ok(db) => db,
            Err(e) => {
                let fault = Fault::new(FaultKind::DatabaseConnection, e.to_string());
                return Err(self.halt(&escalator, fault));
            }
        };
        self.advance(BootState::DbConnected);

        let methods = Library::new(
            paths.app_lib_root(),
            APP_METHODS,
            std::mem::take(&mut self.methods),
        );
        let classes = Library::new(
            paths.core_lib_root(),
            CORE_CLASSES,
            std::mem::take(&mut self.classes),
        );

        tracing::debug!(
            methods = %methods.root().display(),
            classes = %classes.root().display(),
            "Library roots"
        );
        match methods.unregistered() {
            Ok(names) if !names.is_empty() => {
                tracing::warn!(names = ?names, "Method class files without a registered type")
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(root = %methods.root().display(), error = %e, "Failed to scan method library"),
        }

        let router = Router::new(paths, config, loader, db, methods, classes, escalator);
        if let Err(fault) = router.load_class(BOOT_CLASS, true) {
            return Err(self.halt(router.escalator(), fault));
        }
        self.advance(BootState::Ready);

        tracing::info!(
            app_root = %router.paths().app_root().display(),
            web_root = %router.web_root(),
            "Router ready"
        );
        Ok(router)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_are_ordered() {
        assert!(BootState::Uninitialized < BootState::PathsResolved);
        assert!(BootState::TimezoneSet < BootState::DbConnected);
        assert!(BootState::DbConnected < BootState::Ready);
        assert_eq!(BootState::ConfigLoaded.to_string(), "ConfigLoaded");
    }

    #[test]
    fn default_app_is_admin() {
        let options = AppOptions::default();
        assert_eq!(options.app_name, "admin");
        assert!(options.app_root.is_none());
    }
}
