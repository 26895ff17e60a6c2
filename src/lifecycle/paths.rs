//! Directory roots derived from the base path.
//!
//! ```text
//! <base>/config/   <base>/frame/   <base>/lib/
//! <app>/lib/   <app>/tmp/   <app>/tmp/cache/   <app>/tmp/log/
//! ```
//!
//! Every root is built by plain string concatenation and ends with the platform
//! separator. `<app>` defaults to `<base>/app/<name>/`.

use std::fs;
use std::panic::Location;
use std::path::{Path, MAIN_SEPARATOR};

use crate::escalation::{Fault, FaultKind, Site};

/// Fixed subdirectory names.
const CONFIG_DIR: &str = "config";
const FRAME_DIR: &str = "frame";
const LIB_DIR: &str = "lib";
const APP_DIR: &str = "app";
const TMP_DIR: &str = "tmp";
const CACHE_DIR: &str = "cache";
const LOG_DIR: &str = "log";

/// The resolved directory hierarchy. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSet {
    base: String,
    config: String,
    frame: String,
    core_lib: String,
    app: String,
    app_lib: String,
    tmp: String,
    cache: String,
    log: String,
}

fn join_dir(parent: &str, name: &str) -> String {
    format!("{}{}{}", parent, name, MAIN_SEPARATOR)
}

fn with_separator(path: &Path) -> String {
    let mut s = path.to_string_lossy().into_owned();
    if !s.ends_with(MAIN_SEPARATOR) {
        s.push(MAIN_SEPARATOR);
    }
    s
}

impl PathSet {
    /// Resolve every root from `base_path`.
    ///
    /// With no override the application root is `<base>/app/<app_name>/`;
    /// otherwise the override is canonicalized and used as is. The
    /// application root must be an existing directory.
    #[track_caller]
    pub fn resolve(base_path: &Path, app_name: &str, app_root: Option<&Path>) -> Result<Self, Fault> {
        let caller = Site::from_location(Location::caller(), "PathSet::resolve");

        let base = fs::canonicalize(base_path).map_err(|e| {
            Fault::new(
                FaultKind::BasePathInvalid,
                format!("The base path {} can not be resolved: {}", base_path.display(), e),
            )
            .called_by(caller)
        })?;
        let base = with_separator(&base);

        let app = match app_root.filter(|p| !p.as_os_str().is_empty()) {
            None => join_dir(&join_dir(&base, APP_DIR), app_name),
            Some(root) => match fs::canonicalize(root) {
                Ok(resolved) => with_separator(&resolved),
                Err(_) => with_separator(root),
            },
        };

        if !Path::new(&app).is_dir() {
            return Err(Fault::new(
                FaultKind::AppRootMissing,
                format!("The app you call not found in {}", app),
            )
            .called_by(caller));
        }

        Ok(Self::from_roots(base, app))
    }

    /// Derive the seven roots from an already separator-terminated base and app root.
    fn from_roots(base: String, app: String) -> Self {
        let tmp = join_dir(&app, TMP_DIR);
        Self {
            config: join_dir(&base, CONFIG_DIR),
            frame: join_dir(&base, FRAME_DIR),
            core_lib: join_dir(&base, LIB_DIR),
            app_lib: join_dir(&app, LIB_DIR),
            cache: join_dir(&tmp, CACHE_DIR),
            log: join_dir(&tmp, LOG_DIR),
            tmp,
            base,
            app,
        }
    }

    pub fn base(&self) -> &Path {
        Path::new(&self.base)
    }

    pub fn config_root(&self) -> &Path {
        Path::new(&self.config)
    }

    pub fn frame_root(&self) -> &Path {
        Path::new(&self.frame)
    }

    pub fn core_lib_root(&self) -> &Path {
        Path::new(&self.core_lib)
    }

    pub fn app_root(&self) -> &Path {
        Path::new(&self.app)
    }

    pub fn app_lib_root(&self) -> &Path {
        Path::new(&self.app_lib)
    }

    pub fn tmp_root(&self) -> &Path {
        Path::new(&self.tmp)
    }

    pub fn cache_root(&self) -> &Path {
        Path::new(&self.cache)
    }

    pub fn log_root(&self) -> &Path {
        Path::new(&self.log)
    }

    /// The separator every root ends with.
    pub fn separator(&self) -> char {
        MAIN_SEPARATOR
    }
}
