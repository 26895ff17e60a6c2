//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Keep a handle so bootstrap can raise verbosity once `debug` is known
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the built-in default directive
//! - The debug switch only ever raises verbosity, never lowers it

use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_DIRECTIVE: &str = "eti_router=info,tower_http=info";

/// Filter installed when the configuration turns `debug` on.
pub const DEBUG_DIRECTIVE: &str = "eti_router=debug,tower_http=debug,sqlx=info";

/// Handle to the live filter.
#[derive(Clone)]
pub struct LogHandle {
    inner: reload::Handle<EnvFilter, Registry>,
}

impl LogHandle {
    /// Swap in the debug filter.
    pub fn enable_debug(&self) -> Result<(), reload::Error> {
        self.inner.modify(|filter| *filter = EnvFilter::new(DEBUG_DIRECTIVE))
    }

    /// Swap in an arbitrary directive (e.g. `observability.log_level`).
    pub fn set_directive(&self, directive: &str) -> Result<(), reload::Error> {
        let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
        self.inner.modify(|current| *current = filter)
    }
}

/// Install the global subscriber and return the reload handle.
pub fn init() -> LogHandle {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    LogHandle { inner: handle }
}

/// Directive for a bare level such as `warn`, scoped to this crate.
pub fn directive_for_level(level: &str) -> String {
    format!("eti_router={level},tower_http={level}")
}
