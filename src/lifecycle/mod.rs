//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Uninitialized → PathsResolved (paths.rs) → ConfigLoaded → DebugFlagSet
//!     → TimezoneSet → DbConnected → Ready
//!
//! Shutdown (shutdown.rs):
//!     Signal received (signals.rs) → Stop accepting → Drain in-flight calls → Exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup; the first failing state halts the process
//! - Calls are only served once the router is Ready

pub mod paths;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use paths::PathSet;
pub use shutdown::Shutdown;
pub use startup::{AppOptions, BootError, BootState, Bootstrap};
