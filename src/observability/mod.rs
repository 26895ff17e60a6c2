//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! bootstrap, parser, registry, escalation
//!     → logging.rs (structured tracing events, reloadable filter)
//!     → metrics.rs (counters, histograms)
//!
//! escalation additionally writes the per-day diagnostic file
//! (see crate::escalation::record).
//! ```

pub mod logging;
pub mod metrics;
