//! Error escalation subsystem.
//!
//! # Data Flow
//! ```text
//! any stage returns Err(Fault)
//!     → Escalator::fail (diagnostic record, daily log, tracing event)
//!     → Escalation::Fatal(UserNotice)  → caller ends the call / process
//!     → Escalation::Logged             → caller carries on
//! ```
//!
//! # Design Decisions
//! - Faults are values; nothing deep in the stack terminates anything
//! - The user only ever sees the fixed message keyed by the code
//! - File, line and caller detail stay in the server-side log

pub mod fault;
pub mod record;

use std::path::PathBuf;

use chrono_tz::Tz;

pub use fault::{Fault, FaultClass, FaultKind, Site};
pub use record::{DailyLog, ErrorRecord};

use crate::observability::metrics;

/// What the client is told when a fault is fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserNotice {
    pub code: Option<u16>,
    pub message: &'static str,
    pub class: FaultClass,
}

/// Outcome of escalating a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escalation {
    /// Non-fatal: recorded, control returns to the caller.
    Logged,
    /// Fatal: the notice is the only thing surfaced, then the call ends.
    Fatal(UserNotice),
}

/// Fixed user-facing message for a code.
pub fn user_message(code: Option<u16>) -> &'static str {
    match code {
        Some(1) => "Parameter Empty",
        Some(2) => "Parameter Missing",
        Some(3) => "Parameter Error",
        Some(20) => "Database Connection Error",
        Some(35) => "JSON Method Name Error",
        Some(36) => "JSON Parameter Empty",
        Some(37) => "JSON RequestID Missing",
        Some(_) => "Unknown Error",
        None => "Internal Server Error",
    }
}

/// The single escalation path shared by bootstrap and every call.
#[derive(Debug)]
pub struct Escalator {
    log: Option<DailyLog>,
}

impl Escalator {
    /// Escalator writing its diagnostics under `log_root`.
    pub fn new(log_root: impl Into<PathBuf>) -> Self {
        Self {
            log: Some(DailyLog::new(log_root)),
        }
    }

    /// Escalator used before the log root is known; diagnostics only go to tracing.
    pub fn detached() -> Self {
        Self { log: None }
    }

    pub fn log(&self) -> Option<&DailyLog> {
        self.log.as_ref()
    }

    /// Zone for daily-log timestamps; ignored when detached.
    pub fn set_zone(&self, zone: Tz) {
        if let Some(log) = &self.log {
            log.set_zone(zone);
        }
    }

    /// Record `fault` and decide what happens next.
    ///
    /// `request` is the originating URI of the inbound call, when there is one.
    pub fn fail(&self, fault: &Fault, request: Option<&str>) -> Escalation {
        let record = ErrorRecord::from_fault(fault, request);
        let diagnostic = record.diagnostic();
        let kind = fault.kind();

        if fault.is_fatal() {
            tracing::error!(code = ?record.code, kind = ?kind, request = ?request, "{}", diagnostic);
        } else {
            tracing::warn!(kind = ?kind, request = ?request, "{}", diagnostic);
        }

        if let Some(log) = &self.log {
            if let Err(e) = log.append(&record) {
                tracing::error!(root = %log.root().display(), error = %e, "Failed to write error log");
            }
        }

        metrics::record_fault(record.code);

        if !fault.is_fatal() {
            return Escalation::Logged;
        }

        Escalation::Fatal(UserNotice {
            code: record.code,
            message: user_message(record.code),
            class: kind.class(),
        })
    }
}
