//! Configuration validation.
//!
//! Serde handles the syntax; this checks the values the bootstrap relies on.
//! All problems are reported together, not just the first.

use std::fmt;

use chrono_tz::Tz;

use crate::config::schema::AppConfig;

/// One semantic problem in the merged configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

fn is_identifier(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut reject = |field: &'static str, reason: &str| {
        errors.push(ValidationError {
            field,
            reason: reason.to_string(),
        })
    };

    if config.db.host.trim().is_empty() {
        reject("db.host", "must not be empty");
    }
    if config.db.port == 0 {
        reject("db.port", "must be non-zero");
    }
    if config.db.name.trim().is_empty() {
        reject("db.name", "must not be empty");
    }
    // Interpolated into SET NAMES.
    if !is_identifier(&config.db.encoding) {
        reject("db.encoding", "must be a plain character set name");
    }
    if let Some(tz) = &config.timezone {
        if tz.trim().is_empty() {
            reject("timezone", "must not be empty when set");
        } else if tz.parse::<Tz>().is_err() {
            reject("timezone", "must be an IANA time zone name");
        }
    }
    if config.timeouts.request_secs == 0 {
        reject("timeouts.request_secs", "must be greater than zero");
    }
    if config.listener.max_connections == 0 {
        reject("listener.max_connections", "must be greater than zero");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
