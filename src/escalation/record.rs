//! Diagnostic records and the per-day log file they are written to.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock, PoisonError};

use chrono::{DateTime, FixedOffset, Local, Utc};
use chrono_tz::Tz;

use super::fault::{Fault, Site};

/// One escalated fault, flattened into the fields the log line needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    pub message: String,
    pub file: &'static str,
    pub line: u32,
    pub code: Option<u16>,
    pub request: Option<String>,
    pub caller: Site,
}

impl ErrorRecord {
    pub fn from_fault(fault: &Fault, request: Option<&str>) -> Self {
        let origin = fault.origin();
        Self {
            message: fault.message().to_string(),
            file: origin.file,
            line: origin.line,
            code: fault.code(),
            request: request.map(str::to_string),
            caller: fault.caller(),
        }
    }

    /// The diagnostic text, without timestamp.
    pub fn diagnostic(&self) -> String {
        let mut out = format!("ERROR: {} in {} on line {}", self.message, self.file, self.line);
        if let Some(request) = &self.request {
            out.push_str(&format!(", request: {}", request));
        }
        out.push_str(&format!(
            ", last called by {} on {} through function {}.",
            self.caller.file, self.caller.line, self.caller.function
        ));
        if let Some(code) = self.code {
            out.push_str(&format!(" Output the errorCode {}.", code));
        }
        out
    }

    /// Full log line, newline terminated.
    pub fn log_line(&self, at: &DateTime<FixedOffset>) -> String {
        format!("{} At {}\n", self.diagnostic(), at.format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Appends records to `<root>/<YYYYMMDD>.log`.
///
/// Appends are serialized so lines from concurrent calls never interleave.
/// Dates follow the configured zone once one is set, the host zone before.
#[derive(Debug)]
pub struct DailyLog {
    root: PathBuf,
    zone: OnceLock<Tz>,
    lock: Mutex<()>,
}

impl DailyLog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            zone: OnceLock::new(),
            lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Fix the zone used for timestamps. Only the first call takes effect.
    pub fn set_zone(&self, zone: Tz) -> bool {
        self.zone.set(zone).is_ok()
    }

    pub fn zone(&self) -> Option<Tz> {
        self.zone.get().copied()
    }

    /// Current time in the log's zone.
    pub fn now(&self) -> DateTime<FixedOffset> {
        match self.zone.get() {
            Some(zone) => Utc::now().with_timezone(zone).fixed_offset(),
            None => Local::now().fixed_offset(),
        }
    }

    /// Path of the file a record written at `at` lands in.
    pub fn file_for(&self, at: &DateTime<FixedOffset>) -> PathBuf {
        self.root.join(format!("{}.log", at.format("%Y%m%d")))
    }

    /// Append one record and return the file it was written to.
    pub fn append(&self, record: &ErrorRecord) -> io::Result<PathBuf> {
        let now = self.now();
        let path = self.file_for(&now);
        let line = record.log_line(&now);

        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        fs::create_dir_all(&self.root)?;
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        file.write_all(line.as_bytes())?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::escalation::fault::FaultKind;
    use chrono::TimeZone;

    fn record(code: Option<u16>, request: Option<&str>) -> ErrorRecord {
        ErrorRecord {
            message: "class file /srv/demo/lib/echo.class not found".into(),
            file: "src/registry/library.rs",
            line: 42,
            code,
            request: request.map(str::to_string),
            caller: Site {
                file: "src/routing/router.rs",
                line: 7,
                function: "Router::load_method",
            },
        }
    }

    #[test]
    fn diagnostic_line_format() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap().fixed_offset();
        let line = record(None, Some("http://host/call")).log_line(&at);
        assert_eq!(
            line,
            "ERROR: class file /srv/demo/lib/echo.class not found in src/registry/library.rs on line 42, \
             request: http://host/call, last called by src/routing/router.rs on 7 through function \
             Router::load_method. At 2024-03-09 14:05:00\n"
        );
    }

    #[test]
    fn fatal_records_mention_code() {
        let diagnostic = record(Some(35), None).diagnostic();
        assert!(diagnostic.ends_with("Router::load_method. Output the errorCode 35."));
        assert!(!diagnostic.contains("request:"));
    }

    #[test]
    fn from_fault_copies_origin() {
        let fault = Fault::new(FaultKind::RequestIdMissing, "JSON RequestID Missing");
        let record = ErrorRecord::from_fault(&fault, None);
        assert_eq!(record.code, Some(37));
        assert_eq!(record.line, fault.origin().line);
        assert_eq!(record.message, "JSON RequestID Missing");
    }

    #[test]
    fn appends_to_one_file_per_day() {
        let dir = tempfile::tempdir().unwrap();
        let log = DailyLog::new(dir.path().join("tmp/log"));

        let first = log.append(&record(None, None)).unwrap();
        let second = log.append(&record(Some(3), None)).unwrap();
        assert_eq!(first, second);

        let name = first.file_name().unwrap().to_string_lossy().to_string();
        assert_eq!(name, format!("{}.log", log.now().format("%Y%m%d")));

        let content = std::fs::read_to_string(&first).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.lines().all(|l| l.starts_with("ERROR: ")));
    }

    #[test]
    fn configured_zone_drives_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let log = DailyLog::new(dir.path());
        assert_eq!(log.zone(), None);

        assert!(log.set_zone(chrono_tz::Asia::Tokyo));
        assert!(!log.set_zone(chrono_tz::UTC));
        assert_eq!(log.zone(), Some(chrono_tz::Asia::Tokyo));
        assert_eq!(log.now().offset().local_minus_utc(), 9 * 3600);

        let late_utc = Utc.with_ymd_and_hms(2024, 3, 9, 20, 0, 0).unwrap();
        let tokyo = late_utc.with_timezone(&chrono_tz::Asia::Tokyo).fixed_offset();
        assert!(log.file_for(&tokyo).ends_with("20240310.log"));
    }
}
