//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from the merged TOML
//! sources. Every field has a default so partial sources deserialize.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Root configuration for the dispatcher.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Raise log verbosity for the whole process.
    pub debug: bool,

    /// IANA zone name for diagnostic timestamps (e.g. "Asia/Shanghai").
    pub timezone: Option<String>,

    /// Public URL prefix of the service.
    #[serde(rename = "webRoot")]
    pub web_root: String,

    /// Database connection settings.
    pub db: DbConfig,

    /// Listener configuration (bind address, connection limit).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Request hardening.
    pub security: SecurityConfig,
}

impl AppConfig {
    /// The configured zone, if it names a known one.
    pub fn time_zone(&self) -> Option<Tz> {
        self.timezone.as_deref().and_then(|tz| tz.parse().ok())
    }
}

/// Database connection settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    /// Database (schema) name.
    pub name: String,
    pub user: String,
    pub passwd: String,
    /// Keep pooled connections open for the life of the process.
    pub persistent: bool,
    /// Character set used for `SET NAMES`.
    pub encoding: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3306,
            name: String::new(),
            user: "root".to_string(),
            passwd: String::new(),
            persistent: false,
            encoding: "utf8".to_string(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum concurrent in-flight calls.
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: 10_000,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total time allowed for parsing, resolving and running one call.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_source_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            debug = true
            webRoot = "/eti/"

            [db]
            name = "eti"
            "#,
        )
        .unwrap();

        assert!(config.debug);
        assert_eq!(config.web_root, "/eti/");
        assert_eq!(config.db.name, "eti");
        assert_eq!(config.db.port, 3306);
        assert_eq!(config.db.encoding, "utf8");
        assert_eq!(config.timezone, None);
        assert_eq!(config.timeouts.request_secs, 30);
    }

    #[test]
    fn time_zone_parses_the_name() {
        let mut config = AppConfig::default();
        assert_eq!(config.time_zone(), None);

        config.timezone = Some("Asia/Tokyo".into());
        assert_eq!(config.time_zone(), Some(chrono_tz::Asia::Tokyo));
    }
}
