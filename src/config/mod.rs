//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config/config (TOML, mandatory unless config/my exists)
//! config/my     (TOML, optional local override)
//!     → loader.rs (parse, merge each source once)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → shared via Arc with every call
//! ```
//!
//! # Design Decisions
//! - Config is read-only once bootstrap finishes
//! - All fields have defaults to allow minimal sources
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::ConfigLoader;
pub use schema::AppConfig;
pub use schema::DbConfig;
pub use schema::ListenerConfig;
