//! Name → singleton resolution.
//!
//! # Data Flow
//! ```text
//! name ("Echo")
//!     → lower-case ("echo")
//!     → <root>/echo.class must exist      (else: class file not found)
//!     → static: stop
//!     → factory registered for "echo"     (else: class not found in file)
//!     → get-or-create the cached instance
//! ```
//!
//! # Design Decisions
//! - Two independent libraries, no fallback between them:
//!   application methods (`<app>/lib/`) and core classes (`<base>/lib/`)
//! - Factories are registered explicitly; the `.class` file gates availability
//! - Insert-once cache: concurrent first resolutions build one instance

pub mod builtin;
pub mod library;
pub mod method;

pub use library::{Factories, Factory, Library, Loaded, Namespace, APP_METHODS, CORE_CLASSES};
pub use method::{CoreObject, Method, MethodError};
