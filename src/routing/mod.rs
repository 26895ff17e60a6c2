//! Call dispatch.
//!
//! # Data Flow
//! ```text
//! RawParameters
//!     → calling::parse (validated CallingRequest)
//!     → Router::load_method (application library singleton)
//!     → Method::call
//!     → CallOutcome (value, or the user notice of a fatal fault)
//! ```
//!
//! # Design Decisions
//! - One Router per process, built by lifecycle::startup
//! - The per-call cycle never re-enters bootstrap states
//! - Deterministic: same payload always resolves the same method

pub mod router;

pub use router::{CallOutcome, Router};
