//! Inbound call decoding.
//!
//! # Data Flow
//! ```text
//! HTTP query + form body
//!     → RawParameters (merged map)
//!     → parser.rs (envelope checks, base64 → JSON, field checks)
//!     → CallingRequest (immutable, one per call)
//! ```

pub mod parser;
pub mod record;

pub use parser::{decode_calling, encode_calling, parse, RawParameters, CALLING_KEY};
pub use record::{Auth, CallingRequest};
