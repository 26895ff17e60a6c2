//! Database connection bootstrap.
//!
//! One pool per process, opened during bootstrap from `config.db` and shared
//! by every call. Each physical connection clears the SQL mode and sets the
//! character set before use. Failure to connect ends the bootstrap; there is
//! no retry.

pub mod connector;

pub use connector::{Connector, LazyConnector, MySqlConnector};
