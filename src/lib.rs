//! Request dispatch and environment bootstrap engine.
//!
//! Boots an application from a directory layout, then serves remote calls:
//! each call carries a base64-encoded JSON payload naming an application
//! method, which the router resolves, instantiates once and runs.

// Core subsystems
pub mod calling;
pub mod config;
pub mod http;
pub mod registry;
pub mod routing;

// Environment
pub mod db;
pub mod lifecycle;

// Cross-cutting concerns
pub mod escalation;
pub mod observability;

pub use config::AppConfig;
pub use escalation::{Fault, FaultKind};
pub use http::HttpServer;
pub use lifecycle::{AppOptions, Bootstrap, Shutdown};
pub use routing::{CallOutcome, Router};
