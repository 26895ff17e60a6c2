//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, merged parameters, originating URI)
//!     → routing::Router::handle (parse, resolve, run)
//!     → response.rs (JSON value or fixed user message)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeCallId, X_REQUEST_ID};
pub use server::HttpServer;
