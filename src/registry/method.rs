//! Contracts for the types the libraries hand out.

use std::any::Any;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::calling::CallingRequest;
use crate::routing::Router;

/// A business handler resolved from the application library.
///
/// One instance serves every call for its name, concurrently.
#[async_trait]
pub trait Method: Send + Sync {
    async fn call(&self, router: &Router, calling: &CallingRequest) -> Result<Value, MethodError>;
}

/// A framework object resolved from the core library. Callers downcast.
pub type CoreObject = dyn Any + Send + Sync;

/// Errors a handler may return.
#[derive(Debug, Error)]
pub enum MethodError {
    #[error("invalid argument `{field}`: {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Failed(String),
}
