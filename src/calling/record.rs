//! The decoded calling record.

use serde_json::{Map, Value};

/// How the caller authenticated. Exactly one form is ever present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    Token(String),
    Operator { product_id: String, operator_id: String },
}

/// A validated inbound call. Immutable once parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct CallingRequest {
    method_name: String,
    request_id: String,
    auth: Auth,
    fields: Map<String, Value>,
}

impl CallingRequest {
    pub(crate) fn new(method_name: String, request_id: String, auth: Auth, fields: Map<String, Value>) -> Self {
        Self {
            method_name,
            request_id,
            auth,
            fields,
        }
    }

    /// Requested handler name, as sent (not normalized).
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// The whole decoded object, including keys the dispatcher does not read.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// A single decoded field, `None` when absent or null.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|v| !v.is_null())
    }
}
