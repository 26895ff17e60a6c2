//! Response mapping.
//!
//! A completed call returns the method's JSON value. A failed call returns
//! only the fixed user message, as plain text, with a status picked from the
//! fault class.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::escalation::{FaultClass, UserNotice};
use crate::routing::CallOutcome;

pub fn status_for(class: FaultClass) -> StatusCode {
    match class {
        FaultClass::Validation => StatusCode::BAD_REQUEST,
        FaultClass::Resolution => StatusCode::NOT_FOUND,
        FaultClass::Execution => StatusCode::INTERNAL_SERVER_ERROR,
        FaultClass::Bootstrap => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for UserNotice {
    fn into_response(self) -> Response {
        (status_for(self.class), self.message).into_response()
    }
}

impl IntoResponse for CallOutcome {
    fn into_response(self) -> Response {
        match self {
            CallOutcome::Completed { value, .. } => (StatusCode::OK, Json(value)).into_response(),
            CallOutcome::Failed(notice) => notice.into_response(),
        }
    }
}
