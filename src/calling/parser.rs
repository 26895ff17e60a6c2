//! Validation and decoding of the `calling` parameter.
//!
//! Checks run in a fixed order and the first failure wins:
//! no parameters → no `calling` → empty `calling` → undecodable / no
//! `methodName` → auth form not exactly one of token or product+operator →
//! no `requestID`.

use std::collections::HashMap;
use std::panic::Location;

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use serde_json::{Map, Value};

use crate::calling::record::{Auth, CallingRequest};
use crate::escalation::{Fault, FaultKind, Site};

/// Merged request parameters of one inbound call.
pub type RawParameters = HashMap<String, String>;

pub const CALLING_KEY: &str = "calling";

const METHOD_NAME: &str = "methodName";
const REQUEST_ID: &str = "requestID";
const TOKEN: &str = "token";
const PRODUCT_ID: &str = "productID";
const OPERATOR_ID: &str = "operatorID";

fn is_empty_calling(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || trimmed == "0"
}

/// Undo the transport encoding: base64 (any common alphabet, padded or not)
/// of a JSON object.
pub fn decode_calling(raw: &str) -> Option<Map<String, Value>> {
    let raw = raw.trim();
    let bytes = [STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD]
        .iter()
        .find_map(|engine| engine.decode(raw).ok())?;
    match serde_json::from_slice(&bytes).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Encode a calling object the way clients are expected to send it.
pub fn encode_calling(calling: &Map<String, Value>) -> String {
    STANDARD.encode(Value::Object(calling.clone()).to_string())
}

fn present<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|v| !v.is_null())
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Fault located at the failing check, not here.
#[track_caller]
fn reject(kind: FaultKind, message: &str, caller: Site) -> Fault {
    Fault::new(kind, message).called_by(caller)
}

/// Validate and decode one inbound call.
#[track_caller]
pub fn parse(params: &RawParameters) -> Result<CallingRequest, Fault> {
    let caller = Site::from_location(Location::caller(), "calling::parse");

    if params.is_empty() {
        return Err(reject(FaultKind::ParameterMissing, "Parameter Missing", caller));
    }
    let Some(raw) = params.get(CALLING_KEY) else {
        return Err(reject(FaultKind::ParameterError, "Parameter Error", caller));
    };
    if is_empty_calling(raw) {
        return Err(reject(FaultKind::ParameterEmpty, "Parameter Empty", caller));
    }

    let fields = decode_calling(raw).unwrap_or_default();

    let Some(Value::String(method_name)) = present(&fields, METHOD_NAME) else {
        return Err(reject(FaultKind::MethodNameMissing, "JSON Method Name Error", caller));
    };

    let token = present(&fields, TOKEN);
    let operator = present(&fields, PRODUCT_ID).zip(present(&fields, OPERATOR_ID));
    let auth = match (token, operator) {
        (Some(token), None) => Auth::Token(text(token)),
        (None, Some((product, operator))) => Auth::Operator {
            product_id: text(product),
            operator_id: text(operator),
        },
        _ => return Err(reject(FaultKind::AuthParameterEmpty, "JSON Parameter Empty", caller)),
    };

    let Some(request_id) = present(&fields, REQUEST_ID) else {
        return Err(reject(FaultKind::RequestIdMissing, "JSON RequestID Missing", caller));
    };

    let method_name = method_name.clone();
    let request_id = text(request_id);
    Ok(CallingRequest::new(method_name, request_id, auth, fields))
}
