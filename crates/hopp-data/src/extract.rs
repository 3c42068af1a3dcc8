//! Tolerant decoding of persisted or imported data
//!
//! Every field is checked on its own. A missing or wrong-typed field falls
//! back to the default value for that field; the rest of the object is kept.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::request::{KeyValue, RestRequest};
use crate::tab::Tab;

/// Decode a request from arbitrary JSON, defaulting field by field
pub fn safely_extract_request(value: &Value, default: &RestRequest) -> RestRequest {
    let mut req = default.clone();
    let Some(obj) = value.as_object() else {
        log::warn!("Request entry is not an object, using defaults");
        return req;
    };

    if let Some(v) = string_field(obj, "v") {
        req.v = v;
    }
    if let Some(id) = string_field(obj, "id") {
        req.id = Some(id);
    }
    if let Some(name) = string_field(obj, "name") {
        req.name = name;
    }
    if let Some(method) = string_field(obj, "method") {
        req.method = method;
    }
    if let Some(endpoint) = string_field(obj, "endpoint") {
        req.endpoint = endpoint;
    }
    if let Some(script) = string_field(obj, "preRequestScript") {
        req.pre_request_script = script;
    }
    if let Some(script) = string_field(obj, "testScript") {
        req.test_script = script;
    }
    if let Some(params) = key_value_rows(obj, "params") {
        req.params = Arc::new(params);
    }
    if let Some(headers) = key_value_rows(obj, "headers") {
        req.headers = Arc::new(headers);
    }
    if let Some(auth) = typed_field(obj, "auth") {
        req.auth = Arc::new(auth);
    }
    if let Some(body) = typed_field(obj, "body") {
        req.body = Arc::new(body);
    }
    req
}

/// Decode a tab; the id is left empty when the entry carries none
pub fn safely_extract_tab(value: &Value, default: &RestRequest) -> Tab {
    let request = safely_extract_request(value, default);
    let obj = value.as_object();
    let is_active = obj
        .and_then(|o| o.get("isActive"))
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let collection_request_id = obj.and_then(|o| string_field(o, "collectionRequestID"));

    Tab {
        id: request.id.clone().unwrap_or_default(),
        request: Arc::new(request),
        is_active,
        collection_request_id,
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn typed_field<T: DeserializeOwned>(obj: &Map<String, Value>, key: &str) -> Option<T> {
    let value = obj.get(key).filter(|v| v.is_object())?;
    match serde_json::from_value(value.clone()) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            log::warn!("Ignoring malformed `{}`: {}", key, e);
            None
        }
    }
}

/// Rows that are not objects are dropped; row fields default individually
fn key_value_rows(obj: &Map<String, Value>, key: &str) -> Option<Vec<KeyValue>> {
    let rows = obj.get(key)?.as_array()?;
    Some(
        rows.iter()
            .filter_map(Value::as_object)
            .map(|row| KeyValue {
                key: string_field(row, "key").unwrap_or_default(),
                value: string_field(row, "value").unwrap_or_default(),
                active: row.get("active").and_then(Value::as_bool).unwrap_or(true),
            })
            .collect(),
    )
}
