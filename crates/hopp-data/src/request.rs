use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::auth::RestAuth;
use crate::body::RestReqBody;

/// Schema version written into every request
pub const REST_REQ_SCHEMA_VERSION: &str = "1";

pub const DEFAULT_ENDPOINT: &str = "https://echo.hoppscotch.io";
pub const DEFAULT_REQUEST_NAME: &str = "Untitled request";

/// A query parameter or header row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
    pub active: bool,
}

pub type RestParam = KeyValue;
pub type RestHeader = KeyValue;

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            active: true,
        }
    }

    /// Active and not completely blank
    pub fn is_effective(&self) -> bool {
        self.active && (!self.key.is_empty() || !self.value.is_empty())
    }
}

/// Count of rows that will actually be sent
pub fn count_effective(entries: &[KeyValue]) -> usize {
    entries.iter().filter(|entry| entry.is_effective()).count()
}

/// The request being edited
///
/// Collections and nested descriptors sit behind `Arc` so that a shallow copy
/// with one field replaced shares every other field with the original.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestRequest {
    pub v: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub endpoint: String,
    pub method: String,
    pub params: Arc<Vec<RestParam>>,
    pub headers: Arc<Vec<RestHeader>>,
    pub auth: Arc<RestAuth>,
    pub pre_request_script: String,
    pub test_script: String,
    pub body: Arc<RestReqBody>,
}

impl RestRequest {
    /// Fresh untitled `GET` request against `endpoint`
    pub fn untitled(endpoint: impl Into<String>) -> Self {
        Self {
            v: REST_REQ_SCHEMA_VERSION.to_string(),
            id: None,
            name: DEFAULT_REQUEST_NAME.to_string(),
            endpoint: endpoint.into(),
            method: "GET".to_string(),
            params: Arc::new(Vec::new()),
            headers: Arc::new(Vec::new()),
            auth: Arc::new(RestAuth::default()),
            pre_request_script: String::new(),
            test_script: String::new(),
            body: Arc::new(RestReqBody::None),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn active_params_count(&self) -> usize {
        count_effective(&self.params)
    }

    pub fn active_headers_count(&self) -> usize {
        count_effective(&self.headers)
    }
}

impl Default for RestRequest {
    fn default() -> Self {
        Self::untitled(DEFAULT_ENDPOINT)
    }
}
