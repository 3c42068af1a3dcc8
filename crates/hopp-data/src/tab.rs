//! Request tabs
//!
//! A tab is addressed by a single identifier which is also written into the
//! request it holds, so `tab.id == tab.request.id` always.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::request::RestRequest;

const TAB_ID_PREFIX: &str = "tab-";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TabRecord", into = "TabRecord")]
pub struct Tab {
    pub id: String,
    pub request: Arc<RestRequest>,
    pub is_active: bool,
    /// Collection entry the tab was opened from
    pub collection_request_id: Option<String>,
}

impl Tab {
    /// Inactive tab holding `request`, which is stamped with `id`
    pub fn new(id: impl Into<String>, request: RestRequest) -> Self {
        let id = id.into();
        Self {
            request: Arc::new(request.with_id(id.clone())),
            id,
            is_active: false,
            collection_request_id: None,
        }
    }

    pub fn with_collection_request_id(mut self, collection_request_id: impl Into<String>) -> Self {
        self.collection_request_id = Some(collection_request_id.into());
        self
    }

    /// Same tab slot with a replaced request
    pub fn with_request(&self, request: Arc<RestRequest>) -> Self {
        let request = if request.id.as_deref() == Some(self.id.as_str()) {
            request
        } else {
            Arc::new(RestRequest::clone(&request).with_id(self.id.clone()))
        };
        Self {
            id: self.id.clone(),
            request,
            is_active: self.is_active,
            collection_request_id: self.collection_request_id.clone(),
        }
    }

    pub fn with_active(&self, is_active: bool) -> Self {
        Self {
            is_active,
            ..self.clone()
        }
    }
}

/// First identifier of the form `tab-N` not used by any of `tabs`
///
/// Scans upward from `tab-0`, so identifiers freed by removal are reused.
pub fn next_free_tab_id(tabs: &[Tab]) -> String {
    (0..)
        .map(|i| format!("{TAB_ID_PREFIX}{i}"))
        .find(|candidate| tabs.iter().all(|tab| &tab.id != candidate))
        .unwrap_or_else(|| format!("{TAB_ID_PREFIX}{}", tabs.len()))
}

/// Wire form: the request fields flattened next to the tab flags
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TabRecord {
    #[serde(flatten)]
    request: RestRequest,
    #[serde(default)]
    is_active: bool,
    #[serde(
        rename = "collectionRequestID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    collection_request_id: Option<String>,
}

impl From<TabRecord> for Tab {
    fn from(record: TabRecord) -> Self {
        Self {
            id: record.request.id.clone().unwrap_or_default(),
            request: Arc::new(record.request),
            is_active: record.is_active,
            collection_request_id: record.collection_request_id,
        }
    }
}

impl From<Tab> for TabRecord {
    fn from(tab: Tab) -> Self {
        let request = Arc::unwrap_or_clone(tab.request).with_id(tab.id);
        Self {
            request,
            is_active: tab.is_active,
            collection_request_id: tab.collection_request_id,
        }
    }
}
