use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::request::RestRequest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseHeader {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    /// Body size in bytes
    pub response_size: u64,
    /// Round trip in milliseconds
    pub response_duration: u64,
}

/// Outcome of running a request
///
/// Failures are variants, not errors: the session stores whichever variant it
/// is handed and leaves rendering to the consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum RestResponse {
    Loading {
        req: Arc<RestRequest>,
    },
    Success {
        headers: Vec<ResponseHeader>,
        body: Vec<u8>,
        status_code: u16,
        meta: ResponseMeta,
        req: Arc<RestRequest>,
    },
    /// The server answered with a non-success status
    Fail {
        headers: Vec<ResponseHeader>,
        body: Vec<u8>,
        status_code: u16,
        meta: ResponseMeta,
        req: Arc<RestRequest>,
    },
    NetworkFail {
        error: String,
        req: Arc<RestRequest>,
    },
    ScriptFail {
        error: String,
    },
}

impl RestResponse {
    /// A response the server actually finished sending
    pub fn is_completed(&self) -> bool {
        !matches!(
            self,
            RestResponse::Loading { .. }
                | RestResponse::NetworkFail { .. }
                | RestResponse::ScriptFail { .. }
        )
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            RestResponse::Success { status_code, .. } | RestResponse::Fail { status_code, .. } => {
                Some(*status_code)
            }
            _ => None,
        }
    }

    pub fn body(&self) -> Option<&[u8]> {
        match self {
            RestResponse::Success { body, .. } | RestResponse::Fail { body, .. } => {
                Some(body.as_slice())
            }
            _ => None,
        }
    }

    /// Request the response belongs to, when recorded
    pub fn request(&self) -> Option<&Arc<RestRequest>> {
        match self {
            RestResponse::Loading { req }
            | RestResponse::Success { req, .. }
            | RestResponse::Fail { req, .. }
            | RestResponse::NetworkFail { req, .. } => Some(req),
            RestResponse::ScriptFail { .. } => None,
        }
    }
}
