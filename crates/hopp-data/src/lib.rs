//! Data model for the hopp session stores
//!
//! This crate provides:
//! - The REST request being edited (`RestRequest`) and its parts
//! - Response variants and test reports stored next to it
//! - Save contexts and request tabs
//! - Body transition rules between content types
//! - Tolerant decoding of persisted data

pub mod auth;
pub mod body;
pub mod extract;
pub mod raw_kv;
pub mod request;
pub mod response;
pub mod save_context;
pub mod tab;
pub mod test_result;
pub mod transition;

pub use auth::{ApiKeyLocation, AuthKind, RestAuth};
pub use body::{BodyKind, ContentType, FormDataKeyValue, RestReqBody, UnknownContentType};
pub use extract::{safely_extract_request, safely_extract_tab};
pub use request::{
    count_effective, KeyValue, RestHeader, RestParam, RestRequest, DEFAULT_ENDPOINT,
    DEFAULT_REQUEST_NAME, REST_REQ_SCHEMA_VERSION,
};
pub use response::{ResponseHeader, ResponseMeta, RestResponse};
pub use save_context::SaveContext;
pub use tab::{next_free_tab_id, Tab};
pub use test_result::{ExpectResult, ExpectStatus, TestReport};
pub use transition::apply_body_transition;
