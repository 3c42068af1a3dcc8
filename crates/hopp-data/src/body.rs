//! Request body and content types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// The fixed set of body content types a request can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentType {
    #[serde(rename = "application/json")]
    Json,
    #[serde(rename = "application/ld+json")]
    LdJson,
    #[serde(rename = "application/hal+json")]
    HalJson,
    #[serde(rename = "application/vnd.api+json")]
    VndApiJson,
    #[serde(rename = "application/xml")]
    Xml,
    #[serde(rename = "application/x-www-form-urlencoded")]
    FormUrlEncoded,
    #[serde(rename = "multipart/form-data")]
    MultipartFormData,
    #[serde(rename = "text/html")]
    Html,
    #[serde(rename = "text/plain")]
    Plain,
}

/// Shape of the body payload for a content type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Free text (JSON, XML, HTML, plain)
    RawText,
    /// `key: value` lines
    UrlEncoded,
    /// Ordered form entries
    FormData,
}

impl ContentType {
    pub const ALL: [ContentType; 9] = [
        ContentType::Json,
        ContentType::LdJson,
        ContentType::HalJson,
        ContentType::VndApiJson,
        ContentType::Xml,
        ContentType::FormUrlEncoded,
        ContentType::MultipartFormData,
        ContentType::Html,
        ContentType::Plain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Json => "application/json",
            ContentType::LdJson => "application/ld+json",
            ContentType::HalJson => "application/hal+json",
            ContentType::VndApiJson => "application/vnd.api+json",
            ContentType::Xml => "application/xml",
            ContentType::FormUrlEncoded => "application/x-www-form-urlencoded",
            ContentType::MultipartFormData => "multipart/form-data",
            ContentType::Html => "text/html",
            ContentType::Plain => "text/plain",
        }
    }

    pub fn kind(&self) -> BodyKind {
        match self {
            ContentType::MultipartFormData => BodyKind::FormData,
            ContentType::FormUrlEncoded => BodyKind::UrlEncoded,
            _ => BodyKind::RawText,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown content type: {0}")]
pub struct UnknownContentType(pub String);

impl FromStr for ContentType {
    type Err = UnknownContentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentType::ALL
            .into_iter()
            .find(|ct| ct.as_str() == s)
            .ok_or_else(|| UnknownContentType(s.to_string()))
    }
}

/// One `multipart/form-data` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDataKeyValue {
    pub key: String,
    /// Text value, or the file path when `is_file` is set
    pub value: String,
    pub active: bool,
    #[serde(default)]
    pub is_file: bool,
}

impl FormDataKeyValue {
    pub fn text(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            active: true,
            is_file: false,
        }
    }
}

/// Request body, shaped by its content type
///
/// Serialized as `{"contentType": <type or null>, "body": <payload>}` where the
/// payload is `null`, a string, or an array of form entries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "BodyRecord", into = "BodyRecord")]
pub enum RestReqBody {
    #[default]
    None,
    /// Any string-shaped content type; never `multipart/form-data`
    Text {
        content_type: ContentType,
        body: String,
    },
    FormData(Vec<FormDataKeyValue>),
}

impl RestReqBody {
    /// Body of the given type carrying `text`, or an empty form for form data
    pub fn text(content_type: ContentType, body: impl Into<String>) -> Self {
        match content_type.kind() {
            BodyKind::FormData => RestReqBody::FormData(Vec::new()),
            _ => RestReqBody::Text {
                content_type,
                body: body.into(),
            },
        }
    }

    /// Empty body of the requested type
    pub fn empty(content_type: Option<ContentType>) -> Self {
        match content_type {
            None => RestReqBody::None,
            Some(ct) => RestReqBody::text(ct, String::new()),
        }
    }

    pub fn content_type(&self) -> Option<ContentType> {
        match self {
            RestReqBody::None => None,
            RestReqBody::Text { content_type, .. } => Some(*content_type),
            RestReqBody::FormData(_) => Some(ContentType::MultipartFormData),
        }
    }

    pub fn form_entries(&self) -> Option<&[FormDataKeyValue]> {
        match self {
            RestReqBody::FormData(entries) => Some(entries),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BodyRecord {
    content_type: Option<ContentType>,
    #[serde(default)]
    body: Value,
}

impl TryFrom<BodyRecord> for RestReqBody {
    type Error = String;

    fn try_from(record: BodyRecord) -> Result<Self, Self::Error> {
        let Some(content_type) = record.content_type else {
            return Ok(RestReqBody::None);
        };
        match (content_type.kind(), record.body) {
            (BodyKind::FormData, Value::Null) => Ok(RestReqBody::FormData(Vec::new())),
            (BodyKind::FormData, body @ Value::Array(_)) => serde_json::from_value(body)
                .map(RestReqBody::FormData)
                .map_err(|e| format!("invalid form data entries: {e}")),
            (BodyKind::FormData, _) => Err("form data body must be an array".to_string()),
            (_, Value::Null) => Ok(RestReqBody::text(content_type, "")),
            (_, Value::String(body)) => Ok(RestReqBody::text(content_type, body)),
            (_, _) => Err(format!("{content_type} body must be a string")),
        }
    }
}

impl From<RestReqBody> for BodyRecord {
    fn from(body: RestReqBody) -> Self {
        match body {
            RestReqBody::None => BodyRecord {
                content_type: None,
                body: Value::Null,
            },
            RestReqBody::Text { content_type, body } => BodyRecord {
                content_type: Some(content_type),
                body: Value::String(body),
            },
            RestReqBody::FormData(entries) => BodyRecord {
                content_type: Some(ContentType::MultipartFormData),
                body: serde_json::to_value(entries).unwrap_or(Value::Array(Vec::new())),
            },
        }
    }
}
