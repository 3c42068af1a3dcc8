use serde::{Deserialize, Serialize};

/// Authorization attached to a request
///
/// Serialized flat: `{"authType": "bearer", "authActive": true, "token": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestAuth {
    pub auth_active: bool,
    #[serde(flatten)]
    pub kind: AuthKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "authType",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum AuthKind {
    None,
    Basic {
        username: String,
        password: String,
    },
    Bearer {
        token: String,
    },
    #[serde(rename = "oauth-2")]
    OAuth2 {
        token: String,
        oidc_discovery_url: String,
        auth_url: String,
        access_token_url: String,
        client_id: String,
        scope: String,
    },
    ApiKey {
        key: String,
        value: String,
        add_to: ApiKeyLocation,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiKeyLocation {
    Headers,
    #[serde(rename = "Query params")]
    QueryParams,
}

impl Default for RestAuth {
    fn default() -> Self {
        Self {
            auth_active: true,
            kind: AuthKind::None,
        }
    }
}

impl RestAuth {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            auth_active: true,
            kind: AuthKind::Bearer {
                token: token.into(),
            },
        }
    }

    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            auth_active: true,
            kind: AuthKind::Basic {
                username: username.into(),
                password: password.into(),
            },
        }
    }

    /// The `authType` tag as written on the wire
    pub fn auth_type(&self) -> &'static str {
        match self.kind {
            AuthKind::None => "none",
            AuthKind::Basic { .. } => "basic",
            AuthKind::Bearer { .. } => "bearer",
            AuthKind::OAuth2 { .. } => "oauth-2",
            AuthKind::ApiKey { .. } => "api-key",
        }
    }
}
