use serde::{Deserialize, Serialize};

/// Where the request in the editor came from, so a save can be routed back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "originLocation",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum SaveContext {
    /// Entry in the local user collections
    UserCollection {
        /// Slash separated folder indices, e.g. `0/2`
        folder_path: String,
        request_index: usize,
    },
    /// Entry in a shared team collection
    TeamCollection {
        request_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        team_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        collection_id: Option<String>,
    },
}

impl SaveContext {
    pub fn is_team(&self) -> bool {
        matches!(self, SaveContext::TeamCollection { .. })
    }
}
