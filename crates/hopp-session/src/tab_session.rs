//! Tab session store
//!
//! An ordered list of request tabs with at most one active tab. Tabs are
//! addressed by id only; positions shift on removal and are never used as
//! addresses.

use std::sync::Arc;

use hopp_data::{next_free_tab_id, RestRequest, Tab};
use hopp_store::{
    DispatchResult, Dispatchers, DispatchingStore, Observable, Reducer, StoreAction, StoreError,
    StoreState,
};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TabSession {
    pub tabs: Arc<Vec<Tab>>,
}

impl TabSession {
    /// The tab flagged active, if any
    pub fn active_tab(&self) -> Option<&Tab> {
        self.tabs.iter().find(|tab| tab.is_active)
    }

    /// Position of the active tab
    pub fn active_index(&self) -> Option<usize> {
        self.tabs.iter().position(|tab| tab.is_active)
    }

    /// Tab with identifier `id`
    pub fn tab(&self, id: &str) -> Option<&Tab> {
        self.tabs.iter().find(|tab| tab.id == id)
    }
}

#[derive(Debug, Default)]
pub struct TabSessionPatch {
    pub tabs: Option<Arc<Vec<Tab>>>,
}

impl TabSessionPatch {
    fn tabs(tabs: Vec<Tab>) -> Self {
        Self {
            tabs: Some(Arc::new(tabs)),
        }
    }
}

impl StoreState for TabSession {
    type Patch = TabSessionPatch;

    fn merge(&self, patch: TabSessionPatch) -> Self {
        Self {
            tabs: patch.tabs.unwrap_or_else(|| Arc::clone(&self.tabs)),
        }
    }
}

#[derive(Debug, Clone, Deserialize, strum::IntoStaticStr)]
#[serde(
    tag = "dispatcher",
    content = "payload",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
#[strum(serialize_all = "camelCase")]
pub enum TabSessionAction {
    /// Replace every tab; extra active flags beyond the first are cleared
    SetTabs { tabs: Vec<Tab> },
    /// Append a tab; it is always inserted inactive
    AddTab { tab: Tab },
    RemoveTab { id: String },
    UpdateTab { id: String, new_request: Arc<RestRequest> },
    SetActiveTab { id: String },
}

impl StoreAction for TabSessionAction {
    fn dispatcher(&self) -> &'static str {
        self.into()
    }
}

type R = Reducer<TabSession, TabSessionAction>;

/// Registry of all tab session dispatchers
pub fn tab_session_dispatchers() -> DispatchResult<Dispatchers<TabSession, TabSessionAction>> {
    Dispatchers::from_table([
        ("setTabs", set_tabs as R),
        ("addTab", add_tab as R),
        ("removeTab", remove_tab as R),
        ("updateTab", update_tab as R),
        ("setActiveTab", set_active_tab as R),
    ])
}

fn set_tabs(_: &TabSession, action: TabSessionAction) -> DispatchResult<TabSessionPatch> {
    let TabSessionAction::SetTabs { tabs } = action else {
        return Err(StoreError::PayloadMismatch("setTabs"));
    };

    let mut seen_active = false;
    let mut normalized: Vec<Tab> = Vec::with_capacity(tabs.len());
    for tab in tabs {
        if tab.id.is_empty() {
            return Err(StoreError::rejected("setTabs", "tab without an id"));
        }
        if normalized.iter().any(|t| t.id == tab.id) {
            return Err(StoreError::rejected(
                "setTabs",
                format!("duplicate tab id {}", tab.id),
            ));
        }
        let tab = if tab.is_active && seen_active {
            log::warn!("setTabs: clearing extra active flag on {}", tab.id);
            tab.with_active(false)
        } else {
            seen_active |= tab.is_active;
            tab
        };
        normalized.push(tab);
    }
    Ok(TabSessionPatch::tabs(normalized))
}

fn add_tab(curr: &TabSession, action: TabSessionAction) -> DispatchResult<TabSessionPatch> {
    let TabSessionAction::AddTab { tab } = action else {
        return Err(StoreError::PayloadMismatch("addTab"));
    };
    if tab.id.is_empty() {
        return Err(StoreError::rejected("addTab", "tab without an id"));
    }
    if curr.tab(&tab.id).is_some() {
        return Err(StoreError::rejected(
            "addTab",
            format!("tab {} already exists", tab.id),
        ));
    }

    let mut tabs = curr.tabs.to_vec();
    tabs.push(tab.with_active(false));
    Ok(TabSessionPatch::tabs(tabs))
}

/// Removing the active tab hands the active flag to the last remaining tab
fn remove_tab(curr: &TabSession, action: TabSessionAction) -> DispatchResult<TabSessionPatch> {
    let TabSessionAction::RemoveTab { id } = action else {
        return Err(StoreError::PayloadMismatch("removeTab"));
    };
    let Some(removed) = curr.tab(&id) else {
        log::warn!("removeTab: no tab with id {}, ignoring", id);
        return Ok(TabSessionPatch::default());
    };

    let mut tabs: Vec<Tab> = curr.tabs.iter().filter(|t| t.id != id).cloned().collect();
    if removed.is_active {
        if let Some(last) = tabs.last_mut() {
            *last = last.with_active(true);
        }
    }
    Ok(TabSessionPatch::tabs(tabs))
}

fn update_tab(curr: &TabSession, action: TabSessionAction) -> DispatchResult<TabSessionPatch> {
    let TabSessionAction::UpdateTab { id, new_request } = action else {
        return Err(StoreError::PayloadMismatch("updateTab"));
    };
    let Some(index) = curr.tabs.iter().position(|t| t.id == id) else {
        return Err(StoreError::rejected("updateTab", format!("no tab with id {id}")));
    };

    let mut tabs = curr.tabs.to_vec();
    tabs[index] = tabs[index].with_request(new_request);
    Ok(TabSessionPatch::tabs(tabs))
}

fn set_active_tab(curr: &TabSession, action: TabSessionAction) -> DispatchResult<TabSessionPatch> {
    let TabSessionAction::SetActiveTab { id } = action else {
        return Err(StoreError::PayloadMismatch("setActiveTab"));
    };
    if curr.tab(&id).is_none() {
        return Err(StoreError::rejected(
            "setActiveTab",
            format!("no tab with id {id}"),
        ));
    }

    let tabs = curr
        .tabs
        .iter()
        .map(|t| {
            let active = t.id == id;
            if t.is_active == active {
                t.clone()
            } else {
                t.with_active(active)
            }
        })
        .collect();
    Ok(TabSessionPatch::tabs(tabs))
}

/// The tab session store with its read accessors and streams
#[derive(Debug)]
pub struct TabSessionStore {
    store: DispatchingStore<TabSession, TabSessionAction>,
}

impl TabSessionStore {
    /// Empty tab session
    pub fn new() -> DispatchResult<Self> {
        Ok(Self {
            store: DispatchingStore::new(TabSession::default(), tab_session_dispatchers()?),
        })
    }

    /// Run a tab action through its reducer
    pub fn dispatch(&mut self, action: TabSessionAction) -> DispatchResult<Arc<TabSession>> {
        self.store.dispatch(action)
    }

    /// Dispatch by name, decoding `payload` into the matching action
    pub fn dispatch_named(
        &mut self,
        name: &str,
        payload: Value,
    ) -> DispatchResult<Arc<TabSession>> {
        self.store.dispatch_named(name, payload)
    }

    /// Decode a named call without dispatching it
    pub fn decode_named(&self, name: &str, payload: Value) -> DispatchResult<TabSessionAction> {
        self.store.decode_named(name, payload)
    }

    /// Current tab session
    pub fn value(&self) -> Arc<TabSession> {
        self.store.value()
    }

    /// Every open tab, in order
    pub fn tabs(&self) -> Arc<Vec<Tab>> {
        Arc::clone(&self.value().tabs)
    }

    /// Replace every tab
    pub fn set_tabs(&mut self, tabs: Vec<Tab>) -> DispatchResult<()> {
        self.dispatch(TabSessionAction::SetTabs { tabs })?;
        Ok(())
    }

    /// Wrap `request` in a new inactive tab and return its id
    ///
    /// The request's own id is kept when it is free, otherwise the next free
    /// `tab-N` is allocated.
    pub fn add_tab(
        &mut self,
        request: RestRequest,
        collection_request_id: Option<String>,
    ) -> DispatchResult<String> {
        let state = self.value();
        let id = match request.id.as_deref() {
            Some(id) if !id.is_empty() && state.tab(id).is_none() => id.to_string(),
            _ => next_free_tab_id(&state.tabs),
        };

        let mut tab = Tab::new(id.clone(), request);
        tab.collection_request_id = collection_request_id;
        self.dispatch(TabSessionAction::AddTab { tab })?;
        Ok(id)
    }

    /// Close tab `id`; unknown ids are ignored
    pub fn remove_tab(&mut self, id: &str) -> DispatchResult<()> {
        self.dispatch(TabSessionAction::RemoveTab { id: id.to_string() })?;
        Ok(())
    }

    /// Replace the request held by tab `id`
    pub fn update_tab(&mut self, id: &str, new_request: Arc<RestRequest>) -> DispatchResult<()> {
        self.dispatch(TabSessionAction::UpdateTab {
            id: id.to_string(),
            new_request,
        })?;
        Ok(())
    }

    /// Make tab `id` the only active tab
    pub fn set_active_tab(&mut self, id: &str) -> DispatchResult<()> {
        self.dispatch(TabSessionAction::SetActiveTab { id: id.to_string() })?;
        Ok(())
    }

    /// Identifier the next new tab would get
    pub fn next_tab_id(&self) -> String {
        next_free_tab_id(&self.value().tabs)
    }

    /// Clone of the active tab
    pub fn active_tab(&self) -> Option<Tab> {
        self.value().active_tab().cloned()
    }

    /// Request held by the active tab
    pub fn active_tab_request(&self) -> Option<Arc<RestRequest>> {
        self.value().active_tab().map(|tab| Arc::clone(&tab.request))
    }

    /// Position of the active tab, `None` when no tab is active
    pub fn active_tab_index(&self) -> Option<usize> {
        self.value().active_index()
    }

    /// Request held by tab `id`
    pub fn tab_request(&self, id: &str) -> Option<Arc<RestRequest>> {
        self.value().tab(id).map(|tab| Arc::clone(&tab.request))
    }

    /// Number of open tabs
    pub fn tab_size(&self) -> usize {
        self.value().tabs.len()
    }

    /// Tab opened from the given collection entry
    pub fn tab_by_collection_request_id(&self, collection_request_id: &str) -> Option<Tab> {
        self.value()
            .tabs
            .iter()
            .find(|tab| tab.collection_request_id.as_deref() == Some(collection_request_id))
            .cloned()
    }

    /// Emits the tab list whenever it changes
    pub fn tabs_stream(&self) -> Observable<Arc<Vec<Tab>>> {
        self.store.select(|s| Arc::clone(&s.tabs))
    }

    /// Emits the active tab id whenever it changes
    pub fn active_tab_id_stream(&self) -> Observable<Option<String>> {
        self.store
            .select(|s| s.active_tab().map(|tab| tab.id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn store() -> TabSessionStore {
        TabSessionStore::new().unwrap()
    }

    fn ids(store: &TabSessionStore) -> Vec<String> {
        store.tabs().iter().map(|t| t.id.clone()).collect()
    }

    fn active_count(store: &TabSessionStore) -> usize {
        store.tabs().iter().filter(|t| t.is_active).count()
    }

    #[test]
    fn test_ids_fill_first_free_slot() {
        let mut store = store();
        for _ in 0..3 {
            store.add_tab(RestRequest::default(), None).unwrap();
        }
        assert_eq!(ids(&store), vec!["tab-0", "tab-1", "tab-2"]);

        store.remove_tab("tab-1").unwrap();
        let id = store.add_tab(RestRequest::default(), None).unwrap();

        assert_eq!(id, "tab-1");
        assert_eq!(ids(&store), vec!["tab-0", "tab-2", "tab-1"]);
    }

    #[test]
    fn test_request_id_is_kept_when_free() {
        let mut store = store();
        let id = store
            .add_tab(RestRequest::default().with_id("imported"), None)
            .unwrap();
        assert_eq!(id, "imported");

        let id = store
            .add_tab(RestRequest::default().with_id("imported"), None)
            .unwrap();
        assert_eq!(id, "tab-0");
        assert_eq!(
            store.tab_request("tab-0").unwrap().id.as_deref(),
            Some("tab-0")
        );
    }

    #[test]
    fn test_active_tab_is_exclusive() {
        let mut store = store();
        for _ in 0..3 {
            store.add_tab(RestRequest::default(), None).unwrap();
        }
        for id in ["tab-2", "tab-0", "tab-1", "tab-1"] {
            store.set_active_tab(id).unwrap();
            assert_eq!(active_count(&store), 1);
            assert_eq!(store.active_tab().map(|t| t.id), Some(id.to_string()));
        }

        store.add_tab(RestRequest::default(), None).unwrap();
        assert_eq!(active_count(&store), 1);
        assert_eq!(store.active_tab_index(), Some(1));
    }

    #[test]
    fn test_add_tab_forces_inactive() {
        let mut store = store();
        let tab = Tab::new("tab-0", RestRequest::default()).with_active(true);
        store.dispatch(TabSessionAction::AddTab { tab }).unwrap();
        assert_eq!(active_count(&store), 0);
        assert_eq!(store.active_tab_index(), None);
    }

    #[test]
    fn test_add_tab_rejects_duplicates() {
        let mut store = store();
        let tab = Tab::new("tab-0", RestRequest::default());
        store
            .dispatch(TabSessionAction::AddTab { tab: tab.clone() })
            .unwrap();
        assert!(matches!(
            store.dispatch(TabSessionAction::AddTab { tab }),
            Err(StoreError::Rejected { .. })
        ));
        assert_eq!(store.tab_size(), 1);
    }

    #[test]
    fn test_unknown_active_tab_is_rejected() {
        let mut store = store();
        store.add_tab(RestRequest::default(), None).unwrap();
        store.set_active_tab("tab-0").unwrap();
        let before = store.value();

        assert!(matches!(
            store.set_active_tab("tab-9"),
            Err(StoreError::Rejected { .. })
        ));
        assert!(Arc::ptr_eq(&before, &store.value()));
        assert_eq!(store.active_tab_index(), Some(0));
    }

    #[test]
    fn test_removing_active_tab_activates_last() {
        let mut store = store();
        for _ in 0..3 {
            store.add_tab(RestRequest::default(), None).unwrap();
        }
        store.set_active_tab("tab-1").unwrap();

        store.remove_tab("tab-1").unwrap();
        assert_eq!(store.active_tab().map(|t| t.id), Some("tab-2".to_string()));

        store.remove_tab("tab-0").unwrap();
        assert_eq!(store.active_tab().map(|t| t.id), Some("tab-2".to_string()));

        store.remove_tab("tab-2").unwrap();
        assert_eq!(store.tab_size(), 0);
        assert!(store.active_tab().is_none());
    }

    #[test]
    fn test_remove_unknown_tab_is_noop() {
        let mut store = store();
        store.add_tab(RestRequest::default(), None).unwrap();
        let before = store.tabs();
        store.remove_tab("missing").unwrap();
        assert!(Arc::ptr_eq(&before, &store.tabs()));
    }

    #[test]
    fn test_update_tab_by_id_keeps_position() {
        let mut store = store();
        for _ in 0..3 {
            store.add_tab(RestRequest::default(), None).unwrap();
        }
        let mut next = RestRequest::default();
        next.endpoint = "https://updated".into();

        store.update_tab("tab-1", Arc::new(next)).unwrap();

        assert_eq!(ids(&store), vec!["tab-0", "tab-1", "tab-2"]);
        let request = store.tab_request("tab-1").unwrap();
        assert_eq!(request.endpoint, "https://updated");
        assert_eq!(request.id.as_deref(), Some("tab-1"));
        assert!(matches!(
            store.update_tab("tab-7", request),
            Err(StoreError::Rejected { .. })
        ));
    }

    #[test]
    fn test_set_tabs_normalizes_active_flags() {
        let mut store = store();
        let tabs = vec![
            Tab::new("a", RestRequest::default()),
            Tab::new("b", RestRequest::default()).with_active(true),
            Tab::new("c", RestRequest::default()).with_active(true),
        ];
        store.set_tabs(tabs).unwrap();
        assert_eq!(active_count(&store), 1);
        assert_eq!(store.active_tab().map(|t| t.id), Some("b".to_string()));

        let dupes = vec![
            Tab::new("a", RestRequest::default()),
            Tab::new("a", RestRequest::default()),
        ];
        assert!(store.set_tabs(dupes).is_err());
    }

    #[test]
    fn test_collection_lookup() {
        let mut store = store();
        store.add_tab(RestRequest::default(), None).unwrap();
        store
            .add_tab(RestRequest::default(), Some("coll-1".into()))
            .unwrap();
        assert_eq!(
            store.tab_by_collection_request_id("coll-1").map(|t| t.id),
            Some("tab-1".to_string())
        );
        assert!(store.tab_by_collection_request_id("coll-2").is_none());
    }

    #[test]
    fn test_active_tab_id_stream() {
        let mut store = store();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = store
            .active_tab_id_stream()
            .subscribe(move |id: &Option<String>| sink.lock().unwrap().push(id.clone()));

        store.add_tab(RestRequest::default(), None).unwrap();
        store.add_tab(RestRequest::default(), None).unwrap();
        store.set_active_tab("tab-1").unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![None, Some("tab-1".to_string())]);
    }

    #[test]
    fn test_dispatch_named() {
        let mut store = store();
        let tab = serde_json::to_value(Tab::new("tab-0", RestRequest::default())).unwrap();
        store.dispatch_named("addTab", json!({ "tab": tab })).unwrap();
        store
            .dispatch_named("setActiveTab", json!({ "id": "tab-0" }))
            .unwrap();
        assert_eq!(store.active_tab_index(), Some(0));
    }
}
