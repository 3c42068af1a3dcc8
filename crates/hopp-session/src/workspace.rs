//! Workspace - application root owning both session stores
//!
//! The REST session holds the request on screen, the tab session holds every
//! open request. All writes go through the workspace so the two never
//! diverge: whenever a dispatch replaces the session request, the active tab
//! receives the same request.

use std::sync::Arc;

use hopp_data::{
    ContentType, FormDataKeyValue, RestAuth, RestHeader, RestParam, RestReqBody, RestRequest,
    RestResponse, SaveContext, Tab, TestReport,
};
use hopp_store::DispatchResult;
use serde_json::Value;

use crate::rest_session::{RestSession, RestSessionAction, RestSessionStore};
use crate::tab_session::{TabSession, TabSessionAction, TabSessionStore};

/// Which store a named dispatch targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::Display)]
#[strum(serialize_all = "camelCase")]
pub enum StoreKind {
    Rest,
    Tabs,
}

#[derive(Debug)]
pub struct Workspace {
    rest: RestSessionStore,
    tabs: TabSessionStore,
    default_request: RestRequest,
}

impl Workspace {
    /// Workspace with the built-in default request and no tabs
    pub fn new() -> DispatchResult<Self> {
        Self::with_default_request(RestRequest::default())
    }

    /// Workspace whose blank request is `default_request`
    pub fn with_default_request(default_request: RestRequest) -> DispatchResult<Self> {
        Ok(Self {
            rest: RestSessionStore::new(RestSession::with_request(default_request.clone()))?,
            tabs: TabSessionStore::new()?,
            default_request,
        })
    }

    /// REST session store, read side
    pub fn rest(&self) -> &RestSessionStore {
        &self.rest
    }

    /// Tab session store, read side
    pub fn tabs(&self) -> &TabSessionStore {
        &self.tabs
    }

    /// Request shown when no tab is open
    pub fn default_request(&self) -> &RestRequest {
        &self.default_request
    }

    /// Dispatch on the REST session, then mirror a replaced request into the
    /// active tab
    pub fn dispatch_rest(&mut self, action: RestSessionAction) -> DispatchResult<Arc<RestSession>> {
        let action = self.stamp_active_tab_id(action);
        let before = self.rest.request();
        let next = self.rest.dispatch(action)?;
        self.sync_active_tab(&before, &next)?;
        Ok(next)
    }

    /// Dispatch on the tab session, then show the active tab's request if
    /// the active tab or its request changed
    pub fn dispatch_tabs(&mut self, action: TabSessionAction) -> DispatchResult<Arc<TabSession>> {
        let before = self.tabs.active_tab();
        let next = self.tabs.dispatch(action)?;
        self.follow_active_tab(before.as_ref(), &next)?;
        Ok(next)
    }

    /// Untyped dispatch used by import and replay
    pub fn dispatch_named(
        &mut self,
        store: StoreKind,
        dispatcher: &str,
        payload: Value,
    ) -> DispatchResult<()> {
        match store {
            StoreKind::Rest => {
                let action = self.rest.decode_named(dispatcher, payload)?;
                self.dispatch_rest(action)?;
            }
            StoreKind::Tabs => {
                let action = self.tabs.decode_named(dispatcher, payload)?;
                self.dispatch_tabs(action)?;
            }
        }
        Ok(())
    }

    /// A request loaded while a tab is active takes that tab's id
    fn stamp_active_tab_id(&self, action: RestSessionAction) -> RestSessionAction {
        match (action, self.tabs.active_tab()) {
            (RestSessionAction::SetRequest { req }, Some(tab))
                if req.id.as_deref() != Some(tab.id.as_str()) =>
            {
                RestSessionAction::SetRequest {
                    req: Arc::new(RestRequest::clone(&req).with_id(tab.id)),
                }
            }
            (action, _) => action,
        }
    }

    fn sync_active_tab(
        &mut self,
        before: &Arc<RestRequest>,
        next: &RestSession,
    ) -> DispatchResult<()> {
        if Arc::ptr_eq(before, &next.request) {
            return Ok(());
        }
        let Some(active) = self.tabs.active_tab() else {
            return Ok(());
        };
        if active.request == next.request {
            return Ok(());
        }
        self.tabs
            .update_tab(&active.id, Arc::clone(&next.request))
    }

    fn follow_active_tab(&mut self, before: Option<&Tab>, next: &TabSession) -> DispatchResult<()> {
        let after = next.active_tab();
        let unchanged = match (before, after) {
            (Some(b), Some(a)) => b.id == a.id && b.request == a.request,
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return Ok(());
        }

        let request = match after {
            Some(tab) => Arc::clone(&tab.request),
            None => Arc::new(self.default_request.clone()),
        };
        self.load_request(request)
    }

    /// Load `request` into the session view, bypassing tab sync
    fn load_request(&mut self, request: Arc<RestRequest>) -> DispatchResult<()> {
        self.rest
            .dispatch(RestSessionAction::SetRequest { req: request })?;
        Ok(())
    }

    fn rest_edit(&mut self, action: RestSessionAction) -> DispatchResult<()> {
        self.dispatch_rest(action)?;
        Ok(())
    }

    /// Replace the whole request, optionally with where it is saved
    pub fn set_request(
        &mut self,
        request: RestRequest,
        save_context: Option<SaveContext>,
    ) -> DispatchResult<()> {
        self.rest_edit(RestSessionAction::SetRequest {
            req: Arc::new(request),
        })?;
        if save_context.is_some() {
            self.set_save_context(save_context)?;
        }
        Ok(())
    }

    /// Replace the request with the default one and drop its save context
    pub fn reset_request(&mut self) -> DispatchResult<()> {
        self.set_request(self.default_request.clone(), None)?;
        self.set_save_context(None)
    }

    /// Rename the request
    pub fn set_request_name(&mut self, new_name: impl Into<String>) -> DispatchResult<()> {
        self.rest_edit(RestSessionAction::SetRequestName {
            new_name: new_name.into(),
        })
    }

    /// Set the request URL
    pub fn set_endpoint(&mut self, new_endpoint: impl Into<String>) -> DispatchResult<()> {
        self.rest_edit(RestSessionAction::SetEndpoint {
            new_endpoint: new_endpoint.into(),
        })
    }

    /// Replace every query parameter
    pub fn set_params(&mut self, entries: Vec<RestParam>) -> DispatchResult<()> {
        self.rest_edit(RestSessionAction::SetParams { entries })
    }

    /// Append a query parameter
    pub fn add_param(&mut self, new_param: RestParam) -> DispatchResult<()> {
        self.rest_edit(RestSessionAction::AddParam { new_param })
    }

    /// Replace the query parameter at `index`
    pub fn update_param(&mut self, index: usize, updated_param: RestParam) -> DispatchResult<()> {
        self.rest_edit(RestSessionAction::UpdateParam {
            index,
            updated_param,
        })
    }

    /// Remove the query parameter at `index`
    pub fn delete_param(&mut self, index: usize) -> DispatchResult<()> {
        self.rest_edit(RestSessionAction::DeleteParam { index })
    }

    /// Remove every query parameter
    pub fn delete_all_params(&mut self) -> DispatchResult<()> {
        self.rest_edit(RestSessionAction::DeleteAllParams)
    }

    /// Set the HTTP method
    pub fn update_method(&mut self, new_method: impl Into<String>) -> DispatchResult<()> {
        self.rest_edit(RestSessionAction::UpdateMethod {
            new_method: new_method.into(),
        })
    }

    /// Replace every header
    pub fn set_headers(&mut self, entries: Vec<RestHeader>) -> DispatchResult<()> {
        self.rest_edit(RestSessionAction::SetHeaders { entries })
    }

    /// Append a header
    pub fn add_header(&mut self, entry: RestHeader) -> DispatchResult<()> {
        self.rest_edit(RestSessionAction::AddHeader { entry })
    }

    /// Replace the header at `index`
    pub fn update_header(&mut self, index: usize, updated_entry: RestHeader) -> DispatchResult<()> {
        self.rest_edit(RestSessionAction::UpdateHeader {
            index,
            updated_entry,
        })
    }

    /// Remove the header at `index`
    pub fn delete_header(&mut self, index: usize) -> DispatchResult<()> {
        self.rest_edit(RestSessionAction::DeleteHeader { index })
    }

    /// Remove every header
    pub fn delete_all_headers(&mut self) -> DispatchResult<()> {
        self.rest_edit(RestSessionAction::DeleteAllHeaders)
    }

    /// Replace the auth descriptor
    pub fn set_auth(&mut self, new_auth: RestAuth) -> DispatchResult<()> {
        self.rest_edit(RestSessionAction::SetAuth { new_auth })
    }

    /// Replace the pre-request script
    pub fn set_pre_request_script(&mut self, new_script: impl Into<String>) -> DispatchResult<()> {
        self.rest_edit(RestSessionAction::SetPreRequestScript {
            new_script: new_script.into(),
        })
    }

    /// Replace the test script
    pub fn set_test_script(&mut self, new_script: impl Into<String>) -> DispatchResult<()> {
        self.rest_edit(RestSessionAction::SetTestScript {
            new_script: new_script.into(),
        })
    }

    /// Switch the body content type, converting the body
    pub fn set_content_type(
        &mut self,
        new_content_type: Option<ContentType>,
    ) -> DispatchResult<()> {
        self.rest_edit(RestSessionAction::SetContentType { new_content_type })
    }

    /// Append a form field; ignored unless the body is form data
    pub fn add_form_data_entry(&mut self, entry: FormDataKeyValue) -> DispatchResult<()> {
        self.rest_edit(RestSessionAction::AddFormDataEntry { entry })
    }

    /// Remove the form field at `index`
    pub fn delete_form_data_entry(&mut self, index: usize) -> DispatchResult<()> {
        self.rest_edit(RestSessionAction::DeleteFormDataEntry { index })
    }

    /// Replace the form field at `index`
    pub fn update_form_data_entry(
        &mut self,
        index: usize,
        entry: FormDataKeyValue,
    ) -> DispatchResult<()> {
        self.rest_edit(RestSessionAction::UpdateFormDataEntry { index, entry })
    }

    /// Remove every form field
    pub fn delete_all_form_data_entries(&mut self) -> DispatchResult<()> {
        self.rest_edit(RestSessionAction::DeleteAllFormDataEntries)
    }

    /// Replace the request body
    pub fn set_request_body(&mut self, new_body: RestReqBody) -> DispatchResult<()> {
        self.rest_edit(RestSessionAction::SetRequestBody { new_body })
    }

    /// Store the latest response
    pub fn update_response(&mut self, updated_res: Option<RestResponse>) -> DispatchResult<()> {
        self.rest_edit(RestSessionAction::UpdateResponse { updated_res })
    }

    /// Drop the stored response
    pub fn clear_response(&mut self) -> DispatchResult<()> {
        self.rest_edit(RestSessionAction::ClearResponse)
    }

    /// Store the test report of the last run
    pub fn set_test_results(&mut self, new_results: Option<TestReport>) -> DispatchResult<()> {
        self.rest_edit(RestSessionAction::SetTestResults { new_results })
    }

    /// Record where the request is saved
    pub fn set_save_context(&mut self, new_context: Option<SaveContext>) -> DispatchResult<()> {
        self.rest_edit(RestSessionAction::SetSaveContext { new_context })
    }

    /// Open `request` in a new tab and make it the active one
    ///
    /// A request opened from a collection entry that already has a tab
    /// re-activates that tab instead.
    pub fn open_in_new_tab(
        &mut self,
        request: RestRequest,
        collection_request_id: Option<String>,
    ) -> DispatchResult<String> {
        if let Some(existing) = collection_request_id
            .as_deref()
            .and_then(|cid| self.tabs.tab_by_collection_request_id(cid))
        {
            log::debug!("Collection request already open in {}", existing.id);
            self.activate_tab(&existing.id)?;
            return Ok(existing.id);
        }

        let id = self.tabs.add_tab(request, collection_request_id)?;
        self.activate_tab(&id)?;
        log::info!("Opened tab {}", id);
        Ok(id)
    }

    /// Make `id` the active tab and show its request
    pub fn activate_tab(&mut self, id: &str) -> DispatchResult<()> {
        self.dispatch_tabs(TabSessionAction::SetActiveTab { id: id.to_string() })?;
        Ok(())
    }

    /// Close a tab; closing the active one shows whichever tab took over, or
    /// the default request when none is left
    pub fn close_tab(&mut self, id: &str) -> DispatchResult<()> {
        self.dispatch_tabs(TabSessionAction::RemoveTab { id: id.to_string() })?;
        Ok(())
    }

    /// Replace every tab (persistence restore) and show the active one
    pub fn restore_tabs(&mut self, tabs: Vec<Tab>) -> DispatchResult<()> {
        let count = tabs.len();
        self.dispatch_tabs(TabSessionAction::SetTabs { tabs })?;
        log::info!("Restored {} tab(s)", count);
        Ok(())
    }

    /// Tabs as they should be persisted
    pub fn tabs_snapshot(&self) -> Vec<Tab> {
        self.tabs.tabs().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use hopp_store::{Observable, StoreError, Subscription};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn workspace() -> Workspace {
        Workspace::new().unwrap()
    }

    fn record<T: Clone + Send + 'static>(
        stream: Observable<T>,
    ) -> (Arc<Mutex<Vec<T>>>, Subscription) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let sub = stream.subscribe(move |v: &T| sink.lock().unwrap().push(v.clone()));
        (seen, sub)
    }

    #[test]
    fn test_edits_follow_the_active_tab() {
        let mut ws = workspace();
        ws.open_in_new_tab(RestRequest::default(), None).unwrap();
        ws.open_in_new_tab(RestRequest::default(), None).unwrap();

        ws.set_endpoint("https://api.example.com").unwrap();
        ws.add_param(RestParam::new("q", "1")).unwrap();

        let active = ws.tabs().active_tab_request().unwrap();
        assert_eq!(ws.tabs().active_tab().map(|t| t.id), Some("tab-1".to_string()));
        assert_eq!(active, ws.rest().request());
        assert_eq!(active.endpoint, "https://api.example.com");
        assert_eq!(
            ws.tabs().tab_request("tab-0").unwrap().endpoint,
            RestRequest::default().endpoint
        );
    }

    #[test]
    fn test_activate_tab_loads_its_request() {
        let mut ws = workspace();
        ws.open_in_new_tab(RestRequest::default(), None).unwrap();
        ws.set_endpoint("https://first").unwrap();
        ws.open_in_new_tab(RestRequest::default(), None).unwrap();
        ws.set_endpoint("https://second").unwrap();

        ws.activate_tab("tab-0").unwrap();

        assert_eq!(ws.rest().request().endpoint, "https://first");
        assert!(matches!(
            ws.activate_tab("tab-5"),
            Err(StoreError::Rejected { .. })
        ));
        assert_eq!(ws.rest().request().endpoint, "https://first");
    }

    #[test]
    fn test_response_updates_do_not_touch_tabs() {
        let mut ws = workspace();
        ws.open_in_new_tab(RestRequest::default(), None).unwrap();
        let before = ws.tabs().tabs();

        ws.clear_response().unwrap();
        ws.set_test_results(Some(TestReport::default())).unwrap();

        assert!(Arc::ptr_eq(&before, &ws.tabs().tabs()));
    }

    #[test]
    fn test_form_data_guard_does_not_sync() {
        let mut ws = workspace();
        ws.open_in_new_tab(RestRequest::default(), None).unwrap();
        ws.set_content_type(Some(ContentType::Json)).unwrap();
        let tabs_before = ws.tabs().tabs();
        let body_before = ws.rest().request().body.clone();

        ws.add_form_data_entry(FormDataKeyValue::text("k", "v"))
            .unwrap();

        assert!(Arc::ptr_eq(&body_before, &ws.rest().request().body));
        assert!(Arc::ptr_eq(&tabs_before, &ws.tabs().tabs()));
    }

    #[test]
    fn test_close_active_tab_shows_successor() {
        let mut ws = workspace();
        ws.open_in_new_tab(RestRequest::default(), None).unwrap();
        ws.set_request_name("first").unwrap();
        ws.open_in_new_tab(RestRequest::default(), None).unwrap();
        ws.set_request_name("second").unwrap();

        ws.close_tab("tab-1").unwrap();
        assert_eq!(ws.rest().request().name, "first");
        assert_eq!(ws.tabs().active_tab().map(|t| t.id), Some("tab-0".to_string()));

        ws.close_tab("tab-0").unwrap();
        assert_eq!(*ws.rest().request(), RestRequest::default());
        assert_eq!(ws.tabs().tab_size(), 0);
    }

    #[test]
    fn test_close_inactive_tab_keeps_view() {
        let mut ws = workspace();
        ws.open_in_new_tab(RestRequest::default(), None).unwrap();
        ws.open_in_new_tab(RestRequest::default(), None).unwrap();
        let shown = ws.rest().request();

        ws.close_tab("tab-0").unwrap();

        assert!(Arc::ptr_eq(&shown, &ws.rest().request()));
    }

    #[test]
    fn test_open_collection_request_reuses_tab() {
        let mut ws = workspace();
        let first = ws
            .open_in_new_tab(RestRequest::default(), Some("coll-1".into()))
            .unwrap();
        ws.open_in_new_tab(RestRequest::default(), None).unwrap();

        let again = ws
            .open_in_new_tab(RestRequest::default(), Some("coll-1".into()))
            .unwrap();

        assert_eq!(first, again);
        assert_eq!(ws.tabs().tab_size(), 2);
        assert_eq!(ws.tabs().active_tab().map(|t| t.id), Some(first));
    }

    #[test]
    fn test_set_request_with_save_context() {
        let mut ws = workspace();
        let context = SaveContext::UserCollection {
            folder_path: "0/1".into(),
            request_index: 2,
        };
        ws.set_request(RestRequest::default(), Some(context.clone()))
            .unwrap();
        assert_eq!(ws.rest().save_context().as_deref(), Some(&context));

        ws.reset_request().unwrap();
        assert!(ws.rest().save_context().is_none());
    }

    #[test]
    fn test_shallow_merge_keeps_other_fields() {
        let mut ws = workspace();
        let before = ws.rest().value();

        ws.set_save_context(Some(SaveContext::TeamCollection {
            request_id: "r1".into(),
            team_id: None,
            collection_id: None,
        }))
        .unwrap();

        let after = ws.rest().value();
        assert!(Arc::ptr_eq(&before.request, &after.request));
        assert_eq!(before.response, after.response);
        assert_eq!(before.test_results, after.test_results);
    }

    #[test]
    fn test_distinct_emission_per_field() {
        let mut ws = workspace();
        let (names, _n) = record(ws.rest().request_name_stream());
        let (bodies, _b) = record(ws.rest().body_stream());

        ws.set_request_name("Renamed").unwrap();
        ws.set_endpoint("https://elsewhere").unwrap();
        ws.set_request_name("Renamed").unwrap();

        assert_eq!(
            *names.lock().unwrap(),
            vec!["Untitled request".to_string(), "Renamed".to_string()]
        );
        assert_eq!(bodies.lock().unwrap().len(), 1);
    }

    fn two_tabs() -> Workspace {
        let mut ws = workspace();
        ws.open_in_new_tab(RestRequest::default(), None).unwrap();
        ws.set_endpoint("https://first").unwrap();
        ws.open_in_new_tab(RestRequest::default(), None).unwrap();
        ws.set_endpoint("https://second").unwrap();
        ws
    }

    #[test]
    fn test_named_set_active_tab_shows_its_request() {
        let mut ws = two_tabs();

        ws.dispatch_named(StoreKind::Tabs, "setActiveTab", json!({ "id": "tab-0" }))
            .unwrap();
        assert_eq!(ws.rest().request().endpoint, "https://first");

        ws.update_method("POST").unwrap();
        let tab0 = ws.tabs().tab_request("tab-0").unwrap();
        assert_eq!(tab0.endpoint, "https://first");
        assert_eq!(tab0.method, "POST");
        assert_eq!(ws.tabs().tab_request("tab-1").unwrap().method, "GET");
    }

    #[test]
    fn test_named_remove_active_tab_shows_successor() {
        let mut ws = two_tabs();

        ws.dispatch_named(StoreKind::Tabs, "removeTab", json!({ "id": "tab-1" }))
            .unwrap();
        assert_eq!(ws.rest().request().endpoint, "https://first");

        ws.update_method("POST").unwrap();
        let tab0 = ws.tabs().tab_request("tab-0").unwrap();
        assert_eq!(tab0.endpoint, "https://first");
        assert_eq!(tab0.method, "POST");

        ws.dispatch_named(StoreKind::Tabs, "removeTab", json!({ "id": "tab-0" }))
            .unwrap();
        assert_eq!(*ws.rest().request(), RestRequest::default());
    }

    #[test]
    fn test_named_update_of_active_tab_reloads_view() {
        let mut ws = two_tabs();
        let mut replaced = RestRequest::default();
        replaced.endpoint = "https://replaced".into();

        ws.dispatch_named(
            StoreKind::Tabs,
            "updateTab",
            json!({ "id": "tab-1", "newRequest": replaced }),
        )
        .unwrap();
        assert_eq!(ws.rest().request().endpoint, "https://replaced");

        ws.update_method("PUT").unwrap();
        let tab1 = ws.tabs().tab_request("tab-1").unwrap();
        assert_eq!(tab1.endpoint, "https://replaced");
        assert_eq!(tab1.method, "PUT");
        assert_eq!(ws.tabs().tab_request("tab-0").unwrap().endpoint, "https://first");
    }

    #[test]
    fn test_updating_inactive_tab_keeps_response() {
        let mut ws = two_tabs();
        ws.update_response(Some(RestResponse::ScriptFail {
            error: "boom".into(),
        }))
        .unwrap();

        ws.dispatch_tabs(TabSessionAction::UpdateTab {
            id: "tab-0".into(),
            new_request: Arc::new(RestRequest::default()),
        })
        .unwrap();

        assert_eq!(ws.rest().request().endpoint, "https://second");
        assert!(ws.rest().value().response.is_some());
    }

    #[test]
    fn test_set_request_takes_active_tab_id() {
        let mut ws = workspace();
        ws.open_in_new_tab(RestRequest::default(), None).unwrap();

        ws.set_request(RestRequest::default(), None).unwrap();

        let session = ws.rest().request();
        assert_eq!(session.id.as_deref(), Some("tab-0"));
        assert_eq!(Some(session), ws.tabs().active_tab_request());
    }

    #[test]
    fn test_named_set_request_takes_active_tab_id() {
        let mut ws = workspace();
        ws.open_in_new_tab(RestRequest::default(), None).unwrap();
        let mut other = RestRequest::default().with_id("elsewhere");
        other.name = "imported".into();

        ws.dispatch_named(StoreKind::Rest, "setRequest", json!({ "req": other }))
            .unwrap();

        let session = ws.rest().request();
        assert_eq!(session.id.as_deref(), Some("tab-0"));
        assert_eq!(session.name, "imported");
        assert!(Arc::ptr_eq(
            &session,
            &ws.tabs().active_tab_request().unwrap()
        ));
    }

    #[test]
    fn test_named_dispatch_syncs_tab() {
        let mut ws = workspace();
        ws.open_in_new_tab(RestRequest::default(), None).unwrap();

        ws.dispatch_named(
            StoreKind::Rest,
            "updateMethod",
            json!({ "newMethod": "DELETE" }),
        )
        .unwrap();

        assert_eq!(ws.tabs().active_tab_request().unwrap().method, "DELETE");
        assert!(ws
            .dispatch_named(StoreKind::Tabs, "setActive", json!({}))
            .is_err());
    }

    #[test]
    fn test_restore_tabs_shows_active() {
        let mut ws = workspace();
        let mut req = RestRequest::default();
        req.name = "restored".into();
        let tabs = vec![
            Tab::new("tab-0", RestRequest::default()),
            Tab::new("tab-1", req).with_active(true),
        ];

        ws.restore_tabs(tabs).unwrap();

        assert_eq!(ws.rest().request().name, "restored");
        assert_eq!(ws.tabs_snapshot().len(), 2);
    }

    #[test]
    fn test_store_kind_names() {
        assert_eq!("rest".parse::<StoreKind>().unwrap(), StoreKind::Rest);
        assert_eq!("tabs".parse::<StoreKind>().unwrap(), StoreKind::Tabs);
        assert_eq!(StoreKind::Tabs.to_string(), "tabs");
    }
}
