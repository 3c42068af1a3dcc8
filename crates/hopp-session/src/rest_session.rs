//! REST session store
//!
//! Holds the request currently being edited together with the last response,
//! test report and save context. Every edit is a named dispatcher; the
//! `*_stream` accessors expose deduplicated projections for UI bindings.

use std::sync::Arc;

use hopp_data::{
    apply_body_transition, count_effective, ContentType, FormDataKeyValue, RestAuth, RestHeader,
    RestParam, RestReqBody, RestRequest, RestResponse, SaveContext, TestReport,
};
use hopp_store::{
    DispatchResult, Dispatchers, DispatchingStore, Observable, Reducer, StoreAction, StoreError,
    StoreState,
};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct RestSession {
    pub request: Arc<RestRequest>,
    pub response: Option<Arc<RestResponse>>,
    pub test_results: Option<Arc<TestReport>>,
    pub save_context: Option<Arc<SaveContext>>,
}

impl RestSession {
    pub fn with_request(request: RestRequest) -> Self {
        Self {
            request: Arc::new(request),
            response: None,
            test_results: None,
            save_context: None,
        }
    }
}

impl Default for RestSession {
    fn default() -> Self {
        Self::with_request(RestRequest::default())
    }
}

/// Top-level fields replaced by a dispatch
///
/// The outer `Option` says whether the field is touched, the inner one is the
/// new (possibly cleared) value.
#[derive(Debug, Default)]
pub struct RestSessionPatch {
    pub request: Option<Arc<RestRequest>>,
    pub response: Option<Option<Arc<RestResponse>>>,
    pub test_results: Option<Option<Arc<TestReport>>>,
    pub save_context: Option<Option<Arc<SaveContext>>>,
}

impl RestSessionPatch {
    fn request(request: RestRequest) -> Self {
        Self {
            request: Some(Arc::new(request)),
            ..Default::default()
        }
    }
}

impl StoreState for RestSession {
    type Patch = RestSessionPatch;

    fn merge(&self, patch: RestSessionPatch) -> Self {
        Self {
            request: patch.request.unwrap_or_else(|| Arc::clone(&self.request)),
            response: patch.response.unwrap_or_else(|| self.response.clone()),
            test_results: patch.test_results.unwrap_or_else(|| self.test_results.clone()),
            save_context: patch.save_context.unwrap_or_else(|| self.save_context.clone()),
        }
    }
}

/// Dispatch calls accepted by the REST session store
///
/// The variant name (camelCase) is the dispatcher name; field names match the
/// payload keys used by named dispatch.
#[derive(Debug, Clone, Deserialize, strum::IntoStaticStr)]
#[serde(
    tag = "dispatcher",
    content = "payload",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
#[strum(serialize_all = "camelCase")]
pub enum RestSessionAction {
    /// Replace the whole request; also clears the response and test report
    SetRequest { req: Arc<RestRequest> },
    SetRequestName { new_name: String },
    SetEndpoint { new_endpoint: String },
    SetParams { entries: Vec<RestParam> },
    AddParam { new_param: RestParam },
    UpdateParam { index: usize, updated_param: RestParam },
    DeleteParam { index: usize },
    DeleteAllParams,
    UpdateMethod { new_method: String },
    SetHeaders { entries: Vec<RestHeader> },
    AddHeader { entry: RestHeader },
    UpdateHeader { index: usize, updated_entry: RestHeader },
    DeleteHeader { index: usize },
    DeleteAllHeaders,
    SetAuth { new_auth: RestAuth },
    SetPreRequestScript { new_script: String },
    SetTestScript { new_script: String },
    SetContentType { new_content_type: Option<ContentType> },
    AddFormDataEntry { entry: FormDataKeyValue },
    DeleteFormDataEntry { index: usize },
    UpdateFormDataEntry { index: usize, entry: FormDataKeyValue },
    DeleteAllFormDataEntries,
    SetRequestBody { new_body: RestReqBody },
    UpdateResponse { updated_res: Option<RestResponse> },
    ClearResponse,
    SetTestResults { new_results: Option<TestReport> },
    SetSaveContext { new_context: Option<SaveContext> },
}

impl StoreAction for RestSessionAction {
    fn dispatcher(&self) -> &'static str {
        self.into()
    }
}

impl RestSessionAction {
    /// Whether the dispatcher may replace `request`
    pub fn edits_request(&self) -> bool {
        !matches!(
            self,
            RestSessionAction::UpdateResponse { .. }
                | RestSessionAction::ClearResponse
                | RestSessionAction::SetTestResults { .. }
                | RestSessionAction::SetSaveContext { .. }
        )
    }
}

type R = Reducer<RestSession, RestSessionAction>;

/// Registry of all REST session dispatchers
pub fn rest_session_dispatchers() -> DispatchResult<Dispatchers<RestSession, RestSessionAction>> {
    Dispatchers::from_table([
        ("setRequest", set_request as R),
        ("setRequestName", set_request_name as R),
        ("setEndpoint", set_endpoint as R),
        ("setParams", set_params as R),
        ("addParam", add_param as R),
        ("updateParam", update_param as R),
        ("deleteParam", delete_param as R),
        ("deleteAllParams", delete_all_params as R),
        ("updateMethod", update_method as R),
        ("setHeaders", set_headers as R),
        ("addHeader", add_header as R),
        ("updateHeader", update_header as R),
        ("deleteHeader", delete_header as R),
        ("deleteAllHeaders", delete_all_headers as R),
        ("setAuth", set_auth as R),
        ("setPreRequestScript", set_pre_request_script as R),
        ("setTestScript", set_test_script as R),
        ("setContentType", set_content_type as R),
        ("addFormDataEntry", add_form_data_entry as R),
        ("deleteFormDataEntry", delete_form_data_entry as R),
        ("updateFormDataEntry", update_form_data_entry as R),
        ("deleteAllFormDataEntries", delete_all_form_data_entries as R),
        ("setRequestBody", set_request_body as R),
        ("updateResponse", update_response as R),
        ("clearResponse", clear_response as R),
        ("setTestResults", set_test_results as R),
        ("setSaveContext", set_save_context as R),
    ])
}

/// Shallow copy of the current request with one edit applied
fn edit_request(curr: &RestSession, edit: impl FnOnce(&mut RestRequest)) -> RestSessionPatch {
    let mut request = RestRequest::clone(&curr.request);
    edit(&mut request);
    RestSessionPatch::request(request)
}

fn replace_row<T: Clone>(rows: &[T], index: usize, row: T) -> Option<Vec<T>> {
    if index >= rows.len() {
        return None;
    }
    let mut rows = rows.to_vec();
    rows[index] = row;
    Some(rows)
}

fn remove_row<T: Clone>(rows: &[T], index: usize) -> Option<Vec<T>> {
    if index >= rows.len() {
        return None;
    }
    let mut rows = rows.to_vec();
    rows.remove(index);
    Some(rows)
}

fn stale_index(dispatcher: &str, index: usize) -> DispatchResult<RestSessionPatch> {
    log::warn!("{}: no entry at index {}, ignoring", dispatcher, index);
    Ok(RestSessionPatch::default())
}

fn set_request(_: &RestSession, action: RestSessionAction) -> DispatchResult<RestSessionPatch> {
    let RestSessionAction::SetRequest { req } = action else {
        return Err(StoreError::PayloadMismatch("setRequest"));
    };
    Ok(RestSessionPatch {
        request: Some(req),
        response: Some(None),
        test_results: Some(None),
        ..Default::default()
    })
}

fn set_request_name(
    curr: &RestSession,
    action: RestSessionAction,
) -> DispatchResult<RestSessionPatch> {
    let RestSessionAction::SetRequestName { new_name } = action else {
        return Err(StoreError::PayloadMismatch("setRequestName"));
    };
    Ok(edit_request(curr, |req| req.name = new_name))
}

fn set_endpoint(curr: &RestSession, action: RestSessionAction) -> DispatchResult<RestSessionPatch> {
    let RestSessionAction::SetEndpoint { new_endpoint } = action else {
        return Err(StoreError::PayloadMismatch("setEndpoint"));
    };
    Ok(edit_request(curr, |req| req.endpoint = new_endpoint))
}

fn set_params(curr: &RestSession, action: RestSessionAction) -> DispatchResult<RestSessionPatch> {
    let RestSessionAction::SetParams { entries } = action else {
        return Err(StoreError::PayloadMismatch("setParams"));
    };
    Ok(edit_request(curr, |req| req.params = Arc::new(entries)))
}

fn add_param(curr: &RestSession, action: RestSessionAction) -> DispatchResult<RestSessionPatch> {
    let RestSessionAction::AddParam { new_param } = action else {
        return Err(StoreError::PayloadMismatch("addParam"));
    };
    let mut params = curr.request.params.to_vec();
    params.push(new_param);
    Ok(edit_request(curr, |req| req.params = Arc::new(params)))
}

fn update_param(curr: &RestSession, action: RestSessionAction) -> DispatchResult<RestSessionPatch> {
    let RestSessionAction::UpdateParam {
        index,
        updated_param,
    } = action
    else {
        return Err(StoreError::PayloadMismatch("updateParam"));
    };
    let Some(params) = replace_row(&curr.request.params, index, updated_param) else {
        return stale_index("updateParam", index);
    };
    Ok(edit_request(curr, |req| req.params = Arc::new(params)))
}

fn delete_param(curr: &RestSession, action: RestSessionAction) -> DispatchResult<RestSessionPatch> {
    let RestSessionAction::DeleteParam { index } = action else {
        return Err(StoreError::PayloadMismatch("deleteParam"));
    };
    let Some(params) = remove_row(&curr.request.params, index) else {
        return stale_index("deleteParam", index);
    };
    Ok(edit_request(curr, |req| req.params = Arc::new(params)))
}

fn delete_all_params(curr: &RestSession, _: RestSessionAction) -> DispatchResult<RestSessionPatch> {
    Ok(edit_request(curr, |req| req.params = Arc::new(Vec::new())))
}

fn update_method(
    curr: &RestSession,
    action: RestSessionAction,
) -> DispatchResult<RestSessionPatch> {
    let RestSessionAction::UpdateMethod { new_method } = action else {
        return Err(StoreError::PayloadMismatch("updateMethod"));
    };
    Ok(edit_request(curr, |req| req.method = new_method))
}

fn set_headers(curr: &RestSession, action: RestSessionAction) -> DispatchResult<RestSessionPatch> {
    let RestSessionAction::SetHeaders { entries } = action else {
        return Err(StoreError::PayloadMismatch("setHeaders"));
    };
    Ok(edit_request(curr, |req| req.headers = Arc::new(entries)))
}

fn add_header(curr: &RestSession, action: RestSessionAction) -> DispatchResult<RestSessionPatch> {
    let RestSessionAction::AddHeader { entry } = action else {
        return Err(StoreError::PayloadMismatch("addHeader"));
    };
    let mut headers = curr.request.headers.to_vec();
    headers.push(entry);
    Ok(edit_request(curr, |req| req.headers = Arc::new(headers)))
}

fn update_header(
    curr: &RestSession,
    action: RestSessionAction,
) -> DispatchResult<RestSessionPatch> {
    let RestSessionAction::UpdateHeader {
        index,
        updated_entry,
    } = action
    else {
        return Err(StoreError::PayloadMismatch("updateHeader"));
    };
    let Some(headers) = replace_row(&curr.request.headers, index, updated_entry) else {
        return stale_index("updateHeader", index);
    };
    Ok(edit_request(curr, |req| req.headers = Arc::new(headers)))
}

fn delete_header(
    curr: &RestSession,
    action: RestSessionAction,
) -> DispatchResult<RestSessionPatch> {
    let RestSessionAction::DeleteHeader { index } = action else {
        return Err(StoreError::PayloadMismatch("deleteHeader"));
    };
    let Some(headers) = remove_row(&curr.request.headers, index) else {
        return stale_index("deleteHeader", index);
    };
    Ok(edit_request(curr, |req| req.headers = Arc::new(headers)))
}

fn delete_all_headers(
    curr: &RestSession,
    _: RestSessionAction,
) -> DispatchResult<RestSessionPatch> {
    Ok(edit_request(curr, |req| req.headers = Arc::new(Vec::new())))
}

fn set_auth(curr: &RestSession, action: RestSessionAction) -> DispatchResult<RestSessionPatch> {
    let RestSessionAction::SetAuth { new_auth } = action else {
        return Err(StoreError::PayloadMismatch("setAuth"));
    };
    Ok(edit_request(curr, |req| req.auth = Arc::new(new_auth)))
}

fn set_pre_request_script(
    curr: &RestSession,
    action: RestSessionAction,
) -> DispatchResult<RestSessionPatch> {
    let RestSessionAction::SetPreRequestScript { new_script } = action else {
        return Err(StoreError::PayloadMismatch("setPreRequestScript"));
    };
    Ok(edit_request(curr, |req| req.pre_request_script = new_script))
}

fn set_test_script(
    curr: &RestSession,
    action: RestSessionAction,
) -> DispatchResult<RestSessionPatch> {
    let RestSessionAction::SetTestScript { new_script } = action else {
        return Err(StoreError::PayloadMismatch("setTestScript"));
    };
    Ok(edit_request(curr, |req| req.test_script = new_script))
}

fn set_content_type(
    curr: &RestSession,
    action: RestSessionAction,
) -> DispatchResult<RestSessionPatch> {
    let RestSessionAction::SetContentType { new_content_type } = action else {
        return Err(StoreError::PayloadMismatch("setContentType"));
    };
    let body = apply_body_transition(&curr.request.body, new_content_type);
    Ok(edit_request(curr, |req| req.body = body))
}

/// Form data entries of the current body, or `None` for any other body
fn form_entries(curr: &RestSession) -> Option<&[FormDataKeyValue]> {
    curr.request.body.form_entries()
}

fn form_data_patch(curr: &RestSession, entries: Vec<FormDataKeyValue>) -> RestSessionPatch {
    edit_request(curr, |req| {
        req.body = Arc::new(RestReqBody::FormData(entries));
    })
}

fn add_form_data_entry(
    curr: &RestSession,
    action: RestSessionAction,
) -> DispatchResult<RestSessionPatch> {
    let RestSessionAction::AddFormDataEntry { entry } = action else {
        return Err(StoreError::PayloadMismatch("addFormDataEntry"));
    };
    let Some(entries) = form_entries(curr) else {
        return Ok(RestSessionPatch::default());
    };
    let mut entries = entries.to_vec();
    entries.push(entry);
    Ok(form_data_patch(curr, entries))
}

fn delete_form_data_entry(
    curr: &RestSession,
    action: RestSessionAction,
) -> DispatchResult<RestSessionPatch> {
    let RestSessionAction::DeleteFormDataEntry { index } = action else {
        return Err(StoreError::PayloadMismatch("deleteFormDataEntry"));
    };
    let Some(entries) = form_entries(curr) else {
        return Ok(RestSessionPatch::default());
    };
    let Some(entries) = remove_row(entries, index) else {
        return stale_index("deleteFormDataEntry", index);
    };
    Ok(form_data_patch(curr, entries))
}

fn update_form_data_entry(
    curr: &RestSession,
    action: RestSessionAction,
) -> DispatchResult<RestSessionPatch> {
    let RestSessionAction::UpdateFormDataEntry { index, entry } = action else {
        return Err(StoreError::PayloadMismatch("updateFormDataEntry"));
    };
    let Some(entries) = form_entries(curr) else {
        return Ok(RestSessionPatch::default());
    };
    let Some(entries) = replace_row(entries, index, entry) else {
        return stale_index("updateFormDataEntry", index);
    };
    Ok(form_data_patch(curr, entries))
}

fn delete_all_form_data_entries(
    curr: &RestSession,
    _: RestSessionAction,
) -> DispatchResult<RestSessionPatch> {
    if form_entries(curr).is_none() {
        return Ok(RestSessionPatch::default());
    }
    Ok(form_data_patch(curr, Vec::new()))
}

fn set_request_body(
    curr: &RestSession,
    action: RestSessionAction,
) -> DispatchResult<RestSessionPatch> {
    let RestSessionAction::SetRequestBody { new_body } = action else {
        return Err(StoreError::PayloadMismatch("setRequestBody"));
    };
    Ok(edit_request(curr, |req| req.body = Arc::new(new_body)))
}

fn update_response(_: &RestSession, action: RestSessionAction) -> DispatchResult<RestSessionPatch> {
    let RestSessionAction::UpdateResponse { updated_res } = action else {
        return Err(StoreError::PayloadMismatch("updateResponse"));
    };
    Ok(RestSessionPatch {
        response: Some(updated_res.map(Arc::new)),
        ..Default::default()
    })
}

fn clear_response(_: &RestSession, _: RestSessionAction) -> DispatchResult<RestSessionPatch> {
    Ok(RestSessionPatch {
        response: Some(None),
        ..Default::default()
    })
}

fn set_test_results(
    _: &RestSession,
    action: RestSessionAction,
) -> DispatchResult<RestSessionPatch> {
    let RestSessionAction::SetTestResults { new_results } = action else {
        return Err(StoreError::PayloadMismatch("setTestResults"));
    };
    Ok(RestSessionPatch {
        test_results: Some(new_results.map(Arc::new)),
        ..Default::default()
    })
}

fn set_save_context(
    _: &RestSession,
    action: RestSessionAction,
) -> DispatchResult<RestSessionPatch> {
    let RestSessionAction::SetSaveContext { new_context } = action else {
        return Err(StoreError::PayloadMismatch("setSaveContext"));
    };
    Ok(RestSessionPatch {
        save_context: Some(new_context.map(Arc::new)),
        ..Default::default()
    })
}

/// The REST session store and its derived streams
#[derive(Debug)]
pub struct RestSessionStore {
    store: DispatchingStore<RestSession, RestSessionAction>,
}

impl RestSessionStore {
    pub fn new(initial: RestSession) -> DispatchResult<Self> {
        Ok(Self {
            store: DispatchingStore::new(initial, rest_session_dispatchers()?),
        })
    }

    pub fn dispatch(&mut self, action: RestSessionAction) -> DispatchResult<Arc<RestSession>> {
        self.store.dispatch(action)
    }

    /// Dispatch by name, decoding `payload` into the matching action
    pub fn dispatch_named(
        &mut self,
        name: &str,
        payload: Value,
    ) -> DispatchResult<Arc<RestSession>> {
        self.store.dispatch_named(name, payload)
    }

    /// Decode a named call without dispatching it
    pub fn decode_named(&self, name: &str, payload: Value) -> DispatchResult<RestSessionAction> {
        self.store.decode_named(name, payload)
    }

    pub fn dispatcher_names(&self) -> Vec<&'static str> {
        self.store.dispatchers().names()
    }

    pub fn value(&self) -> Arc<RestSession> {
        self.store.value()
    }

    pub fn request(&self) -> Arc<RestRequest> {
        Arc::clone(&self.value().request)
    }

    pub fn save_context(&self) -> Option<Arc<SaveContext>> {
        self.value().save_context.clone()
    }

    pub fn subject(&self) -> Observable<Arc<RestSession>> {
        self.store.subject()
    }

    pub fn request_stream(&self) -> Observable<Arc<RestRequest>> {
        self.store.select(|s| Arc::clone(&s.request))
    }

    pub fn request_name_stream(&self) -> Observable<String> {
        self.store.select(|s| s.request.name.clone())
    }

    pub fn endpoint_stream(&self) -> Observable<String> {
        self.store.select(|s| s.request.endpoint.clone())
    }

    pub fn params_stream(&self) -> Observable<Arc<Vec<RestParam>>> {
        self.store.select(|s| Arc::clone(&s.request.params))
    }

    /// Number of params that are active and not blank
    pub fn active_params_count_stream(&self) -> Observable<usize> {
        self.params_stream().map(|params| count_effective(params))
    }

    pub fn method_stream(&self) -> Observable<String> {
        self.store.select(|s| s.request.method.clone())
    }

    pub fn headers_stream(&self) -> Observable<Arc<Vec<RestHeader>>> {
        self.store.select(|s| Arc::clone(&s.request.headers))
    }

    pub fn active_headers_count_stream(&self) -> Observable<usize> {
        self.headers_stream().map(|headers| count_effective(headers))
    }

    pub fn auth_stream(&self) -> Observable<Arc<RestAuth>> {
        self.store.select(|s| Arc::clone(&s.request.auth))
    }

    pub fn pre_request_script_stream(&self) -> Observable<String> {
        self.store.select(|s| s.request.pre_request_script.clone())
    }

    pub fn content_type_stream(&self) -> Observable<Option<ContentType>> {
        self.store.select(|s| s.request.body.content_type())
    }

    pub fn test_script_stream(&self) -> Observable<String> {
        self.store.select(|s| s.request.test_script.clone())
    }

    pub fn body_stream(&self) -> Observable<Arc<RestReqBody>> {
        self.store.select(|s| Arc::clone(&s.request.body))
    }

    pub fn response_stream(&self) -> Observable<Option<Arc<RestResponse>>> {
        self.store.select(|s| s.response.clone())
    }

    /// Responses the server finished sending; loading and failures are skipped
    pub fn completed_response_stream(&self) -> Observable<Arc<RestResponse>> {
        self.response_stream()
            .filter_map(|res| res.as_ref().filter(|r| r.is_completed()).cloned())
    }

    pub fn test_results_stream(&self) -> Observable<Option<Arc<TestReport>>> {
        self.store.select(|s| s.test_results.clone())
    }

    pub fn save_context_stream(&self) -> Observable<Option<Arc<SaveContext>>> {
        self.store.select(|s| s.save_context.clone())
    }
}
