//! Request execution collaborator
//!
//! The session never performs I/O itself. A [`RequestRunner`] executes the
//! materialized request, and [`Workspace::run_request`] turns its outcome into
//! response variants stored through the normal dispatch path.

use std::sync::Arc;

use async_trait::async_trait;
use hopp_data::{RestRequest, RestResponse, TestReport};
use hopp_store::{DispatchResult, StoreError};
use thiserror::Error;

use crate::rest_session::RestSessionAction;
use crate::workspace::Workspace;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RunError {
    /// The request never got a response
    #[error("network error: {0}")]
    Network(String),

    /// The pre-request or test script failed
    #[error("script error: {0}")]
    Script(String),
}

/// What a completed run hands back
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// `Success` or `Fail` depending on the status code
    pub response: RestResponse,
    pub test_results: Option<TestReport>,
}

/// Executes requests on behalf of the session
#[async_trait]
pub trait RequestRunner: Send + Sync {
    async fn run(
        &self,
        request: &RestRequest,
        auth_token: Option<&str>,
    ) -> Result<RunOutcome, RunError>;
}

impl Workspace {
    /// Run the request on screen and publish the result
    ///
    /// A `loading` response is published before the runner is awaited.
    /// Runner failures become `network_fail` / `script_fail` responses.
    pub async fn run_request(
        &mut self,
        runner: &dyn RequestRunner,
        auth_token: Option<&str>,
    ) -> DispatchResult<Arc<RestResponse>> {
        let request = self.rest().request();
        self.set_test_results(None)?;
        self.update_response(Some(RestResponse::Loading {
            req: Arc::clone(&request),
        }))?;

        log::debug!("Running {} {}", request.method, request.endpoint);
        let response = match runner.run(&request, auth_token).await {
            Ok(outcome) => {
                if outcome.test_results.is_some() {
                    self.set_test_results(outcome.test_results)?;
                }
                outcome.response
            }
            Err(RunError::Network(error)) => {
                log::warn!("Request failed: {}", error);
                RestResponse::NetworkFail {
                    error,
                    req: Arc::clone(&request),
                }
            }
            Err(RunError::Script(error)) => {
                log::warn!("Script failed: {}", error);
                RestResponse::ScriptFail { error }
            }
        };

        let session = self.dispatch_rest(RestSessionAction::UpdateResponse {
            updated_res: Some(response),
        })?;
        session
            .response
            .clone()
            .ok_or_else(|| StoreError::rejected("updateResponse", "response was not stored"))
    }
}
