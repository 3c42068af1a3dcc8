//! Read/write controllers for single request fields
//!
//! A binding mirrors one derived stream into a local cell and writes back
//! through exactly one dispatcher.

use std::sync::{Arc, Mutex};

use hopp_data::RestReqBody;
use hopp_store::{DispatchResult, Observable, Subscription};

use crate::workspace::Workspace;

type Writer<T> = fn(&mut Workspace, T) -> DispatchResult<()>;

pub struct FieldBinding<T> {
    current: Arc<Mutex<T>>,
    writer: Writer<T>,
    _subscription: Subscription,
}

impl<T: Clone + Send + 'static> FieldBinding<T> {
    pub fn new(stream: Observable<T>, initial: T, writer: Writer<T>) -> Self {
        let current = Arc::new(Mutex::new(initial));
        let cell = Arc::clone(&current);
        let subscription = stream.subscribe(move |value: &T| {
            if let Ok(mut slot) = cell.lock() {
                *slot = value.clone();
            }
        });
        Self {
            current,
            writer,
            _subscription: subscription,
        }
    }

    /// Latest value published by the store
    pub fn read(&self) -> T {
        match self.current.lock() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn write(&self, workspace: &mut Workspace, value: T) -> DispatchResult<()> {
        (self.writer)(workspace, value)
    }
}

impl<T> std::fmt::Debug for FieldBinding<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldBinding").finish_non_exhaustive()
    }
}

pub fn pre_request_script(workspace: &Workspace) -> FieldBinding<String> {
    let rest = workspace.rest();
    FieldBinding::new(
        rest.pre_request_script_stream(),
        rest.request().pre_request_script.clone(),
        |ws, script| ws.set_pre_request_script(script),
    )
}

pub fn test_script(workspace: &Workspace) -> FieldBinding<String> {
    let rest = workspace.rest();
    FieldBinding::new(
        rest.test_script_stream(),
        rest.request().test_script.clone(),
        |ws, script| ws.set_test_script(script),
    )
}

pub fn request_name(workspace: &Workspace) -> FieldBinding<String> {
    let rest = workspace.rest();
    FieldBinding::new(
        rest.request_name_stream(),
        rest.request().name.clone(),
        |ws, name| ws.set_request_name(name),
    )
}

pub fn request_body(workspace: &Workspace) -> FieldBinding<Arc<RestReqBody>> {
    let rest = workspace.rest();
    FieldBinding::new(
        rest.body_stream(),
        Arc::clone(&rest.request().body),
        |ws, body| ws.set_request_body(RestReqBody::clone(&body)),
    )
}
