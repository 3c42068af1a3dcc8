use std::fmt::Debug;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::dispatchers::Dispatchers;
use crate::error::{DispatchResult, StoreError};
use crate::observable::Observable;
use crate::subject::BehaviorSubject;

/// State held by a [`DispatchingStore`]
///
/// `merge` is a shallow merge: every field present in the patch replaces the
/// matching top-level field, every absent field is carried over untouched.
pub trait StoreState: Clone + Send + Sync + 'static {
    type Patch: Default + Debug;

    fn merge(&self, patch: Self::Patch) -> Self;
}

/// A dispatch call: the dispatcher name together with its payload
pub trait StoreAction: Debug + Send + 'static {
    fn dispatcher(&self) -> &'static str;
}

/// Store - holds the current state and publishes every new state value
///
/// There is exactly one write path: [`DispatchingStore::dispatch`]. Readers
/// subscribe to [`DispatchingStore::subject`] or to a projection of it.
pub struct DispatchingStore<S: StoreState, A: StoreAction> {
    subject: BehaviorSubject<Arc<S>>,
    dispatchers: Dispatchers<S, A>,
}

impl<S: StoreState, A: StoreAction> DispatchingStore<S, A> {
    pub fn new(initial_state: S, dispatchers: Dispatchers<S, A>) -> Self {
        Self {
            subject: BehaviorSubject::new(Arc::new(initial_state)),
            dispatchers,
        }
    }

    /// Current state snapshot
    pub fn value(&self) -> Arc<S> {
        self.subject.value()
    }

    /// Stream of state values: the current one first, then one per dispatch
    pub fn subject(&self) -> Observable<Arc<S>> {
        self.subject.observable()
    }

    /// Derived stream of a slice of the state, deduplicated
    pub fn select<U>(&self, project: impl Fn(&S) -> U + Send + Sync + 'static) -> Observable<U>
    where
        U: PartialEq + Clone + Send + 'static,
    {
        self.subject().select(move |state: &Arc<S>| project(state.as_ref()))
    }

    pub fn dispatchers(&self) -> &Dispatchers<S, A> {
        &self.dispatchers
    }

    /// Run the registered reducer for `action` and publish the merged state
    pub fn dispatch(&mut self, action: A) -> DispatchResult<Arc<S>> {
        let name = action.dispatcher();
        let reducer = self.dispatchers.resolve(name)?;

        let current = self.value();
        let patch = reducer(&current, action)?;
        log::debug!("Dispatch: {}", name);
        log::trace!("Dispatch {} patch: {:?}", name, patch);

        let next = Arc::new(current.merge(patch));
        self.subject.next(Arc::clone(&next));
        Ok(next)
    }

    /// Dispatch by name with an untyped payload
    pub fn dispatch_named(&mut self, name: &str, payload: Value) -> DispatchResult<Arc<S>>
    where
        A: DeserializeOwned,
    {
        let action = self.decode_named(name, payload)?;
        self.dispatch(action)
    }

    /// Turn a named call into a typed action without dispatching it
    ///
    /// The name is resolved before the payload is decoded, so a misspelled
    /// dispatcher is reported as such rather than as a decoding failure.
    pub fn decode_named(&self, name: &str, payload: Value) -> DispatchResult<A>
    where
        A: DeserializeOwned,
    {
        self.dispatchers.resolve(name)?;

        let mut call = Map::new();
        call.insert("dispatcher".to_string(), Value::String(name.to_string()));
        match payload {
            Value::Null => {}
            Value::Object(fields) if fields.is_empty() => {}
            payload => {
                call.insert("payload".to_string(), payload);
            }
        }

        serde_json::from_value(Value::Object(call)).map_err(|source| {
            StoreError::MalformedPayload {
                dispatcher: name.to_string(),
                source,
            }
        })
    }
}

impl<S: StoreState + Debug, A: StoreAction> Debug for DispatchingStore<S, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchingStore")
            .field("value", &self.value())
            .field("dispatchers", &self.dispatchers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Counter {
        count: i64,
        label: Arc<String>,
    }

    #[derive(Debug, Default)]
    struct CounterPatch {
        count: Option<i64>,
        label: Option<Arc<String>>,
    }

    impl StoreState for Counter {
        type Patch = CounterPatch;

        fn merge(&self, patch: CounterPatch) -> Self {
            Self {
                count: patch.count.unwrap_or(self.count),
                label: patch.label.unwrap_or_else(|| Arc::clone(&self.label)),
            }
        }
    }

    #[derive(Debug, Deserialize, strum::IntoStaticStr)]
    #[serde(tag = "dispatcher", content = "payload", rename_all = "camelCase")]
    #[strum(serialize_all = "camelCase")]
    enum CounterAction {
        Add { amount: i64 },
        Rename { label: String },
        Reset,
        Unregistered,
    }

    impl StoreAction for CounterAction {
        fn dispatcher(&self) -> &'static str {
            self.into()
        }
    }

    fn add(curr: &Counter, action: CounterAction) -> DispatchResult<CounterPatch> {
        let CounterAction::Add { amount } = action else {
            return Err(StoreError::PayloadMismatch("add"));
        };
        Ok(CounterPatch {
            count: Some(curr.count + amount),
            ..Default::default()
        })
    }

    fn rename(_: &Counter, action: CounterAction) -> DispatchResult<CounterPatch> {
        let CounterAction::Rename { label } = action else {
            return Err(StoreError::PayloadMismatch("rename"));
        };
        Ok(CounterPatch {
            label: Some(Arc::new(label)),
            ..Default::default()
        })
    }

    fn reset(_: &Counter, _: CounterAction) -> DispatchResult<CounterPatch> {
        Ok(CounterPatch {
            count: Some(0),
            ..Default::default()
        })
    }

    type R = crate::dispatchers::Reducer<Counter, CounterAction>;

    fn store() -> DispatchingStore<Counter, CounterAction> {
        let dispatchers = Dispatchers::from_table([
            ("add", add as R),
            ("rename", rename as R),
            ("reset", reset as R),
        ])
        .unwrap();
        DispatchingStore::new(
            Counter {
                count: 0,
                label: Arc::new("counter".to_string()),
            },
            dispatchers,
        )
    }

    #[test]
    fn test_dispatch_merges_patch_shallowly() {
        let mut store = store();
        let before = store.value();

        let after = store.dispatch(CounterAction::Add { amount: 5 }).unwrap();

        assert_eq!(after.count, 5);
        assert!(Arc::ptr_eq(&before.label, &after.label));
        assert_eq!(store.value().count, 5);
    }

    #[test]
    fn test_unknown_dispatcher_fails_loudly() {
        let mut store = store();
        let err = store.dispatch(CounterAction::Unregistered).unwrap_err();
        assert!(matches!(err, StoreError::UnknownDispatcher(name) if name == "unregistered"));
        assert_eq!(store.value().count, 0);
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let result = Dispatchers::<Counter, CounterAction>::from_table([
            ("add", add as R),
            ("add", add as R),
        ]);
        assert!(matches!(result, Err(StoreError::DuplicateDispatcher("add"))));
    }

    #[test]
    fn test_mismatched_reducer_reports_payload_mismatch() {
        let dispatchers =
            Dispatchers::<Counter, CounterAction>::from_table([("reset", add as R)]).unwrap();
        let mut store = DispatchingStore::new(
            Counter {
                count: 1,
                label: Arc::new(String::new()),
            },
            dispatchers,
        );
        let err = store.dispatch(CounterAction::Reset).unwrap_err();
        assert!(matches!(err, StoreError::PayloadMismatch("add")));
    }

    #[test]
    fn test_subject_emits_current_then_once_per_dispatch() {
        let mut store = store();
        store.dispatch(CounterAction::Add { amount: 1 }).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = store
            .subject()
            .subscribe(move |state: &Arc<Counter>| sink.lock().unwrap().push(state.count));

        store.dispatch(CounterAction::Add { amount: 2 }).unwrap();
        store.dispatch(CounterAction::Reset).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![1, 3, 0]);
    }

    #[test]
    fn test_select_does_not_emit_for_untouched_slice() {
        let mut store = store();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = store
            .select(|state| Arc::clone(&state.label))
            .subscribe(move |label: &Arc<String>| sink.lock().unwrap().push(label.to_string()));

        store.dispatch(CounterAction::Add { amount: 1 }).unwrap();
        assert_eq!(seen.lock().unwrap().len(), 1);

        store
            .dispatch(CounterAction::Rename {
                label: "renamed".to_string(),
            })
            .unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["counter", "renamed"]);
    }

    #[test]
    fn test_dispatch_named_decodes_payload() {
        let mut store = store();
        store.dispatch_named("add", json!({ "amount": 7 })).unwrap();
        store.dispatch_named("reset", json!({})).unwrap();
        store.dispatch_named("add", json!({ "amount": 2 })).unwrap();
        assert_eq!(store.value().count, 2);
    }

    #[test]
    fn test_decode_named_leaves_state_alone() {
        let store = store();
        let action = store.decode_named("add", json!({ "amount": 3 })).unwrap();
        assert!(matches!(action, CounterAction::Add { amount: 3 }));
        assert_eq!(store.value().count, 0);
    }

    #[test]
    fn test_dispatch_named_checks_name_before_payload() {
        let mut store = store();
        let err = store.dispatch_named("ad", json!({ "amount": 7 })).unwrap_err();
        assert!(matches!(err, StoreError::UnknownDispatcher(_)));

        let err = store.dispatch_named("add", json!({ "amount": "x" })).unwrap_err();
        assert!(matches!(err, StoreError::MalformedPayload { .. }));
    }
}
