//! Dispatcher registry
//!
//! Maps a dispatcher name to the reducer that handles it. Reducers are plain
//! `fn` pointers, so they cannot capture state and stay pure: the only thing
//! they can affect is the patch they return.

use std::collections::HashMap;
use std::fmt;

use crate::error::{DispatchResult, StoreError};
use crate::store::StoreState;

/// Pure reduction: current state plus payload to a partial state
pub type Reducer<S, A> = fn(&S, A) -> DispatchResult<<S as StoreState>::Patch>;

pub struct Dispatchers<S: StoreState, A> {
    table: HashMap<&'static str, Reducer<S, A>>,
}

impl<S: StoreState, A> Dispatchers<S, A> {
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Build a registry from a table of `(name, reducer)` entries
    pub fn from_table(
        entries: impl IntoIterator<Item = (&'static str, Reducer<S, A>)>,
    ) -> DispatchResult<Self> {
        let mut dispatchers = Self::new();
        for (name, reducer) in entries {
            dispatchers.register(name, reducer)?;
        }
        Ok(dispatchers)
    }

    pub fn register(&mut self, name: &'static str, reducer: Reducer<S, A>) -> DispatchResult<()> {
        if self.table.contains_key(name) {
            return Err(StoreError::DuplicateDispatcher(name));
        }
        self.table.insert(name, reducer);
        Ok(())
    }

    /// Look up a reducer, failing loudly on unknown names
    pub fn resolve(&self, name: &str) -> DispatchResult<Reducer<S, A>> {
        self.table
            .get(name)
            .copied()
            .ok_or_else(|| StoreError::UnknownDispatcher(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.table.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl<S: StoreState, A> Default for Dispatchers<S, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: StoreState, A> fmt::Debug for Dispatchers<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatchers")
            .field("names", &self.names())
            .finish()
    }
}
