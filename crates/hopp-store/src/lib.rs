//! Dispatcher-mediated state store
//!
//! This crate provides the engine the session stores are built on:
//!
//! ```text
//! caller ──dispatch(action)──▶ Dispatchers ──reducer(state, payload)──▶ patch
//!                                                                       │
//!   subscribers ◀──Observable (map / select / filter)◀── BehaviorSubject◀┘ merge
//! ```
//!
//! - [`DispatchingStore`] owns the state and is the only write path
//! - [`Dispatchers`] maps dispatcher names to pure reducers
//! - [`BehaviorSubject`] / [`Observable`] republish state values to readers
//!
//! # Example
//!
//! ```rust,ignore
//! let mut store = DispatchingStore::new(MyState::default(), my_dispatchers()?);
//! let _sub = store.select(|s| s.title.clone()).subscribe(|title| println!("{title}"));
//! store.dispatch(MyAction::SetTitle { title: "hello".into() })?;
//! ```

pub mod dispatchers;
pub mod error;
pub mod observable;
pub mod store;
pub mod subject;

pub use dispatchers::{Dispatchers, Reducer};
pub use error::{DispatchResult, StoreError};
pub use observable::Observable;
pub use store::{DispatchingStore, StoreAction, StoreState};
pub use subject::{BehaviorSubject, Subscription};
