//! Session stores for the REST request editor
//!
//! - [`RestSessionStore`]: the request on screen, its response and test report
//! - [`TabSessionStore`]: the ordered list of open request tabs
//! - [`Workspace`]: owns both stores and keeps the active tab in step with
//!   the session
//! - [`FieldBinding`]: read/write controller over a single request field
//! - [`RequestRunner`] / [`ListSource`]: async collaborators driven from the
//!   workspace and the [`ListPoller`]

pub mod binding;
pub mod poller;
pub mod rest_session;
pub mod runner;
pub mod tab_session;
pub mod workspace;

pub use binding::FieldBinding;
pub use poller::{ListPoller, ListSource, PollerError};
pub use rest_session::{RestSession, RestSessionAction, RestSessionPatch, RestSessionStore};
pub use runner::{RequestRunner, RunError, RunOutcome};
pub use tab_session::{TabSession, TabSessionAction, TabSessionPatch, TabSessionStore};
pub use workspace::{StoreKind, Workspace};
