use thiserror::Error;

/// Errors raised by the dispatch path
///
/// All of these are programming errors (caller and store disagree about the
/// dispatcher table or a payload contract). They are returned, never swallowed.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown dispatcher: {0}")]
    UnknownDispatcher(String),

    #[error("dispatcher registered twice: {0}")]
    DuplicateDispatcher(&'static str),

    /// The registry routed an action to a reducer written for another action
    #[error("payload does not match dispatcher {0}")]
    PayloadMismatch(&'static str),

    #[error("malformed payload for dispatcher {dispatcher}: {source}")]
    MalformedPayload {
        dispatcher: String,
        #[source]
        source: serde_json::Error,
    },

    /// The reducer refused a payload that would violate a store invariant
    #[error("dispatcher {dispatcher} rejected the payload: {reason}")]
    Rejected {
        dispatcher: &'static str,
        reason: String,
    },
}

impl StoreError {
    pub fn rejected(dispatcher: &'static str, reason: impl Into<String>) -> Self {
        Self::Rejected {
            dispatcher,
            reason: reason.into(),
        }
    }
}

pub type DispatchResult<P> = Result<P, StoreError>;
