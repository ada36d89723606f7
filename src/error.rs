use thiserror::Error;

use crate::persist::PersistError;

/// Error type for store engine operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A `set` partial (or the slice state itself) was not a JSON object.
    #[error("store {store} expected an object, got {kind}")]
    NotAnObject { store: String, kind: &'static str },
    /// State could not be converted to or from its JSON form.
    #[error("store {store} serialization error: {message}")]
    Serde { store: String, message: String },
    /// Persistence failed. Only surfaced by explicit calls; mutations swallow it.
    #[error(transparent)]
    Persist(#[from] PersistError),
}

impl StoreError {
    pub(crate) fn serde(store: &str, err: impl std::fmt::Display) -> Self {
        StoreError::Serde {
            store: store.to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn not_an_object(store: &str, value: &serde_json::Value) -> Self {
        let kind = match value {
            serde_json::Value::Null => "null",
            serde_json::Value::Bool(_) => "bool",
            serde_json::Value::Number(_) => "number",
            serde_json::Value::String(_) => "string",
            serde_json::Value::Array(_) => "array",
            serde_json::Value::Object(_) => "object",
        };
        StoreError::NotAnObject {
            store: store.to_string(),
            kind,
        }
    }
}

/// Error returned by listeners. Logged by the engine, never propagated.
pub type ListenerError = Box<dyn std::error::Error + Send + Sync>;
