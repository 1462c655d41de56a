use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;

use crate::ident::Id;

/// Failure kinds surfaced by identifier registries, entity factories and the
/// structured-specification loader.
///
/// Every variant is recoverable and caller-surfaced: nothing here is retried
/// internally, and a failed reserve-then-create always rolls its reservation
/// back so the Id stays available for another attempt. Invariant violations in
/// engine-internal state (e.g. a connection-id mismatch when re-attaching an
/// engine handle) are programming faults and panic instead of producing one of
/// these variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum ReteError {
    #[error("entity with id `{id}` already exists")]
    DuplicateId { id: Id },
    #[error("cannot change id to `{id}`: that id is already claimed")]
    IdExists { id: Id },
    #[error("cannot rename `{id}`: entity is not registered here under that id")]
    InvalidOldId { id: Id },
    #[error("reference not found: {0}")]
    ReferenceNotFound(String),
    #[error("failed to create `{id}`: {cause}")]
    CreationFailed { id: Id, cause: String },
    #[error("invalid entity kind requested: {0}")]
    InvalidType(String),
    #[error("computational engine error: {0}")]
    Engine(String),
    #[error("link error: {0}")]
    Link(String),
    #[error("specification error: {0}")]
    Spec(String),
}

impl From<JsonError> for ReteError {
    fn from(src: JsonError) -> ReteError {
        ReteError::Spec(format!("JSON specification error: {src}"))
    }
}
