//! Identifier value type and the capabilities registries require of the
//! entities they key.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Immutable string-backed identifier.
///
/// `Id` is the sole key type for every identifier registry in this crate:
/// networks within a model, nodes within a network. Equality, ordering and
/// hashing are all defined by the wrapped string, so two `Id` values are
/// interchangeable exactly when their strings are equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Id {
        Id(value.to_string())
    }
}

impl From<String> for Id {
    fn from(value: String) -> Id {
        Id(value)
    }
}

impl Display for Id {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kinds of entity an [`crate::registry::IdRegistry`] can be declared to
/// manage. Used by the narrow typed-lookup capability: a registry answers
/// queries only for its own kind and fails with
/// [`crate::ReteError::InvalidType`] for any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Network,
    Node,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Network => write!(f, "Network"),
            EntityKind::Node => write!(f, "Node"),
        }
    }
}

/// Capabilities a registry needs from its entries.
///
/// Ids are mutable (renaming is a first-class operation), so entity identity
/// cannot be the Id string. `same_entity` is structural identity: for the
/// `Arc`-backed entities in this crate, pointer identity of the underlying
/// allocation or engine handle.
pub trait Identifiable {
    /// The entity's current Id. Implementations take the entity's own lock so
    /// a concurrent rename never produces a torn read.
    fn id(&self) -> Id;

    /// Replace the entity's Id. Called only by
    /// [`crate::registry::IdRegistry::change_id`] while the shared mutation
    /// lock is held.
    fn assign_id(&self, id: Id);

    /// Structural identity, independent of the (mutable) Id.
    fn same_entity(&self, other: &Self) -> bool;
}
