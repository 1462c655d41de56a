//! Uniqueness-checked identifier registries.
//!
//! All structural mutation of every registry belonging to one model (the
//! network registry and each network's node registry) serializes on a single
//! [`MutationLock`]. The lock is created by the model and passed explicitly
//! into each registry constructor, so the shared domain is visible at every
//! call site rather than living in an ambient global. Identifier collisions
//! can be checked across sibling containers during rename validation, which is
//! why the domain is model-wide and not per-container.

use indexmap::IndexMap;
use parking_lot::{Mutex, MutexGuard, RwLock};
use std::sync::Arc;

use crate::{
    error::ReteError,
    ident::{EntityKind, Id, Identifiable},
};

/// Cloneable handle to the single mutual-exclusion domain shared by every
/// registry in one model.
#[derive(Clone, Default)]
pub struct MutationLock(Arc<Mutex<()>>);

impl MutationLock {
    pub fn new() -> MutationLock {
        MutationLock::default()
    }

    fn acquire(&self) -> MutexGuard<'_, ()> {
        self.0.lock()
    }
}

impl std::fmt::Debug for MutationLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MutationLock({:p})", Arc::as_ptr(&self.0))
    }
}

/// A registry slot. A reserved slot claims its Id against duplicate creation
/// but is never observable as an entity: `get`, `snapshot` and `entries`
/// expose committed slots only.
#[derive(Debug, Clone)]
enum Slot<T> {
    Reserved,
    Committed(T),
}

/// Insertion-ordered map from unique [`Id`] to entity, with atomic
/// reserve-then-create-or-rollback semantics under the model-wide
/// [`MutationLock`].
#[derive(Debug)]
pub struct IdRegistry<T> {
    kind: EntityKind,
    lock: MutationLock,
    slots: RwLock<IndexMap<Id, Slot<T>>>,
}

impl<T: Identifiable + Clone> IdRegistry<T> {
    pub fn new(kind: EntityKind, lock: MutationLock) -> IdRegistry<T> {
        IdRegistry {
            kind,
            lock,
            slots: RwLock::new(IndexMap::new()),
        }
    }

    /// Two-phase creation: reserve the Id under the shared lock, run the
    /// (potentially expensive, engine-calling) factory with the lock
    /// released, then re-acquire briefly to commit, or roll the reservation
    /// back and surface the factory failure as
    /// [`ReteError::CreationFailed`] with the cause attached.
    ///
    /// Holding the lock across the factory would serialize every creation in
    /// the model on engine calls that may themselves touch shared state; the
    /// reservation gives atomicity of the claim without that.
    pub fn reserve_and_create<F>(&self, id: &Id, factory: F) -> Result<T, ReteError>
    where
        F: FnOnce() -> Result<T, ReteError>,
    {
        {
            let _domain = self.lock.acquire();
            let mut slots = self.slots.write();
            if slots.contains_key(id) {
                return Err(ReteError::DuplicateId { id: id.clone() });
            }
            slots.insert(id.clone(), Slot::Reserved);
        }

        match factory() {
            Ok(entity) => {
                let _domain = self.lock.acquire();
                self.slots
                    .write()
                    .insert(id.clone(), Slot::Committed(entity.clone()));
                tracing::debug!(kind = %self.kind, %id, "committed registry entry");
                Ok(entity)
            }
            Err(cause) => {
                let _domain = self.lock.acquire();
                self.slots.write().shift_remove(id);
                tracing::debug!(kind = %self.kind, %id, %cause, "rolled back reservation");
                Err(ReteError::CreationFailed {
                    id: id.clone(),
                    cause: cause.to_string(),
                })
            }
        }
    }

    /// Atomically re-key `entity` from its current Id to `new_id` and update
    /// the entity's own id field, under the shared lock.
    ///
    /// Fails with [`ReteError::IdExists`] if `new_id` is already claimed
    /// (reserved or committed), or [`ReteError::InvalidOldId`] if `entity` is
    /// not registered here under its current Id. On failure nothing changes.
    pub fn change_id(&self, entity: &T, new_id: Id) -> Result<(), ReteError> {
        let _domain = self.lock.acquire();
        let mut slots = self.slots.write();
        if slots.contains_key(&new_id) {
            return Err(ReteError::IdExists { id: new_id });
        }
        let old_id = entity.id();
        let registered = matches!(
            slots.get(&old_id),
            Some(Slot::Committed(existing)) if existing.same_entity(entity)
        );
        if !registered {
            return Err(ReteError::InvalidOldId { id: old_id });
        }
        slots.shift_remove(&old_id);
        slots.insert(new_id.clone(), Slot::Committed(entity.clone()));
        entity.assign_id(new_id);
        Ok(())
    }

    /// O(1) committed-entry lookup. Absence is not an error; callers decide
    /// whether it is fatal.
    pub fn get(&self, id: &Id) -> Option<T> {
        match self.slots.read().get(id) {
            Some(Slot::Committed(entity)) => Some(entity.clone()),
            _ => None,
        }
    }

    /// Defensive, insertion-ordered snapshot of committed entries. Later
    /// registry mutation is not observable through the returned map.
    pub fn snapshot(&self) -> IndexMap<Id, T> {
        self.slots
            .read()
            .iter()
            .filter_map(|(id, slot)| match slot {
                Slot::Committed(entity) => Some((id.clone(), entity.clone())),
                Slot::Reserved => None,
            })
            .collect()
    }

    /// Narrow typed-lookup capability: a snapshot of committed entries, but
    /// only for the entity kind this registry was declared to manage.
    pub fn entries(&self, kind: EntityKind) -> Result<IndexMap<Id, T>, ReteError> {
        if kind != self.kind {
            return Err(ReteError::InvalidType(format!(
                "this registry manages {} entities, not {kind}",
                self.kind
            )));
        }
        Ok(self.snapshot())
    }

    /// Number of committed entries. Reserved slots are invisible here too.
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .values()
            .filter(|slot| matches!(slot, Slot::Committed(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
