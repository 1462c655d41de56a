//! Boundary to the computational graph engine.
//!
//! The engine is an external, opaque collaborator: this crate only asks it to
//! create and identify the underlying graph objects and to drop cached
//! inter-network computation artifacts. Its algorithms are never inspected.

use parking_lot::{Mutex, RwLock};
use std::{
    collections::BTreeSet,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use crate::{error::ReteError, ident::Id};

/// Opaque per-network engine handle.
///
/// Pointer identity of the `Arc` wrapping this handle is the structural
/// identity of a [`crate::network::Network`]: two networks are the same
/// network iff they wrap the same handle, which matters because connection
/// ids are mutable.
#[derive(Debug)]
pub struct EngineNetwork {
    uid: u64,
    conn_id: RwLock<Id>,
    name: RwLock<String>,
    description: RwLock<String>,
}

impl EngineNetwork {
    fn new(uid: u64, name: &str, description: &str) -> EngineNetwork {
        EngineNetwork {
            uid,
            conn_id: RwLock::new(Id::from("")),
            name: RwLock::new(name.to_string()),
            description: RwLock::new(description.to_string()),
        }
    }

    /// Engine-internal identity, stable across renames.
    pub fn uid(&self) -> u64 {
        self.uid
    }

    pub fn conn_id(&self) -> Id {
        self.conn_id.read().clone()
    }

    pub fn set_conn_id(&self, id: Id) {
        *self.conn_id.write() = id;
    }

    pub fn name(&self) -> String {
        self.name.read().clone()
    }

    pub fn set_name(&self, name: &str) {
        *self.name.write() = name.to_string();
    }

    pub fn description(&self) -> String {
        self.description.read().clone()
    }

    pub fn set_description(&self, description: &str) {
        *self.description.write() = description.to_string();
    }
}

/// The narrow contract the core drives the engine through.
///
/// Engine calls may block indefinitely; no timeouts or retries are performed
/// here. Failures surface as [`ReteError::Engine`] and are wrapped into
/// [`ReteError::CreationFailed`] by the reserve-then-create protocol.
pub trait GraphEngine: Send + Sync {
    /// Create the engine-side network object. The connection id is assigned
    /// afterwards by the caller via [`EngineNetwork::set_conn_id`].
    fn add_network(&self, name: &str, description: &str) -> Result<Arc<EngineNetwork>, ReteError>;

    /// Create the engine-side vertex backing a node.
    fn add_node(&self, network: &Arc<EngineNetwork>, id: &Id) -> Result<(), ReteError>;

    /// Drop any cached message-passing artifacts for the ordered pair
    /// `(from, to)`. Caches are direction-sensitive; callers invalidate both
    /// directions.
    fn invalidate_message_passes(&self, from: &Arc<EngineNetwork>, to: &Arc<EngineNetwork>);
}

/// Default in-process engine.
///
/// Tracks created handles and a direction-sensitive message-pass cache so the
/// unlink protocol's invalidation step is observable from tests.
#[derive(Debug, Default)]
pub struct InMemoryEngine {
    next_uid: AtomicU64,
    networks: Mutex<Vec<Arc<EngineNetwork>>>,
    message_passes: Mutex<BTreeSet<(u64, u64)>>,
}

impl InMemoryEngine {
    pub fn new() -> InMemoryEngine {
        InMemoryEngine::default()
    }

    /// Seed a cached message pass for the ordered pair `(from, to)`.
    pub fn record_message_pass(&self, from: &Arc<EngineNetwork>, to: &Arc<EngineNetwork>) {
        self.message_passes.lock().insert((from.uid(), to.uid()));
    }

    pub fn has_message_passes(&self, from: &Arc<EngineNetwork>, to: &Arc<EngineNetwork>) -> bool {
        self.message_passes.lock().contains(&(from.uid(), to.uid()))
    }

    pub fn network_count(&self) -> usize {
        self.networks.lock().len()
    }
}

impl GraphEngine for InMemoryEngine {
    fn add_network(&self, name: &str, description: &str) -> Result<Arc<EngineNetwork>, ReteError> {
        let uid = self.next_uid.fetch_add(1, Ordering::Relaxed);
        let network = Arc::new(EngineNetwork::new(uid, name, description));
        self.networks.lock().push(network.clone());
        Ok(network)
    }

    fn add_node(&self, network: &Arc<EngineNetwork>, id: &Id) -> Result<(), ReteError> {
        if id.as_str().is_empty() {
            return Err(ReteError::Engine(format!(
                "network `{}` rejected node with empty id",
                network.conn_id()
            )));
        }
        Ok(())
    }

    fn invalidate_message_passes(&self, from: &Arc<EngineNetwork>, to: &Arc<EngineNetwork>) {
        self.message_passes.lock().remove(&(from.uid(), to.uid()));
    }
}
