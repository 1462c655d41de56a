//! The composite model: top-level container of networks.

use indexmap::IndexMap;
use serde_json::Value;
use std::sync::{Arc, Weak};

use crate::{
    engine::{GraphEngine, InMemoryEngine},
    error::ReteError,
    ident::{EntityKind, Id},
    network::Network,
    node::Node,
    registry::{IdRegistry, MutationLock},
    spec::NetworkSpec,
};

/// Top-level container holding networks and coordinating their identifier
/// space.
///
/// The model creates the [`MutationLock`] that serializes every registry
/// mutation under it, its own network registry and each network's node
/// registry share the one handle, so identifier changes anywhere in the model
/// are serialized relative to each other.
pub struct Model {
    self_ref: Weak<Model>,
    engine: Arc<dyn GraphEngine>,
    lock: MutationLock,
    networks: IdRegistry<Arc<Network>>,
}

impl Model {
    pub fn new(engine: Arc<dyn GraphEngine>) -> Arc<Model> {
        let lock = MutationLock::new();
        Arc::new_cyclic(|self_ref| Model {
            self_ref: self_ref.clone(),
            engine,
            networks: IdRegistry::new(EntityKind::Network, lock.clone()),
            lock,
        })
    }

    /// A strong handle to this model. Fails only if the last external `Arc`
    /// has already been given up.
    fn self_arc(&self) -> Result<Arc<Model>, ReteError> {
        self.self_ref
            .upgrade()
            .ok_or_else(|| ReteError::Engine("model handle is detached".to_string()))
    }

    /// A model backed by the default in-process engine.
    pub fn in_memory() -> Arc<Model> {
        Model::new(Arc::new(InMemoryEngine::new()))
    }

    pub fn engine(&self) -> &Arc<dyn GraphEngine> {
        &self.engine
    }

    pub(crate) fn mutation_lock(&self) -> &MutationLock {
        &self.lock
    }

    /// Create a network via the reserve-then-create protocol.
    pub fn create_network(&self, id: &Id, name: &str) -> Result<Arc<Network>, ReteError> {
        let model = self.self_arc()?;
        self.networks
            .reserve_and_create(id, || Network::create(&model, id, name))
    }

    /// Create a network whose name defaults to its id.
    pub fn create_network_with_id(&self, id: &Id) -> Result<Arc<Network>, ReteError> {
        self.create_network(id, id.as_str())
    }

    /// Build a network, its nodes and its intra-network links from a
    /// structured specification.
    ///
    /// An empty or missing name defaults to the id. A link endpoint that does
    /// not resolve to a created node fails with
    /// [`ReteError::ReferenceNotFound`] naming `network`.`node`.
    pub fn create_network_from_spec(&self, spec: &Value) -> Result<Arc<Network>, ReteError> {
        let spec: NetworkSpec = serde_json::from_value(spec.clone())
            .map_err(|src| ReteError::Spec(format!("invalid network specification: {src}")))?;
        let id = Id::from(spec.id.as_str());
        let name = match &spec.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => spec.id.clone(),
        };

        let network = self.create_network(&id, &name)?;
        if let Some(description) = &spec.description {
            network.set_description(description);
        }

        for node_spec in &spec.nodes {
            network.create_node_from_record(node_spec)?;
        }

        for link_spec in &spec.links {
            let parent = self.resolve_endpoint(&network, &link_spec.parent)?;
            let child = self.resolve_endpoint(&network, &link_spec.child)?;
            Node::link(&parent, &child).map_err(|src| {
                ReteError::Spec(format!(
                    "failed to link `{}` and `{}`: {src}",
                    link_spec.parent, link_spec.child
                ))
            })?;
        }

        Ok(network)
    }

    fn resolve_endpoint(
        &self,
        network: &Arc<Network>,
        node_id: &str,
    ) -> Result<Arc<Node>, ReteError> {
        network.get_node(&Id::from(node_id)).ok_or_else(|| {
            ReteError::ReferenceNotFound(format!("node `{}`.`{node_id}` not found", network.id()))
        })
    }

    /// O(1) lookup. Absence is not an error.
    pub fn get_network(&self, id: &Id) -> Option<Arc<Network>> {
        self.networks.get(id)
    }

    /// Defensive, insertion-ordered snapshot of this model's networks.
    pub fn networks(&self) -> IndexMap<Id, Arc<Network>> {
        self.networks.snapshot()
    }

    pub fn network_count(&self) -> usize {
        self.networks.len()
    }

    pub(crate) fn change_network_id(
        &self,
        network: &Arc<Network>,
        new_id: Id,
    ) -> Result<(), ReteError> {
        self.networks.change_id(network, new_id)
    }

    /// Typed-lookup capability: this model's registry manages
    /// [`EntityKind::Network`] entries only.
    pub fn id_map(&self, kind: EntityKind) -> Result<IndexMap<Id, Arc<Network>>, ReteError> {
        self.networks.entries(kind)
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("lock", &self.lock)
            .field("networks", &self.networks)
            .finish_non_exhaustive()
    }
}
