//! Network facade: one named sub-graph inside a composite model.
//!
//! A network owns its node registry and exposes the inter-network topology
//! derived from node-level links. It mediates between the public modeling API
//! and the engine handle backing it; name and description live on the engine
//! side, identity management lives here.

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;
use std::{
    cmp::Ordering,
    fmt::{Display, Formatter},
    sync::{Arc, Weak},
};

use crate::{
    engine::EngineNetwork,
    error::ReteError,
    ident::{EntityKind, Id, Identifiable},
    model::Model,
    node::{Link, Node, NodeKind},
    registry::IdRegistry,
    spec::NodeSpec,
};

/// A named sub-graph of a composite [`Model`].
///
/// Equality is structural: two `Network` values are equal iff they wrap the
/// same engine handle. Ids are mutable, so never use them for identity; use
/// [`Network::cmp_by_id`] when value ordering by the current Id is wanted.
#[derive(Debug)]
pub struct Network {
    self_ref: Weak<Network>,
    model: Weak<Model>,
    logic: RwLock<Arc<EngineNetwork>>,
    nodes: IdRegistry<Arc<Node>>,
}

impl Network {
    /// Factory run inside the model's reserve-then-create protocol. Creates
    /// the engine-side network and assigns its connection id.
    pub(crate) fn create(model: &Arc<Model>, id: &Id, name: &str) -> Result<Arc<Network>, ReteError> {
        let logic = model.engine().add_network(name, "")?;
        logic.set_conn_id(id.clone());
        Ok(Arc::new_cyclic(|self_ref| Network {
            self_ref: self_ref.clone(),
            model: Arc::downgrade(model),
            logic: RwLock::new(logic),
            nodes: IdRegistry::new(EntityKind::Node, model.mutation_lock().clone()),
        }))
    }

    /// A strong handle to this network. Fails only if the last external
    /// `Arc` has already been given up.
    fn self_arc(&self) -> Result<Arc<Network>, ReteError> {
        self.self_ref.upgrade().ok_or_else(|| {
            ReteError::Engine(format!("network `{}` handle is detached", self.id()))
        })
    }

    /// The owning model, or `None` if it has been dropped.
    pub fn model(&self) -> Option<Arc<Model>> {
        self.model.upgrade()
    }

    /// The engine handle backing this network. Driving the engine directly is
    /// unsafe with respect to the invariants this crate maintains.
    pub fn logic(&self) -> Arc<EngineNetwork> {
        self.logic.read().clone()
    }

    /// Structural identity: same underlying engine network.
    pub fn same_network(&self, other: &Network) -> bool {
        Arc::ptr_eq(&self.logic(), &other.logic())
    }

    /// Re-attach this facade to an engine handle, e.g. when wrapping a model
    /// loaded engine-side. The handle must already carry this network's id; a
    /// mismatch is a programming fault and aborts.
    pub fn attach_logic(&self, logic: Arc<EngineNetwork>) {
        let current = self.id();
        let incoming = logic.conn_id();
        assert!(
            current == incoming,
            "engine network id mismatch: `{current}` vs `{incoming}`"
        );
        *self.logic.write() = logic;
    }

    pub fn id(&self) -> Id {
        self.logic().conn_id()
    }

    /// Rename this network. Goes through the model's registry so the old and
    /// new Ids stay consistent under the model-wide mutation lock.
    pub fn set_id(&self, id: Id) -> Result<(), ReteError> {
        let model = self.model().ok_or_else(|| {
            ReteError::Engine(format!(
                "network `{}` is detached from its model",
                self.id()
            ))
        })?;
        model.change_network_id(&self.self_arc()?, id)
    }

    pub fn name(&self) -> String {
        self.logic().name()
    }

    pub fn set_name(&self, name: &str) {
        self.logic().set_name(name);
    }

    pub fn description(&self) -> String {
        self.logic().description()
    }

    pub fn set_description(&self, description: &str) {
        self.logic().set_description(description);
    }

    /// Value ordering by current Id; each side takes its own entity lock.
    pub fn cmp_by_id(&self, other: &Network) -> Ordering {
        self.id().cmp(&other.id())
    }

    /// Create a node in this network via the reserve-then-create protocol.
    pub fn create_node(
        &self,
        id: &Id,
        name: &str,
        kind: NodeKind,
    ) -> Result<Arc<Node>, ReteError> {
        let network = self.self_arc()?;
        self.nodes
            .reserve_and_create(id, || Node::create(&network, id, name, kind))
    }

    /// Create a node whose name defaults to its id.
    pub fn create_node_with_id(&self, id: &Id, kind: NodeKind) -> Result<Arc<Node>, ReteError> {
        self.create_node(id, id.as_str(), kind)
    }

    /// Create a node from a structured specification. Shape failures are
    /// surfaced as [`ReteError::Spec`] with the parse cause attached.
    pub fn create_node_from_spec(&self, spec: &Value) -> Result<Arc<Node>, ReteError> {
        let spec: NodeSpec = serde_json::from_value(spec.clone())
            .map_err(|src| ReteError::Spec(format!("invalid node specification: {src}")))?;
        self.create_node_from_record(&spec)
    }

    pub(crate) fn create_node_from_record(
        &self,
        spec: &NodeSpec,
    ) -> Result<Arc<Node>, ReteError> {
        let id = Id::from(spec.id.as_str());
        let name = match &spec.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => spec.id.clone(),
        };
        self.create_node(&id, &name, spec.kind)
    }

    /// O(1) lookup. Absence is not an error.
    pub fn get_node(&self, id: &Id) -> Option<Arc<Node>> {
        self.nodes.get(id)
    }

    /// Defensive, insertion-ordered snapshot of this network's nodes.
    pub fn nodes(&self) -> IndexMap<Id, Arc<Node>> {
        self.nodes.snapshot()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn change_node_id(&self, node: &Arc<Node>, new_id: Id) -> Result<(), ReteError> {
        self.nodes.change_id(node, new_id)
    }

    /// Typed-lookup capability: this network's registry manages
    /// [`EntityKind::Node`] entries only.
    pub fn id_map(&self, kind: EntityKind) -> Result<IndexMap<Id, Arc<Node>>, ReteError> {
        self.nodes.entries(kind)
    }

    /// Networks with a link into this one. Derived fresh on every call from
    /// live node links: a view, not cached state. Deduplicated by structural
    /// identity, discovery-ordered, never contains `self`.
    pub fn parents(&self) -> Vec<Arc<Network>> {
        self.neighbours(true)
    }

    /// Networks this one links into. Same derivation as [`Network::parents`],
    /// scanning outgoing links instead.
    pub fn children(&self) -> Vec<Arc<Network>> {
        self.neighbours(false)
    }

    fn neighbours(&self, incoming: bool) -> Vec<Arc<Network>> {
        let mut nets: Vec<Arc<Network>> = Vec::new();
        for node in self.nodes.snapshot().values() {
            let links = if incoming {
                node.links_in()
            } else {
                node.links_out()
            };
            for link in links {
                let endpoint = if incoming {
                    link.from_node()
                } else {
                    link.to_node()
                };
                let Some(net) = endpoint.and_then(|node| node.network()) else {
                    tracing::warn!(
                        network = %self.id(),
                        "skipping dangling link endpoint during topology scan"
                    );
                    continue;
                };
                if net.same_network(self) {
                    continue;
                }
                if !nets.iter().any(|known| known.same_network(&net)) {
                    nets.push(net);
                }
            }
        }
        nets
    }

    /// Defensive copy of the cross-network links entering this network.
    pub fn links_in(&self) -> Vec<Arc<Link>> {
        self.nodes
            .snapshot()
            .values()
            .flat_map(|node| node.links_in())
            .filter(|link| link.is_cross_network())
            .collect()
    }

    /// Defensive copy of the cross-network links leaving this network.
    pub fn links_out(&self) -> Vec<Arc<Link>> {
        self.nodes
            .snapshot()
            .values()
            .flat_map(|node| node.links_out())
            .filter(|link| link.is_cross_network())
            .collect()
    }

    /// Remove every cross-network link between this network and `other`, in
    /// both directions, and drop any cached message passes for the pair.
    ///
    /// Returns `false` without mutating anything when `other` is the same
    /// underlying engine network. Links to third networks are untouched;
    /// parallel links between the pair are all severed.
    pub fn unlink(&self, other: &Network) -> bool {
        if self.same_network(other) {
            return false;
        }
        let Some(model) = self.model() else {
            tracing::warn!(network = %self.id(), "unlink on a network detached from its model");
            return false;
        };
        let engine = model.engine();
        engine.invalidate_message_passes(&self.logic(), &other.logic());
        engine.invalidate_message_passes(&other.logic(), &self.logic());

        let mut severed = 0usize;
        for node in self.nodes.snapshot().values() {
            for link in node.links_out().into_iter().chain(node.links_in()) {
                if !link.is_cross_network() {
                    continue;
                }
                let (Some(from), Some(to)) = (link.from_node(), link.to_node()) else {
                    continue;
                };
                let (Some(from_net), Some(to_net)) = (from.network(), to.network()) else {
                    continue;
                };
                let incoming = from_net.same_network(other) && to_net.same_network(self);
                let outgoing = from_net.same_network(self) && to_net.same_network(other);
                if incoming || outgoing {
                    Link::sever(&link);
                    severed += 1;
                }
            }
        }
        tracing::debug!(
            from = %self.id(),
            to = %other.id(),
            severed,
            "severed cross-network links"
        );
        true
    }
}

impl Identifiable for Arc<Network> {
    fn id(&self) -> Id {
        self.as_ref().id()
    }

    fn assign_id(&self, id: Id) {
        self.logic().set_conn_id(id);
    }

    fn same_entity(&self, other: &Self) -> bool {
        self.same_network(other)
    }
}

impl PartialEq for Network {
    fn eq(&self, other: &Network) -> bool {
        self.same_network(other)
    }
}

impl Eq for Network {}

impl Display for Network {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "`{}`", self.id())
    }
}
