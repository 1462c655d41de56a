//! Nodes and the directed links between them.
//!
//! A node is owned by exactly one network; links are owned by the pair of
//! nodes they connect and have no independent lifecycle; severing a link
//! detaches it from both endpoints and drops it. Links across networks are
//! the raw material the network-level topology queries are derived from.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    fmt::{Display, Formatter},
    str::FromStr,
    sync::{Arc, Weak},
};

use crate::{
    error::ReteError,
    ident::{Id, Identifiable},
    network::Network,
};

/// The state-space shape of a node, assigned at creation and immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Boolean,
    Labelled,
    Ranked,
    DiscreteReal,
    ContinuousInterval,
    IntegerInterval,
}

impl FromStr for NodeKind {
    type Err = ReteError;

    fn from_str(s: &str) -> Result<NodeKind, ReteError> {
        match s {
            "Boolean" => Ok(NodeKind::Boolean),
            "Labelled" => Ok(NodeKind::Labelled),
            "Ranked" => Ok(NodeKind::Ranked),
            "DiscreteReal" => Ok(NodeKind::DiscreteReal),
            "ContinuousInterval" => Ok(NodeKind::ContinuousInterval),
            "IntegerInterval" => Ok(NodeKind::IntegerInterval),
            other => Err(ReteError::Spec(format!("unknown node type `{other}`"))),
        }
    }
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NodeKind::Boolean => "Boolean",
            NodeKind::Labelled => "Labelled",
            NodeKind::Ranked => "Ranked",
            NodeKind::DiscreteReal => "DiscreteReal",
            NodeKind::ContinuousInterval => "ContinuousInterval",
            NodeKind::IntegerInterval => "IntegerInterval",
        };
        write!(f, "{name}")
    }
}

/// A vertex owned by exactly one [`Network`].
#[derive(Debug)]
pub struct Node {
    self_ref: Weak<Node>,
    network: Weak<Network>,
    id: RwLock<Id>,
    name: RwLock<String>,
    kind: NodeKind,
    links_in: RwLock<Vec<Arc<Link>>>,
    links_out: RwLock<Vec<Arc<Link>>>,
}

impl Node {
    /// Factory run inside the owning network's reserve-then-create protocol.
    /// The engine call happens here, outside the mutation lock.
    pub(crate) fn create(
        network: &Arc<Network>,
        id: &Id,
        name: &str,
        kind: NodeKind,
    ) -> Result<Arc<Node>, ReteError> {
        let model = network.model().ok_or_else(|| {
            ReteError::Engine(format!(
                "network `{}` is detached from its model",
                network.id()
            ))
        })?;
        model.engine().add_node(&network.logic(), id)?;
        Ok(Arc::new_cyclic(|self_ref| Node {
            self_ref: self_ref.clone(),
            network: Arc::downgrade(network),
            id: RwLock::new(id.clone()),
            name: RwLock::new(name.to_string()),
            kind,
            links_in: RwLock::new(Vec::new()),
            links_out: RwLock::new(Vec::new()),
        }))
    }

    /// A strong handle to this node. Fails only if the last external `Arc`
    /// has already been given up.
    fn self_arc(&self) -> Result<Arc<Node>, ReteError> {
        self.self_ref.upgrade().ok_or_else(|| {
            ReteError::Engine(format!("node `{}` handle is detached", self.id()))
        })
    }

    /// The owning network, or `None` if it has been dropped.
    pub fn network(&self) -> Option<Arc<Network>> {
        self.network.upgrade()
    }

    pub fn id(&self) -> Id {
        self.id.read().clone()
    }

    /// Rename this node. Goes through the owning network's registry so the
    /// old/new Ids stay consistent under the model-wide mutation lock.
    pub fn set_id(&self, id: Id) -> Result<(), ReteError> {
        let network = self.network().ok_or_else(|| {
            ReteError::Engine(format!("node `{}` is detached from its network", self.id()))
        })?;
        network.change_node_id(&self.self_arc()?, id)
    }

    pub fn name(&self) -> String {
        self.name.read().clone()
    }

    pub fn set_name(&self, name: &str) {
        *self.name.write() = name.to_string();
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Defensive copy of the incoming links.
    pub fn links_in(&self) -> Vec<Arc<Link>> {
        self.links_in.read().clone()
    }

    /// Defensive copy of the outgoing links.
    pub fn links_out(&self) -> Vec<Arc<Link>> {
        self.links_out.read().clone()
    }

    /// Value ordering by current Id. Each side takes its own id lock so a
    /// concurrent rename cannot produce an inconsistent comparison.
    pub fn cmp_by_id(&self, other: &Node) -> Ordering {
        self.id().cmp(&other.id())
    }

    /// Create a directed link `parent → child`. The link is cross-network iff
    /// the endpoints belong to different networks. Parallel links between the
    /// same pair are permitted; self-links are not.
    pub fn link(parent: &Arc<Node>, child: &Arc<Node>) -> Result<Arc<Link>, ReteError> {
        if Arc::ptr_eq(parent, child) {
            return Err(ReteError::Link(format!(
                "cannot link node `{}` to itself",
                parent.id()
            )));
        }
        let (Some(parent_net), Some(child_net)) = (parent.network(), child.network()) else {
            return Err(ReteError::Link(format!(
                "cannot link `{}` and `{}`: one endpoint is detached from its network",
                parent.id(),
                child.id()
            )));
        };
        let link = Arc::new(Link {
            from: Arc::downgrade(parent),
            to: Arc::downgrade(child),
            cross_network: !parent_net.same_network(&child_net),
        });
        parent.links_out.write().push(link.clone());
        child.links_in.write().push(link.clone());
        Ok(link)
    }

    /// Sever every link between `a` and `b`, in both directions. Parallel
    /// links are all removed. Links to third nodes are untouched.
    pub fn unlink_nodes(a: &Arc<Node>, b: &Arc<Node>) {
        for link in a.links_out() {
            if link.to.upgrade().is_some_and(|to| Arc::ptr_eq(&to, b)) {
                Link::sever(&link);
            }
        }
        for link in a.links_in() {
            if link.from.upgrade().is_some_and(|from| Arc::ptr_eq(&from, b)) {
                Link::sever(&link);
            }
        }
    }
}

impl Identifiable for Arc<Node> {
    fn id(&self) -> Id {
        self.as_ref().id()
    }

    fn assign_id(&self, id: Id) {
        *self.as_ref().id.write() = id;
    }

    fn same_entity(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.network() {
            Some(network) => write!(f, "`{}`.`{}`", network.id(), self.id()),
            None => write!(f, "`{}`", self.id()),
        }
    }
}

/// A directed edge between two nodes, possibly across networks. Endpoint
/// references and the cross-network flag are immutable after construction, so
/// unlocked topology reads never observe a torn link.
#[derive(Debug)]
pub struct Link {
    from: Weak<Node>,
    to: Weak<Node>,
    cross_network: bool,
}

impl Link {
    pub fn from_node(&self) -> Option<Arc<Node>> {
        self.from.upgrade()
    }

    pub fn to_node(&self) -> Option<Arc<Node>> {
        self.to.upgrade()
    }

    pub fn is_cross_network(&self) -> bool {
        self.cross_network
    }

    /// Detach this exact link from both endpoints. Idempotent.
    pub(crate) fn sever(link: &Arc<Link>) {
        if let Some(from) = link.from.upgrade() {
            from.links_out.write().retain(|l| !Arc::ptr_eq(l, link));
        }
        if let Some(to) = link.to.upgrade() {
            to.links_in.write().retain(|l| !Arc::ptr_eq(l, link));
        }
    }
}
