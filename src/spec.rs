//! Structured-specification records supplied by an external loader.
//!
//! Only the fields the core needs are extracted: identifiers, endpoint
//! references and the node type. Unknown fields are ignored; missing required
//! fields fail loudly through serde and are wrapped as
//! [`crate::ReteError::Spec`] with the cause attached.

use serde::{Deserialize, Serialize};

use crate::node::NodeKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub links: Vec<LinkSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: NodeKind,
}

/// An intra-network link: `parent → child`, both resolved within the network
/// being built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkSpec {
    pub parent: String,
    pub child: String,
}
