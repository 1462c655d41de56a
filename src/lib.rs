//! # rete-core
//!
//! Identifier management and cross-network link topology for composite
//! probabilistic graph models.
//!
//! The name comes from "rete" - Latin for net.
//!
//! ## Overview
//!
//! A composite model holds multiple networks; each network holds nodes; nodes
//! are connected by directed links that may cross network boundaries. This
//! crate manages the identity and topology around an external computational
//! engine:
//!
//! - **Unique identifiers under concurrency**: node Ids are unique within
//!   their network and network Ids within their model, enforced by
//!   insertion-ordered registries whose mutations all serialize on one
//!   model-wide mutation lock. Creation is two-phase - reserve the Id, run
//!   the engine-calling factory outside the lock, commit or roll back - so a
//!   reserved-but-uncommitted slot is never observable and a failed creation
//!   never leaks its Id.
//! - **Derived topology**: parent/child relationships between networks are
//!   computed fresh from node-level links on every query, and the
//!   cross-network unlink protocol severs every link between a pair of
//!   networks while invalidating the engine's cached message passes in both
//!   directions.
//!
//! Probabilistic inference, table persistence and the engine's internal
//! algorithms are external collaborators reached through the narrow
//! [`engine::GraphEngine`] contract.
//!
//! ## Quick Start
//!
//! ```rust
//! use rete_core::{ident::Id, model::Model, node::{Node, NodeKind}};
//!
//! fn main() -> Result<(), rete_core::ReteError> {
//!     let model = Model::in_memory();
//!     let weather = model.create_network(&Id::from("weather"), "Weather")?;
//!     let crops = model.create_network(&Id::from("crops"), "Crops")?;
//!
//!     let rain = weather.create_node(&Id::from("rain"), "Rain", NodeKind::Boolean)?;
//!     let yield_ = crops.create_node(&Id::from("yield"), "Yield", NodeKind::Ranked)?;
//!     Node::link(&rain, &yield_)?;
//!
//!     assert_eq!(weather.children().len(), 1);
//!     assert!(weather.unlink(&crops));
//!     assert!(weather.children().is_empty());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Guide
//!
//! Start with [`model::Model`] for creating networks, then
//! [`network::Network`] for node containment and topology. [`registry`]
//! holds the reserve-then-create machinery; [`engine`] is the boundary to
//! the computational engine.

pub mod engine;
pub mod error;
pub mod ident;
pub mod model;
pub mod network;
pub mod node;
pub mod registry;
pub mod spec;
#[cfg(test)]
mod tests;

pub use error::*;
