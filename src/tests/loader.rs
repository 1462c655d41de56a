//! Tests for building networks and nodes from structured specifications.

use serde_json::json;

use crate::{error::ReteError, ident::Id, model::Model, node::NodeKind};

#[test]
fn network_built_from_specification() {
    let model = Model::in_memory();
    let spec = json!({
        "id": "weather",
        "name": "Weather",
        "description": "Rainfall model",
        "nodes": [
            { "id": "rain", "type": "Boolean" },
            { "id": "cloud", "name": "Cloud cover", "type": "Ranked" },
        ],
        "links": [
            { "parent": "cloud", "child": "rain" },
        ],
    });

    let network = model
        .create_network_from_spec(&spec)
        .expect("spec should load");
    assert_eq!(network.id(), Id::from("weather"));
    assert_eq!(network.name(), "Weather");
    assert_eq!(network.description(), "Rainfall model");
    assert_eq!(network.node_count(), 2);

    let rain = network.get_node(&Id::from("rain")).expect("rain exists");
    assert_eq!(rain.kind(), NodeKind::Boolean);
    assert_eq!(rain.name(), "rain", "node name should default to its id");
    let cloud = network.get_node(&Id::from("cloud")).expect("cloud exists");
    assert_eq!(cloud.name(), "Cloud cover");

    assert_eq!(rain.links_in().len(), 1);
    assert_eq!(cloud.links_out().len(), 1);
    assert!(
        !cloud.links_out()[0].is_cross_network(),
        "spec links are intra-network"
    );
}

#[test]
fn empty_name_defaults_to_id() {
    let model = Model::in_memory();
    let network = model
        .create_network_from_spec(&json!({ "id": "net1", "name": "" }))
        .expect("spec should load");
    assert_eq!(network.name(), "net1");
}

#[test]
fn missing_link_endpoint_is_reference_not_found() {
    let model = Model::in_memory();
    let spec = json!({
        "id": "net1",
        "nodes": [ { "id": "a", "type": "Boolean" } ],
        "links": [ { "parent": "a", "child": "ghost" } ],
    });
    let err = model
        .create_network_from_spec(&spec)
        .expect_err("dangling endpoint must fail");
    match err {
        ReteError::ReferenceNotFound(msg) => {
            assert!(
                msg.contains("`net1`.`ghost`"),
                "message should name the offending ids: {msg}"
            );
        }
        other => panic!("expected ReferenceNotFound, got {other:?}"),
    }
}

#[test]
fn malformed_node_specification_is_wrapped_with_cause() {
    let model = Model::in_memory();
    let network = model
        .create_network_with_id(&Id::from("net1"))
        .expect("create network");

    // Missing required `type` field.
    let err = network
        .create_node_from_spec(&json!({ "id": "a" }))
        .expect_err("missing type must fail");
    match err {
        ReteError::Spec(msg) => {
            assert!(msg.contains("type"), "cause should be preserved: {msg}")
        }
        other => panic!("expected Spec, got {other:?}"),
    }

    // Unknown node type.
    let err = network
        .create_node_from_spec(&json!({ "id": "a", "type": "Quantum" }))
        .expect_err("unknown type must fail");
    assert!(matches!(err, ReteError::Spec(_)));
    assert_eq!(network.node_count(), 0, "failed specs must not register nodes");
}

#[test]
fn duplicate_node_in_spec_fails_creation() {
    let model = Model::in_memory();
    let spec = json!({
        "id": "net1",
        "nodes": [
            { "id": "a", "type": "Boolean" },
            { "id": "a", "type": "Ranked" },
        ],
    });
    let err = model
        .create_network_from_spec(&spec)
        .expect_err("duplicate node ids must fail");
    assert_eq!(err, ReteError::DuplicateId { id: Id::from("a") });
}
