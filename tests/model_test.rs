//! Concurrency and end-to-end properties of the identifier space.

use std::{
    sync::atomic::{AtomicUsize, Ordering},
    thread,
};

use rete_core::{
    ident::{EntityKind, Id},
    model::Model,
    node::{Node, NodeKind},
    ReteError,
};

#[test_log::test]
fn concurrent_creation_of_distinct_ids() {
    let model = Model::in_memory();
    let network = model
        .create_network_with_id(&Id::from("net"))
        .expect("create network");

    thread::scope(|scope| {
        for worker in 0..10 {
            let network = &network;
            scope.spawn(move || {
                for i in 0..10 {
                    let id = Id::from(format!("n{worker}_{i}"));
                    network
                        .create_node_with_id(&id, NodeKind::Boolean)
                        .expect("distinct ids must all succeed");
                }
            });
        }
    });

    assert_eq!(network.node_count(), 100);
    let listing = network.nodes();
    assert_eq!(listing.len(), 100, "listing must expose committed slots only");
    for worker in 0..10 {
        for i in 0..10 {
            let id = Id::from(format!("n{worker}_{i}"));
            assert!(
                network.get_node(&id).is_some(),
                "node `{id}` lost after concurrent creation"
            );
        }
    }
}

#[test_log::test]
fn contended_creation_has_exactly_one_winner_per_id() {
    let model = Model::in_memory();
    let network = model
        .create_network_with_id(&Id::from("net"))
        .expect("create network");
    let successes = AtomicUsize::new(0);

    thread::scope(|scope| {
        for _ in 0..10 {
            let network = &network;
            let successes = &successes;
            scope.spawn(move || {
                for i in 0..100 {
                    let id = Id::from(format!("n{i}"));
                    match network.create_node_with_id(&id, NodeKind::Boolean) {
                        Ok(_) => {
                            successes.fetch_add(1, Ordering::Relaxed);
                        }
                        Err(ReteError::DuplicateId { id: dup }) => {
                            assert_eq!(dup, id);
                        }
                        Err(other) => panic!("unexpected failure kind: {other:?}"),
                    }
                }
            });
        }
    });

    assert_eq!(successes.load(Ordering::Relaxed), 100);
    assert_eq!(network.node_count(), 100, "leaked or lost registry slots");
    for i in 0..100 {
        assert!(
            network.get_node(&Id::from(format!("n{i}"))).is_some(),
            "id n{i} has no committed entry"
        );
    }
}

#[test]
fn concurrent_renames_serialize_on_the_shared_lock() {
    let model = Model::in_memory();
    let network = model
        .create_network_with_id(&Id::from("net"))
        .expect("create network");
    let nodes: Vec<_> = (0..10)
        .map(|i| {
            network
                .create_node_with_id(&Id::from(format!("n{i}")), NodeKind::Boolean)
                .expect("create node")
        })
        .collect();

    thread::scope(|scope| {
        for (i, node) in nodes.iter().enumerate() {
            scope.spawn(move || {
                node.set_id(Id::from(format!("renamed{i}")))
                    .expect("disjoint renames must all succeed");
            });
        }
    });

    assert_eq!(network.node_count(), 10);
    for (i, node) in nodes.iter().enumerate() {
        assert_eq!(node.id(), Id::from(format!("renamed{i}")));
        assert!(network.get_node(&Id::from(format!("n{i}"))).is_none());
    }
}

#[test]
fn cross_model_scoping_of_identifiers() {
    // Ids are unique within their scope, not globally.
    let model = Model::in_memory();
    let a = model.create_network_with_id(&Id::from("a")).expect("a");
    let b = model.create_network_with_id(&Id::from("b")).expect("b");
    a.create_node_with_id(&Id::from("n"), NodeKind::Boolean)
        .expect("n in a");
    b.create_node_with_id(&Id::from("n"), NodeKind::Boolean)
        .expect("same node id in a sibling network is fine");

    let other_model = Model::in_memory();
    other_model
        .create_network_with_id(&Id::from("a"))
        .expect("same network id in an unrelated model is fine");
}

#[test]
fn typed_lookup_capability_at_both_levels() {
    let model = Model::in_memory();
    let network = model
        .create_network_with_id(&Id::from("net"))
        .expect("create network");
    network
        .create_node_with_id(&Id::from("n"), NodeKind::Boolean)
        .expect("create node");

    assert_eq!(model.id_map(EntityKind::Network).expect("networks").len(), 1);
    assert_eq!(network.id_map(EntityKind::Node).expect("nodes").len(), 1);
    assert!(matches!(
        model.id_map(EntityKind::Node),
        Err(ReteError::InvalidType(_))
    ));
    assert!(matches!(
        network.id_map(EntityKind::Network),
        Err(ReteError::InvalidType(_))
    ));
}

#[test]
fn end_to_end_topology_lifecycle() {
    let model = Model::in_memory();
    let a = model.create_network(&Id::from("a"), "A").expect("a");
    let b = model.create_network(&Id::from("b"), "B").expect("b");

    let a1 = a
        .create_node(&Id::from("a1"), "A1", NodeKind::Boolean)
        .expect("a1");
    let b1 = b
        .create_node(&Id::from("b1"), "B1", NodeKind::Ranked)
        .expect("b1");
    Node::link(&a1, &b1).expect("link a1 -> b1");
    Node::link(&a1, &b1).expect("parallel link a1 -> b1");

    assert_eq!(a1.links_out().len(), 2);
    assert_eq!(a.children().len(), 1, "parallel links must not duplicate neighbours");

    assert!(a.unlink(&b));
    assert!(a1.links_out().is_empty(), "parallel links must all be severed");
    assert!(b1.links_in().is_empty());
    assert!(a.children().is_empty());
    assert!(b.parents().is_empty());
}
