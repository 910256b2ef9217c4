//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use archetype_graph::SpecTree;

pub const ECOLOGY: &str = include_str!("../fixtures/ecology.json");
pub const ECOLOGY_ARCHETYPE: &str = include_str!("../fixtures/ecology_archetype.json");
pub const MALFORMED_ARCHETYPE: &str = include_str!("../fixtures/malformed_archetype.json");
pub const ZOO: &str = include_str!("../fixtures/zoo.json");

/// Load a fixture tree.
pub fn tree(json: &str) -> SpecTree {
    SpecTree::from_json(json).expect("fixture should load")
}

/// Install a test-friendly tracing subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
