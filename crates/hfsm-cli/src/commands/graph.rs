//! Graph command: Graphviz export of a set's states.

use std::path::Path;

use anyhow::Result;
use tracing::info;

use hfsm_core::StateGraph;

use super::load_set;

pub fn dot(set: &Path, catalog: &Path) -> Result<String> {
    let loaded = load_set(set, catalog)?;
    let graph = StateGraph::from_set(&loaded.set);
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "state_graph_built"
    );
    Ok(graph.to_dot())
}
