//! Flat serializable view of a graph.
//!
//! The snapshot is plain data built once from graph state, so it can be
//! handed to serde consumers without holding the graph. Records use the
//! same export ids and attribute keys as the GraphML document.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::graph::PageGraph;
use crate::graphml::{AttrKey, AttrValue};

/// Snapshot of the complete graph at one instant.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub captured_at: DateTime<Utc>,
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
}

/// One node, keyed the way export documents key it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    pub node_type: String,
    pub attributes: BTreeMap<String, String>,
}

/// One edge, with endpoints as node export ids.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub id: String,
    pub edge_type: String,
    pub source: String,
    pub target: String,
    pub attributes: BTreeMap<String, String>,
}

impl GraphSnapshot {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub(crate) fn snapshot_of(graph: &PageGraph) -> GraphSnapshot {
    let nodes = graph
        .nodes()
        .iter()
        .map(|node| NodeRecord {
            id: node.export_id(),
            node_type: node.kind().descriptor().to_owned(),
            attributes: attribute_map(&node.graphml_attributes(), AttrKey::NodeType),
        })
        .collect();
    let edges = graph
        .edges()
        .iter()
        .map(|edge| EdgeRecord {
            id: edge.export_id(),
            edge_type: edge.kind().descriptor().to_owned(),
            source: graph.node(edge.source()).export_id(),
            target: graph.node(edge.target()).export_id(),
            attributes: attribute_map(&edge.graphml_attributes(), AttrKey::EdgeType),
        })
        .collect();
    GraphSnapshot {
        captured_at: graph.captured_at(),
        nodes,
        edges,
    }
}

/// The type discriminator gets its own record field; everything else
/// lands in the map under its export key id.
fn attribute_map(
    attrs: &[(AttrKey, AttrValue)],
    discriminator: AttrKey,
) -> BTreeMap<String, String> {
    attrs
        .iter()
        .filter(|(key, _)| *key != discriminator)
        .map(|(key, value)| (key.key_id().to_owned(), value.render()))
        .collect()
}
