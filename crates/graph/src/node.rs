//! Nodes: the actors and subjects of recorded page activity.
//!
//! Node payloads are a closed enum rather than an open trait hierarchy,
//! so analysis code can match exhaustively instead of downcasting.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::graphml::{AttrKey, AttrValue};
use crate::types::{DomNodeId, EdgeId, GraphItemId, ScriptId};

/// What a node stands for, with its kind-specific payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// The HTML parser, stand-in actor when no script is executing.
    Parser,
    /// The content-blocking layer.
    Shields,
    /// Cookie storage.
    CookieJar,
    /// Local storage.
    LocalStorage,
    /// A DOM element, keyed by the host's DOM node id.
    HtmlElement {
        dom_node_id: DomNodeId,
        tag_name: String,
    },
    /// A DOM text node.
    HtmlText {
        dom_node_id: DomNodeId,
        text: String,
    },
    /// A script body the host compiled and ran.
    Script { script_id: ScriptId },
    /// A browser API entry point, keyed by method name.
    WebApi { method: String },
    /// A remote resource, keyed by URL.
    Resource { url: String },
}

impl NodeKind {
    /// Short type name used in item labels.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Parser => "Parser",
            Self::Shields => "Shields",
            Self::CookieJar => "CookieJar",
            Self::LocalStorage => "LocalStorage",
            Self::HtmlElement { .. } => "HtmlElement",
            Self::HtmlText { .. } => "HtmlText",
            Self::Script { .. } => "Script",
            Self::WebApi { .. } => "WebApi",
            Self::Resource { .. } => "Resource",
        }
    }

    /// Human-readable discriminator written to exports.
    pub fn descriptor(&self) -> &'static str {
        match self {
            Self::Parser => "parser",
            Self::Shields => "shields",
            Self::CookieJar => "cookie jar",
            Self::LocalStorage => "local storage",
            Self::HtmlElement { .. } => "HTML element",
            Self::HtmlText { .. } => "text node",
            Self::Script { .. } => "script",
            Self::WebApi { .. } => "web API",
            Self::Resource { .. } => "resource",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.descriptor())
    }
}

/// One node in the graph.
///
/// Adjacency lists are append-only and maintained by the owning graph:
/// an edge lands in its target's `in_edges` and its source's `out_edges`
/// at creation and is never moved or removed.
#[derive(Clone, Debug)]
pub struct Node {
    id: GraphItemId,
    kind: NodeKind,
    timestamp_micros: u64,
    in_edges: Vec<EdgeId>,
    out_edges: Vec<EdgeId>,
}

impl Node {
    pub(crate) fn new(id: GraphItemId, kind: NodeKind, timestamp_micros: u64) -> Self {
        Self {
            id,
            kind,
            timestamp_micros,
            in_edges: Vec::new(),
            out_edges: Vec::new(),
        }
    }

    pub fn id(&self) -> GraphItemId {
        self.id
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Microseconds since the owning graph was created.
    pub fn timestamp_micros(&self) -> u64 {
        self.timestamp_micros
    }

    /// Edges pointing at this node, in creation order.
    pub fn in_edges(&self) -> &[EdgeId] {
        &self.in_edges
    }

    /// Edges leaving this node, in creation order.
    pub fn out_edges(&self) -> &[EdgeId] {
        &self.out_edges
    }

    pub(crate) fn record_in_edge(&mut self, edge: EdgeId) {
        self.in_edges.push(edge);
    }

    pub(crate) fn record_out_edge(&mut self, edge: EdgeId) {
        self.out_edges.push(edge);
    }

    /// Stable label, e.g. `HtmlElement#5`.
    pub fn label(&self) -> String {
        format!("{}#{}", self.kind.type_name(), self.id)
    }

    /// Identifier used in export documents, e.g. `n5`.
    pub fn export_id(&self) -> String {
        format!("n{}", self.id)
    }

    /// The host DOM id, for the two DOM-backed kinds.
    pub fn dom_node_id(&self) -> Option<DomNodeId> {
        match &self.kind {
            NodeKind::HtmlElement { dom_node_id, .. } | NodeKind::HtmlText { dom_node_id, .. } => {
                Some(*dom_node_id)
            }
            _ => None,
        }
    }

    /// Typed export attributes for this node. Keys without a value for
    /// this kind are omitted rather than written empty.
    pub fn graphml_attributes(&self) -> Vec<(AttrKey, AttrValue)> {
        let mut attrs = vec![(
            AttrKey::NodeType,
            AttrValue::Str(self.kind.descriptor().to_owned()),
        )];
        match &self.kind {
            NodeKind::HtmlElement {
                dom_node_id,
                tag_name,
            } => {
                attrs.push((AttrKey::TagName, AttrValue::Str(tag_name.clone())));
                attrs.push((AttrKey::DomNodeId, AttrValue::Long(dom_node_id.0)));
            }
            NodeKind::HtmlText { dom_node_id, text } => {
                attrs.push((AttrKey::TextContent, AttrValue::Str(text.clone())));
                attrs.push((AttrKey::DomNodeId, AttrValue::Long(dom_node_id.0)));
            }
            NodeKind::Script { script_id } => {
                attrs.push((AttrKey::ScriptId, AttrValue::Long(script_id.0)));
            }
            NodeKind::WebApi { method } => {
                attrs.push((AttrKey::MethodName, AttrValue::Str(method.clone())));
            }
            NodeKind::Resource { url } => {
                attrs.push((AttrKey::Url, AttrValue::Str(url.clone())));
            }
            NodeKind::Parser | NodeKind::Shields | NodeKind::CookieJar | NodeKind::LocalStorage => {
            }
        }
        attrs.push((AttrKey::Timestamp, AttrValue::Long(self.timestamp_micros)));
        attrs
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
