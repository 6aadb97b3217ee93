//! Edges: directed events between nodes.
//!
//! An edge never exists without both endpoints already in the graph, and
//! endpoints are arena handles rather than references, so edges stay
//! trivially copyable into exports.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::graphml::{AttrKey, AttrValue};
use crate::types::{DomNodeId, GraphItemId, NodeId, RequestKind};

/// What an edge records, with its kind-specific payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Actor brought a DOM node into existence.
    Create,
    /// DOM node attached under `parent`. `before_sibling` is the next
    /// sibling at attachment time, `None` when attached last or when the
    /// inserted node is the document root.
    Insert {
        parent: DomNodeId,
        before_sibling: Option<DomNodeId>,
    },
    /// DOM node detached from its parent, still alive.
    Remove,
    /// DOM node destroyed.
    Delete,
    /// Attribute written with `value`.
    AttributeSet { name: String, value: String },
    /// Attribute removed.
    AttributeDelete { name: String },
    /// Actor started a script running.
    Execute,
    /// Actor invoked a browser API.
    Call {
        method: String,
        arguments: Vec<String>,
    },
    /// Actor caused a network request.
    Request { url: String, kind: RequestKind },
}

impl EdgeKind {
    /// Short type name used in item labels.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Insert { .. } => "Insert",
            Self::Remove => "Remove",
            Self::Delete => "Delete",
            Self::AttributeSet { .. } => "AttributeSet",
            Self::AttributeDelete { .. } => "AttributeDelete",
            Self::Execute => "Execute",
            Self::Call { .. } => "Call",
            Self::Request { .. } => "Request",
        }
    }

    /// Human-readable discriminator written to exports.
    pub fn descriptor(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Insert { .. } => "insert",
            Self::Remove => "remove",
            Self::Delete => "delete",
            Self::AttributeSet { .. } => "attribute set",
            Self::AttributeDelete { .. } => "attribute delete",
            Self::Execute => "execute",
            Self::Call { .. } => "call",
            Self::Request { .. } => "request",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.descriptor())
    }
}

/// One edge in the graph.
#[derive(Clone, Debug)]
pub struct Edge {
    id: GraphItemId,
    kind: EdgeKind,
    source: NodeId,
    target: NodeId,
    timestamp_micros: u64,
}

impl Edge {
    pub(crate) fn new(
        id: GraphItemId,
        kind: EdgeKind,
        source: NodeId,
        target: NodeId,
        timestamp_micros: u64,
    ) -> Self {
        Self {
            id,
            kind,
            source,
            target,
            timestamp_micros,
        }
    }

    pub fn id(&self) -> GraphItemId {
        self.id
    }

    pub fn kind(&self) -> &EdgeKind {
        &self.kind
    }

    pub fn source(&self) -> NodeId {
        self.source
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    /// Microseconds since the owning graph was created.
    pub fn timestamp_micros(&self) -> u64 {
        self.timestamp_micros
    }

    /// Stable label, e.g. `Insert#9`.
    pub fn label(&self) -> String {
        format!("{}#{}", self.kind.type_name(), self.id)
    }

    /// Identifier used in export documents, e.g. `e9`.
    pub fn export_id(&self) -> String {
        format!("e{}", self.id)
    }

    /// Typed export attributes for this edge. Optional keys, like the
    /// sibling of an insertion, are omitted when absent.
    pub fn graphml_attributes(&self) -> Vec<(AttrKey, AttrValue)> {
        let mut attrs = vec![(
            AttrKey::EdgeType,
            AttrValue::Str(self.kind.descriptor().to_owned()),
        )];
        match &self.kind {
            EdgeKind::Insert {
                parent,
                before_sibling,
            } => {
                attrs.push((AttrKey::ParentDomNodeId, AttrValue::Long(parent.0)));
                if let Some(sibling) = before_sibling {
                    attrs.push((AttrKey::BeforeSiblingDomNodeId, AttrValue::Long(sibling.0)));
                }
            }
            EdgeKind::AttributeSet { name, value } => {
                attrs.push((AttrKey::AttributeName, AttrValue::Str(name.clone())));
                attrs.push((AttrKey::AttributeValue, AttrValue::Str(value.clone())));
            }
            EdgeKind::AttributeDelete { name } => {
                attrs.push((AttrKey::AttributeName, AttrValue::Str(name.clone())));
            }
            EdgeKind::Call { method, arguments } => {
                attrs.push((AttrKey::MethodName, AttrValue::Str(method.clone())));
                attrs.push((AttrKey::CallArguments, AttrValue::Str(arguments.join(", "))));
            }
            EdgeKind::Request { url, kind } => {
                attrs.push((AttrKey::Url, AttrValue::Str(url.clone())));
                attrs.push((AttrKey::RequestType, AttrValue::Str(kind.as_str().to_owned())));
            }
            EdgeKind::Create | EdgeKind::Remove | EdgeKind::Delete | EdgeKind::Execute => {}
        }
        attrs.push((AttrKey::Timestamp, AttrValue::Long(self.timestamp_micros)));
        attrs
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
