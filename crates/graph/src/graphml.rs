//! GraphML rendering of the recorded history.
//!
//! The document is a pure projection of graph state: the attribute key
//! schema is declared once in the header, then every node and then every
//! edge is written in ascending identity order. Nothing is sampled at
//! export time, so rendering the same graph twice yields byte-identical
//! documents. Page-sourced strings are escaped before they reach the
//! document.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::edge::Edge;
use crate::error::ExportError;
use crate::graph::PageGraph;
use crate::node::Node;

/// Closed set of attribute keys a document may carry.
///
/// Each key has a fixed domain and value type; the same key never
/// changes type between items. Items omit keys they have no value for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttrKey {
    NodeType,
    EdgeType,
    TagName,
    TextContent,
    DomNodeId,
    ScriptId,
    MethodName,
    CallArguments,
    Url,
    RequestType,
    AttributeName,
    AttributeValue,
    ParentDomNodeId,
    BeforeSiblingDomNodeId,
    Timestamp,
    CapturedAt,
}

impl AttrKey {
    /// Every key, in header declaration order.
    pub const ALL: [AttrKey; 16] = [
        AttrKey::NodeType,
        AttrKey::EdgeType,
        AttrKey::TagName,
        AttrKey::TextContent,
        AttrKey::DomNodeId,
        AttrKey::ScriptId,
        AttrKey::MethodName,
        AttrKey::CallArguments,
        AttrKey::Url,
        AttrKey::RequestType,
        AttrKey::AttributeName,
        AttrKey::AttributeValue,
        AttrKey::ParentDomNodeId,
        AttrKey::BeforeSiblingDomNodeId,
        AttrKey::Timestamp,
        AttrKey::CapturedAt,
    ];

    /// The `id` declared in the header and referenced by `<data>` elements.
    pub fn key_id(&self) -> &'static str {
        match self {
            Self::NodeType => "node_type",
            Self::EdgeType => "edge_type",
            Self::TagName => "tag",
            Self::TextContent => "text",
            Self::DomNodeId => "dom_node_id",
            Self::ScriptId => "script_id",
            Self::MethodName => "method",
            Self::CallArguments => "args",
            Self::Url => "url",
            Self::RequestType => "request_type",
            Self::AttributeName => "attr_name",
            Self::AttributeValue => "attr_value",
            Self::ParentDomNodeId => "parent",
            Self::BeforeSiblingDomNodeId => "before_sibling",
            Self::Timestamp => "timestamp",
            Self::CapturedAt => "captured_at",
        }
    }

    /// The `attr.name` shown to readers.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::NodeType => "node type",
            Self::EdgeType => "edge type",
            Self::TagName => "tag name",
            Self::TextContent => "text",
            Self::DomNodeId => "dom node id",
            Self::ScriptId => "script id",
            Self::MethodName => "method",
            Self::CallArguments => "call arguments",
            Self::Url => "url",
            Self::RequestType => "request type",
            Self::AttributeName => "attribute name",
            Self::AttributeValue => "attribute value",
            Self::ParentDomNodeId => "parent dom node id",
            Self::BeforeSiblingDomNodeId => "before sibling dom node id",
            Self::Timestamp => "timestamp",
            Self::CapturedAt => "captured at",
        }
    }

    /// Which document element kind may carry this key.
    pub fn domain(&self) -> AttrDomain {
        match self {
            Self::NodeType | Self::TagName | Self::TextContent | Self::DomNodeId
            | Self::ScriptId => AttrDomain::Node,
            Self::EdgeType
            | Self::CallArguments
            | Self::RequestType
            | Self::AttributeName
            | Self::AttributeValue
            | Self::ParentDomNodeId
            | Self::BeforeSiblingDomNodeId => AttrDomain::Edge,
            Self::MethodName | Self::Url | Self::Timestamp => AttrDomain::All,
            Self::CapturedAt => AttrDomain::Graph,
        }
    }

    /// Declared value type; values for this key always match it.
    pub fn value_type(&self) -> AttrValueType {
        match self {
            Self::DomNodeId
            | Self::ScriptId
            | Self::ParentDomNodeId
            | Self::BeforeSiblingDomNodeId
            | Self::Timestamp => AttrValueType::Long,
            _ => AttrValueType::Str,
        }
    }
}

/// Where an attribute key may appear.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttrDomain {
    Node,
    Edge,
    All,
    Graph,
}

impl AttrDomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Edge => "edge",
            Self::All => "all",
            Self::Graph => "graph",
        }
    }

    /// True if a key with this domain may sit on a node record.
    pub fn covers_nodes(&self) -> bool {
        matches!(self, Self::Node | Self::All)
    }

    /// True if a key with this domain may sit on an edge record.
    pub fn covers_edges(&self) -> bool {
        matches!(self, Self::Edge | Self::All)
    }
}

/// Declared GraphML value type of a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttrValueType {
    Str,
    Long,
}

impl AttrValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Str => "string",
            Self::Long => "long",
        }
    }
}

/// A typed attribute value carried by one item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttrValue {
    Str(String),
    Long(u64),
}

impl AttrValue {
    pub fn value_type(&self) -> AttrValueType {
        match self {
            Self::Str(_) => AttrValueType::Str,
            Self::Long(_) => AttrValueType::Long,
        }
    }

    /// Plain text form, unescaped.
    pub fn render(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            Self::Long(n) => n.to_string(),
        }
    }
}

pub(crate) fn render_document(graph: &PageGraph) -> String {
    let mut output = String::new();

    output.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    output.push_str("<graphml xmlns=\"http://graphml.graphdrawing.org/xmlns\">\n");

    for key in AttrKey::ALL {
        output.push_str(&format!(
            "  <key id=\"{}\" for=\"{}\" attr.name=\"{}\" attr.type=\"{}\"/>\n",
            key.key_id(),
            key.domain().as_str(),
            key.display_name(),
            key.value_type().as_str()
        ));
    }

    output.push_str("  <graph id=\"G\" edgedefault=\"directed\">\n");
    output.push_str(&format!(
        "    <data key=\"{}\">{}</data>\n",
        AttrKey::CapturedAt.key_id(),
        escape_xml(&graph.captured_at().to_rfc3339())
    ));

    // Arenas are already in ascending identity order.
    for node in graph.nodes() {
        render_node(&mut output, node);
    }
    for edge in graph.edges() {
        render_edge(&mut output, graph, edge);
    }

    output.push_str("  </graph>\n");
    output.push_str("</graphml>\n");
    output
}

fn render_node(output: &mut String, node: &Node) {
    output.push_str(&format!("    <node id=\"{}\">\n", node.export_id()));
    render_data(output, &node.graphml_attributes());
    output.push_str("    </node>\n");
}

fn render_edge(output: &mut String, graph: &PageGraph, edge: &Edge) {
    output.push_str(&format!(
        "    <edge id=\"{}\" source=\"{}\" target=\"{}\">\n",
        edge.export_id(),
        graph.node(edge.source()).export_id(),
        graph.node(edge.target()).export_id()
    ));
    render_data(output, &edge.graphml_attributes());
    output.push_str("    </edge>\n");
}

fn render_data(output: &mut String, attrs: &[(AttrKey, AttrValue)]) {
    for (key, value) in attrs {
        output.push_str(&format!(
            "      <data key=\"{}\">{}</data>\n",
            key.key_id(),
            escape_xml(&value.render())
        ));
    }
}

pub(crate) fn write_document<W: Write>(
    graph: &PageGraph,
    writer: &mut W,
) -> Result<(), ExportError> {
    writer.write_all(render_document(graph).as_bytes())?;
    Ok(())
}

pub(crate) fn write_document_to_path(graph: &PageGraph, path: &Path) -> Result<(), ExportError> {
    let mut file = File::create(path)?;
    write_document(graph, &mut file)
}

/// Escape a string for XML text and attribute positions.
fn escape_xml(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
