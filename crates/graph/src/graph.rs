//! The graph orchestrator: owns both item arenas, issues identity, and
//! enforces the registration protocol.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::edge::{Edge, EdgeKind};
use crate::error::{ExportError, ProtocolViolation};
use crate::graphml;
use crate::node::{Node, NodeKind};
use crate::snapshot::{self, GraphSnapshot};
use crate::types::{DomNodeId, EdgeId, GraphItemId, NodeId, RequestKind, ScriptId};

/// Document root tag, matched case-insensitively.
const ROOT_TAG: &str = "html";

fn is_root_tag(tag_name: &str) -> bool {
    tag_name.eq_ignore_ascii_case(ROOT_TAG)
}

/// Read-only view of one owned item from either arena.
#[derive(Clone, Copy, Debug)]
pub enum GraphItem<'a> {
    Node(&'a Node),
    Edge(&'a Edge),
}

impl GraphItem<'_> {
    pub fn id(&self) -> GraphItemId {
        match self {
            Self::Node(node) => node.id(),
            Self::Edge(edge) => edge.id(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Node(node) => node.label(),
            Self::Edge(edge) => edge.label(),
        }
    }
}

/// In-process provenance graph of one page load.
///
/// The graph exclusively owns every node and edge it records. Host
/// instrumentation reports events through the `register_*` methods; each
/// call validates the event against what the graph already knows, then
/// appends. History is append-only: nothing is removed or renumbered,
/// and removal or destruction of a DOM node is itself just another
/// recorded event.
///
/// Registration is strictly sequential. The host serializes parsing,
/// script execution, and network callbacks before they reach the graph,
/// so there is no internal locking; embeddings that cannot guarantee a
/// single writer must wrap the graph in their own lock.
///
/// Construction seeds four singleton actor nodes with identities 0
/// through 3: the parser, shields, the cookie jar, and local storage.
#[derive(Debug)]
pub struct PageGraph {
    next_item_id: u64,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    element_index: HashMap<DomNodeId, NodeId>,
    text_index: HashMap<DomNodeId, NodeId>,
    script_index: HashMap<ScriptId, NodeId>,
    web_api_index: HashMap<String, NodeId>,
    resource_index: HashMap<String, NodeId>,
    root_element: Option<NodeId>,
    acting_scripts: Vec<(ScriptId, NodeId)>,
    parser: NodeId,
    shields: NodeId,
    cookie_jar: NodeId,
    local_storage: NodeId,
    captured_at: DateTime<Utc>,
    started: Instant,
}

impl PageGraph {
    /// Create an empty graph and seed the singleton actors.
    pub fn new() -> Self {
        let mut graph = Self {
            next_item_id: 0,
            nodes: Vec::new(),
            edges: Vec::new(),
            element_index: HashMap::new(),
            text_index: HashMap::new(),
            script_index: HashMap::new(),
            web_api_index: HashMap::new(),
            resource_index: HashMap::new(),
            root_element: None,
            acting_scripts: Vec::new(),
            parser: NodeId(0),
            shields: NodeId(0),
            cookie_jar: NodeId(0),
            local_storage: NodeId(0),
            captured_at: Utc::now(),
            started: Instant::now(),
        };
        graph.parser = graph.add_node(NodeKind::Parser);
        graph.shields = graph.add_node(NodeKind::Shields);
        graph.cookie_jar = graph.add_node(NodeKind::CookieJar);
        graph.local_storage = graph.add_node(NodeKind::LocalStorage);
        debug!("Page graph ready");
        graph
    }

    // ---- registration protocol -------------------------------------

    /// Record that the host created a DOM element.
    ///
    /// The element joins the element index and a `Create` edge runs from
    /// the current acting node to it. A `tag_name` of `html` (any case)
    /// claims the document root.
    pub fn register_element_created(
        &mut self,
        dom_node_id: DomNodeId,
        tag_name: &str,
    ) -> Result<NodeId, ProtocolViolation> {
        self.ensure_unregistered(dom_node_id)?;
        if is_root_tag(tag_name) {
            if let Some(root) = self.root_element {
                return Err(ProtocolViolation::RootAlreadySet(self.nodes[root.0].id()));
            }
        }
        let node = self.add_node(NodeKind::HtmlElement {
            dom_node_id,
            tag_name: tag_name.to_owned(),
        });
        self.element_index.insert(dom_node_id, node);
        if is_root_tag(tag_name) {
            self.root_element = Some(node);
        }
        let acting = self.current_acting_node();
        self.add_edge(EdgeKind::Create, acting, node);
        debug!(dom = %dom_node_id, tag = %tag_name, "Element registered");
        Ok(node)
    }

    /// Record that the host created a DOM text node.
    pub fn register_text_created(
        &mut self,
        dom_node_id: DomNodeId,
        text: &str,
    ) -> Result<NodeId, ProtocolViolation> {
        self.ensure_unregistered(dom_node_id)?;
        let node = self.add_node(NodeKind::HtmlText {
            dom_node_id,
            text: text.to_owned(),
        });
        self.text_index.insert(dom_node_id, node);
        let acting = self.current_acting_node();
        self.add_edge(EdgeKind::Create, acting, node);
        debug!(dom = %dom_node_id, "Text node registered");
        Ok(node)
    }

    /// Record that a registered element was attached under `parent`.
    ///
    /// `before_sibling` is the next sibling at attachment time. It is
    /// normalized to `None` when the inserted element is the document
    /// root, whatever the host reported; the root has no siblings.
    pub fn register_element_inserted(
        &mut self,
        dom_node_id: DomNodeId,
        parent: DomNodeId,
        before_sibling: Option<DomNodeId>,
    ) -> Result<EdgeId, ProtocolViolation> {
        let node = self.element(dom_node_id)?;
        let inserting_root = matches!(
            self.nodes[node.0].kind(),
            NodeKind::HtmlElement { tag_name, .. } if is_root_tag(tag_name)
        );
        let before_sibling = if inserting_root { None } else { before_sibling };
        let acting = self.current_acting_node();
        let edge = self.add_edge(
            EdgeKind::Insert {
                parent,
                before_sibling,
            },
            acting,
            node,
        );
        debug!(dom = %dom_node_id, parent = %parent, "Element insertion recorded");
        Ok(edge)
    }

    /// Record that a registered text node was attached under `parent`.
    pub fn register_text_inserted(
        &mut self,
        dom_node_id: DomNodeId,
        parent: DomNodeId,
        before_sibling: Option<DomNodeId>,
    ) -> Result<EdgeId, ProtocolViolation> {
        let node = self.text(dom_node_id)?;
        let acting = self.current_acting_node();
        let edge = self.add_edge(
            EdgeKind::Insert {
                parent,
                before_sibling,
            },
            acting,
            node,
        );
        debug!(dom = %dom_node_id, parent = %parent, "Text insertion recorded");
        Ok(edge)
    }

    /// Record that a registered element was detached from its parent.
    /// The node stays owned and present in history.
    pub fn register_element_removed(
        &mut self,
        dom_node_id: DomNodeId,
    ) -> Result<EdgeId, ProtocolViolation> {
        let node = self.element(dom_node_id)?;
        let acting = self.current_acting_node();
        let edge = self.add_edge(EdgeKind::Remove, acting, node);
        debug!(dom = %dom_node_id, "Element removal recorded");
        Ok(edge)
    }

    /// Record that a registered element was destroyed.
    ///
    /// History keeps the node and its index entry; host DOM ids are
    /// never reused within a page, so a destroyed id stays claimed.
    pub fn register_element_deleted(
        &mut self,
        dom_node_id: DomNodeId,
    ) -> Result<EdgeId, ProtocolViolation> {
        let node = self.element(dom_node_id)?;
        let acting = self.current_acting_node();
        let edge = self.add_edge(EdgeKind::Delete, acting, node);
        debug!(dom = %dom_node_id, "Element deletion recorded");
        Ok(edge)
    }

    /// Record an attribute write on a registered element.
    pub fn register_attribute_set(
        &mut self,
        dom_node_id: DomNodeId,
        name: &str,
        value: &str,
    ) -> Result<EdgeId, ProtocolViolation> {
        let node = self.element(dom_node_id)?;
        let acting = self.current_acting_node();
        let edge = self.add_edge(
            EdgeKind::AttributeSet {
                name: name.to_owned(),
                value: value.to_owned(),
            },
            acting,
            node,
        );
        debug!(dom = %dom_node_id, attr = %name, "Attribute set recorded");
        Ok(edge)
    }

    /// Record an attribute removal on a registered element.
    pub fn register_attribute_delete(
        &mut self,
        dom_node_id: DomNodeId,
        name: &str,
    ) -> Result<EdgeId, ProtocolViolation> {
        let node = self.element(dom_node_id)?;
        let acting = self.current_acting_node();
        let edge = self.add_edge(
            EdgeKind::AttributeDelete {
                name: name.to_owned(),
            },
            acting,
            node,
        );
        debug!(dom = %dom_node_id, attr = %name, "Attribute delete recorded");
        Ok(edge)
    }

    /// Record a call into a browser API. The API node is created on
    /// first use and shared by every later call to the same method.
    pub fn register_api_called(&mut self, method: &str, arguments: &[String]) -> EdgeId {
        let api = self.web_api_node(method);
        let acting = self.current_acting_node();
        let edge = self.add_edge(
            EdgeKind::Call {
                method: method.to_owned(),
                arguments: arguments.to_vec(),
            },
            acting,
            api,
        );
        debug!(method = %method, "Web API call recorded");
        edge
    }

    /// Record a network request for `url`. The resource node is created
    /// on first sight and shared by every later request for the same URL.
    pub fn register_request_issued(&mut self, url: &str, kind: RequestKind) -> EdgeId {
        let resource = self.resource_node(url);
        let acting = self.current_acting_node();
        let edge = self.add_edge(
            EdgeKind::Request {
                url: url.to_owned(),
                kind,
            },
            acting,
            resource,
        );
        debug!(url = %url, kind = %kind, "Network request recorded");
        edge
    }

    /// Record that `script_id` began executing.
    ///
    /// The script node is created on first sight; an `Execute` edge runs
    /// from whatever was acting when the script started. Until the
    /// matching [`register_script_exec_stop`](Self::register_script_exec_stop),
    /// registered events are attributed to this script.
    pub fn register_script_exec_start(&mut self, script_id: ScriptId) -> NodeId {
        let invoker = self.current_acting_node();
        let script = self.script_node(script_id);
        self.add_edge(EdgeKind::Execute, invoker, script);
        self.acting_scripts.push((script_id, script));
        debug!(script = %script_id, "Script execution started");
        script
    }

    /// Record that the innermost executing script finished.
    /// Fails if `script_id` is not the script currently acting.
    pub fn register_script_exec_stop(
        &mut self,
        script_id: ScriptId,
    ) -> Result<(), ProtocolViolation> {
        match self.acting_scripts.last() {
            None => Err(ProtocolViolation::NoActingScript(script_id)),
            Some(&(acting, _)) if acting != script_id => {
                Err(ProtocolViolation::MismatchedScriptStop {
                    stopped: script_id,
                    acting,
                })
            }
            Some(_) => {
                self.acting_scripts.pop();
                debug!(script = %script_id, "Script execution finished");
                Ok(())
            }
        }
    }

    // ---- lookups and views -----------------------------------------

    /// The node charged with causing the next registered event: the
    /// innermost script still executing, or the parser outside scripts.
    pub fn current_acting_node(&self) -> NodeId {
        self.acting_scripts
            .last()
            .map(|&(_, node)| node)
            .unwrap_or(self.parser)
    }

    /// Find the DOM-backed node registered for `dom_node_id`, whichever
    /// index holds it. Membership in both indices means the graph's own
    /// bookkeeping is broken and is reported rather than masked.
    pub fn html_node(&self, dom_node_id: DomNodeId) -> Result<&Node, ProtocolViolation> {
        let element = self.element_index.get(&dom_node_id);
        let text = self.text_index.get(&dom_node_id);
        match (element, text) {
            (Some(_), Some(_)) => Err(ProtocolViolation::AmbiguousDomNode(dom_node_id)),
            (Some(&node), None) | (None, Some(&node)) => Ok(&self.nodes[node.0]),
            (None, None) => Err(ProtocolViolation::UnknownDomNode(dom_node_id)),
        }
    }

    /// Every owned item, nodes and edges interleaved, in creation order.
    pub fn items(&self) -> impl Iterator<Item = GraphItem<'_>> {
        Items {
            nodes: &self.nodes,
            edges: &self.edges,
            next_node: 0,
            next_edge: 0,
        }
    }

    /// Handles are minted only by this graph and arenas never shrink,
    /// so indexing by a handle is total.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.0]
    }

    /// All nodes in ascending identity order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All edges in ascending identity order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// The root HTML element, once one was registered.
    pub fn root_element(&self) -> Option<NodeId> {
        self.root_element
    }

    pub fn parser_node(&self) -> NodeId {
        self.parser
    }

    pub fn shields_node(&self) -> NodeId {
        self.shields
    }

    pub fn cookie_jar_node(&self) -> NodeId {
        self.cookie_jar
    }

    pub fn local_storage_node(&self) -> NodeId {
        self.local_storage
    }

    /// Wall-clock time the graph was created; item timestamps count
    /// microseconds from this instant.
    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    // ---- export ------------------------------------------------------

    /// Render the complete graph as a GraphML document.
    ///
    /// A pure read: rendering the same graph twice yields byte-identical
    /// text.
    pub fn to_graphml(&self) -> String {
        graphml::render_document(self)
    }

    /// Write the GraphML document to `writer`.
    pub fn write_graphml<W: Write>(&self, writer: &mut W) -> Result<(), ExportError> {
        graphml::write_document(self, writer)
    }

    /// Write the GraphML document to a file at `path`.
    pub fn write_graphml_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), ExportError> {
        graphml::write_document_to_path(self, path.as_ref())
    }

    /// Write the GraphML document to a fixed location under the system
    /// temp directory, for hosts that dump on a signal or timer.
    pub fn debug_dump(&self) -> Result<PathBuf, ExportError> {
        let path = std::env::temp_dir().join("pagegraph.graphml");
        self.write_graphml_to_path(&path)?;
        info!(path = %path.display(), "Graph dumped");
        Ok(path)
    }

    /// Flat serializable view of the current state.
    pub fn snapshot(&self) -> GraphSnapshot {
        snapshot::snapshot_of(self)
    }

    // ---- internals ---------------------------------------------------

    fn next_id(&mut self) -> GraphItemId {
        let id = GraphItemId(self.next_item_id);
        self.next_item_id += 1;
        id
    }

    fn elapsed_micros(&self) -> u64 {
        self.started.elapsed().as_micros() as u64
    }

    fn add_node(&mut self, kind: NodeKind) -> NodeId {
        let id = self.next_id();
        let timestamp = self.elapsed_micros();
        let node = NodeId(self.nodes.len());
        self.nodes.push(Node::new(id, kind, timestamp));
        node
    }

    /// Single choke point for edge creation: the edge lands in its
    /// source's out list and its target's in list here and nowhere else.
    fn add_edge(&mut self, kind: EdgeKind, source: NodeId, target: NodeId) -> EdgeId {
        let id = self.next_id();
        let timestamp = self.elapsed_micros();
        let edge = EdgeId(self.edges.len());
        self.edges.push(Edge::new(id, kind, source, target, timestamp));
        self.nodes[source.0].record_out_edge(edge);
        self.nodes[target.0].record_in_edge(edge);
        edge
    }

    fn ensure_unregistered(&self, dom_node_id: DomNodeId) -> Result<(), ProtocolViolation> {
        if self.element_index.contains_key(&dom_node_id)
            || self.text_index.contains_key(&dom_node_id)
        {
            return Err(ProtocolViolation::DuplicateDomNode(dom_node_id));
        }
        Ok(())
    }

    fn element(&self, dom_node_id: DomNodeId) -> Result<NodeId, ProtocolViolation> {
        self.element_index
            .get(&dom_node_id)
            .copied()
            .ok_or(ProtocolViolation::NotAnElement(dom_node_id))
    }

    fn text(&self, dom_node_id: DomNodeId) -> Result<NodeId, ProtocolViolation> {
        self.text_index
            .get(&dom_node_id)
            .copied()
            .ok_or(ProtocolViolation::NotAText(dom_node_id))
    }

    fn web_api_node(&mut self, method: &str) -> NodeId {
        if let Some(&node) = self.web_api_index.get(method) {
            return node;
        }
        let node = self.add_node(NodeKind::WebApi {
            method: method.to_owned(),
        });
        self.web_api_index.insert(method.to_owned(), node);
        node
    }

    fn resource_node(&mut self, url: &str) -> NodeId {
        if let Some(&node) = self.resource_index.get(url) {
            return node;
        }
        let node = self.add_node(NodeKind::Resource {
            url: url.to_owned(),
        });
        self.resource_index.insert(url.to_owned(), node);
        node
    }

    fn script_node(&mut self, script_id: ScriptId) -> NodeId {
        if let Some(&node) = self.script_index.get(&script_id) {
            return node;
        }
        let node = self.add_node(NodeKind::Script { script_id });
        self.script_index.insert(script_id, node);
        node
    }
}

impl Default for PageGraph {
    fn default() -> Self {
        Self::new()
    }
}

struct Items<'a> {
    nodes: &'a [Node],
    edges: &'a [Edge],
    next_node: usize,
    next_edge: usize,
}

impl<'a> Iterator for Items<'a> {
    type Item = GraphItem<'a>;

    fn next(&mut self) -> Option<GraphItem<'a>> {
        match (self.nodes.get(self.next_node), self.edges.get(self.next_edge)) {
            (Some(node), Some(edge)) => {
                if node.id() < edge.id() {
                    self.next_node += 1;
                    Some(GraphItem::Node(node))
                } else {
                    self.next_edge += 1;
                    Some(GraphItem::Edge(edge))
                }
            }
            (Some(node), None) => {
                self.next_node += 1;
                Some(GraphItem::Node(node))
            }
            (None, Some(edge)) => {
                self.next_edge += 1;
                Some(GraphItem::Edge(edge))
            }
            (None, None) => None,
        }
    }
}
