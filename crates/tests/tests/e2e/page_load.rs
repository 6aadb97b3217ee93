//! End-to-end test: a full simulated page load leaves a coherent,
//! queryable history with every event attributed and nothing lost.

use pagegraph::{
    DomNodeId, EdgeKind, NodeKind, PageGraph, ProtocolViolation, RequestKind, ScriptId,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const DOCUMENT: DomNodeId = DomNodeId(0);
const HTML: DomNodeId = DomNodeId(1);
const BODY: DomNodeId = DomNodeId(2);
const HEADLINE: DomNodeId = DomNodeId(3);
const HEADLINE_TEXT: DomNodeId = DomNodeId(4);
const PIXEL: DomNodeId = DomNodeId(5);

const ANALYTICS: ScriptId = ScriptId(1);

/// Parser builds a small shell, a script injects a tracking pixel,
/// then the pixel is taken back out.
fn loaded_page() -> PageGraph {
    let mut graph = PageGraph::new();

    graph.register_element_created(HTML, "html").unwrap();
    graph.register_element_inserted(HTML, DOCUMENT, None).unwrap();
    graph.register_element_created(BODY, "body").unwrap();
    graph.register_element_inserted(BODY, HTML, None).unwrap();
    graph.register_element_created(HEADLINE, "h1").unwrap();
    graph.register_element_inserted(HEADLINE, BODY, None).unwrap();
    graph.register_text_created(HEADLINE_TEXT, "Welcome").unwrap();
    graph
        .register_text_inserted(HEADLINE_TEXT, HEADLINE, None)
        .unwrap();
    graph.register_request_issued("https://cdn.example/app.js", RequestKind::Script);

    graph.register_script_exec_start(ANALYTICS);
    graph.register_api_called("Document.cookie", &[]);
    graph.register_element_created(PIXEL, "img").unwrap();
    graph
        .register_attribute_set(PIXEL, "src", "https://t.example/p.gif")
        .unwrap();
    graph
        .register_element_inserted(PIXEL, BODY, Some(HEADLINE))
        .unwrap();
    graph.register_request_issued("https://t.example/p.gif", RequestKind::Image);
    graph.register_script_exec_stop(ANALYTICS).unwrap();

    graph.register_element_removed(PIXEL).unwrap();
    graph
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn root_and_child_show_up_in_the_export() {
    let mut graph = PageGraph::new();
    graph.register_element_created(DomNodeId(1), "HTML").unwrap();
    graph.register_element_created(DomNodeId(2), "DIV").unwrap();
    graph
        .register_element_inserted(DomNodeId(2), DomNodeId(1), None)
        .unwrap();

    assert!(graph.root_element().is_some());
    assert!(graph.html_node(DomNodeId(1)).is_ok());
    assert!(graph.html_node(DomNodeId(2)).is_ok());

    let document = graph.to_graphml();
    assert!(document.contains("<node id=\"n4\">"));
    assert!(document.contains("<node id=\"n6\">"));
    assert!(document.contains("<edge id=\"e5\" source=\"n0\" target=\"n4\">"));
    assert!(document.contains("<edge id=\"e7\" source=\"n0\" target=\"n6\">"));
    assert!(document.contains("<edge id=\"e8\" source=\"n0\" target=\"n6\">"));
    assert_eq!(
        document
            .matches("<data key=\"edge_type\">create</data>")
            .count(),
        2
    );
    assert_eq!(
        document
            .matches("<data key=\"edge_type\">insert</data>")
            .count(),
        1
    );
}

#[test]
fn duplicate_registration_changes_nothing() {
    let mut graph = PageGraph::new();
    graph.register_element_created(DomNodeId(1), "html").unwrap();
    let nodes = graph.node_count();
    let edges = graph.edge_count();
    let document = graph.to_graphml();

    let err = graph
        .register_element_created(DomNodeId(1), "div")
        .unwrap_err();

    assert_eq!(err, ProtocolViolation::DuplicateDomNode(DomNodeId(1)));
    assert_eq!(graph.node_count(), nodes);
    assert_eq!(graph.edge_count(), edges);
    assert_eq!(graph.to_graphml(), document);
}

#[test]
fn full_load_records_every_event() {
    let graph = loaded_page();

    // 4 seeded actors, 4 elements, 1 text node, 1 script, 1 web API,
    // 2 resources.
    assert_eq!(graph.node_count(), 13);
    // 5 creations, 5 insertions, 1 execute, 1 call, 2 requests,
    // 1 attribute set, 1 removal.
    assert_eq!(graph.edge_count(), 16);

    let ids: Vec<u64> = graph.items().map(|item| item.id().as_u64()).collect();
    assert_eq!(ids, (0..29).collect::<Vec<u64>>());
}

#[test]
fn every_dom_id_resolves_after_the_load() {
    let graph = loaded_page();

    for dom in [HTML, BODY, HEADLINE, HEADLINE_TEXT, PIXEL] {
        let node = graph.html_node(dom).unwrap();
        assert_eq!(node.dom_node_id(), Some(dom));
    }
    assert_eq!(
        graph.html_node(DomNodeId(99)).unwrap_err(),
        ProtocolViolation::UnknownDomNode(DomNodeId(99))
    );

    let root = graph.root_element().unwrap();
    assert!(matches!(
        graph.node(root).kind(),
        NodeKind::HtmlElement { tag_name, .. } if tag_name == "html"
    ));
}

#[test]
fn parser_work_and_script_work_are_attributed_separately() {
    let graph = loaded_page();

    let headline = graph.html_node(HEADLINE).unwrap();
    let created_headline = headline
        .in_edges()
        .iter()
        .map(|&edge_id| graph.edge(edge_id))
        .find(|edge| matches!(edge.kind(), EdgeKind::Create))
        .unwrap();
    assert!(matches!(
        graph.node(created_headline.source()).kind(),
        NodeKind::Parser
    ));

    let pixel = graph.html_node(PIXEL).unwrap();
    let created_pixel = pixel
        .in_edges()
        .iter()
        .map(|&edge_id| graph.edge(edge_id))
        .find(|edge| matches!(edge.kind(), EdgeKind::Create))
        .unwrap();
    assert!(matches!(
        graph.node(created_pixel.source()).kind(),
        NodeKind::Script { script_id } if *script_id == ANALYTICS
    ));

    // After the script reports done, the parser is acting again.
    assert_eq!(graph.current_acting_node(), graph.parser_node());
}

#[test]
fn insertion_records_parent_and_sibling() {
    let graph = loaded_page();

    let pixel = graph.html_node(PIXEL).unwrap();
    let inserted = pixel
        .in_edges()
        .iter()
        .map(|&edge_id| graph.edge(edge_id))
        .find_map(|edge| match edge.kind() {
            EdgeKind::Insert {
                parent,
                before_sibling,
            } => Some((*parent, *before_sibling)),
            _ => None,
        })
        .unwrap();
    assert_eq!(inserted, (BODY, Some(HEADLINE)));
}

#[test]
fn removal_keeps_the_node_in_history() {
    let graph = loaded_page();

    let pixel = graph.html_node(PIXEL).unwrap();
    let removed = pixel
        .in_edges()
        .iter()
        .map(|&edge_id| graph.edge(edge_id))
        .any(|edge| matches!(edge.kind(), EdgeKind::Remove));
    assert!(removed);

    // The record survives removal; only the live DOM forgot it.
    assert!(graph.to_graphml().contains("img"));
}
