//! Adversarial test: page-controlled strings full of markup. Tag
//! names, text, attribute values, URLs, and call arguments all come
//! from the page; none of them may break the rendered document.

use pagegraph::{DomNodeId, GraphSnapshot, PageGraph, RequestKind, ScriptId};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const XSS_TEXT: &str = "<script>alert(\"x\")&</script>";
const SNEAKY_TAG: &str = "div\"><injected attr=\"";
const QUOTED_VALUE: &str = "it's a \"quoted\" value";
const TRACKING_URL: &str = "https://t.example/p?a=1&b=<2>&c='3'";
const CDATA_TEXT: &str = "]]>almost out";

fn hostile_graph() -> PageGraph {
    let mut graph = PageGraph::new();
    graph.register_element_created(DomNodeId(1), SNEAKY_TAG).unwrap();
    graph.register_text_created(DomNodeId(2), XSS_TEXT).unwrap();
    graph.register_text_created(DomNodeId(3), CDATA_TEXT).unwrap();
    graph
        .register_attribute_set(DomNodeId(1), "data-payload", QUOTED_VALUE)
        .unwrap();
    graph.register_request_issued(TRACKING_URL, RequestKind::Image);
    graph.register_script_exec_start(ScriptId(1));
    graph.register_api_called("Document.write", &[XSS_TEXT.to_owned()]);
    graph.register_script_exec_stop(ScriptId(1)).unwrap();
    graph
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn page_markup_never_reaches_the_document_raw() {
    let document = hostile_graph().to_graphml();

    assert!(!document.contains("<script>"));
    assert!(!document.contains("</script>"));
    assert!(!document.contains("<injected"));
    assert!(!document.contains("]]>"));
    assert!(document.contains("&lt;script&gt;alert(&quot;x&quot;)&amp;&lt;/script&gt;"));
    assert!(document.contains("]]&gt;almost out"));
}

#[test]
fn quotes_in_attribute_values_are_escaped() {
    let document = hostile_graph().to_graphml();
    assert!(document.contains("it&apos;s a &quot;quoted&quot; value"));
}

#[test]
fn urls_with_query_metacharacters_are_escaped() {
    let document = hostile_graph().to_graphml();
    assert!(document.contains("https://t.example/p?a=1&amp;b=&lt;2&gt;&amp;c=&apos;3&apos;"));
    assert!(!document.contains("b=<2>"));
}

#[test]
fn the_document_stays_structurally_balanced() {
    let document = hostile_graph().to_graphml();

    assert_eq!(document.matches("<graphml").count(), 1);
    assert_eq!(document.matches("</graphml>").count(), 1);
    assert_eq!(document.matches("<graph ").count(), 1);
    assert_eq!(document.matches("</graph>").count(), 1);
    assert_eq!(
        document.matches("<node id=\"").count(),
        document.matches("</node>").count()
    );
    assert_eq!(
        document.matches("<edge id=\"").count(),
        document.matches("</edge>").count()
    );
    assert_eq!(
        document.matches("<data key=\"").count(),
        document.matches("</data>").count()
    );
}

#[test]
fn snapshots_keep_the_raw_strings() {
    let graph = hostile_graph();
    let snapshot = graph.snapshot();

    // Escaping is a rendering concern; the snapshot carries the page's
    // own bytes and leaves quoting to the serializer.
    let text_node = snapshot
        .nodes
        .iter()
        .find(|record| record.attributes.get("text").map(String::as_str) == Some(XSS_TEXT));
    assert!(text_node.is_some());

    let json = snapshot.to_json().unwrap();
    let restored: GraphSnapshot = serde_json::from_str(&json).unwrap();
    let restored_text = restored
        .nodes
        .iter()
        .find(|record| record.attributes.get("text").map(String::as_str) == Some(XSS_TEXT));
    assert!(restored_text.is_some());
}

#[test]
fn hostile_content_exports_are_still_byte_stable() {
    let graph = hostile_graph();
    assert_eq!(graph.to_graphml(), graph.to_graphml());
}
