#![deny(unsafe_code)]
//! Demo binary: feeds a scripted page load through the provenance graph
//! and shows what got recorded.
//!
//! Walks three phases -- parsing, script execution, cleanup -- then
//! prints part of the history and exports it as GraphML and JSON.
//! No browser required; the event stream is simulated.

mod scenario;

use pagegraph::{GraphItem, NodeKind, PageGraph};

fn section(title: &str) {
    println!();
    println!(" ── {} {}", title, "─".repeat(50usize.saturating_sub(title.len())));
}

fn ok(msg: &str) {
    println!("   [OK]  {}", msg);
}

fn info(msg: &str) {
    println!("   [--]  {}", msg);
}

fn main() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(tracing::Level::WARN)
        .init();

    println!();
    println!(" pagegraph demo -- provenance of one simulated page load");

    if let Err(e) = run_demo() {
        eprintln!();
        eprintln!("   [FATAL]  Demo failed: {}", e);
        std::process::exit(1);
    }

    println!();
    println!(" Demo complete.");
    println!();
}

fn run_demo() -> Result<(), Box<dyn std::error::Error>> {
    let mut graph = PageGraph::new();
    ok(&format!(
        "Graph seeded: {} singleton nodes",
        graph.node_count()
    ));

    section("Phase A: parser builds the document");
    scenario::parse_document_shell(&mut graph)?;
    ok(&format!(
        "{} nodes, {} edges after parsing",
        graph.node_count(),
        graph.edge_count()
    ));
    let root = graph
        .root_element()
        .expect("shell registered the root element");
    info(&format!("Root element: {}", graph.node(root).label()));

    section("Phase B: analytics script runs");
    scenario::run_analytics_script(&mut graph)?;
    let scripted: Vec<String> = graph
        .node(graph.parser_node())
        .out_edges()
        .iter()
        .map(|&edge| graph.edge(edge).label())
        .collect();
    info(&format!("Parser-attributed edges: {}", scripted.len()));
    ok(&format!(
        "{} nodes, {} edges after script",
        graph.node_count(),
        graph.edge_count()
    ));

    section("Phase C: cleanup");
    scenario::cleanup(&mut graph)?;
    ok(&format!("{} edges total", graph.edge_count()));

    section("History walk (first 12 items)");
    for item in graph.items().take(12) {
        match item {
            GraphItem::Node(node) => info(&format!("{:<20} {}", node.label(), node.kind())),
            GraphItem::Edge(edge) => info(&format!("{:<20} {}", edge.label(), edge.kind())),
        }
    }

    section("Who touched the page?");
    for node in graph.nodes() {
        if matches!(node.kind(), NodeKind::Script { .. } | NodeKind::WebApi { .. }) {
            info(&format!(
                "{:<20} in={} out={}",
                node.label(),
                node.in_edges().len(),
                node.out_edges().len()
            ));
        }
    }

    section("Export");
    let document = graph.to_graphml();
    ok(&format!("GraphML document: {} bytes", document.len()));
    let path = graph.debug_dump()?;
    ok(&format!("Wrote {}", path.display()));
    let json = graph.snapshot().to_json_pretty()?;
    ok(&format!("JSON snapshot: {} bytes", json.len()));

    Ok(())
}
