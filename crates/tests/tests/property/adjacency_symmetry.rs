//! Property: adjacency lists are an exact mirror of the edge arena.
//! Every edge appears once in its source's out list and once in its
//! target's in list, and the lists hold nothing else.

use pagegraph::PageGraph;
use proptest::prelude::*;

use crate::event_stream::{apply_all, arb_events};

proptest! {
    /// Membership and direction: a node's lists only name edges that
    /// actually start (or end) at that node, and the totals add up.
    #[test]
    fn adjacency_lists_mirror_edges(events in arb_events()) {
        let mut graph = PageGraph::new();
        apply_all(&mut graph, &events);

        let mut out_total = 0usize;
        let mut in_total = 0usize;
        for node in graph.nodes() {
            for &edge_id in node.out_edges() {
                let edge = graph.edge(edge_id);
                prop_assert_eq!(graph.node(edge.source()).id(), node.id());
                out_total += 1;
            }
            for &edge_id in node.in_edges() {
                let edge = graph.edge(edge_id);
                prop_assert_eq!(graph.node(edge.target()).id(), node.id());
                in_total += 1;
            }
        }

        prop_assert_eq!(out_total, graph.edge_count());
        prop_assert_eq!(in_total, graph.edge_count());
    }

    /// Exactly-once: collecting every edge referenced from the out
    /// lists (and separately the in lists) reproduces the edge arena
    /// with no duplicates and no omissions.
    #[test]
    fn adjacency_lists_are_duplicate_free_and_complete(events in arb_events()) {
        let mut graph = PageGraph::new();
        apply_all(&mut graph, &events);

        let all_edges: Vec<u64> = graph.edges().iter().map(|edge| edge.id().as_u64()).collect();

        let mut from_out: Vec<u64> = graph
            .nodes()
            .iter()
            .flat_map(|node| node.out_edges().iter())
            .map(|&edge_id| graph.edge(edge_id).id().as_u64())
            .collect();
        from_out.sort_unstable();
        prop_assert!(from_out.windows(2).all(|pair| pair[0] < pair[1]));
        prop_assert_eq!(&from_out, &all_edges);

        let mut from_in: Vec<u64> = graph
            .nodes()
            .iter()
            .flat_map(|node| node.in_edges().iter())
            .map(|&edge_id| graph.edge(edge_id).id().as_u64())
            .collect();
        from_in.sort_unstable();
        prop_assert!(from_in.windows(2).all(|pair| pair[0] < pair[1]));
        prop_assert_eq!(&from_in, &all_edges);
    }

    /// Lists grow in creation order, so each one is already sorted by
    /// edge identity.
    #[test]
    fn adjacency_lists_follow_creation_order(events in arb_events()) {
        let mut graph = PageGraph::new();
        apply_all(&mut graph, &events);

        for node in graph.nodes() {
            let out_ids: Vec<u64> = node
                .out_edges()
                .iter()
                .map(|&edge_id| graph.edge(edge_id).id().as_u64())
                .collect();
            prop_assert!(out_ids.windows(2).all(|pair| pair[0] < pair[1]));

            let in_ids: Vec<u64> = node
                .in_edges()
                .iter()
                .map(|&edge_id| graph.edge(edge_id).id().as_u64())
                .collect();
            prop_assert!(in_ids.windows(2).all(|pair| pair[0] < pair[1]));
        }
    }
}
