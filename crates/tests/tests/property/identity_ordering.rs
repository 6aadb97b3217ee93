//! Property: identity is one shared, contiguous, strictly increasing
//! sequence across nodes and edges, whatever the host feeds in.

use pagegraph::{NodeKind, PageGraph};
use proptest::prelude::*;

use crate::event_stream::{apply, arb_events};

proptest! {
    /// Interleaving nodes and edges by id yields exactly 0..total.
    #[test]
    fn identities_are_contiguous_and_ordered(events in arb_events()) {
        let mut graph = PageGraph::new();
        for event in &events {
            apply(&mut graph, event);
        }

        let ids: Vec<u64> = graph.items().map(|item| item.id().as_u64()).collect();
        let expected: Vec<u64> = (0..ids.len() as u64).collect();
        prop_assert_eq!(ids.len(), graph.node_count() + graph.edge_count());
        prop_assert_eq!(ids, expected);
    }

    /// A rejected event appends nothing. An accepted one never shrinks
    /// the history (script stops append nothing but are still accepted).
    #[test]
    fn only_accepted_events_append(events in arb_events()) {
        let mut graph = PageGraph::new();
        for event in &events {
            let before = graph.node_count() + graph.edge_count();
            let accepted = apply(&mut graph, event);
            let after = graph.node_count() + graph.edge_count();
            if accepted {
                prop_assert!(after >= before);
            } else {
                prop_assert_eq!(after, before);
            }
        }
    }

    /// The four seeded actors hold the first identities no matter what
    /// comes after them.
    #[test]
    fn seeded_actors_hold_the_first_identities(events in arb_events()) {
        let mut graph = PageGraph::new();
        for event in &events {
            apply(&mut graph, event);
        }

        let nodes = graph.nodes();
        prop_assert!(matches!(nodes[0].kind(), NodeKind::Parser));
        prop_assert!(matches!(nodes[1].kind(), NodeKind::Shields));
        prop_assert!(matches!(nodes[2].kind(), NodeKind::CookieJar));
        prop_assert!(matches!(nodes[3].kind(), NodeKind::LocalStorage));
        for (position, node) in nodes.iter().take(4).enumerate() {
            prop_assert_eq!(node.id().as_u64(), position as u64);
        }
    }
}
