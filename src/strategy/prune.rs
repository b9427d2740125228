use std::collections::HashSet;

use super::graph::{GraphLink, GraphNode, NodeKind};

/// Graphs with more nodes than this get their link set thinned before layout.
pub const PRUNE_NODE_THRESHOLD: usize = 150;
/// Leading links kept as-is once pruning applies.
pub const PRUNE_KEEP_LEADING: usize = 500;
pub const PRUNE_LINK_CAP: usize = 1000;

/// Link set handed to the simulation for large graphs.
///
/// Above [`PRUNE_NODE_THRESHOLD`] nodes, the first [`PRUNE_KEEP_LEADING`]
/// links are kept in order, later links only when they touch an initiative,
/// and the result never exceeds [`PRUNE_LINK_CAP`]. The input is left alone;
/// callers get a copy.
pub fn prune_links(nodes: &[GraphNode], links: &[GraphLink]) -> Vec<GraphLink> {
    if nodes.len() <= PRUNE_NODE_THRESHOLD {
        return links.to_vec();
    }

    let initiatives = nodes
        .iter()
        .filter(|node| node.kind == NodeKind::Initiative)
        .map(|node| node.id.as_str())
        .collect::<HashSet<_>>();

    let mut pruned = Vec::with_capacity(links.len().min(PRUNE_LINK_CAP));
    pruned.extend(links.iter().take(PRUNE_KEEP_LEADING).cloned());

    for link in links.iter().skip(PRUNE_KEEP_LEADING) {
        if pruned.len() >= PRUNE_LINK_CAP {
            break;
        }

        let touches_initiative = [link.source_id(), link.target_id()]
            .into_iter()
            .flatten()
            .any(|id| initiatives.contains(id));
        if touches_initiative {
            pruned.push(link.clone());
        }
    }

    if pruned.len() < links.len() {
        tracing::debug!(
            nodes = nodes.len(),
            links = links.len(),
            kept = pruned.len(),
            "pruned links for layout"
        );
    }

    pruned
}
