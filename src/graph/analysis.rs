//! Reference Graph Analysis
//!
//! Builds a petgraph view of the reference graph for cycle reporting and
//! GraphViz export. Duplicate parent -> child references collapse into a
//! single edge here; the [`ReferenceGraph`] itself keeps them.

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};

use super::{ReferenceGraph, Title};

/// Directed parent -> child graph with one node per title
pub fn to_petgraph(graph: &ReferenceGraph) -> (DiGraph<Title, ()>, HashMap<Title, NodeIndex>) {
    let mut out = DiGraph::with_capacity(graph.len(), graph.reference_count());
    let mut indices = HashMap::with_capacity(graph.len());

    for title in graph.titles() {
        indices.insert(title.clone(), out.add_node(title.clone()));
    }

    let mut seen = HashSet::new();
    for (title, entry) in graph.iter() {
        let from = indices[title];
        for child in &entry.children {
            let Some(&to) = indices.get(child) else {
                continue;
            };
            if seen.insert((from, to)) {
                out.add_edge(from, to, ());
            }
        }
    }

    (out, indices)
}

/// Groups of titles that reference each other, directly or transitively
///
/// Self-references count as a cycle of one.
pub fn cycles(graph: &ReferenceGraph) -> Vec<Vec<Title>> {
    let (pg, _) = to_petgraph(graph);

    let mut groups: Vec<Vec<Title>> = kosaraju_scc(&pg)
        .into_iter()
        .filter(|scc| scc.len() > 1 || pg.contains_edge(scc[0], scc[0]))
        .map(|scc| {
            let mut titles: Vec<Title> = scc
                .into_iter()
                .filter_map(|idx| pg.node_weight(idx).cloned())
                .collect();
            titles.sort();
            titles
        })
        .collect();
    groups.sort();
    groups
}

/// Export the reference graph to GraphViz DOT format
///
/// Placeholders (titles only ever seen as parents) are drawn dashed.
pub fn to_dot(graph: &ReferenceGraph) -> String {
    let (pg, _) = to_petgraph(graph);
    let mut output = String::new();

    output.push_str("digraph ReferenceGraph {\n");
    output.push_str("  rankdir=LR;\n");
    output.push_str(
        "  node [shape=box, style=\"rounded\", fontname=\"Helvetica\", fontsize=10];\n",
    );
    output.push('\n');

    for idx in pg.node_indices() {
        let title = &pg[idx];
        let style = match graph.get(title) {
            Some(entry) if entry.is_placeholder() => ", style=\"rounded,dashed\"",
            _ => "",
        };
        let label = graph
            .get(title)
            .and_then(|e| e.schema.as_ref())
            .and_then(|s| s.get("typeName"))
            .and_then(|t| t.as_str())
            .filter(|t| !t.is_empty())
            .unwrap_or(title);
        output.push_str(&format!(
            "  \"{}\" [label=\"{}\"{}];\n",
            escape(title),
            escape(label),
            style
        ));
    }

    output.push('\n');

    for edge in pg.edge_references() {
        output.push_str(&format!(
            "  \"{}\" -> \"{}\";\n",
            escape(&pg[edge.source()]),
            escape(&pg[edge.target()])
        ));
    }

    output.push_str("}\n");
    output
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
