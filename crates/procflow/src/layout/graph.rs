//! Graph view of a process used by the layout engine.
//!
//! The graph borrows the process model and indexes its flows by source and
//! target. Nodes keep declaration order and edges keep flow order, so every
//! traversal built on top of it is deterministic.
//!
//! Flows whose source or target is not a declared element are left out of
//! the graph entirely; they have nothing to lay out against.

use std::collections::HashMap;

use indexmap::IndexMap;

use procflow_core::model::{Element, ElementKind, Flow, Process};

/// Index of an edge in [`ProcessGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) struct EdgeIndex(usize);

/// A directed edge between two declared elements, stored by its target.
#[derive(Debug)]
struct Edge<'a> {
    target: &'a str,
}

/// Directed graph over the elements and flows of one process.
#[derive(Debug)]
pub(super) struct ProcessGraph<'a> {
    nodes: IndexMap<&'a str, &'a Element>,
    edges: Vec<Edge<'a>>,
    incoming_edges: HashMap<&'a str, Vec<EdgeIndex>>,
    outgoing_edges: HashMap<&'a str, Vec<EdgeIndex>>,
}

impl<'a> ProcessGraph<'a> {
    /// Builds the graph of `process`.
    ///
    /// When two elements share an id the first declaration wins.
    pub(super) fn from_process(process: &'a Process) -> Self {
        let mut graph = Self {
            nodes: IndexMap::new(),
            edges: Vec::new(),
            incoming_edges: HashMap::new(),
            outgoing_edges: HashMap::new(),
        };

        for element in process.elements() {
            graph.nodes.entry(element.id()).or_insert(element);
        }
        for flow in process.flows() {
            graph.add_edge(flow);
        }

        graph
    }

    /// Returns the element with the given id, if it exists.
    pub(super) fn node(&self, id: &str) -> Option<&'a Element> {
        self.nodes.get(id).copied()
    }

    /// Returns an iterator over all elements, in declaration order.
    pub(super) fn nodes(&self) -> impl Iterator<Item = &'a Element> + '_ {
        self.nodes.values().copied()
    }

    /// Returns the total number of distinct elements in the graph.
    pub(super) fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the start events, in declaration order.
    pub(super) fn start_nodes(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.nodes
            .iter()
            .filter(|(_, element)| element.kind() == ElementKind::StartEvent)
            .map(|(id, _)| *id)
    }

    /// Returns the elements without incoming edges, in declaration order.
    pub(super) fn roots(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.nodes
            .keys()
            .copied()
            .filter(|id| !self.incoming_edges.contains_key(id))
    }

    /// Returns the targets of the edges leaving `id`, in flow order.
    ///
    /// Parallel flows yield the same target more than once.
    pub(super) fn successors(&self, id: &str) -> impl Iterator<Item = &'a str> + '_ {
        self.outgoing_edges
            .get(id)
            .into_iter()
            .flatten()
            .map(|idx| self.edges[idx.0].target)
    }

    /// Adds the edge for `flow` when both of its endpoints are declared.
    ///
    /// Returns the new edge index, or `None` if the flow was skipped.
    fn add_edge(&mut self, flow: &'a Flow) -> Option<EdgeIndex> {
        let (source, _) = self.nodes.get_key_value(flow.source())?;
        let (target, _) = self.nodes.get_key_value(flow.target())?;
        let (source, target) = (*source, *target);

        let idx = EdgeIndex(self.edges.len());
        self.edges.push(Edge { target });
        self.outgoing_edges.entry(source).or_default().push(idx);
        self.incoming_edges.entry(target).or_default().push(idx);
        Some(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Process {
        Process::new("p", "P")
            .with_element(Element::start_event("s", "S"))
            .with_element(Element::xor_gateway("g", "G"))
            .with_element(Element::end_event("a", "A"))
            .with_element(Element::end_event("b", "B"))
            .with_flow(Flow::new("s", "g"))
            .with_flow(Flow::conditional("g", "b", "x > 1"))
            .with_flow(Flow::default_flow("g", "a"))
            .with_flow(Flow::new("g", "ghost"))
    }

    #[test]
    fn test_successors_follow_flow_order() {
        let process = sample();
        let graph = ProcessGraph::from_process(&process);

        assert_eq!(graph.successors("g").collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(graph.successors("a").count(), 0);
    }

    #[test]
    fn test_flows_with_missing_endpoints_are_skipped() {
        let process = sample();
        let graph = ProcessGraph::from_process(&process);

        assert!(graph.node("ghost").is_none());
        assert!(!graph.successors("g").any(|id| id == "ghost"));
        assert_eq!(graph.nodes_count(), 4);
    }

    #[test]
    fn test_roots_and_start_nodes() {
        let process = sample();
        let graph = ProcessGraph::from_process(&process);

        assert_eq!(graph.start_nodes().collect::<Vec<_>>(), vec!["s"]);
        assert_eq!(graph.roots().collect::<Vec<_>>(), vec!["s"]);
    }

    #[test]
    fn test_duplicate_ids_keep_first_declaration() {
        let process = Process::new("p", "P")
            .with_element(Element::start_event("x", "First"))
            .with_element(Element::end_event("x", "Second"));
        let graph = ProcessGraph::from_process(&process);

        assert_eq!(graph.nodes_count(), 1);
        assert_eq!(graph.node("x").map(Element::name), Some("First"));
    }
}
