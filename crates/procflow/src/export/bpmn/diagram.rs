//! BPMN diagram interchange (`bpmndi`) emission.
//!
//! Authored elements and flows take their geometry from the layout, which
//! was computed over the model before expansion. Nodes and flows generated
//! for entities get fixed-offset geometry relative to the entity task.

use std::collections::HashSet;

use log::debug;

use procflow_core::{
    geometry::{Bounds, Point},
    model::{Process, flow_key},
};

use super::{
    expansion::{self, EntityExpansions},
    tree::{NodeId, XmlTree},
};
use crate::layout::Layout;

/// Appends the `bpmndi:BPMNDiagram` section to `root`.
pub fn add_diagram(
    tree: &mut XmlTree,
    root: NodeId,
    process: &Process,
    layout: &Layout,
    expansions: &EntityExpansions,
) {
    let diagram = tree.append(root, "bpmndi:BPMNDiagram");
    tree.set_attribute(diagram, "id", format!("diagram_{}", process.id()));

    let mut plane = Plane::new(tree, diagram, process.id());

    for element in process.elements() {
        if let Some(bounds) = layout.position(element.id()) {
            plane.add_shape(element.id(), bounds);
        }
    }

    for (entity_id, expansion) in expansions.iter() {
        let Some(task) = layout.position(entity_id) else {
            continue;
        };
        let gateway = expansion::gateway_bounds(task);
        plane.add_shape(expansion.gateway_id(), gateway);
        plane.add_shape(expansion.error_id(), expansion::error_bounds(gateway));
    }

    for flow in process.flows() {
        // Flows leaving an entity are redrawn from its gateway below.
        if expansions.get(flow.source()).is_some() {
            continue;
        }

        let flow_id = flow.key();
        if let Some(route) = layout.route(&flow_id) {
            plane.add_edge(&flow_id, route.waypoints());
        }
    }

    for (entity_id, expansion) in expansions.iter() {
        let Some(task) = layout.position(entity_id) else {
            continue;
        };
        let gateway = expansion::gateway_bounds(task);
        let error = expansion::error_bounds(gateway);

        plane.add_edge(
            &flow_key(entity_id, expansion.gateway_id()),
            &[task.right_middle(), gateway.left_middle()],
        );
        plane.add_edge(
            &flow_key(expansion.gateway_id(), expansion.error_id()),
            &[gateway.bottom_middle(), error.top_middle()],
        );

        for flow in process.outgoing(entity_id) {
            let Some(target) = layout.position(flow.target()) else {
                continue;
            };
            plane.add_edge(
                &flow_key(expansion.gateway_id(), flow.target()),
                &[gateway.right_middle(), target.left_middle()],
            );
        }
    }

    debug!(
        shapes = plane.shapes.len(),
        edges = plane.edges.len();
        "Diagram emitted"
    );
}

/// The `bpmndi:BPMNPlane` being filled. Shape and edge ids are emitted once.
struct Plane<'t> {
    tree: &'t mut XmlTree,
    node: NodeId,
    shapes: HashSet<String>,
    edges: HashSet<String>,
}

impl<'t> Plane<'t> {
    fn new(tree: &'t mut XmlTree, diagram: NodeId, process_id: &str) -> Self {
        let node = tree.append(diagram, "bpmndi:BPMNPlane");
        tree.set_attribute(node, "id", format!("plane_{process_id}"));
        tree.set_attribute(node, "bpmnElement", process_id);

        Self {
            tree,
            node,
            shapes: HashSet::new(),
            edges: HashSet::new(),
        }
    }

    fn add_shape(&mut self, element_id: &str, bounds: Bounds) {
        if !self.shapes.insert(element_id.to_string()) {
            return;
        }

        let tree = &mut *self.tree;
        let shape = tree.append(self.node, "bpmndi:BPMNShape");
        tree.set_attribute(shape, "id", format!("shape_{element_id}"));
        tree.set_attribute(shape, "bpmnElement", element_id);

        let dc_bounds = tree.append(shape, "dc:Bounds");
        tree.set_attribute(dc_bounds, "x", coordinate(bounds.x()));
        tree.set_attribute(dc_bounds, "y", coordinate(bounds.y()));
        tree.set_attribute(dc_bounds, "width", coordinate(bounds.width()));
        tree.set_attribute(dc_bounds, "height", coordinate(bounds.height()));
    }

    fn add_edge(&mut self, flow_id: &str, waypoints: &[Point]) {
        if !self.edges.insert(flow_id.to_string()) {
            return;
        }

        let tree = &mut *self.tree;
        let edge = tree.append(self.node, "bpmndi:BPMNEdge");
        tree.set_attribute(edge, "id", format!("edge_{flow_id}"));
        tree.set_attribute(edge, "bpmnElement", flow_id);

        for point in waypoints {
            let waypoint = tree.append(edge, "di:waypoint");
            tree.set_attribute(waypoint, "x", coordinate(point.x()));
            tree.set_attribute(waypoint, "y", coordinate(point.y()));
        }
    }
}

/// Diagram coordinates are written as integers, truncated toward zero.
fn coordinate(value: f32) -> String {
    (value as i64).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_truncates() {
        assert_eq!(coordinate(165.9), "165");
        assert_eq!(coordinate(-0.5), "0");
        assert_eq!(coordinate(473.0), "473");
    }
}
