//! Level-based layout engine
//!
//! This module provides the layout engine for process diagrams using a
//! simple, deterministic algorithm:
//!
//! 1. Assign every element a level by breadth-first propagation from the
//!    start events.
//! 2. Place levels left to right and stack the elements of a level.
//! 3. Fan out the successors of every splitting gateway around it.
//! 4. Route every flow from the right edge of its source to the left edge
//!    of its target.

use std::collections::{BTreeMap, HashMap, VecDeque};

use indexmap::IndexMap;
use log::{debug, trace};

use procflow_core::{
    geometry::{Bounds, Insets, Point},
    model::{ElementKind, Flow, Process, flow_key},
};

use super::{Layout, Route, element_size, graph::ProcessGraph};
use crate::config::LayoutConfig;

/// Layout engine for process diagrams.
#[derive(Debug, Clone)]
pub struct Engine {
    margins: Insets,
    level_spacing: f32,
    vertical_spacing: f32,
    gateway_branch_spacing: f32,
    base_offset: f32,
    straight_tolerance: f32,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(&LayoutConfig::default())
    }
}

impl Engine {
    /// Create a layout engine from the layout configuration.
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            margins: Insets::uniform(config.margin()),
            level_spacing: config.level_spacing(),
            vertical_spacing: config.vertical_spacing(),
            gateway_branch_spacing: config.gateway_branch_spacing(),
            base_offset: config.base_offset(),
            straight_tolerance: config.straight_tolerance(),
        }
    }

    /// Calculate the layout for a process.
    pub fn calculate_layout(&self, process: &Process) -> Layout {
        let graph = ProcessGraph::from_process(process);

        // Step 1: Assign levels
        let levels = Self::assign_levels(&graph);

        // Step 2: Group into level buckets, keeping declaration order
        let buckets = Self::level_buckets(&graph, &levels);

        // Step 3: Base positions per level
        let mut positions = self.position_elements(&graph, &buckets);

        // Step 4: Fan out gateway branches
        self.adjust_gateway_branches(process, &graph, &mut positions);

        // Step 5: Route flows
        let routes = self.calculate_routes(process, &positions);

        debug!(
            levels = buckets.len(),
            positioned = positions.len(),
            routes = routes.len();
            "Layout calculated"
        );

        let levels = levels
            .into_iter()
            .map(|(id, level)| (id.to_string(), level))
            .collect();
        Layout::new(positions, routes, levels, self.margins)
    }

    /// Assigns each reachable element the length of the longest path from a
    /// seed element.
    ///
    /// Seeds are the start events, or every element without an incoming flow
    /// when there are none. A successor is re-queued only when its level
    /// strictly increases, and never beyond `element_count - 1`, the longest
    /// simple path; cycles therefore terminate.
    fn assign_levels<'a>(graph: &ProcessGraph<'a>) -> HashMap<&'a str, usize> {
        let mut seeds: Vec<&str> = graph.start_nodes().collect();
        if seeds.is_empty() {
            seeds = graph.roots().collect();
        }

        let max_level = graph.nodes_count().saturating_sub(1);
        let mut levels: HashMap<&'a str, usize> = HashMap::new();
        let mut queue = VecDeque::new();

        for seed in seeds {
            levels.insert(seed, 0);
            queue.push_back((seed, 0));
        }

        while let Some((id, level)) = queue.pop_front() {
            // Skip entries superseded by a later increase.
            if levels.get(id) != Some(&level) {
                continue;
            }

            let next = level + 1;
            if next > max_level {
                continue;
            }

            for successor in graph.successors(id) {
                if levels.get(successor).is_none_or(|&current| current < next) {
                    levels.insert(successor, next);
                    queue.push_back((successor, next));
                }
            }
        }

        levels
    }

    /// Groups leveled elements by level, in declaration order within a level.
    fn level_buckets<'a>(
        graph: &ProcessGraph<'a>,
        levels: &HashMap<&'a str, usize>,
    ) -> BTreeMap<usize, Vec<&'a str>> {
        let mut buckets: BTreeMap<usize, Vec<&'a str>> = BTreeMap::new();
        for element in graph.nodes() {
            if let Some(&level) = levels.get(element.id()) {
                buckets.entry(level).or_default().push(element.id());
            }
        }
        buckets
    }

    /// Position elements level by level.
    ///
    /// Each level is as wide as its widest element; elements of a level are
    /// stacked from the base offset down at the vertical pitch.
    fn position_elements(
        &self,
        graph: &ProcessGraph<'_>,
        buckets: &BTreeMap<usize, Vec<&str>>,
    ) -> IndexMap<String, Bounds> {
        let mut positions = IndexMap::new();
        let mut x = self.margins.left();
        let start_y = self.margins.top() + self.base_offset;

        for ids in buckets.values() {
            let mut level_width: f32 = 0.0;

            for (i, &id) in ids.iter().enumerate() {
                let Some(element) = graph.node(id) else {
                    continue;
                };
                let size = element_size(element.kind());
                let y = start_y + i as f32 * self.vertical_spacing;

                trace!(id, x, y; "Positioned element");
                let bounds = Bounds::new(x, y, size.width(), size.height());
                positions.insert(id.to_string(), bounds);
                level_width = level_width.max(size.width());
            }

            x += level_width + self.level_spacing;
        }

        positions
    }

    /// Spread the successors of every splitting gateway around its center.
    ///
    /// Gateways are processed in declaration order using their current
    /// position, so when two gateways share a successor the later one wins.
    /// Every outgoing flow takes a slot in the fan, including flows to an
    /// undeclared target; only positioned targets are moved.
    fn adjust_gateway_branches(
        &self,
        process: &Process,
        graph: &ProcessGraph<'_>,
        positions: &mut IndexMap<String, Bounds>,
    ) {
        for gateway in graph.nodes() {
            if gateway.kind() != ElementKind::XorGateway {
                continue;
            }

            let successors: Vec<&str> = process.outgoing(gateway.id()).map(Flow::target).collect();
            if successors.len() <= 1 {
                continue;
            }

            let Some(gateway_bounds) = positions.get(gateway.id()).copied() else {
                continue;
            };

            let total_span = (successors.len() - 1) as f32 * self.gateway_branch_spacing;
            let start_y = gateway_bounds.center().y() - total_span / 2.0;

            for (i, successor) in successors.into_iter().enumerate() {
                if let Some(bounds) = positions.get_mut(successor) {
                    let center_y = start_y + i as f32 * self.gateway_branch_spacing;
                    *bounds = bounds.with_y(center_y - bounds.height() / 2.0);
                }
            }
        }
    }

    /// Calculate a route for every flow whose endpoints are both positioned.
    fn calculate_routes(
        &self,
        process: &Process,
        positions: &IndexMap<String, Bounds>,
    ) -> IndexMap<String, Route> {
        let mut routes = IndexMap::new();

        for flow in process.flows() {
            let (Some(source), Some(target)) =
                (positions.get(flow.source()), positions.get(flow.target()))
            else {
                continue;
            };

            let waypoints = self.waypoints(*source, *target);
            routes.insert(
                flow_key(flow.source(), flow.target()),
                Route::new(flow.source(), flow.target(), waypoints),
            );
        }

        routes
    }

    /// Straight when both centers are level, otherwise orthogonal through
    /// the horizontal midpoint.
    fn waypoints(&self, source: Bounds, target: Bounds) -> Vec<Point> {
        let start = source.right_middle();
        let end = target.left_middle();

        if (start.y() - end.y()).abs() < self.straight_tolerance {
            return vec![start, end];
        }

        let mid_x = start.midpoint(end).x();
        vec![
            start,
            Point::new(mid_x, start.y()),
            Point::new(mid_x, end.y()),
            end,
        ]
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use proptest::prelude::*;
    use procflow_core::model::{Element, ProcessEntity, ScriptCall};

    use super::*;

    fn linear() -> Process {
        Process::new("p", "P")
            .with_element(Element::start_event("s", "Start"))
            .with_element(ScriptCall::new("t", "Task", "1 + 1").into())
            .with_element(Element::end_event("e", "End"))
            .with_flow(Flow::new("s", "t"))
            .with_flow(Flow::new("t", "e"))
    }

    fn gateway_split() -> Process {
        Process::new("p", "P")
            .with_element(Element::start_event("s", "Start"))
            .with_element(Element::xor_gateway("g", "Route"))
            .with_element(Element::end_event("a", "A"))
            .with_element(Element::end_event("b", "B"))
            .with_flow(Flow::new("s", "g"))
            .with_flow(Flow::conditional("g", "a", "x > 1000"))
            .with_flow(Flow::default_flow("g", "b"))
    }

    #[test]
    fn test_linear_positions() {
        let layout = Engine::default().calculate_layout(&linear());

        assert_eq!(
            layout.position("s"),
            Some(Bounds::new(50.0, 150.0, 36.0, 36.0))
        );
        assert_eq!(
            layout.position("t"),
            Some(Bounds::new(286.0, 150.0, 100.0, 80.0))
        );
        assert_eq!(
            layout.position("e"),
            Some(Bounds::new(586.0, 150.0, 36.0, 36.0))
        );
        assert_eq!(layout.level_of("e"), Some(2));
    }

    #[test]
    fn test_orthogonal_route_through_mid_x() {
        let layout = Engine::default().calculate_layout(&linear());
        let route = layout.route("flow_s_to_t").expect("route exists");

        assert_eq!(
            route.waypoints(),
            &[
                Point::new(86.0, 168.0),
                Point::new(186.0, 168.0),
                Point::new(186.0, 190.0),
                Point::new(286.0, 190.0),
            ]
        );
    }

    #[test]
    fn test_straight_route_within_tolerance() {
        let process = Process::new("p", "P")
            .with_element(Element::start_event("s", "Start"))
            .with_element(Element::end_event("e", "End"))
            .with_flow(Flow::new("s", "e"));
        let layout = Engine::default().calculate_layout(&process);
        let route = layout.route("flow_s_to_e").expect("route exists");

        assert_eq!(
            route.waypoints(),
            &[Point::new(86.0, 168.0), Point::new(286.0, 168.0)]
        );
    }

    #[test]
    fn test_gateway_branches_fan_out() {
        let layout = Engine::default().calculate_layout(&gateway_split());

        let gateway = layout.position("g").expect("gateway positioned");
        assert_approx_eq!(f32, gateway.center().y(), 175.0);

        let a = layout.position("a").expect("a positioned");
        let b = layout.position("b").expect("b positioned");
        assert_approx_eq!(f32, a.y(), 97.0);
        assert_approx_eq!(f32, b.y(), 217.0);
        assert_approx_eq!(f32, a.x(), 536.0);
        assert_approx_eq!(f32, b.x(), 536.0);
    }

    #[test]
    fn test_flow_to_undeclared_target_keeps_its_fan_slot() {
        let process = Process::new("p", "P")
            .with_element(Element::start_event("s", "Start"))
            .with_element(Element::xor_gateway("g", "Route"))
            .with_element(Element::end_event("a", "A"))
            .with_flow(Flow::new("s", "g"))
            .with_flow(Flow::new("g", "a"))
            .with_flow(Flow::new("g", "ghost"));

        let layout = Engine::default().calculate_layout(&process);

        let a = layout.position("a").expect("a positioned");
        assert_approx_eq!(f32, a.y(), 97.0);
        assert!(layout.position("ghost").is_none());
    }

    #[test]
    fn test_same_level_stacking_keeps_declaration_order() {
        let process = Process::new("p", "P")
            .with_element(Element::start_event("s", "Start"))
            .with_element(ScriptCall::new("zeta", "Z", "1").into())
            .with_element(ScriptCall::new("alpha", "A", "2").into())
            .with_flow(Flow::new("s", "zeta"))
            .with_flow(Flow::new("s", "alpha"));

        let layout = Engine::default().calculate_layout(&process);

        assert_approx_eq!(f32, layout.position("zeta").expect("zeta").y(), 150.0);
        assert_approx_eq!(f32, layout.position("alpha").expect("alpha").y(), 250.0);
    }

    #[test]
    fn test_process_entity_sized_as_task() {
        let entity = ProcessEntity::new("check", "Check", "Order", "order.yaml");
        let process = Process::new("p", "P")
            .with_element(Element::start_event("s", "Start"))
            .with_element(entity.into())
            .with_flow(Flow::new("s", "check"));

        let layout = Engine::default().calculate_layout(&process);
        let bounds = layout.position("check").expect("entity positioned");

        assert_approx_eq!(f32, bounds.width(), 100.0);
        assert_approx_eq!(f32, bounds.height(), 80.0);
    }

    #[test]
    fn test_unreached_elements_are_not_positioned() {
        let process = linear().with_element(Element::end_event("orphan", "Orphan"));
        let layout = Engine::default().calculate_layout(&process);

        assert!(layout.position("orphan").is_none());
        assert_eq!(layout.positions().len(), 3);
    }

    #[test]
    fn test_missing_endpoint_has_no_route() {
        let process = linear().with_flow(Flow::new("s", "ghost"));
        let layout = Engine::default().calculate_layout(&process);

        assert!(layout.route("flow_s_to_ghost").is_none());
        assert_eq!(layout.routes().len(), 2);
    }

    #[test]
    fn test_roots_seed_levels_without_start_event() {
        let process = Process::new("p", "P")
            .with_element(ScriptCall::new("a", "A", "1").into())
            .with_element(ScriptCall::new("b", "B", "2").into())
            .with_flow(Flow::new("a", "b"));

        let layout = Engine::default().calculate_layout(&process);

        assert_eq!(layout.level_of("a"), Some(0));
        assert_eq!(layout.level_of("b"), Some(1));
    }

    #[test]
    fn test_cycle_terminates_with_capped_levels() {
        let process = Process::new("p", "P")
            .with_element(Element::start_event("s", "Start"))
            .with_element(ScriptCall::new("a", "A", "1").into())
            .with_element(ScriptCall::new("b", "B", "2").into())
            .with_element(Element::end_event("e", "End"))
            .with_flow(Flow::new("s", "a"))
            .with_flow(Flow::new("a", "b"))
            .with_flow(Flow::new("b", "a"))
            .with_flow(Flow::new("b", "e"));

        let layout = Engine::default().calculate_layout(&process);

        assert_eq!(layout.positions().len(), 4);
        for id in ["s", "a", "b", "e"] {
            let level = layout.level_of(id).expect("leveled");
            assert!(level <= 3, "{id} at level {level}");
        }
    }

    fn dag_process(size: usize, edges: &[(usize, usize)]) -> Process {
        let mut process = Process::new("p", "P").with_element(Element::start_event("n0", "N0"));
        for i in 1..size {
            let task = ScriptCall::new(format!("n{i}"), format!("N{i}"), "1");
            process = process.with_element(task.into());
        }
        for &(a, b) in edges {
            process = process.with_flow(Flow::new(format!("n{a}"), format!("n{b}")));
        }
        process
    }

    proptest! {
        #[test]
        fn acyclic_flows_increase_level(
            size in 2usize..10,
            raw_edges in prop::collection::vec((0usize..10, 0usize..10), 0..25),
        ) {
            let edges: Vec<(usize, usize)> = raw_edges
                .into_iter()
                .map(|(a, b)| (a % size, b % size))
                .filter(|(a, b)| a < b)
                .collect();
            let process = dag_process(size, &edges);
            let layout = Engine::default().calculate_layout(&process);

            for &(a, b) in &edges {
                let (source, target) = (format!("n{a}"), format!("n{b}"));
                if let (Some(ls), Some(lt)) = (layout.level_of(&source), layout.level_of(&target)) {
                    prop_assert!(lt >= ls + 1, "{source}@{ls} -> {target}@{lt}");
                }
            }
        }

        #[test]
        fn cyclic_graphs_terminate_within_cap(
            size in 2usize..8,
            raw_edges in prop::collection::vec((0usize..8, 0usize..8), 0..20),
        ) {
            let edges: Vec<(usize, usize)> = raw_edges
                .into_iter()
                .map(|(a, b)| (a % size, b % size))
                .collect();
            let process = dag_process(size, &edges);
            let layout = Engine::default().calculate_layout(&process);

            for i in 0..size {
                if let Some(level) = layout.level_of(&format!("n{i}")) {
                    prop_assert!(level < size);
                }
            }
        }
    }
}
