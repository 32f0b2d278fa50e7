//! Automatic diagram layout for process models.
//!
//! The engine places elements left to right by level: start events sit at
//! level 0 and every other element one level after its furthest
//! predecessor. Elements sharing a level are stacked vertically, the
//! branches of a splitting gateway are fanned out around it, and every flow
//! gets an orthogonal route.
//!
//! The result is a [`Layout`]: element bounds keyed by element id and
//! routes keyed by the generated flow id (`flow_<source>_to_<target>`).

mod engine;
mod graph;

use std::collections::HashMap;

use indexmap::IndexMap;

use procflow_core::{
    geometry::{Bounds, Insets, Point, Size},
    model::ElementKind,
};

pub use engine::Engine;

/// Returns the fixed diagram size of an element kind.
pub fn element_size(kind: ElementKind) -> Size {
    match kind {
        ElementKind::StartEvent | ElementKind::EndEvent => Size::new(36.0, 36.0),
        ElementKind::ScriptCall | ElementKind::ServiceTask | ElementKind::ProcessEntity => {
            Size::new(100.0, 80.0)
        }
        ElementKind::XorGateway => Size::new(50.0, 50.0),
    }
}

/// The polyline drawn for one flow.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    source: String,
    target: String,
    waypoints: Vec<Point>,
}

impl Route {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        waypoints: Vec<Point>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            waypoints,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn waypoints(&self) -> &[Point] {
        &self.waypoints
    }
}

/// Computed positions and routes for one process.
///
/// Elements that the level assignment never reached are absent from the
/// positions, and flows touching them have no route.
#[derive(Debug, Clone)]
pub struct Layout {
    positions: IndexMap<String, Bounds>,
    routes: IndexMap<String, Route>,
    levels: HashMap<String, usize>,
    margins: Insets,
}

impl Layout {
    pub(crate) fn new(
        positions: IndexMap<String, Bounds>,
        routes: IndexMap<String, Route>,
        levels: HashMap<String, usize>,
        margins: Insets,
    ) -> Self {
        Self {
            positions,
            routes,
            levels,
            margins,
        }
    }

    /// Returns all element bounds, ordered by level then by declaration.
    pub fn positions(&self) -> &IndexMap<String, Bounds> {
        &self.positions
    }

    /// Returns all flow routes keyed by flow id.
    pub fn routes(&self) -> &IndexMap<String, Route> {
        &self.routes
    }

    /// Returns the bounds of the element with the given id.
    pub fn position(&self, id: &str) -> Option<Bounds> {
        self.positions.get(id).copied()
    }

    /// Returns the route of the flow with the given id.
    pub fn route(&self, flow_id: &str) -> Option<&Route> {
        self.routes.get(flow_id)
    }

    /// Returns the level assigned to the element with the given id.
    pub fn level_of(&self, id: &str) -> Option<usize> {
        self.levels.get(id).copied()
    }

    /// Returns the area covered by all elements, grown by the margins.
    ///
    /// An empty layout covers a 100×100 area at the origin.
    pub fn diagram_bounds(&self) -> Bounds {
        let mut positions = self.positions.values();
        let Some(first) = positions.next() else {
            return Bounds::new(0.0, 0.0, 100.0, 100.0);
        };

        positions
            .fold(*first, |acc, bounds| acc.merge(bounds))
            .add_padding(self.margins)
    }
}
