use std::collections::HashMap;

use log::trace;

use super::tree::{NodeId, XmlTree};

/// Scratch state for a single document generation.
///
/// Created fresh for every export call and passed down explicitly; it never
/// outlives the call that created it.
#[derive(Debug, Default)]
pub struct GenerationContext {
    gateways: HashMap<String, NodeId>,
}

impl GenerationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remembers the emitted node of a gateway so its default flow can be
    /// stamped later.
    pub fn register_gateway(&mut self, id: impl Into<String>, node: NodeId) {
        self.gateways.insert(id.into(), node);
    }

    /// Sets `default` on the gateway node registered under `gateway_id`.
    ///
    /// Returns `false` when no such gateway was emitted. A later call for the
    /// same gateway overwrites the earlier flow id.
    pub fn stamp_default(&self, tree: &mut XmlTree, gateway_id: &str, flow_id: &str) -> bool {
        let Some(&node) = self.gateways.get(gateway_id) else {
            return false;
        };

        trace!(gateway_id, flow_id; "Stamping default flow");
        tree.set_attribute(node, "default", flow_id);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamp_registered_gateway() {
        let mut tree = XmlTree::new("process");
        let root = tree.root();
        let gateway = tree.append(root, "exclusiveGateway");

        let mut context = GenerationContext::new();
        context.register_gateway("g", gateway);

        assert!(context.stamp_default(&mut tree, "g", "flow_g_to_a"));
        assert_eq!(tree.attribute(gateway, "default"), Some("flow_g_to_a"));
    }

    #[test]
    fn test_stamp_unknown_gateway_is_noop() {
        let mut tree = XmlTree::new("process");
        let context = GenerationContext::new();

        let stamped = context.stamp_default(&mut tree, "task", "flow_task_to_end");
        assert!(!stamped);
        assert_eq!(tree.attribute(tree.root(), "default"), None);
    }
}
