//! Read-only traversal of a process model.
//!
//! Default implementations walk the whole model so implementors override
//! only the methods they care about. The `walk_*` functions hold the default
//! traversal so an override can still descend after doing its own work.

use std::fmt;

use procflow_core::model::{
    Element, Event, Flow, Process, ProcessEntity, ScriptCall, ServiceTask, VariableMapping,
    XorGateway,
};

/// Visitor trait for traversing/analyzing a process model.
pub trait Visitor {
    /// Visit a complete process
    fn visit_process(&mut self, process: &Process) {
        self.visit_elements(process.elements());
        self.visit_flows(process.flows());
    }

    /// Visit the element list, in declaration order
    fn visit_elements(&mut self, elements: &[Element]) {
        for element in elements {
            self.visit_element(element);
        }
    }

    /// Visit a single element and dispatch on its kind
    fn visit_element(&mut self, element: &Element) {
        walk_element(self, element);
    }

    fn visit_start_event(&mut self, _event: &Event) {}

    fn visit_end_event(&mut self, _event: &Event) {}

    fn visit_script_call(&mut self, script: &ScriptCall) {
        walk_mappings(
            self,
            &script.id,
            &script.input_mappings,
            &script.output_mappings,
        );
    }

    fn visit_service_task(&mut self, task: &ServiceTask) {
        walk_mappings(self, &task.id, &task.input_mappings, &task.output_mappings);
    }

    fn visit_process_entity(&mut self, _entity: &ProcessEntity) {}

    fn visit_xor_gateway(&mut self, _gateway: &XorGateway) {}

    /// Visit one io mapping owned by the element `owner`
    fn visit_mapping(
        &mut self,
        _owner: &str,
        _direction: MappingDirection,
        _mapping: &VariableMapping,
    ) {
    }

    /// Visit the flow list, in declaration order
    fn visit_flows(&mut self, flows: &[Flow]) {
        for flow in flows {
            self.visit_flow(flow);
        }
    }

    fn visit_flow(&mut self, _flow: &Flow) {}
}

/// Which side of a task an io mapping belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingDirection {
    Input,
    Output,
}

impl fmt::Display for MappingDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingDirection::Input => write!(f, "input"),
            MappingDirection::Output => write!(f, "output"),
        }
    }
}

/// Dispatches `element` to the visitor method for its kind.
pub fn walk_element<V: Visitor + ?Sized>(visitor: &mut V, element: &Element) {
    match element {
        Element::StartEvent(event) => visitor.visit_start_event(event),
        Element::EndEvent(event) => visitor.visit_end_event(event),
        Element::ScriptCall(script) => visitor.visit_script_call(script),
        Element::ServiceTask(task) => visitor.visit_service_task(task),
        Element::ProcessEntity(entity) => visitor.visit_process_entity(entity),
        Element::XorGateway(gateway) => visitor.visit_xor_gateway(gateway),
    }
}

/// Visits input mappings, then output mappings, of the element `owner`.
pub fn walk_mappings<V: Visitor + ?Sized>(
    visitor: &mut V,
    owner: &str,
    inputs: &[VariableMapping],
    outputs: &[VariableMapping],
) {
    for mapping in inputs {
        visitor.visit_mapping(owner, MappingDirection::Input, mapping);
    }
    for mapping in outputs {
        visitor.visit_mapping(owner, MappingDirection::Output, mapping);
    }
}
