//! BPMN 2.0 XML exporter with Zeebe extensions.
//!
//! The document is built as an [`XmlTree`] and serialized in one pass. Per
//! call state ([`GenerationContext`] and [`EntityExpansions`]) is created
//! inside [`BpmnExporter::export_process`] and threaded through explicitly,
//! so one exporter can serve any number of independent calls.

mod context;
mod diagram;
mod expansion;
mod feel;
mod tree;

use std::collections::HashSet;

use log::{debug, info};

use procflow_core::model::{
    Element, Event, Flow, Process, ProcessEntity, ScriptCall, ServiceTask, VariableMapping,
    XorGateway, flow_key,
};

use crate::{
    config::ExportConfig,
    export::{Error, Exporter},
    layout::Layout,
};

use context::GenerationContext;
use expansion::{EntityExpansion, EntityExpansions};
use tree::{NodeId, XmlTree};

pub const BPMN_MODEL_NS: &str = "http://www.omg.org/spec/BPMN/20100524/MODEL";

/// Prefixed namespaces declared on the root, in declaration order.
const PREFIXED_NAMESPACES: [(&str, &str); 5] = [
    ("xmlns:bpmndi", "http://www.omg.org/spec/BPMN/20100524/DI"),
    ("xmlns:dc", "http://www.omg.org/spec/DD/20100524/DC"),
    ("xmlns:di", "http://www.omg.org/spec/DD/20100524/DI"),
    ("xmlns:zeebe", "http://camunda.org/schema/zeebe/1.0"),
    ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
];

/// Exports a process to a BPMN document.
pub struct BpmnExporter<'a> {
    config: &'a ExportConfig,
}

impl<'a> BpmnExporter<'a> {
    pub fn new(config: &'a ExportConfig) -> Self {
        Self { config }
    }

    fn add_definitions_attributes(&self, tree: &mut XmlTree, root: NodeId, process: &Process) {
        tree.set_attribute(root, "id", format!("definitions_{}", process.id()));
        tree.set_attribute(root, "targetNamespace", self.config.target_namespace());
        tree.set_attribute(root, "exporter", self.config.exporter());
        tree.set_attribute(root, "exporterVersion", self.config.exporter_version());
        tree.set_attribute(root, "xmlns", BPMN_MODEL_NS);
        for (name, uri) in PREFIXED_NAMESPACES {
            tree.set_attribute(root, name, uri);
        }
    }
}

impl Exporter for BpmnExporter<'_> {
    fn export_process(&self, process: &Process, layout: &Layout) -> Result<String, Error> {
        info!(process_id = process.id(); "Generating BPMN document");

        let expansions = EntityExpansions::from_process(process);
        let mut context = GenerationContext::new();

        let mut tree = XmlTree::new("definitions");
        let root = tree.root();
        self.add_definitions_attributes(&mut tree, root, process);

        if !expansions.is_empty() {
            add_shared_error(&mut tree, root);
        }

        let process_node = tree.append(root, "process");
        tree.set_attribute(process_node, "id", process.id());
        tree.set_attribute(process_node, "name", process.name());
        tree.set_attribute(process_node, "isExecutable", "true");

        for element in process.elements() {
            add_element(&mut tree, process_node, element, &expansions, &mut context);
        }
        add_flows(&mut tree, process_node, process, &expansions, &context);

        diagram::add_diagram(&mut tree, root, process, layout, &expansions);

        debug!(
            elements = process.elements().len(),
            flows = process.flows().len(),
            expanded_entities = expansions.len();
            "BPMN document built"
        );

        tree.to_xml_string()
    }
}

fn add_shared_error(tree: &mut XmlTree, root: NodeId) {
    let error = tree.append(root, "error");
    tree.set_attribute(error, "id", expansion::SHARED_ERROR_ID);
    tree.set_attribute(error, "name", expansion::SHARED_ERROR_NAME);
    tree.set_attribute(error, "errorCode", expansion::SHARED_ERROR_CODE);
}

fn add_element(
    tree: &mut XmlTree,
    parent: NodeId,
    element: &Element,
    expansions: &EntityExpansions,
    context: &mut GenerationContext,
) {
    match element {
        Element::StartEvent(event) => add_event(tree, parent, "startEvent", event),
        Element::EndEvent(event) => add_event(tree, parent, "endEvent", event),
        Element::ScriptCall(script) => add_script_task(tree, parent, script),
        Element::ServiceTask(service) => add_service_task(tree, parent, service),
        Element::ProcessEntity(entity) => {
            if let Some(expansion) = expansions.get(&entity.id) {
                add_process_entity(tree, parent, entity, expansion, context);
            }
        }
        Element::XorGateway(gateway) => add_xor_gateway(tree, parent, gateway, context),
    }
}

fn add_named(
    tree: &mut XmlTree,
    parent: NodeId,
    tag: &'static str,
    id: &str,
    name: &str,
) -> NodeId {
    let node = tree.append(parent, tag);
    tree.set_attribute(node, "id", id);
    tree.set_attribute(node, "name", name);
    node
}

fn add_event(tree: &mut XmlTree, parent: NodeId, tag: &'static str, event: &Event) {
    add_named(tree, parent, tag, &event.id, &event.name);
}

fn add_script_task(tree: &mut XmlTree, parent: NodeId, script: &ScriptCall) {
    let task = add_named(tree, parent, "scriptTask", &script.id, &script.name);
    let extensions = tree.append(task, "extensionElements");

    let zeebe_script = tree.append(extensions, "zeebe:script");
    tree.set_attribute(zeebe_script, "expression", feel::normalize(&script.script));
    tree.set_attribute(
        zeebe_script,
        "resultVariable",
        script.result_variable.as_str(),
    );

    add_io_mapping(
        tree,
        extensions,
        &script.input_mappings,
        &script.output_mappings,
    );
}

fn add_service_task(tree: &mut XmlTree, parent: NodeId, service: &ServiceTask) {
    let task = add_named(tree, parent, "serviceTask", &service.id, &service.name);
    let extensions = tree.append(task, "extensionElements");

    let definition = tree.append(extensions, "zeebe:taskDefinition");
    tree.set_attribute(definition, "type", service.task_type.as_str());
    if service.retries > 0 {
        tree.set_attribute(definition, "retries", service.retries.to_string());
    }

    if !service.headers.is_empty() {
        let headers = tree.append(extensions, "zeebe:taskHeaders");
        for header in &service.headers {
            add_header(tree, headers, &header.key, &header.value);
        }
    }

    add_io_mapping(
        tree,
        extensions,
        &service.input_mappings,
        &service.output_mappings,
    );
}

fn add_header(tree: &mut XmlTree, headers: NodeId, key: &str, value: &str) {
    let header = tree.append(headers, "zeebe:header");
    tree.set_attribute(header, "key", key);
    tree.set_attribute(header, "value", value);
}

/// Adds `zeebe:ioMapping` unless both mapping lists are empty.
///
/// Sources are normalized to FEEL; targets are plain variable names.
fn add_io_mapping(
    tree: &mut XmlTree,
    extensions: NodeId,
    inputs: &[VariableMapping],
    outputs: &[VariableMapping],
) {
    if inputs.is_empty() && outputs.is_empty() {
        return;
    }

    let io_mapping = tree.append(extensions, "zeebe:ioMapping");
    for (tag, mapping) in inputs
        .iter()
        .map(|m| ("zeebe:input", m))
        .chain(outputs.iter().map(|m| ("zeebe:output", m)))
    {
        let node = tree.append(io_mapping, tag);
        tree.set_attribute(node, "source", feel::normalize(&mapping.source));
        tree.set_attribute(node, "target", mapping.target.as_str());
    }
}

fn add_xor_gateway(
    tree: &mut XmlTree,
    parent: NodeId,
    gateway: &XorGateway,
    context: &mut GenerationContext,
) {
    let node = add_named(tree, parent, "exclusiveGateway", &gateway.id, &gateway.name);
    context.register_gateway(gateway.id.as_str(), node);
}

/// Emits the validator task, validation gateway, and error end event of one
/// entity.
fn add_process_entity(
    tree: &mut XmlTree,
    parent: NodeId,
    entity: &ProcessEntity,
    expansion: &EntityExpansion,
    context: &mut GenerationContext,
) {
    let task = add_named(tree, parent, "serviceTask", &entity.id, &entity.name);
    let extensions = tree.append(task, "extensionElements");

    let definition = tree.append(extensions, "zeebe:taskDefinition");
    tree.set_attribute(definition, "type", expansion::VALIDATOR_TASK_TYPE);
    tree.set_attribute(definition, "retries", expansion::VALIDATOR_RETRIES);

    let headers = tree.append(extensions, "zeebe:taskHeaders");
    add_header(
        tree,
        headers,
        expansion::ENTITY_MODEL_HEADER,
        &entity.entity_model,
    );
    add_header(
        tree,
        headers,
        expansion::ENTITY_NAME_HEADER,
        &entity.entity_name,
    );

    let io_mapping = tree.append(extensions, "zeebe:ioMapping");
    let (source, target) = expansion::ENTITY_INPUT;
    let input = tree.append(io_mapping, "zeebe:input");
    tree.set_attribute(input, "source", source);
    tree.set_attribute(input, "target", target);
    let (source, target) = expansion::VALIDATION_OUTPUT;
    let output = tree.append(io_mapping, "zeebe:output");
    tree.set_attribute(output, "source", source);
    tree.set_attribute(output, "target", target);

    let gateway = add_named(
        tree,
        parent,
        "exclusiveGateway",
        expansion.gateway_id(),
        expansion::VALIDATION_GATEWAY_NAME,
    );
    context.register_gateway(expansion.gateway_id(), gateway);

    let error_end = add_named(
        tree,
        parent,
        "endEvent",
        expansion.error_id(),
        expansion::VALIDATION_ERROR_NAME,
    );
    let error_definition = tree.append(error_end, "errorEventDefinition");
    tree.set_attribute(error_definition, "id", expansion.error_definition_id());
    tree.set_attribute(error_definition, "errorRef", expansion::SHARED_ERROR_ID);
}

/// Emits all sequence flows, rewriting flows around expanded entities.
///
/// A flow leaving an entity is emitted from the entity's gateway instead.
/// The first flow entering an entity is followed by the entity's internal
/// flows; entities nobody flows into get them after all authored flows.
fn add_flows(
    tree: &mut XmlTree,
    parent: NodeId,
    process: &Process,
    expansions: &EntityExpansions,
    context: &GenerationContext,
) {
    let mut wired: HashSet<&str> = HashSet::new();

    for flow in process.flows() {
        match expansions.get(flow.source()) {
            Some(expansion) => add_success_flow(tree, parent, flow, expansion, context),
            None => add_single_flow(tree, parent, flow, context),
        }

        if let Some(expansion) = expansions.get(flow.target()) {
            if wired.insert(flow.target()) {
                add_validation_flows(tree, parent, flow.target(), expansion);
            }
        }
    }

    for (entity_id, expansion) in expansions.iter() {
        if !wired.contains(entity_id) {
            add_validation_flows(tree, parent, entity_id, expansion);
        }
    }
}

fn add_sequence_flow(
    tree: &mut XmlTree,
    parent: NodeId,
    source: &str,
    target: &str,
) -> (NodeId, String) {
    let flow_id = flow_key(source, target);
    let node = tree.append(parent, "sequenceFlow");
    tree.set_attribute(node, "id", flow_id.as_str());
    tree.set_attribute(node, "sourceRef", source);
    tree.set_attribute(node, "targetRef", target);
    (node, flow_id)
}

fn add_condition(tree: &mut XmlTree, flow: NodeId, expression: impl Into<String>) {
    let condition = tree.append(flow, "conditionExpression");
    tree.set_attribute(condition, "xsi:type", "tFormalExpression");
    tree.set_text(condition, expression);
}

/// Non-empty condition of `flow`, if any.
fn condition_of(flow: &Flow) -> Option<&str> {
    flow.condition().filter(|condition| !condition.is_empty())
}

fn add_single_flow(tree: &mut XmlTree, parent: NodeId, flow: &Flow, context: &GenerationContext) {
    let (node, flow_id) = add_sequence_flow(tree, parent, flow.source(), flow.target());

    if flow.is_default() {
        context.stamp_default(tree, flow.source(), &flow_id);
    } else if let Some(condition) = condition_of(flow) {
        add_condition(tree, node, feel::normalize(condition));
    }
}

/// Emits an authored flow leaving an entity as the default flow of the
/// entity's gateway, guarded by successful validation when it had a
/// condition.
fn add_success_flow(
    tree: &mut XmlTree,
    parent: NodeId,
    flow: &Flow,
    expansion: &EntityExpansion,
    context: &GenerationContext,
) {
    let (node, flow_id) = add_sequence_flow(tree, parent, expansion.gateway_id(), flow.target());
    context.stamp_default(tree, expansion.gateway_id(), &flow_id);

    if let Some(condition) = condition_of(flow) {
        add_condition(
            tree,
            node,
            format!(
                "={} and ({})",
                expansion::VALIDATION_PASSED,
                feel::normalize_inner(condition)
            ),
        );
    }
}

/// Emits task → gateway and the failure-guarded gateway → error end flows.
fn add_validation_flows(
    tree: &mut XmlTree,
    parent: NodeId,
    entity_id: &str,
    expansion: &EntityExpansion,
) {
    add_sequence_flow(tree, parent, entity_id, expansion.gateway_id());

    let (error_flow, _) =
        add_sequence_flow(tree, parent, expansion.gateway_id(), expansion.error_id());
    add_condition(tree, error_flow, expansion::VALIDATION_FAILED);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::LayoutConfig, layout::Engine};

    fn export(process: &Process) -> String {
        let config = ExportConfig::default();
        let layout = Engine::new(&LayoutConfig::default()).calculate_layout(process);
        BpmnExporter::new(&config)
            .export_process(process, &layout)
            .expect("export succeeds")
    }

    fn entity_process() -> Process {
        let entity = ProcessEntity::new("check", "Check", "Order", "models/order.yaml");
        Process::new("order", "Order")
            .with_element(Element::start_event("s", "Start"))
            .with_element(entity.into())
            .with_element(Element::end_event("e", "End"))
            .with_flow(Flow::new("s", "check"))
            .with_flow(Flow::conditional("check", "e", "tier == 'gold'"))
    }

    #[test]
    fn test_root_attributes_in_order() {
        let xml = export(&Process::new("p1", "P"));

        assert!(xml.starts_with(
            "<definitions id=\"definitions_p1\" targetNamespace=\"http://bpmn.io/schema/bpmn\" \
             exporter=\"BPM DSL\" exporterVersion=\"1.0\" \
             xmlns=\"http://www.omg.org/spec/BPMN/20100524/MODEL\" \
             xmlns:bpmndi=\"http://www.omg.org/spec/BPMN/20100524/DI\""
        ));
        assert!(
            xml.contains("<process id=\"p1\" name=\"P\" isExecutable=\"true\"/>")
        );
        assert!(!xml.contains("<error "));
    }

    #[test]
    fn test_script_task_extensions() {
        let process = Process::new("p", "P").with_element(
            ScriptCall::new("calc", "Calc", "price * 2")
                .with_input("order.price", "price")
                .with_output("doubled", "total")
                .with_result_variable("doubled")
                .into(),
        );

        let xml = export(&process);

        assert!(xml.contains(
            "<zeebe:script expression=\"=price * 2\" resultVariable=\"doubled\"/>"
        ));
        assert!(
            xml.contains("<zeebe:input source=\"=order.price\" target=\"price\"/>")
        );
        assert!(
            xml.contains("<zeebe:output source=\"=doubled\" target=\"total\"/>")
        );
    }

    #[test]
    fn test_script_without_mappings_has_no_io_mapping() {
        let process = Process::new("p", "P")
            .with_element(ScriptCall::new("calc", "Calc", "1 + 1").into());
        assert!(!export(&process).contains("zeebe:ioMapping"));
    }

    #[test]
    fn test_service_task_extensions() {
        let process = Process::new("p", "P").with_element(
            ServiceTask::new("notify", "Notify", "email-sender")
                .with_retries(5)
                .with_header("template", "welcome")
                .with_input("customer.email", "to")
                .into(),
        );

        let xml = export(&process);

        assert!(xml.contains(
            "<zeebe:taskDefinition type=\"email-sender\" retries=\"5\"/>"
        ));
        assert!(
            xml.contains("<zeebe:header key=\"template\" value=\"welcome\"/>")
        );
        assert!(
            xml.contains("<zeebe:input source=\"=customer.email\" target=\"to\"/>")
        );
    }

    #[test]
    fn test_entity_expansion_nodes() {
        let xml = export(&entity_process());

        assert!(xml.contains(
            "<error id=\"process-entity-validation-error\" \
             name=\"Process Entity Validation Error\" \
             errorCode=\"PROCESS_ENTITY_VALIDATION_ERROR\"/>"
        ));
        assert!(xml.contains(
            "<zeebe:taskDefinition type=\"process-entity-validator\" retries=\"3\"/>"
        ));
        assert!(xml.contains(
            "<zeebe:header key=\"entityModel\" value=\"models/order.yaml\"/>"
        ));
        assert!(
            xml.contains("<zeebe:header key=\"entityName\" value=\"Order\"/>")
        );
        assert!(xml.contains(
            "<exclusiveGateway id=\"check-validation-gateway\" name=\"Validation Check\" \
             default=\"flow_check-validation-gateway_to_e\"/>"
        ));
        assert!(xml.contains(
            "<errorEventDefinition id=\"check-validation-error-def\" \
             errorRef=\"process-entity-validation-error\"/>"
        ));
    }

    #[test]
    fn test_entity_flow_rewiring_order() {
        let xml = export(&entity_process());

        let positions: Vec<usize> = [
            "id=\"flow_s_to_check\"",
            "id=\"flow_check_to_check-validation-gateway\"",
            "id=\"flow_check-validation-gateway_to_check-validation-error\"",
            "id=\"flow_check-validation-gateway_to_e\"",
        ]
        .iter()
        .map(|needle| xml.find(needle).expect("flow emitted"))
        .collect();

        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(!xml.contains("id=\"flow_check_to_e\""));
    }

    #[test]
    fn test_entity_success_condition_is_conjoined() {
        let xml = export(&entity_process());

        assert!(

            xml.contains("=entityValidationResult.isValid = true and (tier = ")

        );
        assert!(!xml.contains("tier =="));
        assert!(xml.contains("=entityValidationResult.isValid = false"));
    }

    #[test]
    fn test_entity_without_inbound_flow_wired_last() {
        let entity = ProcessEntity::new("check", "Check", "Order", "order.yaml");
        let process = Process::new("p", "P")
            .with_element(entity.into())
            .with_element(Element::end_event("e", "End"))
            .with_flow(Flow::new("check", "e"));

        let xml = export(&process);

        let success = xml
            .find("id=\"flow_check-validation-gateway_to_e\"")
            .expect("success flow");
        let internal = xml
            .find("id=\"flow_check_to_check-validation-gateway\"")
            .expect("internal flow");
        assert!(success < internal);
    }

    #[test]
    fn test_entity_without_outbound_flow_has_no_success_flow() {
        let entity = ProcessEntity::new("check", "Check", "Order", "order.yaml");
        let process = Process::new("p", "P")
            .with_element(Element::start_event("s", "Start"))
            .with_element(entity.into())
            .with_flow(Flow::new("s", "check"));

        let xml = export(&process);

        assert!(xml.contains("<serviceTask id=\"check\" name=\"Check\">"));
        assert!(xml.contains(
            "<exclusiveGateway id=\"check-validation-gateway\" name=\"Validation Check\"/>"
        ));
        assert!(xml.contains(
            "<endEvent id=\"check-validation-error\" name=\"Validation Error\">"
        ));
        assert_eq!(xml.matches("<sequenceFlow ").count(), 3);
        assert!(xml.contains("id=\"flow_s_to_check\""));
        assert!(
            xml.contains("id=\"flow_check_to_check-validation-gateway\"")
        );
        assert!(xml.contains(
            "id=\"flow_check-validation-gateway_to_check-validation-error\""
        ));
        assert!(!xml.contains("default="));
    }

    #[test]
    fn test_entity_diagram_shapes() {
        let xml = export(&entity_process());

        assert!(

            xml.contains("<bpmndi:BPMNShape id=\"shape_check-validation-gateway\"")

        );
        assert!(
            xml.contains("<bpmndi:BPMNShape id=\"shape_check-validation-error\"")
        );
        assert!(xml.contains(
            "<bpmndi:BPMNEdge id=\"edge_flow_check-validation-gateway_to_e\""
        ));
        assert!(!xml.contains("edge_flow_check_to_e\""));
    }
}
