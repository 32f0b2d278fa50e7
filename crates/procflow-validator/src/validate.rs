//! Semantic validation of a process model.
//!
//! The [`Validator`] runs every check against the model and records each
//! finding as a diagnostic; nothing short-circuits. Checks run in this order:
//!
//! - **Process identity**: non-empty name and an XML-usable id
//! - **Elements**: unique, well-formed ids and non-empty names, plus the
//!   fields each element kind requires (script body, task type, entity
//!   name and model, mapping variable names)
//! - **Required events**: at least one start and one end event
//! - **Flows**: endpoints exist, conditions look like boolean expressions
//! - **Reachability**: every element reachable from the first start event
//! - **Event degrees**: start events have no incoming flow, end events no
//!   outgoing flow
//! - **Engine compatibility**: script bodies are not blank
//! - **Default flows**: unconditioned, at most one per source
//!
//! Warnings follow: elements touched by no flow and a missing version.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};
use petgraph::{graphmap::DiGraphMap, visit::Bfs};
use procflow_core::{
    identifier::{is_variable_name, is_xml_id},
    model::{
        Element, ElementKind, Flow, Process, ProcessEntity, ScriptCall, ServiceTask,
        VariableMapping,
    },
};

use crate::{
    ValidationReport,
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    visit::{MappingDirection, Visitor, walk_element, walk_mappings},
};

/// Tokens that mark a condition as a comparison or boolean expression.
const CONDITION_TOKENS: &[&str] = &[
    "==", "!=", ">", "<", ">=", "<=", "&&", "||", "true", "false", " and ", " or ",
];

/// Returns `true` if `condition` is non-blank and contains at least one
/// comparison or boolean token.
///
/// The check is lexical; the expression itself is never parsed.
pub fn is_valid_condition(condition: &str) -> bool {
    !condition.trim().is_empty() && CONDITION_TOKENS.iter().any(|token| condition.contains(token))
}

/// Validator that accumulates diagnostics over a whole process.
pub(crate) struct Validator {
    collector: DiagnosticCollector,
    element_ids: HashSet<String>,
}

impl Validator {
    pub(crate) fn new() -> Self {
        Self {
            collector: DiagnosticCollector::new(),
            element_ids: HashSet::new(),
        }
    }

    /// Runs every check and returns the finished report.
    pub(crate) fn run(mut self, process: &Process) -> ValidationReport {
        self.visit_process(process);
        self.collector.finish()
    }

    fn emit(&mut self, diagnostic: Diagnostic) {
        trace!(diagnostic:% = diagnostic; "Validation finding");
        self.collector.emit(diagnostic);
    }

    fn check_process_identity(&mut self, process: &Process) {
        if process.name().trim().is_empty() {
            self.emit(
                Diagnostic::error("Process must have a non-empty name").with_code(ErrorCode::E100),
            );
        }

        let id = process.id();
        if id.trim().is_empty() {
            self.emit(
                Diagnostic::error("Process must have a non-empty ID").with_code(ErrorCode::E101),
            );
        } else if !is_xml_id(id) {
            self.emit(
                Diagnostic::error(format!("Process ID '{id}' is not a valid XML identifier"))
                    .with_code(ErrorCode::E101)
                    .with_help(
                        "start with a letter or underscore; use only letters, digits, '-', '_' \
                         and '.'",
                    ),
            );
        }
    }

    fn check_element_identity(&mut self, element: &Element) {
        let id = element.id();

        if !self.element_ids.insert(id.to_string()) {
            self.emit(
                Diagnostic::error(format!("Duplicate element ID: {id}"))
                    .with_code(ErrorCode::E200)
                    .with_element(id),
            );
        }

        if !is_xml_id(id) {
            self.emit(
                Diagnostic::error(format!("Element ID '{id}' is not a valid XML identifier"))
                    .with_code(ErrorCode::E201)
                    .with_element(id),
            );
        }

        if element.name().trim().is_empty() {
            self.emit(
                Diagnostic::error(format!("Element {id} must have a non-empty name"))
                    .with_code(ErrorCode::E202)
                    .with_element(id),
            );
        }
    }

    fn check_required_events(&mut self, process: &Process) {
        if process.start_events().next().is_none() {
            self.emit(
                Diagnostic::error("Process must have at least one start event")
                    .with_code(ErrorCode::E400),
            );
        }
        if process.end_events().next().is_none() {
            self.emit(
                Diagnostic::error("Process must have at least one end event")
                    .with_code(ErrorCode::E401),
            );
        }
    }

    /// Reports every element that a breadth-first walk from the first start
    /// event does not reach, one diagnostic per element.
    fn check_reachability(&mut self, process: &Process) {
        let Some(start) = process.start_events().next() else {
            return;
        };

        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        for element in process.elements() {
            graph.add_node(element.id());
        }
        for flow in process.flows() {
            if graph.contains_node(flow.source()) && graph.contains_node(flow.target()) {
                graph.add_edge(flow.source(), flow.target(), ());
            }
        }

        let mut reachable = HashSet::new();
        let mut bfs = Bfs::new(&graph, start.id());
        while let Some(id) = bfs.next(&graph) {
            reachable.insert(id);
        }
        debug!(start = start.id(), reachable = reachable.len(); "Reachability computed");

        for element in process.elements() {
            let id = element.id();
            if !reachable.contains(id) {
                self.emit(
                    Diagnostic::error(format!(
                        "Element {id} is unreachable from start event {}",
                        start.id()
                    ))
                    .with_code(ErrorCode::E404)
                    .with_element(id),
                );
            }
        }
    }

    fn check_event_degrees(&mut self, process: &Process) {
        for start in process.start_events() {
            if process.incoming(start.id()).next().is_some() {
                self.emit(
                    Diagnostic::error(format!(
                        "Start event {} cannot have incoming flows",
                        start.id()
                    ))
                    .with_code(ErrorCode::E402)
                    .with_element(start.id()),
                );
            }
        }
        for end in process.end_events() {
            if process.outgoing(end.id()).next().is_some() {
                self.emit(
                    Diagnostic::error(format!("End event {} cannot have outgoing flows", end.id()))
                        .with_code(ErrorCode::E403)
                        .with_element(end.id()),
                );
            }
        }
    }

    /// Flags scripts the engine cannot evaluate: an empty body.
    fn check_engine_compatibility(&mut self, process: &Process) {
        for element in process.elements() {
            let Element::ScriptCall(script) = element else {
                continue;
            };
            if script.script.trim().is_empty() {
                self.emit(
                    Diagnostic::error(format!(
                        "Script in {} may not be compatible with the engine: {}",
                        script.id, script.script
                    ))
                    .with_code(ErrorCode::E208)
                    .with_element(&script.id)
                    .with_help("the engine rejects an empty script expression"),
                );
            }
        }
    }

    fn check_default_flows(&mut self, process: &Process) {
        let mut defaults_per_source: HashMap<&str, usize> = HashMap::new();

        for flow in process.flows().iter().filter(|flow| flow.is_default()) {
            if flow.condition().is_some() {
                self.emit(
                    Diagnostic::error(format!(
                        "Default flow {} -> {} must not carry a condition",
                        flow.source(),
                        flow.target()
                    ))
                    .with_code(ErrorCode::E303)
                    .with_element(flow.source()),
                );
            }

            let count = defaults_per_source.entry(flow.source()).or_default();
            *count += 1;
            if *count == 2 {
                self.emit(
                    Diagnostic::error(format!(
                        "Element {} has more than one default flow",
                        flow.source()
                    ))
                    .with_code(ErrorCode::E304)
                    .with_element(flow.source()),
                );
            }
        }
    }

    fn collect_warnings(&mut self, process: &Process) {
        let connected: HashSet<&str> = process
            .flows()
            .iter()
            .flat_map(|flow| [flow.source(), flow.target()])
            .collect();

        for element in process.elements() {
            if !connected.contains(element.id()) {
                self.emit(
                    Diagnostic::warning(format!(
                        "Element {} is not connected by any flow",
                        element.id()
                    ))
                    .with_code(ErrorCode::W001)
                    .with_element(element.id()),
                );
            }
        }

        if process.version().is_none_or(|version| version.trim().is_empty()) {
            self.emit(
                Diagnostic::warning(
                    "Process version not specified - consider adding a version for better tracking",
                )
                .with_code(ErrorCode::W002),
            );
        }
    }
}

impl Visitor for Validator {
    fn visit_process(&mut self, process: &Process) {
        self.check_process_identity(process);
        self.visit_elements(process.elements());
        self.check_required_events(process);
        self.visit_flows(process.flows());
        self.check_reachability(process);
        self.check_event_degrees(process);
        self.check_engine_compatibility(process);
        self.check_default_flows(process);
        self.collect_warnings(process);
    }

    fn visit_element(&mut self, element: &Element) {
        self.check_element_identity(element);
        walk_element(self, element);
    }

    fn visit_script_call(&mut self, script: &ScriptCall) {
        if script.script.trim().is_empty() {
            self.emit(
                Diagnostic::error(format!(
                    "Script call {} must have a non-empty script",
                    script.id
                ))
                .with_code(ErrorCode::E203)
                .with_element(&script.id),
            );
        }
        walk_mappings(
            self,
            &script.id,
            &script.input_mappings,
            &script.output_mappings,
        );
    }

    fn visit_service_task(&mut self, task: &ServiceTask) {
        if task.task_type.trim().is_empty() {
            self.emit(
                Diagnostic::error(format!(
                    "Service task {} must have a non-empty task type",
                    task.id
                ))
                .with_code(ErrorCode::E205)
                .with_element(&task.id),
            );
        }
        walk_mappings(self, &task.id, &task.input_mappings, &task.output_mappings);
    }

    fn visit_process_entity(&mut self, entity: &ProcessEntity) {
        if entity.entity_name.trim().is_empty() {
            self.emit(
                Diagnostic::error(format!(
                    "Process entity {} must have a non-empty entity name",
                    entity.id
                ))
                .with_code(ErrorCode::E206)
                .with_element(&entity.id),
            );
        }
        if entity.entity_model.trim().is_empty() {
            self.emit(
                Diagnostic::error(format!(
                    "Process entity {} must reference an entity model",
                    entity.id
                ))
                .with_code(ErrorCode::E207)
                .with_element(&entity.id),
            );
        }
    }

    /// The target side of a mapping is always a plain variable.
    fn visit_mapping(
        &mut self,
        owner: &str,
        direction: MappingDirection,
        mapping: &VariableMapping,
    ) {
        if !is_variable_name(&mapping.target) {
            self.emit(
                Diagnostic::error(format!(
                    "Invalid {direction} variable name '{}' in {owner}",
                    mapping.target
                ))
                .with_code(ErrorCode::E204)
                .with_element(owner),
            );
        }
    }

    fn visit_flow(&mut self, flow: &Flow) {
        for (endpoint, code, role) in [
            (flow.source(), ErrorCode::E300, "source"),
            (flow.target(), ErrorCode::E301, "target"),
        ] {
            if !self.element_ids.contains(endpoint) {
                self.emit(
                    Diagnostic::error(format!(
                        "Flow references non-existent {role} element: {endpoint}"
                    ))
                    .with_code(code)
                    .with_element(endpoint)
                    .with_help("declare the element or fix the flow endpoint"),
                );
            }
        }

        let Some(condition) = flow.condition() else {
            return;
        };
        if !is_valid_condition(condition) {
            self.emit(
                Diagnostic::error(format!(
                    "Invalid condition syntax in flow {} -> {}: {condition}",
                    flow.source(),
                    flow.target()
                ))
                .with_code(ErrorCode::E302)
                .with_element(flow.source()),
            );
        }
    }
}

/// Returns the element kinds present in `process`, for logging.
pub(crate) fn kind_counts(process: &Process) -> HashMap<ElementKind, usize> {
    let mut counts = HashMap::new();
    for element in process.elements() {
        *counts.entry(element.kind()).or_default() += 1;
    }
    counts
}
