//! The process model.
//!
//! A [`Process`] is an immutable value tree built once by an upstream stage
//! and then handed, read-only, to the validator, the layout engine, and the
//! exporter. Nothing downstream mutates it; per-run bookkeeping lives in side
//! tables owned by the consumer.
//!
//! # Example
//!
//! ```
//! use procflow_core::model::{Element, Flow, Process, ServiceTask};
//!
//! let process = Process::new("order-process", "Order Process")
//!     .with_version("1.0")
//!     .with_element(Element::start_event("start", "Start"))
//!     .with_element(ServiceTask::new("charge", "Charge Card", "payment-service").into())
//!     .with_element(Element::end_event("end", "End"))
//!     .with_flow(Flow::new("start", "charge"))
//!     .with_flow(Flow::new("charge", "end"));
//!
//! assert_eq!(process.elements().len(), 3);
//! assert_eq!(process.outgoing("start").count(), 1);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Result variable used by script tasks when none is given.
pub const DEFAULT_RESULT_VARIABLE: &str = "result";

/// Retry count used by service tasks when none is given.
pub const DEFAULT_RETRIES: u32 = 3;

/// Root of the process model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Process {
    name: String,
    id: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    elements: Vec<Element>,
    #[serde(default)]
    flows: Vec<Flow>,
}

impl Process {
    /// Creates an empty process with the given id and display name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            version: None,
            elements: Vec::new(),
            flows: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Appends an element, keeping declaration order.
    pub fn with_element(mut self, element: Element) -> Self {
        self.elements.push(element);
        self
    }

    /// Appends a flow, keeping declaration order.
    pub fn with_flow(mut self, flow: Flow) -> Self {
        self.flows.push(flow);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn flows(&self) -> &[Flow] {
        &self.flows
    }

    /// Returns the first element declared with the given id.
    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|element| element.id() == id)
    }

    /// Returns `true` if an element with the given id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.element(id).is_some()
    }

    /// Returns the start events in declaration order.
    pub fn start_events(&self) -> impl Iterator<Item = &Element> {
        self.elements
            .iter()
            .filter(|element| element.kind() == ElementKind::StartEvent)
    }

    /// Returns the end events in declaration order.
    pub fn end_events(&self) -> impl Iterator<Item = &Element> {
        self.elements
            .iter()
            .filter(|element| element.kind() == ElementKind::EndEvent)
    }

    /// Returns the flows leaving `id`, in declaration order.
    pub fn outgoing<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Flow> + 'a {
        self.flows.iter().filter(move |flow| flow.source() == id)
    }

    /// Returns the flows entering `id`, in declaration order.
    pub fn incoming<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Flow> + 'a {
        self.flows.iter().filter(move |flow| flow.target() == id)
    }
}

/// Discriminant of an [`Element`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    StartEvent,
    EndEvent,
    ScriptCall,
    ServiceTask,
    ProcessEntity,
    XorGateway,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::StartEvent => "start event",
            ElementKind::EndEvent => "end event",
            ElementKind::ScriptCall => "script call",
            ElementKind::ServiceTask => "service task",
            ElementKind::ProcessEntity => "process entity",
            ElementKind::XorGateway => "XOR gateway",
        };
        write!(f, "{name}")
    }
}

/// A node of the process graph.
///
/// The set of variants is closed; consumers match on it exhaustively so a
/// new element kind is a compile-time checked change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Element {
    StartEvent(Event),
    EndEvent(Event),
    ScriptCall(ScriptCall),
    ServiceTask(ServiceTask),
    ProcessEntity(ProcessEntity),
    XorGateway(XorGateway),
}

impl Element {
    pub fn start_event(id: impl Into<String>, name: impl Into<String>) -> Self {
        Element::StartEvent(Event::new(id, name))
    }

    pub fn end_event(id: impl Into<String>, name: impl Into<String>) -> Self {
        Element::EndEvent(Event::new(id, name))
    }

    pub fn xor_gateway(id: impl Into<String>, name: impl Into<String>) -> Self {
        Element::XorGateway(XorGateway::new(id, name))
    }

    pub fn id(&self) -> &str {
        match self {
            Element::StartEvent(event) | Element::EndEvent(event) => &event.id,
            Element::ScriptCall(script) => &script.id,
            Element::ServiceTask(task) => &task.id,
            Element::ProcessEntity(entity) => &entity.id,
            Element::XorGateway(gateway) => &gateway.id,
        }
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        match self {
            Element::StartEvent(event) | Element::EndEvent(event) => &event.name,
            Element::ScriptCall(script) => &script.name,
            Element::ServiceTask(task) => &task.name,
            Element::ProcessEntity(entity) => &entity.name,
            Element::XorGateway(gateway) => &gateway.name,
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            Element::StartEvent(_) => ElementKind::StartEvent,
            Element::EndEvent(_) => ElementKind::EndEvent,
            Element::ScriptCall(_) => ElementKind::ScriptCall,
            Element::ServiceTask(_) => ElementKind::ServiceTask,
            Element::ProcessEntity(_) => ElementKind::ProcessEntity,
            Element::XorGateway(_) => ElementKind::XorGateway,
        }
    }
}

impl From<ScriptCall> for Element {
    fn from(script: ScriptCall) -> Self {
        Element::ScriptCall(script)
    }
}

impl From<ServiceTask> for Element {
    fn from(task: ServiceTask) -> Self {
        Element::ServiceTask(task)
    }
}

impl From<ProcessEntity> for Element {
    fn from(entity: ProcessEntity) -> Self {
        Element::ProcessEntity(entity)
    }
}

impl From<XorGateway> for Element {
    fn from(gateway: XorGateway) -> Self {
        Element::XorGateway(gateway)
    }
}

/// Payload shared by start and end events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub name: String,
}

impl Event {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A task evaluating an expression-language script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptCall {
    pub id: String,
    pub name: String,
    pub script: String,
    #[serde(default)]
    pub input_mappings: Vec<VariableMapping>,
    #[serde(default)]
    pub output_mappings: Vec<VariableMapping>,
    #[serde(default = "default_result_variable")]
    pub result_variable: String,
}

impl ScriptCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            script: script.into(),
            input_mappings: Vec::new(),
            output_mappings: Vec::new(),
            result_variable: default_result_variable(),
        }
    }

    pub fn with_input(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.input_mappings.push(VariableMapping::new(source, target));
        self
    }

    pub fn with_output(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.output_mappings.push(VariableMapping::new(source, target));
        self
    }

    pub fn with_result_variable(mut self, result_variable: impl Into<String>) -> Self {
        self.result_variable = result_variable.into();
        self
    }
}

/// A task executed by an external job worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceTask {
    pub id: String,
    pub name: String,
    pub task_type: String,
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default)]
    pub headers: Vec<TaskHeader>,
    #[serde(default)]
    pub input_mappings: Vec<VariableMapping>,
    #[serde(default)]
    pub output_mappings: Vec<VariableMapping>,
}

impl ServiceTask {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        task_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            task_type: task_type.into(),
            retries: DEFAULT_RETRIES,
            headers: Vec::new(),
            input_mappings: Vec::new(),
            output_mappings: Vec::new(),
        }
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(TaskHeader {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    pub fn with_input(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.input_mappings.push(VariableMapping::new(source, target));
        self
    }

    pub fn with_output(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.output_mappings.push(VariableMapping::new(source, target));
        self
    }
}

/// A single authored node standing for "validate this entity".
///
/// The exporter expands it into a validation task, a decision gateway, and
/// an error end event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessEntity {
    pub id: String,
    pub name: String,
    pub entity_name: String,
    /// Path to the interface-model document describing the entity.
    pub entity_model: String,
}

impl ProcessEntity {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        entity_name: impl Into<String>,
        entity_model: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            entity_name: entity_name.into(),
            entity_model: entity_model.into(),
        }
    }
}

/// An exclusive decision node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XorGateway {
    pub id: String,
    pub name: String,
}

impl XorGateway {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Maps `source` to `target`.
///
/// For input mappings the source is a process-side expression and the
/// target a local variable; output mappings go the other way round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableMapping {
    pub source: String,
    pub target: String,
}

impl VariableMapping {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// A static key/value header passed to the job worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskHeader {
    pub key: String,
    pub value: String,
}

/// A directed edge between two elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    source: String,
    target: String,
    #[serde(default)]
    condition: Option<String>,
    #[serde(default)]
    is_default: bool,
}

impl Flow {
    /// Creates an unconditional, non-default flow.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            condition: None,
            is_default: false,
        }
    }

    /// Creates a flow guarded by `condition`.
    pub fn conditional(
        source: impl Into<String>,
        target: impl Into<String>,
        condition: impl Into<String>,
    ) -> Self {
        Self {
            condition: Some(condition.into()),
            ..Self::new(source, target)
        }
    }

    /// Creates the default flow of a gateway.
    pub fn default_flow(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            is_default: true,
            ..Self::new(source, target)
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn condition(&self) -> Option<&str> {
        self.condition.as_deref()
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    /// Returns the key identifying this flow in generated documents.
    ///
    /// Two flows with the same endpoints share a key.
    pub fn key(&self) -> String {
        flow_key(&self.source, &self.target)
    }
}

/// Builds the generated id of a flow from `source` to `target`.
pub fn flow_key(source: &str, target: &str) -> String {
    format!("flow_{source}_to_{target}")
}

fn default_result_variable() -> String {
    DEFAULT_RESULT_VARIABLE.to_string()
}

fn default_retries() -> u32 {
    DEFAULT_RETRIES
}
