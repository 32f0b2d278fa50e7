//! Entity validation expansion.
//!
//! Every `ProcessEntity` is emitted as three nodes: a validator service task
//! at the entity's own id, a validation gateway, and an error end event. The
//! linkage between an entity and its generated nodes is kept in
//! [`EntityExpansions`], a side table rebuilt for every export call; the
//! process model itself is never touched.

use indexmap::IndexMap;

use procflow_core::{
    geometry::Bounds,
    model::{Element, ElementKind, Process},
};

use crate::layout::element_size;

pub const VALIDATOR_TASK_TYPE: &str = "process-entity-validator";
pub const VALIDATOR_RETRIES: &str = "3";
pub const ENTITY_MODEL_HEADER: &str = "entityModel";
pub const ENTITY_NAME_HEADER: &str = "entityName";
pub const ENTITY_INPUT: (&str, &str) = ("=processEntity", "processEntity");
pub const VALIDATION_OUTPUT: (&str, &str) = ("=validationResult", "entityValidationResult");

pub const VALIDATION_GATEWAY_NAME: &str = "Validation Check";
pub const VALIDATION_ERROR_NAME: &str = "Validation Error";

pub const VALIDATION_FAILED: &str = "=entityValidationResult.isValid = false";
pub const VALIDATION_PASSED: &str = "entityValidationResult.isValid = true";

/// The error declaration shared by every validation error end event.
pub const SHARED_ERROR_ID: &str = "process-entity-validation-error";
pub const SHARED_ERROR_NAME: &str = "Process Entity Validation Error";
pub const SHARED_ERROR_CODE: &str = "PROCESS_ENTITY_VALIDATION_ERROR";

/// Horizontal gap between an entity task and its gateway.
const GATEWAY_OFFSET_X: f32 = 80.0;
/// Vertical gap between the gateway and its error end event.
const ERROR_OFFSET_Y: f32 = 60.0;

/// Ids of the nodes generated for one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityExpansion {
    gateway_id: String,
    error_id: String,
}

impl EntityExpansion {
    fn new(entity_id: &str) -> Self {
        Self {
            gateway_id: format!("{entity_id}-validation-gateway"),
            error_id: format!("{entity_id}-validation-error"),
        }
    }

    pub fn gateway_id(&self) -> &str {
        &self.gateway_id
    }

    pub fn error_id(&self) -> &str {
        &self.error_id
    }

    /// Id of the error event definition nested in the error end event.
    pub fn error_definition_id(&self) -> String {
        format!("{}-def", self.error_id)
    }
}

/// Side table from entity id to its generated node ids, in declaration order.
#[derive(Debug, Default)]
pub struct EntityExpansions {
    entries: IndexMap<String, EntityExpansion>,
}

impl EntityExpansions {
    pub fn from_process(process: &Process) -> Self {
        let mut entries = IndexMap::new();
        for element in process.elements() {
            if let Element::ProcessEntity(entity) = element {
                entries
                    .entry(entity.id.clone())
                    .or_insert_with(|| EntityExpansion::new(&entity.id));
            }
        }
        Self { entries }
    }

    pub fn get(&self, entity_id: &str) -> Option<&EntityExpansion> {
        self.entries.get(entity_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EntityExpansion)> {
        self.entries
            .iter()
            .map(|(id, expansion)| (id.as_str(), expansion))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Bounds of the validation gateway, right of the entity task and vertically
/// centered on it.
pub fn gateway_bounds(task: Bounds) -> Bounds {
    let size = element_size(ElementKind::XorGateway);
    Bounds::new(
        task.right() + GATEWAY_OFFSET_X,
        task.y() + (task.height() - size.height()) / 2.0,
        size.width(),
        size.height(),
    )
}

/// Bounds of the error end event, centered below the gateway.
pub fn error_bounds(gateway: Bounds) -> Bounds {
    let size = element_size(ElementKind::EndEvent);
    Bounds::new(
        gateway.x() + (gateway.width() - size.width()) / 2.0,
        gateway.bottom() + ERROR_OFFSET_Y,
        size.width(),
        size.height(),
    )
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use procflow_core::model::{Flow, ProcessEntity};

    use super::*;

    #[test]
    fn test_generated_ids() {
        let expansion = EntityExpansion::new("Check");

        assert_eq!(expansion.gateway_id(), "Check-validation-gateway");
        assert_eq!(expansion.error_id(), "Check-validation-error");
        assert_eq!(
            expansion.error_definition_id(),
            "Check-validation-error-def"
        );
    }

    #[test]
    fn test_side_table_only_holds_entities() {
        let process = Process::new("p", "P")
            .with_element(Element::start_event("s", "Start"))
            .with_element(ProcessEntity::new("b", "B", "Order", "order.yaml").into())
            .with_element(ProcessEntity::new("a", "A", "Order", "order.yaml").into())
            .with_flow(Flow::new("s", "b"));

        let expansions = EntityExpansions::from_process(&process);

        assert_eq!(expansions.len(), 2);
        assert!(expansions.get("s").is_none());
        assert_eq!(
            expansions.iter().map(|(id, _)| id).collect::<Vec<_>>(),
            vec!["b", "a"]
        );
    }

    #[test]
    fn test_generated_geometry() {
        let task = Bounds::new(286.0, 150.0, 100.0, 80.0);

        let gateway = gateway_bounds(task);
        assert_approx_eq!(f32, gateway.x(), 466.0);
        assert_approx_eq!(f32, gateway.y(), 165.0);
        assert_approx_eq!(f32, gateway.width(), 50.0);

        let error = error_bounds(gateway);
        assert_approx_eq!(f32, error.x(), 473.0);
        assert_approx_eq!(f32, error.y(), 275.0);
        assert_approx_eq!(f32, error.height(), 36.0);
    }
}
