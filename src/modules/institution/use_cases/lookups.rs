use std::collections::HashMap;

use crate::modules::institution::core::department::{Department, DepartmentSummary};
use crate::shared::core::errors::ApplicationError;
use crate::shared::core::primitives::{EntityId, parse_entity_id};
use crate::shared::infrastructure::store::{Store, StoreError};

/// Every department keyed by id, for expanding references in list views.
pub async fn department_summaries(
    store: &dyn Store,
) -> Result<HashMap<EntityId, DepartmentSummary>, StoreError> {
    Ok(store
        .list_departments()
        .await?
        .iter()
        .map(|department| (department.id, DepartmentSummary::from(department)))
        .collect())
}

pub async fn department_summary(
    store: &dyn Store,
    id: EntityId,
) -> Result<Option<DepartmentSummary>, StoreError> {
    Ok(store
        .find_department(id)
        .await?
        .as_ref()
        .map(DepartmentSummary::from))
}

/// Resolves a department reference supplied by a client before a write.
pub async fn require_department(
    store: &dyn Store,
    raw_id: &str,
) -> Result<Department, ApplicationError> {
    let Some(id) = parse_entity_id(raw_id) else {
        return Err(ApplicationError::unknown_department(raw_id));
    };
    store
        .find_department(id)
        .await?
        .ok_or_else(|| ApplicationError::unknown_department(raw_id))
}
