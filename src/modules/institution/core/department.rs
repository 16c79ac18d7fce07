use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::shared::core::primitives::EntityId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Department {
    pub id: EntityId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentView {
    pub id: EntityId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Department> for DepartmentView {
    fn from(department: Department) -> Self {
        Self {
            id: department.id,
            name: department.name,
            created_at: department.created_at,
            updated_at: department.updated_at,
        }
    }
}

/// Expanded department reference embedded in other views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentSummary {
    pub id: EntityId,
    pub name: String,
}

impl From<&Department> for DepartmentSummary {
    fn from(department: &Department) -> Self {
        Self {
            id: department.id,
            name: department.name.clone(),
        }
    }
}
