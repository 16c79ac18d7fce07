use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::modules::institution::core::department::DepartmentSummary;
use crate::shared::core::primitives::EntityId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub id: EntityId,
    pub name: String,
    pub code: String,
    pub department_id: EntityId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectView {
    pub id: EntityId,
    pub name: String,
    pub code: String,
    pub department_id: EntityId,
    pub department: Option<DepartmentSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubjectView {
    pub fn new(subject: Subject, department: Option<DepartmentSummary>) -> Self {
        Self {
            id: subject.id,
            name: subject.name,
            code: subject.code,
            department_id: subject.department_id,
            department,
            created_at: subject.created_at,
            updated_at: subject.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectSummary {
    pub id: EntityId,
    pub name: String,
    pub code: String,
}

impl From<&Subject> for SubjectSummary {
    fn from(subject: &Subject) -> Self {
        Self {
            id: subject.id,
            name: subject.name.clone(),
            code: subject.code.clone(),
        }
    }
}
