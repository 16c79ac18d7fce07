use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::modules::institution::core::department::DepartmentSummary;
use crate::shared::core::primitives::EntityId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub id: EntityId,
    pub name: String,
    pub roll_number: String,
    pub department_id: EntityId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentView {
    pub id: EntityId,
    pub name: String,
    pub roll_number: String,
    pub department_id: EntityId,
    pub department: Option<DepartmentSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StudentView {
    pub fn new(student: Student, department: Option<DepartmentSummary>) -> Self {
        Self {
            id: student.id,
            name: student.name,
            roll_number: student.roll_number,
            department_id: student.department_id,
            department,
            created_at: student.created_at,
            updated_at: student.updated_at,
        }
    }
}

/// The subset of a student shown on marking sheets and attendance rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub id: EntityId,
    pub name: String,
    pub roll_number: String,
}

impl From<&Student> for StudentSummary {
    fn from(student: &Student) -> Self {
        Self {
            id: student.id,
            name: student.name.clone(),
            roll_number: student.roll_number.clone(),
        }
    }
}
