use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::modules::attendance::core::record::{AttendanceRecord, AttendanceStatus};
use crate::modules::institution::core::department::DepartmentSummary;
use crate::modules::institution::core::student::StudentSummary;
use crate::modules::institution::core::subject::SubjectSummary;
use crate::shared::core::primitives::EntityId;

/// An attendance record with its references expanded. A reference whose
/// target no longer exists is `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceView {
    pub id: EntityId,
    pub student_id: EntityId,
    pub subject_id: EntityId,
    pub department_id: EntityId,
    pub student: Option<StudentSummary>,
    pub subject: Option<SubjectSummary>,
    pub department: Option<DepartmentSummary>,
    pub date: DateTime<Utc>,
    pub status: AttendanceStatus,
    pub marked_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AttendanceView {
    pub fn new(
        record: AttendanceRecord,
        student: Option<StudentSummary>,
        subject: Option<SubjectSummary>,
        department: Option<DepartmentSummary>,
    ) -> Self {
        Self {
            id: record.id,
            student_id: record.student_id,
            subject_id: record.subject_id,
            department_id: record.department_id,
            student,
            subject,
            department,
            date: record.date,
            status: record.status,
            marked_by: record.marked_by,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}
