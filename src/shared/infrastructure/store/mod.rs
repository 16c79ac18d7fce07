// Persistence ports for the attendance tracker.
//
// Purpose
// - One async repository trait per collection, and a `Store` umbrella trait the
//   handlers depend on.
//
// Responsibilities
// - Unique constraints are enforced by the implementations, never only by the
//   callers, so two concurrent writers cannot both create a duplicate.
// - Referential integrity is enforced the same way: a subject or student is
//   only written while its department exists, and a delete checks dependants
//   and removes the row as one atomic step.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::modules::attendance::core::record::AttendanceRecord;
use crate::modules::institution::core::department::Department;
use crate::modules::institution::core::student::Student;
use crate::modules::institution::core::subject::Subject;
use crate::modules::attendance::core::record::AttendanceStatus;
use crate::shared::core::primitives::{AttendanceDay, EntityId};

pub const DEPARTMENT_NAME_INDEX: &str = "departments.name";
pub const SUBJECT_CODE_INDEX: &str = "subjects.code, subjects.department_id";
pub const STUDENT_ROLL_NUMBER_INDEX: &str = "students.roll_number";
pub const ATTENDANCE_KEY_INDEX: &str =
    "attendance.student_id, attendance.subject_id, attendance.date";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated: {index}")]
    UniqueViolation { index: String },

    #[error("referenced row does not exist: {reference}")]
    MissingReference { reference: String },

    #[error("backend error: {0}")]
    Backend(String),
}

/// Rows still pointing at an entity that was about to be deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dependants {
    pub subjects: u64,
    pub students: u64,
    pub attendance: u64,
}

impl Dependants {
    pub fn is_empty(&self) -> bool {
        self.subjects == 0 && self.students == 0 && self.attendance == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Missing,
    Referenced(Dependants),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Modified,
    Unchanged,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceFilter {
    pub day: Option<AttendanceDay>,
    pub subject_id: Option<EntityId>,
    pub department_id: Option<EntityId>,
    pub student_id: Option<EntityId>,
    pub status: Option<AttendanceStatus>,
}

impl AttendanceFilter {
    pub fn matches(&self, record: &AttendanceRecord) -> bool {
        self.day.is_none_or(|day| day.contains(record.date))
            && self.subject_id.is_none_or(|id| id == record.subject_id)
            && self.department_id.is_none_or(|id| id == record.department_id)
            && self.student_id.is_none_or(|id| id == record.student_id)
            && self.status.is_none_or(|status| status == record.status)
    }
}

#[async_trait]
pub trait DepartmentRepository: Send + Sync {
    async fn insert_department(&self, department: &Department) -> Result<(), StoreError>;
    async fn list_departments(&self) -> Result<Vec<Department>, StoreError>;
    async fn find_department(&self, id: EntityId) -> Result<Option<Department>, StoreError>;
    /// `Ok(false)` when no department has this id.
    async fn update_department(&self, department: &Department) -> Result<bool, StoreError>;
    /// Refused while subjects, students or attendance records reference it.
    async fn delete_department(&self, id: EntityId) -> Result<DeleteOutcome, StoreError>;
}

#[async_trait]
pub trait SubjectRepository: Send + Sync {
    /// `MissingReference` when the subject's department does not exist.
    async fn insert_subject(&self, subject: &Subject) -> Result<(), StoreError>;
    async fn list_subjects(
        &self,
        department_id: Option<EntityId>,
    ) -> Result<Vec<Subject>, StoreError>;
    async fn find_subject(&self, id: EntityId) -> Result<Option<Subject>, StoreError>;
    async fn update_subject(&self, subject: &Subject) -> Result<bool, StoreError>;
    /// Refused while attendance records reference it.
    async fn delete_subject(&self, id: EntityId) -> Result<DeleteOutcome, StoreError>;
}

#[async_trait]
pub trait StudentRepository: Send + Sync {
    /// `MissingReference` when the student's department does not exist.
    async fn insert_student(&self, student: &Student) -> Result<(), StoreError>;
    async fn list_students(
        &self,
        department_id: Option<EntityId>,
    ) -> Result<Vec<Student>, StoreError>;
    async fn find_student(&self, id: EntityId) -> Result<Option<Student>, StoreError>;
    async fn update_student(&self, student: &Student) -> Result<bool, StoreError>;
    async fn delete_student(&self, id: EntityId) -> Result<DeleteOutcome, StoreError>;
}

#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// Update-if-exists-else-insert keyed by (student, subject, date). An
    /// existing record keeps its id, `created_at` and, when the new record has
    /// none, its `marked_by`.
    async fn upsert_attendance(
        &self,
        record: &AttendanceRecord,
    ) -> Result<UpsertOutcome, StoreError>;
    /// Ordered by date, then insertion.
    async fn list_attendance(
        &self,
        filter: &AttendanceFilter,
    ) -> Result<Vec<AttendanceRecord>, StoreError>;
    async fn count_attendance(&self, filter: &AttendanceFilter) -> Result<u64, StoreError>;
}

pub trait Store:
    DepartmentRepository + SubjectRepository + StudentRepository + AttendanceRepository
{
}

impl<T> Store for T where
    T: DepartmentRepository + SubjectRepository + StudentRepository + AttendanceRepository
{
}

pub type SharedStore = Arc<dyn Store>;

pub mod in_memory;
pub mod sqlite;
