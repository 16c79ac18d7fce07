use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::core::primitives::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
        }
    }

    /// Exact, case sensitive match.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Present" => Some(AttendanceStatus::Present),
            "Absent" => Some(AttendanceStatus::Absent),
            _ => None,
        }
    }
}

/// Uniqueness key of an attendance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttendanceKey {
    pub student_id: EntityId,
    pub subject_id: EntityId,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
    pub id: EntityId,
    pub student_id: EntityId,
    pub subject_id: EntityId,
    // Copied from the marking request, not derived from the student or subject.
    pub department_id: EntityId,
    pub date: DateTime<Utc>,
    pub status: AttendanceStatus,
    pub marked_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AttendanceRecord {
    pub fn key(&self) -> AttendanceKey {
        AttendanceKey {
            student_id: self.student_id,
            subject_id: self.subject_id,
            date: self.date,
        }
    }
}

#[cfg(test)]
mod attendance_status_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Present", Some(AttendanceStatus::Present))]
    #[case("Absent", Some(AttendanceStatus::Absent))]
    #[case("present", None)]
    #[case("Late", None)]
    #[case("", None)]
    fn it_should_only_accept_the_exact_status_names(
        #[case] raw: &str,
        #[case] expected: Option<AttendanceStatus>,
    ) {
        assert_eq!(AttendanceStatus::parse(raw), expected);
    }

    #[rstest]
    fn it_should_serialize_as_the_status_name() {
        assert_eq!(
            serde_json::to_value(AttendanceStatus::Absent).unwrap(),
            serde_json::json!("Absent")
        );
    }
}
