// Command data type for bulk attendance marking.
//
// Purpose
// - Carry one marking sheet: a day, a subject, a department and the status of
//   each listed student.
//
// Responsibilities
// - Hold the raw client values; validation happens in `decide_mark`.
// - Be independent of transport layer details.

use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceEntry {
    pub student_id: Option<String>,
    pub status: Option<String>,
}

impl AttendanceEntry {
    /// Reads `{ studentId, status }` out of an arbitrary JSON item. Anything
    /// that is not a string is treated as absent.
    pub fn from_json(item: &Value) -> Self {
        let text = |key: &str| item.get(key).and_then(Value::as_str).map(str::to_owned);
        Self {
            student_id: text("studentId"),
            status: text("status"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkAttendance {
    pub date: Option<String>,
    pub subject_id: Option<String>,
    pub department_id: Option<String>,
    /// `None` when the client sent no array at all.
    pub attendance_data: Option<Vec<AttendanceEntry>>,
    pub marked_by: Option<String>,
}
