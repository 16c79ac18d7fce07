// Pure decision function for bulk marking.
//
// Purpose
// - Turn a marking sheet into the attendance records to upsert.
//
// Responsibilities
// - Require date, subject, department and an entries array.
// - Normalize the date to the start of its UTC day.
// - Drop entries without a well-formed student id or with an unknown status,
//   and reject a non-empty sheet where nothing survives.
// - Never perform input or output.

use chrono::{DateTime, Utc};

use crate::modules::attendance::core::record::{AttendanceRecord, AttendanceStatus};
use crate::modules::attendance::use_cases::mark_attendance::command::{
    AttendanceEntry, MarkAttendance,
};
use crate::modules::attendance::use_cases::mark_attendance::decision::{
    DecideError, Decision, DroppedEntry,
};
use crate::shared::core::primitives::{
    AttendanceDay, EntityId, new_entity_id, non_blank, parse_entity_id,
};

pub fn decide_mark(command: MarkAttendance, marked_at: DateTime<Utc>) -> Decision {
    let (Some(raw_date), Some(raw_subject), Some(raw_department), Some(entries)) = (
        non_blank(command.date.as_deref()),
        non_blank(command.subject_id.as_deref()),
        non_blank(command.department_id.as_deref()),
        command.attendance_data,
    ) else {
        return Decision::Rejected {
            reason: DecideError::MissingFields,
        };
    };

    let Some(day) = AttendanceDay::parse(&raw_date) else {
        return Decision::Rejected {
            reason: DecideError::InvalidDate,
        };
    };
    let Some(subject_id) = parse_entity_id(&raw_subject) else {
        return Decision::Rejected {
            reason: DecideError::InvalidId("subjectId"),
        };
    };
    let Some(department_id) = parse_entity_id(&raw_department) else {
        return Decision::Rejected {
            reason: DecideError::InvalidId("departmentId"),
        };
    };

    if entries.is_empty() {
        return Decision::NothingToMark;
    }

    let marked_by = non_blank(command.marked_by.as_deref());
    let mut records = Vec::with_capacity(entries.len());
    let mut dropped = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        match validate_entry(entry) {
            Ok((student_id, status)) => records.push(AttendanceRecord {
                id: new_entity_id(),
                student_id,
                subject_id,
                department_id,
                date: day.starts_at(),
                status,
                marked_by: marked_by.clone(),
                created_at: marked_at,
                updated_at: marked_at,
            }),
            Err(reason) => dropped.push(DroppedEntry { index, reason }),
        }
    }

    if records.is_empty() {
        return Decision::Rejected {
            reason: DecideError::NoValidEntries,
        };
    }
    Decision::Accepted { records, dropped }
}

fn validate_entry(
    entry: &AttendanceEntry,
) -> Result<(EntityId, AttendanceStatus), &'static str> {
    let raw_student = entry.student_id.as_deref().ok_or("missing studentId")?;
    let student_id = parse_entity_id(raw_student).ok_or("malformed studentId")?;
    let raw_status = entry.status.as_deref().ok_or("missing status")?;
    let status = AttendanceStatus::parse(raw_status).ok_or("unknown status")?;
    Ok((student_id, status))
}
