use crate::modules::attendance::core::record::AttendanceRecord;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecideError {
    #[error("Missing required fields: date, subjectId, departmentId, attendanceData array.")]
    MissingFields,

    #[error("Invalid date format. Please use YYYY-MM-DD.")]
    InvalidDate,

    #[error("Invalid {0} format.")]
    InvalidId(&'static str),

    #[error("No valid attendance data provided.")]
    NoValidEntries,
}

/// An entry of the sheet that was skipped, with its position in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedEntry {
    pub index: usize,
    pub reason: &'static str,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Decision {
    Accepted {
        records: Vec<AttendanceRecord>,
        dropped: Vec<DroppedEntry>,
    },
    NothingToMark,
    Rejected {
        reason: DecideError,
    },
}
