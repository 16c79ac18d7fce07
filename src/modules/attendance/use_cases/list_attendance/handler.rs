use std::collections::HashMap;

use crate::modules::attendance::use_cases::list_attendance::view::AttendanceView;
use crate::modules::institution::core::student::StudentSummary;
use crate::modules::institution::core::subject::SubjectSummary;
use crate::modules::institution::use_cases::lookups::department_summaries;
use crate::shared::core::errors::ApplicationError;
use crate::shared::core::primitives::{AttendanceDay, non_blank, parse_entity_id};
use crate::shared::infrastructure::store::{AttendanceFilter, SharedStore};

/// Raw query values as the client sent them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceQuery {
    pub date: Option<String>,
    pub subject_id: Option<String>,
    pub department_id: Option<String>,
    pub student_id: Option<String>,
}

impl AttendanceQuery {
    /// `Ok(None)` when an id filter is malformed: such a filter matches nothing.
    fn to_filter(&self) -> Result<Option<AttendanceFilter>, ApplicationError> {
        let day = match non_blank(self.date.as_deref()) {
            Some(raw) => Some(AttendanceDay::parse(&raw).ok_or_else(|| {
                ApplicationError::Validation("Invalid date format provided for filtering.".into())
            })?),
            None => None,
        };
        let mut filter = AttendanceFilter {
            day,
            ..AttendanceFilter::default()
        };
        for (raw, slot) in [
            (&self.subject_id, &mut filter.subject_id),
            (&self.department_id, &mut filter.department_id),
            (&self.student_id, &mut filter.student_id),
        ] {
            if let Some(raw) = non_blank(raw.as_deref()) {
                match parse_entity_id(&raw) {
                    Some(id) => *slot = Some(id),
                    None => return Ok(None),
                }
            }
        }
        Ok(Some(filter))
    }
}

pub struct ListAttendanceHandler {
    store: SharedStore,
}

impl ListAttendanceHandler {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn list(
        &self,
        query: AttendanceQuery,
    ) -> Result<Vec<AttendanceView>, ApplicationError> {
        let Some(filter) = query.to_filter()? else {
            return Ok(Vec::new());
        };
        let records = self.store.list_attendance(&filter).await?;
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let students: HashMap<_, _> = self
            .store
            .list_students(None)
            .await?
            .iter()
            .map(|student| (student.id, StudentSummary::from(student)))
            .collect();
        let subjects: HashMap<_, _> = self
            .store
            .list_subjects(None)
            .await?
            .iter()
            .map(|subject| (subject.id, SubjectSummary::from(subject)))
            .collect();
        let departments = department_summaries(self.store.as_ref()).await?;

        Ok(records
            .into_iter()
            .map(|record| {
                let student = students.get(&record.student_id).cloned();
                let subject = subjects.get(&record.subject_id).cloned();
                let department = departments.get(&record.department_id).cloned();
                AttendanceView::new(record, student, subject, department)
            })
            .collect())
    }
}
