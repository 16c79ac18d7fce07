use crate::modules::institution::core::student::StudentSummary;
use crate::shared::core::errors::ApplicationError;
use crate::shared::core::primitives::{non_blank, parse_entity_id};
use crate::shared::infrastructure::store::SharedStore;

/// Roster for a marking sheet: the students of a department. A subject on its
/// own stands for the department that owns it. A malformed department id
/// matches nobody, like the student list filter.
pub struct StudentsForMarkingHandler {
    store: SharedStore,
}

impl StudentsForMarkingHandler {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        department_id: Option<&str>,
        subject_id: Option<&str>,
    ) -> Result<Vec<StudentSummary>, ApplicationError> {
        let department_id = match (non_blank(department_id), non_blank(subject_id)) {
            (Some(raw), _) => match parse_entity_id(&raw) {
                Some(id) => id,
                None => return Ok(Vec::new()),
            },
            (None, Some(raw)) => {
                let subject = match parse_entity_id(&raw) {
                    Some(id) => self.store.find_subject(id).await?,
                    None => None,
                };
                subject
                    .ok_or_else(|| ApplicationError::NotFound("Cannot find subject".into()))?
                    .department_id
            }
            (None, None) => {
                return Err(ApplicationError::Validation(
                    "Either subjectId or departmentId is required.".into(),
                ));
            }
        };
        let students = self.store.list_students(Some(department_id)).await?;
        Ok(students.iter().map(StudentSummary::from).collect())
    }
}
