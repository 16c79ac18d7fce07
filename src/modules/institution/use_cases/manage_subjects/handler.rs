use crate::modules::institution::core::subject::{Subject, SubjectView};
use crate::modules::institution::use_cases::lookups::{
    department_summaries, department_summary, require_department,
};
use crate::modules::institution::use_cases::manage_subjects::command::SubjectChanges;
use crate::shared::core::errors::ApplicationError;
use crate::shared::core::primitives::{new_entity_id, non_blank, now, parse_entity_id};
use crate::shared::infrastructure::store::{DeleteOutcome, SharedStore};

fn not_found() -> ApplicationError {
    ApplicationError::NotFound("Cannot find subject".into())
}

fn required(field: &str) -> ApplicationError {
    ApplicationError::Validation(format!("Subject {field} is required."))
}

pub struct SubjectsHandler {
    store: SharedStore,
}

impl SubjectsHandler {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// A malformed department filter matches no subject.
    pub async fn list(
        &self,
        department_id: Option<&str>,
    ) -> Result<Vec<SubjectView>, ApplicationError> {
        let filter = match department_id.map(parse_entity_id) {
            None => None,
            Some(Some(id)) => Some(id),
            Some(None) => return Ok(Vec::new()),
        };
        let subjects = self.store.list_subjects(filter).await?;
        let departments = department_summaries(self.store.as_ref()).await?;
        Ok(subjects
            .into_iter()
            .map(|subject| {
                let department = departments.get(&subject.department_id).cloned();
                SubjectView::new(subject, department)
            })
            .collect())
    }

    pub async fn create(&self, changes: SubjectChanges) -> Result<SubjectView, ApplicationError> {
        let name = non_blank(changes.name.as_deref()).ok_or_else(|| required("name"))?;
        let code = non_blank(changes.code.as_deref()).ok_or_else(|| required("code"))?;
        let raw_department =
            non_blank(changes.department.as_deref()).ok_or_else(|| required("department"))?;
        let department = require_department(self.store.as_ref(), &raw_department).await?;

        let created_at = now();
        let subject = Subject {
            id: new_entity_id(),
            name,
            code,
            department_id: department.id,
            created_at,
            updated_at: created_at,
        };
        self.store.insert_subject(&subject).await.map_err(|e| {
            ApplicationError::reference_conflict_or_store(
                e,
                &raw_department,
                "Subject",
                "code",
                &subject.code,
            )
        })?;
        tracing::info!(
            subject_id = %subject.id,
            department_id = %department.id,
            "subject created"
        );
        Ok(SubjectView::new(subject, Some((&department).into())))
    }

    pub async fn get(&self, raw_id: &str) -> Result<SubjectView, ApplicationError> {
        let subject = self.load(raw_id).await?;
        self.view(subject).await
    }

    pub async fn update(
        &self,
        raw_id: &str,
        changes: SubjectChanges,
    ) -> Result<SubjectView, ApplicationError> {
        let mut subject = self.load(raw_id).await?;
        if let Some(name) = changes.name.as_deref() {
            subject.name = non_blank(Some(name)).ok_or_else(|| required("name"))?;
        }
        if let Some(code) = changes.code.as_deref() {
            subject.code = non_blank(Some(code)).ok_or_else(|| required("code"))?;
        }
        if let Some(raw_department) = changes.department.as_deref() {
            let raw_department =
                non_blank(Some(raw_department)).ok_or_else(|| required("department"))?;
            subject.department_id = require_department(self.store.as_ref(), &raw_department)
                .await?
                .id;
        }
        subject.updated_at = now();
        let department_id = subject.department_id.to_string();
        let updated = self.store.update_subject(&subject).await.map_err(|e| {
            ApplicationError::reference_conflict_or_store(
                e,
                &department_id,
                "Subject",
                "code",
                &subject.code,
            )
        })?;
        if !updated {
            return Err(not_found());
        }
        self.view(subject).await
    }

    pub async fn delete(&self, raw_id: &str) -> Result<(), ApplicationError> {
        let subject = self.load(raw_id).await?;
        match self.store.delete_subject(subject.id).await? {
            DeleteOutcome::Deleted => {
                tracing::info!(subject_id = %subject.id, "subject deleted");
                Ok(())
            }
            DeleteOutcome::Missing => Err(not_found()),
            DeleteOutcome::Referenced(dependants) => Err(ApplicationError::InUse(format!(
                "Subject '{}' is still referenced by {} attendance record(s).",
                subject.code, dependants.attendance
            ))),
        }
    }

    async fn load(&self, raw_id: &str) -> Result<Subject, ApplicationError> {
        let id = parse_entity_id(raw_id).ok_or_else(not_found)?;
        self.store.find_subject(id).await?.ok_or_else(not_found)
    }

    async fn view(&self, subject: Subject) -> Result<SubjectView, ApplicationError> {
        let department = department_summary(self.store.as_ref(), subject.department_id).await?;
        Ok(SubjectView::new(subject, department))
    }
}
