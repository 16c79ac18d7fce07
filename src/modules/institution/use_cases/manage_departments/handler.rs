use crate::modules::institution::core::department::{Department, DepartmentView};
use crate::modules::institution::use_cases::manage_departments::command::DepartmentChanges;
use crate::shared::core::errors::ApplicationError;
use crate::shared::core::primitives::{new_entity_id, non_blank, now, parse_entity_id};
use crate::shared::infrastructure::store::{DeleteOutcome, SharedStore};

fn not_found() -> ApplicationError {
    ApplicationError::NotFound("Cannot find department".into())
}

pub struct DepartmentsHandler {
    store: SharedStore,
}

impl DepartmentsHandler {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<DepartmentView>, ApplicationError> {
        let departments = self.store.list_departments().await?;
        Ok(departments.into_iter().map(DepartmentView::from).collect())
    }

    pub async fn create(
        &self,
        changes: DepartmentChanges,
    ) -> Result<DepartmentView, ApplicationError> {
        let name = non_blank(changes.name.as_deref())
            .ok_or_else(|| ApplicationError::Validation("Department name is required.".into()))?;
        let created_at = now();
        let department = Department {
            id: new_entity_id(),
            name,
            created_at,
            updated_at: created_at,
        };
        self.store
            .insert_department(&department)
            .await
            .map_err(|e| {
                ApplicationError::conflict_or_store(e, "Department", "name", &department.name)
            })?;
        tracing::info!(department_id = %department.id, "department created");
        Ok(department.into())
    }

    pub async fn get(&self, raw_id: &str) -> Result<DepartmentView, ApplicationError> {
        Ok(self.load(raw_id).await?.into())
    }

    pub async fn update(
        &self,
        raw_id: &str,
        changes: DepartmentChanges,
    ) -> Result<DepartmentView, ApplicationError> {
        let mut department = self.load(raw_id).await?;
        if let Some(name) = changes.name.as_deref() {
            department.name = non_blank(Some(name)).ok_or_else(|| {
                ApplicationError::Validation("Department name cannot be empty.".into())
            })?;
        }
        department.updated_at = now();
        let updated = self
            .store
            .update_department(&department)
            .await
            .map_err(|e| {
                ApplicationError::conflict_or_store(e, "Department", "name", &department.name)
            })?;
        if !updated {
            return Err(not_found());
        }
        Ok(department.into())
    }

    /// Refuses to delete a department that subjects, students or attendance
    /// records still point at.
    pub async fn delete(&self, raw_id: &str) -> Result<(), ApplicationError> {
        let department = self.load(raw_id).await?;
        match self.store.delete_department(department.id).await? {
            DeleteOutcome::Deleted => {
                tracing::info!(department_id = %department.id, "department deleted");
                Ok(())
            }
            DeleteOutcome::Missing => Err(not_found()),
            DeleteOutcome::Referenced(dependants) => Err(ApplicationError::InUse(format!(
                "Department '{}' is still referenced by {} subject(s), {} student(s) and {} \
                 attendance record(s).",
                department.name, dependants.subjects, dependants.students, dependants.attendance
            ))),
        }
    }

    async fn load(&self, raw_id: &str) -> Result<Department, ApplicationError> {
        let id = parse_entity_id(raw_id).ok_or_else(not_found)?;
        self.store.find_department(id).await?.ok_or_else(not_found)
    }
}
