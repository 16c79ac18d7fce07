use crate::modules::institution::core::student::{Student, StudentView};
use crate::modules::institution::use_cases::lookups::{
    department_summaries, department_summary, require_department,
};
use crate::modules::institution::use_cases::manage_students::command::StudentChanges;
use crate::shared::core::errors::ApplicationError;
use crate::shared::core::primitives::{new_entity_id, non_blank, now, parse_entity_id};
use crate::shared::infrastructure::store::{DeleteOutcome, SharedStore};

fn not_found() -> ApplicationError {
    ApplicationError::NotFound("Cannot find student".into())
}

fn required(field: &str) -> ApplicationError {
    ApplicationError::Validation(format!("Student {field} is required."))
}

pub struct StudentsHandler {
    store: SharedStore,
}

impl StudentsHandler {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn list(
        &self,
        department_id: Option<&str>,
    ) -> Result<Vec<StudentView>, ApplicationError> {
        let filter = match department_id.map(parse_entity_id) {
            None => None,
            Some(Some(id)) => Some(id),
            Some(None) => return Ok(Vec::new()),
        };
        let students = self.store.list_students(filter).await?;
        let departments = department_summaries(self.store.as_ref()).await?;
        Ok(students
            .into_iter()
            .map(|student| {
                let department = departments.get(&student.department_id).cloned();
                StudentView::new(student, department)
            })
            .collect())
    }

    pub async fn create(&self, changes: StudentChanges) -> Result<StudentView, ApplicationError> {
        let name = non_blank(changes.name.as_deref()).ok_or_else(|| required("name"))?;
        let roll_number =
            non_blank(changes.roll_number.as_deref()).ok_or_else(|| required("rollNumber"))?;
        let raw_department =
            non_blank(changes.department.as_deref()).ok_or_else(|| required("department"))?;
        let department = require_department(self.store.as_ref(), &raw_department).await?;

        let created_at = now();
        let student = Student {
            id: new_entity_id(),
            name,
            roll_number,
            department_id: department.id,
            created_at,
            updated_at: created_at,
        };
        self.store.insert_student(&student).await.map_err(|e| {
            ApplicationError::reference_conflict_or_store(
                e,
                &raw_department,
                "Student",
                "rollNumber",
                &student.roll_number,
            )
        })?;
        tracing::info!(
            student_id = %student.id,
            department_id = %department.id,
            "student enrolled"
        );
        Ok(StudentView::new(student, Some((&department).into())))
    }

    pub async fn get(&self, raw_id: &str) -> Result<StudentView, ApplicationError> {
        let student = self.load(raw_id).await?;
        let department = department_summary(self.store.as_ref(), student.department_id).await?;
        Ok(StudentView::new(student, department))
    }

    pub async fn update(
        &self,
        raw_id: &str,
        changes: StudentChanges,
    ) -> Result<StudentView, ApplicationError> {
        let mut student = self.load(raw_id).await?;
        if let Some(name) = changes.name.as_deref() {
            student.name = non_blank(Some(name)).ok_or_else(|| required("name"))?;
        }
        if let Some(roll_number) = changes.roll_number.as_deref() {
            student.roll_number =
                non_blank(Some(roll_number)).ok_or_else(|| required("rollNumber"))?;
        }
        if let Some(raw_department) = changes.department.as_deref() {
            let raw_department =
                non_blank(Some(raw_department)).ok_or_else(|| required("department"))?;
            student.department_id = require_department(self.store.as_ref(), &raw_department)
                .await?
                .id;
        }
        student.updated_at = now();
        let department_id = student.department_id.to_string();
        let updated = self.store.update_student(&student).await.map_err(|e| {
            ApplicationError::reference_conflict_or_store(
                e,
                &department_id,
                "Student",
                "rollNumber",
                &student.roll_number,
            )
        })?;
        if !updated {
            return Err(not_found());
        }
        let department = department_summary(self.store.as_ref(), student.department_id).await?;
        Ok(StudentView::new(student, department))
    }

    pub async fn delete(&self, raw_id: &str) -> Result<(), ApplicationError> {
        let student = self.load(raw_id).await?;
        match self.store.delete_student(student.id).await? {
            DeleteOutcome::Deleted => {
                tracing::info!(student_id = %student.id, "student removed");
                Ok(())
            }
            DeleteOutcome::Missing => Err(not_found()),
            DeleteOutcome::Referenced(dependants) => Err(ApplicationError::InUse(format!(
                "Student '{}' is still referenced by {} attendance record(s).",
                student.roll_number, dependants.attendance
            ))),
        }
    }

    async fn load(&self, raw_id: &str) -> Result<Student, ApplicationError> {
        let id = parse_entity_id(raw_id).ok_or_else(not_found)?;
        self.store.find_student(id).await?.ok_or_else(not_found)
    }
}
