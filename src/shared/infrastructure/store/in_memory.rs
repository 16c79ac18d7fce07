// In memory implementation of the store ports.
//
// Purpose
// - Support handler tests and local development without a database file.
//
// Responsibilities
// - Keep every collection behind one lock so a unique or reference check and
//   the write that follows it cannot interleave with another writer.
// - Simulate an unreachable backend through `toggle_offline`.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use crate::modules::attendance::core::record::{AttendanceKey, AttendanceRecord};
use crate::modules::institution::core::department::Department;
use crate::modules::institution::core::student::Student;
use crate::modules::institution::core::subject::Subject;
use crate::shared::core::primitives::EntityId;
use crate::shared::infrastructure::store::{
    AttendanceFilter, AttendanceRepository, DEPARTMENT_NAME_INDEX, DeleteOutcome, Dependants,
    DepartmentRepository, STUDENT_ROLL_NUMBER_INDEX, SUBJECT_CODE_INDEX, StoreError,
    StudentRepository, SubjectRepository, UpsertOutcome,
};

#[derive(Default)]
struct Tables {
    // Uuid v7 keys, so iteration order is creation order.
    departments: BTreeMap<EntityId, Department>,
    subjects: BTreeMap<EntityId, Subject>,
    students: BTreeMap<EntityId, Student>,
    attendance: BTreeMap<EntityId, AttendanceRecord>,
    attendance_keys: HashMap<AttendanceKey, EntityId>,
}

impl Tables {
    fn require_department(&self, id: EntityId) -> Result<(), StoreError> {
        if self.departments.contains_key(&id) {
            return Ok(());
        }
        Err(StoreError::MissingReference {
            reference: format!("departments.id = {id}"),
        })
    }

    fn attendance_where(&self, matches: impl Fn(&AttendanceRecord) -> bool) -> u64 {
        self.attendance.values().filter(|&record| matches(record)).count() as u64
    }
}

fn unique_violation(index: &str) -> StoreError {
    StoreError::UniqueViolation {
        index: index.to_string(),
    }
}

fn delete_unless_referenced<T>(
    table: &mut BTreeMap<EntityId, T>,
    id: EntityId,
    dependants: Dependants,
) -> DeleteOutcome {
    if !table.contains_key(&id) {
        return DeleteOutcome::Missing;
    }
    if !dependants.is_empty() {
        return DeleteOutcome::Referenced(dependants);
    }
    table.remove(&id);
    DeleteOutcome::Deleted
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
    is_offline: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&mut self) {
        self.is_offline = !self.is_offline;
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.is_offline {
            return Err(StoreError::Backend("Store offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl DepartmentRepository for InMemoryStore {
    async fn insert_department(&self, department: &Department) -> Result<(), StoreError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;
        if tables.departments.values().any(|d| d.name == department.name) {
            return Err(unique_violation(DEPARTMENT_NAME_INDEX));
        }
        tables
            .departments
            .insert(department.id, department.clone());
        Ok(())
    }

    async fn list_departments(&self) -> Result<Vec<Department>, StoreError> {
        self.ensure_online()?;
        Ok(self.tables.read().await.departments.values().cloned().collect())
    }

    async fn find_department(&self, id: EntityId) -> Result<Option<Department>, StoreError> {
        self.ensure_online()?;
        Ok(self.tables.read().await.departments.get(&id).cloned())
    }

    async fn update_department(&self, department: &Department) -> Result<bool, StoreError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;
        if !tables.departments.contains_key(&department.id) {
            return Ok(false);
        }
        if tables
            .departments
            .values()
            .any(|d| d.id != department.id && d.name == department.name)
        {
            return Err(unique_violation(DEPARTMENT_NAME_INDEX));
        }
        tables
            .departments
            .insert(department.id, department.clone());
        Ok(true)
    }

    async fn delete_department(&self, id: EntityId) -> Result<DeleteOutcome, StoreError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;
        let dependants = Dependants {
            subjects: tables.subjects.values().filter(|s| s.department_id == id).count() as u64,
            students: tables.students.values().filter(|s| s.department_id == id).count() as u64,
            attendance: tables.attendance_where(|record| record.department_id == id),
        };
        Ok(delete_unless_referenced(&mut tables.departments, id, dependants))
    }
}

#[async_trait]
impl SubjectRepository for InMemoryStore {
    async fn insert_subject(&self, subject: &Subject) -> Result<(), StoreError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;
        tables.require_department(subject.department_id)?;
        if tables
            .subjects
            .values()
            .any(|s| s.code == subject.code && s.department_id == subject.department_id)
        {
            return Err(unique_violation(SUBJECT_CODE_INDEX));
        }
        tables.subjects.insert(subject.id, subject.clone());
        Ok(())
    }

    async fn list_subjects(
        &self,
        department_id: Option<EntityId>,
    ) -> Result<Vec<Subject>, StoreError> {
        self.ensure_online()?;
        Ok(self
            .tables
            .read()
            .await
            .subjects
            .values()
            .filter(|s| department_id.is_none_or(|id| s.department_id == id))
            .cloned()
            .collect())
    }

    async fn find_subject(&self, id: EntityId) -> Result<Option<Subject>, StoreError> {
        self.ensure_online()?;
        Ok(self.tables.read().await.subjects.get(&id).cloned())
    }

    async fn update_subject(&self, subject: &Subject) -> Result<bool, StoreError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;
        if !tables.subjects.contains_key(&subject.id) {
            return Ok(false);
        }
        tables.require_department(subject.department_id)?;
        if tables.subjects.values().any(|s| {
            s.id != subject.id && s.code == subject.code && s.department_id == subject.department_id
        }) {
            return Err(unique_violation(SUBJECT_CODE_INDEX));
        }
        tables.subjects.insert(subject.id, subject.clone());
        Ok(true)
    }

    async fn delete_subject(&self, id: EntityId) -> Result<DeleteOutcome, StoreError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;
        let dependants = Dependants {
            attendance: tables.attendance_where(|record| record.subject_id == id),
            ..Dependants::default()
        };
        Ok(delete_unless_referenced(&mut tables.subjects, id, dependants))
    }
}

#[async_trait]
impl StudentRepository for InMemoryStore {
    async fn insert_student(&self, student: &Student) -> Result<(), StoreError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;
        tables.require_department(student.department_id)?;
        if tables
            .students
            .values()
            .any(|s| s.roll_number == student.roll_number)
        {
            return Err(unique_violation(STUDENT_ROLL_NUMBER_INDEX));
        }
        tables.students.insert(student.id, student.clone());
        Ok(())
    }

    async fn list_students(
        &self,
        department_id: Option<EntityId>,
    ) -> Result<Vec<Student>, StoreError> {
        self.ensure_online()?;
        Ok(self
            .tables
            .read()
            .await
            .students
            .values()
            .filter(|s| department_id.is_none_or(|id| s.department_id == id))
            .cloned()
            .collect())
    }

    async fn find_student(&self, id: EntityId) -> Result<Option<Student>, StoreError> {
        self.ensure_online()?;
        Ok(self.tables.read().await.students.get(&id).cloned())
    }

    async fn update_student(&self, student: &Student) -> Result<bool, StoreError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;
        if !tables.students.contains_key(&student.id) {
            return Ok(false);
        }
        tables.require_department(student.department_id)?;
        if tables
            .students
            .values()
            .any(|s| s.id != student.id && s.roll_number == student.roll_number)
        {
            return Err(unique_violation(STUDENT_ROLL_NUMBER_INDEX));
        }
        tables.students.insert(student.id, student.clone());
        Ok(true)
    }

    async fn delete_student(&self, id: EntityId) -> Result<DeleteOutcome, StoreError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;
        let dependants = Dependants {
            attendance: tables.attendance_where(|record| record.student_id == id),
            ..Dependants::default()
        };
        Ok(delete_unless_referenced(&mut tables.students, id, dependants))
    }
}

#[async_trait]
impl AttendanceRepository for InMemoryStore {
    async fn upsert_attendance(
        &self,
        record: &AttendanceRecord,
    ) -> Result<UpsertOutcome, StoreError> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;
        let key = record.key();
        let Some(existing_id) = tables.attendance_keys.get(&key).copied() else {
            tables.attendance_keys.insert(key, record.id);
            tables.attendance.insert(record.id, record.clone());
            return Ok(UpsertOutcome::Inserted);
        };
        let Some(existing) = tables.attendance.get_mut(&existing_id) else {
            return Err(StoreError::Backend(format!(
                "attendance key points at missing record {existing_id}"
            )));
        };
        let marked_by = record.marked_by.clone().or_else(|| existing.marked_by.clone());
        if existing.department_id == record.department_id
            && existing.status == record.status
            && existing.marked_by == marked_by
        {
            return Ok(UpsertOutcome::Unchanged);
        }
        existing.department_id = record.department_id;
        existing.status = record.status;
        existing.marked_by = marked_by;
        existing.updated_at = record.updated_at;
        Ok(UpsertOutcome::Modified)
    }

    async fn list_attendance(
        &self,
        filter: &AttendanceFilter,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        self.ensure_online()?;
        let mut records: Vec<AttendanceRecord> = self
            .tables
            .read()
            .await
            .attendance
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();
        records.sort_by_key(|record| record.date);
        Ok(records)
    }

    async fn count_attendance(&self, filter: &AttendanceFilter) -> Result<u64, StoreError> {
        self.ensure_online()?;
        Ok(self
            .tables
            .read()
            .await
            .attendance
            .values()
            .filter(|record| filter.matches(record))
            .count() as u64)
    }
}

#[cfg(test)]
mod in_memory_store_tests {
    use super::*;
    use crate::modules::attendance::core::record::AttendanceStatus;
    use crate::tests::fixtures::{attendance_record, department, student, subject};
    use rstest::{fixture, rstest};
    use std::sync::Arc;

    #[fixture]
    fn store() -> InMemoryStore {
        InMemoryStore::new()
    }

    async fn with_departments(store: &InMemoryStore, names: &[&str]) -> Vec<Department> {
        let mut departments = Vec::new();
        for name in names {
            let created = department(name);
            store.insert_department(&created).await.unwrap();
            departments.push(created);
        }
        departments
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reject_a_second_department_with_the_same_name(store: InMemoryStore) {
        store.insert_department(&department("Physics")).await.unwrap();
        let result = store.insert_department(&department("Physics")).await;
        assert!(matches!(
            result,
            Err(StoreError::UniqueViolation { index }) if index == DEPARTMENT_NAME_INDEX
        ));
        assert_eq!(store.list_departments().await.unwrap().len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_allow_the_same_subject_code_in_another_department(store: InMemoryStore) {
        let departments = with_departments(&store, &["Physics", "Maths"]).await;
        let (physics, maths) = (&departments[0], &departments[1]);
        store
            .insert_subject(&subject("Mechanics", "GEN101", physics.id))
            .await
            .unwrap();
        store
            .insert_subject(&subject("Algebra", "GEN101", maths.id))
            .await
            .unwrap();
        let duplicate = store
            .insert_subject(&subject("Optics", "GEN101", physics.id))
            .await;
        assert!(matches!(duplicate, Err(StoreError::UniqueViolation { .. })));
        assert_eq!(store.list_subjects(Some(physics.id)).await.unwrap().len(), 1);
        assert_eq!(store.list_subjects(None).await.unwrap().len(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_keep_the_original_student_on_duplicate_roll_number(store: InMemoryStore) {
        let physics = with_departments(&store, &["Physics"]).await.remove(0);
        let original = student("Ada", "R-001", physics.id);
        store.insert_student(&original).await.unwrap();
        let result = store
            .insert_student(&student("Grace", "R-001", physics.id))
            .await;
        assert!(result.is_err());
        assert_eq!(store.list_students(None).await.unwrap(), vec![original]);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_not_update_a_missing_department(store: InMemoryStore) {
        assert!(!store.update_department(&department("Ghost")).await.unwrap());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_reject_renaming_onto_an_existing_roll_number(store: InMemoryStore) {
        let physics = with_departments(&store, &["Physics"]).await.remove(0);
        store
            .insert_student(&student("Ada", "R-001", physics.id))
            .await
            .unwrap();
        let mut grace = student("Grace", "R-002", physics.id);
        store.insert_student(&grace).await.unwrap();
        grace.roll_number = "R-001".into();
        assert!(store.update_student(&grace).await.is_err());
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_not_write_rows_for_a_missing_department(store: InMemoryStore) {
        let ghost = department("Ghost");
        let subject_result = store.insert_subject(&subject("Mechanics", "PHY101", ghost.id)).await;
        let student_result = store.insert_student(&student("Ada", "R-001", ghost.id)).await;
        assert!(matches!(subject_result, Err(StoreError::MissingReference { .. })));
        assert!(matches!(student_result, Err(StoreError::MissingReference { .. })));
        assert!(store.list_subjects(None).await.unwrap().is_empty());
        assert!(store.list_students(None).await.unwrap().is_empty());

        let physics = with_departments(&store, &["Physics"]).await.remove(0);
        let mut ada = student("Ada", "R-001", physics.id);
        store.insert_student(&ada).await.unwrap();
        ada.department_id = ghost.id;
        assert!(matches!(
            store.update_student(&ada).await,
            Err(StoreError::MissingReference { .. })
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_count_dependants_instead_of_deleting(store: InMemoryStore) {
        let physics = with_departments(&store, &["Physics"]).await.remove(0);
        let mechanics = subject("Mechanics", "PHY101", physics.id);
        let ada = student("Ada", "R-001", physics.id);
        store.insert_subject(&mechanics).await.unwrap();
        store.insert_student(&ada).await.unwrap();
        store
            .upsert_attendance(&attendance_record(
                &ada,
                &mechanics,
                "2024-01-01",
                AttendanceStatus::Present,
            ))
            .await
            .unwrap();

        assert_eq!(
            store.delete_department(physics.id).await.unwrap(),
            DeleteOutcome::Referenced(Dependants {
                subjects: 1,
                students: 1,
                attendance: 1,
            })
        );
        assert_eq!(
            store.delete_student(ada.id).await.unwrap(),
            DeleteOutcome::Referenced(Dependants {
                attendance: 1,
                ..Dependants::default()
            })
        );
        assert!(matches!(
            store.delete_subject(mechanics.id).await.unwrap(),
            DeleteOutcome::Referenced(_)
        ));
        assert_eq!(store.list_departments().await.unwrap().len(), 1);
        assert_eq!(
            store.delete_student(department("Ghost").id).await.unwrap(),
            DeleteOutcome::Missing
        );
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_never_orphan_a_student_racing_a_department_delete() {
        let store = Arc::new(InMemoryStore::new());
        let physics = with_departments(&store, &["Physics"]).await.remove(0);
        let ada = student("Ada", "R-001", physics.id);

        let (inserted, deleted) = tokio::join!(
            store.insert_student(&ada),
            store.delete_department(physics.id)
        );
        let departments = store.list_departments().await.unwrap();
        let students = store.list_students(None).await.unwrap();
        match deleted.unwrap() {
            DeleteOutcome::Deleted => {
                assert!(matches!(inserted, Err(StoreError::MissingReference { .. })));
                assert!(departments.is_empty() && students.is_empty());
            }
            DeleteOutcome::Referenced(dependants) => {
                inserted.unwrap();
                assert_eq!(dependants.students, 1);
                assert_eq!((departments.len(), students.len()), (1, 1));
            }
            DeleteOutcome::Missing => panic!("department vanished"),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_count_attendance_by_status(store: InMemoryStore) {
        let physics = department("Physics");
        let mechanics = subject("Mechanics", "PHY101", physics.id);
        let ada = student("Ada", "R-001", physics.id);
        let grace = student("Grace", "R-002", physics.id);
        for record in [
            attendance_record(&ada, &mechanics, "2024-01-01", AttendanceStatus::Present),
            attendance_record(&grace, &mechanics, "2024-01-01", AttendanceStatus::Absent),
            attendance_record(&ada, &mechanics, "2024-01-02", AttendanceStatus::Present),
        ] {
            store.upsert_attendance(&record).await.unwrap();
        }
        let present = AttendanceFilter {
            status: Some(AttendanceStatus::Present),
            ..AttendanceFilter::default()
        };
        assert_eq!(store.count_attendance(&present).await.unwrap(), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_filter_the_last_representable_day(store: InMemoryStore) {
        let physics = department("Physics");
        let mechanics = subject("Mechanics", "PHY101", physics.id);
        let ada = student("Ada", "R-001", physics.id);
        let last_day = chrono::NaiveDate::MAX.format("%Y-%m-%d").to_string();
        for day in ["2024-01-01", last_day.as_str()] {
            store
                .upsert_attendance(&attendance_record(
                    &ada,
                    &mechanics,
                    day,
                    AttendanceStatus::Present,
                ))
                .await
                .unwrap();
        }
        let filter = AttendanceFilter {
            day: crate::shared::core::primitives::AttendanceDay::parse(&last_day),
            ..AttendanceFilter::default()
        };
        let records = store.list_attendance(&filter).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date.date_naive(), chrono::NaiveDate::MAX);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_upsert_attendance_by_student_subject_and_day(store: InMemoryStore) {
        let physics = department("Physics");
        let mechanics = subject("Mechanics", "PHY101", physics.id);
        let ada = student("Ada", "R-001", physics.id);
        let first = attendance_record(&ada, &mechanics, "2024-01-01", AttendanceStatus::Present);
        let again = attendance_record(&ada, &mechanics, "2024-01-01", AttendanceStatus::Present);
        let flipped = attendance_record(&ada, &mechanics, "2024-01-01", AttendanceStatus::Absent);

        assert_eq!(store.upsert_attendance(&first).await.unwrap(), UpsertOutcome::Inserted);
        assert_eq!(store.upsert_attendance(&again).await.unwrap(), UpsertOutcome::Unchanged);
        assert_eq!(store.upsert_attendance(&flipped).await.unwrap(), UpsertOutcome::Modified);

        let stored = store
            .list_attendance(&AttendanceFilter::default())
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, first.id);
        assert_eq!(stored[0].status, AttendanceStatus::Absent);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_never_duplicate_a_key_under_concurrent_upserts() {
        let store = Arc::new(InMemoryStore::new());
        let physics = department("Physics");
        let mechanics = subject("Mechanics", "PHY101", physics.id);
        let ada = student("Ada", "R-001", physics.id);
        let present = attendance_record(&ada, &mechanics, "2024-01-01", AttendanceStatus::Present);
        let absent = attendance_record(&ada, &mechanics, "2024-01-01", AttendanceStatus::Absent);

        let (left, right) = tokio::join!(
            store.upsert_attendance(&present),
            store.upsert_attendance(&absent)
        );
        let outcomes = [left.unwrap(), right.unwrap()];
        assert!(outcomes.contains(&UpsertOutcome::Inserted));
        assert!(outcomes.contains(&UpsertOutcome::Modified));
        assert_eq!(
            store.count_attendance(&AttendanceFilter::default()).await.unwrap(),
            1
        );
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_filter_attendance(store: InMemoryStore) {
        let physics = department("Physics");
        let mechanics = subject("Mechanics", "PHY101", physics.id);
        let ada = student("Ada", "R-001", physics.id);
        let grace = student("Grace", "R-002", physics.id);
        for record in [
            attendance_record(&ada, &mechanics, "2024-01-01", AttendanceStatus::Present),
            attendance_record(&grace, &mechanics, "2024-01-01", AttendanceStatus::Absent),
            attendance_record(&ada, &mechanics, "2024-01-02", AttendanceStatus::Absent),
        ] {
            store.upsert_attendance(&record).await.unwrap();
        }
        let by_student = AttendanceFilter {
            student_id: Some(ada.id),
            ..AttendanceFilter::default()
        };
        assert_eq!(store.count_attendance(&by_student).await.unwrap(), 2);
        let by_day = AttendanceFilter {
            day: crate::shared::core::primitives::AttendanceDay::parse("2024-01-02"),
            ..AttendanceFilter::default()
        };
        let records = store.list_attendance(&by_day).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].student_id, ada.id);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_fail_every_call_while_offline(mut store: InMemoryStore) {
        store.toggle_offline();
        let result = store.list_departments().await;
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Store offline")
        );
        assert!(store.insert_department(&department("Physics")).await.is_err());
    }
}
