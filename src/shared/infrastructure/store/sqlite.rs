// SQLite implementation of the store ports.
//
// Purpose
// - Durable storage for the binary. Unique constraints, foreign keys and query
//   indexes live in the schema.
//
// Responsibilities
// - Serialize access to the single connection and run every port call on the
//   blocking pool, so rusqlite never stalls an async worker.
// - Each port call is atomic with respect to the others; guarded deletes run
//   inside an IMMEDIATE transaction.
// - Translate constraint failures into `StoreError::UniqueViolation` and
//   `StoreError::MissingReference`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{
    Connection, ErrorCode, OptionalExtension, Row, TransactionBehavior, params, params_from_iter,
};
use std::path::Path;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::modules::attendance::core::record::{AttendanceRecord, AttendanceStatus};
use crate::modules::institution::core::department::Department;
use crate::modules::institution::core::student::Student;
use crate::modules::institution::core::subject::Subject;
use crate::shared::core::primitives::EntityId;
use crate::shared::infrastructure::store::{
    AttendanceFilter, AttendanceRepository, DeleteOutcome, Dependants, DepartmentRepository,
    StoreError, StudentRepository, SubjectRepository, UpsertOutcome,
};

// Attendance keeps plain id columns: marking does not require the referenced
// rows to exist, and listings show dangling references as null.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS departments(
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS subjects(
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    code TEXT NOT NULL,
    department_id TEXT NOT NULL REFERENCES departments(id),
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    UNIQUE(code, department_id)
);
CREATE INDEX IF NOT EXISTS idx_subjects_department ON subjects(department_id);

CREATE TABLE IF NOT EXISTS students(
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    roll_number TEXT NOT NULL UNIQUE,
    department_id TEXT NOT NULL REFERENCES departments(id),
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_students_department ON students(department_id);

CREATE TABLE IF NOT EXISTS attendance(
    id TEXT PRIMARY KEY,
    student_id TEXT NOT NULL,
    subject_id TEXT NOT NULL,
    department_id TEXT NOT NULL,
    date INTEGER NOT NULL,
    status TEXT NOT NULL CHECK(status IN ('Present', 'Absent')),
    marked_by TEXT,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    UNIQUE(student_id, subject_id, date)
);
CREATE INDEX IF NOT EXISTS idx_attendance_date_subject ON attendance(date, subject_id);
CREATE INDEX IF NOT EXISTS idx_attendance_student_subject ON attendance(student_id, subject_id);
CREATE INDEX IF NOT EXISTS idx_attendance_date_department_subject
    ON attendance(date, department_id, subject_id);
CREATE INDEX IF NOT EXISTS idx_attendance_department ON attendance(department_id);
";

const ATTENDANCE_COLUMNS: &str = "id, student_id, subject_id, department_id, date, status, \
     marked_by, created_at, updated_at";

impl From<rusqlite::Error> for StoreError {
    fn from(error: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, Some(message)) = &error {
            if failure.code == ErrorCode::ConstraintViolation {
                if let Some(columns) = message.strip_prefix("UNIQUE constraint failed: ") {
                    return StoreError::UniqueViolation {
                        index: columns.to_string(),
                    };
                }
                if message.starts_with("FOREIGN KEY constraint failed") {
                    return StoreError::MissingReference {
                        reference: "departments.id".to_string(),
                    };
                }
            }
        }
        StoreError::Backend(error.to_string())
    }
}

pub struct SqliteStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(connection: Connection) -> Result<Self, StoreError> {
        connection.pragma_update(None, "foreign_keys", "ON")?;
        connection.execute_batch(SCHEMA)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Runs `work` on the blocking pool while holding the connection.
    async fn run<T, F>(&self, work: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let connection = Arc::clone(&self.connection);
        tokio::task::spawn_blocking(move || {
            let mut connection = connection
                .lock()
                .map_err(|_| StoreError::Backend("sqlite connection lock poisoned".into()))?;
            work(&mut connection)
        })
        .await
        .map_err(|e| StoreError::Backend(format!("sqlite task failed: {e}")))?
    }
}

fn millis(instant: DateTime<Utc>) -> i64 {
    instant.timestamp_millis()
}

fn id_column(row: &Row<'_>, index: usize) -> rusqlite::Result<EntityId> {
    let raw: String = row.get(index)?;
    Uuid::parse_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e)))
}

fn instant_column(row: &Row<'_>, index: usize) -> rusqlite::Result<DateTime<Utc>> {
    let value: i64 = row.get(index)?;
    DateTime::from_timestamp_millis(value)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(index, value))
}

fn status_column(row: &Row<'_>, index: usize) -> rusqlite::Result<AttendanceStatus> {
    let raw: String = row.get(index)?;
    AttendanceStatus::parse(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            index,
            Type::Text,
            format!("unknown attendance status '{raw}'").into(),
        )
    })
}

fn department_from_row(row: &Row<'_>) -> rusqlite::Result<Department> {
    Ok(Department {
        id: id_column(row, 0)?,
        name: row.get(1)?,
        created_at: instant_column(row, 2)?,
        updated_at: instant_column(row, 3)?,
    })
}

fn subject_from_row(row: &Row<'_>) -> rusqlite::Result<Subject> {
    Ok(Subject {
        id: id_column(row, 0)?,
        name: row.get(1)?,
        code: row.get(2)?,
        department_id: id_column(row, 3)?,
        created_at: instant_column(row, 4)?,
        updated_at: instant_column(row, 5)?,
    })
}

fn student_from_row(row: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: id_column(row, 0)?,
        name: row.get(1)?,
        roll_number: row.get(2)?,
        department_id: id_column(row, 3)?,
        created_at: instant_column(row, 4)?,
        updated_at: instant_column(row, 5)?,
    })
}

fn attendance_from_row(row: &Row<'_>) -> rusqlite::Result<AttendanceRecord> {
    Ok(AttendanceRecord {
        id: id_column(row, 0)?,
        student_id: id_column(row, 1)?,
        subject_id: id_column(row, 2)?,
        department_id: id_column(row, 3)?,
        date: instant_column(row, 4)?,
        status: status_column(row, 5)?,
        marked_by: row.get(6)?,
        created_at: instant_column(row, 7)?,
        updated_at: instant_column(row, 8)?,
    })
}

fn query_all<T>(
    connection: &Connection,
    sql: &str,
    values: &[Value],
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>, StoreError> {
    let mut statement = connection.prepare(sql)?;
    let rows = statement.query_map(params_from_iter(values.iter()), map)?;
    Ok(rows.collect::<rusqlite::Result<Vec<T>>>()?)
}

fn count_where(
    connection: &Connection,
    table: &str,
    column: &str,
    id: EntityId,
) -> Result<u64, StoreError> {
    let count: i64 = connection.query_row(
        &format!("SELECT COUNT(*) FROM {table} WHERE {column} = ?1"),
        params![id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count as u64)
}

/// Counts dependants and deletes the row in one IMMEDIATE transaction.
fn delete_unless_referenced(
    connection: &mut Connection,
    table: &str,
    id: EntityId,
    count_dependants: impl FnOnce(&Connection) -> Result<Dependants, StoreError>,
) -> Result<DeleteOutcome, StoreError> {
    let transaction = connection.transaction_with_behavior(TransactionBehavior::Immediate)?;
    if count_where(&transaction, table, "id", id)? == 0 {
        return Ok(DeleteOutcome::Missing);
    }
    let dependants = count_dependants(&transaction)?;
    if !dependants.is_empty() {
        return Ok(DeleteOutcome::Referenced(dependants));
    }
    transaction.execute(
        &format!("DELETE FROM {table} WHERE id = ?1"),
        params![id.to_string()],
    )?;
    transaction.commit()?;
    Ok(DeleteOutcome::Deleted)
}

fn department_filter(department_id: Option<EntityId>) -> (&'static str, Vec<Value>) {
    match department_id {
        Some(id) => (" WHERE department_id = ?1", vec![Value::Text(id.to_string())]),
        None => ("", Vec::new()),
    }
}

fn attendance_where(filter: &AttendanceFilter) -> (String, Vec<Value>) {
    let mut clauses = Vec::new();
    let mut values = Vec::new();
    if let Some(day) = filter.day {
        clauses.push("date >= ?");
        values.push(Value::Integer(millis(day.starts_at())));
        if let Some(end) = day.ends_at() {
            clauses.push("date < ?");
            values.push(Value::Integer(millis(end)));
        }
    }
    let equalities = [
        ("subject_id = ?", filter.subject_id),
        ("department_id = ?", filter.department_id),
        ("student_id = ?", filter.student_id),
    ];
    for (clause, id) in equalities {
        if let Some(id) = id {
            clauses.push(clause);
            values.push(Value::Text(id.to_string()));
        }
    }
    if let Some(status) = filter.status {
        clauses.push("status = ?");
        values.push(Value::Text(status.as_str().to_string()));
    }
    if clauses.is_empty() {
        return (String::new(), values);
    }
    (format!(" WHERE {}", clauses.join(" AND ")), values)
}

fn upsert_attendance_row(
    connection: &Connection,
    record: &AttendanceRecord,
) -> Result<UpsertOutcome, StoreError> {
    let existing = connection
        .query_row(
            "SELECT department_id, status, marked_by FROM attendance
             WHERE student_id = ?1 AND subject_id = ?2 AND date = ?3",
            params![
                record.student_id.to_string(),
                record.subject_id.to_string(),
                millis(record.date)
            ],
            |row| {
                Ok((
                    id_column(row, 0)?,
                    status_column(row, 1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            },
        )
        .optional()?;

    let Some((department_id, status, marked_by)) = existing else {
        connection.execute(
            "INSERT INTO attendance (id, student_id, subject_id, department_id, date, status,
                marked_by, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.id.to_string(),
                record.student_id.to_string(),
                record.subject_id.to_string(),
                record.department_id.to_string(),
                millis(record.date),
                record.status.as_str(),
                record.marked_by,
                millis(record.created_at),
                millis(record.updated_at),
            ],
        )?;
        return Ok(UpsertOutcome::Inserted);
    };

    let next_marked_by = record.marked_by.clone().or(marked_by.clone());
    if department_id == record.department_id
        && status == record.status
        && next_marked_by == marked_by
    {
        return Ok(UpsertOutcome::Unchanged);
    }
    connection.execute(
        "UPDATE attendance SET department_id = ?4, status = ?5, marked_by = ?6, updated_at = ?7
         WHERE student_id = ?1 AND subject_id = ?2 AND date = ?3",
        params![
            record.student_id.to_string(),
            record.subject_id.to_string(),
            millis(record.date),
            record.department_id.to_string(),
            record.status.as_str(),
            next_marked_by,
            millis(record.updated_at),
        ],
    )?;
    Ok(UpsertOutcome::Modified)
}

#[async_trait]
impl DepartmentRepository for SqliteStore {
    async fn insert_department(&self, department: &Department) -> Result<(), StoreError> {
        let department = department.clone();
        self.run(move |connection| {
            connection.execute(
                "INSERT INTO departments (id, name, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    department.id.to_string(),
                    department.name,
                    millis(department.created_at),
                    millis(department.updated_at),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn list_departments(&self) -> Result<Vec<Department>, StoreError> {
        self.run(|connection| {
            query_all(
                connection,
                "SELECT id, name, created_at, updated_at FROM departments ORDER BY id",
                &[],
                department_from_row,
            )
        })
        .await
    }

    async fn find_department(&self, id: EntityId) -> Result<Option<Department>, StoreError> {
        self.run(move |connection| {
            Ok(connection
                .query_row(
                    "SELECT id, name, created_at, updated_at FROM departments WHERE id = ?1",
                    params![id.to_string()],
                    department_from_row,
                )
                .optional()?)
        })
        .await
    }

    async fn update_department(&self, department: &Department) -> Result<bool, StoreError> {
        let department = department.clone();
        self.run(move |connection| {
            let changed = connection.execute(
                "UPDATE departments SET name = ?2, updated_at = ?3 WHERE id = ?1",
                params![
                    department.id.to_string(),
                    department.name,
                    millis(department.updated_at),
                ],
            )?;
            Ok(changed > 0)
        })
        .await
    }

    async fn delete_department(&self, id: EntityId) -> Result<DeleteOutcome, StoreError> {
        self.run(move |connection| {
            delete_unless_referenced(connection, "departments", id, |transaction| {
                Ok(Dependants {
                    subjects: count_where(transaction, "subjects", "department_id", id)?,
                    students: count_where(transaction, "students", "department_id", id)?,
                    attendance: count_where(transaction, "attendance", "department_id", id)?,
                })
            })
        })
        .await
    }
}

#[async_trait]
impl SubjectRepository for SqliteStore {
    async fn insert_subject(&self, subject: &Subject) -> Result<(), StoreError> {
        let subject = subject.clone();
        self.run(move |connection| {
            connection.execute(
                "INSERT INTO subjects (id, name, code, department_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    subject.id.to_string(),
                    subject.name,
                    subject.code,
                    subject.department_id.to_string(),
                    millis(subject.created_at),
                    millis(subject.updated_at),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn list_subjects(
        &self,
        department_id: Option<EntityId>,
    ) -> Result<Vec<Subject>, StoreError> {
        let (clause, values) = department_filter(department_id);
        let sql = format!(
            "SELECT id, name, code, department_id, created_at, updated_at \
             FROM subjects{clause} ORDER BY id"
        );
        self.run(move |connection| query_all(connection, &sql, &values, subject_from_row))
            .await
    }

    async fn find_subject(&self, id: EntityId) -> Result<Option<Subject>, StoreError> {
        self.run(move |connection| {
            Ok(connection
                .query_row(
                    "SELECT id, name, code, department_id, created_at, updated_at
                     FROM subjects WHERE id = ?1",
                    params![id.to_string()],
                    subject_from_row,
                )
                .optional()?)
        })
        .await
    }

    async fn update_subject(&self, subject: &Subject) -> Result<bool, StoreError> {
        let subject = subject.clone();
        self.run(move |connection| {
            let changed = connection.execute(
                "UPDATE subjects SET name = ?2, code = ?3, department_id = ?4, updated_at = ?5
                 WHERE id = ?1",
                params![
                    subject.id.to_string(),
                    subject.name,
                    subject.code,
                    subject.department_id.to_string(),
                    millis(subject.updated_at),
                ],
            )?;
            Ok(changed > 0)
        })
        .await
    }

    async fn delete_subject(&self, id: EntityId) -> Result<DeleteOutcome, StoreError> {
        self.run(move |connection| {
            delete_unless_referenced(connection, "subjects", id, |transaction| {
                Ok(Dependants {
                    attendance: count_where(transaction, "attendance", "subject_id", id)?,
                    ..Dependants::default()
                })
            })
        })
        .await
    }
}

#[async_trait]
impl StudentRepository for SqliteStore {
    async fn insert_student(&self, student: &Student) -> Result<(), StoreError> {
        let student = student.clone();
        self.run(move |connection| {
            connection.execute(
                "INSERT INTO students (id, name, roll_number, department_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    student.id.to_string(),
                    student.name,
                    student.roll_number,
                    student.department_id.to_string(),
                    millis(student.created_at),
                    millis(student.updated_at),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn list_students(
        &self,
        department_id: Option<EntityId>,
    ) -> Result<Vec<Student>, StoreError> {
        let (clause, values) = department_filter(department_id);
        let sql = format!(
            "SELECT id, name, roll_number, department_id, created_at, updated_at \
             FROM students{clause} ORDER BY id"
        );
        self.run(move |connection| query_all(connection, &sql, &values, student_from_row))
            .await
    }

    async fn find_student(&self, id: EntityId) -> Result<Option<Student>, StoreError> {
        self.run(move |connection| {
            Ok(connection
                .query_row(
                    "SELECT id, name, roll_number, department_id, created_at, updated_at
                     FROM students WHERE id = ?1",
                    params![id.to_string()],
                    student_from_row,
                )
                .optional()?)
        })
        .await
    }

    async fn update_student(&self, student: &Student) -> Result<bool, StoreError> {
        let student = student.clone();
        self.run(move |connection| {
            let changed = connection.execute(
                "UPDATE students SET name = ?2, roll_number = ?3, department_id = ?4,
                    updated_at = ?5
                 WHERE id = ?1",
                params![
                    student.id.to_string(),
                    student.name,
                    student.roll_number,
                    student.department_id.to_string(),
                    millis(student.updated_at),
                ],
            )?;
            Ok(changed > 0)
        })
        .await
    }

    async fn delete_student(&self, id: EntityId) -> Result<DeleteOutcome, StoreError> {
        self.run(move |connection| {
            delete_unless_referenced(connection, "students", id, |transaction| {
                Ok(Dependants {
                    attendance: count_where(transaction, "attendance", "student_id", id)?,
                    ..Dependants::default()
                })
            })
        })
        .await
    }
}

#[async_trait]
impl AttendanceRepository for SqliteStore {
    async fn upsert_attendance(
        &self,
        record: &AttendanceRecord,
    ) -> Result<UpsertOutcome, StoreError> {
        let record = record.clone();
        self.run(move |connection| upsert_attendance_row(connection, &record))
            .await
    }

    async fn list_attendance(
        &self,
        filter: &AttendanceFilter,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let (clause, values) = attendance_where(filter);
        let sql = format!("SELECT {ATTENDANCE_COLUMNS} FROM attendance{clause} ORDER BY date, id");
        self.run(move |connection| query_all(connection, &sql, &values, attendance_from_row))
            .await
    }

    async fn count_attendance(&self, filter: &AttendanceFilter) -> Result<u64, StoreError> {
        let (clause, values) = attendance_where(filter);
        let sql = format!("SELECT COUNT(*) FROM attendance{clause}");
        self.run(move |connection| {
            let count: i64 =
                connection.query_row(&sql, params_from_iter(values.iter()), |row| row.get(0))?;
            Ok(count as u64)
        })
        .await
    }
}
