use std::sync::Arc;

use axum::{Router, http::StatusCode};
use rstest::rstest;
use serde_json::{Value, json};

use crate::shared::infrastructure::store::SharedStore;
use crate::shared::infrastructure::store::sqlite::SqliteStore;
use crate::shell::http::router;
use crate::tests::fixtures::{in_memory_store, make_test_state, send};

#[derive(Debug, Clone, Copy)]
enum Backend {
    InMemory,
    Sqlite,
}

fn app(backend: Backend) -> Router {
    let store: SharedStore = match backend {
        Backend::InMemory => in_memory_store(),
        Backend::Sqlite => Arc::new(SqliteStore::open_in_memory().unwrap()),
    };
    router(make_test_state(store))
}

async fn create(app: &Router, uri: &str, body: Value) -> Value {
    let (status, created) = send(app.clone(), "POST", uri, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    created
}

fn id(entity: &Value) -> &str {
    entity["id"].as_str().unwrap()
}

#[rstest]
#[case(Backend::InMemory)]
#[case(Backend::Sqlite)]
#[tokio::test]
async fn marks_attendance_and_reports_it_on_the_dashboard(#[case] backend: Backend) {
    let app = app(backend);

    let (_, overall) = send(app.clone(), "GET", "/api/attendance/stats/overall", None).await;
    assert_eq!(overall, json!({ "Present": 0, "Absent": 0 }));

    let physics = create(&app, "/api/departments", json!({ "name": "Physics" })).await;
    let maths = create(&app, "/api/departments", json!({ "name": "Maths" })).await;
    let mechanics = create(
        &app,
        "/api/subjects",
        json!({ "name": "Mechanics", "code": "PHY101", "department": physics["id"] }),
    )
    .await;
    let algebra = create(
        &app,
        "/api/subjects",
        json!({ "name": "Algebra", "code": "MAT101", "department": maths["id"] }),
    )
    .await;
    let ada = create(
        &app,
        "/api/students",
        json!({ "name": "Ada", "rollNumber": "R-001", "department": physics["id"] }),
    )
    .await;
    let grace = create(
        &app,
        "/api/students",
        json!({ "name": "Grace", "rollNumber": "R-002", "department": physics["id"] }),
    )
    .await;

    let roster_uri = format!(
        "/api/attendance/students-for-marking?subjectId={}",
        id(&mechanics)
    );
    let (status, roster) = send(app.clone(), "GET", &roster_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        roster,
        json!([
            { "id": ada["id"], "name": "Ada", "rollNumber": "R-001" },
            { "id": grace["id"], "name": "Grace", "rollNumber": "R-002" }
        ])
    );

    let (status, marked) = send(
        app.clone(),
        "POST",
        "/api/attendance/mark",
        Some(json!({
            "date": "2024-01-01T09:15:00Z",
            "subjectId": mechanics["id"],
            "departmentId": physics["id"],
            "attendanceData": [
                { "studentId": ada["id"], "status": "Present" },
                { "studentId": grace["id"], "status": "Absent" },
                { "studentId": grace["id"], "status": "Late" }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(marked["upsertedCount"], 2);

    let (status, remarked) = send(
        app.clone(),
        "POST",
        "/api/attendance/mark",
        Some(json!({
            "date": "2024-01-01",
            "subjectId": algebra["id"],
            "departmentId": maths["id"],
            "attendanceData": [{ "studentId": ada["id"], "status": "Absent" }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(remarked["upsertedCount"], 1);

    let (_, overall) = send(app.clone(), "GET", "/api/attendance/stats/overall", None).await;
    assert_eq!(overall, json!({ "Present": 1, "Absent": 2 }));

    let (_, by_department) =
        send(app.clone(), "GET", "/api/attendance/stats/by-department", None).await;
    assert_eq!(
        by_department,
        json!([
            {
                "departmentId": maths["id"],
                "departmentName": "Maths",
                "presentCount": 0,
                "absentCount": 1
            },
            {
                "departmentId": physics["id"],
                "departmentName": "Physics",
                "presentCount": 1,
                "absentCount": 1
            }
        ])
    );

    let by_subject_uri = format!(
        "/api/attendance/stats/by-subject?departmentId={}",
        id(&physics)
    );
    let (_, by_subject) = send(app.clone(), "GET", &by_subject_uri, None).await;
    assert_eq!(
        by_subject,
        json!([{
            "subjectId": mechanics["id"],
            "subjectName": "Mechanics",
            "subjectCode": "PHY101",
            "departmentName": "Physics",
            "presentCount": 1,
            "absentCount": 1
        }])
    );

    let (_, same_day) = send(app.clone(), "GET", "/api/attendance?date=2024-01-01", None).await;
    assert_eq!(same_day.as_array().unwrap().len(), 3);
    assert!(
        same_day
            .as_array()
            .unwrap()
            .iter()
            .all(|record| record["date"] == "2024-01-01T00:00:00Z")
    );
    let (_, next_day) = send(app, "GET", "/api/attendance?date=2024-01-02", None).await;
    assert_eq!(next_day, json!([]));
}

#[rstest]
#[case(Backend::InMemory)]
#[case(Backend::Sqlite)]
#[tokio::test]
async fn marking_the_same_day_twice_keeps_one_record_with_the_latest_status(
    #[case] backend: Backend,
) {
    let app = app(backend);
    let physics = create(&app, "/api/departments", json!({ "name": "Physics" })).await;
    let mechanics = create(
        &app,
        "/api/subjects",
        json!({ "name": "Mechanics", "code": "PHY101", "department": physics["id"] }),
    )
    .await;
    let ada = create(
        &app,
        "/api/students",
        json!({ "name": "Ada", "rollNumber": "R-001", "department": physics["id"] }),
    )
    .await;

    for (date, status) in [("2024-01-01", "Present"), ("2024-01-01T23:59:59Z", "Absent")] {
        send(
            app.clone(),
            "POST",
            "/api/attendance/mark",
            Some(json!({
                "date": date,
                "subjectId": mechanics["id"],
                "departmentId": physics["id"],
                "markedBy": "Prof. Hopper",
                "attendanceData": [{ "studentId": ada["id"], "status": status }]
            })),
        )
        .await;
    }

    let uri = format!("/api/attendance?studentId={}", id(&ada));
    let (_, records) = send(app, "GET", &uri, None).await;
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["status"], "Absent");
    assert_eq!(records[0]["markedBy"], "Prof. Hopper");
    assert_eq!(records[0]["student"]["rollNumber"], "R-001");
    assert_eq!(records[0]["subject"]["code"], "PHY101");
    assert_eq!(records[0]["department"]["name"], "Physics");
}

#[rstest]
#[case(Backend::InMemory)]
#[case(Backend::Sqlite)]
#[tokio::test]
async fn deleting_a_department_is_refused_while_students_remain(#[case] backend: Backend) {
    let app = app(backend);
    let physics = create(&app, "/api/departments", json!({ "name": "Physics" })).await;
    let maths = create(&app, "/api/departments", json!({ "name": "Maths" })).await;
    let ada = create(
        &app,
        "/api/students",
        json!({ "name": "Ada", "rollNumber": "R-001", "department": physics["id"] }),
    )
    .await;

    let physics_uri = format!("/api/departments/{}", id(&physics));
    let (status, refused) = send(app.clone(), "DELETE", &physics_uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(refused["message"].as_str().unwrap().contains("1 student(s)"));

    let (status, _) = send(
        app.clone(),
        "DELETE",
        &format!("/api/departments/{}", id(&maths)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        app.clone(),
        "DELETE",
        &format!("/api/students/{}", id(&ada)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(app.clone(), "DELETE", &physics_uri, None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, departments) = send(app, "GET", "/api/departments", None).await;
    assert_eq!(departments, json!([]));
}

#[rstest]
#[case(Backend::InMemory)]
#[case(Backend::Sqlite)]
#[tokio::test]
async fn duplicate_names_and_roll_numbers_are_conflicts(#[case] backend: Backend) {
    let app = app(backend);
    let physics = create(&app, "/api/departments", json!({ "name": "Physics" })).await;
    let (status, error) = send(
        app.clone(),
        "POST",
        "/api/departments",
        Some(json!({ "name": "Physics" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["field"], "name");

    let ada = create(
        &app,
        "/api/students",
        json!({ "name": "Ada", "rollNumber": "R-001", "department": physics["id"] }),
    )
    .await;
    let (status, error) = send(
        app.clone(),
        "POST",
        "/api/students",
        Some(json!({ "name": "Grace", "rollNumber": "R-001", "department": physics["id"] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["field"], "rollNumber");

    let (_, students) = send(app, "GET", "/api/students", None).await;
    assert_eq!(students.as_array().unwrap().len(), 1);
    assert_eq!(students[0]["id"], ada["id"]);
    assert_eq!(students[0]["name"], "Ada");
}

#[rstest]
#[case(Backend::InMemory, chrono::NaiveDate::MAX)]
#[case(Backend::Sqlite, chrono::NaiveDate::MAX)]
#[case(Backend::InMemory, chrono::NaiveDate::MIN)]
#[case(Backend::Sqlite, chrono::NaiveDate::MIN)]
#[tokio::test]
async fn marks_and_lists_the_edges_of_the_calendar(
    #[case] backend: Backend,
    #[case] edge: chrono::NaiveDate,
) {
    let app = app(backend);
    let physics = create(&app, "/api/departments", json!({ "name": "Physics" })).await;
    let mechanics = create(
        &app,
        "/api/subjects",
        json!({ "name": "Mechanics", "code": "PHY101", "department": physics["id"] }),
    )
    .await;
    let ada = create(
        &app,
        "/api/students",
        json!({ "name": "Ada", "rollNumber": "R-001", "department": physics["id"] }),
    )
    .await;
    let day = edge.format("%Y-%m-%d").to_string();

    let (status, _) = send(app.clone(), "GET", "/api/attendance?date=2024-01-01", None).await;
    assert_eq!(status, StatusCode::OK);
    for date in [day.as_str(), "2024-01-01"] {
        let (status, marked) = send(
            app.clone(),
            "POST",
            "/api/attendance/mark",
            Some(json!({
                "date": date,
                "subjectId": mechanics["id"],
                "departmentId": physics["id"],
                "attendanceData": [{ "studentId": ada["id"], "status": "Present" }]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{marked}");
    }

    let uri = format!("/api/attendance?date={}", day.replace('+', "%2B"));
    let (status, records) = send(app.clone(), "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK, "{records}");
    assert_eq!(records.as_array().unwrap().len(), 1);
    assert_eq!(records[0]["student"]["rollNumber"], "R-001");

    let (status, all) = send(app, "GET", "/api/attendance", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[rstest]
#[case(Backend::InMemory)]
#[case(Backend::Sqlite)]
#[tokio::test]
async fn deleting_a_marked_student_or_subject_is_refused(#[case] backend: Backend) {
    let app = app(backend);
    let physics = create(&app, "/api/departments", json!({ "name": "Physics" })).await;
    let mechanics = create(
        &app,
        "/api/subjects",
        json!({ "name": "Mechanics", "code": "PHY101", "department": physics["id"] }),
    )
    .await;
    let ada = create(
        &app,
        "/api/students",
        json!({ "name": "Ada", "rollNumber": "R-001", "department": physics["id"] }),
    )
    .await;
    send(
        app.clone(),
        "POST",
        "/api/attendance/mark",
        Some(json!({
            "date": "2024-01-01",
            "subjectId": mechanics["id"],
            "departmentId": physics["id"],
            "attendanceData": [{ "studentId": ada["id"], "status": "Absent" }]
        })),
    )
    .await;

    let (status, refused) = send(
        app.clone(),
        "DELETE",
        &format!("/api/students/{}", id(&ada)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        refused["message"],
        "Student 'R-001' is still referenced by 1 attendance record(s)."
    );

    let (status, refused) = send(
        app.clone(),
        "DELETE",
        &format!("/api/subjects/{}", id(&mechanics)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        refused["message"],
        "Subject 'PHY101' is still referenced by 1 attendance record(s)."
    );

    let (status, refused) = send(
        app.clone(),
        "DELETE",
        &format!("/api/departments/{}", id(&physics)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        refused["message"],
        "Department 'Physics' is still referenced by 1 subject(s), 1 student(s) and 1 \
         attendance record(s)."
    );

    let (_, students) = send(app, "GET", "/api/students", None).await;
    assert_eq!(students.as_array().unwrap().len(), 1);
}
