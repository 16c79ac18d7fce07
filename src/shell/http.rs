use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::attendance::use_cases::attendance_stats::inbound::http as stats_http;
use crate::modules::attendance::use_cases::list_attendance::inbound::http as list_attendance_http;
use crate::modules::attendance::use_cases::mark_attendance::inbound::http as mark_http;
use crate::modules::attendance::use_cases::students_for_marking::inbound::http as roster_http;
use crate::modules::institution::use_cases::manage_departments::inbound::http as departments_http;
use crate::modules::institution::use_cases::manage_students::inbound::http as students_http;
use crate::modules::institution::use_cases::manage_subjects::inbound::http as subjects_http;
use crate::shell::state::AppState;

async fn health() -> &'static str {
    "Attendance Management API is running!"
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/departments",
            get(departments_http::list).post(departments_http::create),
        )
        .route(
            "/departments/{id}",
            get(departments_http::show)
                .patch(departments_http::update)
                .delete(departments_http::remove),
        )
        .route(
            "/subjects",
            get(subjects_http::list).post(subjects_http::create),
        )
        .route(
            "/subjects/{id}",
            get(subjects_http::show)
                .patch(subjects_http::update)
                .delete(subjects_http::remove),
        )
        .route(
            "/students",
            get(students_http::list).post(students_http::create),
        )
        .route(
            "/students/{id}",
            get(students_http::show)
                .patch(students_http::update)
                .delete(students_http::remove),
        )
        .route("/attendance", get(list_attendance_http::handle))
        .route("/attendance/mark", post(mark_http::handle))
        .route(
            "/attendance/students-for-marking",
            get(roster_http::handle),
        )
        .route("/attendance/stats/overall", get(stats_http::overall))
        .route(
            "/attendance/stats/by-department",
            get(stats_http::by_department),
        )
        .route("/attendance/stats/by-subject", get(stats_http::by_subject));

    Router::new()
        .route("/", get(health))
        .nest("/api", api)
        .with_state(state)
}
