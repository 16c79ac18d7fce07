use std::sync::Arc;

use crate::modules::attendance::use_cases::attendance_stats::handler::AttendanceStatsHandler;
use crate::modules::attendance::use_cases::list_attendance::handler::ListAttendanceHandler;
use crate::modules::attendance::use_cases::mark_attendance::handler::MarkAttendanceHandler;
use crate::modules::attendance::use_cases::students_for_marking::handler::StudentsForMarkingHandler;
use crate::modules::institution::use_cases::manage_departments::handler::DepartmentsHandler;
use crate::modules::institution::use_cases::manage_students::handler::StudentsHandler;
use crate::modules::institution::use_cases::manage_subjects::handler::SubjectsHandler;
use crate::shared::infrastructure::store::SharedStore;

#[derive(Clone)]
pub struct AppState {
    pub departments: Arc<DepartmentsHandler>,
    pub subjects: Arc<SubjectsHandler>,
    pub students: Arc<StudentsHandler>,
    pub mark_attendance: Arc<MarkAttendanceHandler>,
    pub list_attendance: Arc<ListAttendanceHandler>,
    pub students_for_marking: Arc<StudentsForMarkingHandler>,
    pub attendance_stats: Arc<AttendanceStatsHandler>,
}

impl AppState {
    /// Wires every use case handler to the same store.
    pub fn new(store: SharedStore) -> Self {
        Self {
            departments: Arc::new(DepartmentsHandler::new(store.clone())),
            subjects: Arc::new(SubjectsHandler::new(store.clone())),
            students: Arc::new(StudentsHandler::new(store.clone())),
            mark_attendance: Arc::new(MarkAttendanceHandler::new(store.clone())),
            list_attendance: Arc::new(ListAttendanceHandler::new(store.clone())),
            students_for_marking: Arc::new(StudentsForMarkingHandler::new(store.clone())),
            attendance_stats: Arc::new(AttendanceStatsHandler::new(store)),
        }
    }
}
