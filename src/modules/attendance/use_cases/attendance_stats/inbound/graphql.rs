use async_graphql::{Context, ID, Object, Result as GqlResult};

use crate::modules::attendance::use_cases::attendance_stats::handler::{
    DepartmentStats, OverallStats, SubjectStats,
};
use crate::shell::state::AppState;

#[derive(async_graphql::SimpleObject, Clone)]
pub struct GqlOverallAttendance {
    pub present: i64,
    pub absent: i64,
}

impl From<OverallStats> for GqlOverallAttendance {
    fn from(s: OverallStats) -> Self {
        Self {
            present: s.present as i64,
            absent: s.absent as i64,
        }
    }
}

#[derive(async_graphql::SimpleObject, Clone)]
pub struct GqlDepartmentAttendance {
    pub department_id: ID,
    pub department_name: String,
    pub present_count: i64,
    pub absent_count: i64,
}

impl From<DepartmentStats> for GqlDepartmentAttendance {
    fn from(s: DepartmentStats) -> Self {
        Self {
            department_id: ID(s.department_id.to_string()),
            department_name: s.department_name,
            present_count: s.present_count as i64,
            absent_count: s.absent_count as i64,
        }
    }
}

#[derive(async_graphql::SimpleObject, Clone)]
pub struct GqlSubjectAttendance {
    pub subject_id: ID,
    pub subject_name: String,
    pub subject_code: String,
    pub department_name: Option<String>,
    pub present_count: i64,
    pub absent_count: i64,
}

impl From<SubjectStats> for GqlSubjectAttendance {
    fn from(s: SubjectStats) -> Self {
        Self {
            subject_id: ID(s.subject_id.to_string()),
            subject_name: s.subject_name,
            subject_code: s.subject_code,
            department_name: s.department_name,
            present_count: s.present_count as i64,
            absent_count: s.absent_count as i64,
        }
    }
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn overall_attendance(&self, context: &Context<'_>) -> GqlResult<GqlOverallAttendance> {
        let state = context.data_unchecked::<AppState>();
        Ok(state.attendance_stats.overall().await?.into())
    }

    async fn attendance_by_department(
        &self,
        context: &Context<'_>,
    ) -> GqlResult<Vec<GqlDepartmentAttendance>> {
        let state = context.data_unchecked::<AppState>();
        let stats = state.attendance_stats.by_department().await?;
        Ok(stats.into_iter().map(Into::into).collect())
    }

    async fn attendance_by_subject(
        &self,
        context: &Context<'_>,
        department_id: Option<ID>,
    ) -> GqlResult<Vec<GqlSubjectAttendance>> {
        let state = context.data_unchecked::<AppState>();
        let stats = state
            .attendance_stats
            .by_subject(department_id.as_ref().map(|id| id.as_str()))
            .await?;
        Ok(stats.into_iter().map(Into::into).collect())
    }
}
