// Dashboard aggregates over attendance records.
//
// Purpose
// - Count present and absent marks overall, per department and per subject.
//
// Responsibilities
// - Overall totals are counted by the store. The grouped reports fetch the
//   matching records, group them by key, then attach names from the
//   institution tables. Groups whose department or subject no longer exists
//   are dropped.
// - Never fail on an empty store.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::modules::attendance::core::record::{AttendanceRecord, AttendanceStatus};
use crate::shared::core::errors::ApplicationError;
use crate::shared::core::primitives::{EntityId, non_blank, parse_entity_id};
use crate::shared::infrastructure::store::{AttendanceFilter, SharedStore};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OverallStats {
    #[serde(rename = "Present")]
    pub present: u64,
    #[serde(rename = "Absent")]
    pub absent: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentStats {
    pub department_id: EntityId,
    pub department_name: String,
    pub present_count: u64,
    pub absent_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectStats {
    pub subject_id: EntityId,
    pub subject_name: String,
    pub subject_code: String,
    pub department_name: Option<String>,
    pub present_count: u64,
    pub absent_count: u64,
}

#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    present: u64,
    absent: u64,
}

impl Tally {
    fn add(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Present => self.present += 1,
            AttendanceStatus::Absent => self.absent += 1,
        }
    }
}

fn tally_by(
    records: &[AttendanceRecord],
    key: impl Fn(&AttendanceRecord) -> EntityId,
) -> BTreeMap<EntityId, Tally> {
    let mut groups: BTreeMap<EntityId, Tally> = BTreeMap::new();
    for record in records {
        groups.entry(key(record)).or_default().add(record.status);
    }
    groups
}

pub struct AttendanceStatsHandler {
    store: SharedStore,
}

impl AttendanceStatsHandler {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn overall(&self) -> Result<OverallStats, ApplicationError> {
        let with_status = |status| AttendanceFilter {
            status: Some(status),
            ..AttendanceFilter::default()
        };
        Ok(OverallStats {
            present: self
                .store
                .count_attendance(&with_status(AttendanceStatus::Present))
                .await?,
            absent: self
                .store
                .count_attendance(&with_status(AttendanceStatus::Absent))
                .await?,
        })
    }

    /// Sorted by department name.
    pub async fn by_department(&self) -> Result<Vec<DepartmentStats>, ApplicationError> {
        let records = self.store.list_attendance(&AttendanceFilter::default()).await?;
        let groups = tally_by(&records, |record| record.department_id);
        let names: HashMap<EntityId, String> = self
            .store
            .list_departments()
            .await?
            .into_iter()
            .map(|department| (department.id, department.name))
            .collect();

        let mut stats: Vec<DepartmentStats> = groups
            .into_iter()
            .filter_map(|(department_id, tally)| {
                let department_name = names.get(&department_id)?.clone();
                Some(DepartmentStats {
                    department_id,
                    department_name,
                    present_count: tally.present,
                    absent_count: tally.absent,
                })
            })
            .collect();
        stats.sort_by(|a, b| {
            a.department_name
                .cmp(&b.department_name)
                .then(a.department_id.cmp(&b.department_id))
        });
        Ok(stats)
    }

    /// Sorted by department name, then subject name; subjects whose
    /// department is gone come first.
    pub async fn by_subject(
        &self,
        department_id: Option<&str>,
    ) -> Result<Vec<SubjectStats>, ApplicationError> {
        let department_id = match non_blank(department_id) {
            Some(raw) => Some(parse_entity_id(&raw).ok_or_else(|| {
                ApplicationError::Validation("Invalid departmentId format.".into())
            })?),
            None => None,
        };
        let records = self
            .store
            .list_attendance(&AttendanceFilter {
                department_id,
                ..AttendanceFilter::default()
            })
            .await?;
        let groups = tally_by(&records, |record| record.subject_id);
        let subjects: HashMap<_, _> = self
            .store
            .list_subjects(None)
            .await?
            .into_iter()
            .map(|subject| (subject.id, subject))
            .collect();
        let department_names: HashMap<EntityId, String> = self
            .store
            .list_departments()
            .await?
            .into_iter()
            .map(|department| (department.id, department.name))
            .collect();

        let mut stats: Vec<SubjectStats> = groups
            .into_iter()
            .filter_map(|(subject_id, tally)| {
                let subject = subjects.get(&subject_id)?;
                Some(SubjectStats {
                    subject_id,
                    subject_name: subject.name.clone(),
                    subject_code: subject.code.clone(),
                    department_name: department_names.get(&subject.department_id).cloned(),
                    present_count: tally.present,
                    absent_count: tally.absent,
                })
            })
            .collect();
        stats.sort_by(|a, b| {
            (&a.department_name, &a.subject_name, a.subject_id).cmp(&(
                &b.department_name,
                &b.subject_name,
                b.subject_id,
            ))
        });
        Ok(stats)
    }
}
