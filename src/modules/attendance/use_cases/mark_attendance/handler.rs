use serde::Serialize;

use crate::modules::attendance::use_cases::mark_attendance::command::MarkAttendance;
use crate::modules::attendance::use_cases::mark_attendance::decide::decide_mark;
use crate::modules::attendance::use_cases::mark_attendance::decision::Decision;
use crate::shared::core::errors::ApplicationError;
use crate::shared::core::primitives::now;
use crate::shared::infrastructure::store::{SharedStore, UpsertOutcome};

/// Write counts of one marking sheet. `inserted_count` stays 0 because every
/// write is an upsert; new records are counted in `upserted_count`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkSummary {
    pub message: &'static str,
    pub inserted_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub matched_count: u64,
}

impl MarkSummary {
    fn record(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.upserted_count += 1,
            UpsertOutcome::Modified => {
                self.matched_count += 1;
                self.modified_count += 1;
            }
            UpsertOutcome::Unchanged => self.matched_count += 1,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum MarkOutcome {
    Marked(MarkSummary),
    NothingToProcess(MarkSummary),
}

pub struct MarkAttendanceHandler {
    store: SharedStore,
}

impl MarkAttendanceHandler {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Upserts every valid entry one by one. A store failure stops the batch;
    /// records written before it stay written.
    pub async fn handle(&self, command: MarkAttendance) -> Result<MarkOutcome, ApplicationError> {
        match decide_mark(command, now()) {
            Decision::Accepted { records, dropped } => {
                for entry in &dropped {
                    tracing::warn!(
                        index = entry.index,
                        reason = entry.reason,
                        "skipping invalid attendance entry"
                    );
                }
                let mut summary = MarkSummary {
                    message: "Attendance marked successfully.",
                    ..MarkSummary::default()
                };
                for record in &records {
                    let outcome = self.store.upsert_attendance(record).await?;
                    summary.record(outcome);
                }
                tracing::info!(
                    upserted = summary.upserted_count,
                    matched = summary.matched_count,
                    modified = summary.modified_count,
                    skipped = dropped.len(),
                    "attendance marked"
                );
                Ok(MarkOutcome::Marked(summary))
            }
            Decision::NothingToMark => Ok(MarkOutcome::NothingToProcess(MarkSummary {
                message: "No attendance data to process.",
                ..MarkSummary::default()
            })),
            Decision::Rejected { reason } => Err(ApplicationError::Validation(reason.to_string())),
        }
    }
}
