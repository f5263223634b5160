//! Batch-level summary statistics
//!
//! Totals for the normalized record set: failure counts, completion
//! coverage, and a status breakdown of the jobs that never reported a
//! completion timestamp.

use crate::record::{status_name, JobRecord};
use serde::Serialize;
use std::collections::BTreeMap;

/// Count of incomplete jobs sharing one scheduler status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBreakdown {
    pub status: i64,
    pub name: String,
    pub count: usize,
}

/// Whole-batch summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total_jobs: usize,
    /// Raw records dropped during normalization.
    pub skipped_records: usize,
    pub failed_jobs: usize,
    /// Fraction of jobs that succeeded; absent for an empty batch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_rate: Option<f64>,
    pub with_completion: usize,
    pub without_completion: usize,
    /// Incomplete jobs grouped by status, ascending by status code.
    pub incomplete_by_status: Vec<StatusBreakdown>,
}

/// Summarize the normalized batch.
pub fn summarize(records: &[JobRecord], skipped_records: usize) -> BatchSummary {
    let total_jobs = records.len();
    let failed_jobs = records.iter().filter(|r| r.failed).count();
    let with_completion = records.iter().filter(|r| r.completion.is_some()).count();

    let mut by_status: BTreeMap<i64, usize> = BTreeMap::new();
    for record in records.iter().filter(|r| r.completion.is_none()) {
        *by_status.entry(record.status).or_insert(0) += 1;
    }
    let incomplete_by_status = by_status
        .into_iter()
        .map(|(status, count)| StatusBreakdown {
            status,
            name: status_name(status),
            count,
        })
        .collect();

    BatchSummary {
        total_jobs,
        skipped_records,
        failed_jobs,
        success_rate: if total_jobs > 0 {
            Some((total_jobs - failed_jobs) as f64 / total_jobs as f64)
        } else {
            None
        },
        with_completion,
        without_completion: total_jobs - with_completion,
        incomplete_by_status,
    }
}
