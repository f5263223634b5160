//! HTCondor history record model and normalization
//!
//! Raw history records arrive as flat JSON objects whose fields are all
//! optional; absence must stay distinguishable from zero or the history
//! timestamps would silently collapse onto the epoch. Normalization maps
//! each raw record into an immutable [`JobRecord`] with derived durations
//! and a failure classification, skipping (and tallying) records that
//! carry no identity at all.

use serde::{Deserialize, Serialize};

/// HTCondor `JobStatus` value for a completed job.
pub const STATUS_COMPLETED: i64 = 4;

/// Raw per-job record as it appears in a history JSON dump.
///
/// Field names follow the HTCondor ClassAd attributes; every value is
/// optional and unknown attributes are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawJobRecord {
    #[serde(rename = "ClusterId")]
    pub cluster_id: Option<i64>,
    #[serde(rename = "ProcId")]
    pub proc_id: Option<i64>,
    #[serde(rename = "JobStatus")]
    pub job_status: Option<i64>,
    #[serde(rename = "ExitCode")]
    pub exit_code: Option<i64>,
    #[serde(rename = "JobCurrentStartDate")]
    pub job_start: Option<i64>,
    #[serde(rename = "JobCurrentStartTransferInputDate")]
    pub input_start: Option<i64>,
    #[serde(rename = "JobCurrentFinishTransferInputDate")]
    pub input_end: Option<i64>,
    #[serde(rename = "JobCurrentStartTransferOutputDate")]
    pub output_start: Option<i64>,
    #[serde(rename = "JobCurrentFinishTransferOutputDate")]
    pub output_end: Option<i64>,
    #[serde(rename = "JobFinishedHookTime")]
    pub job_end: Option<i64>,
    #[serde(rename = "CompletionDate")]
    pub completion: Option<i64>,
}

/// Unique job identity within one history batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct JobKey {
    pub cluster_id: i64,
    pub proc_id: i64,
}

/// Normalized job record. Immutable once built; the batch of these is the
/// shared read-only input of every analyzer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRecord {
    pub cluster_id: i64,
    pub proc_id: i64,
    pub status: i64,
    pub exit_code: i64,
    /// True unless the job completed (status 4) with exit code 0.
    pub failed: bool,

    // Lifecycle instants, seconds since epoch. Absent means the scheduler
    // never recorded the event.
    pub job_start: Option<i64>,
    pub input_start: Option<i64>,
    pub input_end: Option<i64>,
    pub output_start: Option<i64>,
    pub output_end: Option<i64>,
    pub job_end: Option<i64>,
    pub completion: Option<i64>,

    // Derived durations (seconds). Present iff both endpoints are present;
    // negative values are kept on the record and filtered at the statistics
    // layer instead of aborting the batch.
    pub input_transfer_duration: Option<i64>,
    pub job_duration: Option<i64>,
    pub output_transfer_duration: Option<i64>,
    pub total_duration: Option<i64>,
}

impl JobRecord {
    pub fn key(&self) -> JobKey {
        JobKey {
            cluster_id: self.cluster_id,
            proc_id: self.proc_id,
        }
    }
}

/// Result of normalizing a whole raw batch.
#[derive(Debug, Default)]
pub struct NormalizedBatch {
    pub records: Vec<JobRecord>,
    /// Raw records dropped for missing identity.
    pub skipped: usize,
}

fn duration_between(start: Option<i64>, end: Option<i64>) -> Option<i64> {
    match (start, end) {
        (Some(s), Some(e)) => Some(e - s),
        _ => None,
    }
}

/// Normalize one raw record, or `None` if it lacks both identity fields.
pub fn normalize(raw: &RawJobRecord) -> Option<JobRecord> {
    if raw.cluster_id.is_none() && raw.proc_id.is_none() {
        return None;
    }

    let status = raw.job_status.unwrap_or(0);
    let exit_code = raw.exit_code.unwrap_or(0);
    let failed = status != STATUS_COMPLETED || exit_code != 0;

    Some(JobRecord {
        cluster_id: raw.cluster_id.unwrap_or(0),
        proc_id: raw.proc_id.unwrap_or(0),
        status,
        exit_code,
        failed,
        job_start: raw.job_start,
        input_start: raw.input_start,
        input_end: raw.input_end,
        output_start: raw.output_start,
        output_end: raw.output_end,
        job_end: raw.job_end,
        completion: raw.completion,
        input_transfer_duration: duration_between(raw.input_start, raw.input_end),
        job_duration: duration_between(raw.job_start, raw.job_end),
        output_transfer_duration: duration_between(raw.output_start, raw.output_end),
        total_duration: duration_between(raw.job_start, raw.completion),
    })
}

/// Normalize a raw batch, tallying skipped records. Never fails; a
/// malformed record degrades to a skip, not an abort.
pub fn normalize_batch(raws: &[RawJobRecord]) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();
    for (index, raw) in raws.iter().enumerate() {
        match normalize(raw) {
            Some(record) => batch.records.push(record),
            None => {
                tracing::warn!(index, "skipping record without ClusterId/ProcId");
                batch.skipped += 1;
            }
        }
    }
    batch
}

/// Human-readable scheduler status name.
pub fn status_name(status: i64) -> String {
    match status {
        1 => "Idle".to_string(),
        2 => "Running".to_string(),
        3 => "Removed".to_string(),
        4 => "Completed".to_string(),
        5 => "Held".to_string(),
        6 => "Transferring Output".to_string(),
        7 => "Suspended".to_string(),
        other => format!("Unknown ({})", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(cluster_id: i64, proc_id: i64) -> RawJobRecord {
        RawJobRecord {
            cluster_id: Some(cluster_id),
            proc_id: Some(proc_id),
            ..Default::default()
        }
    }

    #[test]
    fn test_succeeded_only_when_completed_with_zero_exit() {
        let mut r = raw(1, 0);
        r.job_status = Some(4);
        r.exit_code = Some(0);
        assert!(!normalize(&r).unwrap().failed);
    }

    #[test]
    fn test_nonzero_exit_code_fails() {
        let mut r = raw(1, 0);
        r.job_status = Some(4);
        r.exit_code = Some(1);
        assert!(normalize(&r).unwrap().failed);
    }

    #[test]
    fn test_removed_fails_regardless_of_exit_code() {
        let mut r = raw(1, 0);
        r.job_status = Some(3);
        r.exit_code = Some(0);
        assert!(normalize(&r).unwrap().failed);
    }

    #[test]
    fn test_missing_status_and_exit_default_to_failed() {
        let record = normalize(&raw(1, 0)).unwrap();
        assert_eq!(record.status, 0);
        assert_eq!(record.exit_code, 0);
        assert!(record.failed);
    }

    #[test]
    fn test_durations_require_both_endpoints() {
        let mut r = raw(9, 2);
        r.input_start = Some(100);
        let record = normalize(&r).unwrap();
        assert_eq!(record.input_transfer_duration, None);

        r.input_end = Some(160);
        let record = normalize(&r).unwrap();
        assert_eq!(record.input_transfer_duration, Some(60));
    }

    #[test]
    fn test_total_duration_uses_completion_not_hook_time() {
        let mut r = raw(9, 3);
        r.job_start = Some(1000);
        r.job_end = Some(1500);
        r.completion = Some(1700);
        let record = normalize(&r).unwrap();
        assert_eq!(record.job_duration, Some(500));
        assert_eq!(record.total_duration, Some(700));
    }

    #[test]
    fn test_negative_duration_is_kept_on_record() {
        let mut r = raw(9, 4);
        r.output_start = Some(500);
        r.output_end = Some(400);
        let record = normalize(&r).unwrap();
        assert_eq!(record.output_transfer_duration, Some(-100));
    }

    #[test]
    fn test_batch_skips_identityless_records() {
        let raws = vec![raw(1, 0), RawJobRecord::default(), raw(1, 1)];
        let batch = normalize_batch(&raws);
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.skipped, 1);
    }

    #[test]
    fn test_one_identity_half_is_enough() {
        let r = RawJobRecord {
            cluster_id: Some(7),
            ..Default::default()
        };
        let record = normalize(&r).unwrap();
        assert_eq!(record.key(), JobKey { cluster_id: 7, proc_id: 0 });
    }

    #[test]
    fn test_status_names() {
        assert_eq!(status_name(4), "Completed");
        assert_eq!(status_name(6), "Transferring Output");
        assert_eq!(status_name(42), "Unknown (42)");
    }
}
