//! Lifecycle phase decomposition
//!
//! Expands a normalized job record into up to three ordered phase
//! intervals. Execution has no timestamp pair of its own in the history:
//! it is the gap between input-transfer completion and output-transfer
//! start. A failed job that began returning output but never finished gets
//! its output-transfer interval closed at the scheduler's completion
//! timestamp.

use crate::record::{JobKey, JobRecord};
use serde::Serialize;

/// Named sub-interval of a job's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    InputTransfer,
    Execution,
    OutputTransfer,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::InputTransfer => "Input Transfer",
            Phase::Execution => "Execution",
            Phase::OutputTransfer => "Output Transfer",
        }
    }
}

/// One phase occurrence, keyed back to its job. `end >= start` always
/// holds; anomalous intervals are discarded at decomposition time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhaseInterval {
    pub key: JobKey,
    pub phase: Phase,
    pub start: i64,
    pub end: i64,
    pub failed: bool,
}

impl PhaseInterval {
    pub fn duration(&self) -> i64 {
        self.end - self.start
    }
}

fn emit(record: &JobRecord, phase: Phase, start: i64, end: i64, out: &mut Vec<PhaseInterval>) {
    if end < start {
        tracing::debug!(
            cluster_id = record.cluster_id,
            proc_id = record.proc_id,
            ?phase,
            start,
            end,
            "discarding interval with end before start"
        );
        return;
    }
    out.push(PhaseInterval {
        key: record.key(),
        phase,
        start,
        end,
        failed: record.failed,
    });
}

/// Decompose one record into its 0-3 phase intervals, in lifecycle order.
///
/// Each rule applies independently; a record with partial timestamps can
/// legitimately contribute any subset.
pub fn decompose(record: &JobRecord) -> Vec<PhaseInterval> {
    let mut intervals = Vec::with_capacity(3);

    if let (Some(start), Some(end)) = (record.input_start, record.input_end) {
        emit(record, Phase::InputTransfer, start, end, &mut intervals);
    }

    if let (Some(start), Some(end)) = (record.input_end, record.output_start) {
        emit(record, Phase::Execution, start, end, &mut intervals);
    }

    match (record.output_start, record.output_end) {
        (Some(start), Some(end)) => {
            emit(record, Phase::OutputTransfer, start, end, &mut intervals);
        }
        // A failed job that started returning output but never finished:
        // its terminal event is the scheduler's completion timestamp.
        (Some(start), None) if record.failed => {
            if let Some(completion) = record.completion {
                emit(record, Phase::OutputTransfer, start, completion, &mut intervals);
            }
        }
        _ => {}
    }

    intervals
}

/// Decompose a whole batch into a timeline sorted by interval start (then
/// job key), the shape a Gantt-style renderer consumes.
pub fn timeline(records: &[JobRecord]) -> Vec<PhaseInterval> {
    let mut intervals: Vec<PhaseInterval> = records.iter().flat_map(decompose).collect();
    intervals.sort_by_key(|i| (i.start, i.key.cluster_id, i.key.proc_id, i.end));
    intervals
}
