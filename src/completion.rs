//! Cumulative job-completion curve
//!
//! Sorts the present completion instants and assigns each a cumulative
//! count of 1..n. Ties at identical instants keep their original record
//! order so the curve is deterministic for a fixed input batch.

use crate::record::JobRecord;
use serde::Serialize;

/// One step of the completion curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompletionPoint {
    /// Completion instant, seconds since epoch.
    pub instant: i64,
    pub cumulative: u64,
}

/// Completion curve plus summary statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompletionCurve {
    pub points: Vec<CompletionPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_completion: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_completion: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_elapsed_seconds: Option<i64>,
    /// Completions per second; absent when the curve is empty or spans
    /// zero time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_per_second: Option<f64>,
}

impl CompletionCurve {
    pub fn completed_jobs(&self) -> usize {
        self.points.len()
    }
}

/// Build the curve from the records that carry a completion instant.
pub fn build(records: &[JobRecord]) -> CompletionCurve {
    let mut instants: Vec<i64> = records.iter().filter_map(|r| r.completion).collect();
    // Stable sort keeps input order for identical instants.
    instants.sort();

    let points: Vec<CompletionPoint> = instants
        .iter()
        .enumerate()
        .map(|(i, &instant)| CompletionPoint {
            instant,
            cumulative: (i + 1) as u64,
        })
        .collect();

    let first = points.first().map(|p| p.instant);
    let last = points.last().map(|p| p.instant);
    let elapsed = match (first, last) {
        (Some(f), Some(l)) => Some(l - f),
        _ => None,
    };
    let rate = elapsed.and_then(|e| {
        if e > 0 {
            Some(points.len() as f64 / e as f64)
        } else {
            None
        }
    });

    CompletionCurve {
        points,
        first_completion: first,
        last_completion: last,
        total_elapsed_seconds: elapsed,
        rate_per_second: rate,
    }
}
