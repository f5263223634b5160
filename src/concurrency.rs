//! Concurrent-job occupancy over time
//!
//! Bins the batch's wall-clock span at a fixed resolution and reports how
//! many jobs were in flight at each bin center. A job occupies the
//! half-open interval `[job_start, completion)`, so a job completing
//! exactly at a bin center is not counted there; that keeps counts
//! consistent at bin boundaries. The count at a center `c` is
//! `#(starts <= c) - #(completions <= c)`, evaluated with two cursors over
//! event-sorted timestamps instead of rescanning every job per bin.

use crate::distribution::{mean, percentile};
use crate::record::JobRecord;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConcurrencyError {
    #[error("concurrency resolution must be positive, got {0}s")]
    InvalidResolution(u64),
}

pub type Result<T> = std::result::Result<T, ConcurrencyError>;

/// Occupancy count at one bin center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConcurrencySample {
    /// Bin center, seconds since epoch.
    pub bin_center: f64,
    pub count: u64,
}

/// Binned occupancy series plus summary statistics over the count column.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConcurrencySeries {
    pub resolution_seconds: u64,
    /// Jobs with both start and completion that entered the series.
    pub job_count: usize,
    pub samples: Vec<ConcurrencySample>,
    pub max: u64,
    pub mean: f64,
    pub median: f64,
}

/// Estimate the occupancy series at the given resolution.
///
/// Only records with both `job_start` and `completion` participate; an
/// empty input yields an empty series, not an error. A zero resolution is
/// a configuration error rejected before any computation.
pub fn estimate(records: &[JobRecord], resolution_seconds: u64) -> Result<ConcurrencySeries> {
    if resolution_seconds == 0 {
        return Err(ConcurrencyError::InvalidResolution(resolution_seconds));
    }

    let mut starts: Vec<i64> = Vec::new();
    let mut ends: Vec<i64> = Vec::new();
    for record in records {
        if let (Some(start), Some(end)) = (record.job_start, record.completion) {
            if end < start {
                tracing::debug!(
                    cluster_id = record.cluster_id,
                    proc_id = record.proc_id,
                    start,
                    end,
                    "ignoring job with completion before start"
                );
                continue;
            }
            starts.push(start);
            ends.push(end);
        }
    }

    let mut series = ConcurrencySeries {
        resolution_seconds,
        job_count: starts.len(),
        ..Default::default()
    };
    if starts.is_empty() {
        return Ok(series);
    }

    starts.sort_unstable();
    ends.sort_unstable();

    let t0 = starts[0];
    let t1 = *ends.last().unwrap_or(&t0);
    let span = (t1 - t0) as u64;
    let bins = span.div_ceil(resolution_seconds);

    let resolution = resolution_seconds as f64;
    let mut next_start = 0usize;
    let mut next_end = 0usize;
    for bin in 0..bins {
        let center = t0 as f64 + (bin as f64 + 0.5) * resolution;
        while next_start < starts.len() && starts[next_start] as f64 <= center {
            next_start += 1;
        }
        while next_end < ends.len() && (ends[next_end] as f64) <= center {
            next_end += 1;
        }
        series.samples.push(ConcurrencySample {
            bin_center: center,
            count: (next_start - next_end) as u64,
        });
    }

    let counts: Vec<f64> = series.samples.iter().map(|s| s.count as f64).collect();
    if !counts.is_empty() {
        series.max = series.samples.iter().map(|s| s.count).max().unwrap_or(0);
        series.mean = mean(&counts);
        let mut sorted = counts;
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        series.median = percentile(&sorted, 50.0);
    }

    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{normalize, RawJobRecord};

    fn job(proc_id: i64, start: i64, completion: i64) -> JobRecord {
        let raw = RawJobRecord {
            cluster_id: Some(1),
            proc_id: Some(proc_id),
            job_start: Some(start),
            completion: Some(completion),
            ..Default::default()
        };
        normalize(&raw).unwrap()
    }

    #[test]
    fn test_zero_resolution_is_rejected() {
        assert!(matches!(
            estimate(&[], 0),
            Err(ConcurrencyError::InvalidResolution(0))
        ));
    }

    #[test]
    fn test_empty_input_yields_empty_series() {
        let series = estimate(&[], 30).unwrap();
        assert_eq!(series.job_count, 0);
        assert!(series.samples.is_empty());
        assert_eq!(series.max, 0);
    }

    #[test]
    fn test_records_without_completion_are_excluded() {
        let raw = RawJobRecord {
            cluster_id: Some(1),
            proc_id: Some(0),
            job_start: Some(100),
            ..Default::default()
        };
        let series = estimate(&[normalize(&raw).unwrap()], 30).unwrap();
        assert_eq!(series.job_count, 0);
    }

    #[test]
    fn test_three_job_scenario() {
        // Jobs spanning (0,10), (5,15), (20,25) at 5s resolution: one bin
        // per window [0,5), [5,10), [10,15), [15,20), [20,25) with counts
        // 1, 2, 1, 0, 1.
        let records = vec![job(0, 0, 10), job(1, 5, 15), job(2, 20, 25)];
        let series = estimate(&records, 5).unwrap();

        let counts: Vec<u64> = series.samples.iter().map(|s| s.count).collect();
        assert_eq!(counts, vec![1, 2, 1, 0, 1]);

        let centers: Vec<f64> = series.samples.iter().map(|s| s.bin_center).collect();
        assert_eq!(centers, vec![2.5, 7.5, 12.5, 17.5, 22.5]);

        assert_eq!(series.max, 2);
        assert!((series.mean - 1.0).abs() < 1e-9);
        assert!((series.median - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_completion_at_center_is_not_counted() {
        // Half-open rule: the job over [0, 15) does not occupy center 15.
        let records = vec![job(0, 0, 15), job(1, 0, 40)];
        let series = estimate(&records, 30).unwrap();
        assert_eq!(series.samples.len(), 2);
        assert!((series.samples[0].bin_center - 15.0).abs() < 1e-9);
        assert_eq!(series.samples[0].count, 1);
        assert_eq!(series.samples[1].count, 0);
    }

    #[test]
    fn test_half_open_containment() {
        // Center of the single bin is exactly the first job's completion.
        let records = vec![job(0, 0, 5), job(1, 0, 10)];
        let series = estimate(&records, 10).unwrap();
        assert_eq!(series.samples.len(), 1);
        assert!((series.samples[0].bin_center - 5.0).abs() < 1e-9);
        assert_eq!(series.samples[0].count, 1);
    }

    #[test]
    fn test_anomalous_pair_is_ignored() {
        let records = vec![job(0, 100, 50), job(1, 0, 10)];
        let series = estimate(&records, 5).unwrap();
        assert_eq!(series.job_count, 1);
        assert!(series.samples.iter().all(|s| s.count <= 1));
    }

    #[test]
    fn test_zero_span_yields_no_bins() {
        let records = vec![job(0, 100, 100)];
        let series = estimate(&records, 30).unwrap();
        assert_eq!(series.job_count, 1);
        assert!(series.samples.is_empty());
    }
}
