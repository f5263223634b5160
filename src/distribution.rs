//! Duration distribution statistics with heavy-tail trimming
//!
//! Durations of batch-job phases are frequently heavy-tailed: a handful of
//! stragglers can stretch the range by orders of magnitude and flatten any
//! histogram of the bulk. When the mean exceeds five times the median the
//! sample is treated as heavy-tailed and a display trim bound is derived
//! from the 99th percentile and an auto histogram-bin edge
//! (Freedman–Diaconis width, Sturges fallback). Untrimmed statistics are
//! always retained alongside the trimmed ones; callers choose which to
//! show.

use crate::record::JobRecord;
use serde::Serialize;

/// Mean/median ratio above which a sample counts as heavy-tailed.
pub const TRIM_THRESHOLD_RATIO: f64 = 5.0;

/// Percentile used as the primary trim candidate.
pub const TRIM_PERCENTILE: f64 = 99.0;

/// Summary statistics for one duration column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionSummary {
    /// Positive samples that entered the statistics.
    pub sample_count: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    /// Heavy tail detected and a display trim bound derived.
    pub trimmed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trim_upper_bound: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trimmed_mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trimmed_std_dev: Option<f64>,
    /// Samples strictly above the trim bound.
    pub excluded_count: usize,
}

/// Linear-interpolation percentile over ascending data.
pub fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }

    let index = (pct / 100.0) * (sorted.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;

    if lower == upper {
        sorted[lower]
    } else {
        let weight = index - lower as f64;
        sorted[lower] * (1.0 - weight) + sorted[upper] * weight
    }
}

pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Sample standard deviation (N-1 denominator); zero for fewer than two
/// samples.
pub fn std_dev(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    let m = mean(data);
    let variance = data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (data.len() - 1) as f64;
    variance.sqrt()
}

/// Upper edge of an auto-binned histogram over ascending data.
///
/// Freedman–Diaconis width when the IQR is positive, Sturges otherwise.
/// The edge grid starts at the minimum and is extended to the first edge
/// at or above the maximum. Approximate by design: the trim bound built
/// from it is a display heuristic, not a bit-exact contract.
fn auto_bin_upper_edge(sorted: &[f64]) -> f64 {
    let min = sorted[0];
    let max = sorted[sorted.len() - 1];
    if max <= min {
        return max;
    }

    let n = sorted.len() as f64;
    let iqr = percentile(sorted, 75.0) - percentile(sorted, 25.0);
    let width = if iqr > 0.0 {
        2.0 * iqr / n.cbrt()
    } else {
        (max - min) / (n.log2() + 1.0)
    };
    if width <= 0.0 {
        return max;
    }

    let bins = ((max - min) / width).ceil().max(1.0);
    min + width * bins
}

/// Analyze one duration column with the default trim parameters.
pub fn analyze(samples: &[f64]) -> Option<DistributionSummary> {
    analyze_with(samples, TRIM_THRESHOLD_RATIO, TRIM_PERCENTILE)
}

/// Analyze one duration column. Values that are not finite or not strictly
/// positive are anomalies and dropped first; `None` when nothing survives
/// the filter.
///
/// `threshold_ratio` is the mean/median ratio that flags a heavy tail;
/// `trim_percentile` is the percentile capping the trim bound.
pub fn analyze_with(
    samples: &[f64],
    threshold_ratio: f64,
    trim_percentile: f64,
) -> Option<DistributionSummary> {
    let mut data: Vec<f64> = samples
        .iter()
        .copied()
        .filter(|v| v.is_finite() && *v > 0.0)
        .collect();
    if data.is_empty() {
        return None;
    }
    data.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let sample_mean = mean(&data);
    let sample_median = percentile(&data, 50.0);
    let sample_std = std_dev(&data);
    let min = data[0];
    let max = data[data.len() - 1];

    let heavy_tailed = sample_median > 0.0 && sample_mean > threshold_ratio * sample_median;

    let mut summary = DistributionSummary {
        sample_count: data.len(),
        mean: sample_mean,
        median: sample_median,
        std_dev: sample_std,
        min,
        max,
        trimmed: false,
        trim_upper_bound: None,
        trimmed_mean: None,
        trimmed_std_dev: None,
        excluded_count: 0,
    };

    if heavy_tailed {
        let p99 = percentile(&data, trim_percentile);
        let auto_edge = auto_bin_upper_edge(&data);
        let bound = p99.min(auto_edge);

        let kept: Vec<f64> = data.iter().copied().filter(|v| *v <= bound).collect();
        if !kept.is_empty() {
            summary.trimmed = true;
            summary.trim_upper_bound = Some(bound);
            summary.trimmed_mean = Some(mean(&kept));
            summary.trimmed_std_dev = Some(std_dev(&kept));
            summary.excluded_count = data.len() - kept.len();
        }
    }

    Some(summary)
}

/// One duration column of the normalized record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PhaseColumn {
    InputTransfer,
    Execution,
    OutputTransfer,
    Total,
}

impl PhaseColumn {
    pub fn label(&self) -> &'static str {
        match self {
            PhaseColumn::InputTransfer => "Input Transfer Duration",
            PhaseColumn::Execution => "Job Execution Duration",
            PhaseColumn::OutputTransfer => "Output Transfer Duration",
            PhaseColumn::Total => "Total Duration",
        }
    }

    /// Columns backing the per-phase histogram report.
    pub fn phase_columns() -> [PhaseColumn; 3] {
        [
            PhaseColumn::InputTransfer,
            PhaseColumn::Execution,
            PhaseColumn::OutputTransfer,
        ]
    }
}

/// Extract one duration column, absent values omitted.
///
/// The execution column prefers the recorded hook duration; when no record
/// in the batch carries one the column falls back to the gap between input
/// end and output start, the same gap the phase decomposer uses.
pub fn column_samples(records: &[JobRecord], column: PhaseColumn) -> Vec<f64> {
    match column {
        PhaseColumn::InputTransfer => collect(records, |r| r.input_transfer_duration),
        PhaseColumn::OutputTransfer => collect(records, |r| r.output_transfer_duration),
        PhaseColumn::Total => collect(records, |r| r.total_duration),
        PhaseColumn::Execution => {
            if records.iter().any(|r| r.job_duration.is_some()) {
                collect(records, |r| r.job_duration)
            } else {
                collect(records, |r| match (r.input_end, r.output_start) {
                    (Some(s), Some(e)) => Some(e - s),
                    _ => None,
                })
            }
        }
    }
}

fn collect(records: &[JobRecord], f: impl Fn(&JobRecord) -> Option<i64>) -> Vec<f64> {
    records.iter().filter_map(|r| f(r).map(|d| d as f64)).collect()
}
