//! JSON report document
//!
//! One machine-readable document per analysis run: batch summary,
//! concurrency series, per-phase distribution summaries, completion curve,
//! and optionally the full phase timeline.

use crate::batch::BatchSummary;
use crate::completion::CompletionCurve;
use crate::concurrency::ConcurrencySeries;
use crate::distribution::DistributionSummary;
use crate::phases::PhaseInterval;
use serde::Serialize;

/// Distribution summary for one phase duration column.
#[derive(Debug, Clone, Serialize)]
pub struct JsonPhaseDistribution {
    pub phase: String,
    /// Absent when the column had no positive samples.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<DistributionSummary>,
}

/// Root JSON report structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport {
    /// Format version identifier
    pub version: String,
    /// Format name
    pub format: String,
    pub summary: BatchSummary,
    pub concurrency: ConcurrencySeries,
    pub distributions: Vec<JsonPhaseDistribution>,
    pub completion: CompletionCurve,
    /// Full phase timeline, included on request (it is one row per
    /// interval and dominates the document size for large batches).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline: Option<Vec<PhaseInterval>>,
}

impl JsonReport {
    pub fn new(
        summary: BatchSummary,
        concurrency: ConcurrencySeries,
        distributions: Vec<JsonPhaseDistribution>,
        completion: CompletionCurve,
        timeline: Option<Vec<PhaseInterval>>,
    ) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "condortrace-report-v1".to_string(),
            summary,
            concurrency,
            distributions,
            completion,
            timeline,
        }
    }

    /// Render as pretty-printed JSON.
    pub fn render(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
