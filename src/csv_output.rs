//! CSV output for normalized records and derived series
//!
//! The record table is the interchange artifact: one row per job, columns
//! exactly the `JobRecord` fields, absent values as empty cells (never a
//! sentinel zero). It round-trips through [`records_from_csv`] so repeat
//! analyzer runs can skip re-parsing the history JSON.

use crate::completion::CompletionCurve;
use crate::concurrency::ConcurrencySeries;
use crate::phases::PhaseInterval;
use crate::record::JobRecord;
use thiserror::Error;

/// Column order of the record table.
const RECORD_HEADER: &str = "cluster_id,proc_id,status,exit_code,failed,\
job_start,input_start,input_end,output_start,output_end,job_end,completion,\
input_transfer_duration,job_duration,output_transfer_duration,total_duration";

const RECORD_COLUMNS: usize = 16;

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("records CSV is empty")]
    Empty,
    #[error("unexpected records CSV header: {0}")]
    BadHeader(String),
    #[error("line {line}: expected {expected} fields, got {actual}")]
    FieldCount {
        line: usize,
        expected: usize,
        actual: usize,
    },
    #[error("line {line}, column {column}: invalid value {value:?}")]
    BadValue {
        line: usize,
        column: &'static str,
        value: String,
    },
}

pub type Result<T> = std::result::Result<T, CsvError>;

/// Escape a CSV field (commas, quotes, newlines).
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn opt_cell(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Render the normalized record table.
pub fn records_to_csv(records: &[JobRecord]) -> String {
    let mut output = String::new();
    output.push_str(RECORD_HEADER);
    output.push('\n');

    for r in records {
        let fields = [
            r.cluster_id.to_string(),
            r.proc_id.to_string(),
            r.status.to_string(),
            r.exit_code.to_string(),
            r.failed.to_string(),
            opt_cell(r.job_start),
            opt_cell(r.input_start),
            opt_cell(r.input_end),
            opt_cell(r.output_start),
            opt_cell(r.output_end),
            opt_cell(r.job_end),
            opt_cell(r.completion),
            opt_cell(r.input_transfer_duration),
            opt_cell(r.job_duration),
            opt_cell(r.output_transfer_duration),
            opt_cell(r.total_duration),
        ];
        output.push_str(&fields.join(","));
        output.push('\n');
    }

    output
}

fn parse_i64(value: &str, line: usize, column: &'static str) -> Result<i64> {
    value.parse().map_err(|_| CsvError::BadValue {
        line,
        column,
        value: value.to_string(),
    })
}

fn parse_opt(value: &str, line: usize, column: &'static str) -> Result<Option<i64>> {
    if value.is_empty() {
        Ok(None)
    } else {
        parse_i64(value, line, column).map(Some)
    }
}

fn parse_bool(value: &str, line: usize, column: &'static str) -> Result<bool> {
    value.parse().map_err(|_| CsvError::BadValue {
        line,
        column,
        value: value.to_string(),
    })
}

/// Parse a record table produced by [`records_to_csv`].
pub fn records_from_csv(text: &str) -> Result<Vec<JobRecord>> {
    let mut lines = text.lines().enumerate();
    let (_, header) = lines.next().ok_or(CsvError::Empty)?;
    if header.trim_end() != RECORD_HEADER {
        return Err(CsvError::BadHeader(header.to_string()));
    }

    let mut records = Vec::new();
    for (index, row) in lines {
        if row.is_empty() {
            continue;
        }
        let line = index + 1;
        let fields: Vec<&str> = row.split(',').collect();
        if fields.len() != RECORD_COLUMNS {
            return Err(CsvError::FieldCount {
                line,
                expected: RECORD_COLUMNS,
                actual: fields.len(),
            });
        }

        records.push(JobRecord {
            cluster_id: parse_i64(fields[0], line, "cluster_id")?,
            proc_id: parse_i64(fields[1], line, "proc_id")?,
            status: parse_i64(fields[2], line, "status")?,
            exit_code: parse_i64(fields[3], line, "exit_code")?,
            failed: parse_bool(fields[4], line, "failed")?,
            job_start: parse_opt(fields[5], line, "job_start")?,
            input_start: parse_opt(fields[6], line, "input_start")?,
            input_end: parse_opt(fields[7], line, "input_end")?,
            output_start: parse_opt(fields[8], line, "output_start")?,
            output_end: parse_opt(fields[9], line, "output_end")?,
            job_end: parse_opt(fields[10], line, "job_end")?,
            completion: parse_opt(fields[11], line, "completion")?,
            input_transfer_duration: parse_opt(fields[12], line, "input_transfer_duration")?,
            job_duration: parse_opt(fields[13], line, "job_duration")?,
            output_transfer_duration: parse_opt(fields[14], line, "output_transfer_duration")?,
            total_duration: parse_opt(fields[15], line, "total_duration")?,
        });
    }

    Ok(records)
}

/// Render the concurrency series as `bin_center,count` rows.
pub fn concurrency_to_csv(series: &ConcurrencySeries) -> String {
    let mut output = String::from("bin_center,count\n");
    for sample in &series.samples {
        output.push_str(&format!("{},{}\n", sample.bin_center, sample.count));
    }
    output
}

/// Render the completion curve as `instant,cumulative` rows.
pub fn completion_to_csv(curve: &CompletionCurve) -> String {
    let mut output = String::from("instant,cumulative\n");
    for point in &curve.points {
        output.push_str(&format!("{},{}\n", point.instant, point.cumulative));
    }
    output
}

/// Render the phase timeline as one row per interval.
pub fn timeline_to_csv(intervals: &[PhaseInterval]) -> String {
    let mut output = String::from("cluster_id,proc_id,phase,start,end,duration,failed\n");
    for interval in intervals {
        output.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            interval.key.cluster_id,
            interval.key.proc_id,
            escape_field(interval.phase.label()),
            interval.start,
            interval.end,
            interval.duration(),
            interval.failed,
        ));
    }
    output
}
