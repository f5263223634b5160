//! condortrace - HTCondor job-history analysis
//!
//! Ingests a finished batch of HTCondor history records, normalizes each
//! into a typed job record, and derives operational metrics: lifecycle
//! phase intervals, concurrent-job occupancy over time, per-phase duration
//! distributions with heavy-tail trimming, and the cumulative completion
//! curve. The normalized record set is immutable after ingestion and is
//! the sole shared input of every analyzer.

pub mod batch;
pub mod cli;
pub mod completion;
pub mod concurrency;
pub mod csv_output;
pub mod distribution;
pub mod ingest;
pub mod json_output;
pub mod phases;
pub mod record;
