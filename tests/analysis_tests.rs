//! End-to-end analysis scenarios against the library API

use condortrace::record::{normalize, normalize_batch, JobRecord, RawJobRecord};
use condortrace::{batch, completion, concurrency, distribution, phases};

fn raw(proc_id: i64) -> RawJobRecord {
    RawJobRecord {
        cluster_id: Some(944143),
        proc_id: Some(proc_id),
        job_status: Some(4),
        exit_code: Some(0),
        ..Default::default()
    }
}

fn spanning_job(proc_id: i64, start: i64, completion: i64) -> JobRecord {
    let mut r = raw(proc_id);
    r.job_start = Some(start);
    r.completion = Some(completion);
    normalize(&r).unwrap()
}

#[test]
fn concurrency_matches_reference_scenario() {
    // Three jobs spanning (0,10), (5,15), (20,25) seconds at 5s resolution.
    let records = vec![
        spanning_job(0, 0, 10),
        spanning_job(1, 5, 15),
        spanning_job(2, 20, 25),
    ];
    let series = concurrency::estimate(&records, 5).unwrap();
    let counts: Vec<u64> = series.samples.iter().map(|s| s.count).collect();
    assert_eq!(counts, vec![1, 2, 1, 0, 1]);
    assert_eq!(series.max, 2);
}

#[test]
fn heavy_tail_sample_is_trimmed() {
    let summary = distribution::analyze(&[10.0, 10.0, 11.0, 9.0, 10.0, 500.0]).unwrap();
    assert!((summary.median - 10.0).abs() < 1e-9);
    assert!((summary.mean - 91.666_666_666_666_67).abs() < 1e-6);
    assert!(summary.mean / summary.median > 5.0);
    assert!(summary.trimmed);
    assert_eq!(summary.excluded_count, 1);
    // Trimmed statistics exclude the 500s straggler.
    assert!((summary.trimmed_mean.unwrap() - 10.0).abs() < 1e-9);
}

#[test]
fn failure_classification_scenarios() {
    let mut completed = raw(0);
    completed.job_status = Some(4);
    completed.exit_code = Some(0);
    assert!(!normalize(&completed).unwrap().failed);

    let mut bad_exit = raw(1);
    bad_exit.job_status = Some(4);
    bad_exit.exit_code = Some(1);
    assert!(normalize(&bad_exit).unwrap().failed);

    let mut removed = raw(2);
    removed.job_status = Some(3);
    removed.exit_code = Some(0);
    assert!(normalize(&removed).unwrap().failed);
}

#[test]
fn failed_job_output_transfer_fallback() {
    let mut r = raw(0);
    r.job_status = Some(3);
    r.output_start = Some(100);
    r.output_end = None;
    r.completion = Some(150);
    let intervals = phases::decompose(&normalize(&r).unwrap());
    assert_eq!(intervals.len(), 1);
    assert_eq!(intervals[0].phase, phases::Phase::OutputTransfer);
    assert_eq!((intervals[0].start, intervals[0].end), (100, 150));
}

#[test]
fn pipeline_is_deterministic() {
    let raws: Vec<RawJobRecord> = (0..50)
        .map(|i| {
            let mut r = raw(i);
            r.job_start = Some(i * 7);
            r.input_start = Some(i * 7);
            r.input_end = Some(i * 7 + 3);
            r.output_start = Some(i * 7 + 40);
            r.output_end = Some(i * 7 + 45);
            r.completion = Some(i * 7 + 50);
            r
        })
        .collect();

    let run = |raws: &[RawJobRecord]| {
        let records = normalize_batch(raws).records;
        (
            batch::summarize(&records, 0),
            concurrency::estimate(&records, 30).unwrap(),
            completion::build(&records),
            phases::timeline(&records),
        )
    };

    // Re-running the pipeline on unchanged input yields identical output.
    assert_eq!(run(&raws), run(&raws));
}

#[test]
fn empty_batch_analyzers_report_empty_not_error() {
    let records: Vec<JobRecord> = Vec::new();
    assert!(concurrency::estimate(&records, 30).unwrap().samples.is_empty());
    assert!(completion::build(&records).points.is_empty());
    assert!(phases::timeline(&records).is_empty());
    assert!(distribution::analyze(&[]).is_none());
    assert_eq!(batch::summarize(&records, 0).success_rate, None);
}
