use anyhow::{bail, Context, Result};
use clap::Parser;
use condortrace::cli::{Cli, OutputFormat};
use condortrace::json_output::{JsonPhaseDistribution, JsonReport};
use condortrace::{batch, completion, concurrency, csv_output, distribution, ingest, phases, record};
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Load the normalized record set: reuse a saved records.csv when present,
/// otherwise parse the history JSON and normalize it.
fn load_records(cli: &Cli, records_path: &Path, reuse: bool) -> Result<(Vec<record::JobRecord>, usize)> {
    if reuse && records_path.exists() && !cli.overwrite_records {
        eprintln!(
            "Reusing existing records table: {} (use --overwrite-records to regenerate)",
            records_path.display()
        );
        let text = fs::read_to_string(records_path)
            .with_context(|| format!("failed to read {}", records_path.display()))?;
        let records = csv_output::records_from_csv(&text)
            .with_context(|| format!("failed to parse {}", records_path.display()))?;
        return Ok((records, 0));
    }

    let raws = ingest::load_history(&cli.history)?;
    let normalized = record::normalize_batch(&raws);
    if normalized.skipped > 0 {
        eprintln!(
            "Skipped {} record(s) without ClusterId/ProcId",
            normalized.skipped
        );
    }
    Ok((normalized.records, normalized.skipped))
}

fn print_batch_summary(summary: &batch::BatchSummary) {
    println!("{}", "=".repeat(60));
    println!("Job Statistics");
    println!("{}", "=".repeat(60));
    println!("Total jobs: {}", summary.total_jobs);
    if summary.skipped_records > 0 {
        println!("Skipped records: {}", summary.skipped_records);
    }
    println!("Failed jobs: {}", summary.failed_jobs);
    if let Some(rate) = summary.success_rate {
        println!("Success rate: {:.1}%", rate * 100.0);
    }
    println!();
    println!("Jobs with CompletionDate: {}", summary.with_completion);
    println!("Jobs without CompletionDate: {}", summary.without_completion);
    if !summary.incomplete_by_status.is_empty() {
        println!("\nJobs without CompletionDate by JobStatus:");
        for entry in &summary.incomplete_by_status {
            println!(
                "  Status {} ({}): {}",
                entry.status, entry.name, entry.count
            );
        }
    }
    println!();
}

fn print_distribution(label: &str, summary: Option<&distribution::DistributionSummary>) {
    println!("{}:", label);
    let Some(s) = summary else {
        println!("  No valid data");
        println!();
        return;
    };
    println!(
        "  Mean: {:.1}s \u{00b1} {:.1}s",
        s.mean, s.std_dev
    );
    println!("  Median: {:.1}s", s.median);
    println!("  Min: {:.1}s  Max: {:.1}s", s.min, s.max);
    println!("  Valid samples: {}", s.sample_count);
    if s.trimmed {
        let bound = s.trim_upper_bound.unwrap_or(s.max);
        let pct = 100.0 * s.excluded_count as f64 / s.sample_count as f64;
        println!(
            "  Heavy tail detected (mean/median ratio: {:.1}x)",
            s.mean / s.median
        );
        println!(
            "  Trimmed mean: {:.1}s \u{00b1} {:.1}s (excludes {} jobs [{:.1}%] > {:.1}s)",
            s.trimmed_mean.unwrap_or(s.mean),
            s.trimmed_std_dev.unwrap_or(s.std_dev),
            s.excluded_count,
            pct,
            bound
        );
    }
    println!();
}

fn print_concurrency(series: &concurrency::ConcurrencySeries) {
    println!(
        "Concurrency (resolution: {}s, {} jobs with timing data):",
        series.resolution_seconds, series.job_count
    );
    if series.samples.is_empty() {
        println!("  No data to analyze");
    } else {
        println!("  Maximum concurrent jobs: {}", series.max);
        println!("  Mean concurrent jobs: {:.1}", series.mean);
        println!("  Median concurrent jobs: {:.1}", series.median);
    }
    println!();
}

fn print_completion(curve: &completion::CompletionCurve) {
    println!("Completion curve ({} completed jobs):", curve.completed_jobs());
    match (curve.first_completion, curve.last_completion) {
        (Some(first), Some(last)) => {
            println!("  First completion: {}", first);
            println!("  Last completion:  {}", last);
            let elapsed = curve.total_elapsed_seconds.unwrap_or(0);
            println!(
                "  Total duration:   {}s ({:.1} minutes)",
                elapsed,
                elapsed as f64 / 60.0
            );
            match curve.rate_per_second {
                Some(rate) => println!("  Completion rate:  {:.1} jobs/minute", rate * 60.0),
                None => println!("  Completion rate:  undefined (zero elapsed time)"),
            }
        }
        _ => println!("  No data to analyze"),
    }
    println!();
}

fn print_text_report(
    summary: &batch::BatchSummary,
    distributions: &[JsonPhaseDistribution],
    total: Option<&distribution::DistributionSummary>,
    series: &concurrency::ConcurrencySeries,
    curve: &completion::CompletionCurve,
) {
    print_batch_summary(summary);

    println!("{}", "=".repeat(60));
    println!("Phase Duration Distributions (seconds)");
    println!("{}", "=".repeat(60));
    for dist in distributions {
        print_distribution(&dist.phase, dist.summary.as_ref());
    }
    print_distribution(
        distribution::PhaseColumn::Total.label(),
        total,
    );

    println!("{}", "=".repeat(60));
    println!("Timeline Metrics");
    println!("{}", "=".repeat(60));
    print_concurrency(series);
    print_completion(curve);
}

fn write_artifacts(
    dir: &Path,
    records: &[record::JobRecord],
    records_path: &Path,
    write_records: bool,
    report: &JsonReport,
    timeline: &[phases::PhaseInterval],
) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    if write_records {
        fs::write(records_path, csv_output::records_to_csv(records))
            .with_context(|| format!("failed to write {}", records_path.display()))?;
        eprintln!("Saved {}", records_path.display());
    }

    let report_path = dir.join("report.json");
    fs::write(&report_path, report.render()?)
        .with_context(|| format!("failed to write {}", report_path.display()))?;
    eprintln!("Saved {}", report_path.display());

    let concurrency_path = dir.join("concurrent_jobs.csv");
    fs::write(&concurrency_path, csv_output::concurrency_to_csv(&report.concurrency))
        .with_context(|| format!("failed to write {}", concurrency_path.display()))?;
    eprintln!("Saved {}", concurrency_path.display());

    let completion_path = dir.join("completion_curve.csv");
    fs::write(&completion_path, csv_output::completion_to_csv(&report.completion))
        .with_context(|| format!("failed to write {}", completion_path.display()))?;
    eprintln!("Saved {}", completion_path.display());

    let timeline_path = dir.join("phase_timeline.csv");
    fs::write(&timeline_path, csv_output::timeline_to_csv(timeline))
        .with_context(|| format!("failed to write {}", timeline_path.display()))?;
    eprintln!("Saved {}", timeline_path.display());

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    // Configuration errors fail before any computation.
    if cli.resolution == 0 {
        bail!("--resolution must be positive, got 0");
    }

    let save = cli.save || cli.output_dir.is_some();
    let output_dir = cli
        .output_dir
        .clone()
        .unwrap_or_else(|| ingest::default_output_dir(&cli.history));
    let records_path = output_dir.join("records.csv");

    let reuse = save && !cli.overwrite_records && records_path.exists();
    if !reuse && !cli.history.exists() {
        bail!("history file not found: {}", cli.history.display());
    }

    let (records, skipped) = load_records(&cli, &records_path, reuse)?;
    if records.is_empty() {
        bail!("no job data found in {}", cli.history.display());
    }

    let summary = batch::summarize(&records, skipped);
    let series = concurrency::estimate(&records, cli.resolution)?;
    let curve = completion::build(&records);
    let timeline = phases::timeline(&records);
    let distributions: Vec<JsonPhaseDistribution> = distribution::PhaseColumn::phase_columns()
        .iter()
        .map(|column| JsonPhaseDistribution {
            phase: column.label().to_string(),
            summary: distribution::analyze(&distribution::column_samples(&records, *column)),
        })
        .collect();
    let total = distribution::analyze(&distribution::column_samples(
        &records,
        distribution::PhaseColumn::Total,
    ));

    let report = JsonReport::new(
        summary.clone(),
        series.clone(),
        distributions.clone(),
        curve.clone(),
        cli.timeline.then(|| timeline.clone()),
    );

    match cli.format {
        OutputFormat::Text => {
            print_text_report(&summary, &distributions, total.as_ref(), &series, &curve)
        }
        OutputFormat::Json => println!("{}", report.render()?),
        OutputFormat::Csv => print!("{}", csv_output::records_to_csv(&records)),
    }

    if save {
        write_artifacts(
            &output_dir,
            &records,
            &records_path,
            !reuse,
            &report,
            &timeline,
        )?;
    }

    Ok(())
}
