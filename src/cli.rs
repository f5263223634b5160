//! CLI argument parsing for condortrace

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the analysis report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text report (default)
    Text,
    /// JSON report document for machine parsing
    Json,
    /// Normalized record table as CSV
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "condortrace")]
#[command(version)]
#[command(about = "HTCondor job-history analyzer: phases, concurrency, distributions", long_about = None)]
pub struct Cli {
    /// Path to the HTCondor history JSON file
    pub history: PathBuf,

    /// Time resolution for the concurrency series in seconds
    #[arg(long = "resolution", value_name = "SECONDS", default_value = "30")]
    pub resolution: u64,

    /// Report format printed to stdout
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Save report artifacts (records.csv, report.json, series CSVs) to
    /// the output directory
    #[arg(long = "save")]
    pub save: bool,

    /// Artifact directory (default: analysis_<run id> derived from the
    /// history filename; implies --save)
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Re-normalize from the history JSON even if a saved records.csv
    /// already exists
    #[arg(long = "overwrite-records")]
    pub overwrite_records: bool,

    /// Include the full phase timeline in the report output
    #[arg(long = "timeline")]
    pub timeline: bool,

    /// Enable debug logging to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_history_path() {
        let cli = Cli::parse_from(["condortrace", "history.json"]);
        assert_eq!(cli.history, PathBuf::from("history.json"));
    }

    #[test]
    fn test_cli_resolution_default() {
        let cli = Cli::parse_from(["condortrace", "history.json"]);
        assert_eq!(cli.resolution, 30);
    }

    #[test]
    fn test_cli_resolution_custom() {
        let cli = Cli::parse_from(["condortrace", "history.json", "--resolution", "60"]);
        assert_eq!(cli.resolution, 60);
    }

    #[test]
    fn test_cli_format_default_text() {
        let cli = Cli::parse_from(["condortrace", "history.json"]);
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn test_cli_format_json() {
        let cli = Cli::parse_from(["condortrace", "history.json", "--format", "json"]);
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_cli_save_default_false() {
        let cli = Cli::parse_from(["condortrace", "history.json"]);
        assert!(!cli.save);
        assert!(cli.output_dir.is_none());
    }

    #[test]
    fn test_cli_output_dir() {
        let cli = Cli::parse_from(["condortrace", "history.json", "--output-dir", "out"]);
        assert_eq!(cli.output_dir, Some(PathBuf::from("out")));
    }

    #[test]
    fn test_cli_overwrite_records_flag() {
        let cli = Cli::parse_from(["condortrace", "history.json", "--overwrite-records"]);
        assert!(cli.overwrite_records);
    }

    #[test]
    fn test_cli_timeline_default_false() {
        let cli = Cli::parse_from(["condortrace", "history.json"]);
        assert!(!cli.timeline);
    }
}
