//! Output CSV writing and human-readable reporting.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::address::{OUTPUT_HEADER, ResultPair};
use crate::cli::VerbosityLevel;
use crate::error::Result;

/// Aggregate figures for one batch run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub files: usize,
    pub rows: usize,
    pub valid: usize,
    pub invalid: usize,
    pub cache_hits: usize,
    pub api_calls: usize,
    pub api_failures: usize,
    pub rate_limit_waits: u32,
    pub duration: Duration,
}

/// Ordered results of a batch run plus its summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResults {
    pub results: Vec<ResultPair>,
    pub summary: BatchSummary,
}

impl BatchResults {
    pub fn into_pairs(self) -> Vec<ResultPair> {
        self.results
    }
}

/// Write results to `path` as CSV, creating parent directories as needed
pub fn write_results_csv(path: &Path, results: &[ResultPair]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(OUTPUT_HEADER)?;
    for pair in results {
        writer.write_record([pair.input.as_str(), pair.output.as_str()])?;
    }
    writer.flush()?;

    Ok(())
}

/// Simple output formatter for human-readable results
pub struct Output {
    verbosity: VerbosityLevel,
    show_colors: bool,
}

impl Output {
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self {
            verbosity,
            show_colors: atty::is(atty::Stream::Stderr),
        }
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.show_colors {
            format!("\x1b[{}m{}\x1b[0m", color, text)
        } else {
            text.to_string()
        }
    }

    /// `"{input} -> {output}"`
    pub fn format_pair(&self, pair: &ResultPair) -> String {
        pair.to_string()
    }

    /// Print one line per result to stdout unless quiet
    pub fn report(&self, results: &[ResultPair]) {
        if self.verbosity == VerbosityLevel::Quiet {
            return;
        }
        for pair in results {
            println!("{}", self.format_pair(pair));
        }
    }

    pub fn format_summary(&self, summary: &BatchSummary) -> String {
        let mut output = String::new();
        output.push_str("Validation Summary:\n");
        output.push_str(&format!("  Files: {}\n", summary.files));
        output.push_str(&format!("  Rows: {}\n", summary.rows));
        output.push_str(&format!(
            "  {} {}\n",
            self.colorize("Valid:", "32"),
            summary.valid
        ));
        if summary.invalid > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("Invalid:", "31"),
                summary.invalid
            ));
        }
        if summary.api_failures > 0 {
            output.push_str(&format!(
                "  {} {}\n",
                self.colorize("API failures:", "33"),
                summary.api_failures
            ));
        }

        if self.verbosity >= VerbosityLevel::Verbose {
            output.push_str(&format!("  Cache hits: {}\n", summary.cache_hits));
            output.push_str(&format!("  API calls: {}\n", summary.api_calls));
            output.push_str(&format!(
                "  Rate limit waits: {}\n",
                summary.rate_limit_waits
            ));
        }

        output.push_str(&format!("  Duration: {}\n", format_duration(summary.duration)));
        output
    }
}

fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs_f64();
    if total_secs < 1.0 {
        format!("{:.0}ms", duration.as_millis())
    } else if total_secs < 60.0 {
        format!("{:.2}s", total_secs)
    } else {
        let mins = (total_secs / 60.0) as u64;
        let secs = total_secs % 60.0;
        format!("{}m{:.1}s", mins, secs)
    }
}
