//! Progress reporting and run summaries for the CLI
//!
//! Everything here writes to stderr; stdout is reserved for records.

use std::path::Path;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use propdedup_core::RunStats;
use propdedup_formats::ReaderStats;

/// Progress bar over the input file
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a byte-based bar, or a spinner when the size is unknown
    pub fn new(total_bytes: Option<u64>) -> Self {
        let bar = match total_bytes {
            Some(total) => {
                let bar = ProgressBar::with_draw_target(Some(total), ProgressDrawTarget::stderr());
                bar.set_style(
                    ProgressStyle::default_bar()
                        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}) {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_bar())
                        .progress_chars("█▓▒░-"),
                );
                bar
            }
            None => {
                let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
                bar.set_style(
                    ProgressStyle::default_spinner()
                        .template("[{elapsed_precise}] {spinner} {bytes} read {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                bar
            }
        };

        Self { bar }
    }

    /// Update the bar with the reader's position and counters
    pub fn update(&self, bytes: u64, stats: &ReaderStats) {
        self.bar.set_position(bytes);
        self.bar.set_message(format!(
            "{} records | {} skipped",
            format_number(stats.records),
            format_number(stats.skipped())
        ));
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Format large numbers compactly
fn format_number(n: usize) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Render a formatted summary report
pub fn summary_report(input: &Path, reader: &ReaderStats, run: &RunStats) -> String {
    let mut lines = Vec::new();
    let rule = "═".repeat(60);

    lines.push(rule.clone());
    lines.push("Property Deduplication Complete".to_string());
    lines.push(rule.clone());
    lines.push(format!("Input:              {}", input.display()));
    lines.push(format!("Mode:               {} ({})", run.mode, run.policy));
    lines.push(format!("Lines read:         {}", format_with_commas(reader.lines_read)));
    lines.push(format!(
        "Lines skipped:      {} ({} field count, {} invalid id)",
        format_with_commas(reader.skipped()),
        format_with_commas(reader.skipped_field_count),
        format_with_commas(reader.skipped_invalid_id)
    ));

    let dedup = &run.dedup;
    let duplicates = dedup.replaced + dedup.dropped_duplicates + dedup.evicted;
    if duplicates > 0 {
        lines.push(format!(
            "Duplicates:         {} ({:.1}%) [{} replaced, {} dropped, {} evicted]",
            format_with_commas(duplicates),
            dedup.dedup_rate(),
            dedup.replaced,
            dedup.dropped_duplicates,
            dedup.evicted
        ));
    }

    let filters = &run.filters;
    if filters.evaluated > 0 {
        lines.push(format!(
            "Filtered:           {} of {} ({:.1}%) [{} value, {} suffix, {} sampled]",
            format_with_commas(filters.rejected()),
            format_with_commas(filters.evaluated),
            filters.filter_rate(),
            filters.rejected_value,
            filters.rejected_suffix,
            filters.rejected_sampling
        ));
    }

    if let Some(pipeline) = &run.pipeline {
        lines.push(format!(
            "Split halves:       {} + {} keys -> {} + {} records",
            pipeline.first_half_keys,
            pipeline.second_half_keys,
            pipeline.first_half_passed,
            pipeline.second_half_passed
        ));
        if pipeline.unprocessed_keys > 0 {
            lines.push(format!(
                "Unprocessed keys:   {} (legacy boundary)",
                pipeline.unprocessed_keys
            ));
        }
    }

    lines.push(format!(
        "Output records:     {}",
        format_with_commas(run.output_records)
    ));
    lines.push(rule);

    lines.join("\n")
}

/// Print the summary report to stderr
pub fn print_summary_report(input: &Path, reader: &ReaderStats, run: &RunStats) {
    eprintln!("\n{}", summary_report(input, reader, run));
}

/// Format number with thousand separators
fn format_with_commas(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
