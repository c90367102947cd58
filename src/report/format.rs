//! Formatted terminal output for a finished run.
//!
//! We keep formatting code in one place so the aggregation code stays free of
//! presentation concerns.

use crate::domain::{ConsolidatedDataset, PipelineConfig};
use crate::io::ingest::SnapshotSet;

/// Format the run summary: inputs, date range and latest figures per region.
pub fn format_run_summary(dataset: &ConsolidatedDataset, snapshots: &SnapshotSet, config: &PipelineConfig) -> String {
    let mut out = String::new();

    out.push_str("=== cases - daily region series ===\n");
    out.push_str(&format!("Country: {}\n", config.country));
    out.push_str(&format!("Reports: {} ({})\n", snapshots.len(), config.reports_dir.display()));

    let rows_read: usize = snapshots.values().map(|s| s.rows_read).sum();
    let row_errors: usize = snapshots.values().map(|s| s.row_errors.len()).sum();
    out.push_str(&format!("Rows: read={rows_read} skipped={row_errors}\n"));

    match (dataset.first_date(), dataset.last_date()) {
        (Some(first), Some(last)) => out.push_str(&format!(
            "Dates: {first} .. {last} (n={})\n",
            dataset.dates.len()
        )),
        _ => out.push_str("Dates: none\n"),
    }

    out.push('\n');
    out.push_str(&format_latest_table(dataset));
    out.push_str(&format!("\nOutput: {}\n", config.output.display()));

    out
}

/// One line per region (dataset order) with its latest total and new cases.
pub fn format_latest_table(dataset: &ConsolidatedDataset) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<28} {:>10} {:>8} {:>10} {:>8} {:>8} {:>8}",
            "region", "confirmed", "deaths", "recovered", "+conf", "+deaths", "+recov"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<28} {:-<10} {:-<8} {:-<10} {:-<8} {:-<8} {:-<8}",
            "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for region in &dataset.regions {
        let Some(latest) = region.series.last() else {
            continue;
        };
        let (total, new) = (latest.total_cases, latest.new_cases);
        out.push_str(
            format!(
                "{:<28} {:>10} {:>8} {:>10} {:>8} {:>8} {:>8}",
                truncate(&region.name, 28),
                total.confirmed,
                total.deaths,
                total.recovered,
                fmt_delta(new.confirmed),
                fmt_delta(new.deaths),
                fmt_delta(new.recovered),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

fn fmt_delta(v: i64) -> String {
    if v > 0 { format!("+{v}") } else { v.to_string() }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
