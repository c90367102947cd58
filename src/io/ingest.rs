//! Daily snapshot decoding.
//!
//! This module is responsible for turning a folder of daily report CSVs (one
//! file per day, named `MM-DD-YYYY.csv`) into per-date target-country
//! observations that the aggregation core can consume.
//!
//! Design goals:
//! - **Tolerant columns**: headers are resolved through alias lists (`fields`)
//! - **Strict dates**: a file whose name is not a report date stops the run
//! - **Row-level leniency**: malformed rows are skipped and counted, not fatal
//! - **Separation of concerns**: no delta/aggregation logic here

use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::domain::{Cases, RawRegionObservation, region_key};
use crate::error::AppError;
use crate::io::fields::{FieldResolver, HeaderMap, aliases};

/// File stem pattern of the upstream daily reports.
pub const REPORT_DATE_FORMAT: &str = "%m-%d-%Y";

/// A row-level problem encountered while decoding a snapshot.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Target-country rows of one daily report.
#[derive(Debug, Clone)]
pub struct DailySnapshot {
    pub date: NaiveDate,
    pub source: Option<PathBuf>,
    /// Observations in file row order, at most one per region key.
    pub observations: Vec<RawRegionObservation>,
    pub rows_read: usize,
    pub row_errors: Vec<RowError>,
}

/// All snapshots of a run, keyed (and therefore ordered) by report date.
pub type SnapshotSet = BTreeMap<NaiveDate, DailySnapshot>;

/// Derive the report date from a file name such as `01-22-2020.csv`.
pub fn report_date_from_path(path: &Path) -> Result<NaiveDate, AppError> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| AppError::new(2, format!("Report file '{}' has no usable name.", path.display())))?;

    NaiveDate::parse_from_str(stem.trim(), REPORT_DATE_FORMAT).map_err(|e| {
        AppError::new(
            2,
            format!(
                "Cannot derive report date from '{}' (expected MM-DD-YYYY): {e}",
                path.display()
            ),
        )
    })
}

/// Case-insensitive exact match after trimming both sides.
pub fn matches_country(value: &str, target: &str) -> bool {
    value.trim().to_lowercase() == target.trim().to_lowercase()
}

/// Decode one report from any reader, keeping only rows for `country`.
pub fn decode_snapshot<R: Read>(reader: R, date: NaiveDate, country: &str) -> Result<DailySnapshot, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read report headers for {date}: {e}")))?
        .clone();
    let header_map = HeaderMap::from_record(&headers);

    let mut observations = Vec::new();
    let mut seen = HashSet::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header line; lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                log::warn!("{date}: skipping malformed row at line {line}: {e}");
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let fields = FieldResolver::new(&header_map, &record);
        let country_name = fields.text(aliases::COUNTRY);
        if !matches_country(&country_name, country) {
            continue;
        }

        let region_name = fields.text(aliases::REGION);
        if region_name.is_empty() {
            log::debug!("{date}: line {line} matches {country} but has no region, skipping");
            continue;
        }

        let key = region_key(&region_name);
        if !seen.insert(key.clone()) {
            log::warn!("{date}: duplicate row for region '{region_name}' at line {line}, keeping the first");
            row_errors.push(RowError {
                line,
                message: format!("Duplicate region '{region_name}'."),
            });
            continue;
        }

        observations.push(RawRegionObservation {
            country_name,
            region_key: key,
            region_display_name: region_name,
            as_of_date: date,
            last_update: fields.text(aliases::LAST_UPDATE),
            totals: Cases::new(
                fields.count(aliases::CONFIRMED),
                fields.count(aliases::DEATHS),
                fields.count(aliases::RECOVERED),
            ),
        });
    }

    Ok(DailySnapshot {
        date,
        source: None,
        observations,
        rows_read,
        row_errors,
    })
}

/// Decode one report file; its date comes from the file name.
pub fn load_snapshot_file(path: &Path, country: &str) -> Result<DailySnapshot, AppError> {
    let date = report_date_from_path(path)?;
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open report '{}': {e}", path.display())))?;

    let mut snapshot = decode_snapshot(file, date, country)?;
    snapshot.source = Some(path.to_path_buf());
    log::debug!(
        "{}: {} rows, {} kept for {country}",
        path.display(),
        snapshot.rows_read,
        snapshot.observations.len()
    );
    Ok(snapshot)
}

/// Load every `*.csv` report in `dir`.
pub fn load_snapshots(dir: &Path, country: &str) -> Result<SnapshotSet, AppError> {
    let files = list_report_files(dir)?;
    if files.is_empty() {
        return Err(AppError::new(
            3,
            format!("No daily report CSV files found in '{}'.", dir.display()),
        ));
    }

    let mut snapshots = SnapshotSet::new();
    for path in files {
        let snapshot = load_snapshot_file(&path, country)?;
        if let Some(existing) = snapshots.get(&snapshot.date) {
            let other = existing
                .source
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            return Err(AppError::new(
                2,
                format!(
                    "Reports '{}' and '{other}' both resolve to {}.",
                    path.display(),
                    snapshot.date
                ),
            ));
        }
        snapshots.insert(snapshot.date, snapshot);
    }

    log::info!("Loaded {} daily reports from {}", snapshots.len(), dir.display());
    Ok(snapshots)
}

/// Report CSVs in `dir`, sorted by path. Other files are ignored.
pub fn list_report_files(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| AppError::new(2, format!("Failed to read reports folder '{}': {e}", dir.display())))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| AppError::new(2, format!("Failed to list '{}': {e}", dir.display())))?;
        let path = entry.path();
        if path.is_file() && has_csv_extension(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

pub(crate) fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, m, d).unwrap()
    }

    #[test]
    fn report_date_uses_month_day_year() {
        let date = report_date_from_path(Path::new("reports/03-15-2020.csv")).unwrap();
        assert_eq!(date, day(3, 15));
    }

    #[test]
    fn report_date_rejects_other_names() {
        let err = report_date_from_path(Path::new("reports/README.csv")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("README.csv"));

        assert!(report_date_from_path(Path::new("2020-03-15.csv")).is_err());
    }

    #[test]
    fn country_filter_ignores_case_and_padding() {
        assert!(matches_country("Australia", "australia"));
        assert!(matches_country("AUSTRALIA ", "australia"));
        assert!(!matches_country("Canada", "australia"));
        assert!(!matches_country("", "australia"));
    }

    #[test]
    fn decodes_old_header_layout() {
        let csv = "\
Province/State,Country/Region,Last Update,Confirmed,Deaths,Recovered
New South Wales,Australia,2/1/2020 18:12,4,0,2
Hubei,Mainland China,2/1/2020 11:53,7153,249,168
Victoria,AUSTRALIA ,2/1/2020 18:12,,,
";
        let snapshot = decode_snapshot(csv.as_bytes(), day(2, 1), "australia").unwrap();

        assert_eq!(snapshot.rows_read, 3);
        assert_eq!(snapshot.observations.len(), 2);

        let nsw = &snapshot.observations[0];
        assert_eq!(nsw.region_key, "new south wales");
        assert_eq!(nsw.region_display_name, "New South Wales");
        assert_eq!(nsw.last_update, "2/1/2020 18:12");
        assert_eq!(nsw.totals, Cases::new(4, 0, 2));

        let vic = &snapshot.observations[1];
        assert_eq!(vic.totals, Cases::ZERO);
        assert_eq!(vic.as_of_date, day(2, 1));
    }

    #[test]
    fn decodes_new_header_layout() {
        let csv = "\
FIPS,Admin2,Province_State,Country_Region,Last_Update,Lat,Long_,Confirmed,Deaths,Recovered,Active,Combined_Key
,,Queensland,Australia,2020-03-23 23:19:34,-27.47,153.02,319,0,8,311,\"Queensland, Australia\"
,,Ontario,Canada,2020-03-23 23:19:34,51.25,-85.32,503,6,0,497,\"Ontario, Canada\"
";
        let snapshot = decode_snapshot(csv.as_bytes(), day(3, 23), "Australia").unwrap();

        assert_eq!(snapshot.observations.len(), 1);
        let qld = &snapshot.observations[0];
        assert_eq!(qld.region_display_name, "Queensland");
        assert_eq!(qld.last_update, "2020-03-23 23:19:34");
        assert_eq!(qld.totals, Cases::new(319, 0, 8));
    }

    #[test]
    fn skips_rows_without_region_and_duplicates() {
        let csv = "\
Province/State,Country/Region,Confirmed
,Australia,5
Victoria,Australia,1
VICTORIA,Australia,9
";
        let snapshot = decode_snapshot(csv.as_bytes(), day(2, 2), "australia").unwrap();

        assert_eq!(snapshot.observations.len(), 1);
        assert_eq!(snapshot.observations[0].totals.confirmed, 1);
        assert_eq!(snapshot.row_errors.len(), 1);
        assert_eq!(snapshot.row_errors[0].line, 4);
    }

    #[test]
    fn invalid_utf8_row_is_skipped_and_decoding_continues() {
        let bytes = b"Province/State,Country/Region,Confirmed\nVictoria,Australia,\xff\nTasmania,Australia,3\n";
        let snapshot = decode_snapshot(&bytes[..], day(2, 3), "australia").unwrap();

        assert_eq!(snapshot.rows_read, 2);
        assert_eq!(snapshot.row_errors.len(), 1);
        assert_eq!(snapshot.row_errors[0].line, 2);
        assert_eq!(snapshot.observations.len(), 1);
        assert_eq!(snapshot.observations[0].region_key, "tasmania");
        assert_eq!(snapshot.observations[0].totals, Cases::new(3, 0, 0));
    }

    #[test]
    fn negative_total_does_not_poison_the_next_delta() {
        let header = "Province/State,Country/Region,Confirmed\n";
        let first = format!("{header}Victoria,Australia,-9223372036854775808\n");
        let second = format!("{header}Victoria,Australia,5\n");
        let days = [
            decode_snapshot(first.as_bytes(), day(2, 4), "australia").unwrap(),
            decode_snapshot(second.as_bytes(), day(2, 5), "australia").unwrap(),
        ];

        let dataset = crate::aggregate::aggregate_observations(
            days.iter().map(|s| (s.date, s.observations.as_slice())),
        );
        let vic = dataset.region("victoria").unwrap();
        let records: Vec<(i64, i64)> = vic
            .series
            .iter()
            .map(|r| (r.total_cases.confirmed, r.new_cases.confirmed))
            .collect();
        assert_eq!(records, vec![(0, 0), (5, 5)]);
    }

    #[test]
    fn loads_folder_in_date_order() {
        let dir = tempfile::tempdir().unwrap();
        let header = "Province/State,Country/Region,Confirmed\n";
        std::fs::write(dir.path().join("01-23-2020.csv"), format!("{header}Victoria,Australia,2\n")).unwrap();
        std::fs::write(dir.path().join("12-31-2019.csv"), header).unwrap();
        std::fs::write(dir.path().join("README.md"), "not a report").unwrap();

        let snapshots = load_snapshots(dir.path(), "australia").unwrap();
        let dates: Vec<_> = snapshots.keys().copied().collect();
        assert_eq!(dates, vec![NaiveDate::from_ymd_opt(2019, 12, 31).unwrap(), day(1, 23)]);
        assert!(snapshots[&dates[0]].observations.is_empty());
        assert_eq!(snapshots[&dates[1]].observations.len(), 1);
    }

    #[test]
    fn two_files_with_the_same_date_stop_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let header = "Province/State,Country/Region,Confirmed\n";
        let plain = dir.path().join("01-22-2020.csv");
        let padded = dir.path().join(" 01-22-2020.csv");
        std::fs::write(&plain, header).unwrap();
        std::fs::write(&padded, header).unwrap();

        let err = load_snapshots(dir.path(), "australia").unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains(&plain.display().to_string()));
        assert!(err.message().contains(&padded.display().to_string()));
        assert!(err.message().contains("2020-01-22"));
    }

    #[test]
    fn empty_folder_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_snapshots(dir.path(), "australia").unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
