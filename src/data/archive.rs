//! Download and unpack the daily reports archive.
//!
//! The upstream repository is fetched as a single zip. Only the daily report
//! CSVs are kept; they are flattened into `<work>/data/`. Download and
//! extraction happen in a scratch folder inside the work folder, and the
//! existing `data/` is only replaced once a complete set of reports is ready.
//! Nothing else in the work folder is touched.

use std::fs::{self, File};
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use tempfile::TempDir;
use zip::ZipArchive;

use crate::error::AppError;
use crate::io::ingest::has_csv_extension;

pub const DEFAULT_ARCHIVE_URL: &str = "https://github.com/CSSEGISandData/COVID-19/archive/master.zip";

/// Folder of the daily reports inside the archive.
pub const DAILY_REPORTS_PREFIX: &str = "COVID-19-master/csse_covid_19_data/csse_covid_19_daily_reports/";

const ARCHIVE_FILE: &str = "covid.zip";
const DATA_DIR: &str = "data";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
// The blocking client applies this to the response headers and to each body
// read, so it bounds a stalled transfer rather than the whole download.
const READ_TIMEOUT: Duration = Duration::from_secs(120);

/// Reports folder inside a work folder.
pub fn reports_dir(work_dir: &Path) -> PathBuf {
    work_dir.join(DATA_DIR)
}

pub struct ArchiveSource {
    client: Client,
    url: String,
}

impl ArchiveSource {
    /// Source URL from `CASES_ARCHIVE_URL` (`.env` honoured), else the upstream default.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let url = std::env::var("CASES_ARCHIVE_URL").unwrap_or_else(|_| DEFAULT_ARCHIVE_URL.to_string());
        Self::new(url)
    }

    pub fn new(url: impl Into<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(READ_TIMEOUT)
            .build()
            .map_err(|e| AppError::new(4, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Download the archive and install its daily reports as `<work>/data`.
    ///
    /// Returns the folder holding the extracted CSVs. On failure the previous
    /// `data/` (if any) is left as it was.
    pub fn fetch_reports(&self, work_dir: &Path) -> Result<PathBuf, AppError> {
        fs::create_dir_all(work_dir)
            .map_err(|e| AppError::new(4, format!("Failed to create '{}': {e}", work_dir.display())))?;
        let staging = scratch_dir(work_dir)?;

        let zip_path = staging.path().join(ARCHIVE_FILE);
        self.download(&zip_path)?;

        log::info!("Extracting daily reports");
        let file = File::open(&zip_path)
            .map_err(|e| AppError::new(4, format!("Failed to open '{}': {e}", zip_path.display())))?;
        install_reports(file, work_dir)
    }

    fn download(&self, dest: &Path) -> Result<(), AppError> {
        log::info!("Downloading {}", self.url);
        let mut resp = self
            .client
            .get(&self.url)
            .send()
            .map_err(|e| AppError::new(4, format!("Archive request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("Archive request failed with status {}.", resp.status()),
            ));
        }

        let mut file = File::create(dest)
            .map_err(|e| AppError::new(4, format!("Failed to create '{}': {e}", dest.display())))?;
        let bytes = resp
            .copy_to(&mut file)
            .map_err(|e| AppError::new(4, format!("Failed to download archive: {e}")))?;

        log::debug!("Downloaded {bytes} bytes to {}", dest.display());
        Ok(())
    }
}

/// Extract the daily reports from `reader` and swap them in as `<work>/data`.
///
/// Extraction goes to a scratch folder first. The current `data/` is removed
/// only after every report was written, and an archive without any daily
/// report is rejected so a bad download cannot empty the folder.
pub fn install_reports<R: Read + Seek>(reader: R, work_dir: &Path) -> Result<PathBuf, AppError> {
    let staging = scratch_dir(work_dir)?;
    let staged = staging.path().join(DATA_DIR);
    fs::create_dir(&staged)
        .map_err(|e| AppError::new(4, format!("Failed to create '{}': {e}", staged.display())))?;

    let count = extract_daily_reports(reader, &staged)?;
    if count == 0 {
        return Err(AppError::new(
            4,
            format!("Archive has no daily reports under '{DAILY_REPORTS_PREFIX}'."),
        ));
    }

    let data_dir = reports_dir(work_dir);
    if data_dir.exists() {
        fs::remove_dir_all(&data_dir)
            .map_err(|e| AppError::new(4, format!("Failed to clear '{}': {e}", data_dir.display())))?;
    }
    fs::rename(&staged, &data_dir)
        .map_err(|e| AppError::new(4, format!("Failed to move reports into '{}': {e}", data_dir.display())))?;

    log::info!("Installed {count} daily reports in {}", data_dir.display());
    Ok(data_dir)
}

// Same filesystem as the destination, so the final rename never copies.
fn scratch_dir(work_dir: &Path) -> Result<TempDir, AppError> {
    tempfile::tempdir_in(work_dir)
        .map_err(|e| AppError::new(4, format!("Failed to create scratch folder in '{}': {e}", work_dir.display())))
}

/// Copy every CSV directly under [`DAILY_REPORTS_PREFIX`] into `dest`.
///
/// Returns the number of files written.
pub fn extract_daily_reports<R: Read + Seek>(reader: R, dest: &Path) -> Result<usize, AppError> {
    let mut archive =
        ZipArchive::new(reader).map_err(|e| AppError::new(4, format!("Invalid archive: {e}")))?;

    let mut count = 0usize;
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| AppError::new(4, format!("Failed to read archive entry {i}: {e}")))?;
        if entry.is_dir() {
            continue;
        }

        let Some(file_name) = report_file_name(entry.name()) else {
            continue;
        };

        let out_path = dest.join(file_name);
        let mut out = File::create(&out_path)
            .map_err(|e| AppError::new(4, format!("Failed to create '{}': {e}", out_path.display())))?;
        std::io::copy(&mut entry, &mut out)
            .map_err(|e| AppError::new(4, format!("Failed to extract '{}': {e}", out_path.display())))?;
        count += 1;
    }

    Ok(count)
}

// Only plain CSV files directly inside the reports folder are kept.
fn report_file_name(entry_name: &str) -> Option<&str> {
    let rest = entry_name.strip_prefix(DAILY_REPORTS_PREFIX)?;
    if rest.is_empty() || rest.contains('/') || rest.contains('\\') || rest.starts_with('.') {
        return None;
    }
    has_csv_extension(Path::new(rest)).then_some(rest)
}
