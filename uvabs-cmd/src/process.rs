//! Batch orchestration: drive each batch folder through classification,
//! blank assignment, correction and upload.
//!
//! Per-file problems (bad spectrum, unknown or ambiguous identity,
//! persistence failure) are recorded and the rest of the batch continues.
//! A blank-assignment failure aborts the batch as a whole; the operator
//! fixes the folder and reruns.

use crate::report::RunReport;
use crate::upload::{upload_sample, UploadOutcome, UploadStatus};
use anyhow::Context;
use chrono::{Datelike, Local, NaiveDate};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use uvabs_db::models::UploadRecord;
use uvabs_db::Database;
use uvabs_spectra::blank::assign_blanks;
use uvabs_spectra::correct::{correct, DilutionSource, FixedDilution};
use uvabs_spectra::error::IdentityError;
use uvabs_spectra::identity::{check_batch_year, IdentityMatch, LabwareId};
use uvabs_spectra::spectrum::{read_spectrum, FileKind, RawSpectrum};
use uvabs_utils::dates::{is_batch_folder_name, parse_batch_folder_date};

/// Filename prefix identifying blank (calibration) files.
const BLANK_PREFIX: &str = "BL";

/// Batch subfolder that uploaded source files are moved into.
const ARCHIVE_SUBFOLDER: &str = "uploaded";

/// Everything the `process` command needs, resolved from CLI arguments.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub force_update: bool,
    pub cuvette_len_cm: f64,
    pub method_id: i64,
    pub log_dir: PathBuf,
}

/// Run the full pipeline: open the store, process every batch folder under
/// the data dir, write the run report.
pub fn run_process(opts: &ProcessOptions) -> anyhow::Result<()> {
    let db = Database::open(&opts.db_path)
        .with_context(|| format!("opening database '{}'", opts.db_path.display()))?;
    let mut report = RunReport::new(Local::now().naive_local());

    process_data_dir(&db, &FixedDilution::default(), opts, &mut report)?;

    let path = report.write_to(&opts.log_dir)?;
    info!("Run report written to '{}'", path.display());
    Ok(())
}

/// Process every `AB{yymmdd}` folder under the data dir, in name order.
pub fn process_data_dir(
    db: &Database,
    dilutions: &dyn DilutionSource,
    opts: &ProcessOptions,
    report: &mut RunReport,
) -> anyhow::Result<()> {
    let mut folders = Vec::new();
    let entries = fs::read_dir(&opts.data_dir)
        .with_context(|| format!("reading data dir '{}'", opts.data_dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if path.is_dir() && is_batch_folder_name(name) {
            folders.push(path);
        }
    }
    folders.sort();

    info!("Found {} batch folders under '{}'", folders.len(), opts.data_dir.display());
    for folder in &folders {
        process_batch(db, dilutions, folder, opts, report);
    }
    Ok(())
}

/// Process one batch folder end-to-end. Batch-level failures are recorded
/// on the report; they never abort the run as a whole.
fn process_batch(
    db: &Database,
    dilutions: &dyn DilutionSource,
    folder: &Path,
    opts: &ProcessOptions,
    report: &mut RunReport,
) {
    let (sample_files, blank_files) = match partition_batch_files(folder) {
        Ok(found) => found,
        Err(e) => {
            report.batch_error(folder, &format!("{e:#}"));
            return;
        }
    };
    if sample_files.is_empty() || blank_files.is_empty() {
        return;
    }
    report.batch_header(folder);

    // A bad calibration file poisons every sample that would map to it,
    // so any unreadable blank aborts the batch.
    let mut blanks = Vec::new();
    for path in &blank_files {
        match read_spectrum(path, FileKind::Blank) {
            Ok(spectrum) => blanks.push(spectrum),
            Err(e) => {
                report.batch_error(folder, &e.to_string());
                return;
            }
        }
    }

    // Sample parse failures are per-file: record and carry on.
    let mut samples = Vec::new();
    for path in &sample_files {
        match read_spectrum(path, FileKind::Sample) {
            Ok(spectrum) => samples.push(spectrum),
            Err(e) => {
                let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
                report.record(&UploadOutcome::failed(stem, None, path, e.to_string()));
            }
        }
    }
    samples.sort();

    let assignments = match assign_blanks(&samples, &blanks) {
        Ok(assignments) => assignments,
        Err(e) => {
            report.batch_error(folder, &e.to_string());
            return;
        }
    };

    let folder_date = folder
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(parse_batch_folder_date);

    for (sample, &blank_idx) in samples.iter().zip(assignments.iter()) {
        let outcome = process_sample(db, dilutions, sample, &blanks[blank_idx], folder_date, opts);
        let uploaded = outcome.status == UploadStatus::Uploaded;
        report.record(&outcome);
        if uploaded {
            if let Err(e) = archive_file(&sample.source_path) {
                report.warning(&format!(
                    "uploaded '{}' but could not move it to the {ARCHIVE_SUBFOLDER} folder: {e:#}",
                    sample.source_path.display()
                ));
            }
        }
    }
}

/// Take one parsed sample through identity resolution, correction and
/// upload. Every early exit carries the reason into the outcome.
fn process_sample(
    db: &Database,
    dilutions: &dyn DilutionSource,
    sample: &RawSpectrum,
    blank: &RawSpectrum,
    folder_date: Option<NaiveDate>,
    opts: &ProcessOptions,
) -> UploadOutcome {
    let path = &sample.source_path;
    let file_year = sample.timestamp.date().year();

    let labware = match LabwareId::new(file_year, &sample.serial_no) {
        Ok(labware) => labware,
        Err(e) => return UploadOutcome::failed(sample.serial_no.clone(), None, path, e.to_string()),
    };
    if let Err(e) = check_batch_year(file_year, folder_date.map(|d| d.year())) {
        return UploadOutcome::failed(labware.text(), None, path, e.to_string());
    }

    let water_sample_id = match db.resolve_water_sample_id(&labware.text()) {
        Err(e) => {
            return UploadOutcome::failed(labware.text(), None, path, format!("identity lookup: {e}"))
        }
        Ok(IdentityMatch::NotFound) => {
            return UploadOutcome {
                labware_text_id: labware.text(),
                water_sample_id: None,
                source_path: path.clone(),
                status: UploadStatus::SkippedUnidentified,
            }
        }
        Ok(IdentityMatch::Ambiguous(candidates)) => {
            let e = IdentityError::Ambiguous {
                labware_text_id: labware.text(),
                candidates,
            };
            return UploadOutcome::failed(labware.text(), None, path, e.to_string());
        }
        Ok(IdentityMatch::Found(id)) => id,
    };

    let dilution = dilutions.dilution_for(&labware);
    let corrected = match correct(sample, blank, dilution, opts.cuvette_len_cm) {
        Ok(corrected) => corrected,
        Err(e) => {
            return UploadOutcome::failed(labware.text(), Some(water_sample_id), path, e.to_string())
        }
    };

    let record = UploadRecord {
        water_sample_id,
        method_id: opts.method_id,
        labware_text_id: labware.text(),
        year: labware.year(),
        serial_no: labware.serial_no().to_string(),
        blank_file: blank
            .source_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string(),
        dilution,
        cuvette_len_cm: opts.cuvette_len_cm,
        original_path: path.display().to_string(),
        archive_path: archive_destination(path).display().to_string(),
        uploaded_by: uvabs_utils::env::current_user(),
    };
    upload_sample(db, &record, &corrected, opts.force_update)
}

/// Enumerate a batch folder's `.SP` files and classify them once by
/// filename prefix. Downstream code only ever sees the resulting tag.
fn partition_batch_files(folder: &Path) -> anyhow::Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut samples = Vec::new();
    let mut blanks = Vec::new();
    let entries =
        fs::read_dir(folder).with_context(|| format!("reading batch folder '{}'", folder.display()))?;
    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let is_sp = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("sp"))
            .unwrap_or(false);
        if !is_sp {
            continue;
        }
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if name.starts_with(BLANK_PREFIX) {
            blanks.push(path);
        } else {
            samples.push(path);
        }
    }
    samples.sort();
    blanks.sort();
    Ok((samples, blanks))
}

fn archive_destination(path: &Path) -> PathBuf {
    let folder = path.parent().unwrap_or_else(|| Path::new(""));
    folder
        .join(ARCHIVE_SUBFOLDER)
        .join(path.file_name().unwrap_or_default())
}

/// Move an uploaded source file into the batch's archive subfolder,
/// creating it on first use.
fn archive_file(path: &Path) -> anyhow::Result<()> {
    let dest = archive_destination(path);
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::rename(path, &dest)
        .with_context(|| format!("moving '{}' to '{}'", path.display(), dest.display()))?;
    Ok(())
}
