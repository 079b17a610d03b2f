//! Upload coordination: the at-most-one-record-per-sample policy.

use std::path::{Path, PathBuf};
use uvabs_db::models::UploadRecord;
use uvabs_db::Database;
use uvabs_spectra::correct::CorrectedSpectrum;

/// Terminal state of one sample file's trip through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadStatus {
    /// Corrected spectrum persisted and audit-logged.
    Uploaded,
    /// A spectrum already exists and the override flag is off. Resolves
    /// itself: rerunning with `--force-update` replaces the record.
    SkippedExisting,
    /// No canonical water sample id yet; expected to resolve on a later
    /// run once the lab finalizes the chemistry.
    SkippedUnidentified,
    /// Processing of this file stopped; the reason is reported verbatim.
    Failed(String),
}

/// Outcome plus the context needed to render a report line.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadOutcome {
    /// Labware text id, or the bare filename stem when the full identity
    /// could not be derived.
    pub labware_text_id: String,
    pub water_sample_id: Option<i64>,
    pub source_path: PathBuf,
    pub status: UploadStatus,
}

impl UploadOutcome {
    pub fn failed(
        labware_text_id: impl Into<String>,
        water_sample_id: Option<i64>,
        source_path: &Path,
        reason: impl Into<String>,
    ) -> Self {
        UploadOutcome {
            labware_text_id: labware_text_id.into(),
            water_sample_id,
            source_path: source_path.to_path_buf(),
            status: UploadStatus::Failed(reason.into()),
        }
    }
}

/// Apply the upload policy for one identified sample.
///
/// - no existing record: persist and log, `Uploaded`
/// - record exists, `force_update` unset: `SkippedExisting`, no mutation
/// - record exists, `force_update` set: replace (delete + insert + log in
///   one transaction) and report `Uploaded`
///
/// `force_update` is threaded down from the CLI flag; it is never read
/// from ambient state. Persistence failures become `Failed` outcomes so
/// the rest of the batch keeps processing.
pub fn upload_sample(
    db: &Database,
    record: &UploadRecord,
    corrected: &CorrectedSpectrum,
    force_update: bool,
) -> UploadOutcome {
    let outcome = |status| UploadOutcome {
        labware_text_id: record.labware_text_id.clone(),
        water_sample_id: Some(record.water_sample_id),
        source_path: PathBuf::from(&record.original_path),
        status,
    };

    let existing = match db.spectrum_row_count(record.water_sample_id) {
        Ok(n) => n,
        Err(e) => return outcome(UploadStatus::Failed(format!("checking existing rows: {e}"))),
    };

    if existing > 0 && !force_update {
        return outcome(UploadStatus::SkippedExisting);
    }

    match db.store_corrected_spectrum(record, corrected) {
        Ok(()) => outcome(UploadStatus::Uploaded),
        Err(e) => outcome(UploadStatus::Failed(format!("persisting spectrum: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uvabs_spectra::spectrum::{SpectrumPoint, EXPECTED_POINTS, WAVELENGTH_START};

    fn corrected() -> CorrectedSpectrum {
        CorrectedSpectrum {
            points: (0..EXPECTED_POINTS)
                .map(|i| SpectrumPoint {
                    wavelength: WAVELENGTH_START + i as i32,
                    absorbance: 0.1,
                })
                .collect(),
        }
    }

    fn record() -> UploadRecord {
        UploadRecord {
            water_sample_id: 456,
            method_id: 10666,
            labware_text_id: "NR-2019-00123".to_string(),
            year: 2019,
            serial_no: "00123".to_string(),
            blank_file: "BLANK.SP".to_string(),
            dilution: 1.0,
            cuvette_len_cm: 5.0,
            original_path: "AB190614/00123.SP".to_string(),
            archive_path: "AB190614/uploaded/00123.SP".to_string(),
            uploaded_by: "tester".to_string(),
        }
    }

    #[test]
    fn first_upload_persists_and_logs() {
        let db = Database::new().unwrap();
        let outcome = upload_sample(&db, &record(), &corrected(), false);

        assert_eq!(outcome.status, UploadStatus::Uploaded);
        assert_eq!(outcome.water_sample_id, Some(456));
        assert_eq!(db.spectrum_row_count(456).unwrap(), EXPECTED_POINTS as i64);
        assert_eq!(db.upload_log_count().unwrap(), 1);
    }

    #[test]
    fn rerun_without_force_skips_and_leaves_store_untouched() {
        let db = Database::new().unwrap();
        upload_sample(&db, &record(), &corrected(), false);
        let outcome = upload_sample(&db, &record(), &corrected(), false);

        assert_eq!(outcome.status, UploadStatus::SkippedExisting);
        assert_eq!(db.spectrum_row_count(456).unwrap(), EXPECTED_POINTS as i64);
        assert_eq!(db.upload_log_count().unwrap(), 1, "Skip must not add a log row");
    }

    #[test]
    fn rerun_with_force_replaces_exactly_once() {
        let db = Database::new().unwrap();
        upload_sample(&db, &record(), &corrected(), false);
        let outcome = upload_sample(&db, &record(), &corrected(), true);

        assert_eq!(outcome.status, UploadStatus::Uploaded);
        // Still one spectrum's worth of rows; the append-only log grew.
        assert_eq!(db.spectrum_row_count(456).unwrap(), EXPECTED_POINTS as i64);
        assert_eq!(db.upload_log_count().unwrap(), 2);
    }
}
