//! Typed queries against the absorbance store.
//!
//! The upload path is transactional: delete-then-insert-then-log is one
//! logical step, so a failure part-way can never leave a partial spectrum
//! or a log row without data.

use crate::models::{UploadLogRow, UploadRecord};
use crate::Database;
use rusqlite::params;
use uvabs_spectra::correct::CorrectedSpectrum;
use uvabs_spectra::identity::IdentityMatch;

impl Database {
    /// Resolve a labware text id to its canonical water sample id.
    ///
    /// Zero matches is an expected state (chemistry not finalized yet);
    /// more than one is an ambiguous identity the caller must refuse to
    /// guess between.
    pub fn resolve_water_sample_id(&self, labware_text_id: &str) -> anyhow::Result<IdentityMatch> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT water_sample_id FROM labware_samples
             WHERE labware_text_id = ?1
             ORDER BY water_sample_id",
        )?;
        let ids = stmt
            .query_map(params![labware_text_id], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(match ids.len() {
            0 => IdentityMatch::NotFound,
            1 => IdentityMatch::Found(ids[0]),
            _ => IdentityMatch::Ambiguous(ids),
        })
    }

    /// Number of spectrum rows currently stored for a water sample.
    /// 0 means never uploaded; a complete upload holds 701 rows.
    pub fn spectrum_row_count(&self, water_sample_id: i64) -> anyhow::Result<i64> {
        let conn = self.conn.borrow();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM absorbance_spectra WHERE water_sample_id = ?1",
            params![water_sample_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Store a corrected spectrum, replacing any previous rows for the same
    /// water sample, and append the audit-log row. Runs in one transaction.
    pub fn store_corrected_spectrum(
        &self,
        record: &UploadRecord,
        corrected: &CorrectedSpectrum,
    ) -> anyhow::Result<()> {
        let uploaded_at = chrono::Local::now()
            .naive_local()
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();

        let mut conn = self.conn.borrow_mut();
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM absorbance_spectra WHERE water_sample_id = ?1",
            params![record.water_sample_id],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO absorbance_spectra (water_sample_id, method_id, wavelength, value)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for point in &corrected.points {
                stmt.execute(params![
                    record.water_sample_id,
                    record.method_id,
                    point.wavelength,
                    point.absorbance
                ])?;
            }
        }
        tx.execute(
            "INSERT INTO upload_log
             (labware_text_id, water_sample_id, year, serial_no, blank_file,
              dilution, cuvette_len_cm, original_path, archive_path,
              uploaded_by, uploaded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                record.labware_text_id,
                record.water_sample_id,
                record.year,
                record.serial_no,
                record.blank_file,
                record.dilution,
                record.cuvette_len_cm,
                record.original_path,
                record.archive_path,
                record.uploaded_by,
                uploaded_at
            ],
        )?;
        tx.commit()?;

        log::info!(
            "Stored {} spectrum rows for water sample {}",
            corrected.points.len(),
            record.water_sample_id
        );
        Ok(())
    }

    /// Most recent upload-log rows, newest first.
    pub fn recent_uploads(&self, limit: usize) -> anyhow::Result<Vec<UploadLogRow>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT labware_text_id, water_sample_id, blank_file, dilution,
                    cuvette_len_cm, uploaded_by, uploaded_at
             FROM upload_log
             ORDER BY rowid DESC
             LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok(UploadLogRow {
                    labware_text_id: row.get(0)?,
                    water_sample_id: row.get(1)?,
                    blank_file: row.get(2)?,
                    dilution: row.get(3)?,
                    cuvette_len_cm: row.get(4)?,
                    uploaded_by: row.get(5)?,
                    uploaded_at: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Total number of upload-log rows. The log is append-only, so this
    /// only ever grows.
    pub fn upload_log_count(&self) -> anyhow::Result<i64> {
        let conn = self.conn.borrow();
        let count = conn.query_row("SELECT COUNT(*) FROM upload_log", [], |row| row.get(0))?;
        Ok(count)
    }
}
