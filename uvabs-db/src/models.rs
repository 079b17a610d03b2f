//! Row structs for the absorbance store.

use serde::Serialize;

/// Everything recorded about one upload besides the spectrum itself.
/// Passed to `store_corrected_spectrum`, which writes the audit-log row in
/// the same transaction as the spectrum rows.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadRecord {
    pub water_sample_id: i64,
    pub method_id: i64,
    pub labware_text_id: String,
    pub year: i32,
    pub serial_no: String,
    /// Name of the blank file the correction used (e.g. "BLANK.SP").
    pub blank_file: String,
    pub dilution: f64,
    pub cuvette_len_cm: f64,
    pub original_path: String,
    pub archive_path: String,
    pub uploaded_by: String,
}

/// One row of the append-only upload log, newest first when listed.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UploadLogRow {
    pub labware_text_id: String,
    pub water_sample_id: i64,
    pub blank_file: String,
    pub dilution: f64,
    pub cuvette_len_cm: f64,
    pub uploaded_by: String,
    pub uploaded_at: String,
}
