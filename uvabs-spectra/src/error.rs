/// Error types for the spectra library
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading a raw spectrophotometer export.
#[derive(Error, Debug)]
pub enum SpectrumError {
    /// The file could not be read at all
    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The analysis timestamp in the header could not be parsed
    #[error("File '{}' has an unreadable analysis timestamp: {detail}", .path.display())]
    MalformedHeader { path: PathBuf, detail: String },

    /// The wavelength table has the wrong number of rows
    #[error("File '{}' contains {found} rows (expected {expected})", .path.display())]
    IncompleteSpectrum {
        path: PathBuf,
        found: usize,
        expected: usize,
    },

    /// A wavelength table row could not be parsed
    #[error("File '{}', line {line}: {detail}", .path.display())]
    MalformedRow {
        path: PathBuf,
        line: usize,
        detail: String,
    },

    /// The wavelength axis is not 200-900 nm in 1 nm steps
    #[error("File '{}' has a bad wavelength axis: {detail}", .path.display())]
    BadWavelengthAxis { path: PathBuf, detail: String },
}

/// Batch-level failure: one or more sample files have no blank recorded
/// before them. The batch must be fixed and rerun as a whole.
#[derive(Error, Debug)]
#[error("Cannot assign blanks for all files: {}", format_paths(.unassigned))]
pub struct BlankAssignmentError {
    /// Sample files with no preceding blank, in batch order.
    pub unassigned: Vec<PathBuf>,
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| format!("'{}'", p.display()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors raised by the correction engine.
#[derive(Error, Debug)]
pub enum CorrectionError {
    /// Sample and blank do not share a complete, identical wavelength axis.
    /// Reaching this means the caller paired mismatched spectra.
    #[error("Sample and blank spectra do not share a complete wavelength axis: {detail}")]
    SpectrumMismatch { detail: String },
}

/// Errors raised while deriving or resolving a labware identity.
#[derive(Error, Debug)]
pub enum IdentityError {
    /// The filename stem is not a zero-padded 5-digit serial number
    #[error("'{serial_no}' is not a 5-digit labware serial number")]
    BadSerial { serial_no: String },

    /// The analysis year inside the file disagrees with the batch folder name
    #[error("Analysis year {file_year} does not match batch folder year {folder_year}")]
    YearMismatch { file_year: i32, folder_year: i32 },

    /// More than one canonical sample id matched; never guess between them
    #[error("Found multiple water sample IDs for {labware_text_id}: {candidates:?}")]
    Ambiguous {
        labware_text_id: String,
        candidates: Vec<i64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn incomplete_spectrum_reports_both_counts() {
        let err = SpectrumError::IncompleteSpectrum {
            path: PathBuf::from("AB190614/00001.SP"),
            found: 699,
            expected: 701,
        };
        let msg = err.to_string();
        assert!(msg.contains("699"), "message should name the actual count");
        assert!(msg.contains("701"), "message should name the expected count");
        assert!(msg.contains("00001.SP"), "message should name the file");
    }

    #[test]
    fn blank_assignment_error_lists_every_offender() {
        let err = BlankAssignmentError {
            unassigned: vec![PathBuf::from("a.SP"), PathBuf::from("b.SP")],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Cannot assign blanks for all files"));
        assert!(msg.contains("a.SP"));
        assert!(msg.contains("b.SP"));
    }
}
