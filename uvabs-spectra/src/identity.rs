//! Labware identity: the external text id linking a raw file to a canonical
//! water sample record.

use crate::error::IdentityError;
use serde::{Deserialize, Serialize};

/// Identity derived from the analysis year and the filename serial,
/// rendered as `NR-{year}-{serial_no}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabwareId {
    year: i32,
    serial_no: String,
}

impl LabwareId {
    /// Build an identity, validating that the serial is a zero-padded
    /// 5-digit number.
    pub fn new(year: i32, serial_no: &str) -> Result<Self, IdentityError> {
        if serial_no.len() != 5 || !serial_no.bytes().all(|b| b.is_ascii_digit()) {
            return Err(IdentityError::BadSerial {
                serial_no: serial_no.to_string(),
            });
        }
        Ok(LabwareId {
            year,
            serial_no: serial_no.to_string(),
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn serial_no(&self) -> &str {
        &self.serial_no
    }

    /// The labware text id used for the canonical-sample lookup.
    pub fn text(&self) -> String {
        format!("NR-{}-{}", self.year, self.serial_no)
    }
}

/// Result of resolving a labware text id against the canonical store.
///
/// `NotFound` is an expected state (the lab may not have finalized the
/// chemistry yet) and is handled as a skip-with-warning. `Ambiguous` is a
/// hard error; the caller must abort that file rather than guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityMatch {
    Found(i64),
    NotFound,
    Ambiguous(Vec<i64>),
}

/// Validate that the analysis year inside a file agrees with the year the
/// batch folder name claims. Neither source is silently preferred; a
/// disagreement fails the file.
pub fn check_batch_year(file_year: i32, folder_year: Option<i32>) -> Result<(), IdentityError> {
    match folder_year {
        Some(folder_year) if folder_year != file_year => Err(IdentityError::YearMismatch {
            file_year,
            folder_year,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_labware_text_id() {
        let labware = LabwareId::new(2019, "00123").unwrap();
        assert_eq!(labware.text(), "NR-2019-00123");
        assert_eq!(labware.year(), 2019);
        assert_eq!(labware.serial_no(), "00123");
    }

    #[test]
    fn rejects_short_and_non_numeric_serials() {
        assert!(matches!(
            LabwareId::new(2019, "123"),
            Err(IdentityError::BadSerial { .. })
        ));
        assert!(matches!(
            LabwareId::new(2019, "12a45"),
            Err(IdentityError::BadSerial { .. })
        ));
        assert!(matches!(
            LabwareId::new(2019, "001234"),
            Err(IdentityError::BadSerial { .. })
        ));
    }

    #[test]
    fn year_check_passes_when_sources_agree() {
        assert!(check_batch_year(2019, Some(2019)).is_ok());
        // No folder year to compare against
        assert!(check_batch_year(2019, None).is_ok());
    }

    #[test]
    fn year_check_fails_on_disagreement() {
        let err = check_batch_year(2019, Some(2018)).unwrap_err();
        assert!(matches!(
            err,
            IdentityError::YearMismatch {
                file_year: 2019,
                folder_year: 2018
            }
        ));
    }
}
