//! Shared utility functions for UVABS crates.

/// Date utility functions
pub mod dates {
    use chrono::{NaiveDate, NaiveDateTime};

    /// Prefix identifying batch folders ("AB190614").
    pub const BATCH_FOLDER_PREFIX: &str = "AB";

    /// Parse a batch folder name of the form "AB{yymmdd}" into its date.
    /// Returns None for anything that does not match the convention.
    pub fn parse_batch_folder_date(name: &str) -> Option<NaiveDate> {
        let digits = name.strip_prefix(BATCH_FOLDER_PREFIX)?;
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        NaiveDate::parse_from_str(digits, "%y%m%d").ok()
    }

    /// Whether a folder name follows the batch naming convention.
    pub fn is_batch_folder_name(name: &str) -> bool {
        name.starts_with(BATCH_FOLDER_PREFIX)
    }

    /// Format a run timestamp for log file names: "YYYY-MM-DD-HHMM"
    pub fn run_stamp(at: &NaiveDateTime) -> String {
        at.format("%Y-%m-%d-%H%M").to_string()
    }

}

/// Process environment helpers
pub mod env {
    /// Name of the account running the upload, recorded in the audit log.
    pub fn current_user() -> String {
        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string())
    }
}
