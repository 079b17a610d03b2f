//! Run report: the human-readable log of every outcome.
//!
//! Every file processed during a run yields exactly one line here, and
//! batch-level failures are recorded against their folder. The rendered
//! report is written to a timestamped file in the log folder and handed to
//! whatever notification channel the operator wires up downstream.

use crate::upload::{UploadOutcome, UploadStatus};
use chrono::NaiveDateTime;
use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use uvabs_utils::dates::run_stamp;

const RULE: &str = "############################################################################";

/// Accumulates report lines and outcomes in processing order.
pub struct RunReport {
    started: NaiveDateTime,
    lines: Vec<String>,
    outcomes: Vec<UploadOutcome>,
    batch_errors: usize,
}

impl RunReport {
    pub fn new(started: NaiveDateTime) -> Self {
        RunReport {
            started,
            lines: Vec::new(),
            outcomes: Vec::new(),
            batch_errors: 0,
        }
    }

    /// Announce the batch folder about to be processed.
    pub fn batch_header(&mut self, folder: &Path) {
        let line = format!("{RULE}\n{}\n{RULE}", folder.display());
        info!("Processing batch folder '{}'", folder.display());
        self.lines.push(line);
    }

    /// Record the outcome for one sample file.
    pub fn record(&mut self, outcome: &UploadOutcome) {
        let line = match &outcome.status {
            UploadStatus::Uploaded => {
                let id = outcome.water_sample_id.unwrap_or_default();
                format!(
                    "Successfully uploaded new data for {} (water sample ID {id}).",
                    outcome.labware_text_id
                )
            }
            UploadStatus::SkippedExisting => {
                let id = outcome.water_sample_id.unwrap_or_default();
                format!(
                    "Skipping upload for {} (water sample ID {id}). \
                     Values already exist (use --force-update to reload).",
                    outcome.labware_text_id
                )
            }
            UploadStatus::SkippedUnidentified => format!(
                "Skipping upload for {}. Could not identify water sample.",
                outcome.labware_text_id
            ),
            UploadStatus::Failed(reason) => format!(
                "ERROR: Processing failed for {} ('{}'): {reason}",
                outcome.labware_text_id,
                outcome.source_path.display()
            ),
        };
        match &outcome.status {
            UploadStatus::Failed(_) => error!("{line}"),
            _ => info!("{line}"),
        }
        self.lines.push(line);
        self.outcomes.push(outcome.clone());
    }

    /// Record a batch-level failure; the folder's samples were not processed.
    pub fn batch_error(&mut self, folder: &Path, message: &str) {
        let line = format!("ERROR: Batch '{}' aborted: {message}", folder.display());
        error!("{line}");
        self.lines.push(line);
        self.batch_errors += 1;
    }

    /// Record a non-fatal irregularity (e.g. an archival move that failed
    /// after the upload itself committed).
    pub fn warning(&mut self, message: &str) {
        let line = format!("WARNING: {message}");
        warn!("{line}");
        self.lines.push(line);
    }

    /// All outcomes recorded so far, in processing order.
    pub fn outcomes(&self) -> &[UploadOutcome] {
        &self.outcomes
    }

    fn summary(&self) -> String {
        let count = |wanted: fn(&UploadStatus) -> bool| {
            self.outcomes.iter().filter(|o| wanted(&o.status)).count()
        };
        let uploaded = count(|s| matches!(s, UploadStatus::Uploaded));
        let skipped = count(|s| {
            matches!(s, UploadStatus::SkippedExisting | UploadStatus::SkippedUnidentified)
        });
        let failed = count(|s| matches!(s, UploadStatus::Failed(_)));
        format!(
            "Processed {} files: {uploaded} uploaded, {skipped} skipped, {failed} failed, \
             {} batch errors.",
            self.outcomes.len(),
            self.batch_errors
        )
    }

    /// Render the full report text.
    pub fn render(&self) -> String {
        let mut text = self.lines.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(&self.summary());
        text.push('\n');
        text
    }

    /// Write the rendered report to `<log_dir>/uvabs_log_{stamp}.txt`,
    /// creating the folder if needed. Returns the written path.
    pub fn write_to(&self, log_dir: &Path) -> anyhow::Result<PathBuf> {
        fs::create_dir_all(log_dir)?;
        let path = log_dir.join(format!("uvabs_log_{}.txt", run_stamp(&self.started)));
        fs::write(&path, self.render())?;
        Ok(path)
    }
}
