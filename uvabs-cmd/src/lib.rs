//! Command implementations for the UVABS CLI.
//!
//! Provides subcommands for processing raw spectrophotometer batches,
//! importing the labware identity map, and inspecting the upload log.

use clap::Subcommand;
use std::path::PathBuf;

pub mod admin;
pub mod process;
pub mod report;
pub mod upload;

#[derive(Subcommand)]
pub enum Command {
    /// Process raw batch folders and upload corrected spectra
    Process {
        /// Folder containing AB{yymmdd} batch folders
        #[arg(short, long)]
        data_dir: PathBuf,

        /// Path to the SQLite database file
        #[arg(long)]
        db: PathBuf,

        /// Replace existing records instead of skipping them
        #[arg(long)]
        force_update: bool,

        /// Cuvette length used by the instrument, in cm
        #[arg(long, default_value_t = 5.0)]
        cuvette_len_cm: f64,

        /// Method id recorded with every stored spectrum
        #[arg(long, default_value_t = 10666)]
        method_id: i64,

        /// Folder the run report is written into
        #[arg(long, default_value = "logs")]
        log_dir: PathBuf,
    },

    /// Import labware text id to water sample id mappings from CSV
    LoadIds {
        /// Path to the SQLite database file
        #[arg(long)]
        db: PathBuf,

        /// CSV file with LABWARE_TEXT_ID,WATER_SAMPLE_ID columns
        #[arg(long)]
        csv: PathBuf,
    },

    /// Show recent upload log entries
    Log {
        /// Path to the SQLite database file
        #[arg(long)]
        db: PathBuf,

        /// Maximum number of entries to show
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

pub fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Process {
            data_dir,
            db,
            force_update,
            cuvette_len_cm,
            method_id,
            log_dir,
        } => process::run_process(&process::ProcessOptions {
            data_dir,
            db_path: db,
            force_update,
            cuvette_len_cm,
            method_id,
            log_dir,
        }),
        Command::LoadIds { db, csv } => admin::run_load_ids(&db, &csv),
        Command::Log { db, limit } => admin::run_show_log(&db, limit),
    }
}
