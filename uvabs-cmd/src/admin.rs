//! Store maintenance commands: identity map import and log inspection.

use anyhow::Context;
use log::info;
use std::fs;
use std::path::Path;
use uvabs_db::Database;

/// Import the labware id map from a CSV export.
pub fn run_load_ids(db_path: &Path, csv_path: &Path) -> anyhow::Result<()> {
    let csv_data = fs::read_to_string(csv_path)
        .with_context(|| format!("reading id map '{}'", csv_path.display()))?;
    let db = Database::open(db_path)?;
    db.load_labware_ids(&csv_data)?;
    info!("Imported labware ids from '{}'", csv_path.display());
    Ok(())
}

/// Print the most recent upload log entries, newest first.
pub fn run_show_log(db_path: &Path, limit: usize) -> anyhow::Result<()> {
    let db = Database::open(db_path)?;
    let rows = db.recent_uploads(limit)?;
    if rows.is_empty() {
        println!("Upload log is empty.");
        return Ok(());
    }
    for row in rows {
        println!(
            "{}  {} -> {}  blank={}  dilution={}  cuvette={}cm  by {}",
            row.uploaded_at,
            row.labware_text_id,
            row.water_sample_id,
            row.blank_file,
            row.dilution,
            row.cuvette_len_cm,
            row.uploaded_by
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_ids_round_trips_through_a_file_backed_store() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("uvabs.sqlite");
        let csv_path = dir.path().join("ids.csv");
        fs::write(
            &csv_path,
            "LABWARE_TEXT_ID,WATER_SAMPLE_ID\nNR-2019-00123,456\n",
        )
        .unwrap();

        run_load_ids(&db_path, &csv_path).unwrap();

        let db = Database::open(&db_path).unwrap();
        assert_eq!(
            db.resolve_water_sample_id("NR-2019-00123").unwrap(),
            uvabs_spectra::identity::IdentityMatch::Found(456)
        );
    }

    #[test]
    fn load_ids_fails_on_missing_csv() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("uvabs.sqlite");
        let err = run_load_ids(&db_path, &dir.path().join("absent.csv")).unwrap_err();
        assert!(err.to_string().contains("absent.csv"));
    }
}
