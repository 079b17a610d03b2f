//! CSV import for the labware identity map.
//!
//! The map is maintained outside this system (by the lab information
//! system) and shipped as a CSV export. Rows are appended as-is; duplicate
//! text ids are kept because the resolver must be able to report them as
//! ambiguous rather than silently picking one.

use crate::Database;
use rusqlite::params;

impl Database {
    /// Load labware id mappings from CSV string.
    ///
    /// Expected format (with headers): `LABWARE_TEXT_ID,WATER_SAMPLE_ID`
    ///
    /// # Example CSV
    /// ```text
    /// LABWARE_TEXT_ID,WATER_SAMPLE_ID
    /// NR-2019-00123,456
    /// ```
    pub fn load_labware_ids(&self, csv_data: &str) -> anyhow::Result<()> {
        let conn = self.conn.borrow();
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_data.as_bytes());

        let mut count = 0u32;
        let mut skipped = 0u32;
        for result in rdr.records() {
            let r = result?;
            let labware_text_id = r.get(0).unwrap_or("").trim();
            let water_sample_id: i64 = match r.get(1).unwrap_or("").trim().parse() {
                Ok(v) => v,
                Err(_) => {
                    skipped += 1;
                    continue;
                }
            };

            if labware_text_id.is_empty() {
                skipped += 1;
                continue;
            }

            conn.execute(
                "INSERT INTO labware_samples (labware_text_id, water_sample_id)
                 VALUES (?1, ?2)",
                params![labware_text_id, water_sample_id],
            )?;
            count += 1;
        }
        log::info!("Loaded {} labware id mappings, skipped {} invalid", count, skipped);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::Database;

    #[test]
    fn load_labware_ids_from_csv() {
        let db = Database::new().unwrap();
        let csv = "\
LABWARE_TEXT_ID,WATER_SAMPLE_ID
NR-2019-00123,456
NR-2019-00124,457
";
        db.load_labware_ids(csv).unwrap();

        let conn = db.conn.borrow();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM labware_samples", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);

        let id: i64 = conn
            .query_row(
                "SELECT water_sample_id FROM labware_samples WHERE labware_text_id = 'NR-2019-00124'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(id, 457);
    }

    #[test]
    fn load_labware_ids_keeps_duplicates() {
        let db = Database::new().unwrap();
        let csv = "\
LABWARE_TEXT_ID,WATER_SAMPLE_ID
NR-2019-00123,456
NR-2019-00123,999
";
        db.load_labware_ids(csv).unwrap();

        let conn = db.conn.borrow();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM labware_samples WHERE labware_text_id = 'NR-2019-00123'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 2, "Duplicates are how ambiguity is represented");
    }

    #[test]
    fn load_labware_ids_skips_bad_rows() {
        let db = Database::new().unwrap();
        let csv = "\
LABWARE_TEXT_ID,WATER_SAMPLE_ID
NR-2019-00123,456
NR-2019-00124,not-a-number
,457
";
        db.load_labware_ids(csv).unwrap();

        let conn = db.conn.borrow();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM labware_samples", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1, "Rows with missing id or non-numeric sample id are skipped");
    }
}
