//! SQL schema definitions for the absorbance store.
//!
//! Contains CREATE TABLE statements for the identity map, the spectra
//! table and the append-only upload log. The schema is applied as a single
//! batch when the database is opened.

/// Returns the full SQL schema as a single batch string.
///
/// This creates the following tables:
///
/// - `labware_samples` - Map from labware text id to canonical water sample
///   id. Deliberately unconstrained: duplicate text ids are how an
///   ambiguous identity shows up, and the resolver must be able to see them.
/// - `absorbance_spectra` - Corrected spectra, one row per wavelength.
///   At most one 701-row spectrum per water sample id, enforced by the
///   delete-then-insert upload discipline rather than a constraint.
/// - `upload_log` - Append-only audit trail, one row per upload that
///   persisted data, regardless of repetition.
pub fn create_schema() -> &'static str {
    r#"
    CREATE TABLE IF NOT EXISTS labware_samples (
        labware_text_id TEXT NOT NULL,
        water_sample_id INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_labware_text_id ON labware_samples(labware_text_id);

    CREATE TABLE IF NOT EXISTS absorbance_spectra (
        water_sample_id INTEGER NOT NULL,
        method_id INTEGER NOT NULL,
        wavelength INTEGER NOT NULL,
        value REAL NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_spectra_sample ON absorbance_spectra(water_sample_id);

    CREATE TABLE IF NOT EXISTS upload_log (
        labware_text_id TEXT NOT NULL,
        water_sample_id INTEGER NOT NULL,
        year INTEGER NOT NULL,
        serial_no TEXT NOT NULL,
        blank_file TEXT NOT NULL,
        dilution REAL NOT NULL,
        cuvette_len_cm REAL NOT NULL,
        original_path TEXT NOT NULL,
        archive_path TEXT NOT NULL,
        uploaded_by TEXT NOT NULL,
        uploaded_at TEXT NOT NULL
    );

    "#
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn schema_is_valid_sql() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(create_schema())
            .expect("Schema SQL should be valid");
    }

    #[test]
    fn schema_creates_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(create_schema()).unwrap();

        let expected_tables = ["labware_samples", "absorbance_spectra", "upload_log"];

        for table in &expected_tables {
            let count: i64 = conn
                .query_row(
                    &format!(
                        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='{}'",
                        table
                    ),
                    [],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "Table '{}' should exist", table);
        }
    }

    #[test]
    fn schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(create_schema()).unwrap();
        // Applying schema a second time should not fail due to IF NOT EXISTS.
        conn.execute_batch(create_schema())
            .expect("Applying schema twice should succeed due to IF NOT EXISTS");
    }

    #[test]
    fn labware_map_allows_duplicate_text_ids() {
        // Ambiguity must be representable so the resolver can report it.
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(create_schema()).unwrap();
        conn.execute(
            "INSERT INTO labware_samples (labware_text_id, water_sample_id) VALUES ('NR-2019-00001', 1)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO labware_samples (labware_text_id, water_sample_id) VALUES ('NR-2019-00001', 2)",
            [],
        )
        .unwrap();
    }
}
