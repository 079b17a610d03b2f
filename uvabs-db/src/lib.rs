//! SQLite persistence layer for corrected absorbance spectra.
//!
//! This crate wraps a SQLite database holding three logical tables: the
//! labware identity map, the corrected spectra (at most one 701-row
//! spectrum per water sample), and the append-only upload audit log.
//!
//! # Architecture
//!
//! - `Rc<RefCell<Connection>>` wrapper, cheaply cloneable, single-threaded
//!   (batch processing is sequential by design)
//! - File-backed via [`Database::open`] in production, in-memory via
//!   [`Database::new`] in tests
//! - Identity map imported from CSV via `load_labware_ids`
//! - Typed query methods; the delete-then-insert-then-log step runs inside
//!   one transaction so an upload can never leave a partial record
//!
//! # Usage
//!
//! ```rust
//! use uvabs_db::Database;
//!
//! let db = Database::new().unwrap();
//! db.load_labware_ids("LABWARE_TEXT_ID,WATER_SAMPLE_ID\nNR-2019-00123,456\n").unwrap();
//! let matched = db.resolve_water_sample_id("NR-2019-00123").unwrap();
//! ```
//!
//! # Tables
//!
//! See [`schema::create_schema`] for the full SQL schema.

pub mod schema;
mod loader;
mod queries;
pub mod models;

use rusqlite::Connection;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/// SQLite database holding the identity map, corrected spectra and the
/// upload audit log.
///
/// Cheaply cloneable (via `Rc`); processing is single-threaded, so no
/// further synchronization is needed.
#[derive(Clone)]
pub struct Database {
    conn: Rc<RefCell<Connection>>,
}

impl Database {
    /// Create a new in-memory database with the full schema applied.
    /// Used by tests; production runs open a file instead.
    pub fn new() -> anyhow::Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// Open (or create) a file-backed database with the schema applied.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    fn from_connection(conn: Connection) -> anyhow::Result<Self> {
        conn.execute_batch(schema::create_schema())?;
        Ok(Self {
            conn: Rc::new(RefCell::new(conn)),
        })
    }
}
