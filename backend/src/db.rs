//! Schema setup and seeding, run once at startup.
//!
//! Tables are created idempotently and the bundled album-report template is
//! inserted when no `albums_report` definition exists yet. The UNIQUE
//! constraint on `report_type` makes the seed safe under concurrent first
//! starts and backs the upsert used by the report save endpoint.

use std::path::Path;

use chrono::Utc;
use include_dir::{include_dir, Dir};
use log::info;
use rusqlite::{params, Connection};

static STATIC_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/static");

/// The only report type this application ships.
pub const ALBUM_REPORT_TYPE: &str = "albums_report";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS album (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    artist TEXT NOT NULL,
    year INTEGER,
    best_of_compilation INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS report_definition (
    id INTEGER PRIMARY KEY,
    report_type TEXT NOT NULL UNIQUE,
    report_definition TEXT NOT NULL,
    remark TEXT,
    last_modified_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS report_request (
    id INTEGER PRIMARY KEY,
    key TEXT NOT NULL UNIQUE,
    report_definition TEXT NOT NULL,
    data TEXT NOT NULL,
    is_test_data INTEGER NOT NULL,
    pdf_file BLOB,
    pdf_file_size INTEGER,
    created_on INTEGER NOT NULL
);
";

/// Creates the schema and seeds the default album-report template.
pub fn init(db_path: &Path) -> Result<(), String> {
    let conn = Connection::open(db_path).map_err(|e| e.to_string())?;
    create_schema(&conn).map_err(|e| e.to_string())?;
    seed_album_report_template(&conn)?;
    Ok(())
}

pub(crate) fn create_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)
}

/// Inserts the bundled report template unless an `albums_report` row already
/// exists. A predefined template is used so the demo does not start with an
/// empty designer canvas.
fn seed_album_report_template(conn: &Connection) -> Result<(), String> {
    let template = STATIC_DIR
        .get_file("report_definition.json")
        .and_then(|file| file.contents_utf8())
        .ok_or("bundled report_definition.json missing or not UTF-8")?;

    let inserted = conn
        .execute(
            "INSERT OR IGNORE INTO report_definition (report_type, report_definition, last_modified_at)
             VALUES (?1, ?2, ?3)",
            params![ALBUM_REPORT_TYPE, template, Utc::now().to_rfc3339()],
        )
        .map_err(|e| e.to_string())?;
    if inserted > 0 {
        info!("seeded default {} template", ALBUM_REPORT_TYPE);
    }
    Ok(())
}
