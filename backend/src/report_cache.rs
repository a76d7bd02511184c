//! Short-lived storage for generated report previews.
//!
//! The report designer requests the same rendered output twice: once when the
//! preview is created (to check for errors) and once to download it. Rows in
//! `report_request` bridge the two requests and are disposable afterwards.
//!
//! Eviction runs inside the same transaction as every insert: rows older than
//! [`ENTRY_MAX_AGE_SECONDS`] are always dropped, and when the stored PDF
//! bytes still exceed [`MAX_CACHE_SIZE`] everything older than
//! [`SHRINK_MAX_AGE_SECONDS`] goes too. This is a blunt full-table sweep
//! rather than LRU; entries only live for minutes.

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension, Transaction};

/// Keep at most 1000 MB of generated pdf files in the database.
pub const MAX_CACHE_SIZE: i64 = 1000 * 1024 * 1024;

/// Canonical length of a cache key (hyphenated UUIDv4).
pub const KEY_LENGTH: usize = 36;

const ENTRY_MAX_AGE_SECONDS: i64 = 3 * 60;
const SHRINK_MAX_AGE_SECONDS: i64 = 10;

/// One cached preview: the submitted definition and data plus the rendered
/// pdf bytes, keyed by a random identifier handed back to the designer.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub key: String,
    pub report_definition: String,
    pub data: String,
    pub is_test_data: bool,
    pub pdf_file: Option<Vec<u8>>,
    pub pdf_file_size: Option<i64>,
    pub created_on: DateTime<Utc>,
}

/// Evicts stale rows and inserts `request`, atomically. `request.created_on`
/// is the reference time for the eviction sweep.
pub fn put(conn: &mut Connection, request: &ReportRequest) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;
    evict(&tx, request.created_on)?;
    tx.execute(
        "INSERT INTO report_request
             (key, report_definition, data, is_test_data, pdf_file, pdf_file_size, created_on)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            request.key,
            request.report_definition,
            request.data,
            request.is_test_data,
            request.pdf_file,
            request.pdf_file_size,
            request.created_on.timestamp_millis(),
        ],
    )?;
    tx.commit()
}

/// Looks up a cached preview. Returns `None` when the key is unknown or is
/// not exactly [`KEY_LENGTH`] characters; callers report that as a stale
/// preview.
pub fn get(conn: &Connection, key: &str) -> rusqlite::Result<Option<ReportRequest>> {
    if key.len() != KEY_LENGTH {
        return Ok(None);
    }
    conn.query_row(
        "SELECT key, report_definition, data, is_test_data, pdf_file, pdf_file_size, created_on
         FROM report_request WHERE key = ?1",
        params![key],
        row_to_request,
    )
    .optional()
}

fn row_to_request(row: &rusqlite::Row) -> rusqlite::Result<ReportRequest> {
    let millis: i64 = row.get(6)?;
    Ok(ReportRequest {
        key: row.get(0)?,
        report_definition: row.get(1)?,
        data: row.get(2)?,
        is_test_data: row.get(3)?,
        pdf_file: row.get(4)?,
        pdf_file_size: row.get(5)?,
        created_on: DateTime::from_timestamp_millis(millis).unwrap_or_default(),
    })
}

fn evict(tx: &Transaction<'_>, now: DateTime<Utc>) -> rusqlite::Result<()> {
    // delete old reports to avoid the table getting too big
    let expired = (now - Duration::seconds(ENTRY_MAX_AGE_SECONDS)).timestamp_millis();
    tx.execute(
        "DELETE FROM report_request WHERE created_on < ?1",
        params![expired],
    )?;

    let total_size: i64 = tx.query_row(
        "SELECT COALESCE(SUM(pdf_file_size), 0) FROM report_request",
        [],
        |row| row.get(0),
    )?;
    if total_size > MAX_CACHE_SIZE {
        // delete all reports older than 10 seconds to reduce db size
        let cutoff = (now - Duration::seconds(SHRINK_MAX_AGE_SECONDS)).timestamp_millis();
        tx.execute(
            "DELETE FROM report_request WHERE created_on < ?1",
            params![cutoff],
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        db::create_schema(&conn).unwrap();
        conn
    }

    fn request(key: &str, size: i64, created_on: DateTime<Utc>) -> ReportRequest {
        ReportRequest {
            key: key.to_string(),
            report_definition: "{}".to_string(),
            data: "{}".to_string(),
            is_test_data: true,
            pdf_file: Some(vec![0u8; 4]),
            pdf_file_size: Some(size),
            created_on,
        }
    }

    fn key(n: u8) -> String {
        // 36 chars, like a hyphenated uuid
        format!("00000000-0000-0000-0000-0000000000{:02}", n)
    }

    fn row_count(conn: &Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM report_request", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn put_then_get_roundtrip() {
        let mut conn = test_conn();
        let now = Utc::now();
        put(&mut conn, &request(&key(1), 4, now)).unwrap();

        let cached = get(&conn, &key(1)).unwrap().expect("row present");
        assert_eq!(cached.key, key(1));
        assert_eq!(cached.pdf_file_size, Some(4));
        assert_eq!(cached.pdf_file, Some(vec![0u8; 4]));
        assert!(cached.is_test_data);
        assert_eq!(cached.created_on.timestamp_millis(), now.timestamp_millis());
    }

    #[test]
    fn get_rejects_non_canonical_key_length() {
        let mut conn = test_conn();
        let now = Utc::now();
        put(&mut conn, &request(&key(1), 4, now)).unwrap();

        assert!(get(&conn, "short").unwrap().is_none());
        assert!(get(&conn, "").unwrap().is_none());
        let too_long = format!("{}0", key(1));
        assert!(get(&conn, &too_long).unwrap().is_none());
    }

    #[test]
    fn get_unknown_key_is_none() {
        let conn = test_conn();
        assert!(get(&conn, &key(9)).unwrap().is_none());
    }

    #[test]
    fn put_evicts_rows_older_than_entry_ttl() {
        let mut conn = test_conn();
        let start = Utc::now();
        put(&mut conn, &request(&key(1), 4, start)).unwrap();

        // four minutes later the first row is past the 3 minute TTL
        let later = start + Duration::minutes(4);
        put(&mut conn, &request(&key(2), 4, later)).unwrap();

        assert!(get(&conn, &key(1)).unwrap().is_none());
        assert!(get(&conn, &key(2)).unwrap().is_some());
        assert_eq!(row_count(&conn), 1);
    }

    #[test]
    fn put_shrinks_cache_when_over_size_budget() {
        let mut conn = test_conn();
        let start = Utc::now();
        let big = 600 * 1024 * 1024;
        put(&mut conn, &request(&key(1), big, start)).unwrap();
        put(&mut conn, &request(&key(2), big, start + Duration::seconds(20))).unwrap();

        // cumulative size is 1200 MB; the next write must drop everything
        // older than the 10 second shrink TTL
        put(&mut conn, &request(&key(3), 4, start + Duration::seconds(25))).unwrap();

        assert!(get(&conn, &key(1)).unwrap().is_none());
        assert!(get(&conn, &key(2)).unwrap().is_some());
        assert!(get(&conn, &key(3)).unwrap().is_some());
        assert_eq!(row_count(&conn), 2);
    }

    #[test]
    fn put_keeps_rows_under_size_budget() {
        let mut conn = test_conn();
        let start = Utc::now();
        put(&mut conn, &request(&key(1), 1024, start)).unwrap();
        put(&mut conn, &request(&key(2), 1024, start + Duration::seconds(20))).unwrap();

        assert_eq!(row_count(&conn), 2);
    }
}
