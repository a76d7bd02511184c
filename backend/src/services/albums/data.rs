use actix_web::{web, HttpResponse, Responder};
use common::model::album::Album;
use common::requests::AlbumListQuery;
use rusqlite::{params, Connection};

use crate::config::AppConfig;

/// Actix web handler for the `GET /api/albums/data` endpoint.
///
/// Returns the available albums from the database as a JSON array, optionally
/// filtered by year. Called from the album index page whenever the year input
/// changes.
///
/// # Returns
/// - `200 OK` with a JSON array of albums on success.
/// - `400 Bad Request` when the `year` parameter is not an integer.
pub async fn process(
    query: web::Query<AlbumListQuery>,
    config: web::Data<AppConfig>,
) -> impl Responder {
    let year = match parse_year_filter(query.year.as_deref()) {
        Ok(year) => year,
        Err(()) => return HttpResponse::BadRequest().body("invalid year parameter"),
    };
    match list_albums(&config, year) {
        Ok(albums) => HttpResponse::Ok().json(albums),
        Err(e) => {
            HttpResponse::ServiceUnavailable().body(format!("Error listing albums: {}", e))
        }
    }
}

/// Interprets the raw `year` query value: absent or empty means no filter,
/// anything else must parse as an integer.
pub(crate) fn parse_year_filter(raw: Option<&str>) -> Result<Option<i32>, ()> {
    match raw {
        Some(text) if !text.is_empty() => text.parse::<i32>().map(Some).map_err(|_| ()),
        _ => Ok(None),
    }
}

fn list_albums(config: &AppConfig, year: Option<i32>) -> Result<Vec<Album>, String> {
    let conn = Connection::open(&config.db_path).map_err(|e| e.to_string())?;
    get_albums(&conn, year).map_err(|e| e.to_string())
}

/// Returns available albums ordered by name, optionally filtered by year.
/// Shared with the album report, which prints the same listing.
pub(crate) fn get_albums(conn: &Connection, year: Option<i32>) -> rusqlite::Result<Vec<Album>> {
    match year {
        Some(year) => {
            let mut stmt = conn.prepare(
                "SELECT id, name, artist, year, best_of_compilation
                 FROM album WHERE year = ?1 ORDER BY name",
            )?;
            let rows = stmt.query_map(params![year], row_to_album)?;
            rows.collect()
        }
        None => {
            let mut stmt = conn.prepare(
                "SELECT id, name, artist, year, best_of_compilation
                 FROM album ORDER BY name",
            )?;
            let rows = stmt.query_map([], row_to_album)?;
            rows.collect()
        }
    }
}

fn row_to_album(row: &rusqlite::Row) -> rusqlite::Result<Album> {
    Ok(Album {
        id: row.get(0)?,
        name: row.get(1)?,
        artist: row.get(2)?,
        year: row.get(3)?,
        best_of_compilation: row.get(4)?,
    })
}
