use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use common::model::report::ReportDefinition;
use common::requests::AlbumListQuery;
use rusqlite::{params, Connection};
use serde_json::{Map, Value};

use crate::config::AppConfig;
use crate::db;
use crate::reportgen::Report;
use crate::services::albums::data::{get_albums, parse_year_filter};

/// Actix web handler for the `GET /api/albums/report` endpoint.
///
/// Prints a pdf file with all available albums, optionally filtered by year.
/// The report definition comes from the `report_definition` table (seeded at
/// startup); the data payload is assembled here.
///
/// # Returns
/// - `200 OK` with `application/pdf` bytes, served inline as `albums.pdf`.
/// - `400 Bad Request` when the `year` parameter is not an integer.
/// - `500 Internal Server Error` when the stored definition is missing or
///   invalid, or rendering fails.
pub async fn process(
    query: web::Query<AlbumListQuery>,
    config: web::Data<AppConfig>,
) -> impl Responder {
    let year = match parse_year_filter(query.year.as_deref()) {
        Ok(year) => year,
        Err(()) => return HttpResponse::BadRequest().body("invalid year parameter"),
    };
    match render_album_report(&config, year) {
        Ok(pdf) => HttpResponse::Ok()
            .content_type("application/pdf")
            .insert_header(("Content-Disposition", "inline; filename=\"albums.pdf\""))
            .body(pdf),
        Err(e) => HttpResponse::InternalServerError().body(e),
    }
}

fn render_album_report(config: &AppConfig, year: Option<i32>) -> Result<Vec<u8>, String> {
    let conn = Connection::open(&config.db_path).map_err(|e| e.to_string())?;
    let albums = get_albums(&conn, year).map_err(|e| e.to_string())?;

    let stored: String = conn
        .query_row(
            "SELECT report_definition FROM report_definition WHERE report_type = ?1",
            params![db::ALBUM_REPORT_TYPE],
            |row| row.get(0),
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => "no report_definition available".to_string(),
            e => e.to_string(),
        })?;
    let definition: ReportDefinition =
        serde_json::from_str(&stored).map_err(|e| format!("report error: {}", e))?;

    // these values must match the parameters declared in the report
    // definition, check name and type (number, date, list, ...) of those
    // parameters in the designer
    let mut data = Map::new();
    data.insert(
        "year".to_string(),
        year.map(|y| Value::from(y)).unwrap_or(Value::Null),
    );
    data.insert(
        "albums".to_string(),
        serde_json::to_value(&albums).map_err(|e| e.to_string())?,
    );
    data.insert(
        "current_date".to_string(),
        Value::from(Utc::now().format("%Y-%m-%d").to_string()),
    );

    let report = Report::new(&definition, data, false);
    if let Some(error) = report.errors.first() {
        // the stored definition should never contain errors, unless an
        // invalid report was saved without testing it in the designer
        return Err(format!("report error: {}", error.msg));
    }
    report
        .generate_pdf(&config.fonts_dir)
        .map_err(|e| format!("report error: {}", e))
}
