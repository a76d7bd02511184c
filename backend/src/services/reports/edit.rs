use actix_web::{web, HttpResponse, Responder};
use rusqlite::{params, Connection};

use crate::config::AppConfig;
use crate::db;

/// Actix web handler for the `GET /api/report/edit` endpoint.
///
/// Returns the albums report definition stored in the `report_definition`
/// table, exactly as it was saved, so the designer can load it.
pub async fn process(config: web::Data<AppConfig>) -> impl Responder {
    match load_definition(&config) {
        Ok(definition) => HttpResponse::Ok()
            .content_type("application/json")
            .body(definition),
        Err(e) => HttpResponse::InternalServerError().body(e),
    }
}

fn load_definition(config: &AppConfig) -> Result<String, String> {
    let conn = Connection::open(&config.db_path).map_err(|e| e.to_string())?;
    conn.query_row(
        "SELECT report_definition FROM report_definition WHERE report_type = ?1",
        params![db::ALBUM_REPORT_TYPE],
        |row| row.get(0),
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => "no report_definition available".to_string(),
        e => e.to_string(),
    })
}
