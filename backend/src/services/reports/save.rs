use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use common::model::report::ReportDefinition;
use rusqlite::{params, Connection};

use crate::config::AppConfig;
use crate::db;

/// Actix web handler for the `POST /api/report/save/{report_type}` endpoint,
/// called by the save button of the report designer.
///
/// The payload must carry the five envelope fields of a report definition;
/// anything else is rejected before touching the database. Only the albums
/// report type is supported. Saving re-serializes the envelope, so unknown
/// top-level keys are dropped, and upserts the single row for the type.
pub async fn process(
    report_type: web::Path<String>,
    body: web::Bytes,
    config: web::Data<AppConfig>,
) -> impl Responder {
    if report_type.as_str() != db::ALBUM_REPORT_TYPE {
        return HttpResponse::NotFound().body("report_type not supported");
    }
    let definition: ReportDefinition = match serde_json::from_slice(&body) {
        Ok(definition) => definition,
        Err(_) => return HttpResponse::BadRequest().body("invalid values"),
    };
    match store_definition(&config, &report_type, &definition) {
        Ok(()) => HttpResponse::Ok().body("ok"),
        Err(e) => HttpResponse::ServiceUnavailable()
            .body(format!("Error saving report definition: {}", e)),
    }
}

fn store_definition(
    config: &AppConfig,
    report_type: &str,
    definition: &ReportDefinition,
) -> Result<(), String> {
    let serialized = serde_json::to_string(definition).map_err(|e| e.to_string())?;
    let conn = Connection::open(&config.db_path).map_err(|e| e.to_string())?;
    // the UNIQUE constraint on report_type keeps this a single-row upsert
    // even under concurrent saves
    conn.execute(
        "INSERT INTO report_definition (report_type, report_definition, last_modified_at)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(report_type) DO UPDATE SET
             report_definition = excluded.report_definition,
             last_modified_at = excluded.last_modified_at",
        params![report_type, serialized, Utc::now().to_rfc3339()],
    )
    .map_err(|e| e.to_string())?;
    Ok(())
}
