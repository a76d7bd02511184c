use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use common::model::report::ReportDefinition;
use common::requests::PreviewFetchQuery;
use rusqlite::Connection;
use serde_json::{Map, Value};

use crate::config::AppConfig;
use crate::report_cache;
use crate::reportgen::{OutputFormat, Report};

/// Actix web handler for the `GET /api/report/run` endpoint.
///
/// Serves a preview cached by an earlier PUT, identified by the `key` query
/// parameter. Pdf output is served straight from the cached bytes; csv output
/// is re-rendered from the cached definition and data. An unknown key, or one
/// that is not exactly the canonical length, means the preview has already
/// been evicted.
pub async fn process(
    query: web::Query<PreviewFetchQuery>,
    config: web::Data<AppConfig>,
) -> impl Responder {
    let format = match query
        .output_format
        .as_deref()
        .and_then(OutputFormat::parse)
    {
        Some(format) => format,
        None => {
            return HttpResponse::BadRequest().body("outputFormat parameter missing or invalid")
        }
    };

    let conn = match Connection::open(&config.db_path) {
        Ok(conn) => conn,
        Err(e) => return HttpResponse::ServiceUnavailable().body(e.to_string()),
    };
    let cached = match report_cache::get(&conn, query.key.as_deref().unwrap_or("")) {
        Ok(Some(cached)) => cached,
        Ok(None) => {
            return HttpResponse::BadRequest()
                .body("report not found (preview probably too old), update report preview and try again")
        }
        Err(e) => return HttpResponse::ServiceUnavailable().body(e.to_string()),
    };

    let bytes = match format {
        OutputFormat::Pdf => match cached.pdf_file.clone() {
            Some(pdf) => pdf,
            // the pdf is always stored along the other report data; this
            // re-render only matters if the blob column is ever cleared
            // instead of deleting whole rows
            None => match rebuild_report(&cached).and_then(|report| {
                report
                    .generate_pdf(&config.fonts_dir)
                    .map_err(|_| "error generating report".to_string())
            }) {
                Ok(pdf) => pdf,
                Err(e) => return HttpResponse::BadRequest().body(e),
            },
        },
        OutputFormat::Csv => match rebuild_report(&cached)
            .and_then(|report| report.generate_spreadsheet().map_err(|_| "error generating report".to_string()))
        {
            Ok(csv) => csv,
            Err(e) => return HttpResponse::BadRequest().body(e),
        },
    };

    let filename = format!(
        "report-{}.{}",
        Utc::now().format("%Y%m%d%H%M%S"),
        format.file_extension()
    );
    HttpResponse::Ok()
        .content_type(format.content_type())
        .insert_header((
            "Content-Disposition",
            format!("inline; filename=\"{}\"", filename),
        ))
        .body(bytes)
}

/// Reconstructs a report from the cached definition and data.
fn rebuild_report(cached: &report_cache::ReportRequest) -> Result<Report, String> {
    let definition: ReportDefinition =
        serde_json::from_str(&cached.report_definition).map_err(|_| "error generating report".to_string())?;
    let data: Map<String, Value> =
        serde_json::from_str(&cached.data).map_err(|_| "error generating report".to_string())?;
    let report = Report::new(&definition, data, cached.is_test_data);
    if report.errors.is_empty() {
        Ok(report)
    } else {
        Err("error generating report".to_string())
    }
}
