use std::time::Instant;

use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use common::model::report::ReportDefinition;
use common::requests::PreviewRequest;
use log::info;
use rusqlite::Connection;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::report_cache;
use crate::reportgen::{OutputFormat, RenderError, Report};

/// Actix web handler for the `PUT /api/report/run` endpoint.
///
/// All data needed for a report preview is sent in this initial PUT request:
/// the output format, the report definition, the data (test data defined
/// within parameters in the designer) and the is-test-data flag.
///
/// A structurally broken definition comes back as `{"errors": [...]}` so the
/// designer can select the objects containing errors, highlight the erroneous
/// fields and display the messages. Otherwise the pdf is rendered, cached
/// under a fresh random key, and `key:<uuid>` is returned; the designer
/// downloads the artifact with a following GET carrying that key.
pub async fn process(body: web::Bytes, config: web::Data<AppConfig>) -> impl Responder {
    let request: PreviewRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(_) => return HttpResponse::BadRequest().body("invalid report values"),
    };
    if request
        .output_format
        .as_deref()
        .and_then(OutputFormat::parse)
        .is_none()
    {
        return HttpResponse::BadRequest().body("outputFormat parameter missing or invalid");
    }

    let definition: ReportDefinition =
        match serde_json::from_value(Value::Object(request.report.clone())) {
            Ok(definition) => definition,
            Err(e) => {
                return HttpResponse::BadRequest().body(format!("failed to initialize report: {}", e))
            }
        };

    let now = Utc::now();
    let report = Report::new(&definition, request.data.clone(), request.is_test_data);
    if !report.errors.is_empty() {
        return HttpResponse::Ok().json(json!({ "errors": report.errors }));
    }

    // the pdf is always generated and cached, even for a spreadsheet
    // preview; the following GET serves it or re-renders as csv
    let started = Instant::now();
    let pdf = match report.generate_pdf(&config.fonts_dir) {
        Ok(pdf) => pdf,
        Err(RenderError::Report(error)) => {
            return HttpResponse::Ok().json(json!({ "errors": [error] }));
        }
        Err(e) => {
            return HttpResponse::InternalServerError().body(format!("report exception: {}", e));
        }
    };
    info!("pdf generated in {:.3} seconds", started.elapsed().as_secs_f64());

    let serialized_definition = match serde_json::to_string(&definition) {
        Ok(serialized) => serialized,
        Err(e) => return HttpResponse::InternalServerError().body(e.to_string()),
    };
    let serialized_data = match serde_json::to_string(&request.data) {
        Ok(serialized) => serialized,
        Err(e) => return HttpResponse::InternalServerError().body(e.to_string()),
    };

    // cache the report request so the artifact can be downloaded by url
    // without any post parameters, identified only by the key
    let key = Uuid::new_v4().to_string();
    let cached = report_cache::ReportRequest {
        key: key.clone(),
        report_definition: serialized_definition,
        data: serialized_data,
        is_test_data: request.is_test_data,
        pdf_file_size: Some(pdf.len() as i64),
        pdf_file: Some(pdf),
        created_on: now,
    };
    let mut conn = match Connection::open(&config.db_path) {
        Ok(conn) => conn,
        Err(e) => return HttpResponse::ServiceUnavailable().body(e.to_string()),
    };
    if let Err(e) = report_cache::put(&mut conn, &cached) {
        return HttpResponse::ServiceUnavailable().body(e.to_string());
    }

    HttpResponse::Ok().body(format!("key:{}", key))
}
