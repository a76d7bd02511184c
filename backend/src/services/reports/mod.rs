//! # Report Service Module
//!
//! Endpoints backing the report designer: loading and saving the report
//! template, and the preview workflow (render + cache on PUT, download by
//! key on GET).
//!
//! ## Sub-modules:
//! - `edit`: returns the stored report definition for the designer.
//! - `save`: persists a report definition (upsert per report type).
//! - `preview_create`: renders a preview, caches the pdf bytes and returns
//!   the download key.
//! - `preview_fetch`: serves a cached preview by key, re-rendering for
//!   spreadsheet output.

mod edit;
mod preview_create;
mod preview_fetch;
mod save;

use actix_web::http::Method;
use actix_web::web::{get, method, post, put, scope};
use actix_web::{HttpResponse, Responder, Scope};

/// The base path for all report-related API endpoints.
const API_PATH: &str = "/api/report";

/// Configures and returns the Actix `Scope` for all report-related routes.
///
/// # Registered Routes:
///
/// *   **`GET /edit`**:
///     - **Handler**: `edit::process`
///     - **Description**: Loads the stored albums report definition for the
///       designer.
///
/// *   **`PUT /run`**:
///     - **Handler**: `preview_create::process`
///     - **Description**: Renders a preview from the submitted definition
///       and data, caches the result and returns `key:<uuid>`.
///
/// *   **`GET /run`**:
///     - **Handler**: `preview_fetch::process`
///     - **Description**: Downloads a cached preview by key, as pdf or csv.
///
/// *   **`OPTIONS /run`**:
///     - **Handler**: `preflight`
///     - **Description**: CORS preflight for the cross-origin designer.
///
/// *   **`POST /save/{report_type}`**:
///     - **Handler**: `save::process`
///     - **Description**: Persists the report definition for the given type.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/edit", get().to(edit::process))
        .route("/run", put().to(preview_create::process))
        .route("/run", get().to(preview_fetch::process))
        .route("/run", method(Method::OPTIONS).to(preflight))
        .route("/save/{report_type}", post().to(save::process))
}

/// The preflight request is sent by the browser for a cross-site request;
/// only the Access-Control-Allow headers matter so the browser sends the
/// following GET/PUT request.
async fn preflight() -> impl Responder {
    HttpResponse::Ok()
        .insert_header(("Access-Control-Allow-Origin", "*"))
        .insert_header(("Access-Control-Allow-Methods", "GET, PUT, OPTIONS"))
        .insert_header((
            "Access-Control-Allow-Headers",
            "Origin, X-Requested-With, X-HTTP-Method-Override, Content-Type, Accept, Authorization, Z-Key",
        ))
        .finish()
}
