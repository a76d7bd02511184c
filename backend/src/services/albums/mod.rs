//! # Album Service Module
//!
//! Aggregates the API endpoints for the album list: the JSON listing used by
//! the index page, the save endpoint behind the edit form, and the printable
//! album report.
//!
//! ## Sub-modules:
//! - `data`: year-filterable JSON listing of all albums.
//! - `save`: insert/update of a single album with per-field validation.
//! - `report`: renders the album list as a pdf using the stored report
//!   definition.

mod data;
mod report;
mod save;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

/// The base path for all album-related API endpoints.
const API_PATH: &str = "/api/albums";

/// Configures and returns the Actix `Scope` for all album-related routes.
///
/// # Registered Routes:
///
/// *   **`GET /data`**:
///     - **Handler**: `data::process`
///     - **Description**: Lists albums ordered by name, optionally filtered
///       by the `year` query parameter.
///
/// *   **`POST /save`**:
///     - **Handler**: `save::process`
///     - **Description**: Validates and persists an album. Validation
///       failures come back as a list of per-field errors so the edit form
///       can highlight every invalid field.
///
/// *   **`GET /report`**:
///     - **Handler**: `report::process`
///     - **Description**: Renders the (optionally year-filtered) album list
///       as a pdf document using the stored report definition.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/data", get().to(data::process))
        .route("/report", get().to(report::process))
        .route("/save", post().to(save::process))
}
