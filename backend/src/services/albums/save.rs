use actix_web::{web, HttpResponse, Responder};
use common::model::error::FieldError;
use common::requests::{AlbumForm, SaveAlbumRequest};
use rusqlite::{params, Connection};
use serde_json::{json, Value};

use crate::config::AppConfig;

/// Validated album fields, ready to be written.
struct AlbumValues {
    name: String,
    artist: String,
    year: Option<i32>,
    best_of_compilation: bool,
}

/// Actix web handler for the `POST /api/albums/save` endpoint.
///
/// Expects `{"album": {...}}`. Field validation accumulates every failure
/// instead of stopping at the first one, so the edit form can highlight all
/// invalid fields at once; nothing is written unless the whole form is valid.
/// The error list is returned with `200 OK` either way.
pub async fn process(body: web::Bytes, config: web::Data<AppConfig>) -> impl Responder {
    let request: SaveAlbumRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(_) => return HttpResponse::BadRequest().body("invalid values"),
    };
    let album_id = match parse_album_id(&request.album) {
        Ok(album_id) => album_id,
        Err(()) => return HttpResponse::BadRequest().body("invalid album id"),
    };

    match validate_album(&request.album) {
        Ok(values) => {
            if let Err(e) = save_album(&config, album_id, &values) {
                return HttpResponse::ServiceUnavailable()
                    .body(format!("Error saving album: {}", e));
            }
            HttpResponse::Ok().json(json!({ "errors": [] }))
        }
        Err(errors) => HttpResponse::Ok().json(json!({ "errors": errors })),
    }
}

/// The album id may arrive as a number, a numeric string, or an empty string
/// (new album). Anything else is a malformed request.
fn parse_album_id(form: &AlbumForm) -> Result<Option<i64>, ()> {
    match &form.id {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) if text.is_empty() => Ok(None),
        Some(Value::String(text)) => text.parse::<i64>().map(Some).map_err(|_| ()),
        Some(Value::Number(number)) => number.as_i64().map(Some).ok_or(()),
        Some(_) => Err(()),
    }
}

/// Basic form validation: either every field is usable or the full list of
/// per-field errors comes back.
fn validate_album(form: &AlbumForm) -> Result<AlbumValues, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = match form.name.as_deref() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            errors.push(FieldError::new("name", "the field must not be empty"));
            String::new()
        }
    };
    let artist = match form.artist.as_deref() {
        Some(artist) if !artist.is_empty() => artist.to_string(),
        _ => {
            errors.push(FieldError::new("artist", "the field must not be empty"));
            String::new()
        }
    };
    let year = match parse_year(form.year.as_ref()) {
        Ok(year) => {
            if let Some(year) = year {
                if !(1900..=2100).contains(&year) {
                    errors.push(FieldError::new("year", "the field must contain a valid year"));
                }
            }
            year
        }
        Err(()) => {
            errors.push(FieldError::new("year", "the field must contain a number"));
            None
        }
    };

    if errors.is_empty() {
        Ok(AlbumValues {
            name,
            artist,
            year,
            best_of_compilation: form.best_of_compilation.unwrap_or(false),
        })
    } else {
        Err(errors)
    }
}

fn parse_year(raw: Option<&Value>) -> Result<Option<i32>, ()> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) if text.is_empty() => Ok(None),
        Some(Value::String(text)) => text.parse::<i32>().map(Some).map_err(|_| ()),
        Some(Value::Number(number)) => number
            .as_i64()
            .and_then(|year| i32::try_from(year).ok())
            .map(Some)
            .ok_or(()),
        Some(_) => Err(()),
    }
}

fn save_album(
    config: &AppConfig,
    album_id: Option<i64>,
    values: &AlbumValues,
) -> Result<(), String> {
    let conn = Connection::open(&config.db_path).map_err(|e| e.to_string())?;
    match album_id {
        Some(album_id) => conn
            .execute(
                "UPDATE album SET name = ?1, artist = ?2, year = ?3, best_of_compilation = ?4
                 WHERE id = ?5",
                params![
                    values.name,
                    values.artist,
                    values.year,
                    values.best_of_compilation,
                    album_id
                ],
            )
            .map_err(|e| e.to_string())?,
        None => conn
            .execute(
                "INSERT INTO album (name, artist, year, best_of_compilation)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    values.name,
                    values.artist,
                    values.year,
                    values.best_of_compilation
                ],
            )
            .map_err(|e| e.to_string())?,
    };
    Ok(())
}
