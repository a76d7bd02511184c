use serde::Deserialize;
use serde_json::{Map, Value};

/// Request payload for the album save endpoint: `{"album": {...}}`.
#[derive(Deserialize)]
pub struct SaveAlbumRequest {
    pub album: AlbumForm,
}

/// Raw album form fields. `id` and `year` arrive as whatever the form sent
/// (number, numeric string or empty string), so they are kept as `Value` and
/// parsed during validation.
#[derive(Deserialize)]
pub struct AlbumForm {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub year: Option<Value>,
    #[serde(default)]
    pub best_of_compilation: Option<bool>,
}

/// Body of the preview PUT request sent by the report designer. It carries
/// everything needed to render: the report definition, the data payload,
/// the requested output format and whether the data is designer test data.
#[derive(Deserialize)]
pub struct PreviewRequest {
    pub report: Map<String, Value>,
    pub data: Map<String, Value>,
    #[serde(rename = "isTestData")]
    pub is_test_data: bool,
    #[serde(rename = "outputFormat", default)]
    pub output_format: Option<String>,
}

/// Query string of the album listing and album report endpoints. An empty
/// `year` means no filter.
#[derive(Deserialize)]
pub struct AlbumListQuery {
    #[serde(default)]
    pub year: Option<String>,
}

/// Query string of the preview fetch request.
#[derive(Deserialize)]
pub struct PreviewFetchQuery {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(rename = "outputFormat", default)]
    pub output_format: Option<String>,
}
