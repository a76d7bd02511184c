use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The report-definition envelope as it travels over the wire and is stored
/// in the `report_definition` table.
///
/// Exactly five top-level fields are required; deserialization rejects a
/// payload where any of them is missing or has the wrong shape, and
/// re-serialization writes only these five keys, so unknown top-level keys
/// sent by a designer client are dropped on save. The elements themselves
/// stay opaque `Value`s at this layer; the report engine interprets them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDefinition {
    #[serde(rename = "docElements")]
    pub doc_elements: Vec<Value>,
    pub styles: Vec<Value>,
    pub parameters: Vec<Value>,
    #[serde(rename = "documentProperties")]
    pub document_properties: Map<String, Value>,
    pub version: i64,
}
