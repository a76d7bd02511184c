use serde::{Deserialize, Serialize};

/// A single form-validation failure. The album save endpoint collects these
/// instead of failing on the first invalid field so the client can highlight
/// every field at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub msg: String,
}

impl FieldError {
    pub fn new(field: &str, msg: &str) -> Self {
        FieldError {
            field: field.to_string(),
            msg: msg.to_string(),
        }
    }
}

/// An error raised by the report engine for a specific object of the report
/// definition. `object_id` lets the designer client select the offending
/// element or parameter and highlight the named field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportError {
    pub object_id: i64,
    pub field: String,
    pub msg: String,
}
