//! The embedded report engine.
//!
//! A [`Report`] is built fresh per request from a report-definition envelope
//! and a data payload. Construction collects structural errors (duplicate
//! parameter names, unknown references, unrecognized element types) into
//! [`Report::errors`] so the designer client can highlight the offending
//! objects. Rendering to pdf or csv happens afterwards and may fail with a
//! [`RenderError`] carrying a single report error; nothing is retried and no
//! state survives between calls.

mod model;
mod pdf;
mod spreadsheet;

pub use model::*;

use std::collections::{HashMap, HashSet};
use std::path::Path;

use common::model::error::ReportError;
use common::model::report::ReportDefinition;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    /// A fault in the submitted definition or data, tied to an object id so
    /// the designer can localize it.
    #[error("{}", .0.msg)]
    Report(ReportError),
    /// An engine-side failure (fonts, pdf backend, output encoding).
    #[error("{0}")]
    Internal(String),
}

/// Output formats the engine can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pdf,
    Csv,
}

impl OutputFormat {
    pub fn parse(raw: &str) -> Option<OutputFormat> {
        match raw {
            "pdf" => Some(OutputFormat::Pdf),
            "csv" => Some(OutputFormat::Csv),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "application/pdf",
            OutputFormat::Csv => "text/csv",
        }
    }

    pub fn file_extension(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Csv => "csv",
        }
    }
}

pub struct Report {
    elements: Vec<DocElement>,
    styles: HashMap<i64, Style>,
    parameters: Vec<Parameter>,
    document_properties: DocumentProperties,
    data: Map<String, Value>,
    is_test_data: bool,
    /// Structural errors found while interpreting the definition. A report
    /// with errors must not be rendered.
    pub errors: Vec<ReportError>,
}

impl Report {
    /// Interprets the envelope against the engine's element and parameter
    /// model. Never fails outright; everything the engine cannot make sense
    /// of ends up in [`Report::errors`].
    pub fn new(definition: &ReportDefinition, data: Map<String, Value>, is_test_data: bool) -> Report {
        let mut errors = Vec::new();

        let mut styles = HashMap::new();
        for value in &definition.styles {
            match serde_json::from_value::<Style>(value.clone()) {
                Ok(style) => {
                    styles.insert(style.id, style);
                }
                Err(e) => errors.push(ReportError {
                    object_id: object_id_of(value),
                    field: "styles".to_string(),
                    msg: format!("invalid style: {}", e),
                }),
            }
        }

        let mut parameters: Vec<Parameter> = Vec::new();
        let mut seen_names = HashSet::new();
        for value in &definition.parameters {
            match serde_json::from_value::<Parameter>(value.clone()) {
                Ok(parameter) => {
                    if !seen_names.insert(parameter.name.clone()) {
                        errors.push(ReportError {
                            object_id: parameter.id,
                            field: "name".to_string(),
                            msg: format!("duplicate parameter name '{}'", parameter.name),
                        });
                    }
                    parameters.push(parameter);
                }
                Err(e) => errors.push(ReportError {
                    object_id: object_id_of(value),
                    field: "parameters".to_string(),
                    msg: format!("invalid parameter: {}", e),
                }),
            }
        }

        let document_properties = match serde_json::from_value::<DocumentProperties>(Value::Object(
            definition.document_properties.clone(),
        )) {
            Ok(properties) => properties,
            Err(e) => {
                errors.push(ReportError {
                    object_id: 0,
                    field: "documentProperties".to_string(),
                    msg: format!("invalid document properties: {}", e),
                });
                DocumentProperties::default()
            }
        };

        let mut elements = Vec::new();
        for value in &definition.doc_elements {
            match serde_json::from_value::<DocElement>(value.clone()) {
                Ok(element) => elements.push(element),
                Err(e) => errors.push(ReportError {
                    object_id: object_id_of(value),
                    field: "elementType".to_string(),
                    msg: format!("invalid element: {}", e),
                }),
            }
        }

        let mut report = Report {
            elements,
            styles,
            parameters,
            document_properties,
            data,
            is_test_data,
            errors,
        };
        report.check_references();
        report
    }

    pub fn generate_pdf(&self, fonts_dir: &Path) -> Result<Vec<u8>, RenderError> {
        pdf::generate(self, fonts_dir)
    }

    pub fn generate_spreadsheet(&self) -> Result<Vec<u8>, RenderError> {
        spreadsheet::generate(self)
    }

    /// Verifies that every placeholder, data source and column field resolves
    /// against the declared parameters.
    fn check_references(&mut self) {
        let mut errors = Vec::new();
        for element in &self.elements {
            match element {
                DocElement::Text(text) => {
                    for name in placeholder_names(&text.content) {
                        match self.parameter(&name) {
                            None => errors.push(ReportError {
                                object_id: text.id,
                                field: "content".to_string(),
                                msg: format!("parameter '{}' not found", name),
                            }),
                            Some(parameter) if parameter.parameter_type == ParameterType::List => {
                                errors.push(ReportError {
                                    object_id: text.id,
                                    field: "content".to_string(),
                                    msg: format!("list parameter '{}' cannot be used in text content", name),
                                })
                            }
                            Some(_) => {}
                        }
                    }
                }
                DocElement::Table(table) => match self.parameter(&table.data_source) {
                    None => errors.push(ReportError {
                        object_id: table.id,
                        field: "dataSource".to_string(),
                        msg: format!("parameter '{}' not found", table.data_source),
                    }),
                    Some(parameter) if parameter.parameter_type != ParameterType::List => {
                        errors.push(ReportError {
                            object_id: table.id,
                            field: "dataSource".to_string(),
                            msg: format!("parameter '{}' is not a list", table.data_source),
                        })
                    }
                    Some(parameter) => {
                        for column in &table.columns {
                            if !parameter.children.iter().any(|child| child.name == column.field) {
                                errors.push(ReportError {
                                    object_id: table.id,
                                    field: "columns".to_string(),
                                    msg: format!(
                                        "field '{}' not defined for list parameter '{}'",
                                        column.field, table.data_source
                                    ),
                                });
                            }
                        }
                    }
                },
                DocElement::PageBreak(_) => {}
            }
        }
        self.errors.extend(errors);
    }

    fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|parameter| parameter.name == name)
    }

    pub(super) fn elements(&self) -> &[DocElement] {
        &self.elements
    }

    pub(super) fn document_properties(&self) -> &DocumentProperties {
        &self.document_properties
    }

    pub(super) fn style(&self, id: i64) -> Option<&Style> {
        self.styles.get(&id)
    }

    /// Substitutes every `${name}` in a text element's content with the
    /// display value of the named parameter.
    pub(super) fn fill_placeholders(&self, element: &TextElement) -> Result<String, RenderError> {
        let placeholder = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
            .map_err(|e| RenderError::Internal(format!("placeholder regex: {}", e)))?;
        let content = &element.content;
        let mut filled = String::with_capacity(content.len());
        let mut last_end = 0;
        for captures in placeholder.captures_iter(content) {
            let whole = captures.get(0).ok_or_else(|| {
                RenderError::Internal("placeholder match without range".to_string())
            })?;
            filled.push_str(&content[last_end..whole.start()]);
            filled.push_str(&self.scalar_value(&captures[1], element.id)?);
            last_end = whole.end();
        }
        filled.push_str(&content[last_end..]);
        Ok(filled)
    }

    fn scalar_value(&self, name: &str, element_id: i64) -> Result<String, RenderError> {
        let parameter = self.parameter(name).ok_or_else(|| {
            RenderError::Report(ReportError {
                object_id: element_id,
                field: "content".to_string(),
                msg: format!("parameter '{}' not found", name),
            })
        })?;
        let value = self.data.get(name).ok_or_else(|| {
            RenderError::Report(ReportError {
                object_id: parameter.id,
                field: "name".to_string(),
                msg: format!("no data supplied for parameter '{}'", name),
            })
        })?;
        self.display_value(parameter, value)
    }

    /// Rows of the list parameter backing a table element.
    pub(super) fn table_rows(
        &self,
        table: &TableElement,
    ) -> Result<(&Parameter, Vec<&Map<String, Value>>), RenderError> {
        let parameter = self.parameter(&table.data_source).ok_or_else(|| {
            RenderError::Report(ReportError {
                object_id: table.id,
                field: "dataSource".to_string(),
                msg: format!("parameter '{}' not found", table.data_source),
            })
        })?;
        let value = self.data.get(&table.data_source).ok_or_else(|| {
            RenderError::Report(ReportError {
                object_id: parameter.id,
                field: "name".to_string(),
                msg: format!("no data supplied for parameter '{}'", table.data_source),
            })
        })?;
        let items = value.as_array().ok_or_else(|| {
            RenderError::Report(ReportError {
                object_id: parameter.id,
                field: "name".to_string(),
                msg: format!("data for list parameter '{}' is not an array", table.data_source),
            })
        })?;
        let mut rows = Vec::with_capacity(items.len());
        for item in items {
            rows.push(item.as_object().ok_or_else(|| {
                RenderError::Report(ReportError {
                    object_id: parameter.id,
                    field: "name".to_string(),
                    msg: format!("row of list parameter '{}' is not an object", table.data_source),
                })
            })?);
        }
        Ok((parameter, rows))
    }

    /// Display value of one table cell.
    pub(super) fn cell_value(
        &self,
        table: &TableElement,
        parameter: &Parameter,
        column: &TableColumn,
        row: &Map<String, Value>,
    ) -> Result<String, RenderError> {
        let child = parameter
            .children
            .iter()
            .find(|child| child.name == column.field)
            .ok_or_else(|| {
                RenderError::Report(ReportError {
                    object_id: table.id,
                    field: "columns".to_string(),
                    msg: format!(
                        "field '{}' not defined for list parameter '{}'",
                        column.field, table.data_source
                    ),
                })
            })?;
        let value = row.get(&column.field).ok_or_else(|| {
            RenderError::Report(ReportError {
                object_id: table.id,
                field: "columns".to_string(),
                msg: format!("row is missing field '{}'", column.field),
            })
        })?;
        self.display_value(child, value)
    }

    /// Formats a data value according to the declared parameter type. With
    /// test data, scalar values submitted as strings are coerced first; the
    /// designer serializes its sample values stringly.
    fn display_value(&self, parameter: &Parameter, value: &Value) -> Result<String, RenderError> {
        let type_error = |expected: &str| {
            RenderError::Report(ReportError {
                object_id: parameter.id,
                field: "type".to_string(),
                msg: format!("value for parameter '{}' is not a {}", parameter.name, expected),
            })
        };

        if value.is_null() {
            return Ok(String::new());
        }
        match parameter.parameter_type {
            ParameterType::String => match value {
                Value::String(text) => Ok(text.clone()),
                Value::Number(number) => Ok(number.to_string()),
                Value::Bool(flag) => Ok(flag.to_string()),
                _ => Err(type_error("string")),
            },
            ParameterType::Number => match value {
                Value::Number(number) => Ok(number.to_string()),
                Value::String(text) if self.is_test_data => text
                    .trim()
                    .parse::<f64>()
                    .map(format_number)
                    .map_err(|_| type_error("number")),
                _ => Err(type_error("number")),
            },
            ParameterType::Boolean => match value {
                Value::Bool(flag) => Ok(flag.to_string()),
                Value::String(text) if self.is_test_data => match text.as_str() {
                    "true" => Ok("true".to_string()),
                    "false" => Ok("false".to_string()),
                    _ => Err(type_error("boolean")),
                },
                _ => Err(type_error("boolean")),
            },
            ParameterType::Date => match value {
                Value::String(text) => parse_date(text).ok_or_else(|| type_error("date")),
                _ => Err(type_error("date")),
            },
            ParameterType::List => Err(type_error("scalar")),
        }
    }
}

fn format_number(number: f64) -> String {
    if number.fract() == 0.0 {
        format!("{}", number as i64)
    } else {
        format!("{}", number)
    }
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time part, and renders the
/// date portion.
fn parse_date(text: &str) -> Option<String> {
    let date_part = text.get(..10)?;
    chrono::NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .ok()
        .map(|date| date.format("%Y-%m-%d").to_string())
}

fn placeholder_names(content: &str) -> Vec<String> {
    match Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}") {
        Ok(placeholder) => placeholder
            .captures_iter(content)
            .map(|captures| captures[1].to_string())
            .collect(),
        Err(_) => Vec::new(),
    }
}

fn object_id_of(value: &Value) -> i64 {
    value.get("id").and_then(Value::as_i64).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn definition(value: Value) -> ReportDefinition {
        serde_json::from_value(value).expect("valid envelope")
    }

    fn data(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("data fixture must be an object"),
        }
    }

    fn album_definition() -> ReportDefinition {
        definition(json!({
            "docElements": [
                {"elementType": "text", "id": 1, "content": "Albums of ${year}", "bold": true},
                {"elementType": "table", "id": 2, "dataSource": "albums", "columns": [
                    {"title": "Name", "field": "name"},
                    {"title": "Artist", "field": "artist"}
                ]}
            ],
            "styles": [],
            "parameters": [
                {"id": 10, "name": "year", "type": "number"},
                {"id": 11, "name": "albums", "type": "list", "children": [
                    {"id": 12, "name": "name", "type": "string"},
                    {"id": 13, "name": "artist", "type": "string"}
                ]}
            ],
            "documentProperties": {"pageFormat": "A4"},
            "version": 1
        }))
    }

    fn album_data() -> Map<String, Value> {
        data(json!({
            "year": 1994,
            "albums": [
                {"name": "Vitalogy", "artist": "Pearl Jam"},
                {"name": "Superunknown", "artist": "Soundgarden"}
            ]
        }))
    }

    #[test]
    fn valid_definition_has_no_errors() {
        let report = Report::new(&album_definition(), album_data(), false);
        assert!(report.errors.is_empty(), "unexpected: {:?}", report.errors);
    }

    #[test]
    fn duplicate_parameter_names_are_reported() {
        let definition = definition(json!({
            "docElements": [],
            "styles": [],
            "parameters": [
                {"id": 1, "name": "year", "type": "number"},
                {"id": 2, "name": "year", "type": "string"}
            ],
            "documentProperties": {},
            "version": 1
        }));
        let report = Report::new(&definition, Map::new(), false);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].object_id, 2);
        assert_eq!(report.errors[0].field, "name");
        assert!(report.errors[0].msg.contains("duplicate parameter name"));
    }

    #[test]
    fn unknown_placeholder_is_reported_on_the_text_element() {
        let definition = definition(json!({
            "docElements": [
                {"elementType": "text", "id": 7, "content": "Hello ${missing}"}
            ],
            "styles": [],
            "parameters": [],
            "documentProperties": {},
            "version": 1
        }));
        let report = Report::new(&definition, Map::new(), false);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].object_id, 7);
        assert_eq!(report.errors[0].field, "content");
    }

    #[test]
    fn table_bound_to_scalar_parameter_is_reported() {
        let definition = definition(json!({
            "docElements": [
                {"elementType": "table", "id": 3, "dataSource": "year", "columns": []}
            ],
            "styles": [],
            "parameters": [{"id": 1, "name": "year", "type": "number"}],
            "documentProperties": {},
            "version": 1
        }));
        let report = Report::new(&definition, Map::new(), false);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].object_id, 3);
        assert_eq!(report.errors[0].field, "dataSource");
    }

    #[test]
    fn unknown_table_column_field_is_reported() {
        let definition = definition(json!({
            "docElements": [
                {"elementType": "table", "id": 4, "dataSource": "albums", "columns": [
                    {"title": "Label", "field": "label"}
                ]}
            ],
            "styles": [],
            "parameters": [
                {"id": 1, "name": "albums", "type": "list", "children": [
                    {"id": 2, "name": "name", "type": "string"}
                ]}
            ],
            "documentProperties": {},
            "version": 1
        }));
        let report = Report::new(&definition, Map::new(), false);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].field, "columns");
    }

    #[test]
    fn unrecognized_element_type_is_reported() {
        let definition = definition(json!({
            "docElements": [
                {"elementType": "bar_code", "id": 9, "content": "1234"}
            ],
            "styles": [],
            "parameters": [],
            "documentProperties": {},
            "version": 1
        }));
        let report = Report::new(&definition, Map::new(), false);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].object_id, 9);
    }

    #[test]
    fn spreadsheet_renders_header_and_one_record_per_row() {
        let report = Report::new(&album_definition(), album_data(), false);
        let bytes = report.generate_spreadsheet().expect("csv output");
        let output = String::from_utf8(bytes).expect("utf-8 csv");
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "Albums of 1994");
        assert_eq!(lines[1], "Name,Artist");
        assert_eq!(lines[2], "Vitalogy,Pearl Jam");
        assert_eq!(lines[3], "Superunknown,Soundgarden");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn missing_data_for_parameter_fails_rendering() {
        let report = Report::new(&album_definition(), data(json!({"year": 1994})), false);
        assert!(report.errors.is_empty());
        match report.generate_spreadsheet() {
            Err(RenderError::Report(error)) => {
                assert_eq!(error.object_id, 11);
                assert!(error.msg.contains("no data supplied"));
            }
            other => panic!("expected report error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn null_scalar_renders_empty() {
        let report = Report::new(
            &album_definition(),
            data(json!({"year": null, "albums": []})),
            false,
        );
        let output = String::from_utf8(report.generate_spreadsheet().unwrap()).unwrap();
        assert!(output.starts_with("Albums of \n") || output.starts_with("Albums of ,"));
    }

    #[test]
    fn test_data_coerces_stringly_typed_scalars() {
        let report = Report::new(&album_definition(), data(json!({"year": "1994", "albums": []})), true);
        let output = String::from_utf8(report.generate_spreadsheet().unwrap()).unwrap();
        assert!(output.starts_with("Albums of 1994"));
    }

    #[test]
    fn non_numeric_value_without_test_data_fails() {
        let report = Report::new(&album_definition(), data(json!({"year": "1994", "albums": []})), false);
        match report.generate_spreadsheet() {
            Err(RenderError::Report(error)) => assert_eq!(error.field, "type"),
            other => panic!("expected report error, got {:?}", other.map(|_| ())),
        }
    }
}
