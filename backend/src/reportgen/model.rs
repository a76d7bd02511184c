//! Typed view of a report definition. The storage layer keeps elements as
//! opaque JSON; these structs are what the engine actually understands.

use serde::Deserialize;

/// A document element, tagged by `elementType`. Anything the engine does not
/// recognize fails to deserialize and is reported as a structural error for
/// that element.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "elementType", rename_all = "snake_case")]
pub enum DocElement {
    Text(TextElement),
    Table(TableElement),
    PageBreak(PageBreakElement),
}

impl DocElement {
    pub fn id(&self) -> i64 {
        match self {
            DocElement::Text(element) => element.id,
            DocElement::Table(element) => element.id,
            DocElement::PageBreak(element) => element.id,
        }
    }
}

/// A block of text. `content` may contain `${parameter}` placeholders which
/// are substituted from the data payload when rendering.
#[derive(Debug, Clone, Deserialize)]
pub struct TextElement {
    pub id: i64,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(rename = "fontSize", default)]
    pub font_size: Option<u8>,
    #[serde(rename = "styleId", default)]
    pub style_id: Option<i64>,
}

/// A table bound to a list parameter. Rendering emits one header row from the
/// column titles and one body row per entry of the list value.
#[derive(Debug, Clone, Deserialize)]
pub struct TableElement {
    pub id: i64,
    #[serde(rename = "dataSource")]
    pub data_source: String,
    pub columns: Vec<TableColumn>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableColumn {
    pub title: String,
    pub field: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageBreakElement {
    pub id: i64,
}

/// A reusable text style referenced via `styleId`.
#[derive(Debug, Clone, Deserialize)]
pub struct Style {
    pub id: i64,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Parameter {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub parameter_type: ParameterType,
    /// Item fields of a list parameter; empty for scalar parameters.
    #[serde(default)]
    pub children: Vec<Parameter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    Number,
    Boolean,
    Date,
    List,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentProperties {
    #[serde(rename = "pageFormat", default)]
    pub page_format: PageFormat,
    #[serde(rename = "marginLeft", default = "default_margin")]
    pub margin_left: f64,
    #[serde(rename = "marginTop", default = "default_margin")]
    pub margin_top: f64,
    #[serde(rename = "marginRight", default = "default_margin")]
    pub margin_right: f64,
    #[serde(rename = "marginBottom", default = "default_margin")]
    pub margin_bottom: f64,
}

impl Default for DocumentProperties {
    fn default() -> Self {
        DocumentProperties {
            page_format: PageFormat::A4,
            margin_left: default_margin(),
            margin_top: default_margin(),
            margin_right: default_margin(),
            margin_bottom: default_margin(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub enum PageFormat {
    #[default]
    A4,
    #[serde(rename = "letter")]
    Letter,
}

fn default_margin() -> f64 {
    10.0
}
