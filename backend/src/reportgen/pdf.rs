//! PDF assembly on top of genpdf.

use std::path::Path;

use genpdf::elements::{Break, FrameCellDecorator, PageBreak as PdfPageBreak, Paragraph, TableLayout};
use genpdf::style::{Style as PdfStyle, StyledString};
use genpdf::{Document, Element, Margins, PaperSize, SimplePageDecorator};

use super::model::{DocElement, DocumentProperties, PageFormat, TableElement, TextElement};
use super::{RenderError, Report};

const DEFAULT_FONT_SIZE: u8 = 10;

pub(super) fn generate(report: &Report, fonts_dir: &Path) -> Result<Vec<u8>, RenderError> {
    let mut doc = configure_document(report.document_properties(), fonts_dir)?;

    for element in report.elements() {
        match element {
            DocElement::Text(text) => push_text(&mut doc, report, text)?,
            DocElement::Table(table) => push_table(&mut doc, report, table)?,
            DocElement::PageBreak(_) => doc.push(PdfPageBreak::new()),
        }
    }

    let mut out = Vec::new();
    doc.render(&mut out)
        .map_err(|e| RenderError::Internal(format!("pdf rendering failed: {}", e)))?;
    Ok(out)
}

/// Load the font family from the configured directory. Arial is preferred if
/// its TTFs were added, with LiberationSans as the stock fallback.
fn load_font(fonts_dir: &Path) -> Result<genpdf::fonts::FontFamily<genpdf::fonts::FontData>, RenderError> {
    if let Ok(family) = genpdf::fonts::from_files(fonts_dir, "Arial", None) {
        return Ok(family);
    }
    genpdf::fonts::from_files(fonts_dir, "LiberationSans", None)
        .map_err(|e| RenderError::Internal(format!("font loading failed: {}", e)))
}

/// Configure and return a genpdf Document with font, paper size and page
/// decorator taken from the document properties.
fn configure_document(
    properties: &DocumentProperties,
    fonts_dir: &Path,
) -> Result<Document, RenderError> {
    let font_family = load_font(fonts_dir)?;
    let mut doc = Document::new(font_family);
    doc.set_title("report");
    doc.set_font_size(DEFAULT_FONT_SIZE);
    doc.set_paper_size(match properties.page_format {
        PageFormat::A4 => PaperSize::A4,
        PageFormat::Letter => PaperSize::Letter,
    });

    let mut decorator = SimplePageDecorator::new();
    decorator.set_margins(Margins::trbl(
        properties.margin_top,
        properties.margin_right,
        properties.margin_bottom,
        properties.margin_left,
    ));
    doc.set_page_decorator(decorator);
    Ok(doc)
}

/// Push text that may contain internal newlines, preserving breaks.
fn push_text(doc: &mut Document, report: &Report, element: &TextElement) -> Result<(), RenderError> {
    let content = report.fill_placeholders(element)?;
    let style = text_style(report, element);

    let lines: Vec<&str> = content.split('\n').collect();
    for (i, line) in lines.iter().enumerate() {
        let mut paragraph = Paragraph::new("");
        paragraph.push(StyledString::new(line.to_string(), style.clone()));
        doc.push(paragraph);
        if i < lines.len() - 1 {
            doc.push(Break::new(1));
        }
    }
    Ok(())
}

/// Resolve the effective style of a text element: the referenced shared
/// style, if any, combined with the element's inline flags and font size.
fn text_style(report: &Report, element: &TextElement) -> PdfStyle {
    let mut bold = element.bold;
    let mut italic = element.italic;
    if let Some(shared) = element.style_id.and_then(|id| report.style(id)) {
        bold = bold || shared.bold;
        italic = italic || shared.italic;
    }

    let mut style = PdfStyle::new();
    if bold {
        style = style.bold();
    }
    if italic {
        style = style.italic();
    }
    if let Some(size) = element.font_size {
        style = style.with_font_size(size);
    }
    style
}

/// Push a table element: one bold header row from the column titles, one row
/// per entry of the bound list parameter.
fn push_table(doc: &mut Document, report: &Report, element: &TableElement) -> Result<(), RenderError> {
    if element.columns.is_empty() {
        return Ok(());
    }
    let (parameter, rows) = report.table_rows(element)?;

    let mut table = TableLayout::new(vec![1; element.columns.len()]);
    table.set_cell_decorator(FrameCellDecorator::new(true, true, false));

    let mut header = table.row();
    for column in &element.columns {
        let mut cell = Paragraph::new("");
        cell.push(StyledString::new(column.title.clone(), PdfStyle::new().bold()));
        header = header.element(cell.padded(1));
    }
    header
        .push()
        .map_err(|e| RenderError::Internal(format!("table header: {}", e)))?;

    for row in rows {
        let mut table_row = table.row();
        for column in &element.columns {
            let value = report.cell_value(element, parameter, column, row)?;
            table_row = table_row.element(Paragraph::new(value).padded(1));
        }
        table_row
            .push()
            .map_err(|e| RenderError::Internal(format!("table row: {}", e)))?;
    }

    doc.push(table);
    Ok(())
}
