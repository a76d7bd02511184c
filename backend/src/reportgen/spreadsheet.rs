//! CSV spreadsheet output.
//!
//! Tables become a header record plus one record per data row; text elements
//! become a single-field record with placeholders substituted. Page breaks
//! have no spreadsheet meaning and are skipped.

use csv::WriterBuilder;

use super::model::{DocElement, TableElement};
use super::{RenderError, Report};

pub(super) fn generate(report: &Report) -> Result<Vec<u8>, RenderError> {
    // records have differing widths (text vs table), so the writer must not
    // enforce a uniform field count
    let mut writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());

    for element in report.elements() {
        match element {
            DocElement::Text(text) => {
                let content = report.fill_placeholders(text)?;
                writer
                    .write_record([content.as_str()])
                    .map_err(|e| RenderError::Internal(format!("csv output: {}", e)))?;
            }
            DocElement::Table(table) => write_table(report, table, &mut writer)?,
            DocElement::PageBreak(_) => {}
        }
    }

    writer
        .into_inner()
        .map_err(|e| RenderError::Internal(format!("csv output: {}", e)))
}

fn write_table(
    report: &Report,
    table: &TableElement,
    writer: &mut csv::Writer<Vec<u8>>,
) -> Result<(), RenderError> {
    if table.columns.is_empty() {
        return Ok(());
    }
    let (parameter, rows) = report.table_rows(table)?;

    writer
        .write_record(table.columns.iter().map(|column| column.title.as_str()))
        .map_err(|e| RenderError::Internal(format!("csv output: {}", e)))?;

    for row in rows {
        let mut record = Vec::with_capacity(table.columns.len());
        for column in &table.columns {
            record.push(report.cell_value(table, parameter, column, row)?);
        }
        writer
            .write_record(&record)
            .map_err(|e| RenderError::Internal(format!("csv output: {}", e)))?;
    }
    Ok(())
}
