//! Terminal rendering of operations.
//!
//! [`build_sections`] decides what an operation's table contains; [`render`]
//! draws those sections as a box table with `comfy-table`.

use crate::document::{Operation, Parameter};
use crate::flattener::{self, Row};
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, Table};
use log::debug;

/// One block of an operation table, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section {
    /// Table header: method, path and summary
    Header {
        method: String,
        path: String,
        summary: Option<String>,
    },
    Description(String),
    Parameters(Vec<ParameterRow>),
    Result(Vec<Row>),
    /// Visual break between two non-empty blocks
    Divider,
}

/// Parameter line: schema type, name and description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterRow {
    pub type_name: Option<String>,
    pub name: String,
    pub description: Option<String>,
}

impl From<&Parameter> for ParameterRow {
    fn from(parameter: &Parameter) -> Self {
        Self {
            type_name: parameter
                .schema
                .as_ref()
                .and_then(|schema| schema.type_name())
                .map(str::to_string),
            name: parameter.name.clone(),
            description: parameter.description.clone(),
        }
    }
}

/// Flattens the operation's primary response schema.
///
/// `None` when there is no schema or it cannot be summarized; the table then
/// has no result block.
pub fn result_rows(operation: &Operation) -> Option<Vec<Row>> {
    let schema = operation.result_schema()?;
    match flattener::flatten(schema) {
        Ok(rows) => Some(rows),
        Err(e) => {
            debug!(
                "No result block for {} {}: {}",
                operation.method, operation.path, e
            );
            None
        }
    }
}

/// Lays out the sections of one operation table.
///
/// Empty blocks are left out, and a divider only separates two blocks.
pub fn build_sections(operation: &Operation, result: Option<Vec<Row>>) -> Vec<Section> {
    let mut sections = vec![Section::Header {
        method: operation.method.to_string(),
        path: operation.path.clone(),
        summary: operation.summary.clone(),
    }];

    let mut blocks = Vec::new();
    if let Some(description) = operation
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
    {
        blocks.push(Section::Description(description.to_string()));
    }
    if !operation.parameters.is_empty() {
        blocks.push(Section::Parameters(
            operation.parameters.iter().map(ParameterRow::from).collect(),
        ));
    }
    if let Some(rows) = result.filter(|rows| !rows.is_empty()) {
        blocks.push(Section::Result(rows));
    }

    for (i, block) in blocks.into_iter().enumerate() {
        if i > 0 {
            sections.push(Section::Divider);
        }
        sections.push(block);
    }
    sections
}

/// Draws sections as a three-column box table.
pub fn render(sections: &[Section]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);

    for section in sections {
        match section {
            Section::Header {
                method,
                path,
                summary,
            } => {
                table.set_header(vec![
                    Cell::new(method).add_attribute(Attribute::Bold),
                    Cell::new(path).add_attribute(Attribute::Bold),
                    Cell::new(summary.as_deref().unwrap_or("")),
                ]);
            }
            Section::Description(text) => {
                table.add_row(vec![Cell::new(text), Cell::new(""), Cell::new("")]);
            }
            Section::Parameters(parameters) => {
                table.add_row(vec![
                    Cell::new(format!("Parameters ({})", parameters.len()))
                        .add_attribute(Attribute::Bold),
                    Cell::new(""),
                    Cell::new(""),
                ]);
                for parameter in parameters {
                    table.add_row(vec![
                        Cell::new(parameter.type_name.as_deref().unwrap_or("")),
                        Cell::new(&parameter.name),
                        Cell::new(parameter.description.as_deref().unwrap_or("")),
                    ]);
                }
            }
            Section::Result(rows) => {
                table.add_row(vec![
                    Cell::new(format!("Result ({})", rows.len())).add_attribute(Attribute::Bold),
                    Cell::new(""),
                    Cell::new(""),
                ]);
                for row in rows {
                    table.add_row(vec![
                        Cell::new(&row.path),
                        Cell::new(&row.type_label),
                        Cell::new(row.description.as_deref().unwrap_or("")),
                    ]);
                }
            }
            Section::Divider => {
                table.add_row(vec![Cell::new(""), Cell::new(""), Cell::new("")]);
            }
        }
    }

    table.to_string()
}

/// Builds and draws the table of one operation.
pub fn render_operation(operation: &Operation) -> String {
    let sections = build_sections(operation, result_rows(operation));
    render(&sections)
}
