//! Fixed-width table output for list commands
//!
//! Commands declare their columns once as a `ColumnDef` slice, build
//! `TableRow`s from entities, and let the formatter render whichever
//! subset of columns the user asked for in the requested format.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use console::style;

use crate::cli::helpers::{escape_csv, format_money, format_qty, truncate_str};
use crate::cli::OutputFormat;
use crate::core::entity::Status;
use crate::core::shortid::ShortIdIndex;

/// Static definition of one table column
pub struct ColumnDef {
    /// Key used to reference the column from --columns
    pub key: &'static str,

    /// Header text
    pub header: &'static str,

    /// Display width in characters
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// A typed cell value, rendered per format at output time
pub enum CellValue {
    Text(String),
    Id(String),
    ShortId(String),
    Status(Status),
    Money(f64),
    Qty(f64),
    Date(DateTime<Utc>),
}

impl CellValue {
    fn render(&self, short_ids: &ShortIdIndex) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Id(id) => id.clone(),
            CellValue::ShortId(id) => short_ids
                .get_short_id(id)
                .unwrap_or_else(|| truncate_str(id, 10)),
            CellValue::Status(s) => s.to_string(),
            CellValue::Money(v) => format_money(*v),
            CellValue::Qty(v) => format_qty(*v),
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

/// One output row keyed by column name
pub struct TableRow {
    /// Full entity id of the row, for id/short-id output modes
    id: String,
    cells: HashMap<&'static str, CellValue>,
}

impl TableRow {
    pub fn new(id: String) -> Self {
        Self {
            id,
            cells: HashMap::new(),
        }
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.insert(key, value);
        self
    }
}

/// Table rendering options
pub struct TableConfig {
    /// Truncate rendered lines to this width, for narrow terminals
    pub wrap_width: Option<usize>,

    /// Print the trailing "N found" summary line
    pub show_summary: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            wrap_width: None,
            show_summary: true,
        }
    }
}

impl TableConfig {
    pub fn with_wrap(width: usize) -> Self {
        Self {
            wrap_width: Some(width),
            ..Self::default()
        }
    }
}

/// Renders rows of one entity type in the requested format
pub struct TableFormatter {
    columns: &'static [ColumnDef],
    entity_name: &'static str,
    prefix: &'static str,
    config: TableConfig,
}

impl TableFormatter {
    pub fn new(
        columns: &'static [ColumnDef],
        entity_name: &'static str,
        prefix: &'static str,
    ) -> Self {
        Self {
            columns,
            entity_name,
            prefix,
            config: TableConfig::default(),
        }
    }

    pub fn with_config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }

    /// Render the rows, restricted to the visible column keys
    pub fn output(
        &self,
        rows: Vec<TableRow>,
        format: OutputFormat,
        visible: &[&str],
        short_ids: &ShortIdIndex,
    ) {
        let columns: Vec<&ColumnDef> = visible
            .iter()
            .filter_map(|key| self.columns.iter().find(|c| c.key == *key))
            .collect();

        match format {
            OutputFormat::Id => {
                for row in &rows {
                    println!("{}", row.id);
                }
            }
            OutputFormat::ShortId => {
                for row in &rows {
                    let short = short_ids
                        .get_short_id(&row.id)
                        .unwrap_or_else(|| row.id.clone());
                    println!("{}", short);
                }
            }
            OutputFormat::Csv => {
                let header: Vec<&str> = columns.iter().map(|c| c.key).collect();
                println!("{}", header.join(","));
                for row in &rows {
                    let cells: Vec<String> = columns
                        .iter()
                        .map(|c| {
                            row.cells
                                .get(c.key)
                                .map(|v| escape_csv(&v.render(short_ids)))
                                .unwrap_or_default()
                        })
                        .collect();
                    println!("{}", cells.join(","));
                }
            }
            _ => self.output_aligned(&rows, &columns, short_ids),
        }
    }

    fn output_aligned(&self, rows: &[TableRow], columns: &[&ColumnDef], short_ids: &ShortIdIndex) {
        let header = columns
            .iter()
            .map(|c| format!("{:<width$}", c.header, width = c.width))
            .collect::<Vec<_>>()
            .join(" ");
        println!("{}", style(self.clip(&header)).bold());

        for row in rows {
            let line = columns
                .iter()
                .map(|c| {
                    let rendered = row
                        .cells
                        .get(c.key)
                        .map(|v| v.render(short_ids))
                        .unwrap_or_default();
                    format!("{:<width$}", truncate_str(&rendered, c.width), width = c.width)
                })
                .collect::<Vec<_>>()
                .join(" ");
            println!("{}", self.clip(&line));
        }

        if self.config.show_summary {
            println!();
            println!(
                "{} {}(s) found. Use {} to reference by short ID.",
                style(rows.len()).cyan(),
                self.entity_name,
                style(format!("{}@N", self.prefix)).cyan()
            );
        }
    }

    fn clip(&self, line: &str) -> String {
        match self.config.wrap_width {
            Some(width) => truncate_str(line.trim_end(), width),
            None => line.trim_end().to_string(),
        }
    }
}
