// ecxctl - CLI for the Equinix ECX Fabric API
// Copyright (C) 2024 Mathias Uhl <mathiasuhl@gmx.de>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use serde::Serialize;
use serde_json::Value;
use std::fmt::Write as _;

const AUTO_COLUMNS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Indented JSON.
    Pretty,
    /// Compact single-line JSON.
    Json,
    /// Aligned columns.
    Table,
}

/// Render `records` in the requested format.
///
/// `columns` is the preferred column set for tables; hinted columns that are
/// empty for every row are skipped.
pub fn render<T: Serialize>(
    records: &[T],
    format: OutputFormat,
    columns: &[&str],
) -> serde_json::Result<String> {
    match format {
        OutputFormat::Pretty => serde_json::to_string_pretty(records),
        OutputFormat::Json => serde_json::to_string(records),
        OutputFormat::Table => {
            let rows = serde_json::to_value(records)?;
            let rows = rows.as_array().map(Vec::as_slice).unwrap_or_default();
            Ok(table(rows, columns))
        }
    }
}

/// Single record; tables fall back to one row.
pub fn render_one<T: Serialize>(
    record: &T,
    format: OutputFormat,
    columns: &[&str],
) -> serde_json::Result<String> {
    match format {
        OutputFormat::Pretty => serde_json::to_string_pretty(record),
        OutputFormat::Json => serde_json::to_string(record),
        OutputFormat::Table => Ok(table(&[serde_json::to_value(record)?], columns)),
    }
}

fn table(rows: &[Value], columns_hint: &[&str]) -> String {
    let has_value = |key: &str| {
        rows.iter()
            .any(|row| row.get(key).map(is_non_empty).unwrap_or(false))
    };

    let mut columns: Vec<String> = columns_hint
        .iter()
        .filter(|key| has_value(key))
        .map(|key| key.to_string())
        .collect();

    if columns.is_empty() {
        if let Some(Value::Object(first)) = rows.first() {
            columns = first
                .keys()
                .filter(|key| has_value(key))
                .take(AUTO_COLUMNS)
                .cloned()
                .collect();
        }
    }

    if columns.is_empty() {
        return String::new();
    }

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|col| row.get(col).map(value_to_str).unwrap_or_default())
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in &cells {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    write_row(&mut out, &columns, &widths);
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    write_row(&mut out, &separator, &widths);
    for row in &cells {
        write_row(&mut out, row, &widths);
    }
    out
}

fn write_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:width$}"))
        .collect();
    let _ = writeln!(out, "{}", line.join("  ").trim_end());
}

fn value_to_str(value: &Value) -> String {
    match value {
        Value::Null => "".into(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

fn is_non_empty(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(_) | Value::Number(_) => true,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(arr) => !arr.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
