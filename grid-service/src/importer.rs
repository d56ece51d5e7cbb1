//! Bulk CSV import into one table.
//!
//! The header row names the columns; they are matched to the table's
//! catalogue by name, in any order. An `id` column is ignored because ids
//! are always assigned by the store. The whole file is parsed and validated
//! before anything is written, then appended in one transaction, so a bad
//! row leaves the table untouched.

use std::collections::HashSet;

use csv::StringRecord;
use grid_client::{
    domain::{Column, Table, Value},
    GridError, Store,
};

use crate::validation;

/// A fully parsed and validated import, ready to append.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedImport {
    pub table: Table,
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<Value>>,
}

/// Parse, validate and append `bytes` to `table`. Returns rows appended.
pub async fn import_csv(store: &Store, table: Table, bytes: &[u8]) -> Result<u64, GridError> {
    let parsed = match parse_csv(table, bytes) {
        Ok(p) => p,
        Err(e) => {
            metrics::counter!("csv_import_errors_total", "table" => table.name()).increment(1);
            tracing::warn!(%table, error = %e, "csv import rejected");
            return Err(e);
        }
    };

    let appended = store.append_rows(table, &parsed.columns, &parsed.rows).await?;
    metrics::counter!("csv_import_rows_total", "table" => table.name()).increment(appended);
    tracing::info!(%table, rows = appended, "csv import appended");
    Ok(appended)
}

pub fn parse_csv(table: Table, bytes: &[u8]) -> Result<ParsedImport, GridError> {
    let bytes = bytes.strip_prefix("\u{feff}".as_bytes()).unwrap_or(bytes);
    let mismatch = |detail: String| GridError::SchemaMismatch { table, detail };

    let mut rdr = csv::Reader::from_reader(bytes);
    let headers = rdr
        .headers()
        .map_err(|e| mismatch(format!("failed to read CSV header: {e}")))?
        .clone();
    let mapping = map_header(table, &headers)?;
    let columns: Vec<&'static str> = mapping.iter().flatten().map(|c| c.name).collect();

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        // Data rows are numbered from 1, after the header.
        let line = idx + 1;
        let record = result.map_err(|e| mismatch(format!("failed to read row {line}: {e}")))?;
        let row = record_to_row(table, &record, &mapping, line)?;
        validation::validate_row(&columns, &row)?;
        rows.push(row);
    }

    Ok(ParsedImport { table, columns, rows })
}

/// One entry per header cell: the catalogue column it feeds, or `None` for
/// an ignored `id` column.
fn map_header(table: Table, headers: &StringRecord) -> Result<Vec<Option<&'static Column>>, GridError> {
    let mut seen = HashSet::new();
    let mut mapping = Vec::with_capacity(headers.len());

    for raw in headers.iter() {
        let name = raw.trim();
        if !seen.insert(name.to_string()) {
            return Err(GridError::SchemaMismatch {
                table,
                detail: format!("column '{name}' appears more than once in the header"),
            });
        }
        if name == "id" {
            mapping.push(None);
            continue;
        }
        let column = table.column(name).map_err(|_| GridError::SchemaMismatch {
            table,
            detail: format!("unknown column '{name}'"),
        })?;
        mapping.push(Some(column));
    }

    let missing: Vec<&str> = table
        .columns()
        .iter()
        .filter(|c| c.required && !seen.contains(c.name))
        .map(|c| c.name)
        .collect();
    if !missing.is_empty() {
        return Err(GridError::SchemaMismatch {
            table,
            detail: format!("missing required column(s): {}", missing.join(", ")),
        });
    }

    Ok(mapping)
}

fn record_to_row(
    table: Table,
    record: &StringRecord,
    mapping: &[Option<&'static Column>],
    line: usize,
) -> Result<Vec<Value>, GridError> {
    let mut row = Vec::with_capacity(mapping.len());
    for (cell, column) in record.iter().zip(mapping) {
        let Some(column) = column else { continue };
        let value = Value::from_cell(column.kind, cell).map_err(|e| GridError::SchemaMismatch {
            table,
            detail: format!("row {line}: invalid {} '{cell}': {e}", column.name),
        })?;
        row.push(value);
    }
    Ok(row)
}
