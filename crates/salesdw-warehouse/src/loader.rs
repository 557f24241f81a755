//! Bulk insert of prepared rows

use crate::error::InsertError;
use crate::schema_manager::quote_ident;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, ErrorCode};
use salesdw_core::{Column, LogicalType, TableSchema};
use salesdw_extract::{cell, NormalizedTable};

/// Convert one raw cell to the SQLite value for `column`
///
/// Blank cells become NULL, as do `NaN` cells in numeric columns. Returns
/// `None` when the cell cannot be read as the column's type.
pub fn to_sql_value(raw: &str, column: &Column) -> Option<Value> {
    let missing = match column.logical_type {
        LogicalType::Int | LogicalType::Float => cell::is_null_number(raw),
        LogicalType::String | LogicalType::Unknown => cell::is_blank(raw),
    };
    if missing {
        return Some(Value::Null);
    }

    match column.logical_type {
        LogicalType::Int => cell::parse_int(raw).map(Value::Integer),
        LogicalType::Float => cell::parse_float(raw).map(Value::Real),
        LogicalType::String | LogicalType::Unknown => Some(Value::Text(raw.to_string())),
    }
}

fn insert_sql(table: &TableSchema, columns: &[String]) -> String {
    let names: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();

    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(&table.name),
        names.join(", "),
        placeholders.join(", "),
    )
}

/// Append every row of `rows` to `table`, returning the number inserted
///
/// Runs on whatever transaction `conn` belongs to; nothing is committed here.
pub fn bulk_insert(
    conn: &Connection,
    table: &TableSchema,
    rows: &NormalizedTable,
) -> Result<usize, InsertError> {
    let columns = rows
        .columns
        .iter()
        .map(|name| {
            table.find_column(name).ok_or_else(|| InsertError::UnknownColumn {
                table: table.name.clone(),
                column: name.clone(),
            })
        })
        .collect::<Result<Vec<&Column>, _>>()?;

    let mut stmt = conn
        .prepare(&insert_sql(table, &rows.columns))
        .map_err(|source| InsertError::Statement {
            table: table.name.clone(),
            source,
        })?;

    let mut inserted = 0;
    for row in &rows.rows {
        let values = row
            .values
            .iter()
            .zip(&columns)
            .map(|(raw, column)| {
                to_sql_value(raw, column).ok_or_else(|| InsertError::TypeMismatch {
                    table: table.name.clone(),
                    line: row.line,
                    column: column.name.clone(),
                    expected: column.logical_type,
                    value: raw.clone(),
                })
            })
            .collect::<Result<Vec<Value>, _>>()?;

        stmt.execute(params_from_iter(values.iter()))
            .map_err(|source| {
                let violated = matches!(
                    &source,
                    rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
                );
                if violated {
                    InsertError::Constraint {
                        table: table.name.clone(),
                        line: row.line,
                        source,
                    }
                } else {
                    InsertError::Statement {
                        table: table.name.clone(),
                        source,
                    }
                }
            })?;
        inserted += 1;
    }

    tracing::debug!(table = %table.name, rows = inserted, "Bulk insert complete");
    Ok(inserted)
}
