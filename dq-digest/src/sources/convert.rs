//! Conversion of text-encoded result rows into Arrow.
//!
//! Database rows arrive as optional strings. Column types come from the
//! database's own type names and decide how each string is parsed.

use crate::prelude::*;
use arrow::array::{
    ArrayRef, BooleanBuilder, Date32Builder, Float64Builder, Int64Builder, StringBuilder,
    TimestampMicrosecondBuilder,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;

/// A result column: its name and database type name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextColumn {
    pub name: String,
    pub type_name: String,
}

impl TextColumn {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Maps a database type name onto the Arrow type used to hold it.
pub fn arrow_type_for(type_name: &str) -> DataType {
    match type_name.to_ascii_uppercase().as_str() {
        "INT2" | "INT4" | "INT8" | "SMALLINT" | "INT" | "INTEGER" | "BIGINT" => DataType::Int64,
        "FLOAT4" | "FLOAT8" | "REAL" | "DOUBLE PRECISION" | "NUMERIC" | "DECIMAL" => {
            DataType::Float64
        }
        "BOOL" | "BOOLEAN" => DataType::Boolean,
        "DATE" => DataType::Date32,
        "TIMESTAMP" => DataType::Timestamp(TimeUnit::Microsecond, None),
        _ => DataType::Utf8,
    }
}

enum ColumnBuilder {
    Utf8(StringBuilder),
    Int64(Int64Builder),
    Float64(Float64Builder),
    Boolean(BooleanBuilder),
    Date32(Date32Builder),
    Timestamp(TimestampMicrosecondBuilder),
}

impl ColumnBuilder {
    fn for_type(data_type: &DataType) -> Self {
        match data_type {
            DataType::Int64 => ColumnBuilder::Int64(Int64Builder::new()),
            DataType::Float64 => ColumnBuilder::Float64(Float64Builder::new()),
            DataType::Boolean => ColumnBuilder::Boolean(BooleanBuilder::new()),
            DataType::Date32 => ColumnBuilder::Date32(Date32Builder::new()),
            DataType::Timestamp(_, _) => {
                ColumnBuilder::Timestamp(TimestampMicrosecondBuilder::new())
            }
            _ => ColumnBuilder::Utf8(StringBuilder::new()),
        }
    }

    /// Appends one value. Returns a description of the problem if it does
    /// not parse.
    fn append(&mut self, value: Option<&str>) -> std::result::Result<(), String> {
        match self {
            ColumnBuilder::Utf8(b) => b.append_option(value),
            ColumnBuilder::Int64(b) => b.append_option(
                value
                    .map(|v| v.trim().parse::<i64>().map_err(|e| format!("'{v}': {e}")))
                    .transpose()?,
            ),
            ColumnBuilder::Float64(b) => b.append_option(
                value
                    .map(|v| v.trim().parse::<f64>().map_err(|e| format!("'{v}': {e}")))
                    .transpose()?,
            ),
            ColumnBuilder::Boolean(b) => b.append_option(value.map(parse_bool).transpose()?),
            ColumnBuilder::Date32(b) => b.append_option(value.map(parse_date).transpose()?),
            ColumnBuilder::Timestamp(b) => {
                b.append_option(value.map(parse_timestamp).transpose()?)
            }
        }
        Ok(())
    }

    fn finish(self) -> ArrayRef {
        match self {
            ColumnBuilder::Utf8(mut b) => Arc::new(b.finish()),
            ColumnBuilder::Int64(mut b) => Arc::new(b.finish()),
            ColumnBuilder::Float64(mut b) => Arc::new(b.finish()),
            ColumnBuilder::Boolean(mut b) => Arc::new(b.finish()),
            ColumnBuilder::Date32(mut b) => Arc::new(b.finish()),
            ColumnBuilder::Timestamp(mut b) => Arc::new(b.finish()),
        }
    }
}

fn parse_bool(value: &str) -> std::result::Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "t" | "true" | "1" => Ok(true),
        "f" | "false" | "0" => Ok(false),
        other => Err(format!("'{other}' is not a boolean")),
    }
}

fn parse_date(value: &str) -> std::result::Result<i32, String> {
    let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| format!("'{value}': {e}"))?;
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)
        .ok_or_else(|| "epoch out of range".to_string())?;
    i32::try_from((date - epoch).num_days()).map_err(|e| format!("'{value}': {e}"))
}

fn parse_timestamp(value: &str) -> std::result::Result<i64, String> {
    let trimmed = value.trim();
    let parsed = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f"))
        .map_err(|e| format!("'{value}': {e}"))?;
    Ok(parsed.and_utc().timestamp_micros())
}

/// Builds a record batch from text rows.
///
/// `rows` must have one value per column, in column order.
pub fn text_rows_to_batch(
    dataset: &str,
    columns: &[TextColumn],
    rows: Vec<Vec<Option<String>>>,
) -> Result<RecordBatch> {
    let fields: Vec<Field> = columns
        .iter()
        .map(|c| Field::new(&c.name, arrow_type_for(&c.type_name), true))
        .collect();
    let mut builders: Vec<ColumnBuilder> = fields
        .iter()
        .map(|f| ColumnBuilder::for_type(f.data_type()))
        .collect();

    for (row_index, row) in rows.into_iter().enumerate() {
        if row.len() != columns.len() {
            return Err(DigestError::query_failed(
                dataset,
                format!(
                    "row {row_index} has {} values, expected {}",
                    row.len(),
                    columns.len()
                ),
            ));
        }
        for ((builder, value), column) in builders.iter_mut().zip(row).zip(columns) {
            builder.append(value.as_deref()).map_err(|problem| {
                DigestError::query_failed(
                    dataset,
                    format!(
                        "cannot decode column '{}' at row {row_index}: {problem}",
                        column.name
                    ),
                )
            })?;
        }
    }

    let schema = Arc::new(Schema::new(fields));
    let arrays = builders.into_iter().map(ColumnBuilder::finish).collect();
    RecordBatch::try_new(schema, arrays)
        .map_err(|e| DigestError::query_failed_with_source(dataset, "cannot assemble batch", e))
}
