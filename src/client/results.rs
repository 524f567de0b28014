//! Query results.
//!
//! Rows returned by the server are copied into plain [`SqlValue`]s so the
//! result set does not borrow from the connection.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use tiberius::{ColumnData, FromSql, Row};

/// A single column value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl SqlValue {
    /// Check for SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Integer value, if this is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Text value, if this is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Convert one column of a server row.
    ///
    /// Numeric, GUID, XML and temporal columns are rendered as text.
    pub fn from_column(data: ColumnData<'static>) -> Result<Self, tiberius::error::Error> {
        let value = match data {
            ColumnData::U8(v) => v.map(|v| SqlValue::Int(v.into())),
            ColumnData::I16(v) => v.map(|v| SqlValue::Int(v.into())),
            ColumnData::I32(v) => v.map(|v| SqlValue::Int(v.into())),
            ColumnData::I64(v) => v.map(SqlValue::Int),
            ColumnData::F32(v) => v.map(|v| SqlValue::Float(v.into())),
            ColumnData::F64(v) => v.map(SqlValue::Float),
            ColumnData::Bit(v) => v.map(SqlValue::Bool),
            ColumnData::String(v) => v.map(|v| SqlValue::Text(v.into_owned())),
            ColumnData::Binary(v) => v.map(|v| SqlValue::Bytes(v.into_owned())),
            ColumnData::Guid(v) => v.map(|v| SqlValue::Text(v.to_string())),
            ColumnData::Numeric(v) => v.map(|v| SqlValue::Text(v.to_string())),
            ColumnData::Xml(v) => v.map(|v| SqlValue::Text(v.into_owned().into_string())),
            ColumnData::Date(_) => NaiveDate::from_sql(&data)?.map(|v| SqlValue::Text(v.to_string())),
            ColumnData::Time(_) => NaiveTime::from_sql(&data)?.map(|v| SqlValue::Text(v.to_string())),
            ColumnData::DateTimeOffset(_) => DateTime::<FixedOffset>::from_sql(&data)?
                .map(|v| SqlValue::Text(v.to_rfc3339())),
            _ => NaiveDateTime::from_sql(&data)?.map(|v| SqlValue::Text(v.to_string())),
        };

        Ok(value.unwrap_or(SqlValue::Null))
    }
}

/// Column names plus rows of the last result set a statement produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Vec<SqlValue>>,
}

impl ResultSet {
    /// Create a result set from column names and rows.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Self {
        Self { columns, rows }
    }

    pub(crate) fn from_rows(rows: Vec<Row>) -> Result<Self, tiberius::error::Error> {
        let mut columns = Vec::new();
        let mut result_rows = Vec::with_capacity(rows.len());

        for row in rows {
            if columns.is_empty() {
                columns = row.columns().iter().map(|c| c.name().to_string()).collect();
            }

            let values = row
                .into_iter()
                .map(SqlValue::from_column)
                .collect::<Result<Vec<_>, _>>()?;
            result_rows.push(values);
        }

        Ok(Self::new(columns, result_rows))
    }

    /// Get the column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Get all rows.
    pub fn rows(&self) -> &[Vec<SqlValue>] {
        &self.rows
    }

    /// Get the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check whether the result set has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the named column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value at `row` in the named column.
    pub fn get(&self, row: usize, column: &str) -> Option<&SqlValue> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)
    }
}
