//! Row decoding
//!
//! Column decoders are picked once per result set from the declared column
//! types and then applied to every row. Cells arrive in text format. NULL
//! collapses to the decoder's zero value (`""`, `false`, `0`); the output
//! has no null marker.
//!
//! Date and time columns are re-rendered as RFC 3339 with trailing zeros
//! trimmed from the fraction and `Z` for a zero offset, e.g.
//! `2024-01-02 03:04:05` becomes `2024-01-02T03:04:05Z`.

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Decoded cell value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ColumnValue {
    /// `BOOL` columns
    Bool(bool),
    /// `INT4` columns, widened to 64 bits
    Int(i64),
    /// Everything else, as the server rendered it
    Text(String),
}

/// Decode strategy for one column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnDecoder {
    /// Keep the text as-is
    Text,
    /// Parse `t`/`f`
    Bool,
    /// Parse a signed 64-bit integer
    Int64,
    /// `timestamp`, rendered in UTC
    Timestamp,
    /// `timestamptz`, rendered with the offset the server sent
    TimestampTz,
    /// `date`, rendered as midnight UTC
    Date,
}

impl ColumnDecoder {
    /// Pick the decoder for a declared type name (case-insensitive)
    pub fn for_type_name(type_name: &str) -> Self {
        match type_name.to_ascii_uppercase().as_str() {
            "VARCHAR" | "TEXT" | "UUID" => Self::Text,
            "TIMESTAMP" => Self::Timestamp,
            "TIMESTAMPTZ" => Self::TimestampTz,
            "DATE" => Self::Date,
            "BOOL" => Self::Bool,
            "INT4" => Self::Int64,
            _ => Self::Text,
        }
    }

    /// Decode one text-format cell
    pub fn decode(self, raw: Option<&str>) -> std::result::Result<ColumnValue, String> {
        let Some(raw) = raw else {
            return Ok(self.zero_value());
        };

        match self {
            Self::Text => Ok(ColumnValue::Text(raw.to_string())),
            Self::Bool => match raw {
                "t" | "true" => Ok(ColumnValue::Bool(true)),
                "f" | "false" => Ok(ColumnValue::Bool(false)),
                other => Err(format!("cannot convert {:?} to bool", other)),
            },
            Self::Int64 => raw
                .parse::<i64>()
                .map(ColumnValue::Int)
                .map_err(|e| format!("cannot convert {:?} to int64: {}", raw, e)),
            Self::Timestamp | Self::TimestampTz | Self::Date => {
                self.decode_time(raw).map(ColumnValue::Text)
            }
        }
    }

    fn decode_time(self, raw: &str) -> std::result::Result<String, String> {
        // Special values have no calendar form
        if matches!(raw, "infinity" | "-infinity") {
            return Ok(raw.to_string());
        }

        let parsed = match self {
            Self::Timestamp => {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").map(|t| (t, 0))
            }
            Self::TimestampTz => DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z")
                .map(|t| (t.naive_local(), t.offset().local_minus_utc())),
            Self::Date => {
                NaiveDate::parse_from_str(raw, "%Y-%m-%d").map(|d| (d.and_time(NaiveTime::MIN), 0))
            }
            Self::Text | Self::Bool | Self::Int64 => return Ok(raw.to_string()),
        };

        parsed
            .map(|(local, offset)| rfc3339(&local, offset))
            .map_err(|e| format!("cannot convert {:?} to {:?}: {}", raw, self, e))
    }

    fn zero_value(self) -> ColumnValue {
        match self {
            Self::Text | Self::Timestamp | Self::TimestampTz | Self::Date => {
                ColumnValue::Text(String::new())
            }
            Self::Bool => ColumnValue::Bool(false),
            Self::Int64 => ColumnValue::Int(0),
        }
    }
}

/// RFC 3339 with the shortest fraction that keeps full precision
fn rfc3339(local: &NaiveDateTime, offset_secs: i32) -> String {
    let mut out = local.format("%Y-%m-%dT%H:%M:%S").to_string();

    let nanos = local.nanosecond();
    if nanos > 0 {
        let fraction = format!("{:09}", nanos);
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }

    if offset_secs == 0 {
        out.push('Z');
    } else {
        let sign = if offset_secs < 0 { '-' } else { '+' };
        let minutes = offset_secs.unsigned_abs() / 60;
        let _ = write!(out, "{}{:02}:{:02}", sign, minutes / 60, minutes % 60);
    }
    out
}

/// One record: column name → value
pub type Record = BTreeMap<String, ColumnValue>;

/// Column name and the decoder fixed for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPlan {
    /// Column name
    pub name: String,
    /// Decoder applied to every cell in the column
    pub decoder: ColumnDecoder,
}

/// Per-result-set decode table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodePlan {
    columns: Vec<ColumnPlan>,
}

impl DecodePlan {
    /// Build from `(column name, declared type name)` pairs
    pub fn from_columns<I, N, T>(columns: I) -> Self
    where
        I: IntoIterator<Item = (N, T)>,
        N: Into<String>,
        T: AsRef<str>,
    {
        let columns = columns
            .into_iter()
            .map(|(name, type_name)| ColumnPlan {
                name: name.into(),
                decoder: ColumnDecoder::for_type_name(type_name.as_ref()),
            })
            .collect();
        Self { columns }
    }

    /// Build from a described statement
    pub fn from_statement(statement: &tokio_postgres::Statement) -> Self {
        Self::from_columns(
            statement
                .columns()
                .iter()
                .map(|c| (c.name(), c.type_().name())),
        )
    }

    /// Plan for a result set whose column types are unknown: every column
    /// keeps its text
    pub fn untyped<I, N>(names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        let columns = names
            .into_iter()
            .map(|name| ColumnPlan {
                name: name.into(),
                decoder: ColumnDecoder::Text,
            })
            .collect();
        Self { columns }
    }

    /// Planned columns in result-set order
    pub fn columns(&self) -> &[ColumnPlan] {
        &self.columns
    }

    /// Decode one row of text-format cells
    pub fn decode_row<'a, I>(&self, cells: I) -> Result<Record>
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut record = Record::new();
        let mut cells = cells.into_iter();

        for column in &self.columns {
            let raw = cells.next().ok_or_else(|| Error::Decode {
                column: column.name.clone(),
                reason: "row has fewer cells than the result set has columns".into(),
            })?;
            let value = column.decoder.decode(raw).map_err(|reason| Error::Decode {
                column: column.name.clone(),
                reason,
            })?;
            record.insert(column.name.clone(), value);
        }

        if cells.next().is_some() {
            return Err(Error::Decode {
                column: String::new(),
                reason: format!(
                    "row has more cells than the {} planned columns",
                    self.columns.len()
                ),
            });
        }

        Ok(record)
    }
}

/// Ordered decoded records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QueryResult {
    records: Vec<Record>,
}

impl QueryResult {
    /// Append a record
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Records in result-set order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether there are no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Serialize as a JSON array of objects
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
