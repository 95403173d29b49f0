//! Cell values held by table models.

use crate::error::ValueParseError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wire format for dates, both directions.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The concrete kind of a non-empty cell value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    #[default]
    Text,
    Number,
    Integer,
    Bool,
    Date,
}

impl ValueKind {
    /// Lowercase name used in configuration and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Bool => "bool",
            Self::Date => "date",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cell value in the table.
///
/// `Empty` is what a model reports for an in-range cell that holds no data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    /// Empty cell
    #[default]
    Empty,
    /// Text value
    Text(String),
    /// Floating point value
    Number(f64),
    /// Integral value
    Integer(i64),
    /// Boolean value
    Bool(bool),
    /// Calendar date
    Date(NaiveDate),
}

impl CellValue {
    /// Decode a value submitted by the client as raw text.
    ///
    /// Blank input decodes to [`CellValue::Empty`] for every kind except
    /// [`ValueKind::Text`], which keeps the text verbatim.
    pub fn parse(kind: ValueKind, raw: &str) -> Result<Self, ValueParseError> {
        let trimmed = raw.trim();
        let err = || ValueParseError::new(kind, raw);
        match kind {
            ValueKind::Text => Ok(Self::Text(raw.to_string())),
            _ if trimmed.is_empty() => Ok(Self::Empty),
            ValueKind::Number => trimmed.parse().map(Self::Number).map_err(|_| err()),
            ValueKind::Integer => trimmed.parse().map(Self::Integer).map_err(|_| err()),
            ValueKind::Bool => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => Ok(Self::Bool(true)),
                "false" | "0" | "no" | "off" => Ok(Self::Bool(false)),
                _ => Err(err()),
            },
            ValueKind::Date => NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
                .map(Self::Date)
                .map_err(|_| err()),
        }
    }

    /// Kind of the held value, `None` for an empty cell.
    #[must_use]
    pub const fn kind(&self) -> Option<ValueKind> {
        match self {
            Self::Empty => None,
            Self::Text(_) => Some(ValueKind::Text),
            Self::Number(_) => Some(ValueKind::Number),
            Self::Integer(_) => Some(ValueKind::Integer),
            Self::Bool(_) => Some(ValueKind::Bool),
            Self::Date(_) => Some(ValueKind::Date),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Get display text for the cell.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) => format!("{n}"),
            Self::Integer(n) => n.to_string(),
            Self::Bool(b) => if *b { "Yes" } else { "No" }.to_string(),
            Self::Date(d) => d.format(DATE_FORMAT).to_string(),
        }
    }

    /// JSON form sent to the client. Non-finite numbers become `null`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            Self::Empty => Value::Null,
            Self::Text(s) => Value::String(s.clone()),
            Self::Number(n) => serde_json::Number::from_f64(*n).map_or(Value::Null, Value::Number),
            Self::Integer(n) => Value::from(*n),
            Self::Bool(b) => Value::Bool(*b),
            Self::Date(d) => Value::String(d.format(DATE_FORMAT).to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl<T: Into<Self>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }
}
