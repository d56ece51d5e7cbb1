use std::{fmt, num::ParseFloatError};

use super::{ColumnKind, Table};

/// A single cell value as held by the store.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    /// Interpret raw text (a CSV cell or query parameter) for a column kind.
    /// Blank real cells are NULL; text is kept as given.
    pub fn from_cell(kind: ColumnKind, raw: &str) -> Result<Self, ParseFloatError> {
        match kind {
            ColumnKind::Text => Ok(Value::Text(raw.to_string())),
            ColumnKind::Real => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    Ok(Value::Null)
                } else {
                    trimmed.parse().map(Value::Real)
                }
            }
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Real(v) => Some(*v),
            Value::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// Renders the way a CSV cell is written: NULL is an empty string.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Real(v) => write!(f, "{v}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// One row read back from any table, in catalogue column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub table: Table,
    pub id: i64,
    pub values: Vec<(&'static str, Value)>,
}

impl Record {
    /// Value of a catalogue column. `id` is not a catalogue column and
    /// always yields `None`; read it from [`Record::id`].
    pub fn get(&self, column: &str) -> Option<&Value> {
        if column == "id" {
            return None;
        }
        self.values.iter().find(|(name, _)| *name == column).map(|(_, v)| v)
    }

    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(Value::as_str)
    }

    pub fn real(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(Value::as_f64)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Record {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.values.len() + 1))?;
        map.serialize_entry("id", &self.id)?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_real_cell_is_null() {
        assert_eq!(Value::from_cell(ColumnKind::Real, "  ").unwrap(), Value::Null);
        assert_eq!(Value::from_cell(ColumnKind::Real, "-1.2864").unwrap(), Value::Real(-1.2864));
        assert!(Value::from_cell(ColumnKind::Real, "north").is_err());
    }

    #[test]
    fn blank_text_cell_stays_empty_string() {
        assert_eq!(Value::from_cell(ColumnKind::Text, "").unwrap(), Value::Text(String::new()));
    }

    #[test]
    fn id_is_a_field_not_a_column_value() {
        let record = Record {
            table: Table::Poles,
            id: 7,
            values: vec![("location", Value::from("Nairobi CBD")), ("latitude", Value::Null)],
        };
        assert_eq!(record.id, 7);
        assert_eq!(record.get("id"), None);
        assert_eq!(record.text("location"), Some("Nairobi CBD"));
        assert_eq!(record.get("latitude"), Some(&Value::Null));
        assert_eq!(record.get("colour"), None);
    }

    #[test]
    fn null_displays_as_empty_cell() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Real(36.8172).to_string(), "36.8172");
    }
}
