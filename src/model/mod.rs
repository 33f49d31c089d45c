//! Core data model shared by the store, the table view and the forms.
//!
//! Survey tables have no fixed schema on the viewing side: a [`Row`] is an
//! ordered mapping from raw column name to a closed [`Value`] variant, and the
//! sequence of [`ColumnDescriptor`]s returned by the store drives both header
//! rendering and per-cell lookup.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fmt::format_column_name;

/// Which survey population a table view targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    #[default]
    Student,
    Parent,
    Teacher,
}

impl EntityKind {
    pub fn all() -> &'static [EntityKind] {
        &[EntityKind::Student, EntityKind::Parent, EntityKind::Teacher]
    }

    /// Backing table in the record store.
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityKind::Student => "student_surveys",
            EntityKind::Parent => "parent_surveys",
            EntityKind::Teacher => "teacher_surveys",
        }
    }

    /// Tab title.
    pub fn title(&self) -> &'static str {
        match self {
            EntityKind::Student => "Students",
            EntityKind::Parent => "Parents",
            EntityKind::Teacher => "Teachers",
        }
    }

    /// Parses the names accepted on the command line ("students", "parent", ...).
    pub fn parse(s: &str) -> Option<EntityKind> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" | "students" => Some(EntityKind::Student),
            "parent" | "parents" => Some(EntityKind::Parent),
            "teacher" | "teachers" => Some(EntityKind::Teacher),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    /// Raw rendering: no label transforms, integral numbers without a fraction.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::String(s) => f.write_str(s),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
            serde_json::Value::String(s) => Value::String(s),
            // Arrays and objects are carried as their JSON text.
            other => Value::String(other.to_string()),
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(v: &Value) -> Self {
        match v {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            // Integral values go out as JSON integers: integer columns reject "14.0".
            Value::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 9.0e15 => {
                serde_json::Value::Number(serde_json::Number::from(*n as i64))
            }
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

/// Name of the field every row carries as its rendering key.
pub const ROW_ID_FIELD: &str = "id";

/// One record as returned by the store. Field order is preserved.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    fields: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert; replaces an existing field of the same name.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Returns the value for `name`, or `None` if the row has no such field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Value lookup used by rendering: absent fields read as `Null`.
    pub fn value(&self, name: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.get(name).unwrap_or(&NULL)
    }

    /// Opaque row key.
    pub fn id(&self) -> String {
        self.value(ROW_ID_FIELD).to_string()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Converts a JSON object (e.g. `to_jsonb(t)` output) into a row.
    /// Returns `None` for anything that is not an object.
    pub fn from_json(json: serde_json::Value) -> Option<Row> {
        match json {
            serde_json::Value::Object(map) => Some(Row {
                fields: map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            }),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                .collect(),
        )
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (k, v) in iter {
            row.set(k, v);
        }
        row
    }
}

/// Column type annotation supplied alongside a column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnType {
    Boolean,
    Integer,
    Number,
    Text,
    Date,
    Timestamp,
    /// Source did not say; cell formatting falls back to name heuristics.
    #[default]
    Unknown,
}

impl ColumnType {
    /// Maps an `information_schema.columns.data_type` string.
    pub fn from_sql_type(data_type: &str) -> ColumnType {
        let t = data_type.trim().to_ascii_lowercase();
        match t.as_str() {
            "boolean" | "bool" => ColumnType::Boolean,
            "smallint" | "integer" | "bigint" | "int2" | "int4" | "int8" => ColumnType::Integer,
            "real" | "double precision" | "numeric" | "decimal" | "float4" | "float8" => {
                ColumnType::Number
            }
            "text" | "character varying" | "character" | "varchar" | "char" | "uuid" => {
                ColumnType::Text
            }
            "date" => ColumnType::Date,
            _ if t.starts_with("timestamp") => ColumnType::Timestamp,
            _ => ColumnType::Unknown,
        }
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, ColumnType::Date | ColumnType::Timestamp)
    }
}

/// Column metadata. The display name is always derived from `raw_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub raw_name: String,
    pub column_type: ColumnType,
}

impl ColumnDescriptor {
    /// Untyped descriptor.
    pub fn new(raw_name: impl Into<String>) -> Self {
        Self {
            raw_name: raw_name.into(),
            column_type: ColumnType::Unknown,
        }
    }

    pub fn typed(raw_name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            raw_name: raw_name.into(),
            column_type,
        }
    }

    pub fn display_name(&self) -> String {
        format_column_name(&self.raw_name)
    }

    /// Header text as rendered: the grade column is labelled "Class".
    pub fn header_label(&self) -> String {
        let display = self.display_name();
        if display == "Grade" {
            "Class".to_string()
        } else {
            display
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_kind_maps_to_tables() {
        assert_eq!(EntityKind::Student.table_name(), "student_surveys");
        assert_eq!(EntityKind::Parent.table_name(), "parent_surveys");
        assert_eq!(EntityKind::Teacher.table_name(), "teacher_surveys");
        assert_eq!(EntityKind::parse("Teachers"), Some(EntityKind::Teacher));
        assert_eq!(EntityKind::parse("admins"), None);
    }

    #[test]
    fn header_label_relabels_grade() {
        assert_eq!(ColumnDescriptor::new("grade").header_label(), "Class");
        assert_eq!(ColumnDescriptor::new("device_hours").header_label(), "Device Hours");
        assert_eq!(ColumnDescriptor::new("grade").display_name(), "Grade");
    }

    #[test]
    fn row_lookup_and_key() {
        let row = Row::new().with("id", 7i64).with("gender", "female");
        assert_eq!(row.id(), "7");
        assert_eq!(row.value("gender"), &Value::from("female"));
        assert!(row.value("missing").is_null());
        assert!(row.get("missing").is_none());
    }

    #[test]
    fn row_from_json_converts_values() {
        let json = serde_json::json!({
            "id": 3,
            "night_use": "yes",
            "checked": true,
            "note": null,
            "tags": ["a", "b"],
        });
        let row = Row::from_json(json).unwrap();
        assert_eq!(row.value("id"), &Value::Number(3.0));
        assert_eq!(row.value("checked"), &Value::Bool(true));
        assert!(row.value("note").is_null());
        assert_eq!(row.value("tags"), &Value::from(r#"["a","b"]"#));
        assert!(Row::from_json(serde_json::json!([1, 2])).is_none());
    }

    #[test]
    fn row_to_json_writes_integral_numbers_as_integers() {
        let row = Row::new()
            .with("age", 14i64)
            .with("device_hours", 2.5)
            .with("count", Value::Number(3.0));
        let json = row.to_json();
        assert_eq!(
            json,
            serde_json::json!({"age": 14, "device_hours": 2.5, "count": 3})
        );
        assert_eq!(
            serde_json::to_string(&Row::new().with("age", 14i64).to_json()).unwrap(),
            r#"{"age":14}"#
        );
        assert_eq!(
            serde_json::Value::from(&Value::Number(f64::NAN)),
            serde_json::Value::Null
        );
    }

    #[test]
    fn value_display_keeps_numbers_as_is() {
        assert_eq!(Value::Number(14.0).to_string(), "14");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(Value::from("A+").to_string(), "A+");
    }

    #[test]
    fn column_type_from_sql() {
        assert_eq!(ColumnType::from_sql_type("timestamp with time zone"), ColumnType::Timestamp);
        assert_eq!(ColumnType::from_sql_type("bigint"), ColumnType::Integer);
        assert_eq!(ColumnType::from_sql_type("character varying"), ColumnType::Text);
        assert_eq!(ColumnType::from_sql_type("jsonb"), ColumnType::Unknown);
        assert!(ColumnType::Date.is_temporal());
    }
}
