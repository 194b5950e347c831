//! Core data model types.
//!
//! A file is first read into a [`RawGrid`] (rows of cells, no column identity). Once a header row
//! is chosen the grid is promoted into a [`DataSet`]: a [`Schema`] of named, typed [`Field`]s plus
//! row-major [`Value`] storage. Normalization keeps the same shape and only renames, coerces and
//! appends columns.

use chrono::NaiveDate;
use serde::Serialize;

/// Logical data type for a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Utf8,
    /// Calendar date.
    Date,
    /// Column holds more than one kind of non-null value (common in spreadsheet exports).
    Mixed,
}

impl DataType {
    /// Infer a column type from its values. Nulls are ignored; an all-null column is `Utf8`.
    pub fn infer<'a>(values: impl IntoIterator<Item = &'a Value>) -> Self {
        let mut seen: Option<DataType> = None;
        for v in values {
            let t = match v {
                Value::Null => continue,
                Value::Int64(_) => DataType::Int64,
                Value::Float64(_) => DataType::Float64,
                Value::Bool(_) => DataType::Bool,
                Value::Utf8(_) => DataType::Utf8,
                Value::Date(_) => DataType::Date,
            };
            seen = match seen {
                None => Some(t),
                Some(prev) if prev == t => Some(prev),
                Some(DataType::Int64) if t == DataType::Float64 => Some(DataType::Float64),
                Some(DataType::Float64) if t == DataType::Int64 => Some(DataType::Float64),
                Some(_) => return DataType::Mixed,
            };
        }
        seen.unwrap_or(DataType::Utf8)
    }
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Ordered list of fields describing the shape of a [`DataSet`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// True if a field with this exact name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }
}

/// A single cell value.
///
/// Serializes untagged: `Null` as JSON `null`, dates as `YYYY-MM-DD` strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
    /// Calendar date.
    Date(NaiveDate),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value, if it holds a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int64(i) => Some(*i as f64),
            Value::Float64(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Utf8(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Render the value the way a spreadsheet would display it. Whole floats drop the `.0`.
    ///
    /// Returns `None` for [`Value::Null`].
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Int64(i) => Some(i.to_string()),
            Value::Float64(f) => {
                if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
                    Some((*f as i64).to_string())
                } else {
                    Some(f.to_string())
                }
            }
            Value::Bool(b) => Some(b.to_string()),
            Value::Utf8(s) => Some(s.clone()),
            Value::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        }
    }
}

/// Header-less grid of cells, exactly as read from the file.
///
/// Row indices are 0-based and match the file's physical rows. Rows may have different lengths.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawGrid {
    pub rows: Vec<Vec<Value>>,
}

impl RawGrid {
    pub fn new(rows: Vec<Vec<Value>>) -> Self {
        Self { rows }
    }

    /// Build a grid of text cells; empty strings become [`Value::Null`]. Handy for tests.
    pub fn from_text_rows<R, S>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| {
                        let cell = cell.as_ref();
                        if cell.trim().is_empty() {
                            Value::Null
                        } else {
                            Value::Utf8(cell.to_string())
                        }
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, idx: usize) -> Option<&[Value]> {
        self.rows.get(idx).map(|r| r.as_slice())
    }

    /// True if no cell in the grid holds a value.
    pub fn is_blank(&self) -> bool {
        self.rows.iter().all(|r| r.iter().all(Value::is_null))
    }
}

/// In-memory tabular dataset.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields; every row has
/// exactly `schema.fields.len()` cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Create a dataset from column names, inferring each column's [`DataType`].
    ///
    /// Rows shorter than `columns` are padded with nulls; longer rows are truncated.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let width = columns.len();
        let rows: Vec<Vec<Value>> = rows
            .into_iter()
            .map(|mut r| {
                r.resize(width, Value::Null);
                r
            })
            .collect();
        let fields = columns
            .into_iter()
            .enumerate()
            .map(|(idx, name)| Field::new(name, DataType::infer(rows.iter().map(|r| &r[idx]))))
            .collect();
        Self {
            schema: Schema::new(fields),
            rows,
        }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.schema.field_names().collect()
    }

    /// Value at (`row`, `column`), if both exist.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.schema.index_of(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// All values of one column, in row order.
    pub fn column_values(&self, column: &str) -> Option<Vec<&Value>> {
        let idx = self.schema.index_of(column)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// Replace every value of an existing column with `f(old)`, then re-infer its type.
    ///
    /// Returns `false` if the column does not exist.
    pub fn map_column<F>(&mut self, column: &str, mut f: F) -> bool
    where
        F: FnMut(&Value) -> Value,
    {
        let Some(idx) = self.schema.index_of(column) else {
            return false;
        };
        for row in &mut self.rows {
            row[idx] = f(&row[idx]);
        }
        self.schema.fields[idx].data_type = DataType::infer(self.rows.iter().map(|r| &r[idx]));
        true
    }

    /// Rename a column in place. Returns `false` if `from` does not exist.
    pub fn rename_column(&mut self, from: &str, to: impl Into<String>) -> bool {
        match self.schema.index_of(from) {
            Some(idx) => {
                self.schema.fields[idx].name = to.into();
                true
            }
            None => false,
        }
    }

    /// Append a column holding `value` in every row.
    pub fn push_constant_column(&mut self, name: impl Into<String>, data_type: DataType, value: Value) {
        self.schema.fields.push(Field::new(name, data_type));
        for row in &mut self.rows {
            row.push(value.clone());
        }
    }

    /// Records as JSON objects keyed by column name, for handing off to downstream stages.
    pub fn to_json_records(&self) -> serde_json::Value {
        let records = self
            .rows
            .iter()
            .map(|row| {
                let obj: serde_json::Map<String, serde_json::Value> = self
                    .schema
                    .fields
                    .iter()
                    .zip(row.iter())
                    .map(|(f, v)| {
                        (
                            f.name.clone(),
                            serde_json::to_value(v).unwrap_or(serde_json::Value::Null),
                        )
                    })
                    .collect();
                serde_json::Value::Object(obj)
            })
            .collect();
        serde_json::Value::Array(records)
    }
}
