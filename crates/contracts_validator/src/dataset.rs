//! Dataset representation for validation.
//!
//! Records arrive as JSON and are converted to [`DataValue`] trees, which keep
//! booleans, integers and floats distinct so type checks never confuse them.

use std::collections::HashMap;
use std::fmt;

use serde_json::{Number, Value};

use crate::InputError;

/// A value in a dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    /// Null/missing value
    Null,
    /// String value
    String(String),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// Map/struct value
    Map(HashMap<String, DataValue>),
    /// List/array value
    List(Vec<DataValue>),
}

impl DataValue {
    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    /// Returns the type name of this value, as used in type mismatch messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            DataValue::Null => "null",
            DataValue::String(_) => "string",
            DataValue::Int(_) => "integer",
            DataValue::Float(_) => "float",
            DataValue::Bool(_) => "boolean",
            DataValue::Map(_) => "object",
            DataValue::List(_) => "array",
        }
    }

    /// Attempts to get this value as a string.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            DataValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to get this value as a number; integers are widened.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            DataValue::Float(f) => Some(*f),
            DataValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Converts a JSON value. Integers beyond `i64` become floats.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => DataValue::Null,
            Value::Bool(b) => DataValue::Bool(*b),
            Value::Number(n) => number(n),
            Value::String(s) => DataValue::String(s.clone()),
            Value::Array(items) => DataValue::List(items.iter().map(DataValue::from_json).collect()),
            Value::Object(map) => DataValue::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), DataValue::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Converts back to JSON. Non-finite floats become null.
    pub fn to_json(&self) -> Value {
        match self {
            DataValue::Null => Value::Null,
            DataValue::String(s) => Value::String(s.clone()),
            DataValue::Int(i) => Value::from(*i),
            DataValue::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
            DataValue::Bool(b) => Value::Bool(*b),
            DataValue::Map(map) => Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            DataValue::List(items) => Value::Array(items.iter().map(DataValue::to_json).collect()),
        }
    }
}

fn number(n: &Number) -> DataValue {
    match n.as_i64() {
        Some(i) => DataValue::Int(i),
        None => DataValue::Float(n.as_f64().unwrap_or(f64::NAN)),
    }
}

/// Strings print raw; floats keep their fraction; composites print as JSON.
impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Null => f.write_str("null"),
            DataValue::String(s) => f.write_str(s),
            DataValue::Int(i) => write!(f, "{}", i),
            DataValue::Float(x) => write!(f, "{:?}", x),
            DataValue::Bool(b) => write!(f, "{}", b),
            DataValue::Map(_) | DataValue::List(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl From<String> for DataValue {
    fn from(s: String) -> Self {
        DataValue::String(s)
    }
}

impl From<&str> for DataValue {
    fn from(s: &str) -> Self {
        DataValue::String(s.to_string())
    }
}

impl From<i64> for DataValue {
    fn from(i: i64) -> Self {
        DataValue::Int(i)
    }
}

impl From<f64> for DataValue {
    fn from(f: f64) -> Self {
        DataValue::Float(f)
    }
}

impl From<bool> for DataValue {
    fn from(b: bool) -> Self {
        DataValue::Bool(b)
    }
}

impl From<&Value> for DataValue {
    fn from(value: &Value) -> Self {
        DataValue::from_json(value)
    }
}

/// A single record of data.
pub type DataRow = HashMap<String, DataValue>;

/// Converts a JSON object into a record.
pub fn row_from_json(value: &Value, index: usize) -> Result<DataRow, InputError> {
    match value {
        Value::Object(map) => Ok(map
            .iter()
            .map(|(k, v)| (k.clone(), DataValue::from_json(v)))
            .collect()),
        other => Err(InputError::NotARecord {
            index,
            found: json_type_name(other),
        }),
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The top level of a records payload: one record or a batch.
#[derive(Debug, Clone, Copy)]
pub enum Payload<'a> {
    Record(&'a Value),
    Batch(&'a [Value]),
}

impl<'a> Payload<'a> {
    /// Classifies a JSON document. Scalars and nulls are rejected.
    pub fn from_json(value: &'a Value) -> Result<Self, InputError> {
        match value {
            Value::Object(_) => Ok(Payload::Record(value)),
            Value::Array(records) => Ok(Payload::Batch(records)),
            other => Err(InputError::UnsupportedPayload(json_type_name(other))),
        }
    }
}

/// A batch of records validated together.
#[derive(Debug, Clone)]
pub struct DataSet {
    /// The data rows
    rows: Vec<DataRow>,
}

impl DataSet {
    /// Creates a new empty dataset.
    pub fn empty() -> Self {
        Self { rows: Vec::new() }
    }

    /// Creates a new dataset from rows.
    pub fn from_rows(rows: Vec<DataRow>) -> Self {
        Self { rows }
    }

    /// Creates a dataset from JSON objects; any non-object fails the whole batch.
    pub fn from_json(values: &[Value]) -> Result<Self, InputError> {
        values
            .iter()
            .enumerate()
            .map(|(index, value)| row_from_json(value, index))
            .collect()
    }

    /// Returns the number of rows in the dataset.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns an iterator over the rows.
    pub fn rows(&self) -> impl Iterator<Item = &DataRow> {
        self.rows.iter()
    }

    /// Gets a specific row by index.
    pub fn get_row(&self, index: usize) -> Option<&DataRow> {
        self.rows.get(index)
    }

    /// Takes the first `size` rows of the dataset.
    ///
    /// If `size` is greater than the number of rows, returns all rows.
    pub fn sample(&self, size: usize) -> DataSet {
        let sample_size = size.min(self.rows.len());
        DataSet {
            rows: self.rows.iter().take(sample_size).cloned().collect(),
        }
    }
}

impl Default for DataSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl FromIterator<DataRow> for DataSet {
    fn from_iter<T: IntoIterator<Item = DataRow>>(iter: T) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}
