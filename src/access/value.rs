use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// Data types supported by the engine
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Type of an untyped NULL literal
    Null,
    Boolean,
    Int16,
    Int32,
    Int64,
    Float64,
    Varchar,
    /// Row value made of positional columns
    Tuple(Vec<DataType>),
}

impl DataType {
    pub fn is_null(&self) -> bool {
        matches!(self, DataType::Null)
    }

    /// Widen this type to the type used when comparing values of it.
    ///
    /// All integer widths share `Int64` so that literals written with different
    /// widths compare (and hash) identically.
    pub fn promote(&self) -> DataType {
        match self {
            DataType::Int16 | DataType::Int32 | DataType::Int64 => DataType::Int64,
            DataType::Tuple(types) => DataType::Tuple(types.iter().map(|t| t.promote()).collect()),
            other => other.clone(),
        }
    }

    /// Number of columns a value of this type occupies
    pub fn num_columns(&self) -> usize {
        match self {
            DataType::Tuple(types) => types.len(),
            _ => 1,
        }
    }

    /// Convert a value into the representation of this type.
    ///
    /// NULL converts to NULL for every type, and every value converts to NULL
    /// under the NULL type. After a successful conversion the representation
    /// of the value is fully determined by `self`.
    pub fn convert(&self, value: &Value) -> Result<Value, ConversionError> {
        if value.is_null() {
            return Ok(Value::Null);
        }

        let fail = || ConversionError::new(value.clone(), self.clone());

        match self {
            DataType::Null => Ok(Value::Null),
            DataType::Boolean => match value {
                Value::Boolean(b) => Ok(Value::Boolean(*b)),
                Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "t" | "1" => Ok(Value::Boolean(true)),
                    "false" | "f" | "0" => Ok(Value::Boolean(false)),
                    _ => Err(fail()),
                },
                other => as_i64(other).map(|n| Value::Boolean(n != 0)).ok_or_else(fail),
            },
            DataType::Int16 => as_i64(value)
                .and_then(|n| i16::try_from(n).ok())
                .map(Value::Int16)
                .ok_or_else(fail),
            DataType::Int32 => as_i64(value)
                .and_then(|n| i32::try_from(n).ok())
                .map(Value::Int32)
                .ok_or_else(fail),
            DataType::Int64 => as_i64(value).map(Value::Int64).ok_or_else(fail),
            DataType::Float64 => as_f64(value)
                .map(|f| Value::Float64(normalize_f64(f)))
                .ok_or_else(fail),
            DataType::Varchar => match value {
                Value::String(s) => Ok(Value::String(s.clone())),
                Value::Boolean(b) => Ok(Value::String(b.to_string())),
                Value::Int16(n) => Ok(Value::String(n.to_string())),
                Value::Int32(n) => Ok(Value::String(n.to_string())),
                Value::Int64(n) => Ok(Value::String(n.to_string())),
                Value::Float64(f) => Ok(Value::String(f.to_string())),
                Value::Null | Value::Tuple(_) => Err(fail()),
            },
            DataType::Tuple(types) => match value {
                Value::Tuple(values) if values.len() == types.len() => types
                    .iter()
                    .zip(values)
                    .map(|(t, v)| t.convert(v))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Tuple),
                _ => Err(fail()),
            },
        }
    }

    /// Compare two values after converting both to this type.
    ///
    /// Returns `Ok(None)` when the result is unknown, i.e. a NULL was reached
    /// before a decisive difference. Row values compare column by column.
    pub fn compare(&self, a: &Value, b: &Value) -> Result<Option<Ordering>, ConversionError> {
        let a = self.convert(a)?;
        let b = self.convert(b)?;
        compare_converted(&a, &b)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Null => write!(f, "NULL"),
            DataType::Boolean => write!(f, "BOOLEAN"),
            DataType::Int16 => write!(f, "SMALLINT"),
            DataType::Int32 => write!(f, "INT"),
            DataType::Int64 => write!(f, "BIGINT"),
            DataType::Float64 => write!(f, "DOUBLE"),
            DataType::Varchar => write!(f, "VARCHAR"),
            DataType::Tuple(types) => {
                write!(f, "TUPLE(")?;
                for (i, t) in types.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", t)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Values that can be produced by expressions and stored in rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Boolean(bool),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    String(String),
    Tuple(Vec<Value>),
}

impl Value {
    /// Get the data type of this value
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Null => DataType::Null,
            Value::Boolean(_) => DataType::Boolean,
            Value::Int16(_) => DataType::Int16,
            Value::Int32(_) => DataType::Int32,
            Value::Int64(_) => DataType::Int64,
            Value::Float64(_) => DataType::Float64,
            Value::String(_) => DataType::Varchar,
            Value::Tuple(values) => DataType::Tuple(values.iter().map(|v| v.data_type()).collect()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True if this is a row value with at least one NULL column
    pub fn has_null_column(&self) -> bool {
        match self {
            Value::Tuple(values) => values.iter().any(|v| v.is_null() || v.has_null_column()),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Int16(n) => write!(f, "{}", n),
            Value::Int32(n) => write!(f, "{}", n),
            Value::Int64(n) => write!(f, "{}", n),
            Value::Float64(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "'{}'", s),
            Value::Tuple(values) => {
                write!(f, "(")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// A value could not be represented in the requested type
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot convert {value} of type {} to {target}", .value.data_type())]
pub struct ConversionError {
    pub value: Value,
    pub target: DataType,
}

impl ConversionError {
    pub fn new(value: Value, target: DataType) -> Self {
        Self { value, target }
    }
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Boolean(b) => Some(i64::from(*b)),
        Value::Int16(n) => Some(i64::from(*n)),
        Value::Int32(n) => Some(i64::from(*n)),
        Value::Int64(n) => Some(*n),
        Value::Float64(f) => {
            if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 {
                Some(*f as i64)
            } else {
                None
            }
        }
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Null | Value::Tuple(_) => None,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Int16(n) => Some(f64::from(*n)),
        Value::Int32(n) => Some(f64::from(*n)),
        Value::Int64(n) => Some(*n as f64),
        Value::Float64(f) => Some(*f),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Null | Value::Tuple(_) => None,
    }
}

// -0.0 and every NaN payload collapse to a single representation.
fn normalize_f64(f: f64) -> f64 {
    if f == 0.0 {
        0.0
    } else if f.is_nan() {
        f64::NAN
    } else {
        f
    }
}

fn compare_converted(a: &Value, b: &Value) -> Result<Option<Ordering>, ConversionError> {
    let ordering = match (a, b) {
        (Value::Null, _) | (_, Value::Null) => return Ok(None),
        (Value::Boolean(x), Value::Boolean(y)) => x.cmp(y),
        (Value::Int16(x), Value::Int16(y)) => x.cmp(y),
        (Value::Int32(x), Value::Int32(y)) => x.cmp(y),
        (Value::Int64(x), Value::Int64(y)) => x.cmp(y),
        (Value::Float64(x), Value::Float64(y)) => x.total_cmp(y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Tuple(xs), Value::Tuple(ys)) => {
            for (x, y) in xs.iter().zip(ys) {
                match compare_converted(x, y)? {
                    Some(Ordering::Equal) => continue,
                    other => return Ok(other),
                }
            }
            xs.len().cmp(&ys.len())
        }
        _ => return Err(ConversionError::new(b.clone(), a.data_type())),
    };
    Ok(Some(ordering))
}
