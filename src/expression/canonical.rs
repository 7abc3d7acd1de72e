//! Canonical hash keys and the membership index built from IN candidates.
//!
//! A key is computed by converting a literal (or every column of a row
//! literal) to the promoted comparison type, encoding the converted value with
//! bincode and hashing the bytes with a fixed-seed ahash. Two literals that
//! convert to the same canonical value therefore share a key no matter how
//! they were written: `5` as INT and `5` as BIGINT, compared against a BIGINT
//! column, collide on purpose.

use crate::access::{DataType, Value};
use crate::expression::{Expression, ExpressionError, ExpressionResult, Literal};
use ahash::RandomState;
use log::debug;
use std::collections::HashMap;

const SEEDS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

/// Hash plus the canonical encoding it was computed from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalKey {
    pub hash: u64,
    pub encoding: Vec<u8>,
}

impl CanonicalKey {
    fn from_value(value: &Value) -> ExpressionResult<Self> {
        let encoding =
            bincode::serialize(value).map_err(|e| ExpressionError::EvaluationError {
                message: format!("failed to encode hash key {}: {}", value, e),
            })?;
        let state = RandomState::with_seeds(SEEDS[0], SEEDS[1], SEEDS[2], SEEDS[3]);
        let hash = state.hash_one(encoding.as_slice());
        Ok(Self { hash, encoding })
    }
}

/// Compute the key of a literal or a tuple of literals under `data_type`
pub fn hash_of(expr: &Expression, data_type: &DataType) -> ExpressionResult<CanonicalKey> {
    match expr {
        Expression::Literal(lit) => hash_of_literal(lit, data_type),
        Expression::Tuple(elements) => match data_type {
            DataType::Tuple(types) => hash_of_tuple(elements, types),
            other => Err(ExpressionError::UnsupportedOperandShape {
                context: "hash IN",
                expected: "a row type for a row value",
                operand: expr.to_string(),
                data_type: other.clone(),
            }),
        },
        other => Err(ExpressionError::UnsupportedOperandShape {
            context: "hash IN",
            expected: "a literal or a tuple of literals",
            operand: other.to_string(),
            data_type: other.data_type(),
        }),
    }
}

pub fn hash_of_literal(lit: &Literal, data_type: &DataType) -> ExpressionResult<CanonicalKey> {
    let converted = data_type.promote().convert(&lit.value)?;
    CanonicalKey::from_value(&converted)
}

/// Hash a row of literals, each column under its own promoted type
pub fn hash_of_tuple(elements: &[Expression], types: &[DataType]) -> ExpressionResult<CanonicalKey> {
    if elements.len() != types.len() {
        let row = Expression::Tuple(elements.to_vec());
        return Err(ExpressionError::ArityMismatch {
            expected: types.len(),
            actual: elements.len(),
            data_type: row.data_type(),
            operand: row.to_string(),
        });
    }

    let mut converted = Vec::with_capacity(elements.len());
    for (element, data_type) in elements.iter().zip(types) {
        match element {
            Expression::Literal(lit) => converted.push(data_type.promote().convert(&lit.value)?),
            other => {
                return Err(ExpressionError::NestedExpressionUnsupported {
                    operand: other.to_string(),
                    data_type: other.data_type(),
                })
            }
        }
    }
    CanonicalKey::from_value(&Value::Tuple(converted))
}

/// A candidate kept in the index together with its canonical encoding
#[derive(Debug, Clone)]
struct IndexEntry {
    candidate: Expression,
    encoding: Vec<u8>,
}

/// Immutable lookup structure built once from the candidates of an IN list.
#[derive(Debug, Default)]
pub struct MembershipIndex {
    entries: HashMap<u64, Vec<IndexEntry>>,
    len: usize,
    always_unknown: bool,
    has_null_candidate: bool,
}

impl MembershipIndex {
    /// Build the index for `right` compared against a left operand of `left_type`.
    ///
    /// An error means the candidates cannot be indexed and the scanning
    /// predicate has to be kept. Single literals that fail to convert are left
    /// out of the index; every other problem rejects the whole candidate set.
    pub fn build(right: &Expression, left_type: &DataType) -> ExpressionResult<Self> {
        if left_type.is_null() {
            return Ok(Self {
                always_unknown: true,
                ..Self::default()
            });
        }

        let candidates = match right {
            Expression::Tuple(candidates) => candidates,
            other => {
                return Err(ExpressionError::UnsupportedOperandShape {
                    context: "hash IN",
                    expected: "a tuple of candidates",
                    operand: other.to_string(),
                    data_type: other.data_type(),
                })
            }
        };

        if let DataType::Tuple(types) = left_type {
            if let Some(nested) = types.iter().find(|t| matches!(t, DataType::Tuple(_))) {
                return Err(ExpressionError::NestedExpressionUnsupported {
                    operand: left_type.to_string(),
                    data_type: nested.clone(),
                });
            }
        }

        let left_columns = left_type.num_columns();
        let mut index = Self::default();

        for candidate in candidates {
            let candidate_type = candidate.data_type();
            if candidate_type.num_columns() != left_columns {
                return Err(ExpressionError::ArityMismatch {
                    expected: left_columns,
                    actual: candidate_type.num_columns(),
                    operand: candidate.to_string(),
                    data_type: candidate_type,
                });
            }

            match candidate {
                Expression::Literal(lit) if lit.value.is_null() => {
                    index.has_null_candidate = true;
                }
                Expression::Literal(lit) if lit.value.has_null_column() => {
                    return Err(null_column_error(candidate));
                }
                Expression::Literal(lit) => match hash_of_literal(lit, left_type) {
                    Ok(key) => index.insert(key, candidate),
                    Err(ExpressionError::Conversion(err)) => {
                        debug!("hash IN skips candidate {}: {}", candidate, err);
                    }
                    Err(err) => return Err(err),
                },
                Expression::Tuple(elements) => {
                    let has_null = elements
                        .iter()
                        .any(|e| matches!(e, Expression::Literal(lit) if lit.value.is_null()));
                    if has_null {
                        return Err(null_column_error(candidate));
                    }
                    let key = hash_of(candidate, left_type)?;
                    index.insert(key, candidate);
                }
                other => {
                    return Err(ExpressionError::UnsupportedOperandShape {
                        context: "hash IN",
                        expected: "literal or tuple candidates",
                        operand: other.to_string(),
                        data_type: other.data_type(),
                    })
                }
            }
        }

        Ok(index)
    }

    fn insert(&mut self, key: CanonicalKey, candidate: &Expression) {
        let bucket = self.entries.entry(key.hash).or_default();
        if bucket.iter().any(|entry| entry.encoding == key.encoding) {
            return;
        }
        bucket.push(IndexEntry {
            candidate: candidate.clone(),
            encoding: key.encoding,
        });
        self.len += 1;
    }

    /// Find the candidate whose canonical encoding equals `key`.
    ///
    /// Entries sharing a 64-bit hash are told apart by their encoding.
    pub fn probe(&self, key: &CanonicalKey) -> Option<&Expression> {
        self.entries
            .get(&key.hash)?
            .iter()
            .find(|entry| entry.encoding == key.encoding)
            .map(|entry| &entry.candidate)
    }

    /// True if the left operand has the null type, so every comparison is unknown
    pub fn always_unknown(&self) -> bool {
        self.always_unknown
    }

    /// True if one of the candidates was a NULL literal
    pub fn has_null_candidate(&self) -> bool {
        self.has_null_candidate
    }

    /// Number of distinct canonical keys
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

fn null_column_error(candidate: &Expression) -> ExpressionError {
    ExpressionError::UnsupportedOperandShape {
        context: "hash IN",
        expected: "row candidates without NULL columns",
        operand: candidate.to_string(),
        data_type: candidate.data_type(),
    }
}
