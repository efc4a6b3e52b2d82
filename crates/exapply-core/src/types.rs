//! Row and value types flowing between operators.
//!
//! A `Row` is an ordered tuple of named values. Column names are shared
//! between clones; values are not, so a clone can be mutated or dropped
//! without touching the original.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    Null,
    Bool(bool),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Str(String),
    Bin(Vec<u8>),
}

impl Scalar {
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    /// Compare two scalars of compatible types.
    ///
    /// Returns `None` when either side is null or the types cannot be ordered
    /// against each other. Integer widths and float widths are compared
    /// numerically.
    pub fn compare(&self, other: &Scalar) -> Option<Ordering> {
        use Scalar::*;

        match (self, other) {
            (Null, _) | (_, Null) => None,
            (Bool(x), Bool(y)) => Some(x.cmp(y)),
            (I32(x), I32(y)) => Some(x.cmp(y)),
            (I64(x), I64(y)) => Some(x.cmp(y)),
            (I32(x), I64(y)) => Some(i64::from(*x).cmp(y)),
            (I64(x), I32(y)) => Some(x.cmp(&i64::from(*y))),
            (F32(x), F32(y)) => x.partial_cmp(y),
            (F64(x), F64(y)) => x.partial_cmp(y),
            (F32(x), F64(y)) => f64::from(*x).partial_cmp(y),
            (F64(x), F32(y)) => x.partial_cmp(&f64::from(*y)),
            (Str(x), Str(y)) => Some(x.cmp(y)),
            (Bin(x), Bin(y)) => Some(x.cmp(y)),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "NULL"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::I32(i) => write!(f, "{i}"),
            Scalar::I64(i) => write!(f, "{i}"),
            Scalar::F32(x) => write!(f, "{x}"),
            Scalar::F64(x) => write!(f, "{x}"),
            Scalar::Str(s) => write!(f, "{s}"),
            Scalar::Bin(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::I64(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::I32(v)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Str(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Str(v)
    }
}

/// One result row: ordered, named values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    names: Arc<Vec<String>>,
    values: Vec<Scalar>,
}

impl Row {
    /// Build a row from parallel name/value lists.
    ///
    /// Panics if the lengths differ; rows are built by operators that control
    /// both sides.
    pub fn new(names: Arc<Vec<String>>, values: Vec<Scalar>) -> Self {
        assert_eq!(
            names.len(),
            values.len(),
            "row arity mismatch: {} names, {} values",
            names.len(),
            values.len()
        );
        Self { names, values }
    }

    /// Convenience constructor from `(name, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Scalar>,
    {
        let (names, values): (Vec<String>, Vec<Scalar>) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self {
            names: Arc::new(names),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[Scalar] {
        &self.values
    }

    pub fn get(&self, idx: usize) -> Option<&Scalar> {
        self.values.get(idx)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Scalar> {
        self.index_of(name).and_then(|i| self.values.get(i))
    }

    /// Return a new row with one extra column appended.
    ///
    /// If `name` already exists its value is overwritten instead, so repeated
    /// expansion over the same alias does not grow the row.
    pub fn with_column(mut self, name: &str, value: Scalar) -> Self {
        if let Some(idx) = self.index_of(name) {
            self.values[idx] = value;
            return self;
        }
        let mut names = (*self.names).clone();
        names.push(name.to_string());
        self.names = Arc::new(names);
        self.values.push(value);
        self
    }
}

/// Boolean connective handed to plan construction for a set of existential
/// sub-conditions. Only `And`/`Or` can be evaluated by an apply multiplexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoolOperator {
    And,
    Or,
    Xor,
    Not,
}

impl fmt::Display for BoolOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BoolOperator::And => "AND",
            BoolOperator::Or => "OR",
            BoolOperator::Xor => "XOR",
            BoolOperator::Not => "NOT",
        };
        f.write_str(s)
    }
}
