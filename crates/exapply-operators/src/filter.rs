//! Filter operator with simple predicate evaluation.
//!
//! Supports expressions of the form "col OP literal" or "col OP $other_col"
//! where OP ∈ {==, !=, <, <=, >, >=}. The predicate is parsed once at
//! construction.

use std::cmp::Ordering;

use exapply_core::types::{Row, Scalar};

use crate::traits::{BoxedOperator, OpError, OpKind, Operator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    fn holds(self, ord: Ordering) -> bool {
        match self {
            CmpOp::Eq => ord == Ordering::Equal,
            CmpOp::Ne => ord != Ordering::Equal,
            CmpOp::Lt => ord == Ordering::Less,
            CmpOp::Le => ord != Ordering::Greater,
            CmpOp::Gt => ord == Ordering::Greater,
            CmpOp::Ge => ord != Ordering::Less,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Literal(String),
    Column(String),
}

#[derive(Debug, Clone, PartialEq)]
struct Predicate {
    column: String,
    op: CmpOp,
    rhs: Operand,
}

pub struct Filter {
    child: BoxedOperator,
    predicate: Predicate,
}

impl Filter {
    pub fn new(child: BoxedOperator, expr: &str) -> Result<Self, OpError> {
        Ok(Self {
            child,
            predicate: parse_simple_predicate(expr)?,
        })
    }

    fn matches(&self, row: &Row) -> Result<bool, OpError> {
        let Predicate { column, op, rhs } = &self.predicate;
        let val = row
            .get_by_name(column)
            .ok_or_else(|| OpError::Exec(format!("column '{}' not found", column)))?;

        match rhs {
            Operand::Literal(lit) => eval_predicate(val, *op, lit),
            Operand::Column(other) => {
                let rhs_val = row
                    .get_by_name(other)
                    .ok_or_else(|| OpError::Exec(format!("column '{}' not found", other)))?;
                // Null or incomparable types never satisfy a comparison.
                Ok(val.compare(rhs_val).is_some_and(|ord| op.holds(ord)))
            }
        }
    }
}

impl Operator for Filter {
    fn name(&self) -> &'static str {
        "Filter"
    }

    fn kind(&self) -> OpKind {
        OpKind::Filter
    }

    fn children(&self) -> &[BoxedOperator] {
        std::slice::from_ref(&self.child)
    }

    fn children_mut(&mut self) -> &mut [BoxedOperator] {
        std::slice::from_mut(&mut self.child)
    }

    fn consume(&mut self) -> Result<Option<Row>, OpError> {
        while let Some(row) = self.child.consume()? {
            if self.matches(&row)? {
                return Ok(Some(row));
            }
        }
        Ok(None)
    }
}

/// Parse a simple predicate like "age > 18", "name == Alice" or "a < $b".
fn parse_simple_predicate(expr: &str) -> Result<Predicate, OpError> {
    let ops = [
        ("==", CmpOp::Eq),
        ("!=", CmpOp::Ne),
        ("<=", CmpOp::Le),
        (">=", CmpOp::Ge),
        ("<", CmpOp::Lt),
        (">", CmpOp::Gt),
    ];

    for (token, op) in ops {
        if let Some(pos) = expr.find(token) {
            let column = expr[..pos].trim().to_string();
            let rhs = expr[pos + token.len()..].trim();
            if column.is_empty() || rhs.is_empty() {
                break;
            }
            let rhs = match rhs.strip_prefix('$') {
                Some(other) => Operand::Column(other.to_string()),
                None => Operand::Literal(rhs.to_string()),
            };
            return Ok(Predicate { column, op, rhs });
        }
    }

    Err(OpError::Plan(format!("unparseable predicate: {}", expr)))
}

/// Evaluate a comparison of `val` against a literal parsed as `val`'s type.
fn eval_predicate(val: &Scalar, op: CmpOp, literal: &str) -> Result<bool, OpError> {
    use Scalar::*;

    let rhs = match val {
        Null => return Ok(false), // Null comparisons are false
        Bool(_) => Bool(
            literal
                .parse::<bool>()
                .map_err(|_| OpError::Exec(format!("cannot parse '{}' as bool", literal)))?,
        ),
        I32(_) => I32(
            literal
                .parse::<i32>()
                .map_err(|_| OpError::Exec(format!("cannot parse '{}' as i32", literal)))?,
        ),
        I64(_) => I64(
            literal
                .parse::<i64>()
                .map_err(|_| OpError::Exec(format!("cannot parse '{}' as i64", literal)))?,
        ),
        F32(_) => F32(
            literal
                .parse::<f32>()
                .map_err(|_| OpError::Exec(format!("cannot parse '{}' as f32", literal)))?,
        ),
        F64(_) => F64(
            literal
                .parse::<f64>()
                .map_err(|_| OpError::Exec(format!("cannot parse '{}' as f64", literal)))?,
        ),
        Str(_) => Str(literal.to_string()),
        Bin(_) => return Err(OpError::Exec("cannot filter on binary data".into())),
    };

    if matches!(val, Bool(_)) && !matches!(op, CmpOp::Eq | CmpOp::Ne) {
        return Err(OpError::Exec(format!("unsupported op {:?} for bool", op)));
    }

    Ok(val.compare(&rhs).is_some_and(|ord| op.holds(ord)))
}
