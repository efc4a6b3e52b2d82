//! Materialized row source.

use std::sync::Arc;

use exapply_core::types::{Row, Scalar};

use crate::traits::{OpError, OpKind, Operator};

/// Emits a fixed list of rows in order. `reset` rewinds to the first row.
#[derive(Debug, Default)]
pub struct Values {
    rows: Vec<Row>,
    pos: usize,
}

impl Values {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows, pos: 0 }
    }

    /// Build rows sharing one column list.
    pub fn with_columns(names: Vec<String>, rows: Vec<Vec<Scalar>>) -> Self {
        let names = Arc::new(names);
        let rows = rows
            .into_iter()
            .map(|values| Row::new(Arc::clone(&names), values))
            .collect();
        Self::new(rows)
    }

    /// Rows handed out since the last reset.
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl Operator for Values {
    fn name(&self) -> &'static str {
        "Values"
    }

    fn kind(&self) -> OpKind {
        OpKind::Values
    }

    fn consume(&mut self) -> Result<Option<Row>, OpError> {
        let row = self.rows.get(self.pos).cloned();
        if row.is_some() {
            self.pos += 1;
        }
        Ok(row)
    }

    fn reset(&mut self) -> Result<(), OpError> {
        self.pos = 0;
        Ok(())
    }
}
