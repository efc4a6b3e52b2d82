//! Pattern expansion over an in-memory adjacency list.
//!
//! For each input row, emits one row per neighbour of the row's `from`
//! column, extended with the neighbour under the `to` alias. An input row
//! may therefore produce zero, one, or many output rows.

use std::collections::VecDeque;
use std::sync::Arc;

use exapply_core::types::{Row, Scalar};

use crate::slot::RowSlot;
use crate::traits::{BoxedOperator, OpError, OpKind, Operator};

/// Directed edge list.
#[derive(Debug, Clone, Default)]
pub struct Adjacency {
    edges: Vec<(Scalar, Scalar)>,
}

impl Adjacency {
    pub fn new(edges: Vec<(Scalar, Scalar)>) -> Self {
        Self { edges }
    }

    pub fn neighbours<'a>(&'a self, src: &'a Scalar) -> impl Iterator<Item = &'a Scalar> + 'a {
        self.edges
            .iter()
            .filter(move |(s, _)| s.compare(src) == Some(std::cmp::Ordering::Equal))
            .map(|(_, d)| d)
    }
}

pub struct Expand {
    child: BoxedOperator,
    graph: Arc<Adjacency>,
    from: String,
    to: String,
    /// Input row currently being expanded.
    current: RowSlot,
    pending: VecDeque<Scalar>,
}

impl Expand {
    pub fn new(
        child: BoxedOperator,
        graph: Arc<Adjacency>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self {
            child,
            graph,
            from: from.into(),
            to: to.into(),
            current: RowSlot::new(),
            pending: VecDeque::new(),
        }
    }
}

impl Operator for Expand {
    fn name(&self) -> &'static str {
        "Expand"
    }

    fn kind(&self) -> OpKind {
        OpKind::Expand
    }

    fn children(&self) -> &[BoxedOperator] {
        std::slice::from_ref(&self.child)
    }

    fn children_mut(&mut self) -> &mut [BoxedOperator] {
        std::slice::from_mut(&mut self.child)
    }

    fn consume(&mut self) -> Result<Option<Row>, OpError> {
        loop {
            if let Some(dst) = self.pending.pop_front() {
                if let Some(row) = self.current.peek() {
                    return Ok(Some(row.clone().with_column(&self.to, dst)));
                }
            }

            // Current row exhausted; move to the next input row.
            self.current.release();
            let Some(row) = self.child.consume()? else {
                return Ok(None);
            };
            let src = row
                .get_by_name(&self.from)
                .ok_or_else(|| OpError::Exec(format!("column '{}' not found", self.from)))?;
            self.pending = self.graph.neighbours(src).cloned().collect();
            self.current.replace(row);
        }
    }

    fn reset(&mut self) -> Result<(), OpError> {
        self.current.release();
        self.pending.clear();
        Ok(())
    }

    fn free(&mut self) {
        self.current.release();
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::Values;

    fn graph() -> Arc<Adjacency> {
        Arc::new(Adjacency::new(vec![
            (Scalar::I64(1), Scalar::I64(2)),
            (Scalar::I64(1), Scalar::I64(3)),
            (Scalar::I64(3), Scalar::I64(1)),
        ]))
    }

    fn source() -> BoxedOperator {
        Box::new(Values::with_columns(
            vec!["n".into()],
            vec![vec![Scalar::I64(1)], vec![Scalar::I64(2)], vec![Scalar::I64(3)]],
        ))
    }

    #[test]
    fn expands_each_input_row() {
        let mut op = Expand::new(source(), graph(), "n", "m");
        let mut pairs = Vec::new();
        while let Some(row) = op.consume().unwrap() {
            pairs.push((
                row.get_by_name("n").unwrap().clone(),
                row.get_by_name("m").unwrap().clone(),
            ));
        }
        assert_eq!(
            pairs,
            vec![
                (Scalar::I64(1), Scalar::I64(2)),
                (Scalar::I64(1), Scalar::I64(3)),
                (Scalar::I64(3), Scalar::I64(1)),
            ]
        );
    }

    #[test]
    fn reset_drops_pending_neighbours() {
        let mut op = Expand::new(source(), graph(), "n", "m");
        assert!(op.consume().unwrap().is_some());
        op.reset().unwrap();
        // Source is not rewound by Expand itself; the next input row is n=2,
        // which has no neighbours, then n=3.
        let row = op.consume().unwrap().unwrap();
        assert_eq!(row.get_by_name("n"), Some(&Scalar::I64(3)));
    }
}
