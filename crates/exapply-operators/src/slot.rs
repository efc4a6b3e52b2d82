//! Single-row owning slot.
//!
//! Operators that hold a row between pulls keep it here. An empty slot is a
//! normal state; dropping or overwriting the slot releases the row.

use exapply_core::types::Row;

#[derive(Debug, Default)]
pub struct RowSlot {
    row: Option<Row>,
}

impl RowSlot {
    pub fn new() -> Self {
        Self { row: None }
    }

    pub fn is_empty(&self) -> bool {
        self.row.is_none()
    }

    /// Store `row`, returning whatever was held before.
    pub fn replace(&mut self, row: Row) -> Option<Row> {
        self.row.replace(row)
    }

    /// Move the held row out, leaving the slot empty.
    pub fn take(&mut self) -> Option<Row> {
        self.row.take()
    }

    pub fn peek(&self) -> Option<&Row> {
        self.row.as_ref()
    }

    /// Drop the held row. Returns whether anything was released.
    pub fn release(&mut self) -> bool {
        self.row.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exapply_core::types::Scalar;

    #[test]
    fn release_is_idempotent() {
        let mut slot = RowSlot::new();
        assert!(!slot.release());
        slot.replace(Row::from_pairs([("a", Scalar::I64(1))]));
        assert!(slot.release());
        assert!(!slot.release());
        assert!(slot.is_empty());
    }

    #[test]
    fn replace_returns_previous() {
        let mut slot = RowSlot::new();
        assert!(slot.replace(Row::from_pairs([("a", 1i64)])).is_none());
        let prev = slot.replace(Row::from_pairs([("a", 2i64)])).unwrap();
        assert_eq!(prev.get_by_name("a"), Some(&Scalar::I64(1)));
        assert_eq!(slot.take().unwrap().get_by_name("a"), Some(&Scalar::I64(2)));
    }
}
