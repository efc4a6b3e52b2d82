//! Correlation injector ("Argument").
//!
//! Sits at the leaf of a correlated branch. The owning apply operator injects
//! one row through an [`ArgumentHandle`]; the next pull on the branch yields
//! it, later pulls report exhaustion until the next injection.

use std::sync::{Arc, Mutex, MutexGuard};

use exapply_core::types::Row;

use crate::slot::RowSlot;
use crate::traits::{OpError, OpKind, Operator};

/// Shared handle to an `Argument`'s slot.
#[derive(Debug, Clone, Default)]
pub struct ArgumentHandle {
    slot: Arc<Mutex<RowSlot>>,
}

impl ArgumentHandle {
    fn lock(&self) -> Result<MutexGuard<'_, RowSlot>, OpError> {
        self.slot
            .lock()
            .map_err(|_| OpError::Invariant("argument slot poisoned".into()))
    }

    /// Hand `row` to the branch.
    ///
    /// Fails if the previously injected row was never pulled: the branch has
    /// not been drained since the last injection.
    pub fn inject(&self, row: Row) -> Result<(), OpError> {
        let mut slot = self.lock()?;
        if !slot.is_empty() {
            return Err(OpError::Invariant(
                "argument re-injected before the branch consumed the previous row".into(),
            ));
        }
        slot.replace(row);
        Ok(())
    }

    /// True if an injected row is waiting to be pulled.
    pub fn is_pending(&self) -> Result<bool, OpError> {
        Ok(!self.lock()?.is_empty())
    }

    fn take(&self) -> Result<Option<Row>, OpError> {
        Ok(self.lock()?.take())
    }

    fn clear(&self) -> Result<bool, OpError> {
        Ok(self.lock()?.release())
    }

    /// True if both handles point at the same slot.
    pub fn same_slot(&self, other: &ArgumentHandle) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }
}

#[derive(Debug, Default)]
pub struct Argument {
    handle: ArgumentHandle,
}

impl Argument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> ArgumentHandle {
        self.handle.clone()
    }
}

impl Operator for Argument {
    fn name(&self) -> &'static str {
        "Argument"
    }

    fn kind(&self) -> OpKind {
        OpKind::Argument
    }

    fn consume(&mut self) -> Result<Option<Row>, OpError> {
        self.handle.take()
    }

    fn reset(&mut self) -> Result<(), OpError> {
        self.handle.clear()?;
        Ok(())
    }

    fn free(&mut self) {
        // Teardown must not fail; a poisoned slot is dropped with the Arc.
        let _ = self.handle.clear();
    }

    fn argument(&self) -> Option<ArgumentHandle> {
        Some(self.handle.clone())
    }
}
