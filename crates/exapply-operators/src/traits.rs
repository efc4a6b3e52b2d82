//! Operator trait + common interfaces.
//!
//! The executor calls `init` once per operator (top-down) before the first
//! pull, then `consume` until it returns `None`. `reset` rewinds held state
//! for re-iteration, `free` tears down and may be called any number of times.
//!
//! Operators only implement their own hook; walking children is done by the
//! helpers in [`crate::tree`].

use exapply_core::prelude::{EngineConfig, Row};

use thiserror::Error;

use crate::argument::ArgumentHandle;

#[derive(Debug, Error)]
pub enum OpError {
    #[error("planning error: {0}")]
    Plan(String),

    #[error("execution error: {0}")]
    Exec(String),

    #[error("operator invariant violated: {0}")]
    Invariant(String),
}

/// Structural category of an operator, used by plan rewrites that only care
/// about what kind of node sits at a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Argument,
    Values,
    Filter,
    Expand,
    SemiApply,
    AntiSemiApply,
    ApplyMultiplexer,
}

impl OpKind {
    /// Operators that answer an existential question by pulling a nested
    /// sub-pipeline. Expensive to evaluate per candidate.
    pub fn is_existential_filter(self) -> bool {
        matches!(
            self,
            OpKind::ApplyMultiplexer | OpKind::SemiApply | OpKind::AntiSemiApply
        )
    }

    /// A predicate over the row alone; no sub-pipeline pull.
    pub fn is_plain_filter(self) -> bool {
        matches!(self, OpKind::Filter)
    }
}

/// Shared, read-only state handed to `init`.
#[derive(Debug, Clone, Default)]
pub struct OpContext {
    pub config: EngineConfig,
}

impl OpContext {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }
}

/// Trait that all operators must implement.
///
/// Invariants:
/// - `consume` returns `Ok(None)` for ordinary exhaustion, never an error.
/// - `free` is idempotent and must not fail.
/// - An operator never hands out a row it still references.
pub trait Operator: Send + 'static {
    /// Human-readable operator name (stable).
    fn name(&self) -> &'static str;

    fn kind(&self) -> OpKind;

    fn children(&self) -> &[BoxedOperator] {
        &[]
    }

    fn children_mut(&mut self) -> &mut [BoxedOperator] {
        &mut []
    }

    /// One-time setup, before the first `consume`.
    fn init(&mut self, _ctx: &OpContext) -> Result<(), OpError> {
        Ok(())
    }

    /// Pull the next row, or `None` once depleted.
    fn consume(&mut self) -> Result<Option<Row>, OpError>;

    /// Release held rows and rewind so the operator can be pulled again.
    fn reset(&mut self) -> Result<(), OpError> {
        Ok(())
    }

    fn free(&mut self) {}

    /// Injection handle, for operators that are correlation injectors.
    fn argument(&self) -> Option<ArgumentHandle> {
        None
    }
}

pub type BoxedOperator = Box<dyn Operator>;
