//! Apply multiplexer: AND/OR over correlated existential branches.
//!
//! Child 0 is the bound stream. Every other child is a branch sub-pipeline
//! with an `Argument` somewhere inside it. For each bound row the
//! multiplexer injects a copy into each branch and pulls the branch once:
//! a produced row means the branch condition holds, exhaustion means it
//! does not. The row content is never inspected.
//!
//! - OR forwards the bound row on the first branch that produces.
//! - AND forwards it only if every branch produces, and stops at the first
//!   branch that does not.
//!
//! Rejected bound rows are released and the next one is pulled, so the
//! output is an order-preserving subsequence of the bound stream.

pub mod reorder;

use exapply_core::types::{BoolOperator, Row};
use serde::{Deserialize, Serialize};

use crate::argument::ArgumentHandle;
use crate::slot::RowSlot;
use crate::traits::{BoxedOperator, OpContext, OpError, OpKind, Operator};
use crate::tree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyMode {
    And,
    Or,
}

impl TryFrom<BoolOperator> for ApplyMode {
    type Error = BoolOperator;

    fn try_from(op: BoolOperator) -> Result<Self, Self::Error> {
        match op {
            BoolOperator::And => Ok(ApplyMode::And),
            BoolOperator::Or => Ok(ApplyMode::Or),
            other => Err(other),
        }
    }
}

/// Counters over the operator's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyStats {
    /// Rows pulled from the bound stream.
    pub candidates: u64,
    pub forwarded: u64,
    pub discarded: u64,
    /// Branch pulls issued across all candidates.
    pub branch_pulls: u64,
}

pub struct ApplyMultiplexer {
    mode: ApplyMode,
    children: Vec<BoxedOperator>,
    /// `branch_injectors[i]` feeds `children[i + 1]`.
    branch_injectors: Vec<ArgumentHandle>,
    /// Bound row under evaluation. Empty between `consume` calls.
    current: RowSlot,
    reset_after_match: bool,
    initialized: bool,
    stats: ApplyStats,
}

impl ApplyMultiplexer {
    pub fn new(mode: ApplyMode, bound: BoxedOperator, branches: Vec<BoxedOperator>) -> Self {
        let mut children = Vec::with_capacity(branches.len() + 1);
        children.push(bound);
        children.extend(branches);
        Self {
            mode,
            children,
            branch_injectors: Vec::new(),
            current: RowSlot::new(),
            reset_after_match: true,
            initialized: false,
            stats: ApplyStats::default(),
        }
    }

    /// Build from the boolean connective of a filter tree.
    ///
    /// Panics on anything other than AND/OR: the plan builder must never
    /// route other connectives here.
    pub fn for_operator(
        op: BoolOperator,
        bound: BoxedOperator,
        branches: Vec<BoxedOperator>,
    ) -> Self {
        match ApplyMode::try_from(op) {
            Ok(mode) => Self::new(mode, bound, branches),
            Err(op) => panic!("apply multiplexer cannot evaluate boolean operator {op}"),
        }
    }

    pub fn mode(&self) -> ApplyMode {
        self.mode
    }

    pub fn stats(&self) -> ApplyStats {
        self.stats
    }

    pub fn bound_branch(&self) -> &dyn Operator {
        self.children[0].as_ref()
    }

    pub fn branch_count(&self) -> usize {
        self.children.len() - 1
    }

    pub fn branch_injectors(&self) -> &[ArgumentHandle] {
        &self.branch_injectors
    }

    /// True while a bound row is held. Always false between `consume` calls.
    pub fn holds_candidate(&self) -> bool {
        !self.current.is_empty()
    }

    /// Inject a copy of the held bound row into branch `idx` and pull it once.
    fn pull_branch(&mut self, idx: usize) -> Result<bool, OpError> {
        let copy = self
            .current
            .peek()
            .cloned()
            .ok_or_else(|| OpError::Invariant("branch pulled without a bound row".into()))?;
        self.branch_injectors[idx].inject(copy)?;
        self.stats.branch_pulls += 1;

        let branch = &mut self.children[idx + 1];
        let pulled = match branch.consume() {
            Ok(pulled) => pulled,
            Err(e) => {
                // The branch may have failed before pulling its injected row.
                let _ = tree::propagate_reset(branch.as_mut());
                return Err(e);
            }
        };
        match pulled {
            Some(_branch_row) => {
                // Only presence matters; the branch row is dropped here.
                if self.reset_after_match {
                    tree::propagate_reset(branch.as_mut())?;
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn or_apply(&mut self) -> Result<bool, OpError> {
        for idx in 0..self.branch_injectors.len() {
            if self.pull_branch(idx)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn and_apply(&mut self) -> Result<bool, OpError> {
        for idx in 0..self.branch_injectors.len() {
            if !self.pull_branch(idx)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl Operator for ApplyMultiplexer {
    fn name(&self) -> &'static str {
        match self.mode {
            ApplyMode::And => "AND Apply Multiplexer",
            ApplyMode::Or => "OR Apply Multiplexer",
        }
    }

    fn kind(&self) -> OpKind {
        OpKind::ApplyMultiplexer
    }

    fn children(&self) -> &[BoxedOperator] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut [BoxedOperator] {
        &mut self.children
    }

    fn init(&mut self, ctx: &OpContext) -> Result<(), OpError> {
        if self.initialized {
            return Ok(());
        }
        if self.children.len() < 2 {
            return Err(OpError::Plan(format!(
                "{} needs a bound stream and at least one branch, got {} children",
                self.name(),
                self.children.len()
            )));
        }

        if ctx.config.reorder_branches {
            let _swaps = reorder::sort_branches(&mut self.children);
            #[cfg(feature = "tracing")]
            tracing::trace!(op = self.name(), swaps = _swaps, "reordered branches");
        }
        self.reset_after_match = ctx.config.reset_branches_after_match;

        let mut injectors = Vec::with_capacity(self.children.len() - 1);
        for (i, branch) in self.children.iter().enumerate().skip(1) {
            let handle = tree::locate_argument(branch.as_ref()).ok_or_else(|| {
                OpError::Plan(format!(
                    "branch {} ({}) has no Argument operator",
                    i,
                    branch.name()
                ))
            })?;
            injectors.push(handle);
        }
        self.branch_injectors = injectors;
        self.initialized = true;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            op = self.name(),
            branches = self.branch_injectors.len(),
            "apply multiplexer initialized"
        );
        Ok(())
    }

    fn consume(&mut self) -> Result<Option<Row>, OpError> {
        if !self.initialized {
            return Err(OpError::Invariant(format!(
                "{} pulled before init",
                self.name()
            )));
        }
        debug_assert!(self.current.is_empty(), "bound row held across consume calls");

        loop {
            let Some(candidate) = self.children[0].consume()? else {
                return Ok(None);
            };
            self.current.replace(candidate);
            self.stats.candidates += 1;

            let outcome = match self.mode {
                ApplyMode::Or => self.or_apply(),
                ApplyMode::And => self.and_apply(),
            };

            match outcome {
                Ok(true) => {
                    self.stats.forwarded += 1;
                    return Ok(self.current.take());
                }
                Ok(false) => {
                    self.current.release();
                    self.stats.discarded += 1;
                    #[cfg(feature = "tracing")]
                    tracing::trace!(op = self.name(), "bound row rejected");
                }
                Err(e) => {
                    self.current.release();
                    return Err(e);
                }
            }
        }
    }

    fn reset(&mut self) -> Result<(), OpError> {
        self.current.release();
        Ok(())
    }

    fn free(&mut self) {
        self.current.release();
    }
}
