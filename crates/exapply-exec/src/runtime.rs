//! Runtime: drive an operator tree from init to teardown.
//!
//! Behavior:
//! - The tree is initialized top-down on the first pull (or an explicit
//!   `init`). A failed init frees the tree and poisons the plan.
//! - `reset` rewinds every operator so the plan can be pulled again.
//! - `free` is idempotent and also runs on drop.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use exapply_core::config::EngineConfig;
use exapply_core::types::Row;

use exapply_operators::traits::{BoxedOperator, OpContext, OpError, Operator};
use exapply_operators::tree;

use crate::metrics::emit_span;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("plan init failed: {0}")]
    Init(#[source] OpError),
    #[error("operator exec: {0}")]
    Operator(#[from] OpError),
    #[error("invalid plan state: {0}")]
    State(String),
    #[error("stats encoding: {0}")]
    Encode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanState {
    /// Constructed; `init` not run yet.
    Built,
    Ready,
    /// `init` failed; the tree has been freed.
    Failed,
    Freed,
}

/// Per-plan counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub pulls: u64,
    pub rows_emitted: u64,
    pub resets: u64,
}

impl RunStats {
    pub fn to_json(&self) -> Result<String, ExecError> {
        serde_json::to_string(self).map_err(|e| ExecError::Encode(e.to_string()))
    }
}

/// Owns an operator tree and its lifecycle.
pub struct ExecutionPlan {
    root: BoxedOperator,
    ctx: OpContext,
    state: PlanState,
    stats: RunStats,
}

impl ExecutionPlan {
    pub fn new(root: BoxedOperator, cfg: EngineConfig) -> Self {
        Self {
            root,
            ctx: OpContext::new(cfg),
            state: PlanState::Built,
            stats: RunStats::default(),
        }
    }

    pub fn state(&self) -> PlanState {
        self.state
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub fn config(&self) -> &EngineConfig {
        &self.ctx.config
    }

    pub fn root(&self) -> &dyn Operator {
        self.root.as_ref()
    }

    /// Initialize the tree. No-op if already initialized.
    pub fn init(&mut self) -> Result<(), ExecError> {
        match self.state {
            PlanState::Ready => return Ok(()),
            PlanState::Failed | PlanState::Freed => {
                return Err(ExecError::State(format!(
                    "cannot init a plan in state {:?}",
                    self.state
                )))
            }
            PlanState::Built => {}
        }

        if let Err(e) = tree::init_tree(self.root.as_mut(), &self.ctx) {
            tree::propagate_free(self.root.as_mut());
            self.state = PlanState::Failed;
            #[cfg(feature = "tracing")]
            tracing::error!(error = %e, "plan init failed");
            return Err(ExecError::Init(e));
        }

        self.state = PlanState::Ready;
        #[cfg(feature = "tracing")]
        tracing::debug!(root = self.root.name(), "plan initialized");
        Ok(())
    }

    /// Pull the next row from the root, initializing first if needed.
    pub fn next_row(&mut self) -> Result<Option<Row>, ExecError> {
        if self.state == PlanState::Built {
            self.init()?;
        }
        if self.state != PlanState::Ready {
            return Err(ExecError::State(format!(
                "cannot pull from a plan in state {:?}",
                self.state
            )));
        }

        self.stats.pulls += 1;
        let row = self.root.consume()?;
        if row.is_some() {
            self.stats.rows_emitted += 1;
        }
        Ok(row)
    }

    /// Pull until depletion, or until `max_rows` rows have been returned.
    pub fn collect(&mut self) -> Result<Vec<Row>, ExecError> {
        let cap = self.ctx.config.max_rows;
        let mut rows = Vec::new();
        while cap.map_or(true, |cap| rows.len() < cap) {
            match self.next_row()? {
                Some(row) => rows.push(row),
                None => break,
            }
        }
        Ok(rows)
    }

    /// Rewind every operator so the plan can be pulled again.
    pub fn reset(&mut self) -> Result<(), ExecError> {
        match self.state {
            PlanState::Built => Ok(()),
            PlanState::Ready => {
                tree::propagate_reset(self.root.as_mut())?;
                self.stats.resets += 1;
                Ok(())
            }
            PlanState::Failed | PlanState::Freed => Err(ExecError::State(format!(
                "cannot reset a plan in state {:?}",
                self.state
            ))),
        }
    }

    /// Tear down the tree. Safe to call any number of times.
    pub fn free(&mut self) {
        if self.state == PlanState::Freed {
            return;
        }
        tree::propagate_free(self.root.as_mut());
        if self.state != PlanState::Failed {
            self.state = PlanState::Freed;
        }
        emit_span(
            "plan_freed",
            &[
                ("pulls", self.stats.pulls.to_string()),
                ("rows_emitted", self.stats.rows_emitted.to_string()),
                ("resets", self.stats.resets.to_string()),
            ],
        );
    }

    /// Indented operator tree, one operator per line.
    pub fn explain(&self) -> String {
        tree::render_tree(self.root.as_ref())
    }
}

impl Drop for ExecutionPlan {
    fn drop(&mut self) {
        self.free();
    }
}
