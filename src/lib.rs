#![forbid(unsafe_code)]
//! exapply: correlated `EXISTS` evaluation for pull-based query plans.
//!
//! Facade over the workspace crates; most users only need `ExecutionPlan`
//! and the operators re-exported here.

pub use exapply_core::{BoolOperator, EngineConfig, Error, Row, Scalar};
pub use exapply_exec::{ExecError, ExecutionPlan, PlanState, RunStats};
pub use exapply_operators::{
    tree, Adjacency, ApplyMode, ApplyMultiplexer, ApplyStats, Argument, ArgumentHandle,
    BoxedOperator, Expand, Filter, OpContext, OpError, OpKind, Operator, RowSlot, SemiApply,
    Values,
};
