#![forbid(unsafe_code)]
//! exapply-exec: drives an operator tree through its lifecycle.
//!
//! `ExecutionPlan` owns the root operator, initializes the tree top-down on
//! the first pull, hands rows to the caller, and guarantees teardown (also
//! on drop).

pub mod metrics;
pub mod runtime;

pub use runtime::{ExecError, ExecutionPlan, PlanState, RunStats};
