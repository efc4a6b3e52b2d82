#![forbid(unsafe_code)]
//! exapply-operators: pull-based ("Volcano") operators.
//!
//! Design intent:
//! - Single-threaded, synchronous pulls: `consume` on the root drives the
//!   whole tree through ordinary call/return.
//! - Every operator owns its children; correlated branches are fed through a
//!   shared single-slot `Argument` handle.
//! - Row ownership is explicit: operators hold at most the rows they are
//!   working on, in `RowSlot`s, and release them on every exit path.

pub mod apply_multiplexer;
pub mod argument;
pub mod expand;
pub mod filter;
pub mod semi_apply;
pub mod slot;
pub mod traits;
pub mod tree;
pub mod values;

pub use apply_multiplexer::{ApplyMode, ApplyMultiplexer, ApplyStats};
pub use argument::{Argument, ArgumentHandle};
pub use expand::{Adjacency, Expand};
pub use filter::Filter;
pub use semi_apply::SemiApply;
pub use slot::RowSlot;
pub use traits::{BoxedOperator, OpContext, OpError, OpKind, Operator};
pub use values::Values;
