//! Operator tree traversal: lookup, lifecycle propagation, rendering.

use std::fmt::Write;

use crate::argument::ArgumentHandle;
use crate::traits::{OpContext, OpError, OpKind, Operator};

/// First operator of `kind` in pre-order (node, then children left to right).
pub fn locate_first(op: &dyn Operator, kind: OpKind) -> Option<&dyn Operator> {
    if op.kind() == kind {
        return Some(op);
    }
    op.children()
        .iter()
        .find_map(|child| locate_first(child.as_ref(), kind))
}

/// Injection handle of the first `Argument` found under `op`.
pub fn locate_argument(op: &dyn Operator) -> Option<ArgumentHandle> {
    locate_first(op, OpKind::Argument).and_then(|arg| arg.argument())
}

/// Initialize `op` and then its subtree, top-down.
///
/// A parent's `init` may restructure its children before they are visited.
pub fn init_tree(op: &mut dyn Operator, ctx: &OpContext) -> Result<(), OpError> {
    op.init(ctx)?;
    for child in op.children_mut() {
        init_tree(child.as_mut(), ctx)?;
    }
    Ok(())
}

/// Reset `op` and every descendant.
pub fn propagate_reset(op: &mut dyn Operator) -> Result<(), OpError> {
    op.reset()?;
    for child in op.children_mut() {
        propagate_reset(child.as_mut())?;
    }
    Ok(())
}

/// Free `op` and every descendant. Safe to call repeatedly.
pub fn propagate_free(op: &mut dyn Operator) {
    op.free();
    for child in op.children_mut() {
        propagate_free(child.as_mut());
    }
}

/// Indented, one-operator-per-line rendering of the tree.
pub fn render_tree(op: &dyn Operator) -> String {
    let mut out = String::new();
    render_into(op, 0, &mut out);
    out
}

fn render_into(op: &dyn Operator, depth: usize, out: &mut String) {
    let _ = writeln!(out, "{:indent$}{}", "", op.name(), indent = depth * 4);
    for child in op.children() {
        render_into(child.as_ref(), depth + 1, out);
    }
}
