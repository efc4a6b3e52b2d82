//! Setup-time branch reordering.
//!
//! Moves plain filter branches ahead of branches that pull nested
//! sub-pipelines, so the multiplexer's short-circuit can trigger before the
//! expensive branches run.
//!
//! The pass only walks a prefix of the branch list: once an expensive branch
//! finds no later filter to trade places with, it stops without looking at
//! later positions. Changing that would alter plan shape for nested
//! combinators, so it is kept as-is.

use crate::traits::{BoxedOperator, OpKind};

/// Reorder branch children (positions `1..`) in place. Returns the number of
/// exchanges performed.
pub fn sort_branches(children: &mut [BoxedOperator]) -> usize {
    sort_by_kind(children, |op| op.kind())
}

pub(crate) fn sort_by_kind<T>(items: &mut [T], kind_of: impl Fn(&T) -> OpKind) -> usize {
    let mut swaps = 0;
    for i in 1..items.len() {
        if !kind_of(&items[i]).is_existential_filter() {
            continue;
        }
        let mut swapped = false;
        for j in i + 1..items.len() {
            if kind_of(&items[j]).is_plain_filter() {
                items.swap(i, j);
                swapped = true;
                swaps += 1;
            }
        }
        if !swapped {
            return swaps;
        }
    }
    swaps
}

#[cfg(test)]
mod tests {
    use super::*;
    use OpKind::*;

    fn run(mut kinds: Vec<OpKind>) -> (Vec<OpKind>, usize) {
        let swaps = sort_by_kind(&mut kinds, |k| *k);
        (kinds, swaps)
    }

    #[test]
    fn filter_moves_ahead_of_nested_apply() {
        let (kinds, swaps) = run(vec![Values, ApplyMultiplexer, Filter]);
        assert_eq!(kinds, vec![Values, Filter, ApplyMultiplexer]);
        assert_eq!(swaps, 1);
    }

    #[test]
    fn bound_child_is_never_moved() {
        let (kinds, swaps) = run(vec![SemiApply, Filter]);
        assert_eq!(kinds, vec![SemiApply, Filter]);
        assert_eq!(swaps, 0);
    }

    #[test]
    fn several_filters_rotate_through_the_same_position() {
        // Position 1 trades with f1 and then with f2; the semi-apply that
        // landed at position 2 then trades with f1 again.
        let mut items = vec![
            ("bound", Values),
            ("semi", SemiApply),
            ("f1", Filter),
            ("f2", Filter),
        ];
        let swaps = sort_by_kind(&mut items, |(_, k)| *k);
        let names: Vec<_> = items.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["bound", "f2", "f1", "semi"]);
        assert_eq!(swaps, 3);
    }

    #[test]
    fn expensive_branch_without_later_filter_ends_the_pass() {
        let (kinds, swaps) = run(vec![Values, AntiSemiApply, ApplyMultiplexer, Filter]);
        assert_eq!(kinds, vec![Values, Filter, ApplyMultiplexer, AntiSemiApply]);
        assert_eq!(swaps, 1);

        let (kinds, swaps) = run(vec![Values, SemiApply, Expand, SemiApply, Filter]);
        assert_eq!(kinds, vec![Values, Filter, Expand, SemiApply, SemiApply]);
        assert_eq!(swaps, 1);

        let (kinds, swaps) = run(vec![Values, Filter, SemiApply, Expand, ApplyMultiplexer]);
        assert_eq!(kinds, vec![Values, Filter, SemiApply, Expand, ApplyMultiplexer]);
        assert_eq!(swaps, 0);
    }

    #[test]
    fn cheap_branches_are_left_in_place() {
        let (kinds, swaps) = run(vec![Values, Expand, Filter, Filter]);
        assert_eq!(kinds, vec![Values, Expand, Filter, Filter]);
        assert_eq!(swaps, 0);
    }
}
