//! Semi-apply and anti-semi-apply: a single correlated existential filter.
//!
//! `SemiApply` forwards a bound row iff its branch produces at least one row
//! for it (`EXISTS { ... }`); the anti variant forwards iff the branch
//! produces nothing (`NOT EXISTS { ... }`).

use exapply_core::types::Row;

use crate::argument::ArgumentHandle;
use crate::slot::RowSlot;
use crate::traits::{BoxedOperator, OpContext, OpError, OpKind, Operator};
use crate::tree;

pub struct SemiApply {
    anti: bool,
    /// `[bound, branch]`
    children: Vec<BoxedOperator>,
    injector: Option<ArgumentHandle>,
    current: RowSlot,
    reset_after_match: bool,
}

impl SemiApply {
    pub fn new(bound: BoxedOperator, branch: BoxedOperator) -> Self {
        Self::build(false, bound, branch)
    }

    pub fn anti(bound: BoxedOperator, branch: BoxedOperator) -> Self {
        Self::build(true, bound, branch)
    }

    fn build(anti: bool, bound: BoxedOperator, branch: BoxedOperator) -> Self {
        Self {
            anti,
            children: vec![bound, branch],
            injector: None,
            current: RowSlot::new(),
            reset_after_match: true,
        }
    }

    fn branch_matches(&mut self) -> Result<bool, OpError> {
        let injector = self
            .injector
            .as_ref()
            .ok_or_else(|| OpError::Invariant(format!("{} pulled before init", self.name())))?;
        let copy = self
            .current
            .peek()
            .cloned()
            .ok_or_else(|| OpError::Invariant("branch pulled without a bound row".into()))?;
        injector.inject(copy)?;

        let branch = &mut self.children[1];
        let produced = match branch.consume() {
            Ok(pulled) => pulled.is_some(),
            Err(e) => {
                let _ = tree::propagate_reset(branch.as_mut());
                return Err(e);
            }
        };
        if produced && self.reset_after_match {
            tree::propagate_reset(branch.as_mut())?;
        }
        Ok(produced)
    }
}

impl Operator for SemiApply {
    fn name(&self) -> &'static str {
        if self.anti {
            "Anti Semi Apply"
        } else {
            "Semi Apply"
        }
    }

    fn kind(&self) -> OpKind {
        if self.anti {
            OpKind::AntiSemiApply
        } else {
            OpKind::SemiApply
        }
    }

    fn children(&self) -> &[BoxedOperator] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut [BoxedOperator] {
        &mut self.children
    }

    fn init(&mut self, ctx: &OpContext) -> Result<(), OpError> {
        let handle = tree::locate_argument(self.children[1].as_ref()).ok_or_else(|| {
            OpError::Plan(format!("{} branch has no Argument operator", self.name()))
        })?;
        self.injector = Some(handle);
        self.reset_after_match = ctx.config.reset_branches_after_match;
        Ok(())
    }

    fn consume(&mut self) -> Result<Option<Row>, OpError> {
        loop {
            let Some(candidate) = self.children[0].consume()? else {
                return Ok(None);
            };
            self.current.replace(candidate);

            match self.branch_matches() {
                Ok(produced) if produced != self.anti => return Ok(self.current.take()),
                Ok(_) => {
                    self.current.release();
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument::Argument;
    use crate::filter::Filter;
    use crate::values::Values;
    use exapply_core::types::Scalar;

    fn bound() -> BoxedOperator {
        Box::new(Values::with_columns(
            vec!["id".into()],
            (1..=4).map(|i| vec![Scalar::I64(i)]).collect(),
        ))
    }

    fn even_branch() -> BoxedOperator {
        // id is even  <=>  id in {2, 4}
        Box::new(
            Filter::new(
                Box::new(Filter::new(Box::new(Argument::new()), "id != 1").unwrap()),
                "id != 3",
            )
            .unwrap(),
        )
    }

    fn drain(op: &mut SemiApply) -> Vec<Scalar> {
        tree::init_tree(op, &OpContext::default()).unwrap();
        std::iter::from_fn(|| op.consume().unwrap())
            .map(|r| r.get_by_name("id").unwrap().clone())
            .collect()
    }

    #[test]
    fn semi_apply_keeps_rows_with_a_match() {
        let mut op = SemiApply::new(bound(), even_branch());
        assert_eq!(drain(&mut op), vec![Scalar::I64(2), Scalar::I64(4)]);
        assert_eq!(op.kind(), OpKind::SemiApply);
    }

    #[test]
    fn anti_semi_apply_keeps_rows_without_a_match() {
        let mut op = SemiApply::anti(bound(), even_branch());
        assert_eq!(drain(&mut op), vec![Scalar::I64(1), Scalar::I64(3)]);
        assert_eq!(op.name(), "Anti Semi Apply");
    }

    /// Fails on its first pull without touching its input, then passes rows through.
    struct FailFirst {
        child: BoxedOperator,
        failed: bool,
    }

    impl Operator for FailFirst {
        fn name(&self) -> &'static str {
            "FailFirst"
        }

        fn kind(&self) -> OpKind {
            OpKind::Expand
        }

        fn children(&self) -> &[BoxedOperator] {
            std::slice::from_ref(&self.child)
        }

        fn children_mut(&mut self) -> &mut [BoxedOperator] {
            std::slice::from_mut(&mut self.child)
        }

        fn consume(&mut self) -> Result<Option<Row>, OpError> {
            if !self.failed {
                self.failed = true;
                return Err(OpError::Exec("transient".into()));
            }
            self.child.consume()
        }
    }

    #[test]
    fn branch_error_leaves_branch_ready_for_next_row() {
        let branch = Box::new(FailFirst {
            child: Box::new(Argument::new()),
            failed: false,
        });
        let mut op = SemiApply::new(bound(), branch);
        tree::init_tree(&mut op, &OpContext::default()).unwrap();

        assert!(matches!(op.consume(), Err(OpError::Exec(_))));
        let row = op.consume().unwrap().unwrap();
        assert_eq!(row.get_by_name("id"), Some(&Scalar::I64(2)));
    }

    #[test]
    fn branch_without_argument_fails_init() {
        let mut op = SemiApply::new(bound(), bound());
        assert!(matches!(op.init(&OpContext::default()), Err(OpError::Plan(_))));
    }
}
