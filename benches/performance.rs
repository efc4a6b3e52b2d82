use criterion::{criterion_group, criterion_main, Criterion};
use exapply_core::config::EngineConfig;
use exapply_core::types::Scalar;
use exapply_exec::ExecutionPlan;
use exapply_operators::{ApplyMode, ApplyMultiplexer, Argument, BoxedOperator, Filter, SemiApply, Values};

fn make_bound(rows: i64) -> BoxedOperator {
    Box::new(Values::with_columns(
        vec!["id".into(), "group".into()],
        (0..rows)
            .map(|i| vec![Scalar::I64(i), Scalar::Str(format!("group-{}", i % 4))])
            .collect(),
    ))
}

fn filter_branch(expr: &str) -> BoxedOperator {
    Box::new(Filter::new(Box::new(Argument::new()), expr).unwrap())
}

fn make_plan(mode: ApplyMode, reorder: bool) -> ExecutionPlan {
    let semi = SemiApply::new(Box::new(Argument::new()), filter_branch("group == group-1"));
    let root = ApplyMultiplexer::new(
        mode,
        make_bound(1024),
        vec![Box::new(semi), filter_branch("id > 512")],
    );
    let cfg = EngineConfig {
        reorder_branches: reorder,
        ..EngineConfig::default()
    };
    ExecutionPlan::new(Box::new(root), cfg)
}

fn bench_apply_multiplexer(c: &mut Criterion) {
    for (label, mode) in [("and", ApplyMode::And), ("or", ApplyMode::Or)] {
        for reorder in [false, true] {
            let mut plan = make_plan(mode, reorder);
            c.bench_function(&format!("apply_multiplexer_{label}_reorder_{reorder}"), |b| {
                b.iter(|| {
                    plan.reset().unwrap();
                    let _ = plan.collect().unwrap();
                })
            });
        }
    }
}

criterion_group!(apply, bench_apply_multiplexer);
criterion_main!(apply);
