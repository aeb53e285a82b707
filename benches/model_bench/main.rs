use std::collections::HashMap;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use neuro_ode::{
    compiler::compile,
    integrator::integrate,
    neuron::{available_models, hodgkin_huxley::hodgkin_huxley},
    stimulus::Constant,
};


fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");

    for model in available_models().expect("models build") {
        group.bench_with_input(BenchmarkId::new("defaults", model.name()), &model, |b, model| {
            b.iter(|| compile(black_box(model), Constant::new(10.), &HashMap::new()).expect("model compiles"))
        });
    }

    group.finish();
}

fn bench_derivative(c: &mut Criterion) {
    let model = hodgkin_huxley().expect("model builds");
    let f = compile(&model, Constant::new(10.), &HashMap::new()).expect("model compiles");
    let state = model.steady_state().expect("model has a steady state").to_vec();
    let mut dydt = vec![0.; state.len()];

    c.bench_function("hodgkin_huxley_derivative", |b| {
        b.iter(|| f.evaluate_into(black_box(&state), black_box(1.), &mut dydt))
    });
}

fn bench_integrate(c: &mut Criterion) {
    let mut group = c.benchmark_group("integrate");
    group.sample_size(20);

    for model in available_models().expect("models build") {
        let f = compile(&model, Constant::new(10.), &HashMap::new()).expect("model compiles");
        let state = model.steady_state().expect("model has a steady state").to_vec();
        let times: Vec<f64> = (0..=1000).map(|i| i as f64 * 0.1).collect();

        group.bench_function(BenchmarkId::new("100ms", model.name()), |b| {
            b.iter(|| integrate(&f, black_box(&state), &times).expect("integration succeeds"))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compile, bench_derivative, bench_integrate);
criterion_main!(benches);
