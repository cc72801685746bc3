use criterion::{Criterion, black_box, criterion_group, criterion_main};

use rust_backprop::{NetShape, Network, loss};

fn shape() -> NetShape {
    NetShape::new(64, 128, 10).unwrap()
}

fn network_forward_bench(c: &mut Criterion) {
    let net = Network::new_with_seed(shape(), 0).unwrap();
    let mut trace = net.activation_trace();
    let input = vec![0.1_f64; shape().inputs];

    c.bench_function("network_forward_64_128_10", |b| {
        b.iter(|| {
            net.forward_into(black_box(&input), &mut trace).unwrap();
            black_box(trace.output());
        })
    });
}

fn network_backward_bench(c: &mut Criterion) {
    let net = Network::new_with_seed(shape(), 0).unwrap();
    let mut trainer = net.trainer();
    let input = vec![0.1_f64; shape().inputs];
    let target = vec![0.0_f64; shape().outputs];

    net.forward_into(&input, &mut trainer.trace).unwrap();
    black_box(loss::squared_error(trainer.trace.output(), &target).unwrap());

    c.bench_function("network_backward_64_128_10", |b| {
        b.iter(|| {
            net.backward_into(black_box(&target), &trainer.trace, &mut trainer.grads)
                .unwrap();
            black_box(&trainer.grads.delta_h);
        })
    });
}

fn network_train_step_bench(c: &mut Criterion) {
    let mut net = Network::new_with_seed(shape(), 0).unwrap();
    let mut trainer = net.trainer();
    let input = vec![0.1_f64; shape().inputs];
    let target = vec![0.0_f64; shape().outputs];

    c.bench_function("network_train_step_64_128_10", |b| {
        b.iter(|| {
            let err = net
                .train_step(black_box(&input), black_box(&target), 0.2, &mut trainer)
                .unwrap();
            black_box(err);
        })
    });
}

criterion_group!(
    benches,
    network_forward_bench,
    network_backward_bench,
    network_train_step_bench
);
criterion_main!(benches);
