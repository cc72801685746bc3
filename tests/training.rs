use rust_backprop::{Dataset, NetShape, Network, TrainConfig};

const WINDOW: usize = 100;

fn xor() -> Dataset {
    Dataset::parse("0 0 0\n0 1 1\n1 0 1\n1 1 0\n", 2).unwrap()
}

fn and() -> Dataset {
    Dataset::parse("0 0 0\n0 1 0\n1 0 0\n1 1 1\n", 2).unwrap()
}

fn window_means(errors: &[(usize, f64)]) -> Vec<f64> {
    errors
        .chunks(WINDOW)
        .map(|w| w.iter().map(|&(_, e)| e).sum::<f64>() / w.len() as f64)
        .collect()
}

fn assert_non_increasing(means: &[f64]) {
    for (i, pair) in means.windows(2).enumerate() {
        assert!(
            pair[1] <= pair[0] + 1e-9,
            "window {} mean {} rose above window {} mean {}",
            i + 1,
            pair[1],
            i,
            pair[0]
        );
    }
}

fn full_budget(epochs: usize) -> TrainConfig {
    TrainConfig {
        epochs,
        learning_rate: 0.2,
        error_threshold: None,
        report_every: None,
    }
}

#[test]
fn xor_epoch_error_decreases_in_windows() {
    for seed in [0, 1, 2] {
        let mut net = Network::new_with_seed(NetShape::new(2, 3, 1).unwrap(), seed).unwrap();
        let report = net.fit(&xor(), &full_budget(20_000)).unwrap();

        assert_eq!(report.epochs_run, 20_000);
        assert!(!report.converged);
        assert_non_increasing(&window_means(&report.epoch_errors));
        assert!(
            report.final_error < 0.01,
            "seed {seed}: final error {}",
            report.final_error
        );
    }
}

#[test]
fn and_epoch_error_decreases_in_windows() {
    let mut net = Network::new_with_seed(NetShape::new(2, 3, 1).unwrap(), 7).unwrap();
    let report = net.fit(&and(), &full_budget(5_000)).unwrap();

    let means = window_means(&report.epoch_errors);
    assert_eq!(means.len(), 50);
    assert_non_increasing(&means);
    assert!(means[49] < means[0]);
}

#[test]
fn trained_xor_separates_the_classes() {
    let train = xor();
    let mut net = Network::new_with_seed(NetShape::new(2, 3, 1).unwrap(), 1).unwrap();
    let report = net
        .fit(
            &train,
            &TrainConfig {
                epochs: 50_000,
                learning_rate: 0.2,
                error_threshold: Some(0.01),
                report_every: None,
            },
        )
        .unwrap();
    assert!(report.converged);
    assert!(report.epochs_run < 50_000);

    for r in net.evaluate(&train).unwrap() {
        let predicted = if r.output[0] > 0.5 { 1.0 } else { 0.0 };
        assert_eq!(predicted, r.target[0], "sample {} -> {:?}", r.index, r.output);
    }
}
