use rust_backprop::{Dataset, NetShape, Network, TrainConfig};

fn main() -> rust_backprop::Result<()> {
    let xs = vec![
        vec![0.0, 0.0],
        vec![0.0, 1.0],
        vec![1.0, 0.0],
        vec![1.0, 1.0],
    ];
    let ys = vec![vec![0.0], vec![1.0], vec![1.0], vec![0.0]];
    let train = Dataset::from_rows(&xs, &ys)?;

    // 2 -> 3 -> 1, sigmoid everywhere.
    let mut net = Network::new_with_seed(NetShape::new(2, 3, 1)?, 1)?;

    let report = net.fit(
        &train,
        &TrainConfig {
            epochs: 20_000,
            learning_rate: 0.2,
            error_threshold: Some(0.001),
            report_every: None,
        },
    )?;
    println!(
        "epochs_run={} converged={} final_error={}",
        report.epochs_run, report.converged, report.final_error
    );

    for x in xs {
        let trace = net.forward(&x)?;
        println!("x={x:?} y={:?}", trace.output()[0]);
    }
    Ok(())
}
