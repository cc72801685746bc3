use proptest::prelude::*;
use proptest::test_runner::Config;

use rust_backprop::{NetShape, Network, NetworkWeights, loss};

fn shapes() -> impl Strategy<Value = (usize, usize, usize)> {
    (1usize..8, 1usize..8, 1usize..5)
}

proptest! {
    #![proptest_config(Config::with_cases(64))]

    #[test]
    fn init_has_exact_shape_and_range((inputs, hidden, outputs) in shapes(), seed in any::<u64>()) {
        let shape = NetShape::new(inputs, hidden, outputs).unwrap();
        let w = NetworkWeights::new_with_seed(&shape, seed).unwrap();

        prop_assert_eq!(w.w1().dims(), (inputs + 1, hidden));
        prop_assert_eq!(w.w2().dims(), (hidden + 1, outputs));
        for &v in w.w1().as_slice().iter().chain(w.w2().as_slice()) {
            prop_assert!((-0.5..0.5).contains(&v), "weight {} out of range", v);
        }
    }

    #[test]
    fn forward_outputs_are_inside_the_unit_interval(
        (inputs, hidden, outputs) in shapes(),
        seed in any::<u64>(),
        raw in prop::collection::vec(-10.0f64..10.0, 8),
    ) {
        let net = Network::new_with_seed(NetShape::new(inputs, hidden, outputs).unwrap(), seed).unwrap();
        let trace = net.forward(&raw[..inputs]).unwrap();

        prop_assert_eq!(trace.x.len(), inputs + 1);
        prop_assert_eq!(trace.x[inputs], 1.0);
        prop_assert_eq!(trace.h.len(), hidden + 1);
        prop_assert_eq!(trace.h[hidden], 1.0);
        for &y in trace.output() {
            prop_assert!(y > 0.0 && y < 1.0, "output {} not in (0, 1)", y);
        }
    }

    #[test]
    fn error_is_non_negative_and_zero_only_on_match(
        pred in prop::collection::vec(0.0f64..1.0, 1..6),
        offset in 1e-6f64..1.0,
    ) {
        prop_assert_eq!(loss::squared_error(&pred, &pred).unwrap(), 0.0);

        let mut target = pred.clone();
        target[0] += offset;
        let e = loss::squared_error(&pred, &target).unwrap();
        prop_assert!(e > 0.0);
    }
}
