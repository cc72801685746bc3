//! Elman recurrent network.
//!
//! An Elman network is the plain three-layer network whose input layer is
//! extended by a context layer: a copy of the hidden activations from the
//! previous time step. Forward, backward and update are exactly those of
//! [`Network`]; only the driver differs:
//!
//! - the input at step `t` is `sequence[t] ++ context`
//! - the target at step `t` is `sequence[t + 1]`
//! - after the forward pass the context becomes the new hidden activations
//!
//! The gradient is not propagated through time; the context is treated as an
//! ordinary input.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use tracing::info;

use crate::{Error, NetShape, Network, Result, Sigmoid, loss};

/// What the final step of a sequence is trained against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetWrap {
    /// Use the first element of the sequence as the target.
    #[default]
    Wrap,
    /// Run the final step forward only; no error, no update.
    Skip,
}

/// Unit counts of an Elman network. The context layer has `hidden` units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElmanShape {
    pub inputs: usize,
    pub hidden: usize,
    pub outputs: usize,
}

impl ElmanShape {
    pub fn new(inputs: usize, hidden: usize, outputs: usize) -> Result<Self> {
        let shape = Self {
            inputs,
            hidden,
            outputs,
        };
        shape.net_shape()?;
        if outputs != inputs {
            return Err(Error::InvalidArgument(format!(
                "next-element prediction needs outputs == inputs, got {outputs} and {inputs}"
            )));
        }
        Ok(shape)
    }

    /// Shape of the underlying feed-forward network.
    pub fn net_shape(&self) -> Result<NetShape> {
        NetShape::new(self.inputs + self.hidden, self.hidden, self.outputs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElmanConfig {
    pub epochs: usize,
    pub learning_rate: f64,
    pub wrap: TargetWrap,
    /// Initial context values are drawn from `[0, context_noise)`.
    pub context_noise: f64,
    pub report_every: Option<usize>,
}

impl Default for ElmanConfig {
    fn default() -> Self {
        Self {
            epochs: 1_200,
            learning_rate: 0.1,
            wrap: TargetWrap::Wrap,
            context_noise: 0.1,
            report_every: Some(100),
        }
    }
}

impl ElmanConfig {
    pub fn validate(&self) -> Result<()> {
        if self.epochs == 0 {
            return Err(Error::InvalidArgument("epochs must be > 0".to_owned()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidArgument(format!(
                "learning rate must be finite and > 0, got {}",
                self.learning_rate
            )));
        }
        if !(self.context_noise.is_finite() && self.context_noise > 0.0) {
            return Err(Error::InvalidArgument(format!(
                "context noise must be finite and > 0, got {}",
                self.context_noise
            )));
        }
        if self.report_every == Some(0) {
            return Err(Error::InvalidArgument(
                "report_every must be > 0".to_owned(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElmanReport {
    pub epochs_run: usize,
    /// `(epoch, summed error)` for every epoch.
    pub epoch_errors: Vec<(usize, f64)>,
    /// Per-step error during the last epoch; skipped steps record `0`.
    pub last_epoch_errors: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct ElmanNetwork {
    shape: ElmanShape,
    network: Network,
    context: Vec<f64>,
}

impl ElmanNetwork {
    pub fn new_with_seed(shape: ElmanShape, context_noise: f64, seed: u64) -> Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::new_with_rng(shape, context_noise, &mut rng)
    }

    /// Random weights in `[-0.5, 0.5)` and context in `[0, context_noise)`.
    pub fn new_with_rng<R: Rng + ?Sized>(
        shape: ElmanShape,
        context_noise: f64,
        rng: &mut R,
    ) -> Result<Self> {
        if !(context_noise.is_finite() && context_noise > 0.0) {
            return Err(Error::InvalidArgument(format!(
                "context noise must be finite and > 0, got {context_noise}"
            )));
        }
        let network = Network::new_with_rng(shape.net_shape()?, rng)?;
        let context = (0..shape.hidden)
            .map(|_| rng.gen_range(0.0..context_noise))
            .collect();
        Ok(Self {
            shape,
            network,
            context,
        })
    }

    pub fn with_activation(mut self, activation: Sigmoid) -> Self {
        self.network = self.network.with_activation(activation);
        self
    }

    #[inline]
    pub fn shape(&self) -> &ElmanShape {
        &self.shape
    }

    #[inline]
    pub fn network(&self) -> &Network {
        &self.network
    }

    #[inline]
    pub fn context(&self) -> &[f64] {
        &self.context
    }

    fn check_sequence(&self, sequence: &[f64]) -> Result<usize> {
        let width = self.shape.inputs;
        if !sequence.len().is_multiple_of(width) {
            return Err(Error::InvalidArgument(format!(
                "sequence length {} is not divisible by input width {width}",
                sequence.len()
            )));
        }
        let steps = sequence.len() / width;
        if steps < 2 {
            return Err(Error::InvalidArgument(format!(
                "sequence needs at least 2 steps, got {steps}"
            )));
        }
        Ok(steps)
    }

    /// Train on `sequence` (a flat buffer of `inputs`-wide steps) to predict
    /// each next step. The context carries over between epochs.
    pub fn fit_sequence(&mut self, sequence: &[f64], cfg: &ElmanConfig) -> Result<ElmanReport> {
        cfg.validate()?;
        let steps = self.check_sequence(sequence)?;
        let width = self.shape.inputs;
        let frames: Vec<&[f64]> = sequence.chunks_exact(width).collect();

        let mut trainer = self.network.trainer();
        let mut input = vec![0.0; width + self.shape.hidden];
        let mut epoch_errors = Vec::with_capacity(cfg.epochs);
        let mut last_epoch_errors = vec![0.0; steps];

        for epoch in 0..cfg.epochs {
            if cfg.report_every.is_some_and(|n| epoch % n == 0) {
                info!(epoch, "training elman network");
            }
            let last = epoch + 1 == cfg.epochs;

            let mut epoch_error = 0.0;
            for t in 0..steps {
                input[..width].copy_from_slice(frames[t]);
                input[width..].copy_from_slice(&self.context);

                self.network.forward_into(&input, &mut trainer.trace)?;
                self.context.copy_from_slice(trainer.trace.hidden());

                let target = match (t + 1 < steps, cfg.wrap) {
                    (true, _) => frames[t + 1],
                    (false, TargetWrap::Wrap) => frames[0],
                    (false, TargetWrap::Skip) => continue,
                };

                let error = loss::squared_error(trainer.trace.output(), target)?;
                epoch_error += error;
                if last {
                    last_epoch_errors[t] = error;
                }

                self.network
                    .backward_into(target, &trainer.trace, &mut trainer.grads)?;
                self.network
                    .update(&trainer.trace, &trainer.grads, cfg.learning_rate)?;
            }
            epoch_errors.push((epoch, epoch_error));
        }

        Ok(ElmanReport {
            epochs_run: cfg.epochs,
            epoch_errors,
            last_epoch_errors,
        })
    }

    /// Feed one step forward, advance the context, and return the prediction.
    pub fn step(&mut self, x: &[f64]) -> Result<Vec<f64>> {
        if x.len() != self.shape.inputs {
            return Err(Error::InvalidArgument(format!(
                "step len {} does not match network inputs {}",
                x.len(),
                self.shape.inputs
            )));
        }
        let input: Vec<f64> = x.iter().chain(&self.context).copied().collect();
        let trace = self.network.forward(&input)?;
        self.context.copy_from_slice(trace.hidden());
        Ok(trace.y)
    }
}

/// Random bits where every third bit is the XOR of the two before it.
///
/// Positions `p` with `(p + 1) % 3 == 0` hold `seq[p - 1] ^ seq[p - 2]`; all
/// others are uniform random bits.
pub fn bit_sequence<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<f64> {
    let mut bits: Vec<u8> = Vec::with_capacity(len);
    for p in 0..len {
        let bit = if (p + 1) % 3 == 0 {
            bits[p - 1] ^ bits[p - 2]
        } else {
            rng.gen_range(0..2)
        };
        bits.push(bit);
    }
    bits.into_iter().map(f64::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_sequence_has_xor_every_third_bit() {
        let mut rng = StdRng::seed_from_u64(5);
        let seq = bit_sequence(30, &mut rng);
        assert_eq!(seq.len(), 30);
        for (p, &b) in seq.iter().enumerate() {
            assert!(b == 0.0 || b == 1.0);
            if (p + 1) % 3 == 0 {
                let expected = (seq[p - 1] as u8) ^ (seq[p - 2] as u8);
                assert_eq!(b as u8, expected, "position {p}");
            }
        }
    }

    #[test]
    fn shape_requires_matching_outputs() {
        assert!(ElmanShape::new(1, 3, 1).is_ok());
        assert!(ElmanShape::new(1, 3, 2).is_err());
        assert!(ElmanShape::new(1, 0, 1).is_err());

        let shape = ElmanShape::new(1, 3, 1).unwrap();
        assert_eq!(shape.net_shape().unwrap(), NetShape::new(4, 3, 1).unwrap());
    }

    #[test]
    fn context_starts_small_and_tracks_hidden_layer() {
        let shape = ElmanShape::new(1, 3, 1).unwrap();
        let mut net = ElmanNetwork::new_with_seed(shape, 0.1, 2).unwrap();
        assert!(net.context().iter().all(|&c| (0.0..0.1).contains(&c)));

        let y = net.step(&[1.0]).unwrap();
        assert_eq!(y.len(), 1);
        assert!(net.context().iter().all(|&c| c > 0.0 && c < 1.0));
        assert!(net.step(&[1.0, 0.0]).is_err());
    }

    #[test]
    fn wrap_trains_final_step_and_skip_does_not() {
        let shape = ElmanShape::new(1, 3, 1).unwrap();
        let seq = [1.0, 0.0, 1.0, 1.0, 0.0, 1.0];
        let cfg = ElmanConfig {
            epochs: 3,
            report_every: None,
            ..ElmanConfig::default()
        };

        let mut wrap = ElmanNetwork::new_with_seed(shape, 0.1, 9).unwrap();
        let report = wrap.fit_sequence(&seq, &cfg).unwrap();
        assert_eq!(report.epoch_errors.len(), 3);
        assert!(report.last_epoch_errors[5] > 0.0);

        let cfg = ElmanConfig {
            wrap: TargetWrap::Skip,
            ..cfg
        };
        let mut skip = ElmanNetwork::new_with_seed(shape, 0.1, 9).unwrap();
        let report = skip.fit_sequence(&seq, &cfg).unwrap();
        assert_eq!(report.last_epoch_errors[5], 0.0);
        assert!(report.last_epoch_errors[..5].iter().all(|&e| e > 0.0));
    }

    #[test]
    fn learns_the_xor_bits() {
        let shape = ElmanShape::new(1, 3, 1).unwrap();
        let cfg = ElmanConfig {
            epochs: 600,
            report_every: None,
            ..ElmanConfig::default()
        };

        let mut xor_error = 0.0;
        let mut random_error = 0.0;
        for seed in 0..8 {
            let mut rng = StdRng::seed_from_u64(seed);
            let seq = bit_sequence(300, &mut rng);
            let mut net = ElmanNetwork::new_with_rng(shape, cfg.context_noise, &mut rng).unwrap();
            let report = net.fit_sequence(&seq, &cfg).unwrap();

            let mean = |w: &[(usize, f64)]| {
                w.iter().map(|&(_, e)| e).sum::<f64>() / w.len() as f64
            };
            let first = mean(&report.epoch_errors[..50]);
            let last = mean(&report.epoch_errors[550..]);
            assert!(last < first, "seed {seed}: error rose from {first} to {last}");

            // Step t predicts element t + 1, which is an XOR bit when (t + 2) % 3 == 0.
            for (t, &e) in report.last_epoch_errors.iter().enumerate() {
                if (t + 2) % 3 == 0 {
                    xor_error += e / 100.0;
                } else {
                    random_error += e / 200.0;
                }
            }
        }
        assert!(
            xor_error < random_error,
            "xor bits {xor_error} vs random bits {random_error}"
        );
    }

    #[test]
    fn rejects_short_or_ragged_sequences() {
        let shape = ElmanShape::new(2, 3, 2).unwrap();
        let mut net = ElmanNetwork::new_with_seed(shape, 0.1, 0).unwrap();
        let cfg = ElmanConfig::default();
        assert!(net.fit_sequence(&[1.0, 0.0, 1.0], &cfg).is_err());
        assert!(net.fit_sequence(&[1.0, 0.0], &cfg).is_err());
    }
}
