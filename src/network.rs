use rand::Rng;

use crate::{Dataset, Error, NetShape, NetworkWeights, Result, Sigmoid, loss};

/// A three-layer sigmoid network: input, hidden, output.
///
/// Both the input and hidden layers carry an extra bias unit fixed at `1.0`.
#[derive(Debug, Clone)]
pub struct Network {
    shape: NetShape,
    weights: NetworkWeights,
    activation: Sigmoid,
}

/// Layer outputs of one forward pass.
///
/// - `x`: inputs followed by the bias unit (`inputs + 1`)
/// - `h`: hidden outputs followed by the bias unit (`hidden + 1`)
/// - `y`: network outputs (`outputs`)
///
/// Allocate once via `Network::activation_trace()` and reuse across samples.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivationTrace {
    pub x: Vec<f64>,
    pub h: Vec<f64>,
    pub y: Vec<f64>,
}

/// Error signals of one backward pass (overwrite semantics).
///
/// - `delta_h`: one entry per hidden unit, bias excluded
/// - `delta_y`: one entry per output unit
#[derive(Debug, Clone, PartialEq)]
pub struct GradientTrace {
    pub delta_h: Vec<f64>,
    pub delta_y: Vec<f64>,
}

impl Network {
    pub fn new_with_seed(shape: NetShape, seed: u64) -> Result<Self> {
        let weights = NetworkWeights::new_with_seed(&shape, seed)?;
        Ok(Self::from_weights_unchecked(shape, weights, Sigmoid::default()))
    }

    pub fn new_with_rng<R: Rng + ?Sized>(shape: NetShape, rng: &mut R) -> Result<Self> {
        let weights = NetworkWeights::new_with_rng(&shape, rng)?;
        Ok(Self::from_weights_unchecked(shape, weights, Sigmoid::default()))
    }

    /// Wrap existing weights, validating them against `shape`.
    pub fn from_weights(shape: NetShape, weights: NetworkWeights) -> Result<Self> {
        weights.check_shape(&shape)?;
        Ok(Self::from_weights_unchecked(shape, weights, Sigmoid::default()))
    }

    fn from_weights_unchecked(shape: NetShape, weights: NetworkWeights, activation: Sigmoid) -> Self {
        Self {
            shape,
            weights,
            activation,
        }
    }

    /// Replace the sigmoid steepness.
    pub fn with_activation(mut self, activation: Sigmoid) -> Self {
        self.activation = activation;
        self
    }

    #[inline]
    pub fn shape(&self) -> &NetShape {
        &self.shape
    }

    #[inline]
    pub fn weights(&self) -> &NetworkWeights {
        &self.weights
    }

    #[inline]
    pub fn activation(&self) -> Sigmoid {
        self.activation
    }

    #[inline]
    pub fn into_weights(self) -> NetworkWeights {
        self.weights
    }

    pub fn activation_trace(&self) -> ActivationTrace {
        ActivationTrace::new(&self.shape)
    }

    pub fn gradient_trace(&self) -> GradientTrace {
        GradientTrace::new(&self.shape)
    }

    /// Convenience constructor: allocate all training buffers.
    #[inline]
    pub fn trainer(&self) -> Trainer {
        Trainer::new(self)
    }

    /// Forward pass for one input vector, allocating a fresh trace.
    pub fn forward(&self, input: &[f64]) -> Result<ActivationTrace> {
        let mut trace = self.activation_trace();
        self.forward_into(input, &mut trace)?;
        Ok(trace)
    }

    /// Forward pass for the `idx`-th sample of `data`.
    pub fn forward_sample(&self, data: &Dataset, idx: usize) -> Result<ActivationTrace> {
        self.check_dataset(data)?;
        if idx >= data.len() {
            return Err(Error::InvalidArgument(format!(
                "sample index {idx} out of range for dataset of {} samples",
                data.len()
            )));
        }
        self.forward(data.input(idx))
    }

    /// Forward pass for one input vector into a reusable trace.
    ///
    /// Computes:
    /// - `x = input ++ [1]`
    /// - `h_i = sigmoid(beta * sum_j W1[j, i] * x[j])`, then `h ++= [1]`
    /// - `y_i = sigmoid(beta * sum_j W2[j, i] * h[j])`
    pub fn forward_into(&self, input: &[f64], trace: &mut ActivationTrace) -> Result<()> {
        if input.len() != self.shape.inputs {
            return Err(Error::InvalidArgument(format!(
                "input len {} does not match network inputs {}",
                input.len(),
                self.shape.inputs
            )));
        }
        self.check_trace(trace)?;

        let hidden = self.shape.hidden;
        let act = self.activation;

        trace.x[..input.len()].copy_from_slice(input);
        trace.x[input.len()] = 1.0;

        self.weights.w1.vec_mul_into(&trace.x, &mut trace.h[..hidden]);
        for h in &mut trace.h[..hidden] {
            *h = act.forward(*h);
        }
        trace.h[hidden] = 1.0;

        self.weights.w2.vec_mul_into(&trace.h, &mut trace.y);
        for y in &mut trace.y {
            *y = act.forward(*y);
        }

        Ok(())
    }

    /// Backward pass for one sample, allocating a fresh gradient trace.
    pub fn backward(&self, target: &[f64], trace: &ActivationTrace) -> Result<GradientTrace> {
        let mut grads = self.gradient_trace();
        self.backward_into(target, trace, &mut grads)?;
        Ok(grads)
    }

    /// Backward pass into a reusable gradient trace.
    ///
    /// You must call `forward_into` first; `trace` holds its outputs.
    ///
    /// - `delta_y_i = beta * (t_i - y_i) * (1 - y_i) * y_i`
    /// - `delta_h_i = beta * (sum_j W2[i, j] * delta_y_j) * (1 - h_i) * h_i`
    pub fn backward_into(
        &self,
        target: &[f64],
        trace: &ActivationTrace,
        grads: &mut GradientTrace,
    ) -> Result<()> {
        if target.len() != self.shape.outputs {
            return Err(Error::InvalidArgument(format!(
                "target len {} does not match network outputs {}",
                target.len(),
                self.shape.outputs
            )));
        }
        self.check_trace(trace)?;
        self.check_gradients(grads)?;

        let act = self.activation;

        for ((d, &y), &t) in grads.delta_y.iter_mut().zip(&trace.y).zip(target) {
            *d = (t - y) * act.grad_from_output(y);
        }

        for (i, d) in grads.delta_h.iter_mut().enumerate() {
            let back: f64 = self
                .weights
                .w2
                .row(i)
                .iter()
                .zip(&grads.delta_y)
                .map(|(&w, &dy)| w * dy)
                .sum();
            *d = back * act.grad_from_output(trace.h[i]);
        }

        Ok(())
    }

    /// Apply the delta rule to both weight matrices in place.
    ///
    /// `W1[i, j] += lr * x[i] * delta_h[j]`, then `W2[i, j] += lr * h[i] * delta_y[j]`.
    pub fn update(
        &mut self,
        trace: &ActivationTrace,
        grads: &GradientTrace,
        learning_rate: f64,
    ) -> Result<()> {
        if !(learning_rate.is_finite() && learning_rate > 0.0) {
            return Err(Error::InvalidArgument(format!(
                "learning rate must be finite and > 0, got {learning_rate}"
            )));
        }
        self.check_trace(trace)?;
        self.check_gradients(grads)?;

        self.weights
            .w1
            .add_outer(learning_rate, &trace.x, &grads.delta_h);
        self.weights
            .w2
            .add_outer(learning_rate, &trace.h, &grads.delta_y);
        Ok(())
    }

    /// One online training step: forward, error, backward, update.
    ///
    /// Returns the sample's error measured before the update.
    pub fn train_step(
        &mut self,
        input: &[f64],
        target: &[f64],
        learning_rate: f64,
        trainer: &mut Trainer,
    ) -> Result<f64> {
        self.forward_into(input, &mut trainer.trace)?;
        let error = loss::squared_error(trainer.trace.output(), target)?;
        self.backward_into(target, &trainer.trace, &mut trainer.grads)?;
        self.update(&trainer.trace, &trainer.grads, learning_rate)?;
        Ok(error)
    }

    /// Check that `data` rows split into this network's inputs and targets.
    pub fn check_dataset(&self, data: &Dataset) -> Result<()> {
        if data.input_dim() != self.shape.inputs {
            return Err(Error::InvalidArgument(format!(
                "dataset input_dim {} does not match network inputs {}",
                data.input_dim(),
                self.shape.inputs
            )));
        }
        if data.target_dim() != self.shape.outputs {
            return Err(Error::InvalidArgument(format!(
                "dataset target_dim {} does not match network outputs {}",
                data.target_dim(),
                self.shape.outputs
            )));
        }
        Ok(())
    }

    fn check_trace(&self, trace: &ActivationTrace) -> Result<()> {
        let s = &self.shape;
        if trace.x.len() != s.inputs + 1
            || trace.h.len() != s.hidden + 1
            || trace.y.len() != s.outputs
        {
            return Err(Error::InvalidArgument(format!(
                "activation trace lengths ({}, {}, {}) do not match network shape {s:?}",
                trace.x.len(),
                trace.h.len(),
                trace.y.len()
            )));
        }
        Ok(())
    }

    fn check_gradients(&self, grads: &GradientTrace) -> Result<()> {
        let s = &self.shape;
        if grads.delta_h.len() != s.hidden || grads.delta_y.len() != s.outputs {
            return Err(Error::InvalidArgument(format!(
                "gradient trace lengths ({}, {}) do not match network shape {s:?}",
                grads.delta_h.len(),
                grads.delta_y.len()
            )));
        }
        Ok(())
    }
}

/// Reusable buffers for training a specific `Network`.
///
/// This is the ergonomic wrapper around `ActivationTrace` + `GradientTrace`.
#[derive(Debug, Clone)]
pub struct Trainer {
    pub trace: ActivationTrace,
    pub grads: GradientTrace,
}

impl Trainer {
    pub fn new(network: &Network) -> Self {
        Self {
            trace: network.activation_trace(),
            grads: network.gradient_trace(),
        }
    }
}

impl ActivationTrace {
    pub fn new(shape: &NetShape) -> Self {
        Self {
            x: vec![0.0; shape.inputs + 1],
            h: vec![0.0; shape.hidden + 1],
            y: vec![0.0; shape.outputs],
        }
    }

    /// Hidden-layer outputs without the bias unit.
    #[inline]
    pub fn hidden(&self) -> &[f64] {
        &self.h[..self.h.len() - 1]
    }

    #[inline]
    pub fn output(&self) -> &[f64] {
        &self.y
    }
}

impl GradientTrace {
    pub fn new(shape: &NetShape) -> Self {
        Self {
            delta_h: vec![0.0; shape.hidden],
            delta_y: vec![0.0; shape.outputs],
        }
    }
}
