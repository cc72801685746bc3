use tracing::{debug, info, warn};

use crate::{Dataset, Error, Network, Result, loss};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainConfig {
    /// Upper bound on full passes over the dataset.
    pub epochs: usize,
    pub learning_rate: f64,
    /// Stop once the summed epoch error falls below this value.
    pub error_threshold: Option<f64>,
    /// Emit a per-sample progress report every this many epochs.
    pub report_every: Option<usize>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epochs: 50_000,
            learning_rate: 0.2,
            error_threshold: Some(0.001),
            report_every: Some(1_000),
        }
    }
}

impl TrainConfig {
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
        if let Some(t) = self.error_threshold {
            if !(t.is_finite() && t >= 0.0) {
                return Err(Error::InvalidArgument(format!(
                    "error threshold must be finite and >= 0, got {t}"
                )));
            }
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
pub struct FitReport {
    /// Number of epochs actually run.
    pub epochs_run: usize,
    /// Whether the error threshold stopped training early.
    pub converged: bool,
    /// Summed error of the last epoch.
    pub final_error: f64,
    /// `(epoch, summed error)` for every epoch run.
    pub epoch_errors: Vec<(usize, f64)>,
}

/// Result of running one sample through a trained network.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleResult {
    pub index: usize,
    pub input: Vec<f64>,
    pub target: Vec<f64>,
    pub output: Vec<f64>,
    pub error: f64,
}

impl Network {
    /// Train online (one update per sample) until the epoch budget is spent or
    /// the summed epoch error drops below `cfg.error_threshold`.
    pub fn fit(&mut self, train: &Dataset, cfg: &TrainConfig) -> Result<FitReport> {
        if train.is_empty() {
            return Err(Error::InvalidArgument(
                "train dataset must not be empty".to_owned(),
            ));
        }
        self.check_dataset(train)?;
        cfg.validate()?;

        let mut trainer = self.trainer();
        let mut epoch_errors = Vec::with_capacity(cfg.epochs);
        let mut converged = false;

        for epoch in 0..cfg.epochs {
            let report = cfg.report_every.is_some_and(|n| epoch % n == 0);
            if report {
                info!(epoch, "training");
            }

            let mut epoch_error = 0.0;
            for idx in 0..train.len() {
                let input = train.input(idx);
                let target = train.target(idx);
                let error = self.train_step(input, target, cfg.learning_rate, &mut trainer)?;
                epoch_error += error;

                if report {
                    // `trainer.trace` still holds the pre-update forward pass.
                    debug!(
                        sample = idx + 1,
                        ?input,
                        ?target,
                        output = ?trainer.trace.output(),
                        error,
                        running_error = epoch_error,
                        "sample"
                    );
                }
            }
            epoch_errors.push((epoch, epoch_error));

            if cfg.error_threshold.is_some_and(|t| epoch_error < t) {
                converged = true;
                break;
            }
        }

        let (last_epoch, final_error) = epoch_errors
            .last()
            .copied()
            .ok_or_else(|| Error::InvalidArgument("no epochs were run".to_owned()))?;
        if converged {
            info!(epochs = last_epoch + 1, final_error, "converged");
        } else if cfg.error_threshold.is_some() {
            warn!(
                epochs = last_epoch + 1,
                final_error, "epoch budget exhausted before reaching the error threshold"
            );
        }

        Ok(FitReport {
            epochs_run: last_epoch + 1,
            converged,
            final_error,
            epoch_errors,
        })
    }

    /// Run every sample forward without updating and report its error.
    pub fn evaluate(&self, data: &Dataset) -> Result<Vec<SampleResult>> {
        self.check_dataset(data)?;

        let mut trace = self.activation_trace();
        let mut results = Vec::with_capacity(data.len());
        for index in 0..data.len() {
            let input = data.input(index);
            let target = data.target(index);
            self.forward_into(input, &mut trace)?;
            results.push(SampleResult {
                index,
                input: input.to_vec(),
                target: target.to_vec(),
                output: trace.output().to_vec(),
                error: loss::squared_error(trace.output(), target)?,
            });
        }
        Ok(results)
    }

    /// Summed error over a dataset.
    pub fn total_error(&self, data: &Dataset) -> Result<f64> {
        Ok(self.evaluate(data)?.iter().map(|r| r.error).sum())
    }
}
