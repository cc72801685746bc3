//! Run configuration for the command-line driver.
//!
//! A YAML file may provide any subset of the settings; every field is
//! optional. Command-line flags are parsed into the same structs and merged
//! on top, so a flag always wins over the file, and the file over the
//! built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::rnn::{ElmanConfig, TargetWrap};
use crate::{Error, QLearningConfig, Result, TrainConfig};

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    pub seed: Option<u64>,
    pub verbose: Option<bool>,
    #[serde(default)]
    pub train: TrainSection,
    #[serde(default)]
    pub rnn: RnnSection,
    #[serde(default)]
    pub maze: MazeSection,
}

/// Feed-forward training on a dataset file.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrainSection {
    pub data: Option<PathBuf>,
    pub inputs: Option<usize>,
    pub hidden: Option<usize>,
    pub outputs: Option<usize>,
    pub epochs: Option<usize>,
    pub learning_rate: Option<f64>,
    pub beta: Option<f64>,
    pub error_threshold: Option<f64>,
    /// `false` runs the whole epoch budget, ignoring any threshold.
    pub early_stop: Option<bool>,
    pub report_every: Option<usize>,
    pub weights_out: Option<PathBuf>,
    pub errors_out: Option<PathBuf>,
}

/// Elman network on a generated XOR bit sequence.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RnnSection {
    pub hidden: Option<usize>,
    pub sequence_len: Option<usize>,
    pub epochs: Option<usize>,
    pub learning_rate: Option<f64>,
    pub beta: Option<f64>,
    pub wrap: Option<TargetWrap>,
    pub seeds: Option<Vec<u64>>,
    pub report_every: Option<usize>,
    pub errors_out: Option<PathBuf>,
}

/// Q-learning on the cliff maze.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MazeSection {
    pub rows: Option<usize>,
    pub cols: Option<usize>,
    pub episodes: Option<usize>,
    pub max_steps: Option<usize>,
    pub epsilon: Option<f64>,
    pub alpha: Option<f64>,
    pub gamma: Option<f64>,
    pub report_every: Option<usize>,
    pub table_out: Option<PathBuf>,
    pub trajectory_out: Option<PathBuf>,
}

impl RunConfig {
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        serde_yaml::from_str(s).map_err(|e| Error::Format(format!("invalid run config: {e}")))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let p = path.as_ref();
        let s = fs::read_to_string(p).map_err(|e| Error::from_io(p, e))?;
        Self::from_yaml_str(&s)
    }

    // merge configs where the second overwrites the first
    pub fn merge(self, other: Self) -> Self {
        Self {
            seed: other.seed.or(self.seed),
            verbose: other.verbose.or(self.verbose),
            train: self.train.merge(other.train),
            rnn: self.rnn.merge(other.rnn),
            maze: self.maze.merge(other.maze),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed.unwrap_or(1)
    }
}

impl TrainSection {
    pub fn merge(self, other: Self) -> Self {
        Self {
            data: other.data.or(self.data),
            inputs: other.inputs.or(self.inputs),
            hidden: other.hidden.or(self.hidden),
            outputs: other.outputs.or(self.outputs),
            epochs: other.epochs.or(self.epochs),
            learning_rate: other.learning_rate.or(self.learning_rate),
            beta: other.beta.or(self.beta),
            error_threshold: other.error_threshold.or(self.error_threshold),
            early_stop: other.early_stop.or(self.early_stop),
            report_every: other.report_every.or(self.report_every),
            weights_out: other.weights_out.or(self.weights_out),
            errors_out: other.errors_out.or(self.errors_out),
        }
    }

    /// Unit counts, defaulting to the 2-3-1 XOR layout.
    pub fn unit_counts(&self) -> (usize, usize, usize) {
        (
            self.inputs.unwrap_or(2),
            self.hidden.unwrap_or(3),
            self.outputs.unwrap_or(1),
        )
    }

    pub fn train_config(&self) -> TrainConfig {
        let d = TrainConfig::default();
        TrainConfig {
            epochs: self.epochs.unwrap_or(d.epochs),
            learning_rate: self.learning_rate.unwrap_or(d.learning_rate),
            error_threshold: match self.early_stop {
                Some(false) => None,
                _ => self.error_threshold.or(d.error_threshold),
            },
            report_every: self.report_every.or(d.report_every),
        }
    }
}

impl RnnSection {
    pub fn merge(self, other: Self) -> Self {
        Self {
            hidden: other.hidden.or(self.hidden),
            sequence_len: other.sequence_len.or(self.sequence_len),
            epochs: other.epochs.or(self.epochs),
            learning_rate: other.learning_rate.or(self.learning_rate),
            beta: other.beta.or(self.beta),
            wrap: other.wrap.or(self.wrap),
            seeds: other.seeds.or(self.seeds),
            report_every: other.report_every.or(self.report_every),
            errors_out: other.errors_out.or(self.errors_out),
        }
    }

    /// Hidden (and context) units, defaulting to 3.
    pub fn hidden_units(&self) -> usize {
        self.hidden.unwrap_or(3)
    }

    pub fn elman_config(&self) -> ElmanConfig {
        let d = ElmanConfig::default();
        ElmanConfig {
            epochs: self.epochs.unwrap_or(d.epochs),
            learning_rate: self.learning_rate.unwrap_or(d.learning_rate),
            wrap: self.wrap.unwrap_or(d.wrap),
            context_noise: d.context_noise,
            report_every: self.report_every.or(d.report_every),
        }
    }
}

impl MazeSection {
    pub fn merge(self, other: Self) -> Self {
        Self {
            rows: other.rows.or(self.rows),
            cols: other.cols.or(self.cols),
            episodes: other.episodes.or(self.episodes),
            max_steps: other.max_steps.or(self.max_steps),
            epsilon: other.epsilon.or(self.epsilon),
            alpha: other.alpha.or(self.alpha),
            gamma: other.gamma.or(self.gamma),
            report_every: other.report_every.or(self.report_every),
            table_out: other.table_out.or(self.table_out),
            trajectory_out: other.trajectory_out.or(self.trajectory_out),
        }
    }

    /// Grid size, defaulting to 11 x 19.
    pub fn grid(&self) -> (usize, usize) {
        (self.rows.unwrap_or(11), self.cols.unwrap_or(19))
    }

    pub fn q_learning_config(&self) -> QLearningConfig {
        let d = QLearningConfig::default();
        QLearningConfig {
            episodes: self.episodes.unwrap_or(d.episodes),
            max_steps: self.max_steps.unwrap_or(d.max_steps),
            epsilon: self.epsilon.unwrap_or(d.epsilon),
            alpha: self.alpha.unwrap_or(d.alpha),
            gamma: self.gamma.unwrap_or(d.gamma),
            report_every: self.report_every.or(d.report_every),
        }
    }
}
