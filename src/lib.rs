//! Small numeric learning experiments, written from scratch.
//!
//! `rust-backprop` implements a three-layer sigmoid network trained by plain
//! online back-propagation, and two drivers built around the same pieces:
//!
//! - [`Network`]: forward propagation, error, backward propagation and the
//!   delta-rule weight update, plus a bounded training loop ([`Network::fit`]).
//! - [`rnn::ElmanNetwork`]: the same network with a context layer, learning a
//!   bit sequence where every third bit is the XOR of the previous two.
//! - [`qlearn`]: tabular Q-learning on a grid [`maze::Maze`] with a pit row.
//!
//! # Shapes
//!
//! - Scalars are `f64`.
//! - Unit counts travel in a [`NetShape`]; nothing is stored globally.
//! - `W1` is `(inputs + 1, hidden)` and `W2` is `(hidden + 1, outputs)`; the
//!   last row of each is the bias row.
//! - A [`Dataset`] row is the input features followed by the target values.
//!
//! # Errors
//!
//! Every public operation validates its arguments on entry and returns
//! [`Error::InvalidArgument`] on a shape, count or range mismatch. Missing
//! input files surface as [`Error::MissingResource`]. Numeric overflow and
//! NaN are not guarded against.
//!
//! # Quick start
//!
//! ```rust
//! use rust_backprop::{Dataset, NetShape, Network, TrainConfig};
//!
//! # fn main() -> rust_backprop::Result<()> {
//! let train = Dataset::parse("0 0 0\n0 1 1\n1 0 1\n1 1 0\n", 2)?;
//! let mut net = Network::new_with_seed(NetShape::new(2, 3, 1)?, 1)?;
//!
//! let report = net.fit(
//!     &train,
//!     &TrainConfig {
//!         epochs: 200,
//!         learning_rate: 0.2,
//!         error_threshold: Some(0.001),
//!         report_every: None,
//!     },
//! )?;
//! assert_eq!(report.epoch_errors.len(), report.epochs_run);
//! # Ok(())
//! # }
//! ```
//!
//! # Driving the steps yourself
//!
//! ```rust
//! use rust_backprop::{NetShape, Network, loss};
//!
//! # fn main() -> rust_backprop::Result<()> {
//! let mut net = Network::new_with_seed(NetShape::new(2, 3, 1)?, 0)?;
//! let mut trainer = net.trainer();
//!
//! net.forward_into(&[1.0, 0.0], &mut trainer.trace)?;
//! let _error = loss::squared_error(trainer.trace.output(), &[1.0])?;
//! net.backward_into(&[1.0], &trainer.trace, &mut trainer.grads)?;
//! net.update(&trainer.trace, &trainer.grads, 0.2)?;
//! # Ok(())
//! # }
//! ```

pub mod activation;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod loss;
pub mod maze;
pub mod network;
pub mod persist;
pub mod qlearn;
pub mod rnn;
pub mod series;
pub mod shape;
pub mod train;
pub mod weights;

pub use activation::{DEFAULT_BETA, Sigmoid};
pub use data::Dataset;
pub use error::{Error, Result};
pub use network::{ActivationTrace, GradientTrace, Network, Trainer};
pub use persist::ArrayBlob;
pub use qlearn::{QLearningConfig, QTable};
pub use shape::NetShape;
pub use train::{FitReport, SampleResult, TrainConfig};
pub use weights::{Matrix, NetworkWeights};
