use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use rust_backprop::config::{MazeSection, RnnSection, RunConfig, TrainSection};
use rust_backprop::maze::Maze;
use rust_backprop::rnn::{self, ElmanNetwork, ElmanShape, TargetWrap};
use rust_backprop::{
    DEFAULT_BETA, Dataset, NetShape, Network, QTable, Sigmoid, logging, qlearn, series,
};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// YAML run file; command-line flags override its values
    #[arg(short, long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Random seed for weight and table initialization
    #[arg(long, global = true)]
    seed: Option<u64>,
    /// Log per-sample progress
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train the feed-forward network on a dataset file
    Train {
        /// Whitespace-delimited rows: inputs followed by targets
        #[arg(short, long, value_name = "PATH")]
        data: Option<PathBuf>,
        #[arg(long)]
        inputs: Option<usize>,
        #[arg(long)]
        hidden: Option<usize>,
        #[arg(long)]
        outputs: Option<usize>,
        #[arg(short, long, value_name = "INT")]
        epochs: Option<usize>,
        #[arg(long)]
        learning_rate: Option<f64>,
        /// Sigmoid steepness
        #[arg(long)]
        beta: Option<f64>,
        /// Stop once the summed epoch error is below this value
        #[arg(long)]
        error_threshold: Option<f64>,
        /// Run every epoch, ignoring the error threshold
        #[arg(long)]
        no_early_stop: bool,
        #[arg(long, value_name = "EPOCHS")]
        report_every: Option<usize>,
        /// Where to write the trained weights
        #[arg(long, value_name = "PATH")]
        weights_out: Option<PathBuf>,
        /// Where to write the `epoch error` series
        #[arg(long, value_name = "PATH")]
        errors_out: Option<PathBuf>,
    },
    /// Train an Elman network on a generated XOR bit sequence
    Rnn {
        #[arg(long)]
        hidden: Option<usize>,
        #[arg(long, value_name = "INT")]
        sequence_len: Option<usize>,
        #[arg(short, long, value_name = "INT")]
        epochs: Option<usize>,
        #[arg(long)]
        learning_rate: Option<f64>,
        #[arg(long)]
        beta: Option<f64>,
        /// Target of the final step
        #[arg(long, value_enum)]
        wrap: Option<WrapArg>,
        /// Average the last-epoch error over these seeds
        #[arg(long, value_delimiter = ',')]
        seeds: Option<Vec<u64>>,
        #[arg(long, value_name = "EPOCHS")]
        report_every: Option<usize>,
        /// Where to write the averaged per-step error series
        #[arg(long, value_name = "PATH")]
        errors_out: Option<PathBuf>,
    },
    /// Run Q-learning on the cliff maze
    Maze {
        #[arg(long)]
        rows: Option<usize>,
        #[arg(long)]
        cols: Option<usize>,
        #[arg(long)]
        episodes: Option<usize>,
        #[arg(long)]
        max_steps: Option<usize>,
        #[arg(long)]
        epsilon: Option<f64>,
        #[arg(long)]
        alpha: Option<f64>,
        #[arg(long)]
        gamma: Option<f64>,
        #[arg(long, value_name = "EPISODES")]
        report_every: Option<usize>,
        /// Where to write the Q-table blob
        #[arg(long, value_name = "PATH")]
        table_out: Option<PathBuf>,
        /// Where to write the greedy `row col` trajectory
        #[arg(long, value_name = "PATH")]
        trajectory_out: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum WrapArg {
    Wrap,
    Skip,
}

impl From<WrapArg> for TargetWrap {
    fn from(value: WrapArg) -> Self {
        match value {
            WrapArg::Wrap => TargetWrap::Wrap,
            WrapArg::Skip => TargetWrap::Skip,
        }
    }
}

enum Mode {
    Train,
    Rnn,
    Maze,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let file = match &args.config {
        Some(path) => RunConfig::load(path)
            .with_context(|| format!("loading run config {}", path.display()))?,
        None => RunConfig::default(),
    };
    let (mode, sections) = flags_for(args.command);
    let flags = RunConfig {
        seed: args.seed,
        verbose: args.verbose.then_some(true),
        ..sections
    };
    let cfg = file.merge(flags);

    logging::install_logger(cfg.verbose.unwrap_or(false))?;

    match mode {
        Mode::Train => run_train(&cfg),
        Mode::Rnn => run_rnn(&cfg),
        Mode::Maze => run_maze(&cfg),
    }
}

/// Flags of the chosen subcommand, as a partial run config.
fn flags_for(command: Command) -> (Mode, RunConfig) {
    match command {
        Command::Train {
            data,
            inputs,
            hidden,
            outputs,
            epochs,
            learning_rate,
            beta,
            error_threshold,
            no_early_stop,
            report_every,
            weights_out,
            errors_out,
        } => (
            Mode::Train,
            RunConfig {
                train: TrainSection {
                    data,
                    inputs,
                    hidden,
                    outputs,
                    epochs,
                    learning_rate,
                    beta,
                    error_threshold,
                    early_stop: no_early_stop.then_some(false),
                    report_every,
                    weights_out,
                    errors_out,
                },
                ..RunConfig::default()
            },
        ),
        Command::Rnn {
            hidden,
            sequence_len,
            epochs,
            learning_rate,
            beta,
            wrap,
            seeds,
            report_every,
            errors_out,
        } => (
            Mode::Rnn,
            RunConfig {
                rnn: RnnSection {
                    hidden,
                    sequence_len,
                    epochs,
                    learning_rate,
                    beta,
                    wrap: wrap.map(TargetWrap::from),
                    seeds,
                    report_every,
                    errors_out,
                },
                ..RunConfig::default()
            },
        ),
        Command::Maze {
            rows,
            cols,
            episodes,
            max_steps,
            epsilon,
            alpha,
            gamma,
            report_every,
            table_out,
            trajectory_out,
        } => (
            Mode::Maze,
            RunConfig {
                maze: MazeSection {
                    rows,
                    cols,
                    episodes,
                    max_steps,
                    epsilon,
                    alpha,
                    gamma,
                    report_every,
                    table_out,
                    trajectory_out,
                },
                ..RunConfig::default()
            },
        ),
    }
}

fn run_train(cfg: &RunConfig) -> anyhow::Result<()> {
    let section = &cfg.train;
    let Some(data_path) = &section.data else {
        bail!("no dataset given; pass --data or set train.data in the run config");
    };
    let (inputs, hidden, outputs) = section.unit_counts();
    let shape = NetShape::new(inputs, hidden, outputs)?;
    let train = Dataset::load(data_path, inputs)
        .with_context(|| format!("loading dataset {}", data_path.display()))?;

    let activation = Sigmoid::new(section.beta.unwrap_or(DEFAULT_BETA))?;
    let mut net = Network::new_with_seed(shape, cfg.seed())?.with_activation(activation);

    let train_cfg = section.train_config();
    info!(
        samples = train.len(),
        inputs,
        hidden,
        outputs,
        epochs = train_cfg.epochs,
        learning_rate = train_cfg.learning_rate,
        "training"
    );
    let report = net.fit(&train, &train_cfg)?;
    info!(
        epochs_run = report.epochs_run,
        converged = report.converged,
        final_error = report.final_error,
        "training finished"
    );

    for r in net.evaluate(&train)? {
        println!(
            "sample {}: input {:?} target {:?} output {:?} error {:.6}",
            r.index, r.input, r.target, r.output, r.error
        );
    }

    if let Some(path) = &section.weights_out {
        net.weights().save(path)?;
        info!(path = %path.display(), "weights saved");
    }
    if let Some(path) = &section.errors_out {
        series::write_error_series(path, &report.epoch_errors)?;
        info!(path = %path.display(), "error series written");
    }
    Ok(())
}

fn run_rnn(cfg: &RunConfig) -> anyhow::Result<()> {
    let section = &cfg.rnn;
    let elman_cfg = section.elman_config();
    let shape = ElmanShape::new(1, section.hidden_units(), 1)?;
    let activation = Sigmoid::new(section.beta.unwrap_or(DEFAULT_BETA))?;
    let sequence_len = section.sequence_len.unwrap_or(3_000);
    let seeds = section
        .seeds
        .clone()
        .unwrap_or_else(|| (1..=12).collect());
    if seeds.is_empty() {
        bail!("at least one seed is needed");
    }

    let mut last_epochs = Vec::with_capacity(seeds.len());
    for seed in seeds {
        let mut rng = StdRng::seed_from_u64(seed);
        let sequence = rnn::bit_sequence(sequence_len, &mut rng);
        let mut net = ElmanNetwork::new_with_rng(shape, elman_cfg.context_noise, &mut rng)?
            .with_activation(activation);
        let report = net.fit_sequence(&sequence, &elman_cfg)?;
        info!(
            seed,
            final_error = report.epoch_errors.last().map_or(0.0, |&(_, e)| e),
            "sequence run finished"
        );
        last_epochs.push(report.last_epoch_errors);
    }

    let averaged = series::average_series(&last_epochs)?;
    let points: Vec<(usize, f64)> = averaged.into_iter().enumerate().collect();
    match &section.errors_out {
        Some(path) => {
            series::write_error_series(path, &points)?;
            info!(path = %path.display(), "per-step error written");
        }
        None => print!("{}", series::format_error_series(&points)),
    }
    Ok(())
}

fn run_maze(cfg: &RunConfig) -> anyhow::Result<()> {
    let section = &cfg.maze;
    let (rows, cols) = section.grid();
    let q_cfg = section.q_learning_config();
    let maze = Maze::cliff(rows, cols)?;
    let mut rng = StdRng::seed_from_u64(cfg.seed());
    let mut table = QTable::for_maze(&maze, &mut rng);

    let stats = qlearn::train(&maze, &mut table, &q_cfg, &mut rng)?;
    let reached = stats.iter().filter(|s| s.reached_goal).count();
    info!(episodes = stats.len(), reached, "q-learning finished");

    println!("{maze}");
    println!("{}", table.policy_arrows());

    let trajectory = qlearn::greedy_rollout(&maze, &table, q_cfg.max_steps)?;
    info!(
        steps = trajectory.len() - 1,
        reached_goal = trajectory.last() == Some(&maze.goal()),
        "greedy rollout"
    );

    if let Some(path) = &section.table_out {
        table.save(path)?;
        info!(path = %path.display(), "q-table saved");
    }
    match &section.trajectory_out {
        Some(path) => {
            series::write_trajectory(path, &trajectory)?;
            info!(path = %path.display(), "trajectory written");
        }
        None => print!("{}", series::format_trajectory(&trajectory)),
    }
    Ok(())
}
