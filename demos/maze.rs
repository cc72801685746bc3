use rand::SeedableRng;
use rand::rngs::StdRng;

use rust_backprop::maze::Maze;
use rust_backprop::{QLearningConfig, QTable, qlearn};

fn main() -> rust_backprop::Result<()> {
    let maze = Maze::cliff(4, 12)?;
    let mut rng = StdRng::seed_from_u64(0);
    let mut table = QTable::for_maze(&maze, &mut rng);

    let cfg = QLearningConfig {
        episodes: 1_000,
        report_every: None,
        ..QLearningConfig::default()
    };
    let stats = qlearn::train(&maze, &mut table, &cfg, &mut rng)?;
    let reached = stats.iter().filter(|s| s.reached_goal).count();
    println!("episodes={} reached_goal={reached}", stats.len());

    println!("{maze}");
    println!("{}", table.policy_arrows());

    let path = qlearn::greedy_rollout(&maze, &table, cfg.max_steps)?;
    println!("greedy path: {path:?}");
    Ok(())
}
