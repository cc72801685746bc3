//! Tabular Q-learning on a [`Maze`].
//!
//! The table holds one value per `(row, col, action)`. Training runs episodes
//! from the start cell, picking actions epsilon-greedily and applying the
//! one-step TD rule
//!
//! `Q(s, a) += alpha * (r + gamma * max_a' Q(s', a') - Q(s, a))`
//!
//! where `s'` is the cell the move landed on. Reaching the goal is terminal
//! and bootstraps from `0`.

use std::path::Path;

use rand::Rng;
use tracing::{debug, info};

use crate::maze::{Action, Maze, Pos};
use crate::persist::{self, ArrayBlob};
use crate::{Error, Result};

const NUM_ACTIONS: usize = Action::ALL.len();

fn check_unit_interval(name: &str, v: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&v) {
        return Err(Error::InvalidArgument(format!(
            "{name} must be in [0, 1], got {v}"
        )));
    }
    Ok(())
}

/// Dense `rows x cols x 4` action-value table.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl QTable {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            values: vec![0.0; rows * cols * NUM_ACTIONS],
        }
    }

    /// Every value drawn uniformly from `[0, 1)`.
    pub fn new_random<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Self {
        let values = (0..rows * cols * NUM_ACTIONS)
            .map(|_| rng.gen_range(0.0..1.0))
            .collect();
        Self { rows, cols, values }
    }

    /// Table sized for `maze`.
    pub fn for_maze<R: Rng + ?Sized>(maze: &Maze, rng: &mut R) -> Self {
        Self::new_random(maze.rows(), maze.cols(), rng)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Check that the table covers exactly the cells of `maze`.
    pub fn check_maze(&self, maze: &Maze) -> Result<()> {
        if (self.rows, self.cols) != (maze.rows(), maze.cols()) {
            return Err(Error::InvalidArgument(format!(
                "q-table is {}x{}, maze is {}x{}",
                self.rows,
                self.cols,
                maze.rows(),
                maze.cols()
            )));
        }
        Ok(())
    }

    /// Action values at `pos`, indexed by `Action::index`.
    #[inline]
    pub fn values(&self, (row, col): Pos) -> &[f64] {
        let start = (row * self.cols + col) * NUM_ACTIONS;
        &self.values[start..start + NUM_ACTIONS]
    }

    #[inline]
    fn values_mut(&mut self, (row, col): Pos) -> &mut [f64] {
        let start = (row * self.cols + col) * NUM_ACTIONS;
        &mut self.values[start..start + NUM_ACTIONS]
    }

    #[inline]
    pub fn get(&self, pos: Pos, action: Action) -> f64 {
        self.values(pos)[action.index()]
    }

    #[inline]
    pub fn set(&mut self, pos: Pos, action: Action, value: f64) {
        self.values_mut(pos)[action.index()] = value;
    }

    pub fn max_value(&self, pos: Pos) -> f64 {
        self.values(pos)
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// All actions whose value equals the maximum at `pos`.
    pub fn best_actions(&self, pos: Pos) -> Vec<Action> {
        let max = self.max_value(pos);
        Action::ALL
            .into_iter()
            .filter(|a| self.get(pos, *a) == max)
            .collect()
    }

    /// Deterministic greedy action: the first maximal one.
    pub fn greedy_action(&self, pos: Pos) -> Action {
        let max = self.max_value(pos);
        Action::ALL
            .into_iter()
            .find(|a| self.get(pos, *a) == max)
            .unwrap_or(Action::Up)
    }

    /// One-step TD update of `Q(pos, action)`; returns the new value.
    ///
    /// `next` is `None` for terminal transitions. `alpha` and `gamma` must lie
    /// in `[0, 1]`.
    pub fn td_update(
        &mut self,
        pos: Pos,
        action: Action,
        reward: f64,
        next: Option<Pos>,
        alpha: f64,
        gamma: f64,
    ) -> Result<f64> {
        check_unit_interval("alpha", alpha)?;
        check_unit_interval("gamma", gamma)?;
        let bootstrap = next.map_or(0.0, |p| self.max_value(p));
        let q = self.get(pos, action);
        let updated = q + alpha * (reward + gamma * bootstrap - q);
        self.set(pos, action, updated);
        Ok(updated)
    }

    pub fn to_blob(&self) -> ArrayBlob {
        ArrayBlob {
            shape: vec![self.rows, self.cols, NUM_ACTIONS],
            data: self.values.clone(),
        }
    }

    pub fn from_blob(blob: ArrayBlob) -> Result<Self> {
        blob.validate()?;
        match blob.shape[..] {
            [rows, cols, NUM_ACTIONS] => Ok(Self {
                rows,
                cols,
                values: blob.data,
            }),
            _ => Err(Error::Format(format!(
                "expected a rows x cols x {NUM_ACTIONS} array, got shape {:?}",
                blob.shape
            ))),
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persist::save_json(&self.to_blob(), path)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_blob(persist::load_json(path)?)
    }

    /// Greedy action per cell as arrows, one maze row per line.
    pub fn policy_arrows(&self) -> String {
        let mut out = String::with_capacity(self.rows * (self.cols * 4 + 1));
        for row in 0..self.rows {
            for col in 0..self.cols {
                out.push(self.greedy_action((row, col)).arrow());
                out.push(' ');
            }
            out.push('\n');
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QLearningConfig {
    pub episodes: usize,
    /// Step budget per episode.
    pub max_steps: usize,
    /// Probability of a uniformly random action.
    pub epsilon: f64,
    /// Learning rate.
    pub alpha: f64,
    /// Discount factor.
    pub gamma: f64,
    pub report_every: Option<usize>,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            episodes: 10_000,
            max_steps: 1_000,
            epsilon: 0.7,
            alpha: 0.1,
            gamma: 0.9,
            report_every: Some(1_000),
        }
    }
}

impl QLearningConfig {
    pub fn validate(&self) -> Result<()> {
        if self.episodes == 0 || self.max_steps == 0 {
            return Err(Error::InvalidArgument(
                "episodes and max_steps must be > 0".to_owned(),
            ));
        }
        check_unit_interval("epsilon", self.epsilon)?;
        check_unit_interval("alpha", self.alpha)?;
        check_unit_interval("gamma", self.gamma)?;
        if self.report_every == Some(0) {
            return Err(Error::InvalidArgument(
                "report_every must be > 0".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Per-episode outcome of a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeStats {
    pub steps: usize,
    pub total_reward: f64,
    pub reached_goal: bool,
}

/// Epsilon-greedy action selection.
///
/// With probability `1 - epsilon` pick a maximal action, breaking ties
/// uniformly at random; otherwise pick any action uniformly.
pub fn select_action<R: Rng + ?Sized>(
    table: &QTable,
    pos: Pos,
    epsilon: f64,
    rng: &mut R,
) -> Result<Action> {
    check_unit_interval("epsilon", epsilon)?;
    let action = if rng.gen_bool(1.0 - epsilon) {
        let best = table.best_actions(pos);
        best[rng.gen_range(0..best.len())]
    } else {
        Action::ALL[rng.gen_range(0..NUM_ACTIONS)]
    };
    Ok(action)
}

/// Run `cfg.episodes` episodes of Q-learning from the maze start.
pub fn train<R: Rng + ?Sized>(
    maze: &Maze,
    table: &mut QTable,
    cfg: &QLearningConfig,
    rng: &mut R,
) -> Result<Vec<EpisodeStats>> {
    cfg.validate()?;
    table.check_maze(maze)?;

    let mut stats = Vec::with_capacity(cfg.episodes);
    for episode in 0..cfg.episodes {
        if cfg.report_every.is_some_and(|n| episode % n == 0) {
            info!(episode, "q-learning");
        }

        let mut pos = maze.start();
        let mut total_reward = 0.0;
        let mut steps = 0;
        let mut reached_goal = false;

        while steps < cfg.max_steps {
            let action = select_action(table, pos, cfg.epsilon, rng)?;
            let t = maze.step(pos, action);
            let next = (!t.done).then_some(t.landed);
            table.td_update(pos, action, t.reward, next, cfg.alpha, cfg.gamma)?;

            total_reward += t.reward;
            steps += 1;
            pos = t.next;
            if t.done {
                reached_goal = true;
                break;
            }
        }

        debug!(episode, steps, total_reward, reached_goal, "episode finished");
        stats.push(EpisodeStats {
            steps,
            total_reward,
            reached_goal,
        });
    }
    Ok(stats)
}

/// Follow the greedy policy from the start cell.
///
/// Returns every visited position, start included, ending at the goal or
/// after `max_steps` moves.
pub fn greedy_rollout(maze: &Maze, table: &QTable, max_steps: usize) -> Result<Vec<Pos>> {
    table.check_maze(maze)?;
    let mut pos = maze.start();
    let mut trajectory = vec![pos];
    for _ in 0..max_steps {
        let t = maze.step(pos, table.greedy_action(pos));
        pos = t.next;
        trajectory.push(pos);
        if t.done {
            break;
        }
    }
    Ok(trajectory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::Cell;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn td_update_follows_the_rule() {
        let mut q = QTable::zeros(2, 2);
        q.set((0, 1), Action::Left, 2.0);
        q.set((0, 0), Action::Right, 1.0);

        let v = q
            .td_update((0, 0), Action::Right, -1.0, Some((0, 1)), 0.5, 0.9)
            .unwrap();
        assert!((v - (1.0 + 0.5 * (-1.0 + 0.9 * 2.0 - 1.0))).abs() < 1e-12);
        assert_eq!(q.get((0, 0), Action::Right), v);

        let v = q.td_update((1, 0), Action::Up, 10.0, None, 0.5, 0.9).unwrap();
        assert_eq!(v, 5.0);
    }

    #[test]
    fn out_of_range_rates_are_invalid() {
        let mut q = QTable::zeros(2, 2);
        let mut rng = StdRng::seed_from_u64(0);

        for epsilon in [1.5, -0.1, f64::NAN] {
            let err = select_action(&q, (0, 0), epsilon, &mut rng).unwrap_err();
            assert!(matches!(err, Error::InvalidArgument(_)), "epsilon {epsilon}");
        }
        assert!(select_action(&q, (0, 0), 1.0, &mut rng).is_ok());

        let before = q.clone();
        assert!(matches!(
            q.td_update((0, 0), Action::Up, 1.0, None, 1.5, 0.9),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            q.td_update((0, 0), Action::Up, 1.0, None, 0.5, f64::NAN),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(q, before);
    }

    #[test]
    fn rollout_rejects_a_table_for_another_maze() {
        let maze = Maze::cliff(4, 6).unwrap();
        let err = greedy_rollout(&maze, &QTable::zeros(2, 2), 10).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)), "got {err:?}");

        let mut rng = StdRng::seed_from_u64(0);
        let mut table = QTable::zeros(4, 5);
        let cfg = QLearningConfig {
            episodes: 1,
            report_every: None,
            ..QLearningConfig::default()
        };
        assert!(train(&maze, &mut table, &cfg, &mut rng).is_err());
    }

    #[test]
    fn ties_are_broken_at_random() {
        let mut q = QTable::zeros(1, 2);
        q.set((0, 0), Action::Up, 1.0);
        q.set((0, 0), Action::Down, 1.0);
        assert_eq!(q.best_actions((0, 0)), vec![Action::Up, Action::Down]);
        assert_eq!(q.greedy_action((0, 0)), Action::Up);

        let mut rng = StdRng::seed_from_u64(0);
        let mut seen_up = false;
        let mut seen_down = false;
        for _ in 0..200 {
            match select_action(&q, (0, 0), 0.0, &mut rng).unwrap() {
                Action::Up => seen_up = true,
                Action::Down => seen_down = true,
                other => panic!("greedy selection picked non-maximal {other:?}"),
            }
        }
        assert!(seen_up && seen_down);
    }

    #[test]
    fn blob_keeps_raw_shape() {
        let mut rng = StdRng::seed_from_u64(1);
        let q = QTable::new_random(11, 19, &mut rng);
        let blob = q.to_blob();
        assert_eq!(blob.shape, vec![11, 19, 4]);
        assert!(blob.data.iter().all(|v| (0.0..1.0).contains(v)));
        assert_eq!(QTable::from_blob(blob).unwrap(), q);

        let flat = ArrayBlob::new(vec![4, 4], vec![0.0; 16]).unwrap();
        assert!(QTable::from_blob(flat).is_err());
    }

    #[test]
    fn config_validation() {
        assert!(QLearningConfig::default().validate().is_ok());
        let bad = QLearningConfig {
            epsilon: 1.5,
            ..QLearningConfig::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn learned_policy_avoids_pits_and_reaches_goal() {
        let maze = Maze::cliff(4, 6).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let mut table = QTable::for_maze(&maze, &mut rng);
        let cfg = QLearningConfig {
            episodes: 500,
            report_every: None,
            ..QLearningConfig::default()
        };
        let stats = train(&maze, &mut table, &cfg, &mut rng).unwrap();
        assert_eq!(stats.len(), 500);

        let first_move = table.greedy_action(maze.start());
        let landed = maze.neighbor(maze.start(), first_move);
        assert_ne!(landed.and_then(|p| maze.cell(p)), Some(Cell::Pit));

        let path = greedy_rollout(&maze, &table, 100).unwrap();
        assert_eq!(path.last(), Some(&maze.goal()));
        assert!(path.iter().all(|&p| maze.cell(p) != Some(Cell::Pit)));
        // Up, five steps right, down.
        assert_eq!(path.len(), 8);
    }
}
