//! Grid maze environment.
//!
//! The agent moves one cell per step. Bumping into the outer wall leaves it in
//! place; stepping onto a pit sends it back to the start cell.

use std::fmt;

use crate::{Error, Result};

/// Penalty for trying to leave the grid.
pub const WALL_REWARD: f64 = -100.0;
/// Penalty for landing on a pit.
pub const PIT_REWARD: f64 = -100.0;
/// Reward for reaching the goal.
pub const GOAL_REWARD: f64 = 1_000.0;
/// Charged on every step.
pub const STEP_REWARD: f64 = -1.0;

/// `(row, col)`; row 0 is the top of the grid.
pub type Pos = (usize, usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Way,
    Start,
    Goal,
    Pit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Up,
    Right,
    Down,
    Left,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Up, Action::Right, Action::Down, Action::Left];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn from_index(idx: usize) -> Option<Action> {
        Self::ALL.get(idx).copied()
    }

    pub fn arrow(self) -> char {
        match self {
            Action::Up => '↑',
            Action::Right => '→',
            Action::Down => '↓',
            Action::Left => '←',
        }
    }
}

/// Outcome of one move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// Cell the move lands on, before any pit reset. Used for bootstrapping.
    pub landed: Pos,
    /// Where the agent actually is after the move (start cell after a pit).
    pub next: Pos,
    pub reward: f64,
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Maze {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    start: Pos,
    goal: Pos,
}

impl Maze {
    /// Open grid with the given start and goal cells and no pits.
    pub fn new(rows: usize, cols: usize, start: Pos, goal: Pos) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidArgument(format!(
                "maze must be at least 1x1, got {rows}x{cols}"
            )));
        }
        for (name, (r, c)) in [("start", start), ("goal", goal)] {
            if r >= rows || c >= cols {
                return Err(Error::InvalidArgument(format!(
                    "{name} ({r}, {c}) is outside a {rows}x{cols} maze"
                )));
            }
        }
        if start == goal {
            return Err(Error::InvalidArgument(
                "start and goal must be different cells".to_owned(),
            ));
        }

        let mut cells = vec![Cell::Way; rows * cols];
        cells[start.0 * cols + start.1] = Cell::Start;
        cells[goal.0 * cols + goal.1] = Cell::Goal;
        Ok(Self {
            rows,
            cols,
            cells,
            start,
            goal,
        })
    }

    /// The cliff layout: start bottom-left, goal bottom-right, pits in between.
    pub fn cliff(rows: usize, cols: usize) -> Result<Self> {
        if rows < 2 || cols < 3 {
            return Err(Error::InvalidArgument(format!(
                "a cliff maze needs at least 2x3 cells, got {rows}x{cols}"
            )));
        }
        let bottom = rows - 1;
        let mut maze = Self::new(rows, cols, (bottom, 0), (bottom, cols - 1))?;
        for col in 1..cols - 1 {
            maze.set_pit((bottom, col))?;
        }
        Ok(maze)
    }

    pub fn set_pit(&mut self, pos: Pos) -> Result<()> {
        match self.cell(pos) {
            Some(Cell::Way | Cell::Pit) => {
                self.cells[pos.0 * self.cols + pos.1] = Cell::Pit;
                Ok(())
            }
            Some(cell) => Err(Error::InvalidArgument(format!(
                "cannot place a pit on the {cell:?} cell at {pos:?}"
            ))),
            None => Err(Error::InvalidArgument(format!(
                "pit {pos:?} is outside the maze"
            ))),
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn start(&self) -> Pos {
        self.start
    }

    #[inline]
    pub fn goal(&self) -> Pos {
        self.goal
    }

    pub fn cell(&self, (row, col): Pos) -> Option<Cell> {
        if row < self.rows && col < self.cols {
            Some(self.cells[row * self.cols + col])
        } else {
            None
        }
    }

    /// Neighbouring cell in direction `action`, or `None` at the wall.
    pub fn neighbor(&self, (row, col): Pos, action: Action) -> Option<Pos> {
        match action {
            Action::Up => row.checked_sub(1).map(|r| (r, col)),
            Action::Right => (col + 1 < self.cols).then_some((row, col + 1)),
            Action::Down => (row + 1 < self.rows).then_some((row + 1, col)),
            Action::Left => col.checked_sub(1).map(|c| (row, c)),
        }
    }

    /// Apply `action` at `pos`.
    pub fn step(&self, pos: Pos, action: Action) -> Transition {
        let mut reward = STEP_REWARD;
        let landed = match self.neighbor(pos, action) {
            Some(p) => p,
            None => {
                reward += WALL_REWARD;
                pos
            }
        };

        let (next, done) = match self.cell(landed) {
            Some(Cell::Pit) => {
                reward += PIT_REWARD;
                (self.start, false)
            }
            Some(Cell::Goal) => {
                reward += GOAL_REWARD;
                (landed, true)
            }
            _ => (landed, false),
        };

        Transition {
            landed,
            next,
            reward,
            done,
        }
    }
}

impl fmt::Display for Maze {
    /// One row per line: `0` way, `1` start, `2` goal, `3` pit.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.cols) {
            for cell in row {
                let code = match cell {
                    Cell::Way => 0,
                    Cell::Start => 1,
                    Cell::Goal => 2,
                    Cell::Pit => 3,
                };
                write!(f, "{code} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
