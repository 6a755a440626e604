use std::time::Duration;

use crate::units::{ColumnsCount, RowsCount, StepInterval};

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum Algorithm {
    Backtrack,
    Kruskal,
    Prim,
}

/// What the driver should do with a new maze.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum Mode {
    Animate,
    Generate,
    Solve,
}

/// Immutable configuration for building a `Grid`.
///
/// Dimensions are not validated here, `Grid::new` rejects a grid with no cells.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct MazeOptions {
    rows: usize,
    columns: usize,
    step_interval: StepInterval,
    algorithm: Algorithm,
    mode: Mode,
    seed: Option<u64>,
}

impl MazeOptions {
    #[inline]
    pub fn rows(&self) -> RowsCount {
        RowsCount(self.rows)
    }

    #[inline]
    pub fn columns(&self) -> ColumnsCount {
        ColumnsCount(self.columns)
    }

    #[inline]
    pub fn step_interval(&self) -> StepInterval {
        self.step_interval
    }

    pub fn step_duration(&self) -> Duration {
        Duration::from_millis(self.step_interval.0)
    }

    #[inline]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Seed for the grid's random number source. None seeds from entropy.
    #[inline]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl Default for MazeOptions {
    fn default() -> MazeOptions {
        MazeOptions {
            rows: 12,
            columns: 10,
            step_interval: StepInterval(100),
            algorithm: Algorithm::Backtrack,
            mode: Mode::Animate,
            seed: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MazeOptionsBuilder {
    options: MazeOptions,
}

impl MazeOptionsBuilder {
    pub fn new() -> MazeOptionsBuilder {
        MazeOptionsBuilder { options: MazeOptions::default() }
    }
    pub fn rows(mut self, rows: usize) -> MazeOptionsBuilder {
        self.options.rows = rows;
        self
    }
    pub fn columns(mut self, columns: usize) -> MazeOptionsBuilder {
        self.options.columns = columns;
        self
    }
    pub fn step_interval(mut self, millis: u64) -> MazeOptionsBuilder {
        self.options.step_interval = StepInterval(millis);
        self
    }
    pub fn algorithm(mut self, algorithm: Algorithm) -> MazeOptionsBuilder {
        self.options.algorithm = algorithm;
        self
    }
    pub fn mode(mut self, mode: Mode) -> MazeOptionsBuilder {
        self.options.mode = mode;
        self
    }
    pub fn seed(mut self, seed: Option<u64>) -> MazeOptionsBuilder {
        self.options.seed = seed;
        self
    }
    pub fn build(self) -> MazeOptions {
        self.options
    }
}

impl Default for MazeOptionsBuilder {
    fn default() -> MazeOptionsBuilder {
        MazeOptionsBuilder::new()
    }
}
