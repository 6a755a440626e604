//! Stepwise maze generation for drivers that want to show the maze being built.
//!
//! An `Animation` borrows the grid for the length of one run and owns whatever the chosen
//! algorithm needs to remember between steps. Pulling an item makes exactly one change to the
//! maze and reports how much work is left; pacing is left to the caller.

use std::iter::FusedIterator;

use rand::seq::SliceRandom;
use rand_xorshift::XorShiftRng;
use tracing::{debug, trace};

use crate::cells::{Cell, Coordinate, WallId};
use crate::generators::{self, Frontier, WallWorklist};
use crate::grid::Grid;
use crate::options::Algorithm;

pub struct Animation<'g> {
    grid: &'g mut Grid,
    rng: XorShiftRng,
    session: Session,
    steps: usize,
    finished: bool,
}

enum Session {
    Backtrack(BacktrackSession),
    Kruskal(KruskalSession),
    Prim(PrimSession),
}

impl<'g> Animation<'g> {
    pub(crate) fn new(grid: &'g mut Grid) -> Animation<'g> {
        let mut rng = grid.fork_rng();
        let algorithm = grid.options().algorithm();
        let session = match algorithm {
            Algorithm::Backtrack => Session::Backtrack(BacktrackSession::start(grid, &mut rng)),
            Algorithm::Kruskal => Session::Kruskal(KruskalSession::start(grid, &mut rng)),
            Algorithm::Prim => Session::Prim(PrimSession::start(grid, &mut rng)),
        };
        debug!(?algorithm, remaining = session.remaining(), "animation started");

        Animation {
            grid,
            rng,
            session,
            steps: 0,
            finished: false,
        }
    }

    /// The grid being animated, for rendering between steps.
    #[inline]
    pub fn grid(&self) -> &Grid {
        &*self.grid
    }

    /// Work left before the maze is complete: unvisited cells, unprocessed walls or frontier
    /// cells depending upon the algorithm.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.session.remaining()
    }

    /// Number of steps taken so far.
    #[inline]
    pub fn steps(&self) -> usize {
        self.steps
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn finish(&mut self) {
        self.session.finish(self.grid);
        self.finished = true;
        debug!(steps = self.steps,
               passages = self.grid.open_passages_count(),
               "animation finished");
    }
}

impl<'g> Iterator for Animation<'g> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.finished {
            return None;
        }
        if self.session.remaining() == 0 {
            // Nothing to do at all, e.g. a single cell grid.
            self.finish();
            return None;
        }

        let remaining = self.session.step(self.grid, &mut self.rng);
        self.steps += 1;
        trace!(step = self.steps, remaining, "animation step");

        if remaining == 0 {
            self.finish();
        }
        Some(remaining)
    }
}

impl<'g> FusedIterator for Animation<'g> {}

impl Session {
    fn remaining(&self) -> usize {
        match *self {
            Session::Backtrack(ref s) => s.unvisited,
            Session::Kruskal(ref s) => s.walls.len(),
            Session::Prim(ref s) => s.frontier.len(),
        }
    }

    fn step(&mut self, grid: &mut Grid, rng: &mut XorShiftRng) -> usize {
        match *self {
            Session::Backtrack(ref mut s) => s.step(grid, rng),
            Session::Kruskal(ref mut s) => s.step(grid),
            Session::Prim(ref mut s) => s.step(grid, rng),
        }
    }

    fn finish(&mut self, grid: &mut Grid) {
        match *self {
            Session::Backtrack(ref mut s) => s.finish(grid),
            Session::Kruskal(ref mut s) => s.finish(grid),
            Session::Prim(ref mut s) => s.finish(grid),
        }
    }
}

struct BacktrackSession {
    cursor: Coordinate,
    stack: Vec<Coordinate>,
    unvisited: usize,
}

impl BacktrackSession {
    fn start(grid: &mut Grid, rng: &mut XorShiftRng) -> BacktrackSession {
        let cursor = grid.random_cell(rng);
        if let Some(cell) = grid.cell_mut(cursor) {
            cell.set_modifiable(false);
        }
        BacktrackSession {
            cursor,
            stack: Vec::new(),
            unvisited: grid.size() - 1,
        }
    }

    fn step(&mut self, grid: &mut Grid, rng: &mut XorShiftRng) -> usize {
        let next = grid.modifiable_neighbours(self.cursor).choose(rng).cloned();

        if let Some(next) = next {
            self.stack.push(self.cursor);
            grid.remove_adjacent_walls(self.cursor, next);
            self.move_cursor(grid, next);
            self.visit_cursor(grid);
        } else if let Some(previous) = self.stack.pop() {
            self.move_cursor(grid, previous);
            if let Some(cell) = grid.cell_mut(self.cursor) {
                cell.set_backtracking(true);
            }
        } else {
            // The walk ran out of places to go with unvisited cells left over, start afresh.
            let unvisited = grid.cells()
                .iter()
                .filter(|cell| cell.is_modifiable())
                .map(Cell::coordinate)
                .collect::<Vec<_>>();
            if let Some(&restart) = unvisited.choose(rng) {
                self.move_cursor(grid, restart);
                self.visit_cursor(grid);
            }
        }

        self.unvisited
    }

    fn move_cursor(&mut self, grid: &mut Grid, to: Coordinate) {
        if let Some(cell) = grid.cell_mut(self.cursor) {
            cell.reset_visual_indicators();
        }
        self.cursor = to;
    }

    fn visit_cursor(&mut self, grid: &mut Grid) {
        if let Some(cell) = grid.cell_mut(self.cursor) {
            cell.set_modifiable(false);
            cell.set_exploring(true);
        }
        self.unvisited -= 1;
    }

    fn finish(&mut self, grid: &mut Grid) {
        if let Some(cell) = grid.cell_mut(self.cursor) {
            cell.reset_visual_indicators();
        }
    }
}

struct KruskalSession {
    walls: WallWorklist,
    current: Option<WallId>,
}

impl KruskalSession {
    fn start(grid: &mut Grid, rng: &mut XorShiftRng) -> KruskalSession {
        KruskalSession {
            walls: generators::randomized_inner_walls(grid, rng),
            current: None,
        }
    }

    fn step(&mut self, grid: &mut Grid) -> usize {
        self.clear_current(grid);
        if let Some(wall) = generators::kruskal_step(grid, &mut self.walls) {
            grid.set_wall_current(wall, true);
            self.current = Some(wall);
        }
        self.walls.len()
    }

    fn clear_current(&mut self, grid: &mut Grid) {
        if let Some(previous) = self.current.take() {
            grid.set_wall_current(previous, false);
        }
    }

    fn finish(&mut self, grid: &mut Grid) {
        self.clear_current(grid);
    }
}

struct PrimSession {
    frontier: Frontier,
    current: Option<Coordinate>,
}

impl PrimSession {
    fn start(grid: &mut Grid, rng: &mut XorShiftRng) -> PrimSession {
        PrimSession {
            frontier: generators::prim_seed(grid, rng),
            current: None,
        }
    }

    fn step(&mut self, grid: &mut Grid, rng: &mut XorShiftRng) -> usize {
        self.clear_current(grid);
        if let Some(cell_index) = self.frontier.random(rng) {
            let coord = grid.coordinate_of(cell_index);
            grid.cell_at_mut(cell_index).set_exploring(true);
            self.current = Some(coord);
            generators::prim_absorb(grid, rng, &mut self.frontier, coord);
        }
        self.frontier.len()
    }

    fn clear_current(&mut self, grid: &mut Grid) {
        if let Some(previous) = self.current.take() {
            if let Some(cell) = grid.cell_mut(previous) {
                cell.set_exploring(false);
            }
        }
    }

    fn finish(&mut self, grid: &mut Grid) {
        self.clear_current(grid);
    }
}

#[cfg(test)]
mod tests {

    use rand::SeedableRng;

    use super::*;
    use crate::options::MazeOptionsBuilder;

    fn seeded_grid(rows: usize, columns: usize, algorithm: Algorithm, seed: u64) -> Grid {
        Grid::new(MazeOptionsBuilder::new()
                      .rows(rows)
                      .columns(columns)
                      .algorithm(algorithm)
                      .seed(Some(seed))
                      .build())
            .expect("grid dimensions are valid")
    }

    fn walls_are_symmetric(grid: &Grid) -> bool {
        grid.iter().all(|coord| {
            grid.neighbours(coord).iter().all(|&neighbour| {
                let dir = coord.direction_to(neighbour);
                grid.cell(coord).unwrap().has_wall(dir) ==
                grid.cell(neighbour).unwrap().has_wall(dir.opposite())
            })
        })
    }

    fn current_walls_count(grid: &Grid) -> usize {
        grid.cells().iter().flat_map(|cell| cell.walls().iter()).filter(|w| w.is_current()).count()
    }

    #[test]
    fn animation_ends_with_zero_remaining() {
        for algorithm in &[Algorithm::Backtrack, Algorithm::Kruskal, Algorithm::Prim] {
            let mut g = seeded_grid(6, 5, *algorithm, 11);
            let counts = g.animate().collect::<Vec<_>>();
            assert_eq!(counts.last(), Some(&0), "{:?}", algorithm);
            assert!(counts[..counts.len() - 1].iter().all(|&c| c > 0));
            assert_eq!(g.open_passages_count(), 29);
        }
    }

    #[test]
    fn animation_is_fused() {
        let mut g = seeded_grid(3, 3, Algorithm::Prim, 4);
        let mut animation = g.animate();
        while animation.next().is_some() {}
        assert!(animation.is_finished());
        assert_eq!(animation.remaining(), 0);
        for _ in 0..5 {
            assert_eq!(animation.next(), None);
        }
    }

    #[test]
    fn single_cell_animation_has_no_steps() {
        for algorithm in &[Algorithm::Backtrack, Algorithm::Kruskal, Algorithm::Prim] {
            let mut g = seeded_grid(1, 1, *algorithm, 0);
            let mut animation = g.animate();
            assert_eq!(animation.next(), None);
            assert!(animation.is_finished());
            assert_eq!(animation.steps(), 0);
            assert_eq!(g.open_passages_count(), 0);
        }
    }

    #[test]
    fn backtrack_steps_keep_walls_symmetric_and_one_cursor() {
        let mut g = seeded_grid(7, 6, Algorithm::Backtrack, 8);
        let mut animation = g.animate();
        let mut previous = animation.remaining();
        assert_eq!(previous, 41);
        while let Some(remaining) = animation.next() {
            // Either a new cell is visited or the walk backs up.
            assert!(remaining == previous || remaining + 1 == previous);
            previous = remaining;
            assert!(walls_are_symmetric(animation.grid()));
            let highlighted = animation.grid()
                .cells()
                .iter()
                .filter(|cell| cell.is_exploring() || cell.is_backtracking())
                .count();
            if remaining > 0 {
                assert_eq!(highlighted, 1);
            }
        }
        assert!(g.cells().iter().all(|cell| !cell.is_exploring() && !cell.is_backtracking()));
        assert!(g.cells().iter().all(|cell| !cell.is_modifiable()));
    }

    #[test]
    fn kruskal_highlights_one_wall_at_a_time() {
        let mut g = seeded_grid(5, 5, Algorithm::Kruskal, 3);
        let mut animation = g.animate();
        assert_eq!(animation.remaining(), 80);
        let mut previous = animation.remaining();
        while let Some(remaining) = animation.next() {
            assert!(remaining < previous);
            previous = remaining;
            assert!(walls_are_symmetric(animation.grid()));
            if remaining > 0 {
                assert_eq!(current_walls_count(animation.grid()), 1);
            }
        }
        assert_eq!(current_walls_count(&g), 0);
        assert_eq!(g.open_passages_count(), 24);
    }

    #[test]
    fn kruskal_mirror_gone_after_each_step() {
        let mut g = seeded_grid(4, 6, Algorithm::Kruskal, 12);
        let mut animation = g.animate();
        while animation.next().is_some() {
            if let Session::Kruskal(ref session) = animation.session {
                if let Some(wall) = session.current {
                    let grid = animation.grid();
                    let opened = !grid.cell(wall.coordinate).unwrap().has_wall(wall.direction);
                    if opened {
                        assert!(!session.walls.contains(wall.mirror().unwrap()));
                    }
                }
            }
        }
    }

    #[test]
    fn prim_highlights_the_active_frontier_cell() {
        let mut g = seeded_grid(6, 6, Algorithm::Prim, 31);
        let mut animation = g.animate();
        while let Some(remaining) = animation.next() {
            let exploring = animation.grid().cells().iter().filter(|c| c.is_exploring()).count();
            if remaining > 0 {
                assert_eq!(exploring, 1);
            }
            assert!(walls_are_symmetric(animation.grid()));
        }
        assert!(g.cells().iter().all(|cell| !cell.is_exploring() && !cell.is_backtracking()));
        assert_eq!(g.open_passages_count(), 35);
    }

    #[test]
    fn prim_draw_without_a_settled_neighbour_is_a_wasted_step() {
        let mut g = seeded_grid(3, 3, Algorithm::Prim, 0);
        // The centre cell on its own, none of its neighbours are in the maze yet.
        let mut frontier = Frontier::with_capacity(g.size());
        frontier.insert(4);
        let mut animation = Animation {
            grid: &mut g,
            rng: XorShiftRng::seed_from_u64(0),
            session: Session::Prim(PrimSession {
                frontier,
                current: None,
            }),
            steps: 0,
            finished: false,
        };
        assert_eq!(animation.remaining(), 1);

        for step in 1..4 {
            assert_eq!(animation.next(), Some(1));
            assert_eq!(animation.steps(), step);
            assert!(!animation.is_finished());
            assert_eq!(animation.grid().open_passages_count(), 0);
            assert!(animation.grid().is_modifiable(Coordinate::new(1, 1)));
            assert!(animation.grid().cells()[4].is_exploring());
        }
    }

    #[test]
    fn same_seed_same_animation() {
        for algorithm in &[Algorithm::Backtrack, Algorithm::Kruskal, Algorithm::Prim] {
            let mut a = seeded_grid(9, 4, *algorithm, 77);
            let mut b = seeded_grid(9, 4, *algorithm, 77);
            assert_eq!(a.animate().collect::<Vec<_>>(), b.animate().collect::<Vec<_>>());
            assert_eq!(a.passages().collect::<Vec<_>>(), b.passages().collect::<Vec<_>>());
        }
    }

    #[test]
    fn animate_again_after_completion_starts_a_fresh_maze() {
        let mut g = seeded_grid(4, 4, Algorithm::Backtrack, 2);
        assert!(g.animate().count() > 0);
        assert_eq!(g.open_passages_count(), 15);
        assert!(g.animate().count() > 0);
        assert_eq!(g.open_passages_count(), 15);
        assert!(g.cells().iter().all(|cell| !cell.is_modifiable()));
        assert!(g.solve() > 0);
    }
}
