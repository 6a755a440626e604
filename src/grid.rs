use std::fmt;

use itertools::Itertools;
use petgraph::unionfind::UnionFind;
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;
use smallvec::SmallVec;
use tracing::debug;

use crate::animation::Animation;
use crate::cells::{Cell, Coordinate, Direction, WallId, CARDINAL_DIRECTIONS};
use crate::errors::*;
use crate::generators;
use crate::options::{Algorithm, MazeOptions};
use crate::pathing;
use crate::units::{ColumnsCount, RowsCount};

pub type CoordinateSmallVec = SmallVec<[Coordinate; 4]>;

// Looking only right and down from every cell visits each inner boundary once.
static FORWARD_DIRECTIONS: [Direction; 2] = [Direction::Right, Direction::Bottom];

/// A rectangular maze: the cells, their walls and the bookkeeping the generators share.
pub struct Grid {
    options: MazeOptions,
    rows: RowsCount,
    columns: ColumnsCount,
    cells: Vec<Cell>,
    connectivity: UnionFind<usize>,
    rng: XorShiftRng,
    steps_to_solution: usize,
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum PassageError {
    InvalidGridCoordinate,
    NotAdjacent,
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f,
               "Grid :: rows: {:?}, columns: {:?}, open passages: {:?}, algorithm: {:?}",
               self.rows,
               self.columns,
               self.open_passages_count(),
               self.options.algorithm())
    }
}

impl Grid {
    /// Build a grid of closed cells.
    ///
    /// Fails with `ErrorKind::InvalidDimensions` unless both dimensions are greater than zero.
    pub fn new(options: MazeOptions) -> Result<Grid> {
        let RowsCount(rows) = options.rows();
        let ColumnsCount(columns) = options.columns();
        if rows == 0 || columns == 0 {
            return Err(ErrorKind::InvalidDimensions(rows, columns).into());
        }

        let cells = (0..rows)
            .cartesian_product(0..columns)
            .map(|(row, column)| Cell::new(Coordinate::new(row, column)))
            .collect::<Vec<_>>();
        let rng = match options.seed() {
            Some(seed) => XorShiftRng::seed_from_u64(seed),
            None => XorShiftRng::from_entropy(),
        };
        debug!(rows, columns, algorithm = ?options.algorithm(), "grid constructed");

        Ok(Grid {
            options,
            rows: RowsCount(rows),
            columns: ColumnsCount(columns),
            connectivity: UnionFind::new(cells.len()),
            cells,
            rng,
            steps_to_solution: 0,
        })
    }

    #[inline]
    pub fn options(&self) -> &MazeOptions {
        &self.options
    }

    #[inline]
    pub fn rows(&self) -> RowsCount {
        self.rows
    }

    #[inline]
    pub fn columns(&self) -> ColumnsCount {
        self.columns
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// All cells in row-major order.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, coord: Coordinate) -> Option<&Cell> {
        self.index_of(coord).map(|index| &self.cells[index])
    }

    /// Number of cells on the path found by the last `solve`, 0 if none was found.
    #[inline]
    pub fn steps_to_solution(&self) -> usize {
        self.steps_to_solution
    }

    /// Convert a grid coordinate to a one dimensional index in the range 0..grid.size().
    /// Returns None if the grid coordinate is invalid.
    #[inline]
    pub fn index_of(&self, coord: Coordinate) -> Option<usize> {
        if self.is_valid_coordinate(coord) {
            Some(coord.row * self.columns.0 + coord.column)
        } else {
            None
        }
    }

    #[inline]
    pub fn coordinate_of(&self, index: usize) -> Coordinate {
        Coordinate::from_row_major_index(index, self.columns)
    }

    /// Is the grid coordinate within the grid's dimensions
    #[inline]
    pub fn is_valid_coordinate(&self, coord: Coordinate) -> bool {
        coord.row < self.rows.0 && coord.column < self.columns.0
    }

    pub fn iter(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.cells.iter().map(Cell::coordinate)
    }

    pub fn iter_row(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells.chunks(self.columns.0)
    }

    pub fn random_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Coordinate {
        let index = rng.gen_range(0..self.size());
        self.coordinate_of(index)
    }

    /// A generator for one run, derived from the grid's own source so seeded grids stay repeatable.
    pub(crate) fn fork_rng(&mut self) -> XorShiftRng {
        XorShiftRng::seed_from_u64(self.rng.gen())
    }

    pub fn neighbour_at_direction(&self,
                                  coord: Coordinate,
                                  direction: Direction)
                                  -> Option<Coordinate> {
        coord.offset(direction)
            .filter(|neighbour_coord| self.is_valid_coordinate(*neighbour_coord))
    }

    /// Cells to the Top, Bottom, Left or Right of a cell, but not necessarily linked by a passage.
    pub fn neighbours(&self, coord: Coordinate) -> CoordinateSmallVec {
        CARDINAL_DIRECTIONS.iter()
            .filter_map(|dir| self.neighbour_at_direction(coord, *dir))
            .collect()
    }

    /// Neighbours not yet incorporated into the maze.
    pub fn modifiable_neighbours(&self, coord: Coordinate) -> CoordinateSmallVec {
        self.neighbours(coord)
            .into_iter()
            .filter(|neighbour| self.is_modifiable(*neighbour))
            .collect()
    }

    /// Neighbours already incorporated into the maze.
    pub fn settled_neighbours(&self, coord: Coordinate) -> CoordinateSmallVec {
        self.neighbours(coord)
            .into_iter()
            .filter(|neighbour| !self.is_modifiable(*neighbour))
            .collect()
    }

    /// Neighbours reachable from a cell through an open passage.
    pub fn links(&self, coord: Coordinate) -> CoordinateSmallVec {
        self.neighbours(coord)
            .into_iter()
            .filter(|neighbour| self.is_linked(coord, *neighbour))
            .collect()
    }

    #[inline]
    pub fn is_modifiable(&self, coord: Coordinate) -> bool {
        self.cell(coord).map_or(false, Cell::is_modifiable)
    }

    /// Are two adjacent cells joined by a passage? Both sides of the boundary have to be open.
    pub fn is_linked(&self, a: Coordinate, b: Coordinate) -> bool {
        let direction = a.direction_to(b);
        match (self.cell(a), self.cell(b)) {
            (Some(cell_a), Some(cell_b)) => {
                direction != Direction::Centre && !cell_a.has_wall(direction) &&
                !cell_b.has_wall(direction.opposite())
            }
            _ => false,
        }
    }

    pub fn is_neighbour_linked(&self, coord: Coordinate, direction: Direction) -> bool {
        self.neighbour_at_direction(coord, direction)
            .map_or(false, |neighbour_coord| self.is_linked(coord, neighbour_coord))
    }

    /// Remove the walls between two adjacent cells, from both sides.
    pub fn open_passage(&mut self,
                        a: Coordinate,
                        b: Coordinate)
                        -> ::std::result::Result<(), PassageError> {
        self.set_adjacent_walls(a, b, false)
    }

    /// Put back the walls between two adjacent cells, on both sides.
    pub fn close_passage(&mut self,
                         a: Coordinate,
                         b: Coordinate)
                         -> ::std::result::Result<(), PassageError> {
        self.set_adjacent_walls(a, b, true)
    }

    /// Open the passage between two cells that are known to be adjacent and within the grid.
    pub(crate) fn remove_adjacent_walls(&mut self, a: Coordinate, b: Coordinate) {
        let opened = self.set_adjacent_walls(a, b, false);
        debug_assert!(opened.is_ok(), "{:?} and {:?} are not adjacent", a, b);
    }

    fn set_adjacent_walls(&mut self,
                          a: Coordinate,
                          b: Coordinate,
                          visible: bool)
                          -> ::std::result::Result<(), PassageError> {
        let (a_index, b_index) = match (self.index_of(a), self.index_of(b)) {
            (Some(a_index), Some(b_index)) => (a_index, b_index),
            _ => return Err(PassageError::InvalidGridCoordinate),
        };
        let direction = a.direction_to(b);
        if direction == Direction::Centre {
            return Err(PassageError::NotAdjacent);
        }

        for &(index, dir) in &[(a_index, direction), (b_index, direction.opposite())] {
            if let Some(wall) = self.cells[index].wall_mut(dir) {
                wall.set_visible(visible);
            }
        }
        Ok(())
    }

    /// Number of open passages, each boundary counted once.
    pub fn open_passages_count(&self) -> usize {
        self.passages().count()
    }

    /// Every open passage as a pair of cells, each boundary reported once.
    pub fn passages(&self) -> impl Iterator<Item = (Coordinate, Coordinate)> + '_ {
        self.iter()
            .cartesian_product(FORWARD_DIRECTIONS.iter())
            .filter_map(move |(coord, dir)| {
                self.neighbour_at_direction(coord, *dir)
                    .filter(|neighbour| self.is_linked(coord, *neighbour))
                    .map(|neighbour| (coord, neighbour))
            })
    }

    /// Do the two cells belong to the same connected region, as joined by `connect`?
    pub fn is_connected(&self, a: Coordinate, b: Coordinate) -> bool {
        match (self.index_of(a), self.index_of(b)) {
            (Some(a_index), Some(b_index)) => self.connectivity.equiv(a_index, b_index),
            _ => false,
        }
    }

    /// Join the regions of two adjacent cells: open the passage between them, mark both as part of
    /// the maze and union their connectivity roots.
    pub fn connect(&mut self,
                   a: Coordinate,
                   b: Coordinate)
                   -> ::std::result::Result<(), PassageError> {
        self.open_passage(a, b)?;
        for coord in &[a, b] {
            if let Some(cell) = self.cell_mut(*coord) {
                cell.set_modifiable(false);
            }
        }
        if let (Some(a_index), Some(b_index)) = (self.index_of(a), self.index_of(b)) {
            self.connectivity.union(a_index, b_index);
        }
        Ok(())
    }

    pub fn wall_is_current(&self, wall: WallId) -> bool {
        self.cell(wall.coordinate)
            .and_then(|cell| cell.wall(wall.direction))
            .map_or(false, |w| w.is_current())
    }

    pub(crate) fn set_wall_current(&mut self, wall: WallId, current: bool) {
        let target = self.cell_mut(wall.coordinate)
            .and_then(|cell| cell.wall_mut(wall.direction));
        if let Some(w) = target {
            w.set_current(current);
        }
    }

    pub(crate) fn cell_mut(&mut self, coord: Coordinate) -> Option<&mut Cell> {
        match self.index_of(coord) {
            Some(index) => Some(&mut self.cells[index]),
            None => None,
        }
    }

    #[inline]
    pub(crate) fn cell_at(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    #[inline]
    pub(crate) fn cell_at_mut(&mut self, index: usize) -> &mut Cell {
        &mut self.cells[index]
    }

    pub(crate) fn set_steps_to_solution(&mut self, steps: usize) {
        self.steps_to_solution = steps;
    }

    /// Clear the exploring and backtracking flags of every cell.
    pub fn reset_visual_indicators(&mut self) {
        for cell in self.cells.iter_mut() {
            cell.reset_visual_indicators();
        }
    }

    /// Return every cell to its freshly constructed state, ready for another run.
    /// The random source keeps going, so the next maze differs from the last one.
    pub fn reset(&mut self) {
        for cell in self.cells.iter_mut() {
            cell.reset();
        }
        self.connectivity = UnionFind::new(self.cells.len());
        self.steps_to_solution = 0;
    }

    /// Run the configured algorithm to completion on a freshly reset grid.
    pub fn generate(&mut self) {
        self.reset();
        let mut rng = self.fork_rng();
        let algorithm = self.options.algorithm();
        debug!(?algorithm, "generating maze");
        match algorithm {
            Algorithm::Backtrack => generators::recursive_backtrack(self, &mut rng),
            Algorithm::Kruskal => generators::kruskal(self, &mut rng),
            Algorithm::Prim => generators::prim(self, &mut rng),
        }
        debug!(passages = self.open_passages_count(), "maze generated");
    }

    /// Start a stepwise run of the configured algorithm on a freshly reset grid.
    /// Each item pulled from the returned iterator is one change to the maze.
    pub fn animate(&mut self) -> Animation<'_> {
        self.reset();
        Animation::new(self)
    }

    /// Find the path from the top left cell to the bottom right cell.
    /// Returns the number of cells on the path, or 0 if there is no path.
    pub fn solve(&mut self) -> usize {
        pathing::solve(self)
    }
}

#[cfg(test)]
mod tests {

    use itertools::Itertools;

    use super::*;
    use crate::options::MazeOptionsBuilder;

    fn small_grid(rows: usize, columns: usize) -> Grid {
        Grid::new(MazeOptionsBuilder::new().rows(rows).columns(columns).seed(Some(1)).build())
            .expect("grid dimensions are valid")
    }

    fn gc(row: usize, column: usize) -> Coordinate {
        Coordinate::new(row, column)
    }

    #[test]
    fn invalid_dimensions() {
        for &(rows, columns) in &[(0, 0), (0, 5), (5, 0)] {
            let result = Grid::new(MazeOptionsBuilder::new().rows(rows).columns(columns).build());
            match result {
                Err(Error(ErrorKind::InvalidDimensions(r, c), _)) => {
                    assert_eq!((r, c), (rows, columns));
                }
                other => panic!("expected invalid dimensions, got {:?}", other),
            }
        }
    }

    #[test]
    fn grid_size() {
        let g = small_grid(6, 5);
        assert_eq!(g.size(), 30);
        assert_eq!(g.rows(), RowsCount(6));
        assert_eq!(g.columns(), ColumnsCount(5));
        assert_eq!(g.cells().len(), 30);
    }

    #[test]
    fn new_grid_is_closed() {
        let g = small_grid(3, 4);
        assert_eq!(g.open_passages_count(), 0);
        assert!(g.cells().iter().all(|cell| cell.is_modifiable()));
        assert!(g.cells().iter().all(|cell| cell.walls().iter().all(|w| w.is_visible())));
        assert_eq!(g.steps_to_solution(), 0);
    }

    #[test]
    fn cells_are_row_major() {
        let g = small_grid(2, 3);
        assert_eq!(g.iter().collect::<Vec<_>>(),
                   vec![gc(0, 0), gc(0, 1), gc(0, 2), gc(1, 0), gc(1, 1), gc(1, 2)]);
        for (index, coord) in g.iter().enumerate() {
            assert_eq!(g.index_of(coord), Some(index));
            assert_eq!(g.coordinate_of(index), coord);
        }
        assert_eq!(g.index_of(gc(2, 0)), None);
        assert_eq!(g.index_of(gc(0, 3)), None);
        assert_eq!(g.iter_row().count(), 2);
        assert!(g.iter_row().all(|row| row.len() == 3));
    }

    #[test]
    fn neighbour_cells() {
        let g = small_grid(10, 10);

        let check_expected_neighbours = |coord, expected_neighbours: &[Coordinate]| {
            let neighbours: Vec<Coordinate> =
                g.neighbours(coord).iter().cloned().sorted().collect();
            let expected: Vec<Coordinate> = expected_neighbours.iter().cloned().sorted().collect();
            assert_eq!(neighbours, expected);
        };

        // corners
        check_expected_neighbours(gc(0, 0), &[gc(1, 0), gc(0, 1)]);
        check_expected_neighbours(gc(9, 0), &[gc(8, 0), gc(9, 1)]);
        check_expected_neighbours(gc(0, 9), &[gc(0, 8), gc(1, 9)]);
        check_expected_neighbours(gc(9, 9), &[gc(9, 8), gc(8, 9)]);

        // side element examples
        check_expected_neighbours(gc(1, 0), &[gc(0, 0), gc(1, 1), gc(2, 0)]);
        check_expected_neighbours(gc(0, 1), &[gc(0, 0), gc(0, 2), gc(1, 1)]);

        // Some place with 4 neighbours inside the grid
        check_expected_neighbours(gc(1, 1), &[gc(0, 1), gc(1, 0), gc(2, 1), gc(1, 2)]);
    }

    #[test]
    fn neighbour_at_dir() {
        let g = small_grid(2, 2);
        let check_neighbour = |coord, dir: Direction, expected| {
            assert_eq!(g.neighbour_at_direction(coord, dir), expected);
        };
        check_neighbour(gc(0, 0), Direction::Top, None);
        check_neighbour(gc(0, 0), Direction::Bottom, Some(gc(1, 0)));
        check_neighbour(gc(0, 0), Direction::Right, Some(gc(0, 1)));
        check_neighbour(gc(0, 0), Direction::Left, None);
        check_neighbour(gc(0, 0), Direction::Centre, None);

        check_neighbour(gc(1, 1), Direction::Top, Some(gc(0, 1)));
        check_neighbour(gc(1, 1), Direction::Bottom, None);
        check_neighbour(gc(1, 1), Direction::Right, None);
        check_neighbour(gc(1, 1), Direction::Left, Some(gc(1, 0)));
    }

    #[test]
    fn opening_passages_is_symmetric() {
        let mut g = small_grid(4, 4);
        let a = gc(1, 0);
        let b = gc(2, 0);
        let c = gc(2, 1);

        assert!(!g.is_linked(a, b) && !g.is_linked(b, a));
        g.open_passage(a, b).expect("open failed");
        assert!(g.is_linked(a, b) && g.is_linked(b, a));
        assert!(!g.cell(a).unwrap().has_wall(Direction::Bottom));
        assert!(!g.cell(b).unwrap().has_wall(Direction::Top));
        assert!(g.is_neighbour_linked(a, Direction::Bottom));
        assert!(g.is_neighbour_linked(b, Direction::Top));

        g.open_passage(c, b).expect("open failed");
        assert_eq!(g.links(b).iter().cloned().sorted().collect::<Vec<_>>(), vec![a, c]);
        assert_eq!(g.open_passages_count(), 2);
        assert!(!g.is_linked(a, c));

        g.close_passage(b, a).expect("close failed");
        assert!(!g.is_linked(a, b) && !g.is_linked(b, a));
        assert!(g.cell(a).unwrap().has_wall(Direction::Bottom));
        assert!(g.cell(b).unwrap().has_wall(Direction::Top));
        assert_eq!(g.passages().collect::<Vec<_>>(), vec![(b, c)]);
    }

    #[test]
    fn no_passages_to_invalid_or_distant_cells() {
        let mut g = small_grid(4, 4);
        assert_eq!(g.open_passage(gc(0, 0), gc(0, 0)), Err(PassageError::NotAdjacent));
        assert_eq!(g.open_passage(gc(0, 0), gc(1, 1)), Err(PassageError::NotAdjacent));
        assert_eq!(g.open_passage(gc(0, 0), gc(0, 2)), Err(PassageError::NotAdjacent));
        assert_eq!(g.open_passage(gc(3, 3), gc(3, 4)), Err(PassageError::InvalidGridCoordinate));
        assert_eq!(g.open_passages_count(), 0);
    }

    #[test]
    fn connecting_cells() {
        let mut g = small_grid(3, 3);
        let (a, b, c) = (gc(0, 0), gc(0, 1), gc(1, 1));
        assert!(g.is_connected(a, a));
        assert!(!g.is_connected(a, b));

        g.connect(a, b).expect("connect failed");
        assert!(g.is_connected(a, b) && g.is_connected(b, a));
        assert!(g.is_linked(a, b));
        assert!(!g.is_modifiable(a) && !g.is_modifiable(b));
        assert!(!g.is_connected(a, c));

        g.connect(c, b).expect("connect failed");
        assert!(g.is_connected(a, c));
        assert_eq!(g.connect(a, c), Err(PassageError::NotAdjacent));
        assert!(!g.is_connected(a, gc(5, 5)));
    }

    #[test]
    fn modifiable_and_settled_neighbours() {
        let mut g = small_grid(3, 3);
        g.connect(gc(0, 1), gc(1, 1)).expect("connect failed");
        assert_eq!(g.settled_neighbours(gc(0, 0)).to_vec(), vec![gc(0, 1)]);
        assert_eq!(g.modifiable_neighbours(gc(0, 0)).to_vec(), vec![gc(1, 0)]);
        assert_eq!(g.settled_neighbours(gc(1, 0)).to_vec(), vec![gc(1, 1)]);
    }

    #[test]
    fn current_wall_flag() {
        let mut g = small_grid(2, 2);
        let wall = WallId::new(gc(0, 0), Direction::Right);
        assert!(!g.wall_is_current(wall));
        g.set_wall_current(wall, true);
        assert!(g.wall_is_current(wall));
        assert!(!g.wall_is_current(wall.mirror().unwrap()));
        g.set_wall_current(wall, false);
        assert!(!g.wall_is_current(wall));
    }

    #[test]
    fn reset_restores_a_closed_grid() {
        let mut g = small_grid(5, 5);
        g.generate();
        assert_eq!(g.open_passages_count(), 24);
        g.solve();
        assert!(g.steps_to_solution() > 0);

        g.reset();
        assert_eq!(g.open_passages_count(), 0);
        assert_eq!(g.steps_to_solution(), 0);
        assert!(g.cells().iter().all(|cell| cell.is_modifiable() && !cell.is_exploring()));
        assert!(!g.is_connected(gc(0, 0), gc(0, 1)));
    }

    #[test]
    fn random_cell_within_grid() {
        let g = small_grid(4, 7);
        let mut rng = XorShiftRng::seed_from_u64(3);
        for _ in 0..1000 {
            assert!(g.is_valid_coordinate(g.random_cell(&mut rng)));
        }
    }
}
