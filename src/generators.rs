use bit_set::BitSet;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::cells::{Coordinate, Direction, Wall, WallId};
use crate::grid::Grid;
use crate::units::ColumnsCount;

/// Apply the recursive backtracker maze generation algorithm to a grid.
///
/// A random walk that carves a passage into any neighbour not yet in the maze, trying the
/// four directions in a fresh random order at every cell. When a cell has nowhere left to go
/// the walk backs up to the cell it came from and carries on from there.
/// The result is a maze with long twisty passages and few dead ends.
pub fn recursive_backtrack<R: Rng>(grid: &mut Grid, rng: &mut R) {
    let start = grid.random_cell(rng);
    carve_passages(grid, start, || Direction::randomized(rng));
}

struct CarveFrame {
    coord: Coordinate,
    directions: [Direction; 4],
    next: usize,
}

/// Depth first carve from `start`, asking `direction_order` for the order to try the
/// directions in each time a new cell is entered.
///
/// The walk keeps its own stack rather than recursing, a long passage on a large grid is as
/// deep as the grid has cells.
pub fn carve_passages<F>(grid: &mut Grid, start: Coordinate, mut direction_order: F)
    where F: FnMut() -> [Direction; 4]
{
    match grid.cell_mut(start) {
        Some(cell) => cell.set_modifiable(false),
        None => return,
    }

    let mut stack = vec![CarveFrame {
                             coord: start,
                             directions: direction_order(),
                             next: 0,
                         }];

    while let Some(frame) = stack.last_mut() {
        if frame.next == frame.directions.len() {
            stack.pop();
            continue;
        }
        let coord = frame.coord;
        let direction = frame.directions[frame.next];
        frame.next += 1;

        if let Some(adjacent) = grid.neighbour_at_direction(coord, direction) {
            if grid.is_modifiable(adjacent) {
                grid.remove_adjacent_walls(coord, adjacent);
                if let Some(cell) = grid.cell_mut(adjacent) {
                    cell.set_modifiable(false);
                }
                stack.push(CarveFrame {
                    coord: adjacent,
                    directions: direction_order(),
                    next: 0,
                });
            }
        }
    }
}

/// Apply Kruskal's algorithm to a grid.
///
/// Every inner wall goes into a shuffled worklist. Taking walls one at a time, a wall is knocked
/// down if the cells either side of it are not yet connected by some other route, which keeps
/// the maze free of loops. The disjoint set forest on the grid answers the "already connected"
/// question.
pub fn kruskal<R: Rng>(grid: &mut Grid, rng: &mut R) {
    let mut walls = randomized_inner_walls(grid, rng);
    while kruskal_step(grid, &mut walls).is_some() {}
}

/// Kruskal's pending walls.
///
/// Walls are taken from the end of a vector. A table indexed by `cell index * 4 + wall slot`
/// records where each wall sits in the vector, so any wall can be looked up or removed in
/// constant time.
#[derive(Debug, Clone)]
pub struct WallWorklist {
    walls: Vec<WallId>,
    positions: Vec<Option<usize>>,
    columns: usize,
}

impl WallWorklist {
    /// A worklist for `grid` holding `walls`, the last wall is taken first.
    /// Duplicates and walls outside the grid are dropped.
    pub fn new(grid: &Grid, walls: Vec<WallId>) -> WallWorklist {
        let ColumnsCount(columns) = grid.columns();
        let mut worklist = WallWorklist {
            walls: Vec::with_capacity(walls.len()),
            positions: vec![None; grid.size() * 4],
            columns,
        };
        for wall in walls {
            worklist.push(wall);
        }
        worklist
    }

    fn key(&self, wall: WallId) -> Option<usize> {
        let Coordinate { row, column } = wall.coordinate;
        if column >= self.columns {
            return None;
        }
        let slot = wall.direction.wall_slot()?;
        let key = (row * self.columns + column) * 4 + slot;
        if key < self.positions.len() {
            Some(key)
        } else {
            None
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.walls.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
    }

    pub fn contains(&self, wall: WallId) -> bool {
        self.key(wall).map_or(false, |key| self.positions[key].is_some())
    }

    /// Returns false if the wall is already queued or does not belong to the grid.
    pub fn push(&mut self, wall: WallId) -> bool {
        match self.key(wall) {
            Some(key) if self.positions[key].is_none() => {
                self.positions[key] = Some(self.walls.len());
                self.walls.push(wall);
                true
            }
            _ => false,
        }
    }

    pub fn pop(&mut self) -> Option<WallId> {
        let wall = self.walls.pop()?;
        if let Some(key) = self.key(wall) {
            self.positions[key] = None;
        }
        Some(wall)
    }

    /// Take a wall out of the worklist wherever it is. The last wall fills the gap.
    pub fn remove(&mut self, wall: WallId) -> bool {
        let position = match self.key(wall).and_then(|key| self.positions[key].take()) {
            Some(position) => position,
            None => return false,
        };
        self.walls.swap_remove(position);

        let moved = self.walls.get(position).cloned();
        if let Some(moved_key) = moved.and_then(|moved| self.key(moved)) {
            self.positions[moved_key] = Some(position);
        }
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = WallId> + '_ {
        self.walls.iter().cloned()
    }
}

/// Every wall that separates two cells of the grid, both sides of each boundary, in a random order.
/// The outer boundary of the grid is left out.
pub fn randomized_inner_walls<R: Rng>(grid: &Grid, rng: &mut R) -> WallWorklist {
    let mut walls = grid.cells()
        .iter()
        .flat_map(|cell| cell.walls().iter().map(Wall::id))
        .filter(|wall| {
            wall.neighbour()
                .map_or(false, |coord| grid.is_valid_coordinate(coord))
        })
        .collect::<Vec<_>>();
    walls.shuffle(rng);
    WallWorklist::new(grid, walls)
}

/// Take the next wall off the worklist and join the cells either side of it when they are not
/// already connected. The mirror of a wall that gets knocked down is no longer of interest and is
/// dropped from the worklist too.
///
/// Returns the wall taken, None if the worklist is empty.
pub fn kruskal_step(grid: &mut Grid, walls: &mut WallWorklist) -> Option<WallId> {
    let wall = walls.pop()?;

    if let Some(adjacent) = grid.neighbour_at_direction(wall.coordinate, wall.direction) {
        if !grid.is_connected(wall.coordinate, adjacent) {
            let connected = grid.connect(wall.coordinate, adjacent);
            debug_assert!(connected.is_ok(),
                          "{:?} and {:?} are not adjacent",
                          wall.coordinate,
                          adjacent);

            if let Some(mirror) = wall.mirror() {
                walls.remove(mirror);
            }
        }
    }

    Some(wall)
}

/// The cells bordering the region built so far by Prim's algorithm.
///
/// Kept as a vector for cheap random choice alongside a bit set for membership tests.
#[derive(Debug, Clone)]
pub struct Frontier {
    cells: Vec<usize>,
    members: BitSet,
}

impl Frontier {
    pub fn with_capacity(capacity: usize) -> Frontier {
        Frontier {
            cells: Vec::new(),
            members: BitSet::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn contains(&self, cell_index: usize) -> bool {
        self.members.contains(cell_index)
    }

    /// Returns false if the cell was already on the frontier.
    pub fn insert(&mut self, cell_index: usize) -> bool {
        if self.members.insert(cell_index) {
            self.cells.push(cell_index);
            true
        } else {
            false
        }
    }

    pub fn remove(&mut self, cell_index: usize) -> bool {
        if self.members.remove(cell_index) {
            if let Some(position) = self.cells.iter().position(|&c| c == cell_index) {
                self.cells.swap_remove(position);
            }
            true
        } else {
            false
        }
    }

    /// A uniformly random frontier cell index.
    pub fn random<R: Rng>(&self, rng: &mut R) -> Option<usize> {
        self.cells.choose(rng).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.cells.iter().cloned()
    }
}

/// Apply Prim's algorithm to a grid.
///
/// Grows the maze outward from one random cell. Each round a random cell bordering the maze is
/// joined to a random neighbour already in the maze, and its own unvisited neighbours join the
/// frontier. Gives a maze with lots of short dead ends radiating from the start.
pub fn prim<R: Rng>(grid: &mut Grid, rng: &mut R) {
    let mut frontier = prim_seed(grid, rng);
    while let Some(cell_index) = frontier.random(rng) {
        let coord = grid.coordinate_of(cell_index);
        prim_absorb(grid, rng, &mut frontier, coord);
    }
}

/// Put one random cell into the maze and return its neighbours as the initial frontier.
pub fn prim_seed<R: Rng>(grid: &mut Grid, rng: &mut R) -> Frontier {
    let start = grid.random_cell(rng);
    if let Some(cell) = grid.cell_mut(start) {
        cell.set_modifiable(false);
    }

    let mut frontier = Frontier::with_capacity(grid.size());
    for neighbour in grid.modifiable_neighbours(start) {
        add_to_frontier(grid, &mut frontier, neighbour);
    }
    frontier
}

/// Join a frontier cell to a random neighbour that is already part of the maze.
///
/// A cell with no such neighbour is left alone and stays on the frontier; returns whether the
/// cell was absorbed.
pub fn prim_absorb<R: Rng>(grid: &mut Grid,
                           rng: &mut R,
                           frontier: &mut Frontier,
                           coord: Coordinate)
                           -> bool {
    let joined = match grid.settled_neighbours(coord).choose(rng) {
        Some(settled) => *settled,
        None => return false,
    };

    for neighbour in grid.modifiable_neighbours(coord) {
        add_to_frontier(grid, frontier, neighbour);
    }
    grid.remove_adjacent_walls(coord, joined);
    if let Some(cell) = grid.cell_mut(coord) {
        cell.set_modifiable(false);
        cell.set_backtracking(false);
    }
    if let Some(index) = grid.index_of(coord) {
        frontier.remove(index);
    }
    true
}

fn add_to_frontier(grid: &mut Grid, frontier: &mut Frontier, coord: Coordinate) {
    if let Some(index) = grid.index_of(coord) {
        frontier.insert(index);
        grid.cell_at_mut(index).set_backtracking(true);
    }
}
