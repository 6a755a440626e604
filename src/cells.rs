use rand::seq::SliceRandom;
use rand::Rng;

use crate::units::ColumnsCount;

#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd)]
pub struct Coordinate {
    pub row: usize,
    pub column: usize,
}

impl Coordinate {
    pub fn new(row: usize, column: usize) -> Coordinate {
        Coordinate { row, column }
    }

    #[inline]
    pub fn from_row_major_index(index: usize, columns: ColumnsCount) -> Coordinate {
        let ColumnsCount(width) = columns;
        Coordinate::new(index / width, index % width)
    }

    /// The coordinate one cell away in the given direction.
    /// Returns None if the coordinate is not representable, e.g. above row zero.
    /// Whether the coordinate lies inside a particular grid is for the grid to decide.
    pub fn offset(self, direction: Direction) -> Option<Coordinate> {
        let Coordinate { row, column } = self;
        match direction {
            Direction::Top => {
                if row > 0 {
                    Some(Coordinate::new(row - 1, column))
                } else {
                    None
                }
            }
            Direction::Bottom => Some(Coordinate::new(row + 1, column)),
            Direction::Left => {
                if column > 0 {
                    Some(Coordinate::new(row, column - 1))
                } else {
                    None
                }
            }
            Direction::Right => Some(Coordinate::new(row, column + 1)),
            Direction::Centre => None,
        }
    }

    /// Which way to step from `self` to reach an adjacent `other`.
    /// `Direction::Centre` when the two are not orthogonally adjacent.
    pub fn direction_to(self, other: Coordinate) -> Direction {
        CARDINAL_DIRECTIONS
            .iter()
            .cloned()
            .find(|dir| self.offset(*dir) == Some(other))
            .unwrap_or(Direction::Centre)
    }
}

impl From<(usize, usize)> for Coordinate {
    fn from(row_column_pair: (usize, usize)) -> Coordinate {
        Coordinate::new(row_column_pair.0, row_column_pair.1)
    }
}

#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub enum Direction {
    Top,
    Bottom,
    Left,
    Right,

    /// Not a way out of a cell, e.g. the "direction" between two cells that do not touch.
    Centre,
}

pub const CARDINAL_DIRECTIONS: [Direction; 4] =
    [Direction::Top, Direction::Bottom, Direction::Left, Direction::Right];

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Top => Direction::Bottom,
            Direction::Bottom => Direction::Top,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Centre => Direction::Centre,
        }
    }

    /// The four cardinal directions in a uniformly random order.
    pub fn randomized<R: Rng + ?Sized>(rng: &mut R) -> [Direction; 4] {
        let mut dirs = CARDINAL_DIRECTIONS;
        dirs.shuffle(rng);
        dirs
    }

    #[inline]
    pub(crate) fn wall_slot(self) -> Option<usize> {
        match self {
            Direction::Top => Some(0),
            Direction::Bottom => Some(1),
            Direction::Left => Some(2),
            Direction::Right => Some(3),
            Direction::Centre => None,
        }
    }
}

/// Names one side of a boundary: the cell it is attached to and which way it faces.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub struct WallId {
    pub coordinate: Coordinate,
    pub direction: Direction,
}

impl WallId {
    pub fn new(coordinate: Coordinate, direction: Direction) -> WallId {
        WallId { coordinate, direction }
    }

    /// The cell on the far side of this wall, if representable.
    pub fn neighbour(&self) -> Option<Coordinate> {
        self.coordinate.offset(self.direction)
    }

    /// The same boundary as owned by the neighbouring cell.
    pub fn mirror(&self) -> Option<WallId> {
        self.neighbour()
            .map(|coord| WallId::new(coord, self.direction.opposite()))
    }
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct Wall {
    id: WallId,
    visible: bool,
    current: bool,
}

impl Wall {
    fn new(coordinate: Coordinate, direction: Direction) -> Wall {
        Wall {
            id: WallId::new(coordinate, direction),
            visible: true,
            current: false,
        }
    }

    #[inline]
    pub fn id(&self) -> WallId {
        self.id
    }

    #[inline]
    pub fn coordinate(&self) -> Coordinate {
        self.id.coordinate
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.id.direction
    }

    /// A visible wall blocks the passage, an invisible one is open.
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Is this the wall Kruskal's algorithm is looking at right now?
    #[inline]
    pub fn is_current(&self) -> bool {
        self.current
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub(crate) fn set_current(&mut self, current: bool) {
        self.current = current;
    }
}

#[derive(Eq, PartialEq, Clone, Debug)]
pub struct Cell {
    coordinate: Coordinate,
    walls: [Wall; 4],
    modifiable: bool,
    exploring: bool,
    backtracking: bool,
}

impl Cell {
    pub fn new(coordinate: Coordinate) -> Cell {
        Cell {
            coordinate,
            walls: [Wall::new(coordinate, Direction::Top),
                    Wall::new(coordinate, Direction::Bottom),
                    Wall::new(coordinate, Direction::Left),
                    Wall::new(coordinate, Direction::Right)],
            modifiable: true,
            exploring: false,
            backtracking: false,
        }
    }

    #[inline]
    pub fn coordinate(&self) -> Coordinate {
        self.coordinate
    }

    #[inline]
    pub fn row(&self) -> usize {
        self.coordinate.row
    }

    #[inline]
    pub fn column(&self) -> usize {
        self.coordinate.column
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn wall(&self, direction: Direction) -> Option<&Wall> {
        direction.wall_slot().map(|slot| &self.walls[slot])
    }

    pub(crate) fn wall_mut(&mut self, direction: Direction) -> Option<&mut Wall> {
        match direction.wall_slot() {
            Some(slot) => Some(&mut self.walls[slot]),
            None => None,
        }
    }

    /// Is the way out of this cell in `direction` blocked?
    /// There is never a way out towards `Direction::Centre`.
    pub fn has_wall(&self, direction: Direction) -> bool {
        self.wall(direction).map_or(true, Wall::is_visible)
    }

    /// The highlighted wall of this cell, if any.
    pub fn current_wall(&self) -> Option<&Wall> {
        self.walls.iter().find(|wall| wall.is_current())
    }

    /// True until the cell has been incorporated into the maze.
    #[inline]
    pub fn is_modifiable(&self) -> bool {
        self.modifiable
    }

    #[inline]
    pub fn is_exploring(&self) -> bool {
        self.exploring
    }

    #[inline]
    pub fn is_backtracking(&self) -> bool {
        self.backtracking
    }

    pub(crate) fn set_modifiable(&mut self, modifiable: bool) {
        self.modifiable = modifiable;
    }

    pub(crate) fn set_exploring(&mut self, exploring: bool) {
        self.exploring = exploring;
    }

    pub(crate) fn set_backtracking(&mut self, backtracking: bool) {
        self.backtracking = backtracking;
    }

    pub(crate) fn reset_visual_indicators(&mut self) {
        self.exploring = false;
        self.backtracking = false;
    }

    /// Back to the freshly constructed state: all walls up, not part of any maze.
    pub(crate) fn reset(&mut self) {
        for wall in self.walls.iter_mut() {
            wall.set_visible(true);
            wall.set_current(false);
        }
        self.modifiable = true;
        self.reset_visual_indicators();
    }
}
