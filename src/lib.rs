//! **mazes** generates perfect mazes on rectangular grids, either all at once or one step at a
//! time for animation, and finds the route from the top left corner to the bottom right corner.

pub mod animation;
pub mod cells;
pub mod errors;
pub mod generators;
pub mod grid;
pub mod grid_displays;
pub mod options;
pub mod pathing;
pub mod units;
