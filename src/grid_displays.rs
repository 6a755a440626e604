use std::fmt;

use crate::cells::{Cell, Direction};
use crate::grid::Grid;
use crate::units::{ColumnsCount, RowsCount};

/// Decides what goes inside a cell when a grid is drawn as text.
/// Every body has to be three characters wide to line up with the walls.
pub trait GridDisplay {
    fn render_cell_body(&self, cell: &Cell) -> String;
}

/// Empty cell bodies, just the walls.
#[derive(Debug, Copy, Clone, Default)]
pub struct PlainDisplay;

impl GridDisplay for PlainDisplay {
    fn render_cell_body(&self, _: &Cell) -> String {
        String::from("   ")
    }
}

/// Cell bodies showing what the generators and the solver are doing.
///
/// `o` is the cell being explored, `x` a cell being backed out of or sitting on Prim's frontier,
/// `!` a cell whose wall Kruskal's algorithm is considering and a shaded body a cell not yet
/// in the maze. Once the grid is solved the exploring cells are the path, drawn as `.`.
#[derive(Debug, Copy, Clone)]
pub struct VisualFlagsDisplay {
    solved: bool,
}

impl VisualFlagsDisplay {
    pub fn new(solved: bool) -> VisualFlagsDisplay {
        VisualFlagsDisplay { solved }
    }

    pub fn for_grid(grid: &Grid) -> VisualFlagsDisplay {
        VisualFlagsDisplay::new(grid.steps_to_solution() > 0)
    }
}

impl GridDisplay for VisualFlagsDisplay {
    fn render_cell_body(&self, cell: &Cell) -> String {
        let body = if cell.is_exploring() {
            if self.solved { " . " } else { " o " }
        } else if cell.is_backtracking() {
            " x "
        } else if cell.current_wall().is_some() {
            " ! "
        } else if cell.is_modifiable() {
            "░░░"
        } else {
            "   "
        };
        String::from(body)
    }
}

/// Draw the grid with box-drawing characters, asking `display` for each cell body.
pub fn render_grid(grid: &Grid, display: &dyn GridDisplay) -> String {
    const WALL_L: &str = "╴";
    const WALL_R: &str = "╶";
    const WALL_U: &str = "╵";
    const WALL_D: &str = "╷";
    const WALL_LR_3: &str = "───";
    const WALL_LR: &str = "─";
    const WALL_UD: &str = "│";
    const WALL_LD: &str = "┐";
    const WALL_RU: &str = "└";
    const WALL_LU: &str = "┘";
    const WALL_RD: &str = "┌";
    const WALL_LRU: &str = "┴";
    const WALL_LRD: &str = "┬";
    const WALL_LRUD: &str = "┼";
    const WALL_RUD: &str = "├";
    const WALL_LUD: &str = "┤";

    let ColumnsCount(columns_count) = grid.columns();
    let RowsCount(rows_count) = grid.rows();

    // The top boundary is drawn on its own, every row after draws only its middle and bottom.
    let mut output = String::from(WALL_RD);
    for (index, cell) in grid.cells().iter().take(columns_count).enumerate() {
        output.push_str(WALL_LR_3);
        if grid.is_neighbour_linked(cell.coordinate(), Direction::Right) {
            output.push_str(WALL_LR);
        } else if index == columns_count - 1 {
            output.push_str(WALL_LD);
        } else {
            output.push_str(WALL_LRD);
        }
    }
    output.push('\n');

    for (index_row, row) in grid.iter_row().enumerate() {
        let is_last_row = index_row == rows_count - 1;

        let mut middle_section = String::from(WALL_UD);
        let mut bottom_section = String::new();

        for (index_column, cell) in row.iter().enumerate() {
            let coord = cell.coordinate();
            let is_first_column = index_column == 0;
            let is_last_column = index_column == columns_count - 1;
            let right_open = grid.is_neighbour_linked(coord, Direction::Right);
            let bottom_open = grid.is_neighbour_linked(coord, Direction::Bottom);

            middle_section.push_str(&display.render_cell_body(cell));
            middle_section.push_str(if right_open { " " } else { WALL_UD });

            if is_first_column {
                bottom_section.push_str(if is_last_row {
                    WALL_RU
                } else if bottom_open {
                    WALL_UD
                } else {
                    WALL_RUD
                });
            }
            bottom_section.push_str(if bottom_open { "   " } else { WALL_LR_3 });

            let corner = match (is_last_row, is_last_column) {
                (true, true) => WALL_LU,
                (true, false) => if right_open { WALL_LR } else { WALL_LRU },
                (false, true) => if bottom_open { WALL_UD } else { WALL_LUD },
                (false, false) => {
                    // The corner below right of this cell, shared with three other cells.
                    let below_right_reached_from_right =
                        grid.neighbour_at_direction(coord, Direction::Right)
                            .map_or(false, |c| grid.is_neighbour_linked(c, Direction::Bottom));
                    let below_right_reached_from_below =
                        grid.neighbour_at_direction(coord, Direction::Bottom)
                            .map_or(false, |c| grid.is_neighbour_linked(c, Direction::Right));
                    let show_left_section = !bottom_open;
                    let show_right_section = !below_right_reached_from_right;
                    let show_up_section = !right_open;
                    let show_down_section = !below_right_reached_from_below;

                    match (show_left_section,
                           show_right_section,
                           show_up_section,
                           show_down_section) {
                        (true, true, true, true) => WALL_LRUD,
                        (true, true, true, false) => WALL_LRU,
                        (true, true, false, true) => WALL_LRD,
                        (true, false, true, true) => WALL_LUD,
                        (false, true, true, true) => WALL_RUD,
                        (true, true, false, false) => WALL_LR,
                        (false, false, true, true) => WALL_UD,
                        (false, true, true, false) => WALL_RU,
                        (true, false, false, true) => WALL_LD,
                        (true, false, true, false) => WALL_LU,
                        (false, true, false, true) => WALL_RD,
                        (true, false, false, false) => WALL_L,
                        (false, true, false, false) => WALL_R,
                        (false, false, true, false) => WALL_U,
                        (false, false, false, true) => WALL_D,
                        (false, false, false, false) => " ",
                    }
                }
            };
            bottom_section.push_str(corner);
        }

        output.push_str(&middle_section);
        output.push('\n');
        output.push_str(&bottom_section);
        output.push('\n');
    }

    output
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", render_grid(self, &VisualFlagsDisplay::for_grid(self)))
    }
}
