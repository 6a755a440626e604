use smallvec::SmallVec;
use tracing::debug;

use crate::cells::{Coordinate, CARDINAL_DIRECTIONS};
use crate::grid::Grid;

struct SearchFrame {
    index: usize,
    candidates: SmallVec<[usize; 4]>,
    next: usize,
}

fn open_neighbour_indices(grid: &Grid, index: usize) -> SmallVec<[usize; 4]> {
    let coord = grid.coordinate_of(index);
    CARDINAL_DIRECTIONS.iter()
        .filter_map(|dir| grid.neighbour_at_direction(coord, *dir))
        .filter(|neighbour| grid.is_linked(coord, *neighbour))
        .filter_map(|neighbour| grid.index_of(neighbour))
        .filter(|neighbour_index| !grid.cell_at(*neighbour_index).is_exploring())
        .collect()
}

/// Depth first search from the top left cell to the bottom right cell through open passages.
///
/// Cells on the way are flagged as exploring and a dead end is unflagged as the search backs out
/// of it, so when a path is found exactly the cells of that path are left exploring.
/// Returns the path from start to end inclusive, None if the end cannot be reached.
pub fn solution_path(grid: &mut Grid) -> Option<Vec<Coordinate>> {
    grid.reset_visual_indicators();

    let target = grid.size() - 1;
    grid.cell_at_mut(0).set_exploring(true);
    let mut stack = vec![SearchFrame {
                             index: 0,
                             candidates: open_neighbour_indices(grid, 0),
                             next: 0,
                         }];

    while let Some(frame) = stack.last_mut() {
        if frame.index == target {
            break;
        }
        if frame.next == frame.candidates.len() {
            let dead_end = frame.index;
            grid.cell_at_mut(dead_end).set_exploring(false);
            stack.pop();
            continue;
        }
        let candidate = frame.candidates[frame.next];
        frame.next += 1;

        // Another branch may have entered this cell since the candidates were listed.
        if grid.cell_at(candidate).is_exploring() {
            continue;
        }
        grid.cell_at_mut(candidate).set_exploring(true);
        let candidates = open_neighbour_indices(grid, candidate);
        stack.push(SearchFrame {
            index: candidate,
            candidates,
            next: 0,
        });
    }

    if stack.is_empty() {
        None
    } else {
        Some(stack.iter().map(|frame| grid.coordinate_of(frame.index)).collect())
    }
}

/// Solve the maze, recording and returning the number of cells on the path.
/// 0 means the bottom right cell is unreachable.
pub fn solve(grid: &mut Grid) -> usize {
    let steps = solution_path(grid).map_or(0, |path| path.len());
    grid.set_steps_to_solution(steps);
    debug!(steps, "maze solved");
    steps
}
