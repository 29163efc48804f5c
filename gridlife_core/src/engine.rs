//! The automaton kernel: toroidal neighbor counting and the survival rule.
//!
//! An alive cell survives iff it has 2 or 3 live neighbors; a dead cell
//! becomes alive iff it has exactly 3. Everything here is pure and safe to
//! run concurrently against shared read-only grids.

use crate::grid::{Cell, Grid, GridSlice, ALIVE, DEAD};

/// Computes the next state of rows `[y1..=y2]`.
///
/// Bounds must satisfy `y1 <= y2 < grid.height()`; correctness of bounds is
/// the caller's responsibility.
pub fn next_slice(grid: &Grid, y1: usize, y2: usize) -> GridSlice {
    let width = grid.width();
    let mut cells = Vec::with_capacity((y2 - y1 + 1) * width);
    for y in y1..=y2 {
        for x in 0..width {
            let neighbors = live_neighbors(grid, x, y);
            let next = if grid.get(x, y) == ALIVE {
                if neighbors == 2 || neighbors == 3 {
                    ALIVE
                } else {
                    DEAD
                }
            } else if neighbors == 3 {
                ALIVE
            } else {
                DEAD
            };
            cells.push(next);
        }
    }
    GridSlice {
        y1,
        y2,
        width,
        cells,
    }
}

/// One whole-grid step in a single pass.
pub fn step(grid: &Grid) -> Grid {
    let slice = next_slice(grid, 0, grid.height() - 1);
    Grid::from_cells_unchecked(grid.width(), grid.height(), slice.cells)
}

/// Number of live cells.
pub fn alive_count(grid: &Grid) -> usize {
    grid.cells().iter().filter(|&&cell| cell == ALIVE).count()
}

/// Coordinates of every live cell, row-major order.
pub fn alive_cells(grid: &Grid) -> Vec<Cell> {
    let mut alive = Vec::new();
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            if grid.get(x, y) == ALIVE {
                alive.push(Cell::new(x, y));
            }
        }
    }
    alive
}

fn live_neighbors(grid: &Grid, x: usize, y: usize) -> u8 {
    let width = grid.width() as isize;
    let height = grid.height() as isize;
    let mut count = 0;
    for dy in -1isize..=1 {
        for dx in -1isize..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let nx = (x as isize + dx).rem_euclid(width) as usize;
            let ny = (y as isize + dy).rem_euclid(height) as usize;
            if grid.get(nx, ny) == ALIVE {
                count += 1;
            }
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::row_bands;
    use proptest::prelude::*;

    fn grid_with(width: usize, height: usize, alive: &[(usize, usize)]) -> Grid {
        let mut grid = Grid::dead(width, height);
        for &(x, y) in alive {
            grid.set(x, y, ALIVE);
        }
        grid
    }

    /// Merges per-band slices the way a round does: in band order.
    fn step_partitioned(grid: &Grid, parts: usize) -> Grid {
        let mut cells = Vec::with_capacity(grid.width() * grid.height());
        for (y1, y2) in row_bands(grid.height(), parts) {
            cells.extend_from_slice(&next_slice(grid, y1, y2).cells);
        }
        Grid::from_cells(grid.width(), grid.height(), cells).unwrap()
    }

    #[test]
    fn test_lone_cell_dies() {
        let grid = grid_with(8, 8, &[(3, 3)]);
        assert_eq!(alive_count(&step(&grid)), 0);
    }

    #[test]
    fn test_block_is_stable() {
        let block = grid_with(6, 6, &[(2, 2), (3, 2), (2, 3), (3, 3)]);
        let mut grid = block.clone();
        for _ in 0..5 {
            grid = step(&grid);
            assert_eq!(grid, block);
        }
    }

    #[test]
    fn test_blinker_oscillates() {
        let horizontal = grid_with(5, 5, &[(1, 2), (2, 2), (3, 2)]);
        let vertical = grid_with(5, 5, &[(2, 1), (2, 2), (2, 3)]);
        assert_eq!(step(&horizontal), vertical);
        assert_eq!(step(&vertical), horizontal);
    }

    #[test]
    fn test_neighbors_wrap_around_edges() {
        // Three cells in the top row, wrapping across the left/right edge:
        // a blinker straddling the seam of the torus.
        let seam = grid_with(4, 4, &[(3, 0), (0, 0), (1, 0)]);
        let next = step(&seam);
        assert_eq!(next.get(0, 3), ALIVE);
        assert_eq!(next.get(0, 0), ALIVE);
        assert_eq!(next.get(0, 1), ALIVE);
        assert_eq!(alive_count(&next), 3);
    }

    #[test]
    fn test_partitioned_step_matches_whole_grid() {
        let grid = grid_with(
            16,
            16,
            &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2), (8, 8), (9, 8), (8, 9), (9, 9)],
        );
        let whole = step(&grid);
        for parts in [1, 2, 3, 4, 5, 7, 16] {
            assert_eq!(step_partitioned(&grid, parts), whole, "parts={}", parts);
        }
    }

    #[test]
    fn test_glider_trajectory() {
        // The standard glider translates by (1, 1) every 4 generations and
        // keeps a constant population of 5.
        let start = &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)];
        let mut grid = grid_with(16, 16, start);
        for turn in 0..4 {
            grid = step_partitioned(&grid, 4);
            assert_eq!(alive_count(&grid), 5, "turn {}", turn + 1);
        }
        let moved: Vec<_> = start.iter().map(|&(x, y)| (x + 1, y + 1)).collect();
        assert_eq!(grid, grid_with(16, 16, &moved));
    }

    #[test]
    fn test_alive_cells_row_major_order() {
        let grid = grid_with(3, 3, &[(2, 0), (0, 2)]);
        assert_eq!(alive_cells(&grid), vec![Cell::new(2, 0), Cell::new(0, 2)]);
    }

    proptest! {
        #[test]
        fn test_partition_merge_equivalence(
            (width, height, cells, parts) in (1usize..12, 1usize..12).prop_flat_map(|(w, h)| {
                (
                    Just(w),
                    Just(h),
                    proptest::collection::vec(prop_oneof![Just(DEAD), Just(ALIVE)], w * h),
                    1usize..16,
                )
            })
        ) {
            let grid = Grid::from_cells(width, height, cells).unwrap();
            let whole = step(&grid);
            prop_assert_eq!(step_partitioned(&grid, parts), whole);
        }
    }
}
