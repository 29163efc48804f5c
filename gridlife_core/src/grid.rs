//! Row-major grid model shared by every GridLife component.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Byte value of a live cell.
pub const ALIVE: u8 = 255;

/// Byte value of a dead cell.
pub const DEAD: u8 = 0;

/// A single cell coordinate, `x` across, `y` down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
}

impl Cell {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Row-major matrix of cell states, one byte per cell (0 dead, 255 alive).
///
/// Adjacency is toroidal: neighbor lookups at row/column 0 or the maximum
/// index wrap modulo the dimension. The cell buffer length always equals
/// `width * height`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl Grid {
    /// Creates an all-dead grid.
    pub fn dead(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![DEAD; width * height],
        }
    }

    /// Builds a grid from row-major cell bytes.
    pub fn from_cells(width: usize, height: usize, cells: Vec<u8>) -> Result<Self, CoreError> {
        if cells.len() != width * height {
            return Err(CoreError::shape(format!(
                "{} cells for a {}x{} grid",
                cells.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub(crate) fn from_cells_unchecked(width: usize, height: usize, cells: Vec<u8>) -> Self {
        debug_assert_eq!(cells.len(), width * height);
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The full row-major cell buffer.
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.cells[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        self.cells[y * self.width + x] = value;
    }

    /// Overwrites rows `slice.y1..=slice.y2` with the slice contents.
    pub fn splice(&mut self, slice: &GridSlice) -> Result<(), CoreError> {
        if slice.width != self.width || slice.y2 >= self.height || !slice.is_shape_valid() {
            return Err(CoreError::shape(format!(
                "slice rows {}..={} width {} into a {}x{} grid",
                slice.y1, slice.y2, slice.width, self.width, self.height
            )));
        }
        let start = slice.y1 * self.width;
        self.cells[start..start + slice.cells.len()].copy_from_slice(&slice.cells);
        Ok(())
    }

    /// Coordinates of every cell that differs from `other`, row-major order.
    ///
    /// Both grids must share dimensions; mismatched grids report every cell.
    pub fn diff(&self, other: &Grid) -> Vec<Cell> {
        if self.width != other.width || self.height != other.height {
            return (0..self.height)
                .flat_map(|y| (0..self.width).map(move |x| Cell::new(x, y)))
                .collect();
        }
        let mut changed = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if self.get(x, y) != other.get(x, y) {
                    changed.push(Cell::new(x, y));
                }
            }
        }
        changed
    }
}

/// Rows `[y1..=y2]` of a next-state grid, produced once per partition job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSlice {
    /// First row of the band, inclusive
    pub y1: usize,

    /// Last row of the band, inclusive
    pub y2: usize,

    /// Row width in cells
    pub width: usize,

    /// Row-major cells of the band
    pub cells: Vec<u8>,
}

impl GridSlice {
    /// Number of rows in the band.
    pub fn rows(&self) -> usize {
        self.y2 - self.y1 + 1
    }

    /// Whether the cell buffer matches the declared bounds.
    pub fn is_shape_valid(&self) -> bool {
        self.y1 <= self.y2 && self.cells.len() == self.rows() * self.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cells_rejects_bad_length() {
        assert!(Grid::from_cells(4, 4, vec![DEAD; 15]).is_err());
        assert!(Grid::from_cells(4, 4, vec![DEAD; 16]).is_ok());
    }

    #[test]
    fn test_get_set_round_trip() {
        let mut grid = Grid::dead(3, 2);
        grid.set(2, 1, ALIVE);
        assert_eq!(grid.get(2, 1), ALIVE);
        assert_eq!(grid.get(0, 0), DEAD);
    }

    #[test]
    fn test_splice_validates_shape() {
        let mut grid = Grid::dead(2, 3);
        let bad = GridSlice {
            y1: 0,
            y2: 1,
            width: 2,
            cells: vec![ALIVE; 3],
        };
        assert!(grid.splice(&bad).is_err());

        let good = GridSlice {
            y1: 1,
            y2: 2,
            width: 2,
            cells: vec![ALIVE; 4],
        };
        grid.splice(&good).unwrap();
        assert_eq!(grid.cells(), &[DEAD, DEAD, ALIVE, ALIVE, ALIVE, ALIVE]);
    }

    #[test]
    fn test_diff_reports_changed_cells() {
        let mut a = Grid::dead(3, 3);
        let b = a.clone();
        a.set(1, 0, ALIVE);
        a.set(2, 2, ALIVE);
        assert_eq!(a.diff(&b), vec![Cell::new(1, 0), Cell::new(2, 2)]);
        assert!(b.diff(&b).is_empty());
    }
}
