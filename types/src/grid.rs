//! Square grid geometry and validated paths.
//!
//! Cells are addressed by a flat row-major index in `[0, size²)`. Two cells are
//! adjacent iff they share a row and differ by one, or differ by exactly `size`.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GridCell(usize);

impl GridCell {
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A square grid of `size × size` cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Grid {
    size: usize,
}

impl Grid {
    #[must_use]
    pub const fn new(size: usize) -> Self {
        Self { size }
    }

    #[must_use]
    pub const fn size(self) -> usize {
        self.size
    }

    #[must_use]
    pub const fn cell_count(self) -> usize {
        self.size * self.size
    }

    #[must_use]
    pub const fn contains(self, cell: GridCell) -> bool {
        cell.0 < self.cell_count()
    }

    /// Map a raw tile index from the host into a cell of this grid.
    #[must_use]
    pub fn cell(self, index: usize) -> Option<GridCell> {
        let cell = GridCell(index);
        self.contains(cell).then_some(cell)
    }

    #[must_use]
    pub fn cells(self) -> impl Iterator<Item = GridCell> {
        (0..self.cell_count()).map(GridCell)
    }

    /// Orthogonal neighbours of `cell`, in up/down/left/right order.
    ///
    /// Returns nothing for cells outside the grid.
    #[must_use]
    pub fn neighbors(self, cell: GridCell) -> Vec<GridCell> {
        if !self.contains(cell) {
            return Vec::new();
        }
        let row = cell.0 / self.size;
        let col = cell.0 % self.size;
        let mut out = Vec::with_capacity(4);
        if row > 0 {
            out.push(GridCell(cell.0 - self.size));
        }
        if row + 1 < self.size {
            out.push(GridCell(cell.0 + self.size));
        }
        if col > 0 {
            out.push(GridCell(cell.0 - 1));
        }
        if col + 1 < self.size {
            out.push(GridCell(cell.0 + 1));
        }
        out
    }

    #[must_use]
    pub fn are_adjacent(self, a: GridCell, b: GridCell) -> bool {
        if !self.contains(a) || !self.contains(b) {
            return false;
        }
        let (lo, hi) = if a.0 < b.0 { (a.0, b.0) } else { (b.0, a.0) };
        let same_row = lo / self.size == hi / self.size;
        (hi - lo == 1 && same_row) || hi - lo == self.size
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("cell {cell} lies outside a {size}x{size} grid")]
    OutOfBounds { cell: GridCell, size: usize },
    #[error("cell {cell} appears more than once")]
    Repeated { cell: GridCell },
    #[error("cells {from} and {to} are not adjacent")]
    NotAdjacent { from: GridCell, to: GridCell },
}

/// An ordered, self-avoiding walk of orthogonally adjacent cells.
///
/// Only constructible through [`Path::new`], so every value upholds the invariants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Path(Vec<GridCell>);

impl Path {
    pub fn new(cells: Vec<GridCell>, grid: Grid) -> Result<Self, PathError> {
        let mut seen = vec![false; grid.cell_count()];
        for &cell in &cells {
            if !grid.contains(cell) {
                return Err(PathError::OutOfBounds {
                    cell,
                    size: grid.size(),
                });
            }
            if std::mem::replace(&mut seen[cell.index()], true) {
                return Err(PathError::Repeated { cell });
            }
        }
        if let Some(pair) = cells.windows(2).find(|w| !grid.are_adjacent(w[0], w[1])) {
            return Err(PathError::NotAdjacent {
                from: pair[0],
                to: pair[1],
            });
        }
        Ok(Self(cells))
    }

    #[must_use]
    pub fn cells(&self) -> &[GridCell] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, step: usize) -> Option<GridCell> {
        self.0.get(step).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(raw: &[usize]) -> Vec<GridCell> {
        raw.iter().copied().map(GridCell::new).collect()
    }

    #[test]
    fn neighbors_respect_edges() {
        let grid = Grid::new(3);
        assert_eq!(grid.neighbors(GridCell::new(0)), cells(&[3, 1]));
        assert_eq!(grid.neighbors(GridCell::new(4)), cells(&[1, 7, 3, 5]));
        assert_eq!(grid.neighbors(GridCell::new(8)), cells(&[5, 7]));
        assert!(grid.neighbors(GridCell::new(9)).is_empty());
    }

    #[test]
    fn adjacency_does_not_wrap_rows() {
        let grid = Grid::new(3);
        assert!(grid.are_adjacent(GridCell::new(1), GridCell::new(2)));
        assert!(grid.are_adjacent(GridCell::new(2), GridCell::new(5)));
        assert!(!grid.are_adjacent(GridCell::new(2), GridCell::new(3)));
        assert!(!grid.are_adjacent(GridCell::new(0), GridCell::new(4)));
        assert!(!grid.are_adjacent(GridCell::new(4), GridCell::new(4)));
    }

    #[test]
    fn cell_lookup_rejects_out_of_range() {
        let grid = Grid::new(4);
        assert_eq!(grid.cell(15), Some(GridCell::new(15)));
        assert_eq!(grid.cell(16), None);
    }

    #[test]
    fn path_accepts_valid_walk() {
        let path = Path::new(cells(&[2, 5, 8]), Grid::new(3)).expect("valid path");
        assert_eq!(path.len(), 3);
        assert_eq!(path.get(1), Some(GridCell::new(5)));
        assert_eq!(path.get(3), None);
    }

    #[test]
    fn path_rejects_broken_invariants() {
        let grid = Grid::new(3);
        assert_eq!(
            Path::new(cells(&[0, 1, 0]), grid),
            Err(PathError::Repeated {
                cell: GridCell::new(0)
            })
        );
        assert_eq!(
            Path::new(cells(&[2, 3]), grid),
            Err(PathError::NotAdjacent {
                from: GridCell::new(2),
                to: GridCell::new(3)
            })
        );
        assert!(matches!(
            Path::new(cells(&[8, 9]), grid),
            Err(PathError::OutOfBounds { .. })
        ));
    }
}
