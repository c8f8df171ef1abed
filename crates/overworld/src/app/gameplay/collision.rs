use super::grid::{GridCell, GridError};

/// Square row-major grid shared by the layout, collision and entrance layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenseGrid<T> {
    dimension: u32,
    cells: Vec<T>,
}

impl<T: Clone> DenseGrid<T> {
    pub fn filled(dimension: u32, value: T) -> Self {
        let count = dimension as usize * dimension as usize;
        Self {
            dimension,
            cells: vec![value; count],
        }
    }
}

impl<T> DenseGrid<T> {
    pub fn from_cells(dimension: u32, cells: Vec<T>) -> Result<Self, GridError> {
        if dimension == 0 {
            return Err(GridError::ZeroDimension);
        }
        let expected = dimension as usize * dimension as usize;
        if cells.len() != expected {
            return Err(GridError::CellCountMismatch {
                dimension,
                expected,
                actual: cells.len(),
            });
        }
        Ok(Self { dimension, cells })
    }

    pub fn dimension(&self) -> u32 {
        self.dimension
    }

    pub fn index_of(&self, cell: GridCell) -> Option<usize> {
        let dimension = self.dimension as i32;
        if cell.col < 0 || cell.row < 0 || cell.col >= dimension || cell.row >= dimension {
            return None;
        }
        Some(cell.row as usize * self.dimension as usize + cell.col as usize)
    }

    pub fn get(&self, cell: GridCell) -> Option<&T> {
        self.index_of(cell).and_then(|index| self.cells.get(index))
    }

    pub fn get_mut(&mut self, cell: GridCell) -> Option<&mut T> {
        self.index_of(cell).and_then(|index| self.cells.get_mut(index))
    }

    /// Cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (GridCell, &T)> + '_ {
        let dimension = self.dimension as i32;
        self.cells.iter().enumerate().map(move |(index, value)| {
            let index = index as i32;
            (GridCell::new(index % dimension, index / dimension), value)
        })
    }
}

/// Axis-aligned block of cells anchored at its top-left cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub origin: GridCell,
    pub width: u32,
    pub height: u32,
}

impl CellRect {
    pub const fn new(origin: GridCell, width: u32, height: u32) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = GridCell> + '_ {
        let origin = self.origin;
        (0..self.height as i32).flat_map(move |dr| {
            (0..self.width as i32).map(move |dc| origin.offset(dc, dr))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollisionGrid {
    blocked: DenseGrid<bool>,
}

impl CollisionGrid {
    pub fn new(dimension: u32) -> Self {
        Self {
            blocked: DenseGrid::filled(dimension, false),
        }
    }

    pub fn dimension(&self) -> u32 {
        self.blocked.dimension()
    }

    /// Out-of-range cells count as blocked.
    pub fn is_blocked(&self, cell: GridCell) -> bool {
        self.blocked.get(cell).copied().unwrap_or(true)
    }

    /// Marks every in-range cell of `region`; the part outside the grid is
    /// ignored.
    pub fn mark_blocked(&mut self, region: CellRect, blocked: bool) {
        for cell in region.cells() {
            if let Some(slot) = self.blocked.get_mut(cell) {
                *slot = blocked;
            }
        }
    }

    pub fn blocked_count(&self) -> usize {
        self.blocked.iter().filter(|(_, blocked)| **blocked).count()
    }
}

/// Entrance code per cell; zero means no entrance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnterableGrid {
    codes: DenseGrid<u16>,
}

impl EnterableGrid {
    pub fn new(dimension: u32) -> Self {
        Self {
            codes: DenseGrid::filled(dimension, 0),
        }
    }

    pub fn dimension(&self) -> u32 {
        self.codes.dimension()
    }

    pub fn set(&mut self, cell: GridCell, code: u16) -> bool {
        match self.codes.get_mut(cell) {
            Some(slot) => {
                *slot = code;
                true
            }
            None => false,
        }
    }

    pub fn code_at(&self, cell: GridCell) -> Option<u16> {
        self.codes.get(cell).copied().filter(|code| *code != 0)
    }

    pub fn entrances(&self) -> impl Iterator<Item = (GridCell, u16)> + '_ {
        self.codes
            .iter()
            .filter(|(_, code)| **code != 0)
            .map(|(cell, code)| (cell, *code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dense_grid_rejects_wrong_cell_count() {
        assert_eq!(
            DenseGrid::from_cells(3, vec![0u8; 8]),
            Err(GridError::CellCountMismatch {
                dimension: 3,
                expected: 9,
                actual: 8
            })
        );
    }

    #[test]
    fn dense_grid_iterates_row_major() {
        let grid = DenseGrid::from_cells(2, vec!['a', 'b', 'c', 'd']).expect("grid");
        let cells: Vec<(GridCell, char)> = grid.iter().map(|(cell, v)| (cell, *v)).collect();
        assert_eq!(cells[1], (GridCell::new(1, 0), 'b'));
        assert_eq!(cells[2], (GridCell::new(0, 1), 'c'));
    }

    #[test]
    fn out_of_range_is_blocked() {
        let grid = CollisionGrid::new(4);
        assert!(!grid.is_blocked(GridCell::new(0, 0)));
        assert!(grid.is_blocked(GridCell::new(-1, 0)));
        assert!(grid.is_blocked(GridCell::new(0, 4)));
        assert!(grid.is_blocked(GridCell::new(4, 4)));
    }

    #[test]
    fn mark_blocked_covers_rect_and_clips_at_edges() {
        let mut grid = CollisionGrid::new(8);
        grid.mark_blocked(CellRect::new(GridCell::new(5, 5), 3, 2), true);
        for col in 5..=7 {
            for row in 5..=6 {
                assert!(grid.is_blocked(GridCell::new(col, row)));
            }
        }
        assert!(!grid.is_blocked(GridCell::new(4, 5)));
        assert!(!grid.is_blocked(GridCell::new(5, 7)));
        assert_eq!(grid.blocked_count(), 6);

        grid.mark_blocked(CellRect::new(GridCell::new(7, 7), 2, 2), true);
        assert_eq!(grid.blocked_count(), 7);
    }

    #[test]
    fn mark_blocked_false_clears() {
        let mut grid = CollisionGrid::new(4);
        let rect = CellRect::new(GridCell::new(1, 1), 2, 2);
        grid.mark_blocked(rect, true);
        grid.mark_blocked(CellRect::new(GridCell::new(1, 1), 1, 1), false);
        assert_eq!(grid.blocked_count(), 3);
    }

    #[test]
    fn enterable_grid_reports_only_nonzero_codes() {
        let mut grid = EnterableGrid::new(8);
        assert!(grid.set(GridCell::new(6, 7), 1));
        assert!(!grid.set(GridCell::new(8, 0), 1));
        assert_eq!(grid.code_at(GridCell::new(6, 7)), Some(1));
        assert_eq!(grid.code_at(GridCell::new(6, 6)), None);
        assert_eq!(grid.code_at(GridCell::new(-3, 6)), None);
        assert_eq!(
            grid.entrances().collect::<Vec<_>>(),
            vec![(GridCell::new(6, 7), 1)]
        );
    }
}
