//! Logical grid cells and their mapping to world pixels.

use engine::{Direction, SpawnCell, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tolerance, in cells, absorbed by `to_grid` before flooring so that the
/// round trip through f32 world coordinates lands on the same cell.
const GRID_FLOOR_EPSILON: f32 = 1e-3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub col: i32,
    pub row: i32,
}

impl GridCell {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    pub fn step(self, direction: Direction) -> Self {
        let (dc, dr) = direction.delta();
        Self::new(self.col + dc, self.row + dr)
    }

    pub fn offset(self, dc: i32, dr: i32) -> Self {
        Self::new(self.col + dc, self.row + dr)
    }

    pub fn chebyshev_distance(self, other: GridCell) -> i32 {
        (self.col - other.col)
            .abs()
            .max((self.row - other.row).abs())
    }
}

impl From<SpawnCell> for GridCell {
    fn from(spawn: SpawnCell) -> Self {
        Self::new(spawn.col, spawn.row)
    }
}

impl From<GridCell> for SpawnCell {
    fn from(cell: GridCell) -> Self {
        SpawnCell {
            col: cell.col,
            row: cell.row,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("grid dimension must be positive")]
    ZeroDimension,
    #[error("cell size must be positive and finite, got {width}x{height}")]
    InvalidCellSize { width: f32, height: f32 },
    #[error("grid has {actual} cells, expected {expected} for dimension {dimension}")]
    CellCountMismatch {
        dimension: u32,
        expected: usize,
        actual: usize,
    },
    #[error("{name} grid has dimension {actual}, expected {expected}")]
    DimensionMismatch {
        name: &'static str,
        expected: u32,
        actual: u32,
    },
}

/// Affine map between grid cells and world pixels.
///
/// Cell `(D/2, D/2)` has its top-left corner at `origin`; each cell spans
/// `cell_width` x `cell_height` pixels with rows growing downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMapper {
    origin: Vec2,
    cell_width: f32,
    cell_height: f32,
    dimension: u32,
}

impl GridMapper {
    pub fn new(
        origin: Vec2,
        cell_width: f32,
        cell_height: f32,
        dimension: u32,
    ) -> Result<Self, GridError> {
        if dimension == 0 {
            return Err(GridError::ZeroDimension);
        }
        let valid = |size: f32| size.is_finite() && size > 0.0;
        if !valid(cell_width) || !valid(cell_height) {
            return Err(GridError::InvalidCellSize {
                width: cell_width,
                height: cell_height,
            });
        }
        Ok(Self {
            origin,
            cell_width,
            cell_height,
            dimension,
        })
    }

    /// A background image centered in the viewport, divided into `dimension`
    /// cells per side.
    pub fn for_background(
        viewport: (f32, f32),
        background: (f32, f32),
        dimension: u32,
    ) -> Result<Self, GridError> {
        if dimension == 0 {
            return Err(GridError::ZeroDimension);
        }
        Self::new(
            Vec2::new(viewport.0 / 2.0, viewport.1 / 2.0),
            background.0 / dimension as f32,
            background.1 / dimension as f32,
            dimension,
        )
    }

    pub fn dimension(&self) -> u32 {
        self.dimension
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn cell_size(&self) -> (f32, f32) {
        (self.cell_width, self.cell_height)
    }

    pub fn contains(&self, cell: GridCell) -> bool {
        let dimension = self.dimension as i32;
        (0..dimension).contains(&cell.col) && (0..dimension).contains(&cell.row)
    }

    fn half_dimension(&self) -> f32 {
        self.dimension as f32 / 2.0
    }

    /// World position of the cell's top-left corner.
    pub fn to_world(&self, cell: GridCell) -> Vec2 {
        let half = self.half_dimension();
        Vec2::new(
            self.origin.x + (cell.col as f32 - half) * self.cell_width,
            self.origin.y + (cell.row as f32 - half) * self.cell_height,
        )
    }

    pub fn cell_center(&self, cell: GridCell) -> Vec2 {
        let corner = self.to_world(cell);
        Vec2::new(
            corner.x + self.cell_width / 2.0,
            corner.y + self.cell_height / 2.0,
        )
    }

    /// Cell containing `position`. Not clamped: points outside the grid map to
    /// out-of-range cells.
    pub fn to_grid(&self, position: Vec2) -> GridCell {
        let half = self.half_dimension();
        let col = (position.x - self.origin.x) / self.cell_width + half + GRID_FLOOR_EPSILON;
        let row = (position.y - self.origin.y) / self.cell_height + half + GRID_FLOOR_EPSILON;
        GridCell::new(col.floor() as i32, row.floor() as i32)
    }
}

/// Coarse pixel guard: the background rectangle inset by half the viewport on
/// every side, so the camera never shows past the background edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayableBounds {
    min: Vec2,
    max: Vec2,
}

impl PlayableBounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn for_background(center: Vec2, background: (f32, f32), viewport: (f32, f32)) -> Self {
        let half_x = (background.0 - viewport.0) / 2.0;
        let half_y = (background.1 - viewport.1) / 2.0;
        Self {
            min: Vec2::new(center.x - half_x, center.y - half_y),
            max: Vec2::new(center.x + half_x, center.y + half_y),
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x < self.max.x && point.y >= self.min.y && point.y < self.max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> GridMapper {
        GridMapper::for_background((1280.0, 720.0), (4000.0, 4000.0), 80).expect("mapper")
    }

    #[test]
    fn round_trip_holds_for_every_cell() {
        let mapper = mapper();
        for col in 0..80 {
            for row in 0..80 {
                let cell = GridCell::new(col, row);
                assert_eq!(mapper.to_grid(mapper.to_world(cell)), cell);
                assert_eq!(mapper.to_grid(mapper.cell_center(cell)), cell);
            }
        }
    }

    #[test]
    fn round_trip_holds_for_odd_dimension_and_fractional_cells() {
        let mapper = GridMapper::new(Vec2::new(13.7, -4.2), 33.3, 17.9, 21).expect("mapper");
        for col in 0..21 {
            for row in 0..21 {
                let cell = GridCell::new(col, row);
                assert_eq!(mapper.to_grid(mapper.to_world(cell)), cell);
            }
        }
    }

    #[test]
    fn center_cell_sits_at_origin() {
        let mapper = mapper();
        assert_eq!(mapper.to_world(GridCell::new(40, 40)), Vec2::new(640.0, 360.0));
        assert_eq!(mapper.to_world(GridCell::new(41, 39)), Vec2::new(690.0, 310.0));
        assert_eq!(mapper.cell_size(), (50.0, 50.0));
    }

    #[test]
    fn points_inside_a_cell_floor_to_it() {
        let mapper = mapper();
        let corner = mapper.to_world(GridCell::new(10, 20));
        let inside = Vec2::new(corner.x + 49.0, corner.y + 0.5);
        assert_eq!(mapper.to_grid(inside), GridCell::new(10, 20));
        let left_of = Vec2::new(corner.x - 1.0, corner.y);
        assert_eq!(mapper.to_grid(left_of), GridCell::new(9, 20));
    }

    #[test]
    fn contains_rejects_out_of_range() {
        let mapper = mapper();
        assert!(mapper.contains(GridCell::new(0, 79)));
        assert!(!mapper.contains(GridCell::new(-1, 0)));
        assert!(!mapper.contains(GridCell::new(0, 80)));
    }

    #[test]
    fn rejects_degenerate_configuration() {
        assert_eq!(
            GridMapper::new(Vec2::default(), 1.0, 1.0, 0),
            Err(GridError::ZeroDimension)
        );
        assert!(GridMapper::new(Vec2::default(), 0.0, 1.0, 4).is_err());
        assert!(GridMapper::new(Vec2::default(), 1.0, f32::NAN, 4).is_err());
    }

    #[test]
    fn chebyshev_distance_takes_larger_axis() {
        let a = GridCell::new(10, 10);
        assert_eq!(a.chebyshev_distance(GridCell::new(11, 11)), 1);
        assert_eq!(a.chebyshev_distance(GridCell::new(10, 12)), 2);
        assert_eq!(a.chebyshev_distance(a), 0);
    }

    #[test]
    fn playable_bounds_inset_background_by_half_viewport() {
        let bounds = PlayableBounds::for_background(
            Vec2::new(640.0, 360.0),
            (4000.0, 4000.0),
            (1280.0, 720.0),
        );
        assert!(bounds.contains(Vec2::new(-720.0, -1280.0)));
        assert!(!bounds.contains(Vec2::new(-721.0, 0.0)));
        assert!(!bounds.contains(Vec2::new(2000.0, 0.0)));
        assert!(bounds.contains(Vec2::new(1999.0, 1999.0)));
    }
}
