//! Tile layout tables: `D` lines of `D` comma-separated integer codes.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use super::collision::DenseGrid;
use super::grid::GridCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutCode {
    Empty,
    Tree,
    Path,
    Bush,
    WhiteFlower,
    RedWhiteFlower,
    RedFlower,
    NiceBush,
    Flowerbed,
    ShortTree,
    Rocks,
    HouseA,
    HouseB,
}

impl LayoutCode {
    pub fn from_raw(raw: i32) -> Option<Self> {
        let code = match raw {
            0 => LayoutCode::Empty,
            1 => LayoutCode::Tree,
            2 => LayoutCode::Path,
            3 => LayoutCode::Bush,
            4 => LayoutCode::WhiteFlower,
            5 => LayoutCode::RedWhiteFlower,
            6 => LayoutCode::RedFlower,
            7 => LayoutCode::NiceBush,
            8 => LayoutCode::Flowerbed,
            9 => LayoutCode::ShortTree,
            10 => LayoutCode::Rocks,
            11 => LayoutCode::HouseA,
            12 => LayoutCode::HouseB,
            _ => return None,
        };
        Some(code)
    }

    /// Texture of a single-cell decoration placed as-is, without collision.
    pub fn decoration_texture(self) -> Option<&'static str> {
        match self {
            LayoutCode::Bush => Some("bush"),
            LayoutCode::WhiteFlower => Some("flower-white"),
            LayoutCode::RedWhiteFlower => Some("flower-redwhite"),
            LayoutCode::RedFlower => Some("flower-red"),
            LayoutCode::NiceBush => Some("nice-bush"),
            LayoutCode::ShortTree => Some("tree-short"),
            LayoutCode::Rocks => Some("rocks"),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("failed to read layout file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("layout line {line} column {column}: '{value}' is not an integer")]
    InvalidCell {
        line: usize,
        column: usize,
        value: String,
    },
    #[error("layout has {actual} rows, expected {expected}")]
    RowCount { expected: u32, actual: usize },
    #[error("layout line {line} has {actual} cells, expected {expected}")]
    ColumnCount {
        line: usize,
        expected: u32,
        actual: usize,
    },
}

/// Raw integer codes as authored. Codes outside [`LayoutCode`] are kept so
/// tooling can report them; world building ignores them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutGrid {
    cells: DenseGrid<i32>,
}

impl LayoutGrid {
    pub fn from_grid(cells: DenseGrid<i32>) -> Self {
        Self { cells }
    }

    pub fn dimension(&self) -> u32 {
        self.cells.dimension()
    }

    pub fn raw(&self, cell: GridCell) -> Option<i32> {
        self.cells.get(cell).copied()
    }

    pub fn code(&self, cell: GridCell) -> Option<LayoutCode> {
        self.raw(cell).and_then(LayoutCode::from_raw)
    }

    /// Out-of-range cells never match.
    pub fn is(&self, cell: GridCell, code: LayoutCode) -> bool {
        self.code(cell) == Some(code)
    }

    pub fn cells(&self) -> impl Iterator<Item = (GridCell, i32)> + '_ {
        self.cells.iter().map(|(cell, raw)| (cell, *raw))
    }
}

/// Parses a layout table. Blank trailing lines and `\r` line endings are
/// tolerated; anything else that is not a `dimension`-square table of integers
/// is an error.
pub fn parse_layout_csv(text: &str, dimension: u32) -> Result<LayoutGrid, LayoutError> {
    let mut lines: Vec<&str> = text.lines().map(|line| line.trim_end_matches('\r')).collect();
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    if lines.len() != dimension as usize {
        return Err(LayoutError::RowCount {
            expected: dimension,
            actual: lines.len(),
        });
    }

    let mut cells = Vec::with_capacity(dimension as usize * dimension as usize);
    for (line_index, line) in lines.iter().enumerate() {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != dimension as usize {
            return Err(LayoutError::ColumnCount {
                line: line_index + 1,
                expected: dimension,
                actual: fields.len(),
            });
        }
        for (column_index, field) in fields.iter().enumerate() {
            let trimmed = field.trim();
            let value = trimmed.parse::<i32>().map_err(|_| LayoutError::InvalidCell {
                line: line_index + 1,
                column: column_index + 1,
                value: trimmed.to_string(),
            })?;
            cells.push(value);
        }
    }

    let grid = DenseGrid::from_cells(dimension, cells).map_err(|_| LayoutError::RowCount {
        expected: dimension,
        actual: lines.len(),
    })?;
    Ok(LayoutGrid::from_grid(grid))
}

pub fn load_layout(path: &Path, dimension: u32) -> Result<LayoutGrid, LayoutError> {
    let text = fs::read_to_string(path).map_err(|source| LayoutError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let layout = parse_layout_csv(&text, dimension)?;
    info!(path = %path.display(), dimension, "layout_loaded");
    Ok(layout)
}
