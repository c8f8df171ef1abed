//! Path autotiling.
//!
//! Each path cell picks one tile variant from the path/non-path state of its
//! eight neighbors. Rules are checked in a fixed order and the first match
//! wins. A few neighborhoods match no rule; those cells get no tile.

use std::fmt;

use super::grid::GridCell;
use super::layout::{LayoutCode, LayoutGrid};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathTile {
    Solo,
    Mid,
    Horizontal,
    Vertical,
    Four,
    ThreeUp,
    ThreeDown,
    ThreeLeft,
    ThreeRight,
    CornerTl,
    CornerTr,
    CornerBl,
    CornerBr,
    MidLeft,
    MidRight,
    MidUp,
    MidDown,
    MidTl,
    MidTr,
    MidBl,
    MidBr,
    AntiTl,
    AntiTr,
    AntiBl,
    AntiBr,
    FunnelUp,
    FunnelDown,
    FunnelLeft,
    FunnelRight,
    EndUp,
    EndDown,
    EndLeft,
    EndRight,
    RightTl,
    RightBl,
    LeftTr,
    LeftBr,
    UpBl,
    UpBr,
    DownTl,
    DownTr,
}

impl PathTile {
    pub const ALL: [PathTile; 41] = [
        PathTile::Solo,
        PathTile::Mid,
        PathTile::Horizontal,
        PathTile::Vertical,
        PathTile::Four,
        PathTile::ThreeUp,
        PathTile::ThreeDown,
        PathTile::ThreeLeft,
        PathTile::ThreeRight,
        PathTile::CornerTl,
        PathTile::CornerTr,
        PathTile::CornerBl,
        PathTile::CornerBr,
        PathTile::MidLeft,
        PathTile::MidRight,
        PathTile::MidUp,
        PathTile::MidDown,
        PathTile::MidTl,
        PathTile::MidTr,
        PathTile::MidBl,
        PathTile::MidBr,
        PathTile::AntiTl,
        PathTile::AntiTr,
        PathTile::AntiBl,
        PathTile::AntiBr,
        PathTile::FunnelUp,
        PathTile::FunnelDown,
        PathTile::FunnelLeft,
        PathTile::FunnelRight,
        PathTile::EndUp,
        PathTile::EndDown,
        PathTile::EndLeft,
        PathTile::EndRight,
        PathTile::RightTl,
        PathTile::RightBl,
        PathTile::LeftTr,
        PathTile::LeftBr,
        PathTile::UpBl,
        PathTile::UpBr,
        PathTile::DownTl,
        PathTile::DownTr,
    ];

    pub const fn texture_key(self) -> &'static str {
        match self {
            PathTile::Solo => "path-solo",
            PathTile::Mid => "path-mid",
            PathTile::Horizontal => "path-hor",
            PathTile::Vertical => "path-ver",
            PathTile::Four => "path-4",
            PathTile::ThreeUp => "path-3-up",
            PathTile::ThreeDown => "path-3-down",
            PathTile::ThreeLeft => "path-3-left",
            PathTile::ThreeRight => "path-3-right",
            PathTile::CornerTl => "path-tl",
            PathTile::CornerTr => "path-tr",
            PathTile::CornerBl => "path-bl",
            PathTile::CornerBr => "path-br",
            PathTile::MidLeft => "path-mid-left",
            PathTile::MidRight => "path-mid-right",
            PathTile::MidUp => "path-mid-up",
            PathTile::MidDown => "path-mid-down",
            PathTile::MidTl => "path-mid-tl",
            PathTile::MidTr => "path-mid-tr",
            PathTile::MidBl => "path-mid-bl",
            PathTile::MidBr => "path-mid-br",
            PathTile::AntiTl => "path-anti-tl",
            PathTile::AntiTr => "path-anti-tr",
            PathTile::AntiBl => "path-anti-bl",
            PathTile::AntiBr => "path-anti-br",
            PathTile::FunnelUp => "path-funnel-up",
            PathTile::FunnelDown => "path-funnel-down",
            PathTile::FunnelLeft => "path-funnel-left",
            PathTile::FunnelRight => "path-funnel-right",
            PathTile::EndUp => "path-end-up",
            PathTile::EndDown => "path-end-down",
            PathTile::EndLeft => "path-end-left",
            PathTile::EndRight => "path-end-right",
            PathTile::RightTl => "path-right-tl",
            PathTile::RightBl => "path-right-bl",
            PathTile::LeftTr => "path-left-tr",
            PathTile::LeftBr => "path-left-br",
            PathTile::UpBl => "path-up-bl",
            PathTile::UpBr => "path-up-br",
            PathTile::DownTl => "path-down-tl",
            PathTile::DownTr => "path-down-tr",
        }
    }
}

const UP: u8 = 1 << 0;
const RIGHT: u8 = 1 << 1;
const DOWN: u8 = 1 << 2;
const LEFT: u8 = 1 << 3;
const TOP_LEFT: u8 = 1 << 4;
const TOP_RIGHT: u8 = 1 << 5;
const BOTTOM_RIGHT: u8 = 1 << 6;
const BOTTOM_LEFT: u8 = 1 << 7;

/// Path state of the eight cells around a path cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Neighborhood {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub top_left: bool,
    pub top_right: bool,
    pub bottom_left: bool,
    pub bottom_right: bool,
}

impl Neighborhood {
    pub fn around<F>(cell: GridCell, mut is_path: F) -> Self
    where
        F: FnMut(GridCell) -> bool,
    {
        Self {
            up: is_path(cell.offset(0, -1)),
            down: is_path(cell.offset(0, 1)),
            left: is_path(cell.offset(-1, 0)),
            right: is_path(cell.offset(1, 0)),
            top_left: is_path(cell.offset(-1, -1)),
            top_right: is_path(cell.offset(1, -1)),
            bottom_left: is_path(cell.offset(-1, 1)),
            bottom_right: is_path(cell.offset(1, 1)),
        }
    }

    /// Neighbors outside the layout count as non-path.
    pub fn in_layout(layout: &LayoutGrid, cell: GridCell) -> Self {
        Self::around(cell, |neighbor| layout.is(neighbor, LayoutCode::Path))
    }

    /// Packs the neighborhood into one byte: sides in the low nibble
    /// (up, right, down, left), corners in the high nibble (tl, tr, br, bl).
    pub fn signature(&self) -> u8 {
        [
            (self.up, UP),
            (self.right, RIGHT),
            (self.down, DOWN),
            (self.left, LEFT),
            (self.top_left, TOP_LEFT),
            (self.top_right, TOP_RIGHT),
            (self.bottom_right, BOTTOM_RIGHT),
            (self.bottom_left, BOTTOM_LEFT),
        ]
        .iter()
        .filter(|(present, _)| *present)
        .fold(0, |bits, (_, bit)| bits | bit)
    }

    pub fn from_signature(signature: u8) -> Self {
        let has = |bit: u8| signature & bit != 0;
        Self {
            up: has(UP),
            down: has(DOWN),
            left: has(LEFT),
            right: has(RIGHT),
            top_left: has(TOP_LEFT),
            top_right: has(TOP_RIGHT),
            bottom_left: has(BOTTOM_LEFT),
            bottom_right: has(BOTTOM_RIGHT),
        }
    }

    fn all_sides(&self) -> bool {
        self.up && self.down && self.left && self.right
    }

    fn any_sides(&self) -> bool {
        self.up || self.down || self.left || self.right
    }

    fn all_corners(&self) -> bool {
        self.top_left && self.top_right && self.bottom_left && self.bottom_right
    }

    fn any_corners(&self) -> bool {
        self.top_left || self.top_right || self.bottom_left || self.bottom_right
    }
}

/// Renders as `sides/corners`, e.g. `U.D./tl..bl`.
impl fmt::Display for Neighborhood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = |present: bool, label: &'static str| if present { label } else { "." };
        write!(
            f,
            "{}{}{}{}/{}{}{}{}",
            mark(self.up, "U"),
            mark(self.right, "R"),
            mark(self.down, "D"),
            mark(self.left, "L"),
            mark(self.top_left, "tl"),
            mark(self.top_right, "tr"),
            mark(self.bottom_right, "br"),
            mark(self.bottom_left, "bl"),
        )
    }
}

/// Picks the tile for a path cell, or `None` when no rule matches.
///
/// A cell with no orthogonal path neighbor is always solo, even when a
/// diagonal neighbor is a path.
pub fn resolve(n: &Neighborhood) -> Option<PathTile> {
    if !n.any_sides() {
        return Some(PathTile::Solo);
    }
    if n.all_sides() && n.all_corners() {
        return Some(PathTile::Mid);
    }
    if !n.up && !n.down && n.left && n.right {
        return Some(PathTile::Horizontal);
    }
    if !n.left && !n.right && n.up && n.down {
        return Some(PathTile::Vertical);
    }
    match (n.up, n.right) {
        (true, true) => resolve_up_right(n),
        (true, false) => resolve_up_only(n),
        (false, true) => resolve_right_only(n),
        (false, false) => resolve_left_or_down(n),
    }
}

fn resolve_up_right(n: &Neighborhood) -> Option<PathTile> {
    let (left, down) = (n.left, n.down);
    let (tl, tr, bl, br) = (n.top_left, n.top_right, n.bottom_left, n.bottom_right);
    let all_sides = n.all_sides();

    let tile = if left && !down && !tr && !tl {
        PathTile::ThreeUp
    } else if !left && down && !tr && !br {
        PathTile::ThreeRight
    } else if !left && down && tr && br {
        PathTile::MidLeft
    } else if left && !down && tr && tl {
        PathTile::MidDown
    } else if !left && !down && !bl && tr {
        PathTile::MidBl
    } else if all_sides && tl && tr && br && !bl {
        PathTile::AntiBl
    } else if all_sides && tl && tr && !br && bl {
        PathTile::AntiBr
    } else if all_sides && !tl && tr && br && bl {
        PathTile::AntiTl
    } else if all_sides && tl && !tr && br && bl {
        PathTile::AntiTr
    } else if all_sides && !tl && !tr && br && bl {
        PathTile::FunnelUp
    } else if all_sides && tl && tr && !br && !bl {
        PathTile::FunnelDown
    } else if all_sides && tl && !tr && !br && bl {
        PathTile::FunnelRight
    } else if all_sides && !tl && tr && br && !bl {
        PathTile::FunnelLeft
    } else if all_sides && !n.any_corners() {
        PathTile::Four
    } else if !left && !down && !bl {
        PathTile::CornerBl
    } else if !tr && !left && down && br {
        PathTile::LeftTr
    } else if tr && !left && down && !br {
        PathTile::LeftBr
    } else if !tr && left && !down && tl {
        PathTile::DownTr
    } else if tr && left && !down && !tl {
        PathTile::DownTl
    } else {
        return None;
    };
    Some(tile)
}

fn resolve_up_only(n: &Neighborhood) -> Option<PathTile> {
    let (left, down) = (n.left, n.down);
    let (tl, bl, br) = (n.top_left, n.bottom_left, n.bottom_right);

    let tile = if left && down && !tl && !bl {
        PathTile::ThreeLeft
    } else if left && !down && !tl {
        PathTile::CornerBr
    } else if left && down && bl && tl {
        PathTile::MidRight
    } else if left && !down && tl && !br {
        PathTile::MidBr
    } else if !left && !down {
        PathTile::EndDown
    } else if !tl && left && down && bl {
        PathTile::RightTl
    } else if tl && left && down && !bl {
        PathTile::RightBl
    } else {
        return None;
    };
    Some(tile)
}

fn resolve_right_only(n: &Neighborhood) -> Option<PathTile> {
    let (left, down) = (n.left, n.down);
    let (tl, bl, br) = (n.top_left, n.bottom_left, n.bottom_right);

    let tile = if left && down && !br && !bl {
        PathTile::ThreeDown
    } else if !left && down && !br {
        PathTile::CornerTl
    } else if left && down && bl && br {
        PathTile::MidUp
    } else if !left && down && !tl && br {
        PathTile::MidTl
    } else if !down && !left {
        PathTile::EndLeft
    } else if bl && left && down && !br {
        PathTile::UpBr
    } else if !bl && left && down && br {
        PathTile::UpBl
    } else {
        return None;
    };
    Some(tile)
}

fn resolve_left_or_down(n: &Neighborhood) -> Option<PathTile> {
    let (left, down) = (n.left, n.down);
    let (tr, bl) = (n.top_right, n.bottom_left);

    let tile = if left && down && !bl {
        PathTile::CornerTr
    } else if left && down && bl && !tr {
        PathTile::MidTr
    } else if !left && down {
        PathTile::EndUp
    } else if left && !down {
        PathTile::EndRight
    } else {
        return None;
    };
    Some(tile)
}

/// Every neighborhood signature that resolves to no tile, ascending.
pub fn unmatched_signatures() -> Vec<u8> {
    (0..=u8::MAX)
        .filter(|signature| resolve(&Neighborhood::from_signature(*signature)).is_none())
        .collect()
}
