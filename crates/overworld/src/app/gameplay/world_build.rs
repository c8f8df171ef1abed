//! Turns a layout into sprites, a collision grid and entrance markers.
//!
//! Planning is pure so tools can inspect a layout without an engine; building
//! replays the plan against [`EngineBindings`].

use engine::{EngineBindings, SpriteAnchor, SpriteDesc};
use tracing::{info, warn};

use super::autotile::{resolve, Neighborhood, PathTile};
use super::collision::{CellRect, CollisionGrid, EnterableGrid};
use super::config::WorldConfig;
use super::grid::{GridCell, GridError, GridMapper, PlayableBounds};
use super::layout::{LayoutCode, LayoutGrid};
use super::movement::WorldContext;

pub const BACKGROUND_DEPTH: i32 = -10;
pub const PATH_DEPTH: i32 = 0;
pub const DECORATION_DEPTH: i32 = 1;
pub const HOUSE_DEPTH: i32 = 2;
pub const CHARACTER_DEPTH: i32 = 3;

/// Entrance code written below the door of a house of the first kind.
pub const HOUSE_ENTRANCE_CODE: u16 = 1;

const TREE_FOOTPRINT: (u32, u32) = (2, 2);
const HOUSE_FOOTPRINT: (u32, u32) = (3, 2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementKind {
    /// Centered on one cell.
    Cell,
    /// Top-left corner flush with the cell's top-left corner.
    Footprint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub texture: &'static str,
    pub cell: GridCell,
    pub kind: PlacementKind,
    pub depth: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnmatchedPath {
    pub cell: GridCell,
    pub neighborhood: Neighborhood,
}

#[derive(Debug, Clone)]
pub struct WorldPlan {
    pub placements: Vec<Placement>,
    pub path_tiles: Vec<(GridCell, PathTile)>,
    pub unmatched_paths: Vec<UnmatchedPath>,
    pub collision: CollisionGrid,
    pub enterable: EnterableGrid,
}

impl WorldPlan {
    fn empty(dimension: u32) -> Self {
        Self {
            placements: Vec::new(),
            path_tiles: Vec::new(),
            unmatched_paths: Vec::new(),
            collision: CollisionGrid::new(dimension),
            enterable: EnterableGrid::new(dimension),
        }
    }

    fn place(&mut self, texture: &'static str, cell: GridCell, kind: PlacementKind, depth: i32) {
        self.placements.push(Placement {
            texture,
            cell,
            kind,
            depth,
        });
    }
}

pub fn plan_world(layout: &LayoutGrid) -> WorldPlan {
    let mut plan = WorldPlan::empty(layout.dimension());
    plan_paths(layout, &mut plan);
    plan_trees_and_flowerbeds(layout, &mut plan);
    plan_decorations_and_houses(layout, &mut plan);
    plan
}

fn plan_paths(layout: &LayoutGrid, plan: &mut WorldPlan) {
    for (cell, _) in layout.cells() {
        if !layout.is(cell, LayoutCode::Path) {
            continue;
        }
        let neighborhood = Neighborhood::in_layout(layout, cell);
        match resolve(&neighborhood) {
            Some(tile) => {
                plan.path_tiles.push((cell, tile));
                plan.place(tile.texture_key(), cell, PlacementKind::Cell, PATH_DEPTH);
            }
            None => plan.unmatched_paths.push(UnmatchedPath { cell, neighborhood }),
        }
    }
}

/// Trees and flowerbeds are authored on the odd sub-lattice and cover 2x2
/// cells; only trees block.
fn plan_trees_and_flowerbeds(layout: &LayoutGrid, plan: &mut WorldPlan) {
    let dimension = layout.dimension() as i32;
    for col in (1..dimension - 1).step_by(2) {
        for row in (1..dimension - 1).step_by(2) {
            let cell = GridCell::new(col, row);
            match layout.code(cell) {
                Some(LayoutCode::Tree) => {
                    plan.place("tree", cell, PlacementKind::Footprint, DECORATION_DEPTH);
                    let (width, height) = TREE_FOOTPRINT;
                    plan.collision
                        .mark_blocked(CellRect::new(cell, width, height), true);
                }
                Some(LayoutCode::Flowerbed) => {
                    plan.place("flowerbed", cell, PlacementKind::Footprint, DECORATION_DEPTH);
                }
                _ => {}
            }
        }
    }
}

/// A house is drawn once, from the top-left cell of its run of codes.
fn is_house_anchor(layout: &LayoutGrid, cell: GridCell, code: LayoutCode) -> bool {
    !layout.is(cell.offset(0, -1), code) && !layout.is(cell.offset(-1, 0), code)
}

fn plan_decorations_and_houses(layout: &LayoutGrid, plan: &mut WorldPlan) {
    for (cell, _) in layout.cells() {
        let Some(code) = layout.code(cell) else {
            continue;
        };
        if let Some(texture) = code.decoration_texture() {
            plan.place(texture, cell, PlacementKind::Cell, DECORATION_DEPTH);
            continue;
        }
        let texture = match code {
            LayoutCode::HouseA => "house-1",
            LayoutCode::HouseB => "house-2",
            _ => continue,
        };
        if !is_house_anchor(layout, cell, code) {
            continue;
        }
        plan.place(texture, cell, PlacementKind::Footprint, HOUSE_DEPTH);
        let (width, height) = HOUSE_FOOTPRINT;
        plan.collision
            .mark_blocked(CellRect::new(cell, width, height), true);
        if code == LayoutCode::HouseA {
            plan.enterable
                .set(cell.offset(1, height as i32), HOUSE_ENTRANCE_CODE);
        }
    }
}

/// Everything movement needs once the world is on screen. Read-only after
/// build.
#[derive(Debug, Clone)]
pub struct World {
    pub mapper: GridMapper,
    pub layout: LayoutGrid,
    pub collision: CollisionGrid,
    pub enterable: EnterableGrid,
    pub bounds: Option<PlayableBounds>,
}

impl World {
    pub fn context(&self) -> WorldContext<'_> {
        WorldContext::new(&self.mapper)
            .with_collision(&self.collision)
            .with_bounds(self.bounds)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorldBuildReport {
    pub sprites: usize,
    pub path_tiles: usize,
    pub unmatched_paths: usize,
    pub blocked_cells: usize,
    pub entrances: usize,
}

pub fn build_world<B: EngineBindings + ?Sized>(
    config: &WorldConfig,
    layout: LayoutGrid,
    bindings: &mut B,
) -> Result<(World, WorldBuildReport), GridError> {
    let mapper = GridMapper::for_background(
        config.viewport_px.as_f32(),
        config.background_px.as_f32(),
        config.dimension,
    )?;
    if layout.dimension() != mapper.dimension() {
        return Err(GridError::DimensionMismatch {
            name: "layout",
            expected: mapper.dimension(),
            actual: layout.dimension(),
        });
    }

    bindings.create_sprite(
        SpriteDesc::new(config.background_texture.clone(), mapper.origin())
            .with_depth(BACKGROUND_DEPTH),
    );
    let plan = plan_world(&layout);
    for unmatched in &plan.unmatched_paths {
        warn!(
            col = unmatched.cell.col,
            row = unmatched.cell.row,
            signature = unmatched.neighborhood.signature(),
            neighborhood = %unmatched.neighborhood,
            "autotile_unmatched"
        );
    }
    for placement in &plan.placements {
        let desc = match placement.kind {
            PlacementKind::Cell => SpriteDesc::new(placement.texture, mapper.cell_center(placement.cell)),
            PlacementKind::Footprint => SpriteDesc::new(placement.texture, mapper.to_world(placement.cell))
                .with_anchor(SpriteAnchor::TopLeft),
        };
        bindings.create_sprite(desc.with_depth(placement.depth));
    }

    let bounds = config.enforce_pixel_bounds.then(|| {
        PlayableBounds::for_background(
            mapper.origin(),
            config.background_px.as_f32(),
            config.viewport_px.as_f32(),
        )
    });
    let report = WorldBuildReport {
        sprites: plan.placements.len() + 1,
        path_tiles: plan.path_tiles.len(),
        unmatched_paths: plan.unmatched_paths.len(),
        blocked_cells: plan.collision.blocked_count(),
        entrances: plan.enterable.entrances().count(),
    };
    info!(
        dimension = mapper.dimension(),
        sprites = report.sprites,
        path_tiles = report.path_tiles,
        unmatched_paths = report.unmatched_paths,
        blocked_cells = report.blocked_cells,
        entrances = report.entrances,
        "world_built"
    );

    let world = World {
        mapper,
        layout,
        collision: plan.collision,
        enterable: plan.enterable,
        bounds,
    };
    Ok((world, report))
}
