pub mod autotile;
pub mod collision;
pub mod config;
pub mod grid;
pub mod home;
pub mod layout;
pub mod movement;
pub mod npc;
pub mod overworld_scene;
pub mod player;
pub mod proximity;
pub mod timer;
pub mod world_build;

use engine::Scene;

pub use autotile::{resolve, unmatched_signatures, Neighborhood, PathTile};
pub use collision::{CellRect, CollisionGrid, DenseGrid, EnterableGrid};
pub use config::{load_world_config, ConfigError, WorldConfig, WORLD_CONFIG_FILE};
pub use grid::{GridCell, GridError, GridMapper, PlayableBounds};
pub use home::HomeScene;
pub use layout::{load_layout, parse_layout_csv, LayoutCode, LayoutError, LayoutGrid};
pub use movement::{BlockReason, StepController, StepOutcome, StepProgress, WorldContext};
pub use npc::NpcController;
pub use overworld_scene::OverworldScene;
pub use player::{InputQueue, PlayerController};
pub use proximity::{is_adjacent, relative_direction};
pub use timer::RepeatTimer;
pub use world_build::{build_world, plan_world, World, WorldBuildReport, WorldPlan};

/// Returns `(home, overworld)` in the order `run_app` takes them.
pub fn build_scene_pair(config: WorldConfig, layout: LayoutGrid) -> (Box<dyn Scene>, Box<dyn Scene>) {
    let home = HomeScene::new(config.background_texture.clone());
    let overworld = OverworldScene::new(config, layout);
    (Box::new(home), Box::new(overworld))
}
