use std::time::Duration;

use engine::{
    EngineBindings, InputAction, InputSnapshot, MusicDeck, Scene, SceneCommand, SceneEntry,
    SceneKey, SceneWorld,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info, warn};

use super::config::{CharacterConfig, WorldConfig, DEFAULT_EXIT_SPAWN};
use super::grid::{GridCell, GridMapper};
use super::layout::LayoutGrid;
use super::movement::StepController;
use super::npc::NpcController;
use super::player::PlayerController;
use super::proximity::apply_proximity;
use super::world_build::{build_world, World, WorldBuildReport};

struct Overworld {
    world: World,
    report: WorldBuildReport,
    player: PlayerController,
    npcs: Vec<NpcController>,
    hud: GridCell,
}

/// The walkable world: one player, wandering NPCs, music and house entrances.
///
/// Every load rebuilds the world from the configured layout.
pub struct OverworldScene {
    config: WorldConfig,
    layout: LayoutGrid,
    rng: StdRng,
    active: Option<Overworld>,
}

impl OverworldScene {
    pub fn new(config: WorldConfig, layout: LayoutGrid) -> Self {
        let rng = match config.wander_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            layout,
            rng,
            active: None,
        }
    }

    pub fn player_cell(&self) -> Option<GridCell> {
        self.active
            .as_ref()
            .map(|overworld| overworld.player.body().cell())
    }

    pub fn npc_cells(&self) -> Vec<GridCell> {
        self.active
            .as_ref()
            .map(|overworld| overworld.npcs.iter().map(|npc| npc.body().cell()).collect())
            .unwrap_or_default()
    }

    pub fn world(&self) -> Option<&World> {
        self.active.as_ref().map(|overworld| &overworld.world)
    }

    pub fn build_report(&self) -> Option<&WorldBuildReport> {
        self.active.as_ref().map(|overworld| &overworld.report)
    }

    fn spawn_character(
        world: &mut SceneWorld,
        mapper: &GridMapper,
        character: &CharacterConfig,
        cell: GridCell,
    ) -> Option<StepController> {
        match StepController::spawn(
            world,
            mapper,
            &character.name,
            cell,
            character.facing,
            character.step_delay(),
        ) {
            Ok(controller) => Some(controller),
            Err(err) => {
                error!(entity = %character.name, error = %err, "character_spawn_failed");
                None
            }
        }
    }

    fn build(&self, world: &mut SceneWorld, entry: SceneEntry) -> Option<Overworld> {
        let (built, report) = match build_world(&self.config, self.layout.clone(), world) {
            Ok(result) => result,
            Err(err) => {
                error!(error = %err, "world_build_failed");
                return None;
            }
        };

        let spawn = entry
            .spawn
            .map(GridCell::from)
            .unwrap_or(self.config.player.spawn);
        if built.collision.is_blocked(spawn) {
            warn!(col = spawn.col, row = spawn.row, "player_spawn_blocked");
        }
        let player = PlayerController::new(Self::spawn_character(
            world,
            &built.mapper,
            &self.config.player,
            spawn,
        )?);
        let npcs = self
            .config
            .npcs
            .iter()
            .filter_map(|npc| Self::spawn_character(world, &built.mapper, npc, npc.spawn))
            .map(NpcController::new)
            .collect::<Vec<_>>();

        if let Some(position) = world.sprite_position(player.body().sprite()) {
            world.camera_mut().position = position;
        }
        world.camera_mut().start_follow(player.body().sprite());
        *world.music_mut() = MusicDeck::new(self.config.playlist.clone());
        world.music_mut().play();

        Some(Overworld {
            world: built,
            report,
            player,
            npcs,
            hud: spawn,
        })
    }
}

impl Scene for OverworldScene {
    fn load(&mut self, world: &mut SceneWorld, entry: SceneEntry) {
        self.active = self.build(world, entry);
        if let Some(overworld) = &self.active {
            info!(
                col = overworld.hud.col,
                row = overworld.hud.row,
                npcs = overworld.npcs.len(),
                "overworld_loaded"
            );
        }
    }

    fn update(
        &mut self,
        fixed_dt: Duration,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        let Some(Overworld {
            world: built,
            player,
            npcs,
            hud,
            ..
        }) = self.active.as_mut()
        else {
            return SceneCommand::None;
        };
        let ctx = built.context();

        player.tick_step(fixed_dt, &ctx, world);
        for npc in npcs.iter_mut() {
            npc.tick_step(fixed_dt, &ctx, world);
        }

        *hud = player.body().cell();

        for npc in npcs.iter_mut() {
            apply_proximity(player, npc, input, &built.mapper, world);
            npc.wander(fixed_dt, &mut self.rng, &ctx, world);
        }

        player.handle_press_edges(input, &ctx, world);
        player.handle_sustained(fixed_dt, input, &ctx, world);

        let zoom_steps =
            i32::from(input.is_down(InputAction::ZoomIn)) - i32::from(input.is_down(InputAction::ZoomOut));
        if zoom_steps != 0 {
            world.camera_mut().nudge_zoom(zoom_steps);
        }

        if input.just_pressed(InputAction::ToggleMusic) {
            world.music_mut().toggle_pause();
        }
        if input.just_pressed(InputAction::NextTrack) {
            world.music_mut().next_track();
        }

        if !input.just_pressed(InputAction::Confirm) {
            return SceneCommand::None;
        }
        let cell = player.body().cell();
        let Some(code) = built.enterable.code_at(cell) else {
            return SceneCommand::None;
        };
        let exit = self.config.exit_spawn_for(code).unwrap_or_else(|| {
            warn!(code, "entrance_exit_unconfigured");
            DEFAULT_EXIT_SPAWN
        });
        world.music_mut().pause();
        info!(code, col = cell.col, row = cell.row, "entrance_used");
        SceneCommand::SwitchTo {
            scene: SceneKey::Home,
            entry: SceneEntry::at(exit.into()),
        }
    }

    fn unload(&mut self, _world: &mut SceneWorld) {
        self.active = None;
        info!("overworld_unloaded");
    }

    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        let overworld = self.active.as_ref()?;
        Some(format!(
            "Overworld  X: {}  Y: {}",
            overworld.hud.col, overworld.hud.row
        ))
    }
}
