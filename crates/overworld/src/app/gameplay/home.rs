use std::time::Duration;

use engine::{
    EngineBindings, InputAction, InputSnapshot, Scene, SceneCommand, SceneEntry, SceneKey,
    SceneWorld, SpriteDesc, Vec2,
};
use tracing::info;

use super::config::DEFAULT_EXIT_SPAWN;
use super::grid::GridCell;
use super::world_build::BACKGROUND_DEPTH;

/// Splash screen between visits to the overworld. Confirm or a click sends
/// the player back out at the cell it was entered with.
pub struct HomeScene {
    background_texture: String,
    next_spawn: GridCell,
}

impl HomeScene {
    pub fn new(background_texture: impl Into<String>) -> Self {
        Self {
            background_texture: background_texture.into(),
            next_spawn: DEFAULT_EXIT_SPAWN,
        }
    }
}

impl Scene for HomeScene {
    fn load(&mut self, world: &mut SceneWorld, entry: SceneEntry) {
        self.next_spawn = entry.spawn.map(GridCell::from).unwrap_or(DEFAULT_EXIT_SPAWN);
        world.create_sprite(
            SpriteDesc::new(self.background_texture.clone(), Vec2::default())
                .with_depth(BACKGROUND_DEPTH),
        );
        info!(
            spawn_col = self.next_spawn.col,
            spawn_row = self.next_spawn.row,
            "home_loaded"
        );
    }

    fn update(
        &mut self,
        _fixed_dt: Duration,
        input: &InputSnapshot,
        _world: &mut SceneWorld,
    ) -> SceneCommand {
        if input.just_pressed(InputAction::Confirm) || input.left_click_pressed() {
            return SceneCommand::SwitchTo {
                scene: SceneKey::Overworld,
                entry: SceneEntry::at(self.next_spawn.into()),
            };
        }
        SceneCommand::None
    }

    fn unload(&mut self, _world: &mut SceneWorld) {
        info!("home_unloaded");
    }

    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        Some("Home  (Enter or click to explore)".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::SpawnCell;

    const TICK: Duration = Duration::from_millis(16);

    #[test]
    fn idle_input_stays_home() {
        let mut scene = HomeScene::new("background");
        let mut world = SceneWorld::default();
        scene.load(&mut world, SceneEntry::default());
        assert_eq!(world.sprite_count(), 1);
        assert_eq!(
            scene.update(TICK, &InputSnapshot::empty(), &mut world),
            SceneCommand::None
        );
    }

    #[test]
    fn click_without_entry_spawn_uses_default_exit() {
        let mut scene = HomeScene::new("background");
        let mut world = SceneWorld::default();
        scene.load(&mut world, SceneEntry::default());
        let command = scene.update(
            TICK,
            &InputSnapshot::empty().with_left_click_pressed(true),
            &mut world,
        );
        assert_eq!(
            command,
            SceneCommand::SwitchTo {
                scene: SceneKey::Overworld,
                entry: SceneEntry::at(SpawnCell { col: 21, row: 13 }),
            }
        );
    }

    #[test]
    fn confirm_carries_entry_spawn_back_out() {
        let mut scene = HomeScene::new("background");
        let mut world = SceneWorld::default();
        scene.load(&mut world, SceneEntry::at(SpawnCell { col: 6, row: 8 }));
        let command = scene.update(
            TICK,
            &InputSnapshot::empty().with_action_pressed(InputAction::Confirm),
            &mut world,
        );
        assert_eq!(
            command,
            SceneCommand::SwitchTo {
                scene: SceneKey::Overworld,
                entry: SceneEntry::at(SpawnCell { col: 6, row: 8 }),
            }
        );
    }
}
