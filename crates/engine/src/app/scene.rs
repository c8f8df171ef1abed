use std::time::Duration;

use super::input::{ActionStates, InputAction, KeyState};
use super::world::SceneWorld;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneKey {
    Home,
    Overworld,
}

/// A grid cell handed to a scene on entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpawnCell {
    pub col: i32,
    pub row: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneEntry {
    pub spawn: Option<SpawnCell>,
}

impl SceneEntry {
    pub fn at(spawn: SpawnCell) -> Self {
        Self { spawn: Some(spawn) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    /// Tears the active scene down and starts `scene` fresh with `entry`.
    SwitchTo { scene: SceneKey, entry: SceneEntry },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
    left_click_pressed: bool,
    window_width: u32,
    window_height: u32,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(
        quit_requested: bool,
        actions: ActionStates,
        left_click_pressed: bool,
        window_width: u32,
        window_height: u32,
    ) -> Self {
        Self {
            quit_requested,
            actions,
            left_click_pressed,
            window_width,
            window_height,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn just_pressed(&self, action: InputAction) -> bool {
        self.actions.key_state(action).just_pressed
    }

    pub fn key_state(&self, action: InputAction) -> KeyState {
        self.actions.key_state(action)
    }

    /// Marks the action as held without a fresh press edge.
    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self.actions.clear_edges_for(action);
        self
    }

    /// Marks the action as pressed this tick (and therefore held).
    pub fn with_action_pressed(mut self, action: InputAction) -> Self {
        self.actions.force_pressed(action);
        self
    }

    pub fn with_left_click_pressed(mut self, left_click_pressed: bool) -> Self {
        self.left_click_pressed = left_click_pressed;
        self
    }

    pub fn with_window_size(mut self, window_size: (u32, u32)) -> Self {
        self.window_width = window_size.0;
        self.window_height = window_size.1;
        self
    }

    pub fn left_click_pressed(&self) -> bool {
        self.left_click_pressed
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }
}

pub trait Scene {
    fn load(&mut self, world: &mut SceneWorld, entry: SceneEntry);
    fn update(
        &mut self,
        fixed_dt: Duration,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand;
    fn unload(&mut self, world: &mut SceneWorld);
    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        None
    }
}

struct SceneRuntime {
    scene: Box<dyn Scene>,
    world: SceneWorld,
    is_loaded: bool,
}

impl SceneRuntime {
    fn new(scene: Box<dyn Scene>) -> Self {
        Self {
            scene,
            world: SceneWorld::default(),
            is_loaded: false,
        }
    }

    fn start(&mut self, entry: SceneEntry) {
        self.stop();
        let (scene, world) = (&mut self.scene, &mut self.world);
        scene.load(world, entry);
        self.is_loaded = true;
    }

    fn stop(&mut self) {
        if self.is_loaded {
            let (scene, world) = (&mut self.scene, &mut self.world);
            scene.unload(world);
            self.is_loaded = false;
        }
        self.world.clear();
    }
}

pub(crate) struct SceneMachine {
    home: SceneRuntime,
    overworld: SceneRuntime,
    active_scene: SceneKey,
}

impl SceneMachine {
    pub(crate) fn new(
        home: Box<dyn Scene>,
        overworld: Box<dyn Scene>,
        active_scene: SceneKey,
    ) -> Self {
        Self {
            home: SceneRuntime::new(home),
            overworld: SceneRuntime::new(overworld),
            active_scene,
        }
    }

    pub(crate) fn active_scene(&self) -> SceneKey {
        self.active_scene
    }

    pub(crate) fn load_active(&mut self, entry: SceneEntry) {
        if self.active_runtime_ref().is_loaded {
            return;
        }
        self.active_runtime_mut().start(entry);
    }

    pub(crate) fn update_active(&mut self, fixed_dt: Duration, input: &InputSnapshot) -> SceneCommand {
        let runtime = self.active_runtime_mut();
        let (scene, world) = (&mut runtime.scene, &mut runtime.world);
        let command = scene.update(fixed_dt, input, world);
        world.advance(fixed_dt);
        command
    }

    pub(crate) fn active_world(&self) -> &SceneWorld {
        &self.active_runtime_ref().world
    }

    pub(crate) fn debug_title_active(&self) -> Option<String> {
        let runtime = self.active_runtime_ref();
        runtime.scene.debug_title(&runtime.world)
    }

    /// Stops the active scene and restarts `next_scene` with `entry`, even when
    /// it is already active.
    pub(crate) fn switch_to(&mut self, next_scene: SceneKey, entry: SceneEntry) {
        self.active_runtime_mut().stop();
        self.active_scene = next_scene;
        self.active_runtime_mut().start(entry);
    }

    pub(crate) fn shutdown_all(&mut self) {
        self.home.stop();
        self.overworld.stop();
    }

    fn active_runtime_mut(&mut self) -> &mut SceneRuntime {
        match self.active_scene {
            SceneKey::Home => &mut self.home,
            SceneKey::Overworld => &mut self.overworld,
        }
    }

    fn active_runtime_ref(&self) -> &SceneRuntime {
        match self.active_scene {
            SceneKey::Home => &self.home,
            SceneKey::Overworld => &self.overworld,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::app::{EngineBindings, SpriteDesc, Vec2};

    type EventLog = Rc<RefCell<Vec<String>>>;

    struct RecordingScene {
        name: &'static str,
        log: EventLog,
        on_update: SceneCommand,
    }

    impl Scene for RecordingScene {
        fn load(&mut self, world: &mut SceneWorld, entry: SceneEntry) {
            world.create_sprite(SpriteDesc::new(self.name, Vec2::default()));
            self.log
                .borrow_mut()
                .push(format!("{}:load:{:?}", self.name, entry.spawn));
        }

        fn update(
            &mut self,
            _fixed_dt: Duration,
            _input: &InputSnapshot,
            _world: &mut SceneWorld,
        ) -> SceneCommand {
            self.on_update
        }

        fn unload(&mut self, _world: &mut SceneWorld) {
            self.log.borrow_mut().push(format!("{}:unload", self.name));
        }
    }

    fn machine(log: &EventLog, overworld_command: SceneCommand) -> SceneMachine {
        SceneMachine::new(
            Box::new(RecordingScene {
                name: "home",
                log: Rc::clone(log),
                on_update: SceneCommand::None,
            }),
            Box::new(RecordingScene {
                name: "overworld",
                log: Rc::clone(log),
                on_update: overworld_command,
            }),
            SceneKey::Overworld,
        )
    }

    #[test]
    fn load_active_is_idempotent() {
        let log = EventLog::default();
        let mut scenes = machine(&log, SceneCommand::None);
        scenes.load_active(SceneEntry::default());
        scenes.load_active(SceneEntry::default());
        assert_eq!(*log.borrow(), vec!["overworld:load:None".to_string()]);
        assert_eq!(scenes.active_world().sprite_count(), 1);
    }

    #[test]
    fn switch_unloads_source_and_passes_spawn_to_destination() {
        let log = EventLog::default();
        let mut scenes = machine(&log, SceneCommand::None);
        scenes.load_active(SceneEntry::default());

        let spawn = SpawnCell { col: 21, row: 13 };
        scenes.switch_to(SceneKey::Home, SceneEntry::at(spawn));

        assert_eq!(scenes.active_scene(), SceneKey::Home);
        assert_eq!(
            *log.borrow(),
            vec![
                "overworld:load:None".to_string(),
                "overworld:unload".to_string(),
                format!("home:load:{:?}", Some(spawn)),
            ]
        );
    }

    #[test]
    fn switching_to_same_scene_restarts_it_with_a_clean_world() {
        let log = EventLog::default();
        let mut scenes = machine(&log, SceneCommand::None);
        scenes.load_active(SceneEntry::default());
        scenes.switch_to(SceneKey::Overworld, SceneEntry::default());

        assert_eq!(log.borrow().len(), 3);
        assert_eq!(scenes.active_world().sprite_count(), 1);
    }

    #[test]
    fn update_returns_scene_command() {
        let log = EventLog::default();
        let command = SceneCommand::SwitchTo {
            scene: SceneKey::Home,
            entry: SceneEntry::default(),
        };
        let mut scenes = machine(&log, command);
        scenes.load_active(SceneEntry::default());
        assert_eq!(
            scenes.update_active(Duration::from_millis(16), &InputSnapshot::empty()),
            command
        );
    }

    #[test]
    fn shutdown_unloads_loaded_scenes_only() {
        let log = EventLog::default();
        let mut scenes = machine(&log, SceneCommand::None);
        scenes.load_active(SceneEntry::default());
        scenes.shutdown_all();
        assert_eq!(
            log.borrow().last().map(String::as_str),
            Some("overworld:unload")
        );
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn snapshot_builders_set_edges_and_holds() {
        let held = InputSnapshot::empty().with_action_down(InputAction::MoveUp, true);
        assert!(held.is_down(InputAction::MoveUp));
        assert!(!held.just_pressed(InputAction::MoveUp));

        let pressed = InputSnapshot::empty().with_action_pressed(InputAction::Confirm);
        assert_eq!(
            pressed.key_state(InputAction::Confirm),
            KeyState {
                just_pressed: true,
                is_down: true
            }
        );
    }
}
