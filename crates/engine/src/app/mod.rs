mod audio;
mod input;
mod loop_runner;
mod rendering;
mod scene;
mod world;

pub use audio::{MusicDeck, PlaybackState};
pub use input::{InputAction, KeyState};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use rendering::{world_to_screen, Renderer, Viewport, PLACEHOLDER_HALF_SIZE_PX};
pub use scene::{InputSnapshot, Scene, SceneCommand, SceneEntry, SceneKey, SpawnCell};
pub use world::{
    AnimationClip, Axis, Camera2D, EngineBindings, SceneWorld, SheetLayout, Sprite, SpriteAnchor,
    SpriteDesc, SpriteHandle, TweenId, Vec2, CAMERA_ZOOM_DEFAULT, CAMERA_ZOOM_MAX,
    CAMERA_ZOOM_MIN, CAMERA_ZOOM_STEP,
};
