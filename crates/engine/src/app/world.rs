use std::collections::HashMap;
use std::time::Duration;

use tracing::warn;

use super::audio::MusicDeck;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

pub const CAMERA_ZOOM_DEFAULT: f32 = 1.0;
pub const CAMERA_ZOOM_MIN: f32 = 0.1;
pub const CAMERA_ZOOM_MAX: f32 = 2.0;
pub const CAMERA_ZOOM_STEP: f32 = 0.03;

#[derive(Debug, Clone, Copy)]
pub struct Camera2D {
    pub position: Vec2,
    pub zoom: f32,
    pub(crate) follow: Option<SpriteHandle>,
}

impl Default for Camera2D {
    fn default() -> Self {
        Self {
            position: Vec2::default(),
            zoom: CAMERA_ZOOM_DEFAULT,
            follow: None,
        }
    }
}

impl Camera2D {
    pub fn effective_zoom(&self) -> f32 {
        clamp_camera_zoom(self.zoom)
    }

    pub fn set_zoom_clamped(&mut self, zoom: f32) {
        self.zoom = clamp_camera_zoom(zoom);
    }

    /// Moves zoom by `steps` increments of [`CAMERA_ZOOM_STEP`].
    pub fn nudge_zoom(&mut self, steps: i32) {
        if steps == 0 {
            return;
        }
        self.set_zoom_clamped(self.zoom + steps as f32 * CAMERA_ZOOM_STEP);
    }

    pub fn start_follow(&mut self, sprite: SpriteHandle) {
        self.follow = Some(sprite);
    }

    pub fn following(&self) -> Option<SpriteHandle> {
        self.follow
    }
}

fn clamp_camera_zoom(zoom: f32) -> f32 {
    if !zoom.is_finite() {
        return CAMERA_ZOOM_DEFAULT;
    }
    zoom.clamp(CAMERA_ZOOM_MIN, CAMERA_ZOOM_MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TweenId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Which point of the image sits at the sprite position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SpriteAnchor {
    #[default]
    Center,
    TopLeft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetLayout {
    pub columns: u32,
    pub rows: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpriteDesc {
    pub texture: String,
    pub position: Vec2,
    pub depth: i32,
    pub anchor: SpriteAnchor,
    pub sheet: Option<SheetLayout>,
}

impl SpriteDesc {
    pub fn new(texture: impl Into<String>, position: Vec2) -> Self {
        Self {
            texture: texture.into(),
            position,
            depth: 0,
            anchor: SpriteAnchor::Center,
            sheet: None,
        }
    }

    pub fn with_depth(mut self, depth: i32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_anchor(mut self, anchor: SpriteAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_sheet(mut self, sheet: SheetLayout) -> Self {
        self.sheet = Some(sheet);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub texture: String,
    pub frames: Vec<u32>,
    pub frame_rate: f32,
    pub looping: bool,
}

#[derive(Debug, Clone)]
struct AnimationPlayback {
    key: String,
    cursor: usize,
    elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct Sprite {
    texture: String,
    position: Vec2,
    depth: i32,
    anchor: SpriteAnchor,
    sheet: Option<SheetLayout>,
    frame: u32,
    playback: Option<AnimationPlayback>,
}

impl Sprite {
    pub fn texture(&self) -> &str {
        &self.texture
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn anchor(&self) -> SpriteAnchor {
        self.anchor
    }

    pub fn sheet(&self) -> Option<SheetLayout> {
        self.sheet
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn animation_key(&self) -> Option<&str> {
        self.playback.as_ref().map(|playback| playback.key.as_str())
    }
}

#[derive(Debug, Clone)]
struct Tween {
    id: TweenId,
    sprite: SpriteHandle,
    axis: Axis,
    from: f32,
    to: f32,
    duration: Duration,
    elapsed: Duration,
}

/// The sprite-facing half of the engine as seen by scene logic.
///
/// Interpolation, frame stepping and drawing stay on the engine side; callers
/// only issue requests and read back positions.
pub trait EngineBindings {
    fn create_sprite(&mut self, desc: SpriteDesc) -> SpriteHandle;
    fn register_animation(&mut self, key: &str, clip: AnimationClip);
    /// Returns false when the sprite or the animation key is unknown. Playing
    /// the key that is already running keeps its current frame.
    fn play_animation(&mut self, sprite: SpriteHandle, key: &str) -> bool;
    /// Linearly moves one axis of the sprite to `target` over `duration`.
    fn tween_position(
        &mut self,
        sprite: SpriteHandle,
        axis: Axis,
        target: f32,
        duration: Duration,
    ) -> Option<TweenId>;
    fn stop_tween(&mut self, tween: TweenId);
    fn set_sprite_position(&mut self, sprite: SpriteHandle, position: Vec2);
    fn sprite_position(&self, sprite: SpriteHandle) -> Option<Vec2>;
}

#[derive(Debug, Default)]
pub struct SceneWorld {
    sprites: Vec<Sprite>,
    tweens: Vec<Tween>,
    next_tween_id: u64,
    animations: HashMap<String, AnimationClip>,
    camera: Camera2D,
    music: MusicDeck,
}

impl SceneWorld {
    pub fn clear(&mut self) {
        self.sprites.clear();
        self.tweens.clear();
        self.next_tween_id = 0;
        self.animations.clear();
        self.camera = Camera2D::default();
        self.music = MusicDeck::default();
    }

    /// Runs tweens and animation frames forward, then re-centers a following
    /// camera.
    pub fn advance(&mut self, dt: Duration) {
        for tween in &mut self.tweens {
            tween.elapsed = tween.elapsed.saturating_add(dt).min(tween.duration);
            let progress = if tween.duration.is_zero() {
                1.0
            } else {
                tween.elapsed.as_secs_f32() / tween.duration.as_secs_f32()
            };
            let value = tween.from + (tween.to - tween.from) * progress;
            if let Some(sprite) = self.sprites.get_mut(tween.sprite.0 as usize) {
                match tween.axis {
                    Axis::X => sprite.position.x = value,
                    Axis::Y => sprite.position.y = value,
                }
            }
        }
        self.tweens.retain(|tween| tween.elapsed < tween.duration);

        for sprite in &mut self.sprites {
            let Some(playback) = sprite.playback.as_mut() else {
                continue;
            };
            let Some(clip) = self.animations.get(&playback.key) else {
                continue;
            };
            step_playback(playback, clip, dt);
            if let Some(frame) = clip.frames.get(playback.cursor) {
                sprite.frame = *frame;
            }
        }

        if let Some(target) = self.camera.follow {
            if let Some(sprite) = self.sprites.get(target.0 as usize) {
                self.camera.position = sprite.position;
            }
        }
    }

    pub fn sprite(&self, handle: SpriteHandle) -> Option<&Sprite> {
        self.sprites.get(handle.0 as usize)
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    pub fn sprite_count(&self) -> usize {
        self.sprites.len()
    }

    /// Indices into [`SceneWorld::sprites`] ordered back to front. Equal depths
    /// keep creation order.
    pub fn draw_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.sprites.len()).collect();
        order.sort_by_key(|index| self.sprites[*index].depth);
        order
    }

    pub fn has_animation(&self, key: &str) -> bool {
        self.animations.contains_key(key)
    }

    pub fn active_tween_count(&self) -> usize {
        self.tweens.len()
    }

    pub fn is_tween_active(&self, tween: TweenId) -> bool {
        self.tweens.iter().any(|candidate| candidate.id == tween)
    }

    pub fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera2D {
        &mut self.camera
    }

    pub fn music(&self) -> &MusicDeck {
        &self.music
    }

    pub fn music_mut(&mut self) -> &mut MusicDeck {
        &mut self.music
    }
}

fn step_playback(playback: &mut AnimationPlayback, clip: &AnimationClip, dt: Duration) {
    if clip.frames.len() < 2 || !clip.frame_rate.is_finite() || clip.frame_rate <= 0.0 {
        return;
    }
    let frame_time = Duration::from_secs_f32(1.0 / clip.frame_rate);
    playback.elapsed = playback.elapsed.saturating_add(dt);
    while playback.elapsed >= frame_time {
        playback.elapsed -= frame_time;
        if playback.cursor + 1 < clip.frames.len() {
            playback.cursor += 1;
        } else if clip.looping {
            playback.cursor = 0;
        }
    }
}

impl EngineBindings for SceneWorld {
    fn create_sprite(&mut self, desc: SpriteDesc) -> SpriteHandle {
        let handle = SpriteHandle(self.sprites.len() as u64);
        self.sprites.push(Sprite {
            texture: desc.texture,
            position: desc.position,
            depth: desc.depth,
            anchor: desc.anchor,
            sheet: desc.sheet,
            frame: 0,
            playback: None,
        });
        handle
    }

    fn register_animation(&mut self, key: &str, clip: AnimationClip) {
        self.animations.insert(key.to_string(), clip);
    }

    fn play_animation(&mut self, sprite: SpriteHandle, key: &str) -> bool {
        let Some(clip) = self.animations.get(key) else {
            warn!(animation = key, "animation_unknown");
            return false;
        };
        let Some(target) = self.sprites.get_mut(sprite.0 as usize) else {
            return false;
        };
        if target.animation_key() == Some(key) {
            return true;
        }
        target.texture = clip.texture.clone();
        target.frame = clip.frames.first().copied().unwrap_or(0);
        target.playback = Some(AnimationPlayback {
            key: key.to_string(),
            cursor: 0,
            elapsed: Duration::ZERO,
        });
        true
    }

    fn tween_position(
        &mut self,
        sprite: SpriteHandle,
        axis: Axis,
        target: f32,
        duration: Duration,
    ) -> Option<TweenId> {
        let current = self.sprite(sprite)?.position;
        let from = match axis {
            Axis::X => current.x,
            Axis::Y => current.y,
        };
        let id = TweenId(self.next_tween_id);
        self.next_tween_id += 1;
        self.tweens.push(Tween {
            id,
            sprite,
            axis,
            from,
            to: target,
            duration,
            elapsed: Duration::ZERO,
        });
        Some(id)
    }

    fn stop_tween(&mut self, tween: TweenId) {
        self.tweens.retain(|candidate| candidate.id != tween);
    }

    fn set_sprite_position(&mut self, sprite: SpriteHandle, position: Vec2) {
        if let Some(target) = self.sprites.get_mut(sprite.0 as usize) {
            target.position = position;
        }
    }

    fn sprite_position(&self, sprite: SpriteHandle) -> Option<Vec2> {
        self.sprite(sprite).map(Sprite::position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.001
    }

    fn walk_clip() -> AnimationClip {
        AnimationClip {
            texture: "player".to_string(),
            frames: vec![4, 5, 6, 7],
            frame_rate: 10.0,
            looping: true,
        }
    }

    #[test]
    fn zoom_clamps_to_bounds_and_recovers_from_nan() {
        let mut camera = Camera2D::default();
        camera.nudge_zoom(-1_000);
        assert!(approx_eq(camera.zoom, CAMERA_ZOOM_MIN));
        camera.nudge_zoom(1_000);
        assert!(approx_eq(camera.zoom, CAMERA_ZOOM_MAX));
        camera.set_zoom_clamped(f32::NAN);
        assert!(approx_eq(camera.zoom, CAMERA_ZOOM_DEFAULT));
    }

    #[test]
    fn single_zoom_step_moves_by_step_size() {
        let mut camera = Camera2D::default();
        camera.nudge_zoom(1);
        assert!(approx_eq(camera.zoom, 1.0 + CAMERA_ZOOM_STEP));
    }

    #[test]
    fn tween_interpolates_linearly_and_finishes() {
        let mut world = SceneWorld::default();
        let sprite = world.create_sprite(SpriteDesc::new("player", Vec2::new(0.0, 0.0)));
        let tween = world
            .tween_position(sprite, Axis::X, 50.0, Duration::from_millis(200))
            .expect("tween");

        world.advance(Duration::from_millis(100));
        let halfway = world.sprite_position(sprite).expect("position");
        assert!(approx_eq(halfway.x, 25.0));
        assert!(world.is_tween_active(tween));

        world.advance(Duration::from_millis(150));
        let done = world.sprite_position(sprite).expect("position");
        assert!(approx_eq(done.x, 50.0));
        assert!(!world.is_tween_active(tween));
    }

    #[test]
    fn stopped_tween_leaves_sprite_where_it_was() {
        let mut world = SceneWorld::default();
        let sprite = world.create_sprite(SpriteDesc::new("player", Vec2::new(0.0, 10.0)));
        let tween = world
            .tween_position(sprite, Axis::Y, 60.0, Duration::from_millis(100))
            .expect("tween");
        world.advance(Duration::from_millis(50));
        world.stop_tween(tween);
        world.advance(Duration::from_millis(100));

        let position = world.sprite_position(sprite).expect("position");
        assert!(approx_eq(position.y, 35.0));
        assert_eq!(world.active_tween_count(), 0);
    }

    #[test]
    fn tween_on_unknown_sprite_is_rejected() {
        let mut world = SceneWorld::default();
        let stray = {
            let mut other = SceneWorld::default();
            other.create_sprite(SpriteDesc::new("a", Vec2::default()));
            other.create_sprite(SpriteDesc::new("b", Vec2::default()))
        };
        assert!(world
            .tween_position(stray, Axis::X, 1.0, Duration::from_millis(1))
            .is_none());
    }

    #[test]
    fn looping_animation_wraps_frames() {
        let mut world = SceneWorld::default();
        world.register_animation("player-left", walk_clip());
        let sprite = world.create_sprite(SpriteDesc::new("player", Vec2::default()));
        assert!(world.play_animation(sprite, "player-left"));
        assert_eq!(world.sprite(sprite).expect("sprite").frame(), 4);

        world.advance(Duration::from_millis(250));
        assert_eq!(world.sprite(sprite).expect("sprite").frame(), 6);

        world.advance(Duration::from_millis(200));
        assert_eq!(world.sprite(sprite).expect("sprite").frame(), 4);
    }

    #[test]
    fn replaying_current_animation_keeps_its_frame() {
        let mut world = SceneWorld::default();
        world.register_animation("player-left", walk_clip());
        let sprite = world.create_sprite(SpriteDesc::new("player", Vec2::default()));
        world.play_animation(sprite, "player-left");
        world.advance(Duration::from_millis(150));
        world.play_animation(sprite, "player-left");
        assert_eq!(world.sprite(sprite).expect("sprite").frame(), 5);
    }

    #[test]
    fn unknown_animation_key_is_reported() {
        let mut world = SceneWorld::default();
        let sprite = world.create_sprite(SpriteDesc::new("player", Vec2::default()));
        assert!(!world.play_animation(sprite, "player-sideways"));
        assert_eq!(world.sprite(sprite).expect("sprite").animation_key(), None);
    }

    #[test]
    fn camera_follows_target_after_advance() {
        let mut world = SceneWorld::default();
        let sprite = world.create_sprite(SpriteDesc::new("player", Vec2::new(5.0, 7.0)));
        world.camera_mut().start_follow(sprite);
        world.advance(Duration::ZERO);
        assert_eq!(world.camera().position, Vec2::new(5.0, 7.0));
    }

    #[test]
    fn draw_order_sorts_by_depth_and_keeps_creation_order() {
        let mut world = SceneWorld::default();
        world.create_sprite(SpriteDesc::new("player", Vec2::default()).with_depth(2));
        world.create_sprite(SpriteDesc::new("background", Vec2::default()).with_depth(-1));
        world.create_sprite(SpriteDesc::new("path-mid", Vec2::default()));
        world.create_sprite(SpriteDesc::new("path-hor", Vec2::default()));
        assert_eq!(world.draw_order(), vec![1, 2, 3, 0]);
    }

    #[test]
    fn clear_drops_everything() {
        let mut world = SceneWorld::default();
        let sprite = world.create_sprite(SpriteDesc::new("player", Vec2::default()));
        world.register_animation("player-left", walk_clip());
        world.tween_position(sprite, Axis::X, 3.0, Duration::from_millis(10));
        world.camera_mut().nudge_zoom(3);
        world.clear();

        assert_eq!(world.sprite_count(), 0);
        assert_eq!(world.active_tween_count(), 0);
        assert!(!world.has_animation("player-left"));
        assert!(approx_eq(world.camera().zoom, CAMERA_ZOOM_DEFAULT));
    }
}
