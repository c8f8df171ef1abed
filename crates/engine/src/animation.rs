//! Character animation naming.
//!
//! Character sheets hold 16 frames in a 4x4 grid ordered down (0-3), left (4-7),
//! right (8-11), up (12-15). For an entity named `E` the walk clips are
//! `E-<dir>` and the one-frame poses are `E-still-<dir>`.

use crate::app::{AnimationClip, EngineBindings, SheetLayout};
use crate::sprite_keys::{validate_sprite_key, SpriteKeyError};
use crate::Direction;

pub const CHARACTER_SHEET_COLUMNS: u32 = 4;
pub const CHARACTER_SHEET_ROWS: u32 = 4;
pub const CHARACTER_FRAME_RATE: f32 = 10.0;

pub fn walk_animation_key(entity: &str, direction: Direction) -> String {
    format!("{entity}-{}", direction.as_str())
}

pub fn still_animation_key(entity: &str, direction: Direction) -> String {
    format!("{entity}-still-{}", direction.as_str())
}

const fn first_frame(direction: Direction) -> u32 {
    match direction {
        Direction::Down => 0,
        Direction::Left => 4,
        Direction::Right => 8,
        Direction::Up => 12,
    }
}

pub fn character_sheet() -> SheetLayout {
    SheetLayout {
        columns: CHARACTER_SHEET_COLUMNS,
        rows: CHARACTER_SHEET_ROWS,
    }
}

/// The eight clips of one character, keyed by entity name.
#[derive(Debug, Clone)]
pub struct AnimationSet {
    entity: String,
    texture: String,
}

impl AnimationSet {
    /// The entity name doubles as the texture key of its sprite sheet.
    pub fn for_entity(entity: &str) -> Result<Self, SpriteKeyError> {
        validate_sprite_key(entity)?;
        Ok(Self {
            entity: entity.to_string(),
            texture: entity.to_string(),
        })
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn texture(&self) -> &str {
        &self.texture
    }

    pub fn walk_clip(&self, direction: Direction) -> AnimationClip {
        let start = first_frame(direction);
        AnimationClip {
            texture: self.texture.clone(),
            frames: (start..start + CHARACTER_SHEET_COLUMNS).collect(),
            frame_rate: CHARACTER_FRAME_RATE,
            looping: true,
        }
    }

    pub fn still_clip(&self, direction: Direction) -> AnimationClip {
        AnimationClip {
            texture: self.texture.clone(),
            frames: vec![first_frame(direction)],
            frame_rate: CHARACTER_FRAME_RATE,
            looping: true,
        }
    }

    pub fn register<B: EngineBindings + ?Sized>(&self, bindings: &mut B) {
        for direction in Direction::ALL {
            bindings.register_animation(
                &walk_animation_key(&self.entity, direction),
                self.walk_clip(direction),
            );
            bindings.register_animation(
                &still_animation_key(&self.entity, direction),
                self.still_clip(direction),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::SceneWorld;

    #[test]
    fn keys_follow_entity_dash_direction_convention() {
        assert_eq!(walk_animation_key("player", Direction::Left), "player-left");
        assert_eq!(
            still_animation_key("player_oldman", Direction::Up),
            "player_oldman-still-up"
        );
    }

    #[test]
    fn walk_clips_cover_four_frames_of_their_row() {
        let set = AnimationSet::for_entity("player").expect("set");
        assert_eq!(set.walk_clip(Direction::Down).frames, vec![0, 1, 2, 3]);
        assert_eq!(set.walk_clip(Direction::Left).frames, vec![4, 5, 6, 7]);
        assert_eq!(set.walk_clip(Direction::Right).frames, vec![8, 9, 10, 11]);
        assert_eq!(set.walk_clip(Direction::Up).frames, vec![12, 13, 14, 15]);
    }

    #[test]
    fn still_clips_use_first_frame_of_row() {
        let set = AnimationSet::for_entity("player").expect("set");
        let frames: Vec<u32> = Direction::ALL
            .iter()
            .map(|direction| set.still_clip(*direction).frames[0])
            .collect();
        assert_eq!(frames, vec![12, 0, 4, 8]);
    }

    #[test]
    fn rejects_entity_names_that_are_not_texture_keys() {
        assert!(AnimationSet::for_entity("Old Man").is_err());
        assert!(AnimationSet::for_entity("").is_err());
    }

    #[test]
    fn register_installs_all_eight_clips() {
        let mut world = SceneWorld::default();
        AnimationSet::for_entity("player")
            .expect("set")
            .register(&mut world);
        for direction in Direction::ALL {
            assert!(world.has_animation(&walk_animation_key("player", direction)));
            assert!(world.has_animation(&still_animation_key("player", direction)));
        }
    }
}
