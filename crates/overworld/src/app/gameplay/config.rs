//! World configuration read from `world.json` under the asset root.
//!
//! Every field is optional; a missing file yields [`WorldConfig::default`].

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use engine::{validate_sprite_key, Direction};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use super::grid::GridCell;

pub const WORLD_CONFIG_FILE: &str = "world.json";
pub const DEFAULT_PLAYER_SPAWN: GridCell = GridCell::new(21, 15);
pub const DEFAULT_EXIT_SPAWN: GridCell = GridCell::new(21, 13);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read world config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse world config {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid world config at {field}: {message}")]
    Invalid { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn as_f32(self) -> (f32, f32) {
        (self.width as f32, self.height as f32)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CharacterConfig {
    pub name: String,
    pub spawn: GridCell,
    pub step_delay_ms: u64,
    #[serde(default = "default_facing")]
    pub facing: Direction,
}

impl CharacterConfig {
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }
}

fn default_facing() -> Direction {
    Direction::Down
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntranceConfig {
    pub code: u16,
    pub exit_spawn: GridCell,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    pub dimension: u32,
    pub viewport_px: PixelSize,
    pub background_px: PixelSize,
    pub background_texture: String,
    /// Relative paths resolve against the asset root.
    pub layout_path: PathBuf,
    pub player: CharacterConfig,
    pub npcs: Vec<CharacterConfig>,
    pub playlist: Vec<String>,
    pub entrances: Vec<EntranceConfig>,
    pub enforce_pixel_bounds: bool,
    pub wander_seed: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            dimension: 80,
            viewport_px: PixelSize::new(1280, 720),
            background_px: PixelSize::new(4000, 4000),
            background_texture: "background".to_string(),
            layout_path: PathBuf::from("layout.csv"),
            player: CharacterConfig {
                name: "player".to_string(),
                spawn: DEFAULT_PLAYER_SPAWN,
                step_delay_ms: 200,
                facing: Direction::Down,
            },
            npcs: vec![CharacterConfig {
                name: "player_oldman".to_string(),
                spawn: GridCell::new(38, 38),
                step_delay_ms: 600,
                facing: Direction::Down,
            }],
            playlist: ["intro", "trap", "loser", "from-eden"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            entrances: vec![EntranceConfig {
                code: 1,
                exit_spawn: DEFAULT_EXIT_SPAWN,
            }],
            enforce_pixel_bounds: true,
            wander_seed: None,
        }
    }
}

impl WorldConfig {
    pub fn layout_path_in(&self, asset_root: &Path) -> PathBuf {
        if self.layout_path.is_absolute() {
            self.layout_path.clone()
        } else {
            asset_root.join(&self.layout_path)
        }
    }

    pub fn exit_spawn_for(&self, code: u16) -> Option<GridCell> {
        self.entrances
            .iter()
            .find(|entrance| entrance.code == code)
            .map(|entrance| entrance.exit_spawn)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dimension == 0 {
            return Err(expected_actual("dimension", "positive integer", self.dimension));
        }
        for (field, size) in [
            ("viewport_px", self.viewport_px),
            ("background_px", self.background_px),
        ] {
            if size.width == 0 || size.height == 0 {
                return Err(expected_actual(
                    field,
                    "non-zero width and height",
                    format!("{}x{}", size.width, size.height),
                ));
            }
        }
        validate_sprite_key(&self.background_texture)
            .map_err(|error| invalid("background_texture", error))?;
        self.validate_character("player", &self.player)?;
        for (index, npc) in self.npcs.iter().enumerate() {
            self.validate_character(&format!("npcs[{index}]"), npc)?;
        }
        for (index, track) in self.playlist.iter().enumerate() {
            if track.trim().is_empty() {
                return Err(invalid(&format!("playlist[{index}]"), "track name is empty"));
            }
        }
        for (index, entrance) in self.entrances.iter().enumerate() {
            if entrance.code == 0 {
                return Err(expected_actual(
                    &format!("entrances[{index}].code"),
                    "non-zero code",
                    entrance.code,
                ));
            }
            self.validate_cell(&format!("entrances[{index}].exit_spawn"), entrance.exit_spawn)?;
        }
        Ok(())
    }

    fn validate_character(&self, field: &str, character: &CharacterConfig) -> Result<(), ConfigError> {
        validate_sprite_key(&character.name).map_err(|error| invalid(&format!("{field}.name"), error))?;
        if character.step_delay_ms == 0 {
            return Err(expected_actual(
                &format!("{field}.step_delay_ms"),
                "positive delay",
                character.step_delay_ms,
            ));
        }
        self.validate_cell(&format!("{field}.spawn"), character.spawn)
    }

    fn validate_cell(&self, field: &str, cell: GridCell) -> Result<(), ConfigError> {
        let dimension = self.dimension as i32;
        if (0..dimension).contains(&cell.col) && (0..dimension).contains(&cell.row) {
            return Ok(());
        }
        Err(expected_actual(
            field,
            format!("cell inside 0..{dimension}"),
            format!("({}, {})", cell.col, cell.row),
        ))
    }
}

fn invalid(field: &str, message: impl Display) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        message: message.to_string(),
    }
}

fn expected_actual(field: &str, expected: impl Display, actual: impl Display) -> ConfigError {
    invalid(field, format!("expected {expected}, got {actual}"))
}

pub fn parse_world_config(raw: &str, path: &Path) -> Result<WorldConfig, ConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let config: WorldConfig =
        serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
            let at = error.path().to_string();
            let source = error.into_inner();
            let message = if at.is_empty() || at == "." {
                source.to_string()
            } else {
                format!("at {at}: {source}")
            };
            ConfigError::Parse {
                path: path.to_path_buf(),
                message,
            }
        })?;
    config.validate()?;
    Ok(config)
}

pub fn load_world_config(path: &Path) -> Result<WorldConfig, ConfigError> {
    if !path.exists() {
        info!(path = %path.display(), "world_config_defaulted");
        return Ok(WorldConfig::default());
    }
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_world_config(&raw, path)?;
    info!(
        path = %path.display(),
        dimension = config.dimension,
        npcs = config.npcs.len(),
        "world_config_loaded"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> Result<WorldConfig, ConfigError> {
        parse_world_config(raw, Path::new("world.json"))
    }

    #[test]
    fn defaults_are_valid() {
        WorldConfig::default().validate().expect("valid defaults");
    }

    #[test]
    fn empty_object_yields_defaults() {
        assert_eq!(parse("{}").expect("config"), WorldConfig::default());
    }

    #[test]
    fn partial_config_overrides_named_fields_only() {
        let config = parse(
            r#"{
                "dimension": 40,
                "player": { "name": "player", "spawn": { "col": 3, "row": 4 }, "step_delay_ms": 150 },
                "npcs": [],
                "wander_seed": 9
            }"#,
        )
        .expect("config");
        assert_eq!(config.dimension, 40);
        assert_eq!(config.player.spawn, GridCell::new(3, 4));
        assert_eq!(config.player.facing, Direction::Down);
        assert_eq!(config.player.step_delay(), Duration::from_millis(150));
        assert!(config.npcs.is_empty());
        assert_eq!(config.wander_seed, Some(9));
        assert_eq!(config.playlist.len(), 4);
    }

    #[test]
    fn parse_error_names_the_json_path() {
        let error = parse(r#"{ "player": { "name": "player", "spawn": { "col": "x", "row": 1 }, "step_delay_ms": 1 } }"#)
            .expect_err("bad spawn");
        match error {
            ConfigError::Parse { message, .. } => {
                assert!(message.contains("player.spawn.col"), "{message}");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(matches!(
            parse(r#"{ "dimensions": 80 }"#),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn spawn_outside_grid_is_invalid() {
        let error = parse(r#"{ "dimension": 10 }"#).expect_err("default spawn outside 10x10");
        match error {
            ConfigError::Invalid { field, .. } => assert_eq!(field, "player.spawn"),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn zero_entrance_code_is_invalid() {
        let error = parse(r#"{ "entrances": [{ "code": 0, "exit_spawn": { "col": 1, "row": 1 } }] }"#)
            .expect_err("zero code");
        assert!(matches!(error, ConfigError::Invalid { ref field, .. } if field == "entrances[0].code"));
    }

    #[test]
    fn exit_spawn_lookup_by_code() {
        let config = WorldConfig::default();
        assert_eq!(config.exit_spawn_for(1), Some(DEFAULT_EXIT_SPAWN));
        assert_eq!(config.exit_spawn_for(2), None);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_world_config(&dir.path().join(WORLD_CONFIG_FILE)).expect("config");
        assert_eq!(config, WorldConfig::default());
    }

    #[test]
    fn reads_file_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(WORLD_CONFIG_FILE);
        std::fs::write(&path, r#"{ "enforce_pixel_bounds": false }"#).expect("write");
        let config = load_world_config(&path).expect("config");
        assert!(!config.enforce_pixel_bounds);
        assert_eq!(
            config.layout_path_in(dir.path()),
            dir.path().join("layout.csv")
        );
    }
}
