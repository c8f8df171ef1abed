use std::path::Path;

use engine::{resolve_app_paths, LoopConfig, Scene, StartupError};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::gameplay::{
    self, load_layout, load_world_config, ConfigError, GridError, GridMapper, LayoutError,
    WORLD_CONFIG_FILE,
};

pub struct AppWiring {
    pub config: LoopConfig,
    pub home: Box<dyn Scene>,
    pub overworld: Box<dyn Scene>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Paths(#[from] StartupError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Grid(#[from] GridError),
}

pub fn build_app() -> Result<AppWiring, BootstrapError> {
    info!("=== Overworld Startup ===");
    let paths = resolve_app_paths()?;
    build_app_in(&paths.assets_dir)
}

/// Loads `world.json` and the layout it names from `asset_root` and wires
/// both scenes. Any failure here is fatal.
pub fn build_app_in(asset_root: &Path) -> Result<AppWiring, BootstrapError> {
    let world_config = load_world_config(&asset_root.join(WORLD_CONFIG_FILE))?;
    let layout = load_layout(
        &world_config.layout_path_in(asset_root),
        world_config.dimension,
    )?;
    GridMapper::for_background(
        world_config.viewport_px.as_f32(),
        world_config.background_px.as_f32(),
        world_config.dimension,
    )?;

    let config = LoopConfig {
        window_width: world_config.viewport_px.width,
        window_height: world_config.viewport_px.height,
        asset_root: asset_root.to_path_buf(),
        ..LoopConfig::default()
    };
    info!(
        asset_root = %asset_root.display(),
        dimension = world_config.dimension,
        "app_wired"
    );
    let (home, overworld) = gameplay::build_scene_pair(world_config, layout);

    Ok(AppWiring {
        config,
        home,
        overworld,
    })
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn zero_layout(dimension: usize) -> String {
        vec![vec!["0"; dimension].join(","); dimension].join("\n")
    }

    #[test]
    fn wires_scenes_from_asset_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join(WORLD_CONFIG_FILE),
            r#"{ "dimension": 4, "player": { "name": "player", "spawn": { "col": 1, "row": 1 }, "step_delay_ms": 200 }, "npcs": [], "entrances": [] }"#,
        )
        .expect("write config");
        fs::write(dir.path().join("layout.csv"), zero_layout(4)).expect("write layout");

        let app = build_app_in(dir.path()).expect("app");
        assert_eq!(app.config.asset_root, dir.path());
        assert_eq!((app.config.window_width, app.config.window_height), (1280, 720));
    }

    #[test]
    fn missing_layout_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let error = build_app_in(dir.path()).err().expect("missing layout");
        assert!(matches!(error, BootstrapError::Layout(LayoutError::Read { .. })));
    }

    #[test]
    fn layout_of_wrong_size_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("layout.csv"), zero_layout(3)).expect("write layout");
        let error = build_app_in(dir.path()).err().expect("wrong size");
        assert!(matches!(
            error,
            BootstrapError::Layout(LayoutError::RowCount { expected: 80, actual: 3 })
        ));
    }

    #[test]
    fn malformed_config_is_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join(WORLD_CONFIG_FILE), "{ not json").expect("write config");
        let error = build_app_in(dir.path()).err().expect("bad config");
        assert!(matches!(error, BootstrapError::Config(ConfigError::Parse { .. })));
    }
}
