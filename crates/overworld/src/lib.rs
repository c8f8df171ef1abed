//! Tile-grid overworld: layout loading, autotiled paths, collision, step
//! movement for the player and wandering NPCs, and the two scenes that host
//! them.

pub mod app;

pub use app::bootstrap::{build_app, build_app_in, init_tracing, AppWiring, BootstrapError};
pub use app::gameplay;
