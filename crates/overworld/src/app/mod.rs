pub mod bootstrap;
pub mod gameplay;
pub mod loop_runner;
