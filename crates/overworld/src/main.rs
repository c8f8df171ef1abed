use std::process::ExitCode;

use overworld::app::loop_runner;
use overworld::{build_app, init_tracing};
use tracing::error;

fn main() -> ExitCode {
    init_tracing();
    match build_app() {
        Ok(app) => loop_runner::run(app),
        Err(err) => {
            error!(error = %err, "startup_failed");
            ExitCode::FAILURE
        }
    }
}
