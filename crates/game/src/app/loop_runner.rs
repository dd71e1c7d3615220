use std::process::ExitCode;

use controller::run_app;
use tracing::error;

use super::bootstrap::AppWiring;
use super::sandbox::SandboxSimulation;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    if let Err(err) = run_app(app.config, SandboxSimulation::new) {
        error!(error = %err, "startup_failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
