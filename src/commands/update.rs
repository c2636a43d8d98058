//! `update`: rebuild llama.cpp backends with the configured update script

use super::App;
use crate::runner::{LaunchSpec, RunOutcome};
use anyhow::Result;

/// Run the update script; a non-zero exit is an error
pub async fn update(app: &App) -> Result<i32> {
    let script = app.config.update_script_path();

    if !script.exists() {
        anyhow::bail!(
            "Update script not found: {:?}. Make sure the base path contains update-llama.cpp.sh",
            script
        );
    }
    if !script.is_file() {
        anyhow::bail!("Update script is not a file: {:?}", script);
    }

    tracing::info!(script = ?script, "Updating llama.cpp builds");

    let spec = LaunchSpec {
        program: script,
        args: Vec::new(),
    };

    match app.runner.run(&spec).await? {
        RunOutcome::Exited(Some(0)) => {
            tracing::info!("Update completed successfully");
            Ok(0)
        }
        RunOutcome::Interrupted => Ok(0),
        RunOutcome::Exited(code) => {
            anyhow::bail!("Update failed with exit code {:?}", code)
        }
    }
}
