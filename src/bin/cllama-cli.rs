//! cllama-cli - run llama-cli against a HuggingFace model

use anyhow::Result;
use clap::Parser;
use cllama::backend::BinaryKind;
use cllama::cli::{GlobalArgs, LaunchCommand, bootstrap, init_logging};
use cllama::commands::{LaunchArgs, launch};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "cllama-cli")]
#[command(about = "Run llama-cli with a Hugging Face model", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(flatten)]
    launch: LaunchCommand,
}

async fn run(global: &GlobalArgs, args: LaunchArgs) -> Result<i32> {
    let app = bootstrap(global)?;
    launch(&app, BinaryKind::Cli, &args).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let Cli { global, launch } = Cli::parse();
    init_logging(&global.log_level, &global.log_format);

    match run(&global, launch.into()).await {
        Ok(code) => ExitCode::from(code.clamp(0, 255) as u8),
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
