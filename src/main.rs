//! cllama - CLI wrapper for llama.cpp with Hugging Face integration

use anyhow::Result;
use clap::{Parser, Subcommand};
use cllama::backend::BinaryKind;
use cllama::cli::{GlobalArgs, LaunchCommand, bootstrap, init_logging};
use cllama::commands::{self, PullArgs, ResolveArgs};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "cllama")]
#[command(about = "CLI wrapper for llama.cpp with Hugging Face integration", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Update llama.cpp builds by running the update script
    Update,

    /// Pull a model from Hugging Face and add it to the llama-swap config
    Pull {
        /// Repository ID (e.g., user/repo or user/repo:quant)
        model: String,

        /// Quantization pattern (e.g., Q4_K_M)
        #[arg(short, long)]
        quant: Option<String>,

        /// Do not update the llama-swap config
        #[arg(long)]
        no_swap: bool,
    },

    /// Run llama-server with a Hugging Face model
    Run(LaunchCommand),

    /// Run llama-cli with a Hugging Face model
    Cli(LaunchCommand),

    /// Show which local files a model reference resolves to
    Resolve {
        /// Repository ID (e.g., user/repo or user/repo:quant)
        model: String,

        /// Quantization pattern (e.g., Q4_K_M)
        #[arg(short, long)]
        quant: Option<String>,

        /// Only look on disk, never download
        #[arg(long)]
        offline: bool,
    },
}

async fn run(global: &GlobalArgs, command: Command) -> Result<i32> {
    let app = bootstrap(global)?;

    match command {
        Command::Update => commands::update(&app).await,
        Command::Pull {
            model,
            quant,
            no_swap,
        } => {
            commands::pull(
                &app,
                &PullArgs {
                    model,
                    quant,
                    no_swap,
                },
            )
            .await
        }
        Command::Run(launch) => commands::launch(&app, BinaryKind::Server, &launch.into()).await,
        Command::Cli(launch) => commands::launch(&app, BinaryKind::Cli, &launch.into()).await,
        Command::Resolve {
            model,
            quant,
            offline,
        } => {
            let report = commands::resolve(
                &app,
                &ResolveArgs {
                    model,
                    quant,
                    offline,
                },
            )
            .await?;
            print!("{}", report.render());
            Ok(0)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let Cli { global, command } = Cli::parse();
    init_logging(&global.log_level, &global.log_format);

    match run(&global, command).await {
        Ok(code) => ExitCode::from(code.clamp(0, 255) as u8),
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
