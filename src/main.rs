mod catalog;
mod chat;
mod cli;
mod config;
mod deploy;
mod error;
mod generator;
mod metadata;
mod repl;
mod server;
mod transcript;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::catalog::Catalog;
use crate::chat::Orchestrator;
use crate::cli::{Cli, Command, join_request};
use crate::config::Settings;
use crate::deploy::{DeploymentSimulator, Entropy, SeededEntropy, ThreadEntropy};
use crate::generator::Generator;
use crate::server::ToolGeneratorServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // stdout belongs to the chat and to the MCP stdio transport
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.command.default_log_level().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings_path = cli.settings.clone().unwrap_or_else(Settings::default_path);

    if let Command::Config = cli.command {
        let path = settings_path.clone();
        tokio::task::spawn_blocking(move || repl::edit_settings(&path)).await??;
        return Ok(());
    }
    if let Command::Version = cli.command {
        println!("{}", metadata::banner());
        println!("{}", metadata::PKG_DESCRIPTION);
        return Ok(());
    }

    let mut settings = Settings::load(&settings_path)?;
    cli.overrides.apply(&mut settings);
    settings.validate()?;
    tracing::debug!(?settings, path = %settings_path.display(), "settings resolved");

    let entropy: Arc<dyn Entropy> = match cli.overrides.seed {
        Some(seed) => Arc::new(SeededEntropy::new(seed)),
        None => Arc::new(ThreadEntropy),
    };
    let generator = Generator::new(Arc::new(Catalog::builtin()));
    let deployer = DeploymentSimulator::new(&settings, entropy);

    match cli.command {
        Command::Chat(args) => {
            let orchestrator = Arc::new(Orchestrator::new(generator, deployer));
            repl::run(orchestrator.clone()).await?;
            if let Some(path) = args.transcript {
                transcript::export(path, orchestrator.history()).await?;
            }
        }
        Command::Generate(args) => {
            let tool = generator.generate(&join_request(&args.request))?;
            let json = server::tool_to_json(&tool, args.with_source);
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        Command::Build(args) => {
            let orchestrator = Orchestrator::new(generator, deployer);
            repl::run_turn(&orchestrator, &join_request(&args.request)).await?;
            if let Some(path) = args.transcript {
                transcript::export(path, orchestrator.history()).await?;
            }
        }
        Command::Templates => repl::print_templates(generator.catalog()),
        Command::Serve => server::run(ToolGeneratorServer::new(generator, deployer)).await?,
        Command::Config | Command::Version => {}
    }

    Ok(())
}
