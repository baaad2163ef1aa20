//! CLI entrypoint for the quadratic tutor.

use anyhow::{bail, Context, Result};
use clap::Parser;
use quadratic_tutor::{
    Cli, ConfigLoader, ConsoleFormatter, InteractionController, TutorRepl,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // RUST_LOG wins over -v when set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if cli.show_config {
        println!("{}", ConfigLoader::describe_sources(cli.config.as_deref()));
        return Ok(());
    }

    let mut config = if cli.no_config {
        ConfigLoader::load_without_files()
    } else {
        ConfigLoader::load(cli.config.as_deref())
    }
    .context("failed to load configuration")?;

    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    if cli.no_graph {
        config.show_graph = false;
    }
    if cli.no_readability {
        config.show_readability = false;
    }
    info!(?config, "configuration loaded");

    let api_key = cli.api_key.clone().or_else(|| config.api_key.clone());
    let mut controller =
        InteractionController::new(config.session_settings(), config.display_options());

    let Some(category) = cli.category else {
        let mut repl = TutorRepl::new(controller, cli.output);
        repl.run(api_key).await?;
        return Ok(());
    };

    let Some(api_key) = api_key else {
        bail!("An API key is required. Pass --api-key or set GEMINI_API_KEY.");
    };
    controller.supply_credential(&api_key)?;

    let report = controller.generate(category, !cli.no_graph).await?;
    println!("{}", ConsoleFormatter::format(&report, cli.output)?);

    Ok(())
}
