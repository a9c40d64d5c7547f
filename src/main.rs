use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cli;

use cli::config_cmd::ConfigArgs;
use cli::guide::GuideArgs;
use cli::prompt::PromptArgs;
use cli::templates::TemplatesCommand;
use cli::tokens::TokensCommand;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("CONTRIBGUIDE_BUILD_TARGET"),
    ", built ",
    env!("CONTRIBGUIDE_BUILD_DATE"),
    ")"
);

#[derive(Parser)]
#[command(
    name = "contribguide",
    version,
    long_version = LONG_VERSION,
    about = "Find open source projects that match your stack, with LLM culture analysis"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend projects and generate culture analysis and contribution guidelines
    Guide(GuideArgs),
    /// Print the budgeted culture analysis prompt for a README
    Prompt(PromptArgs),
    /// Count or truncate text in model tokens
    Tokens {
        #[command(subcommand)]
        command: TokensCommand,
    },
    /// Inspect prompt templates
    Templates {
        #[command(subcommand)]
        command: TemplatesCommand,
    },
    /// Manage configuration (.contribguide.json)
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Guide(args)) => cli::guide::run(args).await,
        Some(Commands::Prompt(args)) => cli::prompt::run(args).await,
        Some(Commands::Tokens { command }) => cli::tokens::run(command),
        Some(Commands::Templates { command }) => cli::templates::run(command),
        Some(Commands::Config(args)) => cli::config_cmd::run(args),
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}
