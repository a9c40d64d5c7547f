use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use super::style;
use contribguide::budget::BudgetError;

#[derive(Args)]
pub struct PromptArgs {
    /// Repository name as shown to the model (e.g. "tokio-rs/tokio")
    #[arg(short, long)]
    repo: String,
    /// README file (reads stdin if omitted)
    #[arg(long)]
    readme: Option<PathBuf>,
    /// Token ceiling of the target model (defaults to budget.hard_token_ceiling)
    #[arg(long)]
    ceiling: Option<usize>,
}

/// Prints the budgeted culture analysis prompt without sending it.
pub async fn run(args: PromptArgs) -> Result<()> {
    let config = super::load_config(None)?;
    let manager = super::build_manager(&config)?;
    let ceiling = args.ceiling.unwrap_or(config.budget.hard_token_ceiling);

    let bytes = super::read_input(args.readme.as_ref())?;
    let readme = std::str::from_utf8(&bytes).map_err(BudgetError::from)?;

    let prompt = manager
        .bounded_analysis_prompt(&args.repo, readme, ceiling)
        .await
        .context("building analysis prompt")?;

    let tokens = manager.count_tokens(&prompt);
    let allowed = ceiling.saturating_sub(manager.limits().reserved_response_tokens);
    println!("{prompt}");
    let summary = format!("{tokens} tokens (allowed {allowed} of {ceiling})");
    if tokens > allowed {
        eprintln!("{}", style::warn(&summary));
    } else {
        eprintln!("{}", style::info(&summary));
    }
    Ok(())
}
