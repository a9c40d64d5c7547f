use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::PathBuf;

use super::style;
use contribguide::budget::{BudgetError, BudgetedText, ENCODING_NAME, Tokenizer, truncate};

#[derive(Subcommand)]
pub enum TokensCommand {
    /// Count tokens in a file (or stdin)
    Count {
        file: Option<PathBuf>,
        /// Print the token ids as well
        #[arg(long)]
        ids: bool,
    },
    /// Keep the first N tokens of a file (or stdin), marking the cut
    Truncate {
        file: Option<PathBuf>,
        /// Token budget
        #[arg(short, long)]
        max: usize,
        /// Count the truncation marker against the budget
        #[arg(long)]
        strict: bool,
    },
}

pub fn run(command: TokensCommand) -> Result<()> {
    let tokenizer = Tokenizer::cl100k().context("loading tokenizer")?;
    match command {
        TokensCommand::Count { file, ids } => {
            let bytes = super::read_input(file.as_ref())?;
            let tokens = tokenizer.encode_bytes(&bytes)?;
            println!("{} tokens ({ENCODING_NAME})", tokens.len());
            if ids {
                let joined: Vec<String> = tokens.iter().map(u32::to_string).collect();
                println!("{}", joined.join(" "));
            }
        }
        TokensCommand::Truncate { file, max, strict } => {
            let bytes = super::read_input(file.as_ref())?;
            let text = std::str::from_utf8(&bytes).map_err(BudgetError::from)?;
            if strict {
                let fitted = BudgetedText::fit(&tokenizer, text, max);
                eprintln!(
                    "{}",
                    style::info(&format!("{}/{} tokens", fitted.token_count(), fitted.max_tokens()))
                );
                print!("{}", fitted.into_text());
            } else {
                print!("{}", truncate(&tokenizer, text, max));
            }
        }
    }
    Ok(())
}
