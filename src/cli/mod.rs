pub mod config_cmd;
pub mod guide;
pub mod prompt;
pub mod style;
pub mod templates;
pub mod tokens;

use anyhow::{Context, Result};
use std::io::Read;
use std::path::{Path, PathBuf};

use contribguide::budget::{PromptBudgetManager, Tokenizer};
use contribguide::config::Config;
use contribguide::model::OpenAiChatModel;
use contribguide::prompts::TemplateStore;

/// Loads config for the current directory, or `dir` when given.
pub fn load_config(dir: Option<&Path>) -> Result<Config> {
    let dir = match dir {
        Some(d) => d.to_path_buf(),
        None => std::env::current_dir()?,
    };
    Config::load(&dir).with_context(|| format!("loading config for {}", dir.display()))
}

pub fn template_store(config: &Config) -> TemplateStore {
    match &config.templates.dir {
        Some(dir) => TemplateStore::with_dir(dir),
        None => TemplateStore::builtin(),
    }
}

pub fn build_manager(config: &Config) -> Result<PromptBudgetManager<OpenAiChatModel>> {
    let model = OpenAiChatModel::from_config(&config.model)?;
    let tokenizer = Tokenizer::cl100k().context("loading tokenizer")?;
    Ok(PromptBudgetManager::new(model, template_store(config), tokenizer)
        .with_limits(config.budget.limits()))
}

/// Reads a file, or stdin when no path is given. Bytes are returned as-is so
/// encoding problems surface from the tokenizer.
pub fn read_input(path: Option<&PathBuf>) -> Result<Vec<u8>> {
    match path {
        Some(p) => std::fs::read(p).with_context(|| format!("reading {}", p.display())),
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf).context("reading stdin")?;
            Ok(buf)
        }
    }
}
