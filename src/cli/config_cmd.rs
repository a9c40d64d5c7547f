use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

use super::style;
use contribguide::config::{
    CONFIG_FILENAME, Config, ConfigError, GLOBAL_CONFIG_DIR, GLOBAL_CONFIG_FILENAME,
    global_config_path,
};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Create a config template (.contribguide.json locally, or global with --global)
    Init {
        /// Create global config at ~/.config/contribguide/config.json instead of local
        #[arg(long, short)]
        global: bool,
    },
    /// Validate a config file (.contribguide.json locally, or global with --global)
    Validate {
        /// Directory containing .contribguide.json (defaults to current directory)
        #[arg(long)]
        path: Option<PathBuf>,
        /// Validate the global config file instead of a local one
        #[arg(long, short)]
        global: bool,
    },
    /// Show resolved configuration (defaults merged with overrides)
    Show {
        /// Directory containing .contribguide.json (defaults to current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

pub fn run(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommand::Init { global } => {
            let path = if global {
                match global_config_path() {
                    Some(p) => p,
                    None => {
                        println!(
                            "{}",
                            style::error("Could not determine config directory for this platform.")
                        );
                        return Ok(());
                    }
                }
            } else {
                PathBuf::from(CONFIG_FILENAME)
            };
            write_template(&path)
        }
        ConfigCommand::Validate { path, global } => {
            if global {
                report_validation(Config::validate_global(), || {
                    global_config_path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| {
                            format!("<config_dir>/{GLOBAL_CONFIG_DIR}/{GLOBAL_CONFIG_FILENAME}")
                        })
                })
            } else {
                let dir = path.unwrap_or_else(|| PathBuf::from("."));
                report_validation(Config::validate(&dir), || {
                    dir.join(CONFIG_FILENAME).display().to_string()
                })
            }
        }
        ConfigCommand::Show { path } => run_show(path),
    }
}

fn write_template(path: &Path) -> Result<()> {
    if path.exists() {
        println!(
            "{}",
            style::warn(&format!("{} already exists.", path.display()))
        );
        return Ok(());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let template = serde_json::to_string_pretty(&Config::default())?;
    std::fs::write(path, format!("{template}\n"))?;
    println!(
        "{}",
        style::success(&format!("Created {}", path.display()))
    );
    Ok(())
}

fn report_validation(
    result: Result<Config, ConfigError>,
    describe: impl FnOnce() -> String,
) -> Result<()> {
    match result {
        Ok(config) => {
            println!("{}\n", style::success("Valid"));
            print_config_summary(&config);
            Ok(())
        }
        Err(ConfigError::NotFound { .. }) => {
            println!("No config found at {}", describe());
            Ok(())
        }
        Err(e) => {
            println!("{}", style::error(&format!("Error: {e}")));
            Err(anyhow::anyhow!("Config validation failed: {e}"))
        }
    }
}

fn run_show(path: Option<PathBuf>) -> Result<()> {
    let dir = path.unwrap_or_else(|| PathBuf::from("."));

    match global_config_path() {
        Some(p) if p.exists() => println!("Global config: {}", p.display()),
        Some(p) => println!("Global config: {} (not found)", p.display()),
        None => println!("Global config: not available on this platform"),
    }

    let local_path = dir.join(CONFIG_FILENAME);
    if local_path.exists() {
        println!("Local config:  {}", local_path.display());
    } else {
        println!("Local config:  {} (not found)", local_path.display());
    }
    println!();

    let config = Config::load(&dir)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn print_config_summary(config: &Config) {
    println!("Resolved configuration:");
    println!("  model.base_url                  = {}", config.model.base_url);
    println!("  model.model                     = {}", config.model.model);
    println!("  model.api_key_env               = {}", config.model.api_key_env);
    println!(
        "  budget.hard_token_ceiling       = {}",
        config.budget.hard_token_ceiling
    );
    println!(
        "  budget.reserved_response_tokens = {}",
        config.budget.reserved_response_tokens
    );
    println!(
        "  budget.summary_words            = {}",
        config.budget.summary_words
    );
    println!(
        "  budget.summary_token_budget     = {}",
        config.budget.summary_token_budget
    );
    println!(
        "  search.max_results              = {}",
        config.search.max_results
    );
    println!(
        "  templates.dir                   = {}",
        config
            .templates
            .dir
            .as_ref()
            .map_or("(built-in)".to_string(), |d| d.display().to_string())
    );
}
