use anyhow::Result;
use clap::Subcommand;

use super::style;

#[derive(Subcommand)]
pub enum TemplatesCommand {
    /// List available prompt templates
    List,
    /// Print a template and its placeholders
    Show { name: String },
}

pub fn run(command: TemplatesCommand) -> Result<()> {
    let config = super::load_config(None)?;
    let store = super::template_store(&config);

    match command {
        TemplatesCommand::List => {
            if let Some(dir) = store.dir() {
                println!("{}", style::info(&format!("Overrides: {}", dir.display())));
            }
            for name in store.names() {
                let placeholders = store
                    .load(&name)
                    .map(|t| t.placeholders().join(", "))
                    .unwrap_or_else(|e| style::error(&e.to_string()));
                println!("  {}  [{}]", style::heading(&name), placeholders);
            }
        }
        TemplatesCommand::Show { name } => {
            let template = store.load(&name)?;
            println!(
                "{}\n",
                style::info(&format!("placeholders: {}", template.placeholders().join(", ")))
            );
            print!("{}", template.content());
        }
    }
    Ok(())
}
