use anyhow::{Context, Result, bail};
use clap::{Args, ValueEnum};
use std::path::PathBuf;

use super::style;
use contribguide::guide::{Guide, GuideReport, GuideRequest, Section};
use contribguide::report::MarkdownReport;
use contribguide::search::GitHubClient;

#[derive(Clone, Copy, ValueEnum)]
pub enum ReportFormat {
    Markdown,
    Json,
}

#[derive(Args)]
pub struct GuideArgs {
    /// Technology stack, comma separated (e.g. "Python, JavaScript")
    #[arg(short, long)]
    stack: Option<String>,
    /// Areas of interest (e.g. "web development")
    #[arg(short, long)]
    interests: Option<String>,
    /// Hours per week you can contribute
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u8).range(1..=40))]
    hours: u8,
    /// Write the report to a file instead of printing it
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Report format for --output
    #[arg(long, value_enum, default_value_t = ReportFormat::Markdown)]
    format: ReportFormat,
}

fn prompt_text(label: &str) -> Result<String> {
    dialoguer::Input::<String>::new()
        .with_prompt(label)
        .interact_text()
        .map_err(|_| anyhow::anyhow!("Input cancelled."))
}

pub async fn run(args: GuideArgs) -> Result<()> {
    let stack = match args.stack {
        Some(s) => s,
        None => prompt_text("Technology stack (e.g. Python, JavaScript)")?,
    };
    let interests = match args.interests {
        Some(i) => i,
        None => prompt_text("Areas of interest (e.g. web development, data science)")?,
    };
    if stack.trim().is_empty() || interests.trim().is_empty() {
        bail!("Please provide both your technology stack and areas of interest.");
    }

    let config = super::load_config(None)?;
    let manager = super::build_manager(&config)?;
    let search = GitHubClient::from_config(&config.search);
    let guide = Guide::new(manager, search, config.budget.hard_token_ceiling);

    println!("{}", style::info("Fetching recommended projects..."));
    let report = guide
        .run(GuideRequest {
            tech_stack: stack,
            interests,
            hours_per_week: args.hours,
        })
        .await
        .context("project recommendation failed")?;

    match args.output {
        Some(path) => {
            let body = match args.format {
                ReportFormat::Markdown => MarkdownReport::render(&report),
                ReportFormat::Json => serde_json::to_string_pretty(&report)?,
            };
            std::fs::write(&path, body)
                .with_context(|| format!("writing report to {}", path.display()))?;
            println!(
                "{}",
                style::success(&format!("Report written to {}", path.display()))
            );
        }
        None => print_report(&report),
    }
    Ok(())
}

fn print_report(report: &GuideReport) {
    if report.projects.is_empty() {
        println!("{}", style::warn("No projects found. Please try different inputs."));
        return;
    }

    println!("\n{}\n", style::heading("Project Recommendations"));
    for (idx, guide) in report.projects.iter().enumerate() {
        let p = &guide.project;
        println!("  {}. {} (★ {})", idx + 1, style::heading(&p.name), p.stars);
        println!("     {}", p.description);
        println!("     {}", style::link(&p.url));
    }

    println!("\n{}\n", style::heading("Project Culture Analysis"));
    for guide in &report.projects {
        println!("{}", style::heading(&guide.project.name));
        print_section(&guide.culture_analysis);
    }

    println!("\n{}\n", style::heading("Contribution Guidelines"));
    for guide in &report.projects {
        println!(
            "{}",
            style::heading(&format!("Guidelines for {}", guide.project.name))
        );
        print_section(&guide.contribution_guidelines);
    }
}

fn print_section(section: &Section) {
    match section {
        Section::Generated(text) => println!("{}\n", text.trim_end()),
        Section::Failed(err) => println!("{}\n", style::error(&format!("Not available: {err}"))),
    }
}
