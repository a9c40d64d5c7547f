use std::fmt::Write;

use crate::guide::{GuideReport, Section};

pub struct MarkdownReport;

impl MarkdownReport {
    pub fn render(report: &GuideReport) -> String {
        let mut out = String::new();
        let req = &report.request;

        let _ = writeln!(out, "# Open Source Contribution Guide\n");
        let _ = writeln!(out, "- **Technology stack:** {}", req.tech_stack);
        let _ = writeln!(out, "- **Interests:** {}", req.interests);
        let _ = writeln!(out, "- **Available time:** {} hours/week\n", req.hours_per_week);

        if report.projects.is_empty() {
            let _ = writeln!(out, "No projects found. Try different inputs.");
            return out;
        }

        let _ = writeln!(out, "## Recommended Projects\n");
        for (idx, guide) in report.projects.iter().enumerate() {
            let p = &guide.project;
            let _ = writeln!(out, "{}. **[{}]({})** ★ {} · forks {}", idx + 1, p.name, p.url, p.stars, p.forks);
            let _ = writeln!(out, "   {}", p.description);
        }
        out.push('\n');

        let _ = writeln!(out, "## Project Culture Analysis\n");
        for guide in &report.projects {
            let _ = writeln!(out, "### {}\n", guide.project.name);
            push_section(&mut out, &guide.culture_analysis);
        }

        let _ = writeln!(out, "## Contribution Guidelines\n");
        for guide in &report.projects {
            let _ = writeln!(out, "### Guidelines for {}\n", guide.project.name);
            push_section(&mut out, &guide.contribution_guidelines);
        }

        out
    }
}

fn push_section(out: &mut String, section: &Section) {
    match section {
        Section::Generated(text) => {
            let _ = writeln!(out, "{}\n", text.trim_end());
        }
        Section::Failed(err) => {
            let _ = writeln!(out, "> _Not available: {err}_\n");
        }
    }
}
