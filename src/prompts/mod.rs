pub mod template;

use std::path::{Path, PathBuf};

use crate::budget::BudgetError;

pub use template::PromptTemplate;

pub const SUMMARIZE: &str = "summarize";
pub const CULTURE_ANALYSIS: &str = "culture_analysis";
pub const CONTRIBUTION_GUIDELINES: &str = "contribution_guidelines";

const TEMPLATE_EXTENSION: &str = "txt";

const BUILTIN: &[(&str, &str)] = &[
    (SUMMARIZE, include_str!("../assets/templates/summarize.txt")),
    (
        CULTURE_ANALYSIS,
        include_str!("../assets/templates/culture_analysis.txt"),
    ),
    (
        CONTRIBUTION_GUIDELINES,
        include_str!("../assets/templates/contribution_guidelines.txt"),
    ),
];

/// Where named templates come from.
///
/// Templates are read at call time, never cached. A `<name>.txt` file in the
/// override directory wins over the built-in template of the same name.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    dir: Option<PathBuf>,
}

impl TemplateStore {
    pub fn builtin() -> Self {
        Self { dir: None }
    }

    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn load(&self, name: &str) -> Result<PromptTemplate, BudgetError> {
        if !is_valid_name(name) {
            return Err(BudgetError::TemplateNotFound {
                name: name.to_string(),
                path: None,
            });
        }

        if let Some(dir) = &self.dir {
            let path = dir.join(format!("{name}.{TEMPLATE_EXTENSION}"));
            if path.exists() {
                let content =
                    std::fs::read_to_string(&path).map_err(|e| {
                        tracing::warn!(path = %path.display(), error = %e, "failed to read template");
                        BudgetError::TemplateNotFound {
                            name: name.to_string(),
                            path: Some(path.clone()),
                        }
                    })?;
                tracing::debug!(name, path = %path.display(), "loaded template override");
                return Ok(PromptTemplate::new(name, content));
            }
        }

        BUILTIN
            .iter()
            .find(|(builtin, _)| *builtin == name)
            .map(|(_, content)| PromptTemplate::new(name, *content))
            .ok_or_else(|| BudgetError::TemplateNotFound {
                name: name.to_string(),
                path: self
                    .dir
                    .as_ref()
                    .map(|d| d.join(format!("{name}.{TEMPLATE_EXTENSION}"))),
            })
    }

    /// All template names available, built-ins first, then overrides-only names sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = BUILTIN.iter().map(|(n, _)| n.to_string()).collect();
        let Some(dir) = &self.dir else {
            return names;
        };
        let Ok(entries) = std::fs::read_dir(dir) else {
            return names;
        };

        let mut extra: Vec<String> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == TEMPLATE_EXTENSION))
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .filter(|n| is_valid_name(n) && !names.contains(n))
            .collect();
        extra.sort();
        names.extend(extra);
        names
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
