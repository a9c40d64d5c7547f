use serde::Serialize;
use thiserror::Error;

use crate::budget::{BudgetError, PromptBudgetManager};
use crate::model::{ModelError, TextModel};
use crate::search::{GitHubClient, ProjectRecord, SearchError};

#[derive(Debug, Error)]
pub enum GuideError {
    #[error(transparent)]
    Budget(#[from] BudgetError),

    #[error("model call failed: {0}")]
    Model(#[from] ModelError),
}

#[derive(Debug, Clone, Serialize)]
pub struct GuideRequest {
    pub tech_stack: String,
    pub interests: String,
    pub hours_per_week: u8,
}

/// Outcome of one generated section. A failure is kept per project so the
/// other projects still get their analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "text", rename_all = "lowercase")]
pub enum Section {
    Generated(String),
    Failed(String),
}

impl<E: std::fmt::Display> From<Result<String, E>> for Section {
    fn from(result: Result<String, E>) -> Self {
        match result {
            Ok(text) => Section::Generated(text),
            Err(e) => Section::Failed(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectGuide {
    pub project: ProjectRecord,
    pub culture_analysis: Section,
    pub contribution_guidelines: Section,
}

#[derive(Debug, Clone, Serialize)]
pub struct GuideReport {
    pub request: GuideRequest,
    pub projects: Vec<ProjectGuide>,
}

/// Recommendation, culture analysis and guidelines for one user query.
pub struct Guide<M> {
    manager: PromptBudgetManager<M>,
    search: GitHubClient,
    hard_token_ceiling: usize,
}

impl<M: TextModel> Guide<M> {
    pub fn new(
        manager: PromptBudgetManager<M>,
        search: GitHubClient,
        hard_token_ceiling: usize,
    ) -> Self {
        Self {
            manager,
            search,
            hard_token_ceiling,
        }
    }

    pub async fn run(&self, request: GuideRequest) -> Result<GuideReport, SearchError> {
        let recommended = self
            .search
            .recommend(&request.tech_stack, &request.interests)
            .await?;

        let mut projects = Vec::with_capacity(recommended.len());
        for project in recommended {
            tracing::info!(repo = %project.name, "analyzing project");
            let culture_analysis = self.analyze_culture(&project).await.into();
            let contribution_guidelines = self.contribution_guidelines(&project.name).await.into();
            projects.push(ProjectGuide {
                project,
                culture_analysis,
                contribution_guidelines,
            });
        }

        Ok(GuideReport { request, projects })
    }

    pub async fn analyze_culture(&self, project: &ProjectRecord) -> Result<String, GuideError> {
        let prompt = self
            .manager
            .bounded_analysis_prompt(&project.name, &project.readme, self.hard_token_ceiling)
            .await?;
        Ok(self.manager.model().complete(&prompt).await?)
    }

    pub async fn contribution_guidelines(&self, repo_name: &str) -> Result<String, GuideError> {
        let prompt = self
            .manager
            .bounded_guidelines_prompt(repo_name, self.hard_token_ceiling)?;
        Ok(self.manager.model().complete(&prompt).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_from_result() {
        let ok: Result<String, ModelError> = Ok("fine".into());
        assert_eq!(Section::from(ok), Section::Generated("fine".into()));

        let err: Result<String, ModelError> = Err(ModelError::Malformed("no content".into()));
        assert_eq!(
            Section::from(err),
            Section::Failed("malformed response: no content".into())
        );
    }

    #[test]
    fn test_section_serializes_tagged() {
        let json = serde_json::to_value(Section::Generated("x".into())).unwrap();
        assert_eq!(json, serde_json::json!({"status": "generated", "text": "x"}));
    }
}
