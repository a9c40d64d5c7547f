//! Keeps prompts inside a model's context window.
//!
//! A README goes through three layers before it reaches a prompt: a model
//! summary, a hard token cut on that summary, and a single corrective
//! re-trim if the rendered prompt still overflows the ceiling.

use std::collections::HashMap;

use super::tokenizer::{TokenIds, Tokenizer};
use super::truncate::{TRUNCATION_MARKER, truncate};
use super::BudgetError;
use crate::model::TextModel;
use crate::prompts::{self, TemplateStore};

/// Token cap on the text embedded in a summarize request, whatever the
/// requested summary length. Sized so request plus a 500-word answer fits a
/// 4k-token model.
pub const SUMMARY_INPUT_CEILING: usize = 3_000;

/// Summary returned for an empty README. The model is not called.
pub const NO_CONTENT_SUMMARY: &str = "No README content available.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetLimits {
    /// Word target for README summaries.
    pub summary_words: usize,
    /// Backstop token cut applied to a summary before it is embedded.
    pub summary_token_budget: usize,
    /// Tokens left free in the context window for the model's answer.
    pub reserved_response_tokens: usize,
}

impl Default for BudgetLimits {
    fn default() -> Self {
        Self {
            summary_words: 500,
            summary_token_budget: 1_000,
            reserved_response_tokens: 1_024,
        }
    }
}

/// Produces prompts that fit a token ceiling.
///
/// Holds no mutable state: the model client, template store and tokenizer are
/// injected by the caller and only read here.
pub struct PromptBudgetManager<M> {
    model: M,
    templates: TemplateStore,
    tokenizer: Tokenizer,
    limits: BudgetLimits,
}

impl<M: TextModel> PromptBudgetManager<M> {
    pub fn new(model: M, templates: TemplateStore, tokenizer: Tokenizer) -> Self {
        Self {
            model,
            templates,
            tokenizer,
            limits: BudgetLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: BudgetLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn limits(&self) -> BudgetLimits {
        self.limits
    }

    pub fn tokenize(&self, text: &str) -> TokenIds {
        self.tokenizer.encode(text)
    }

    pub fn tokenize_bytes(&self, bytes: &[u8]) -> Result<TokenIds, BudgetError> {
        self.tokenizer.encode_bytes(bytes)
    }

    pub fn count_tokens(&self, text: &str) -> usize {
        self.tokenizer.count(text)
    }

    pub fn truncate(&self, text: &str, max_tokens: usize) -> String {
        truncate(&self.tokenizer, text, max_tokens)
    }

    /// Asks the model for a summary of at most `target_words` words.
    ///
    /// The response is returned as-is; its length is not checked. Only the
    /// outbound text is bounded, by [`SUMMARY_INPUT_CEILING`].
    pub async fn summarize(&self, text: &str, target_words: usize) -> Result<String, BudgetError> {
        if text.trim().is_empty() {
            return Ok(NO_CONTENT_SUMMARY.to_string());
        }

        let input = self.truncate(text, SUMMARY_INPUT_CEILING);
        let max_words = target_words.to_string();
        let vars = HashMap::from([("max_words", max_words.as_str()), ("readme", input.as_str())]);
        let prompt = self.render_prompt(prompts::SUMMARIZE, &vars)?;

        tracing::debug!(
            model = self.model.name(),
            input_tokens = self.count_tokens(&input),
            target_words,
            "summarizing"
        );
        self.model
            .complete(&prompt)
            .await
            .map_err(|source| BudgetError::SummarizationFailed {
                text: text.to_string(),
                source,
            })
    }

    /// Renders a named template. Does not enforce any size bound.
    pub fn render_prompt(
        &self,
        template_name: &str,
        variables: &HashMap<&str, &str>,
    ) -> Result<String, BudgetError> {
        self.templates.load(template_name)?.render(variables)
    }

    /// Builds the culture analysis prompt for a repository within
    /// `hard_token_ceiling`, leaving the configured response allowance free.
    ///
    /// At most one corrective pass is made. If the prompt is still too large
    /// after it (a pathologically long `repo_name`, say) the over-budget
    /// prompt is returned and a warning logged.
    pub async fn bounded_analysis_prompt(
        &self,
        repo_name: &str,
        readme_text: &str,
        hard_token_ceiling: usize,
    ) -> Result<String, BudgetError> {
        let summary = self.summarize(readme_text, self.limits.summary_words).await?;
        let summary = self.truncate(&summary, self.limits.summary_token_budget);

        let template = self.templates.load(prompts::CULTURE_ANALYSIS)?;
        let render = |readme: &str| {
            template.render(&HashMap::from([("repo_name", repo_name), ("readme", readme)]))
        };

        let prompt = render(&summary)?;
        let allowed = hard_token_ceiling.saturating_sub(self.limits.reserved_response_tokens);
        let prompt_tokens = self.count_tokens(&prompt);
        if prompt_tokens <= allowed {
            return Ok(prompt);
        }

        // Cut the summary by the overflow, plus room for a fresh marker
        let overflow = prompt_tokens - allowed;
        let summary_tokens = self.count_tokens(&summary);
        let marker_tokens = self.count_tokens(TRUNCATION_MARKER);
        let keep = summary_tokens.saturating_sub(overflow + marker_tokens);
        let trimmed = self.truncate(&summary, keep);
        let prompt = render(&trimmed)?;

        let final_tokens = self.count_tokens(&prompt);
        if final_tokens > allowed {
            tracing::warn!(
                repo = repo_name,
                tokens = final_tokens,
                allowed,
                "prompt still over budget after corrective pass"
            );
        } else {
            tracing::debug!(repo = repo_name, overflow, tokens = final_tokens, "re-trimmed summary");
        }
        Ok(prompt)
    }

    /// Builds the contribution guidelines prompt. It embeds no free text, so
    /// an oversized result is only reported.
    pub fn bounded_guidelines_prompt(
        &self,
        repo_name: &str,
        hard_token_ceiling: usize,
    ) -> Result<String, BudgetError> {
        let prompt = self.render_prompt(
            prompts::CONTRIBUTION_GUIDELINES,
            &HashMap::from([("repo_name", repo_name)]),
        )?;
        let allowed = hard_token_ceiling.saturating_sub(self.limits.reserved_response_tokens);
        let tokens = self.count_tokens(&prompt);
        if tokens > allowed {
            tracing::warn!(repo = repo_name, tokens, allowed, "guidelines prompt over budget");
        }
        Ok(prompt)
    }
}
