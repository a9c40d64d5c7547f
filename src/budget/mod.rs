pub mod manager;
pub mod tokenizer;
pub mod truncate;

use std::path::PathBuf;

use thiserror::Error;

use crate::model::ModelError;

pub use manager::{BudgetLimits, NO_CONTENT_SUMMARY, PromptBudgetManager, SUMMARY_INPUT_CEILING};
pub use tokenizer::{ENCODING_NAME, TokenIds, Tokenizer};
pub use truncate::{BudgetedText, TRUNCATION_MARKER, truncate};

#[derive(Debug, Error)]
pub enum BudgetError {
    #[error("failed to load cl100k_base tokenizer: {0}")]
    TokenizerUnavailable(String),

    #[error("input is not valid UTF-8: {0}")]
    InvalidEncoding(#[from] std::str::Utf8Error),

    #[error("template not found: {name}{}", path_suffix(.path))]
    TemplateNotFound { name: String, path: Option<PathBuf> },

    #[error("template '{template}' has no value for placeholder '{variable}'")]
    MissingVariable { template: String, variable: String },

    /// The model call behind `summarize` failed. `text` is the input the
    /// caller passed in, so it can decide whether to fall back to it.
    #[error("summarization failed ({len} bytes of input): {source}", len = .text.len())]
    SummarizationFailed {
        text: String,
        #[source]
        source: ModelError,
    },
}

fn path_suffix(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => format!(" ({})", p.display()),
        None => String::new(),
    }
}
