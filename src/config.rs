use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::budget::BudgetLimits;
use crate::model::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::search::DEFAULT_API_BASE_URL;

pub const CONFIG_FILENAME: &str = ".contribguide.json";
pub const GLOBAL_CONFIG_DIR: &str = "contribguide";
pub const GLOBAL_CONFIG_FILENAME: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no config found at {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("invalid JSON in {}: {source}", .path.display())]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read {}: {source}", .path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub model: ModelConfig,
    pub budget: BudgetConfig,
    pub search: SearchConfig,
    pub templates: TemplatesConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    /// Base URL of an OpenAI-compatible chat completions API
    pub base_url: String,
    /// Model name sent with every request
    pub model: String,
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Environment variable holding the API key
    pub api_key_env: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BudgetConfig {
    /// Context window of the model, in tokens
    pub hard_token_ceiling: usize,
    /// Tokens kept free for the model's answer
    pub reserved_response_tokens: usize,
    /// Word target passed to the README summarizer
    pub summary_words: usize,
    /// Backstop cut applied to the summary, in tokens
    pub summary_token_budget: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    pub api_base_url: String,
    /// Max repositories recommended per query
    pub max_results: usize,
    /// Environment variable holding an optional GitHub token
    pub token_env: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplatesConfig {
    /// Directory of `<name>.txt` overrides for the built-in prompts
    pub dir: Option<PathBuf>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            timeout_secs: 120,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            hard_token_ceiling: 16_384,
            reserved_response_tokens: 1_024,
            summary_words: 500,
            summary_token_budget: 1_000,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            max_results: 5,
            token_env: "GITHUB_API_TOKEN".to_string(),
        }
    }
}

impl BudgetConfig {
    pub fn limits(&self) -> BudgetLimits {
        BudgetLimits {
            summary_words: self.summary_words,
            summary_token_budget: self.summary_token_budget,
            reserved_response_tokens: self.reserved_response_tokens,
        }
    }
}

/// Returns the path to the global config file, if the platform config dir exists.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(GLOBAL_CONFIG_DIR).join(GLOBAL_CONFIG_FILENAME))
}

/// Reads a JSON file as a `serde_json::Value`. Returns empty `{}` if the file doesn't exist.
fn load_json_file(path: &Path) -> Result<Value, ConfigError> {
    if !path.exists() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_str(&content).map_err(|e| ConfigError::InvalidJson {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Recursively merges two JSON values. Objects merge key-by-key; arrays and scalars
/// in `overlay` replace whatever is in `base`.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_val) => deep_merge(base_val, overlay_val),
                    None => overlay_val,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// Loads and merges global + local config files, then deserializes into `Config`.
/// Global config errors are logged and skipped; local config errors propagate.
pub fn load_and_merge(
    global_path: Option<&Path>,
    local_path: &Path,
) -> Result<Config, ConfigError> {
    let global_value = match global_path {
        Some(path) => match load_json_file(path) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load global config, skipping");
                Value::Object(serde_json::Map::new())
            }
        },
        None => Value::Object(serde_json::Map::new()),
    };

    let local_value = load_json_file(local_path)?;
    let merged = deep_merge(global_value, local_value);

    serde_json::from_value(merged).map_err(|e| ConfigError::InvalidJson {
        path: local_path.to_path_buf(),
        source: e,
    })
}

impl Config {
    /// Loads `.contribguide.json` from `dir`, layered over the global config.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let local_path = dir.join(CONFIG_FILENAME);
        let mut config = load_and_merge(global_config_path().as_deref(), &local_path)?;
        // Relative template dirs are relative to the config that named them
        if let Some(templates) = config.templates.dir.take() {
            config.templates.dir = Some(if templates.is_relative() {
                dir.join(templates)
            } else {
                templates
            });
        }
        Ok(config)
    }

    pub fn validate_file(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidJson {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn validate(dir: &Path) -> Result<Config, ConfigError> {
        Self::validate_file(&dir.join(CONFIG_FILENAME))
    }

    pub fn validate_global() -> Result<Config, ConfigError> {
        let path = global_config_path().ok_or_else(|| ConfigError::NotFound {
            path: PathBuf::from("<no config dir>"),
        })?;
        Self::validate_file(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.budget.hard_token_ceiling, 16_384);
        assert_eq!(config.budget.summary_words, 500);
        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.model.model, "gpt-3.5-turbo");
        assert_eq!(config.model.api_key_env, "OPENAI_API_KEY");
        assert!(config.templates.dir.is_none());
    }

    #[test]
    fn test_limits_from_budget() {
        let limits = BudgetConfig::default().limits();
        assert_eq!(limits.summary_words, 500);
        assert_eq!(limits.summary_token_budget, 1_000);
        assert_eq!(limits.reserved_response_tokens, 1_024);
    }

    #[test]
    fn test_load_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let local_path = dir.path().join(CONFIG_FILENAME);
        let config = load_and_merge(None, &local_path).unwrap();
        assert_eq!(config.search.max_results, 5);
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_content = r#"{
  "model": {
    "base_url": "http://localhost:8080/v1",
    "model": "llama3",
    "temperature": 0.2
  },
  "budget": {
    "hard_token_ceiling": 8192,
    "reserved_response_tokens": 512
  },
  "search": {
    "max_results": 3
  }
}"#;
        fs::write(dir.path().join(CONFIG_FILENAME), config_content).unwrap();

        let config = load_and_merge(None, &dir.path().join(CONFIG_FILENAME)).unwrap();
        assert_eq!(config.model.base_url, "http://localhost:8080/v1");
        assert_eq!(config.model.model, "llama3");
        assert_eq!(config.model.temperature, 0.2);
        assert_eq!(config.model.timeout_secs, 120);
        assert_eq!(config.budget.hard_token_ceiling, 8192);
        assert_eq!(config.budget.reserved_response_tokens, 512);
        assert_eq!(config.budget.summary_words, 500);
        assert_eq!(config.search.max_results, 3);
    }

    #[test]
    fn test_relative_template_dir_resolved() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILENAME),
            r#"{ "templates": { "dir": "prompts" } }"#,
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.templates.dir, Some(dir.path().join("prompts")));
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "{bad json").unwrap();

        let result = load_and_merge(None, &dir.path().join(CONFIG_FILENAME));
        assert!(matches!(result.unwrap_err(), ConfigError::InvalidJson { .. }));
    }

    #[test]
    fn test_load_unknown_fields() {
        let dir = tempfile::tempdir().unwrap();
        let config_content = r#"{ "budget": { "hard_token_ceiling": 4096, "typo_field": true } }"#;
        fs::write(dir.path().join(CONFIG_FILENAME), config_content).unwrap();

        let err = load_and_merge(None, &dir.path().join(CONFIG_FILENAME)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidJson { .. }));
        assert!(err.to_string().contains("typo_field"));
    }

    #[test]
    fn test_validate_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::validate(dir.path());
        assert!(matches!(result.unwrap_err(), ConfigError::NotFound { .. }));
    }

    #[test]
    fn test_validate_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILENAME),
            r#"{ "search": { "max_results": 10 } }"#,
        )
        .unwrap();

        let config = Config::validate(dir.path()).unwrap();
        assert_eq!(config.search.max_results, 10);
    }

    #[test]
    fn test_deep_merge_nested_override() {
        let base: Value =
            serde_json::json!({"budget": {"hard_token_ceiling": 4096, "summary_words": 300}});
        let overlay: Value = serde_json::json!({"budget": {"hard_token_ceiling": 8192}});
        let merged = deep_merge(base, overlay);
        assert_eq!(
            merged,
            serde_json::json!({"budget": {"hard_token_ceiling": 8192, "summary_words": 300}})
        );
    }

    #[test]
    fn test_deep_merge_disjoint_keys() {
        let merged = deep_merge(serde_json::json!({"a": 1}), serde_json::json!({"b": 2}));
        assert_eq!(merged, serde_json::json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_deep_merge_scalar_replaces_object() {
        let merged = deep_merge(serde_json::json!({"a": {"b": 1}}), serde_json::json!({"a": 5}));
        assert_eq!(merged, serde_json::json!({"a": 5}));
    }

    #[test]
    fn test_load_and_merge_local_overrides_global() {
        let dir = tempfile::tempdir().unwrap();
        let global_path = dir.path().join("global.json");
        let local_path = dir.path().join("local.json");

        fs::write(&global_path, r#"{"model": {"model": "gpt-4o", "temperature": 0.1}}"#).unwrap();
        fs::write(&local_path, r#"{"model": {"model": "gpt-4o-mini"}}"#).unwrap();

        let config = load_and_merge(Some(&global_path), &local_path).unwrap();
        assert_eq!(config.model.model, "gpt-4o-mini");
        assert_eq!(config.model.temperature, 0.1);
    }

    #[test]
    fn test_load_and_merge_invalid_global_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let global_path = dir.path().join("global.json");
        let local_path = dir.path().join("local.json");

        fs::write(&global_path, "{bad json").unwrap();
        fs::write(&local_path, r#"{"search": {"max_results": 2}}"#).unwrap();

        let config = load_and_merge(Some(&global_path), &local_path).unwrap();
        assert_eq!(config.search.max_results, 2);
    }

    #[test]
    fn test_load_and_merge_invalid_local_errors() {
        let dir = tempfile::tempdir().unwrap();
        let global_path = dir.path().join("global.json");
        let local_path = dir.path().join("local.json");

        fs::write(&global_path, r#"{"search": {"max_results": 50}}"#).unwrap();
        fs::write(&local_path, "{bad json").unwrap();

        let result = load_and_merge(Some(&global_path), &local_path);
        assert!(matches!(result.unwrap_err(), ConfigError::InvalidJson { .. }));
    }

    #[test]
    fn test_error_display_includes_path() {
        let path = PathBuf::from("/some/config.json");
        let err = ConfigError::NotFound { path: path.clone() };
        assert!(err.to_string().contains("/some/config.json"));

        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ConfigError::IoError {
            path,
            source: io_err,
        };
        assert!(err.to_string().contains("/some/config.json"));
        assert!(err.to_string().contains("denied"));
    }
}
