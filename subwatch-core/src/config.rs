use crate::error::{ConfigError, CoreError};
use crate::types::{ItemKind, DEFAULT_PREVIEW_CHARS};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const ENV_SUBREDDITS: &str = "SUBWATCH_SUBREDDITS";
pub const ENV_KIND: &str = "SUBWATCH_KIND";

const MAX_SUBREDDIT_NAME_LEN: usize = 21;

/// Info level for every crate in the workspace.
pub const DEFAULT_LOG_FILTER: &str =
    "subwatch=info,subwatch_core=info,stats_engine=info,feed_client=info,background_service=info";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub kind: ItemKind,
    pub subreddits: Vec<String>,
    pub quick_stats_interval_secs: u64,
    pub stop_timeout_secs: u64,
    pub preview_chars: usize,
    pub log_filter: String,
    pub replay_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            kind: ItemKind::Post,
            subreddits: Vec::new(),
            quick_stats_interval_secs: 60,
            stop_timeout_secs: 5,
            preview_chars: DEFAULT_PREVIEW_CHARS,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            replay_dir: None,
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, CoreError> {
        let config: AppConfig = toml::from_str(contents).map_err(ConfigError::Parse)?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, CoreError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Applies `SUBWATCH_SUBREDDITS` and `SUBWATCH_KIND` on top of the
    /// current values.
    pub fn apply_env_overrides(&mut self) -> Result<(), CoreError> {
        self.apply_overrides(
            std::env::var(ENV_SUBREDDITS).ok().as_deref(),
            std::env::var(ENV_KIND).ok().as_deref(),
        )
    }

    pub fn apply_overrides(
        &mut self,
        subreddits: Option<&str>,
        kind: Option<&str>,
    ) -> Result<(), CoreError> {
        if let Some(list) = subreddits {
            let parsed = parse_subreddit_list(list);
            if !parsed.is_empty() {
                debug!("Overriding subreddits with {:?}", parsed);
                self.subreddits = parsed;
            }
        }
        if let Some(kind) = kind {
            self.kind = kind.parse()?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.subreddits.is_empty() {
            return Err(ConfigError::MissingField {
                field: "subreddits".to_string(),
            }
            .into());
        }

        let mut seen = HashSet::new();
        for name in &self.subreddits {
            if !is_valid_subreddit_name(name) {
                return Err(ConfigError::InvalidValue {
                    field: "subreddits".to_string(),
                    value: name.clone(),
                }
                .into());
            }
            if !seen.insert(name.to_ascii_lowercase()) {
                return Err(ConfigError::ValidationFailed {
                    reason: format!("subreddit '{}' is listed more than once", name),
                }
                .into());
            }
        }

        if self.quick_stats_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "quick_stats_interval_secs".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        if self.stop_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "stop_timeout_secs".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        if self.preview_chars == 0 {
            return Err(ConfigError::InvalidValue {
                field: "preview_chars".to_string(),
                value: "0".to_string(),
            }
            .into());
        }

        Ok(())
    }

    pub fn quick_stats_interval(&self) -> Duration {
        Duration::from_secs(self.quick_stats_interval_secs)
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_timeout_secs)
    }
}

/// Splits a comma separated list, dropping blanks and any `r/` prefix.
pub fn parse_subreddit_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .map(|name| name.trim_start_matches("/r/").trim_start_matches("r/"))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn is_valid_subreddit_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_SUBREDDIT_NAME_LEN
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
