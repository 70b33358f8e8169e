//! TOML configuration for the annotation core.
//!
//! Every field has a default matching the behavior the hosting site shipped
//! with, so an empty file (or no file at all) is a valid configuration.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Queries shorter than this (after trimming) return nothing without
    /// touching any store.
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
    /// Pause after the last keystroke before a query actually runs.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_len: default_min_query_len(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_min_query_len() -> usize {
    2
}
fn default_debounce_ms() -> u64 {
    250
}

#[derive(Debug, Deserialize, Clone)]
pub struct NavigationConfig {
    /// Base retry delay; attempt `n` waits `retry_base_ms * (n + 1)`.
    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,
    /// Per-attempt delay ceiling.
    #[serde(default = "default_retry_cap_ms")]
    pub retry_cap_ms: u64,
    /// Total attempts before reporting the cell as not found.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Duration of the transient highlight on the located cell.
    #[serde(default = "default_highlight_ms")]
    pub highlight_ms: u64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            retry_base_ms: default_retry_base_ms(),
            retry_cap_ms: default_retry_cap_ms(),
            max_attempts: default_max_attempts(),
            highlight_ms: default_highlight_ms(),
        }
    }
}

fn default_retry_base_ms() -> u64 {
    100
}
fn default_retry_cap_ms() -> u64 {
    500
}
fn default_max_attempts() -> u32 {
    10
}
fn default_highlight_ms() -> u64 {
    2000
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.search.min_query_len == 0 {
        anyhow::bail!("search.min_query_len must be >= 1");
    }
    if config.navigation.max_attempts == 0 {
        anyhow::bail!("navigation.max_attempts must be >= 1");
    }
    if config.navigation.retry_cap_ms < config.navigation.retry_base_ms {
        anyhow::bail!("navigation.retry_cap_ms must be >= navigation.retry_base_ms");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn empty_file_yields_defaults() {
        let file = write_config("");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.search.min_query_len, 2);
        assert_eq!(config.search.debounce_ms, 250);
        assert_eq!(config.navigation.retry_base_ms, 100);
        assert_eq!(config.navigation.retry_cap_ms, 500);
        assert_eq!(config.navigation.max_attempts, 10);
        assert_eq!(config.navigation.highlight_ms, 2000);
    }

    #[test]
    fn overrides_are_applied() {
        let file = write_config(
            r#"
[search]
min_query_len = 3

[navigation]
max_attempts = 5
"#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.search.min_query_len, 3);
        assert_eq!(config.navigation.max_attempts, 5);
        assert_eq!(config.navigation.retry_cap_ms, 500, "untouched default");
    }

    #[test]
    fn rejects_zero_attempts() {
        let file = write_config("[navigation]\nmax_attempts = 0\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn rejects_cap_below_base() {
        let file = write_config("[navigation]\nretry_base_ms = 600\n");
        assert!(load_config(file.path()).is_err());
    }
}
