use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;
use url::Url;

pub mod defaults;
pub mod duration_serde;

use crate::sources::{AccessDeniedPolicy, CandidateList, RetrievalCandidate};
use defaults::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub parser: ParserConfig,
}

/// Retrieval settings: HTTP client and the candidate cascade
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(with = "duration_serde::duration", default = "default_connect_timeout")]
    pub connect_timeout: Duration,
    #[serde(default = "default_user_agent")]
    pub user_agent: Option<String>,
    /// Behaviour when the direct fetch answers 401/403
    #[serde(default)]
    pub access_denied: AccessDeniedPolicy,
    /// Ordered retrieval candidates, tried one at a time
    #[serde(default = "default_candidates")]
    pub candidates: Vec<RetrievalCandidate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Base for relative playlist references; the playlist's own origin when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_origin: Option<Url>,
}

fn default_connect_timeout() -> Duration {
    humantime::parse_duration(DEFAULT_CONNECT_TIMEOUT).unwrap_or(Duration::from_secs(10))
}

fn default_user_agent() -> Option<String> {
    Some(DEFAULT_USER_AGENT.to_string())
}

fn default_candidates() -> Vec<RetrievalCandidate> {
    CandidateList::default().iter().cloned().collect()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout: default_connect_timeout(),
            user_agent: default_user_agent(),
            access_denied: AccessDeniedPolicy::default(),
            candidates: default_candidates(),
        }
    }
}

impl FetchConfig {
    pub fn candidate_list(&self) -> CandidateList {
        CandidateList::new(self.candidates.clone())
    }
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults when it does not exist
    pub fn load_from_file<P: AsRef<Path>>(config_file: P) -> Result<Self> {
        let path = config_file.as_ref();
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config = Self::from_toml_str(&contents)?;
            info!("Configuration loaded from: {}", path.display());
            Ok(config)
        } else {
            info!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fetch.candidates.is_empty() {
            bail!("fetch.candidates must list at least one retrieval candidate");
        }

        if !self.fetch.candidates[0].is_direct() {
            bail!(
                "fetch.candidates must start with the direct candidate, found '{}'",
                self.fetch.candidates[0].name
            );
        }

        for (index, candidate) in self.fetch.candidates.iter().enumerate() {
            if candidate.name.trim().is_empty() {
                bail!("retrieval candidate names must not be empty");
            }
            if index > 0 && candidate.is_direct() {
                bail!(
                    "candidate '{}' at position {} is a direct fetch; only the first candidate may be direct",
                    candidate.name,
                    index + 1
                );
            }
            if let Some(base) = candidate.rule.proxy_base() {
                Url::parse(base).map_err(|e| {
                    anyhow::anyhow!("Invalid proxy base '{}' for candidate '{}': {}", base, candidate.name, e)
                })?;
            }
        }

        if let Some(base) = &self.parser.base_origin {
            if !matches!(base.scheme(), "http" | "https") || base.host_str().is_none() {
                bail!("parser.base_origin must be an absolute http(s) URL, got '{}'", base);
            }
        }

        Ok(())
    }
}
