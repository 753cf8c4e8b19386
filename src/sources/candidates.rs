//! Retrieval candidates
//!
//! A candidate is a named URL-rewrite rule. The resolver walks an ordered
//! list of them: the direct fetch first, then each CORS-style proxy.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::defaults::{
    DEFAULT_PROXY_ALLORIGINS, DEFAULT_PROXY_CORS_ANYWHERE, DEFAULT_PROXY_CORSPROXY,
};
use crate::utils::url::UrlUtils;

/// How a candidate turns the target URL into the URL actually requested
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RewriteRule {
    /// Request the target itself
    Direct,
    /// `base` followed by the percent-encoded target
    PrefixEncoded { base: String },
    /// `base` followed by the target verbatim
    PrefixRaw { base: String },
}

impl RewriteRule {
    pub fn apply(&self, target: &Url) -> String {
        match self {
            Self::Direct => target.to_string(),
            Self::PrefixEncoded { base } => {
                format!("{base}{}", UrlUtils::percent_encode(target.as_str()))
            }
            Self::PrefixRaw { base } => format!("{base}{target}"),
        }
    }

    /// Proxy base, if this rule goes through one
    pub fn proxy_base(&self) -> Option<&str> {
        match self {
            Self::Direct => None,
            Self::PrefixEncoded { base } | Self::PrefixRaw { base } => Some(base),
        }
    }
}

/// One configured strategy for fetching playlist text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalCandidate {
    pub name: String,
    #[serde(flatten)]
    pub rule: RewriteRule,
}

impl RetrievalCandidate {
    pub fn direct() -> Self {
        Self {
            name: "direct".to_string(),
            rule: RewriteRule::Direct,
        }
    }

    pub fn proxy<N: Into<String>, B: Into<String>>(name: N, base: B) -> Self {
        Self {
            name: name.into(),
            rule: RewriteRule::PrefixEncoded { base: base.into() },
        }
    }

    pub fn is_direct(&self) -> bool {
        matches!(self.rule, RewriteRule::Direct)
    }

    pub fn request_url(&self, target: &Url) -> String {
        self.rule.apply(target)
    }
}

/// Ordered, fixed list of retrieval candidates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateList {
    candidates: Vec<RetrievalCandidate>,
}

impl CandidateList {
    pub fn new(candidates: Vec<RetrievalCandidate>) -> Self {
        Self { candidates }
    }

    /// Direct fetch followed by the given proxies, in order
    pub fn direct_then(proxies: Vec<RetrievalCandidate>) -> Self {
        let mut candidates = Vec::with_capacity(proxies.len() + 1);
        candidates.push(RetrievalCandidate::direct());
        candidates.extend(proxies);
        Self { candidates }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RetrievalCandidate> {
        self.candidates.iter()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl Default for CandidateList {
    fn default() -> Self {
        Self::direct_then(default_proxies())
    }
}

/// The public CORS proxies tried after the direct fetch
pub fn default_proxies() -> Vec<RetrievalCandidate> {
    vec![
        RetrievalCandidate::proxy("allorigins", DEFAULT_PROXY_ALLORIGINS),
        RetrievalCandidate::proxy("corsproxy", DEFAULT_PROXY_CORSPROXY),
        RetrievalCandidate::proxy("cors-anywhere", DEFAULT_PROXY_CORS_ANYWHERE),
    ]
}

/// What to do when the direct fetch answers 401/403
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessDeniedPolicy {
    /// Fail the whole resolution with `AccessDenied`
    #[default]
    Abort,
    /// Record the failure and move on to the proxies
    Cascade,
}
