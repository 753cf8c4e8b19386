//! Fetch resolver
//!
//! Walks the candidate list strictly in order, one attempt per candidate,
//! and stops at the first 2xx response. A 401/403 on the direct fetch ends
//! resolution unless the policy says to cascade.

use std::sync::Arc;

use tracing::{debug, info, warn};
use url::Url;

use super::candidates::{AccessDeniedPolicy, CandidateList, RetrievalCandidate};
use super::traits::PlaylistFetcher;
use crate::errors::{PlaylistError, PlaylistResult};
use crate::utils::url::UrlUtils;

/// Text obtained from a candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedText {
    pub body: String,
    /// Name of the candidate that served the body
    pub served_by: String,
}

/// Why a single candidate did not produce text
#[derive(Debug, Clone, PartialEq, Eq)]
enum AttemptFailure {
    Http { status: u16, message: String },
    Transport { message: String },
}

impl AttemptFailure {
    fn message(&self) -> &str {
        match self {
            Self::Http { message, .. } | Self::Transport { message } => message,
        }
    }
}

pub struct FetchResolver {
    fetcher: Arc<dyn PlaylistFetcher>,
    candidates: CandidateList,
    access_denied: AccessDeniedPolicy,
}

impl FetchResolver {
    pub fn new(fetcher: Arc<dyn PlaylistFetcher>, candidates: CandidateList) -> Self {
        Self {
            fetcher,
            candidates,
            access_denied: AccessDeniedPolicy::default(),
        }
    }

    pub fn with_access_denied_policy(mut self, policy: AccessDeniedPolicy) -> Self {
        self.access_denied = policy;
        self
    }

    pub fn candidates(&self) -> &CandidateList {
        &self.candidates
    }

    pub fn access_denied_policy(&self) -> AccessDeniedPolicy {
        self.access_denied
    }

    /// Obtain the raw text behind `target_url`
    ///
    /// Fails with `InvalidUrl` before touching the network when the input is
    /// not an absolute http(s) URL.
    pub async fn resolve(&self, target_url: &str) -> PlaylistResult<ResolvedText> {
        let target = UrlUtils::parse_target(target_url)?;
        self.resolve_url(&target).await
    }

    /// Same as [`resolve`](Self::resolve) for an already validated URL
    pub async fn resolve_url(&self, target: &Url) -> PlaylistResult<ResolvedText> {
        let safe_target = UrlUtils::obfuscate_credentials(target.as_str());
        info!(
            "Resolving playlist {} through {} candidate(s)",
            safe_target,
            self.candidates.len()
        );

        let mut last_failure: Option<AttemptFailure> = None;
        let mut any_http_response = false;

        for candidate in self.candidates.iter() {
            match self.attempt(candidate, target).await {
                Ok(body) => {
                    info!(
                        "Fetched {} characters for {} via '{}'",
                        body.len(),
                        safe_target,
                        candidate.name
                    );
                    return Ok(ResolvedText {
                        body,
                        served_by: candidate.name.clone(),
                    });
                }
                Err(failure) => {
                    if let AttemptFailure::Http { status, message } = &failure {
                        any_http_response = true;
                        if candidate.is_direct()
                            && matches!(status, 401 | 403)
                            && self.access_denied == AccessDeniedPolicy::Abort
                        {
                            warn!(
                                "Direct fetch of {} was refused ({}), not trying proxies",
                                safe_target, message
                            );
                            return Err(PlaylistError::access_denied(format!(
                                "Access denied ({message}). The playlist might be private or require authentication."
                            )));
                        }
                    }
                    warn!(
                        "Candidate '{}' failed for {}: {}",
                        candidate.name,
                        safe_target,
                        failure.message()
                    );
                    last_failure = Some(failure);
                }
            }
        }

        Err(Self::exhausted(last_failure, any_http_response))
    }

    async fn attempt(
        &self,
        candidate: &RetrievalCandidate,
        target: &Url,
    ) -> Result<String, AttemptFailure> {
        let request_url = candidate.request_url(target);
        debug!(
            "Trying candidate '{}': {}",
            candidate.name,
            UrlUtils::obfuscate_credentials(&request_url)
        );

        match self.fetcher.get_text(&request_url).await {
            Ok(response) if response.is_success() => Ok(response.body),
            Ok(response) => Err(AttemptFailure::Http {
                status: response.status,
                message: response.status_line(),
            }),
            Err(e) => Err(AttemptFailure::Transport { message: e.message }),
        }
    }

    fn exhausted(last_failure: Option<AttemptFailure>, any_http_response: bool) -> PlaylistError {
        match last_failure {
            None => PlaylistError::all_sources_exhausted("No retrieval candidates are configured"),
            Some(AttemptFailure::Transport { message }) if !any_http_response => {
                PlaylistError::network_unreachable(format!(
                    "Unable to reach the playlist URL ({message}). Check your internet connection and verify the URL is accessible."
                ))
            }
            Some(failure) => PlaylistError::all_sources_exhausted(failure.message()),
        }
    }
}
