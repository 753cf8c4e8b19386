//! Source retrieval traits
//!
//! The fetcher trait is the single network seam of the crate. The resolver
//! drives it once per retrieval candidate; tests substitute fakes for it.

use async_trait::async_trait;

use crate::errors::TransportError;

/// Media types requested for playlist text
pub const PLAYLIST_ACCEPT: &str = "text/plain,application/x-mpegurl,application/vnd.apple.mpegurl";

/// An HTTP response as seen by the resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResponse {
    pub status: u16,
    /// Canonical reason phrase of the status, empty when unknown
    pub reason: String,
    /// Response body; only read for 2xx responses
    pub body: String,
}

impl FetchedResponse {
    pub fn new<S: Into<String>>(status: u16, reason: S, body: S) -> Self {
        Self {
            status,
            reason: reason.into(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_access_denied(&self) -> bool {
        matches!(self.status, 401 | 403)
    }

    /// Diagnostic in the `HTTP <status>: <reason>` shape
    pub fn status_line(&self) -> String {
        format!("HTTP {}: {}", self.status, self.reason)
    }
}

/// Issues a single GET for playlist text
///
/// Implementations must not retry; one call is one attempt.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaylistFetcher: Send + Sync {
    async fn get_text(&self, url: &str) -> Result<FetchedResponse, TransportError>;
}
