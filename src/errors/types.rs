//! Error type definitions for the playlist loader
//!
//! Every failure that leaves the pipeline is one of the variants below. Raw
//! transport errors are mapped into [`TransportError`] by the HTTP layer and
//! classified by the resolver, so callers only ever see a tagged reason plus
//! a human-readable message.

use strum::{AsRefStr, Display, EnumIter};
use thiserror::Error;

/// Tag identifying which step of the pipeline failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum FailureKind {
    InvalidUrl,
    AccessDenied,
    AllSourcesExhausted,
    NetworkUnreachable,
    EmptyPlaylist,
    NotAPlaylist,
    NoValidEntries,
}

impl FailureKind {
    /// Whether re-invoking the pipeline later, unchanged, could succeed.
    ///
    /// Guidance for callers only; the pipeline itself never retries.
    pub fn is_retryable_later(&self) -> bool {
        matches!(self, Self::AllSourcesExhausted | Self::NetworkUnreachable)
    }
}

/// Classified failure returned by the fetch resolver, the parser and the pipeline
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaylistError {
    /// Target URL failed the syntax check; no request was issued
    #[error("Invalid URL: {message}")]
    InvalidUrl { message: String },

    /// Direct fetch answered 401/403
    #[error("Access denied: {message}")]
    AccessDenied { message: String },

    /// Every retrieval candidate failed; carries the last attempt's diagnostic
    #[error("All sources exhausted: {message}")]
    AllSourcesExhausted { message: String },

    /// No candidate produced any HTTP response at all
    #[error("Network unreachable: {message}")]
    NetworkUnreachable { message: String },

    /// Fetched text is blank
    #[error("Empty playlist: {message}")]
    EmptyPlaylist { message: String },

    /// Fetched text carries neither the header nor any info marker
    #[error("Not a playlist: {message}")]
    NotAPlaylist { message: String },

    /// Structurally plausible text without a single usable entry
    #[error("No valid entries: {message}")]
    NoValidEntries { message: String },
}

impl PlaylistError {
    pub fn invalid_url<S: Into<String>>(message: S) -> Self {
        Self::InvalidUrl {
            message: message.into(),
        }
    }

    pub fn access_denied<S: Into<String>>(message: S) -> Self {
        Self::AccessDenied {
            message: message.into(),
        }
    }

    pub fn all_sources_exhausted<S: Into<String>>(message: S) -> Self {
        Self::AllSourcesExhausted {
            message: message.into(),
        }
    }

    pub fn network_unreachable<S: Into<String>>(message: S) -> Self {
        Self::NetworkUnreachable {
            message: message.into(),
        }
    }

    pub fn empty_playlist<S: Into<String>>(message: S) -> Self {
        Self::EmptyPlaylist {
            message: message.into(),
        }
    }

    pub fn not_a_playlist<S: Into<String>>(message: S) -> Self {
        Self::NotAPlaylist {
            message: message.into(),
        }
    }

    pub fn no_valid_entries<S: Into<String>>(message: S) -> Self {
        Self::NoValidEntries {
            message: message.into(),
        }
    }

    /// The taxonomy tag of this failure
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidUrl { .. } => FailureKind::InvalidUrl,
            Self::AccessDenied { .. } => FailureKind::AccessDenied,
            Self::AllSourcesExhausted { .. } => FailureKind::AllSourcesExhausted,
            Self::NetworkUnreachable { .. } => FailureKind::NetworkUnreachable,
            Self::EmptyPlaylist { .. } => FailureKind::EmptyPlaylist,
            Self::NotAPlaylist { .. } => FailureKind::NotAPlaylist,
            Self::NoValidEntries { .. } => FailureKind::NoValidEntries,
        }
    }

    /// The human-readable message, without the kind prefix
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidUrl { message }
            | Self::AccessDenied { message }
            | Self::AllSourcesExhausted { message }
            | Self::NetworkUnreachable { message }
            | Self::EmptyPlaylist { message }
            | Self::NotAPlaylist { message }
            | Self::NoValidEntries { message } => message,
        }
    }
}

/// Transport-level failure: the request produced no HTTP response
///
/// Never returned from the public pipeline; the resolver folds it into a
/// [`PlaylistError`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
        }
    }
}
