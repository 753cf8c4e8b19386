//! Playlist acquisition pipeline
//!
//! URL in, ordered entries out: the fetch resolver obtains the raw text and
//! the M3U parser turns it into entries. Every failure leaving this module
//! is a classified [`PlaylistError`].

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, instrument};
use url::Url;

use crate::config::Config;
use crate::errors::{PlaylistError, PlaylistResult};
use crate::ingestor::M3uParser;
use crate::models::{LoadedPlaylist, PlaylistEntry};
use crate::sources::{FetchResolver, PlaylistFetcher};
use crate::utils::{HttpPlaylistFetcher, UrlUtils};

pub struct PlaylistLoader {
    resolver: FetchResolver,
    base_origin: Option<Url>,
}

impl PlaylistLoader {
    /// `base_origin` resolves relative references; `None` uses the playlist's own origin
    pub fn new(resolver: FetchResolver, base_origin: Option<Url>) -> Self {
        Self {
            resolver,
            base_origin,
        }
    }

    /// Build the reqwest fetcher, candidate list and policies from configuration
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let fetcher = HttpPlaylistFetcher::with_connection_timeout(
            config.fetch.connect_timeout,
            config.fetch.user_agent.as_deref(),
        )
        .context("building HTTP client")?;

        Ok(Self::with_fetcher(Arc::new(fetcher), config))
    }

    /// Same as [`from_config`](Self::from_config) with a caller-supplied fetcher
    pub fn with_fetcher(fetcher: Arc<dyn PlaylistFetcher>, config: &Config) -> Self {
        let resolver = FetchResolver::new(fetcher, config.fetch.candidate_list())
            .with_access_denied_policy(config.fetch.access_denied);
        Self::new(resolver, config.parser.base_origin.clone())
    }

    pub fn resolver(&self) -> &FetchResolver {
        &self.resolver
    }

    /// Fetch and parse the playlist behind `url`
    pub async fn load(&self, url: &str) -> PlaylistResult<Vec<PlaylistEntry>> {
        self.load_detailed(url).await.map(|loaded| loaded.entries)
    }

    /// Like [`load`](Self::load), also returning skipped-line diagnostics and the serving candidate
    #[instrument(skip(self, url), fields(playlist = %UrlUtils::obfuscate_credentials(url)))]
    pub async fn load_detailed(&self, url: &str) -> PlaylistResult<LoadedPlaylist> {
        let target = UrlUtils::parse_target(url)?;
        let resolved = self.resolver.resolve_url(&target).await?;

        let base = self.base_for(&target)?;
        let parsed = M3uParser::new(base).parse(&resolved.body)?;

        info!(
            "Loaded {} entries via '{}' ({} line(s) skipped)",
            parsed.entries.len(),
            resolved.served_by,
            parsed.skipped.len()
        );

        Ok(LoadedPlaylist {
            entries: parsed.entries,
            skipped: parsed.skipped,
            served_by: resolved.served_by,
        })
    }

    fn base_for(&self, target: &Url) -> PlaylistResult<Url> {
        match &self.base_origin {
            Some(base) => Ok(base.clone()),
            None => UrlUtils::origin_of(target)
                .ok_or_else(|| PlaylistError::invalid_url("URL has no usable origin")),
        }
    }
}
