use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header};
use tracing::debug;

use crate::errors::TransportError;
use crate::sources::traits::{FetchedResponse, PLAYLIST_ACCEPT, PlaylistFetcher};
use crate::utils::url::UrlUtils;

/// Default connect timeout for playlist requests
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// reqwest-backed playlist fetcher
///
/// Only a connection timeout is applied; transfers of large playlists are
/// left to run to completion.
#[derive(Clone)]
pub struct HttpPlaylistFetcher {
    client: Client,
}

impl HttpPlaylistFetcher {
    /// Create new HTTP client with the default connection timeout
    pub fn new() -> Result<Self, TransportError> {
        Self::with_connection_timeout(DEFAULT_CONNECT_TIMEOUT, None)
    }

    /// Create new HTTP client with only a connection timeout
    pub fn with_connection_timeout(
        connect_timeout: Duration,
        user_agent: Option<&str>,
    ) -> Result<Self, TransportError> {
        let mut builder = Client::builder().connect_timeout(connect_timeout);
        if let Some(agent) = user_agent {
            builder = builder.user_agent(agent);
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::new(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Wrap an existing reqwest client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    fn transport_error(err: reqwest::Error) -> TransportError {
        // reqwest embeds the request URL in its messages
        TransportError::new(UrlUtils::obfuscate_credentials(&err.to_string()))
    }
}

#[async_trait]
impl PlaylistFetcher for HttpPlaylistFetcher {
    async fn get_text(&self, url: &str) -> Result<FetchedResponse, TransportError> {
        debug!(
            "Fetching playlist text from: {}",
            UrlUtils::obfuscate_credentials(url)
        );

        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, PLAYLIST_ACCEPT)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status();
        let reason = status.canonical_reason().unwrap_or("Unknown").to_string();

        if !status.is_success() {
            debug!("Received HTTP {} from {}", status.as_u16(), UrlUtils::obfuscate_credentials(url));
            return Ok(FetchedResponse {
                status: status.as_u16(),
                reason,
                body: String::new(),
            });
        }

        let body = response.text().await.map_err(Self::transport_error)?;
        debug!("Successfully fetched {} characters of text content", body.len());

        Ok(FetchedResponse {
            status: status.as_u16(),
            reason,
            body,
        })
    }
}
