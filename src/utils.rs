//! Utility modules for the playlist loader
//!
//! - `url` for target validation, reference resolution and log masking
//! - `http_client` for the reqwest-backed playlist fetcher

pub mod http_client;
pub mod url;

pub use self::http_client::HttpPlaylistFetcher;
pub use self::url::UrlUtils;
