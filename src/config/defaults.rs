/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.

// Fetch defaults
pub const DEFAULT_CONNECT_TIMEOUT: &str = "10s";
pub const DEFAULT_USER_AGENT: &str = concat!("m3u-loader/", env!("CARGO_PKG_VERSION"));

// Public CORS proxies tried after the direct fetch, in order
pub const DEFAULT_PROXY_ALLORIGINS: &str = "https://api.allorigins.win/raw?url=";
pub const DEFAULT_PROXY_CORSPROXY: &str = "https://corsproxy.io/?";
pub const DEFAULT_PROXY_CORS_ANYWHERE: &str = "https://cors-anywhere.herokuapp.com/";

// Parser defaults
// Note: base_origin has no default; relative references fall back to the
// origin of the playlist URL itself
