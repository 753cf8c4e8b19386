//! Extended M3U playlist loader
//!
//! Given a playlist URL, obtain the raw text through an ordered cascade of
//! retrieval candidates (direct fetch, then CORS-style proxies) and parse it
//! into ordered, absolute-URL [`models::PlaylistEntry`] values. Every failure
//! is reported as a classified [`errors::PlaylistError`].
//!
//! ```no_run
//! use m3u_loader::{config::Config, pipeline::PlaylistLoader};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let loader = PlaylistLoader::from_config(&Config::default())?;
//! for entry in loader.load("https://example.com/tv.m3u").await? {
//!     println!("{} -> {}", entry.title, entry.url);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod errors;
pub mod ingestor;
pub mod models;
pub mod pipeline;
pub mod sources;
pub mod utils;

pub use errors::{FailureKind, PlaylistError, PlaylistResult};
pub use models::{LoadedPlaylist, PlaylistEntry, SkippedLine};
pub use pipeline::PlaylistLoader;
