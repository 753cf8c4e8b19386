//! Playlist source retrieval
//!
//! - [`traits`]: the network seam and response shape
//! - [`candidates`]: ordered URL-rewrite strategies (direct, proxies)
//! - [`resolver`]: the sequential cascade producing raw playlist text

pub mod candidates;
pub mod resolver;
pub mod traits;

pub use candidates::{
    AccessDeniedPolicy, CandidateList, RetrievalCandidate, RewriteRule, default_proxies,
};
pub use resolver::{FetchResolver, ResolvedText};
pub use traits::{FetchedResponse, PLAYLIST_ACCEPT, PlaylistFetcher};
