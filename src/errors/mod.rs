//! Centralized error handling for the playlist loader
//!
//! # Error Categories
//!
//! - **Input Errors**: the target URL is not an absolute http(s) URL
//! - **Retrieval Errors**: access denied, every candidate failed, network down
//! - **Content Errors**: blank text, not an M3U document, no usable entries
//!
//! # Usage
//!
//! ```rust
//! use m3u_loader::errors::{FailureKind, PlaylistError, PlaylistResult};
//!
//! fn example_function() -> PlaylistResult<String> {
//!     Err(PlaylistError::empty_playlist("The playlist appears to be empty"))
//! }
//!
//! assert_eq!(example_function().unwrap_err().kind(), FailureKind::EmptyPlaylist);
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using PlaylistError
pub type PlaylistResult<T> = Result<T, PlaylistError>;
