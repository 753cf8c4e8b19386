//! Playlist text ingestion
//!
//! Validation and parsing of fetched extended M3U text into entries.

pub mod m3u_parser;

pub use m3u_parser::{HEADER_MARKER, INFO_MARKER, M3uParser, looks_like_playlist, parse_playlist};
