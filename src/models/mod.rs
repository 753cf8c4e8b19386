use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Title used when an entry has no info line or the info line carries none
pub const UNTITLED: &str = "Untitled";

/// A playable entry of an extended M3U playlist
///
/// `url` is always absolute; relative references are resolved against a base
/// origin before an entry is constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub title: String,
    pub url: String,
    /// Duration token of the `#EXTINF` line, `-1` for live streams
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// `key="value"` attributes of the `#EXTINF` line (`tvg-id`, `group-title`, ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl PlaylistEntry {
    /// Entry with no info-line metadata beyond its title
    pub fn new<T: Into<String>, U: Into<String>>(title: T, url: U) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            duration: None,
            attributes: BTreeMap::new(),
        }
    }

    pub fn group_title(&self) -> Option<&str> {
        self.attributes.get("group-title").map(String::as_str)
    }

    pub fn logo(&self) -> Option<&str> {
        self.attributes.get("tvg-logo").map(String::as_str)
    }
}

/// A source line the parser dropped, kept as a diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedLine {
    /// 1-based line number in the fetched text
    pub line_number: usize,
    pub content: String,
    pub reason: String,
}

/// Parser output: entries in source order plus dropped-line diagnostics
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParsedPlaylist {
    pub entries: Vec<PlaylistEntry>,
    pub skipped: Vec<SkippedLine>,
}

/// Pipeline output of a detailed load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedPlaylist {
    pub entries: Vec<PlaylistEntry>,
    pub skipped: Vec<SkippedLine>,
    /// Name of the retrieval candidate that produced the text
    pub served_by: String,
}
