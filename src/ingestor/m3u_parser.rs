//! Extended M3U parser
//!
//! Turns fetched playlist text into ordered [`PlaylistEntry`] values. The
//! parse is a left fold over trimmed lines carrying a two-state machine:
//! either no info line is pending, or one `#EXTINF` line is waiting for the
//! URL line it describes. Bad URL lines are dropped and reported through
//! [`ParsedPlaylist::skipped`] instead of failing the whole parse.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};
use url::Url;

use crate::errors::{PlaylistError, PlaylistResult};
use crate::models::{PlaylistEntry, ParsedPlaylist, SkippedLine, UNTITLED};
use crate::utils::url::UrlUtils;

/// Playlist header marker
pub const HEADER_MARKER: &str = "#EXTM3U";
/// Entry-info marker as searched for by the format sniff
pub const INFO_MARKER: &str = "#EXTINF";
/// Entry-info directive prefix as matched per line
const INFO_PREFIX: &str = "#EXTINF:";
/// UTF-8 byte order mark, left in place by reqwest's `text()` without the charset feature
const BYTE_ORDER_MARK: char = '\u{feff}';

/// Metadata of an `#EXTINF` line waiting for its URL line
#[derive(Debug, Clone, PartialEq)]
struct PendingInfo {
    title: String,
    duration: Option<f64>,
    attributes: BTreeMap<String, String>,
    line_number: usize,
    line: String,
}

#[derive(Debug, Clone, PartialEq)]
enum ParseState {
    AwaitingTitle,
    TitleReady(PendingInfo),
}

enum LineKind<'a> {
    /// Text after `#EXTINF:`
    Info(&'a str),
    Reference(&'a str),
    Ignored,
}

impl<'a> LineKind<'a> {
    fn classify(line: &'a str) -> Self {
        if let Some(rest) = line.strip_prefix(INFO_PREFIX) {
            Self::Info(rest)
        } else if line.is_empty() || line.starts_with('#') {
            Self::Ignored
        } else {
            Self::Reference(line)
        }
    }
}

/// Trim surrounding whitespace and stray byte order marks
fn trim_line(line: &str) -> &str {
    line.trim_matches(|c: char| c.is_whitespace() || c == BYTE_ORDER_MARK)
}

/// Heuristic format sniff: header or at least one info marker somewhere
pub fn looks_like_playlist(text: &str) -> bool {
    text.contains(HEADER_MARKER) || text.contains(INFO_MARKER)
}

/// One-shot parse with an explicit base for relative references
pub fn parse_playlist(text: &str, base: &Url) -> PlaylistResult<ParsedPlaylist> {
    M3uParser::new(base.clone()).parse(text)
}

/// Extended M3U parser resolving relative references against `base`
#[derive(Debug, Clone)]
pub struct M3uParser {
    base: Url,
}

impl M3uParser {
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Validate and parse playlist text
    ///
    /// Fails with `EmptyPlaylist` for blank input, `NotAPlaylist` when no
    /// marker is present and `NoValidEntries` when nothing usable remains.
    pub fn parse(&self, text: &str) -> PlaylistResult<ParsedPlaylist> {
        let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);
        Self::validate_structure(text)?;

        let line_count = text.lines().count();
        debug!("Parsing M3U content with {} lines", line_count);

        let (state, mut parsed) = text.lines().enumerate().fold(
            (ParseState::AwaitingTitle, ParsedPlaylist::default()),
            |(state, parsed), (index, raw)| self.step(state, parsed, index + 1, trim_line(raw)),
        );

        if let ParseState::TitleReady(pending) = state {
            Self::drop_pending(&mut parsed, pending, "info line at end of playlist has no URL line");
        }

        if parsed.entries.is_empty() {
            return Err(PlaylistError::no_valid_entries(
                "No valid entries found in the playlist. The playlist might be empty or malformed.",
            ));
        }

        info!(
            "M3U parsing completed: {} entries, {} skipped line(s)",
            parsed.entries.len(),
            parsed.skipped.len()
        );
        Ok(parsed)
    }

    fn validate_structure(text: &str) -> PlaylistResult<()> {
        if text.trim().is_empty() {
            return Err(PlaylistError::empty_playlist("The playlist appears to be empty."));
        }
        if !looks_like_playlist(text) {
            return Err(PlaylistError::not_a_playlist(
                "The file does not appear to be a valid M3U playlist. Make sure the URL points to an M3U/M3U8 file.",
            ));
        }
        Ok(())
    }

    fn step(
        &self,
        state: ParseState,
        mut parsed: ParsedPlaylist,
        line_number: usize,
        line: &str,
    ) -> (ParseState, ParsedPlaylist) {
        match LineKind::classify(line) {
            LineKind::Info(rest) => {
                if let ParseState::TitleReady(superseded) = state {
                    Self::drop_pending(&mut parsed, superseded, "info line not followed by a URL line");
                }
                let pending = Self::parse_info(rest, line_number, line);
                debug!("Line {}: info for '{}'", line_number, pending.title);
                (ParseState::TitleReady(pending), parsed)
            }
            LineKind::Reference(reference) => {
                let pending = match state {
                    ParseState::TitleReady(pending) => Some(pending),
                    ParseState::AwaitingTitle => None,
                };

                match UrlUtils::resolve_reference(&self.base, reference) {
                    Ok(url) => parsed.entries.push(Self::entry(pending, url)),
                    Err(e) => {
                        warn!("Invalid URL in playlist at line {}: {} ({})", line_number, reference, e);
                        parsed.skipped.push(SkippedLine {
                            line_number,
                            content: reference.to_string(),
                            reason: format!("invalid URL: {e}"),
                        });
                    }
                }

                // An info line pairs with exactly the next URL line, valid or not
                (ParseState::AwaitingTitle, parsed)
            }
            LineKind::Ignored => (state, parsed),
        }
    }

    fn entry(pending: Option<PendingInfo>, url: String) -> PlaylistEntry {
        match pending {
            Some(info) => PlaylistEntry {
                title: info.title,
                url,
                duration: info.duration,
                attributes: info.attributes,
            },
            None => PlaylistEntry::new(UNTITLED, url),
        }
    }

    fn drop_pending(parsed: &mut ParsedPlaylist, pending: PendingInfo, reason: &str) {
        debug!("Line {}: dropping '{}' ({})", pending.line_number, pending.title, reason);
        parsed.skipped.push(SkippedLine {
            line_number: pending.line_number,
            content: pending.line,
            reason: reason.to_string(),
        });
    }

    /// Parse the text after `#EXTINF:`
    ///
    /// Format: `<duration> key="value" ...,<title>`. The title is whatever
    /// follows the last comma.
    fn parse_info(rest: &str, line_number: usize, line: &str) -> PendingInfo {
        let (meta, title) = match rest.rfind(',') {
            Some(pos) => (&rest[..pos], rest[pos + 1..].trim()),
            None => (rest, ""),
        };

        let meta = meta.trim();
        let (duration, attributes_part) = match meta.split_once(char::is_whitespace) {
            Some((first, tail)) => match parse_duration(first) {
                Some(duration) => (Some(duration), tail),
                None => (None, meta),
            },
            None => match parse_duration(meta) {
                Some(duration) => (Some(duration), ""),
                None => (None, meta),
            },
        };

        PendingInfo {
            title: if title.is_empty() {
                UNTITLED.to_string()
            } else {
                title.to_string()
            },
            duration,
            attributes: parse_attributes(attributes_part),
            line_number,
            line: line.to_string(),
        }
    }
}

/// Duration token of an info line; `inf` and `NaN` are not durations
fn parse_duration(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|d| d.is_finite())
}

/// Parse `key="value"` pairs (quoted or bare values) from an info line
fn parse_attributes(input: &str) -> BTreeMap<String, String> {
    let mut attributes = BTreeMap::new();
    let mut key = String::new();
    let mut value = String::new();
    let mut in_value = false;
    let mut in_quotes = false;

    let mut commit = |key: &mut String, value: &mut String| {
        let name = key.trim();
        if !name.is_empty() {
            attributes.insert(name.to_string(), std::mem::take(value));
        }
        key.clear();
        value.clear();
    };

    for ch in input.chars() {
        match ch {
            '"' if in_value && in_quotes => {
                commit(&mut key, &mut value);
                in_value = false;
                in_quotes = false;
            }
            '"' if in_value && value.is_empty() => in_quotes = true,
            '=' if !in_value => in_value = true,
            c if c.is_whitespace() && !in_quotes => {
                if in_value && !value.is_empty() {
                    commit(&mut key, &mut value);
                }
                key.clear();
                value.clear();
                in_value = false;
            }
            c if in_value => value.push(c),
            c => key.push(c),
        }
    }

    if in_value {
        commit(&mut key, &mut value);
    }

    attributes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FailureKind;
    use proptest::prelude::*;
    use rstest::rstest;

    fn parser() -> M3uParser {
        M3uParser::new(Url::parse("http://localhost/").unwrap())
    }

    fn titles_and_urls(parsed: &ParsedPlaylist) -> Vec<(&str, &str)> {
        parsed
            .entries
            .iter()
            .map(|e| (e.title.as_str(), e.url.as_str()))
            .collect()
    }

    #[test]
    fn test_two_channel_playlist() {
        let text = "#EXTM3U\n#EXTINF:-1,Channel One\nhttp://example.com/a.m3u8\n#EXTINF:-1,Channel Two\nhttp://example.com/b.m3u8";
        let parsed = parser().parse(text).unwrap();
        assert_eq!(
            parsed.entries,
            vec![
                PlaylistEntry {
                    duration: Some(-1.0),
                    ..PlaylistEntry::new("Channel One", "http://example.com/a.m3u8")
                },
                PlaylistEntry {
                    duration: Some(-1.0),
                    ..PlaylistEntry::new("Channel Two", "http://example.com/b.m3u8")
                },
            ]
        );
        assert!(parsed.skipped.is_empty());
    }

    #[rstest]
    #[case("", FailureKind::EmptyPlaylist)]
    #[case(" \n\t\r\n ", FailureKind::EmptyPlaylist)]
    #[case("not a playlist", FailureKind::NotAPlaylist)]
    #[case("http://example.com/a.ts\nhttp://example.com/b.ts", FailureKind::NotAPlaylist)]
    #[case("#EXTM3U\n#EXTINF:-1,Only Title\n", FailureKind::NoValidEntries)]
    #[case("#EXTM3U\n", FailureKind::NoValidEntries)]
    #[case("#EXTM3U\n# just a comment\n#EXT-X-VERSION:3\n", FailureKind::NoValidEntries)]
    fn test_rejections(#[case] text: &str, #[case] expected: FailureKind) {
        assert_eq!(parser().parse(text).unwrap_err().kind(), expected);
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = "#EXTM3U\r\n#EXTINF:-1,News\r\nhttp://example.com/news.ts\r\n";
        let parsed = parser().parse(text).unwrap();
        assert_eq!(titles_and_urls(&parsed), vec![("News", "http://example.com/news.ts")]);
    }

    #[test]
    fn test_title_after_last_comma() {
        let text = "#EXTINF:-1 tvg-id=\"a,b\" group-title=\"News\",  BBC One, HD  \nhttp://example.com/bbc.ts";
        let parsed = parser().parse(text).unwrap();
        assert_eq!(parsed.entries[0].title, "HD");
    }

    #[rstest]
    #[case("#EXTINF:-1")]
    #[case("#EXTINF:-1,")]
    #[case("#EXTINF:-1,   ")]
    fn test_missing_title_is_untitled(#[case] info: &str) {
        let text = format!("{info}\nhttp://example.com/x.ts");
        let parsed = parser().parse(&text).unwrap();
        assert_eq!(parsed.entries[0].title, UNTITLED);
    }

    #[test]
    fn test_url_without_info_line_is_untitled() {
        let text = "#EXTM3U\nhttp://example.com/bare.ts";
        let parsed = parser().parse(text).unwrap();
        assert_eq!(titles_and_urls(&parsed), vec![(UNTITLED, "http://example.com/bare.ts")]);
        assert_eq!(parsed.entries[0].duration, None);
    }

    #[test]
    fn test_orphan_info_title_does_not_leak() {
        let text = "#EXTM3U\n#EXTINF:-1,Orphan\n#EXTINF:-1,Real\nhttp://example.com/real.ts\nhttp://example.com/unnamed.ts";
        let parsed = parser().parse(text).unwrap();
        assert_eq!(
            titles_and_urls(&parsed),
            vec![
                ("Real", "http://example.com/real.ts"),
                (UNTITLED, "http://example.com/unnamed.ts"),
            ]
        );
        assert_eq!(parsed.skipped.len(), 1);
        assert_eq!(parsed.skipped[0].line_number, 2);
        assert_eq!(parsed.skipped[0].content, "#EXTINF:-1,Orphan");
    }

    #[test]
    fn test_invalid_url_consumes_pending_title() {
        let text = "#EXTM3U\n#EXTINF:-1,Broken\nhttp://exa mple.com/x.ts\nhttp://example.com/ok.ts";
        let parsed = parser().parse(text).unwrap();
        assert_eq!(titles_and_urls(&parsed), vec![(UNTITLED, "http://example.com/ok.ts")]);
        assert_eq!(parsed.skipped.len(), 1);
        assert_eq!(parsed.skipped[0].line_number, 3);
        assert!(parsed.skipped[0].reason.starts_with("invalid URL"));
    }

    #[test]
    fn test_only_invalid_urls_is_no_valid_entries() {
        let text = "#EXTM3U\n#EXTINF:-1,Broken\nhttp://exa mple.com/x.ts";
        let err = parser().parse(text).unwrap_err();
        assert_eq!(err.kind(), FailureKind::NoValidEntries);
    }

    #[test]
    fn test_trailing_info_line_is_reported() {
        let text = "#EXTM3U\n#EXTINF:-1,One\nhttp://example.com/1.ts\n#EXTINF:-1,Dangling";
        let parsed = parser().parse(text).unwrap();
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.skipped.len(), 1);
        assert_eq!(parsed.skipped[0].line_number, 4);
    }

    #[rstest]
    #[case("channel.ts", "http://localhost/channel.ts")]
    #[case("/live/stream.m3u8", "http://localhost/live/stream.m3u8")]
    #[case("https://cdn.example.com/a.ts", "https://cdn.example.com/a.ts")]
    #[case("rtmp://media.example.com/live/1", "rtmp://media.example.com/live/1")]
    #[case("http://example.com", "http://example.com")]
    #[case("http://EXAMPLE.com/Live/A.ts", "http://EXAMPLE.com/Live/A.ts")]
    #[case("http://example.com:80/x.ts", "http://example.com:80/x.ts")]
    #[case("http://example.com/a/../b.ts", "http://example.com/a/../b.ts")]
    #[case("https://example.com/a b.ts", "https://example.com/a b.ts")]
    #[case("  http://example.com/padded.ts  ", "http://example.com/padded.ts")]
    fn test_reference_resolution(#[case] reference: &str, #[case] expected: &str) {
        let text = format!("#EXTM3U\n#EXTINF:-1,Ch\n{reference}");
        let parsed = parser().parse(&text).unwrap();
        assert_eq!(parsed.entries[0].url, expected);
    }

    #[test]
    fn test_leading_byte_order_mark_is_ignored() {
        let parsed = parser()
            .parse("\u{feff}#EXTM3U\r\n#EXTINF:-1,One\r\nhttp://example.com/1.ts\r\n")
            .unwrap();
        assert_eq!(titles_and_urls(&parsed), vec![("One", "http://example.com/1.ts")]);
        assert!(parsed.skipped.is_empty());
    }

    #[rstest]
    #[case("NaN")]
    #[case("inf")]
    #[case("-infinity")]
    fn test_non_finite_duration_is_dropped(#[case] token: &str) {
        let text = format!("#EXTM3U\n#EXTINF:{token} group-title=\"Odd\",Odd\nhttp://example.com/odd.ts");
        let entry = &parser().parse(&text).unwrap().entries[0];
        assert_eq!(entry.duration, None);
        assert_eq!(entry.title, "Odd");
        assert_eq!(entry.group_title(), Some("Odd"));
    }

    #[test]
    fn test_relative_reference_uses_parser_base() {
        let base = Url::parse("https://tv.example.org:8443/").unwrap();
        let parsed = parse_playlist("#EXTINF:10,Clip\nclips/1.ts", &base).unwrap();
        assert_eq!(parsed.entries[0].url, "https://tv.example.org:8443/clips/1.ts");
        assert_eq!(parsed.entries[0].duration, Some(10.0));
    }

    #[test]
    fn test_duplicates_preserved_in_order() {
        let text = "#EXTM3U\n#EXTINF:-1,A\nhttp://example.com/same.ts\n#EXTINF:-1,B\nhttp://example.com/same.ts\n#EXTINF:-1,A\nhttp://example.com/same.ts";
        let parsed = parser().parse(text).unwrap();
        let titles: Vec<&str> = parsed.entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "A"]);
    }

    #[test]
    fn test_extinf_attributes() {
        let text = "#EXTM3U\n#EXTINF:-1 tvg-id=\"bbc1.uk\" tvg-logo=\"http://logo.example/bbc.png\" group-title=\"UK News\" tvg-chno=101,BBC One\nhttp://example.com/bbc1.ts";
        let entry = &parser().parse(text).unwrap().entries[0];
        assert_eq!(entry.title, "BBC One");
        assert_eq!(entry.duration, Some(-1.0));
        assert_eq!(entry.attributes.get("tvg-id").map(String::as_str), Some("bbc1.uk"));
        assert_eq!(entry.logo(), Some("http://logo.example/bbc.png"));
        assert_eq!(entry.group_title(), Some("UK News"));
        assert_eq!(entry.attributes.get("tvg-chno").map(String::as_str), Some("101"));
    }

    #[test]
    fn test_attributes_without_duration() {
        let attrs = parse_attributes("tvg-name=\"Film 4\" radio=\"\"");
        assert_eq!(attrs.get("tvg-name").map(String::as_str), Some("Film 4"));
        assert_eq!(attrs.get("radio").map(String::as_str), Some(""));

        let pending = M3uParser::parse_info("tvg-id=\"x\",Title", 1, "#EXTINF:tvg-id=\"x\",Title");
        assert_eq!(pending.duration, None);
        assert_eq!(pending.attributes.get("tvg-id").map(String::as_str), Some("x"));
    }

    #[test]
    fn test_lowercase_info_marker_is_a_comment() {
        let text = "#EXTM3U\n#extinf:-1,Lower\nhttp://example.com/a.ts";
        let parsed = parser().parse(text).unwrap();
        assert_eq!(parsed.entries[0].title, UNTITLED);
    }

    #[test]
    fn test_info_marker_alone_passes_sniff() {
        assert!(looks_like_playlist("#EXTINF:-1,X\nhttp://example.com/x.ts"));
        assert!(looks_like_playlist("#EXTM3U"));
        assert!(!looks_like_playlist("<html><body>Not found</body></html>"));
    }

    fn title_strategy() -> impl Strategy<Value = String> {
        // Titles never contain commas (the last comma splits) nor line breaks
        "[A-Za-z0-9][A-Za-z0-9 ._()&'-]{0,30}[A-Za-z0-9)]"
    }

    proptest! {
        #[test]
        fn prop_round_trip_preserves_order_and_titles(
            titles in prop::collection::vec(title_strategy(), 1..40)
        ) {
            let mut text = String::from("#EXTM3U\n");
            for (i, title) in titles.iter().enumerate() {
                text.push_str(&format!("#EXTINF:-1,{title}\nhttp://example.com/stream/{i}.ts\n"));
            }

            let parsed = parser().parse(&text).unwrap();
            prop_assert_eq!(parsed.entries.len(), titles.len());
            for (i, (entry, title)) in parsed.entries.iter().zip(&titles).enumerate() {
                prop_assert_eq!(&entry.title, title);
                prop_assert_eq!(entry.url.clone(), format!("http://example.com/stream/{i}.ts"));
            }
        }

        #[test]
        fn prop_markerless_text_is_not_a_playlist(text in "[^#]*[A-Za-z0-9][^#]*") {
            prop_assert_eq!(parser().parse(&text).unwrap_err().kind(), FailureKind::NotAPlaylist);
        }
    }
}
