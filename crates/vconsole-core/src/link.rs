//! Hyperlink payloads, targets, and passive URL detection.
//!
//! Links arrive two ways: explicit OSC 8 marker scopes emitted by the
//! interpreter, and bare `scheme://` spans auto-detected in marker-free text.
//! Either way the result is a [`HyperlinkInfo`] annotation on a text run —
//! advisory metadata the host can resolve when a span is activated. Parsing
//! is total: an unparseable line/column degrades to `None` ("unknown
//! position"), never an error.

use std::ops::Range;

/// Raw OSC 8 payload as scanned off the wire: `OSC 8 ; params ; uri`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPayload {
    /// The params field, a `:`-separated list of `key=value` pairs
    /// (may be empty).
    pub params: String,
    /// The link URI.
    pub uri: String,
}

/// Resolved navigation target for a hyperlink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// A `file://` reference, optionally carrying a position.
    File {
        path: String,
        /// 1-based line, `None` when absent or unparseable.
        line: Option<u32>,
        /// 1-based column, `None` when absent or unparseable.
        col: Option<u32>,
    },
    /// Any other `scheme://` reference.
    Url(String),
}

/// Hyperlink annotation attached to a text run.
///
/// Never independently owned: it lives and dies with its run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HyperlinkInfo {
    /// The original URI as written by the producer.
    pub uri: String,
    pub target: LinkTarget,
}

impl HyperlinkInfo {
    /// Build link info from an OSC 8 payload.
    ///
    /// `file://` URIs take their line/column from the URI query string first,
    /// falling back to `line`/`col` keys in the payload params (the format
    /// emitted by R's cli package).
    #[must_use]
    pub fn from_payload(payload: &LinkPayload) -> Self {
        let mut target = parse_target(&payload.uri);
        if let LinkTarget::File { line, col, .. } = &mut target {
            if line.is_none() {
                *line = param_value(&payload.params, "line");
            }
            if col.is_none() {
                *col = param_value(&payload.params, "col");
            }
        }
        Self {
            uri: payload.uri.clone(),
            target,
        }
    }

    /// Build link info for an auto-detected bare URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Self {
        Self {
            uri: uri.to_string(),
            target: parse_target(uri),
        }
    }
}

/// Parse a URI into a navigation target.
///
/// Total over all inputs: anything that is not a `file://` reference is an
/// external URL target.
#[must_use]
pub fn parse_target(uri: &str) -> LinkTarget {
    if let Some(rest) = uri.strip_prefix("file://") {
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (rest, None),
        };
        let line = query.and_then(|q| query_value(q, "line"));
        let col = query.and_then(|q| query_value(q, "col"));
        LinkTarget::File {
            path: path.to_string(),
            line,
            col,
        }
    } else {
        LinkTarget::Url(uri.to_string())
    }
}

/// Look up an integer value in a `&`-separated query string.
fn query_value(query: &str, key: &str) -> Option<u32> {
    pairs_value(query.split('&'), key)
}

/// Look up an integer value in a `:`-separated OSC 8 params field.
fn param_value(params: &str, key: &str) -> Option<u32> {
    pairs_value(params.split(':'), key)
}

fn pairs_value<'a>(pairs: impl Iterator<Item = &'a str>, key: &str) -> Option<u32> {
    for pair in pairs {
        if let Some((k, v)) = pair.split_once('=')
            && k.trim() == key
        {
            return v.trim().parse().ok();
        }
    }
    None
}

/// Characters allowed inside an auto-detected URI.
fn is_uri_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '-' | '.'
                | '_'
                | '~'
                | ':'
                | '/'
                | '?'
                | '#'
                | '['
                | ']'
                | '@'
                | '!'
                | '$'
                | '&'
                | '\''
                | '*'
                | '+'
                | ','
                | ';'
                | '='
                | '%'
        )
}

/// Trailing punctuation that reads as prose rather than part of the URI.
fn is_trailing_punct(c: char) -> bool {
    matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | '\'' | ']')
}

/// Detect bare `scheme://` spans in plain text.
///
/// Returns non-overlapping byte ranges in ascending order, each paired with
/// its resolved target. Only runs on text outside marker scopes; explicit
/// OSC 8 links always take precedence.
#[must_use]
pub fn detect_links(text: &str) -> Vec<(Range<usize>, LinkTarget)> {
    let mut out = Vec::new();
    let mut search_from = 0;

    while let Some(sep) = text[search_from..].find("://") {
        let sep = search_from + sep;

        // Walk back over the scheme: alphanumeric plus "+.-", starting with
        // an ASCII letter.
        let mut start = sep;
        for (idx, c) in text[..sep].char_indices().rev() {
            if c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-') {
                start = idx;
            } else {
                break;
            }
        }
        let scheme = &text[start..sep];
        if scheme.is_empty() || !scheme.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
            search_from = sep + 3;
            continue;
        }

        // Walk forward over the URI body.
        let body_start = sep + 3;
        let mut end = text.len();
        for (idx, c) in text[body_start..].char_indices() {
            if !is_uri_char(c) {
                end = body_start + idx;
                break;
            }
        }
        // An empty body ("http://" and nothing after) is not a link.
        if end == body_start {
            search_from = body_start;
            continue;
        }

        // Strip trailing prose punctuation.
        while end > body_start {
            let last = text[start..end].chars().next_back().unwrap_or(' ');
            if is_trailing_punct(last) {
                end -= last.len_utf8();
            } else {
                break;
            }
        }
        if end == body_start {
            search_from = body_start;
            continue;
        }

        out.push((start..end, parse_target(&text[start..end])));
        search_from = end;
    }

    out
}
