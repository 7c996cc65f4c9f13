//! Hyperlinks of an HTML directory listing.

use once_cell::sync::Lazy;
use regex::Regex;

const ANCHOR: &str = r#"(?is)<a\b[^>]*?\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))[^>]*>(.*?)</a\s*>"#;

const TAG: &str = r"<[^>]*>";

static ANCHOR_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(ANCHOR).ok());

static TAG_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(TAG).ok());

/// Which part of a link carries the version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkSource {
    #[default]
    Href,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub href: String,
    pub text: String,
}

impl Link {
    pub fn get(&self, source: LinkSource) -> &str {
        match source {
            LinkSource::Href => &self.href,
            LinkSource::Text => &self.text,
        }
    }
}

/// Every `<a href>` in `html`, in document order.
///
/// Hrefs are reduced to their last path segment, keeping a trailing `/`,
/// without query or fragment. Link text loses nested tags and surrounding
/// whitespace.
pub fn extract_links(html: &str) -> Vec<Link> {
    let (Some(anchor), Some(tag)) = (ANCHOR_RE.as_ref(), TAG_RE.as_ref()) else {
        return Vec::new();
    };

    anchor
        .captures_iter(html)
        .filter_map(|caps| {
            let href = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3))?.as_str();
            let inner = caps.get(4).map_or("", |m| m.as_str());
            Some(Link {
                href: normalize_href(&unescape(href)),
                text: unescape(tag.replace_all(inner, "").trim()),
            })
        })
        .collect()
}

fn normalize_href(href: &str) -> String {
    let end = href.find(['?', '#']).unwrap_or(href.len());
    let href = &href[..end];
    let is_dir = href.ends_with('/');
    let last = href.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    if is_dir && !last.is_empty() {
        format!("{last}/")
    } else {
        last.to_string()
    }
}

fn unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
