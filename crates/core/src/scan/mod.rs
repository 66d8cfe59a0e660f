// ABOUTME: Scanner capability shared by the detached (regex) and document-backed variants.
// ABOUTME: Also hosts inline-style matching and the normalize-then-dedupe step for results.

mod dom;
mod text;

pub use dom::DomScanner;
pub use text::TextScanner;

use std::collections::HashSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ImagesError;
use crate::source::Source;

// `background-image: <anything>(<value>)`, value may be bare or wrapped in url()
static INLINE_BACKGROUND_IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)background-image.+?\((.+?)\)").unwrap());
// `background...url(<value>)`, shorthand or longhand
static INLINE_BACKGROUND_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)background.+?url\(([^)]*)\)").unwrap());

/// One extraction surface per method. Variants are chosen once, when the engine is built.
pub trait Scanner: Send + Sync + fmt::Debug {
    /// `src` values of image tags, in markup order.
    fn scan_tags(&self, source: &Source) -> Result<Vec<String>, ImagesError>;

    /// Background images declared in inline styles of the resolved content.
    ///
    /// Always a text match against the content, whatever the context.
    fn scan_inline_styles(&self, source: &Source) -> Result<Vec<String>, ImagesError> {
        let content = source.content()?;
        Ok(inline_style_urls(&content))
    }

    /// Background images declared in attached stylesheets.
    fn scan_stylesheets(&self) -> Result<Vec<String>, ImagesError>;
}

/// Matches inline background declarations: `background-image` values first,
/// then every `background*` declaration holding a `url(...)`.
pub fn inline_style_urls(content: &str) -> Vec<String> {
    let declared = INLINE_BACKGROUND_IMAGE
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().replace("&quot;", "").replace('"', ""));

    let referenced = INLINE_BACKGROUND_URL
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());

    declared.chain(referenced).collect()
}

/// Strips quote characters (literal or `&quot;`) anywhere in the URL and trims it.
pub fn normalize_image_url(url: &str) -> String {
    url.replace("&quot;", "")
        .replace(|c| c == '"' || c == '\'', "")
        .trim()
        .to_string()
}

/// Normalizes every URL and keeps the first occurrence of each, in order.
///
/// URLs that normalize to nothing are dropped, so `<img src="">` and
/// `url('')` never show up as images.
pub fn unique_images<I>(urls: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    let mut images = Vec::new();

    for url in urls {
        let url = normalize_image_url(&url);
        if url.is_empty() || !seen.insert(url.clone()) {
            continue;
        }
        images.push(url);
    }

    images
}
