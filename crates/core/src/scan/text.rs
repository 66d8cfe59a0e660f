// ABOUTME: Detached scanner that pattern-matches raw HTML/CSS text.
// ABOUTME: Used whenever the host exposes no document; stylesheets are unavailable here.

use once_cell::sync::Lazy;
use regex::Regex;

use super::Scanner;
use crate::error::ImagesError;
use crate::source::Source;

// <img ... src="..."> with either quote style; the tag may span lines, self-close or be left open
static IMG_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<img\b[^>]*?\ssrc\s*=\s*(?:"([^"]*)"|'([^']*)')[^>]*>?"#).unwrap()
});

/// Regex-based scanner over the resolved source content.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextScanner;

impl Scanner for TextScanner {
    fn scan_tags(&self, source: &Source) -> Result<Vec<String>, ImagesError> {
        let content = source.content()?;
        let urls = IMG_TAG
            .captures_iter(&content)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
            .map(|m| m.as_str().to_string())
            .collect();
        Ok(urls)
    }

    fn scan_stylesheets(&self) -> Result<Vec<String>, ImagesError> {
        Err(ImagesError::UnsupportedContext)
    }
}
