// ABOUTME: Minimal stylesheet model: top-level rules with their selector and declaration text.
// ABOUTME: Also provides the url() argument extraction used by the stylesheet scanner.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

static URL_ARGUMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"url\(([^)]*)\)").unwrap());

/// A single top-level rule of a stylesheet.
///
/// At-rules (`@media`, `@import`, `@font-face`, ...) carry no selector text and
/// an empty declaration block, the same shape a CSSOM rule list exposes for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssRule {
    pub selector_text: Option<String>,
    pub css_text: String,
}

impl CssRule {
    fn from_parts(prelude: &str, block: &str) -> Option<Self> {
        let prelude = prelude.trim();
        if prelude.is_empty() && block.trim().is_empty() {
            return None;
        }
        if prelude.starts_with('@') {
            return Some(CssRule {
                selector_text: None,
                css_text: String::new(),
            });
        }
        Some(CssRule {
            selector_text: (!prelude.is_empty()).then(|| prelude.to_string()),
            css_text: block.trim().to_string(),
        })
    }

    /// Returns the image referenced by this rule's background declarations.
    ///
    /// Only rules with both a selector and declarations are considered, and only
    /// the first `url(...)` argument is taken.
    pub fn background_image(&self) -> Option<String> {
        let selector = self.selector_text.as_deref()?;
        if selector.is_empty() || self.css_text.is_empty() {
            return None;
        }
        if !self.css_text.contains("background") {
            return None;
        }
        first_url_argument(&self.css_text).map(|arg| css_string_literal(arg).to_string())
    }
}

/// Splits stylesheet text into its top-level rules, in source order.
pub fn parse_rules(text: &str) -> Vec<CssRule> {
    let source = strip_comments(text);
    let source = source.as_ref();

    let mut rules = Vec::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut depth = 0usize;
    let mut prelude_start = 0;
    let mut prelude_end = 0;
    let mut block_start = 0;

    for (i, c) in source.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '"' | '\'' => quote = Some(c),
            '{' => {
                if depth == 0 {
                    prelude_end = i;
                    block_start = i + 1;
                }
                depth += 1;
            }
            '}' => {
                if depth == 0 {
                    // stray closing brace
                    prelude_start = i + 1;
                    continue;
                }
                depth -= 1;
                if depth == 0 {
                    let prelude = &source[prelude_start..prelude_end];
                    rules.extend(CssRule::from_parts(prelude, &source[block_start..i]));
                    prelude_start = i + 1;
                }
            }
            ';' if depth == 0 => {
                // statement at-rules: @import, @charset, @namespace
                rules.extend(CssRule::from_parts(&source[prelude_start..i], ""));
                prelude_start = i + 1;
            }
            _ => {}
        }
    }

    rules
}

/// Returns the raw argument of the first `url(...)` in a declaration block.
pub fn first_url_argument(css_text: &str) -> Option<&str> {
    URL_ARGUMENT
        .captures(css_text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Reads a CSS string-or-bare token as its literal value.
///
/// Trims whitespace and removes one matching pair of surrounding quotes. The
/// content is never interpreted beyond that.
pub fn css_string_literal(arg: &str) -> &str {
    let trimmed = arg.trim();
    for quote in ['"', '\''] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return &trimmed[1..trimmed.len() - 1];
        }
    }
    trimmed
}

/// Removes `/* ... */` comments. Comment markers inside quoted strings are not recognised.
fn strip_comments(text: &str) -> Cow<'_, str> {
    if !text.contains("/*") {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => rest = "",
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}
