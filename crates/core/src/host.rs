// ABOUTME: Host environment capability: whether a live document exists and what it contains.
// ABOUTME: Provides Document, StyleSheet and Element snapshots plus the Detached and Page hosts.

use std::fmt;
use std::sync::Arc;

use scraper::{ElementRef, Html, Selector};

use crate::css::{parse_rules, CssRule};
use crate::error::{HostError, ImagesError};
use crate::source::MarkupElement;

/// The environment an engine runs in.
///
/// A host that hands out a document makes the engine run in a browser-like
/// context; any error means the context is detached.
pub trait Host: Send + Sync + fmt::Debug {
    fn document(&self) -> Result<Arc<Document>, HostError>;
}

/// A host with no document: raw HTML/CSS strings only.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedHost;

impl Host for DetachedHost {
    fn document(&self) -> Result<Arc<Document>, HostError> {
        Err(HostError::NoDocument)
    }
}

/// A host backed by a loaded page.
#[derive(Debug, Clone)]
pub struct PageHost {
    document: Arc<Document>,
}

impl PageHost {
    pub fn new(document: impl Into<Arc<Document>>) -> Self {
        Self {
            document: document.into(),
        }
    }
}

impl Host for PageHost {
    fn document(&self) -> Result<Arc<Document>, HostError> {
        Ok(Arc::clone(&self.document))
    }
}

/// A stylesheet reference found in markup, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetRef {
    /// Text of a `<style>` element.
    Inline(String),
    /// `href` of a `<link rel="stylesheet">` element, unresolved.
    Linked(String),
}

/// Lists the `<style>` and `<link rel="stylesheet">` elements of a page.
pub fn style_sheet_refs(markup: &str) -> Vec<SheetRef> {
    let Ok(selector) = Selector::parse("style, link[href]") else {
        return Vec::new();
    };
    let html = Html::parse_document(markup);

    html.select(&selector)
        .filter_map(|el| match el.value().name() {
            "style" => Some(SheetRef::Inline(el.text().collect())),
            _ => {
                let rel = el.value().attr("rel").unwrap_or_default();
                let is_stylesheet = rel
                    .split_ascii_whitespace()
                    .any(|token| token.eq_ignore_ascii_case("stylesheet"));
                let href = el.value().attr("href")?.trim();
                (is_stylesheet && !href.is_empty()).then(|| SheetRef::Linked(href.to_string()))
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
enum SheetState {
    Loaded(Vec<CssRule>),
    Pending,
    Restricted,
}

/// A stylesheet attached to a document.
#[derive(Debug, Clone)]
pub struct StyleSheet {
    href: Option<String>,
    state: SheetState,
}

impl StyleSheet {
    /// A sheet from a `<style>` element.
    pub fn inline(text: &str) -> Self {
        Self {
            href: None,
            state: SheetState::Loaded(parse_rules(text)),
        }
    }

    /// A linked sheet whose text has been fetched.
    pub fn linked(href: impl Into<String>, text: &str) -> Self {
        Self {
            href: Some(href.into()),
            state: SheetState::Loaded(parse_rules(text)),
        }
    }

    /// A linked sheet that has not been (or could not be) loaded. Exposes no rules.
    pub fn pending(href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            state: SheetState::Pending,
        }
    }

    /// A linked sheet from another origin. Reading its rules fails.
    pub fn restricted(href: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            state: SheetState::Restricted,
        }
    }

    pub fn href(&self) -> Option<&str> {
        self.href.as_deref()
    }

    pub fn rules(&self) -> Result<&[CssRule], ImagesError> {
        match &self.state {
            SheetState::Loaded(rules) => Ok(rules.as_slice()),
            SheetState::Pending => Ok(&[]),
            SheetState::Restricted => Err(ImagesError::stylesheet_access(
                self.href.as_deref().unwrap_or("<inline>"),
                "cross-origin rules are not accessible",
            )),
        }
    }
}

/// Immutable snapshot of a live page: its markup and attached stylesheets.
#[derive(Debug, Clone)]
pub struct Document {
    markup: String,
    style_sheets: Vec<StyleSheet>,
}

impl Document {
    /// Parses markup on its own. `<style>` elements become sheets; linked sheets stay pending.
    pub fn parse(markup: impl Into<String>) -> Self {
        let markup = markup.into();
        let style_sheets = style_sheet_refs(&markup)
            .into_iter()
            .map(|sheet| match sheet {
                SheetRef::Inline(text) => StyleSheet::inline(&text),
                SheetRef::Linked(href) => StyleSheet::pending(href),
            })
            .collect();
        Self {
            markup,
            style_sheets,
        }
    }

    /// Builds a document from markup and sheets already resolved by a loader.
    pub fn with_style_sheets(markup: impl Into<String>, style_sheets: Vec<StyleSheet>) -> Self {
        Self {
            markup: markup.into(),
            style_sheets,
        }
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn style_sheets(&self) -> &[StyleSheet] {
        &self.style_sheets
    }

    /// The `src` of every `<img>` in the document, in document order.
    pub fn image_sources(&self) -> Vec<String> {
        let html = Html::parse_document(&self.markup);
        img_sources(html.root_element())
    }
}

/// `src` of every `<img>` below `root`, in document order; tags without `src` are skipped.
pub(crate) fn img_sources(root: ElementRef<'_>) -> Vec<String> {
    let Ok(selector) = Selector::parse("img") else {
        return Vec::new();
    };
    root.select(&selector)
        .filter_map(|img| img.value().attr("src"))
        .map(str::to_string)
        .collect()
}

/// A handle to the first element matching a selector in a document.
#[derive(Debug, Clone)]
pub struct Element {
    document: Arc<Document>,
    selector: String,
}

impl Element {
    pub fn new(document: Arc<Document>, selector: impl Into<String>) -> Self {
        Self {
            document,
            selector: selector.into(),
        }
    }

    /// The document's `<body>`.
    pub fn body(document: Arc<Document>) -> Self {
        Self::new(document, "body")
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }
}

impl MarkupElement for Element {
    fn inner_html(&self) -> Option<String> {
        let selector = Selector::parse(&self.selector).ok()?;
        let html = Html::parse_document(self.document.markup());
        let element = html.select(&selector).next()?;
        Some(element.inner_html())
    }

    fn image_sources(&self) -> Option<Vec<String>> {
        let selector = Selector::parse(&self.selector).ok()?;
        let html = Html::parse_document(self.document.markup());
        let element = html.select(&selector).next()?;
        Some(img_sources(element))
    }
}
