// ABOUTME: Content sources an engine scans: raw HTML/CSS text or a markup-bearing element.
// ABOUTME: Resolves the textual content at access time and rejects unusable sources.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use scraper::Html;

use crate::error::ImagesError;
use crate::host::img_sources;

/// Anything that can render its current inner markup.
///
/// Returning `None` means the reference does not carry markup and cannot be scanned.
pub trait MarkupElement: Send + Sync + fmt::Debug {
    fn inner_html(&self) -> Option<String>;

    /// `src` of every `<img>` inside the element, in document order.
    ///
    /// Defaults to parsing [`inner_html`](Self::inner_html) as a fragment.
    fn image_sources(&self) -> Option<Vec<String>> {
        let markup = self.inner_html()?;
        let fragment = Html::parse_fragment(&markup);
        Some(img_sources(fragment.root_element()))
    }
}

/// What an engine instance scans. Never mutated by the engine.
#[derive(Debug, Clone, Default)]
pub enum Source {
    /// No source was supplied and the host offered no default.
    #[default]
    Unset,
    /// Raw HTML or CSS text.
    Text(String),
    /// A live element whose inner markup is read on every access.
    Element(Arc<dyn MarkupElement>),
}

impl Source {
    /// Wraps any markup-bearing element.
    pub fn element(element: impl MarkupElement + 'static) -> Self {
        Source::Element(Arc::new(element))
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Source::Unset)
    }

    /// Returns the text to scan: the string itself, or the element's current markup.
    pub fn content(&self) -> Result<Cow<'_, str>, ImagesError> {
        match self {
            Source::Text(text) => Ok(Cow::Borrowed(text)),
            Source::Element(element) => element
                .inner_html()
                .map(Cow::Owned)
                .ok_or(ImagesError::InvalidSource),
            Source::Unset => Err(ImagesError::InvalidSource),
        }
    }
}

impl From<String> for Source {
    fn from(text: String) -> Self {
        Source::Text(text)
    }
}

impl From<&str> for Source {
    fn from(text: &str) -> Self {
        Source::Text(text.to_string())
    }
}

impl From<Arc<dyn MarkupElement>> for Source {
    fn from(element: Arc<dyn MarkupElement>) -> Self {
        Source::Element(element)
    }
}
