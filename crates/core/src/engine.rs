// ABOUTME: The DomImages engine: resolves its source, runs the scanners and aggregates results.
// ABOUTME: Exposes per-surface extraction, the deduplicated document view and preloading.

use std::borrow::Cow;
use std::sync::Arc;

use crate::error::ImagesError;
use crate::host::{Element, Host};
use crate::options::{DomImagesBuilder, Options};
use crate::preload::{preload, ImageLoader, PreloadReport};
use crate::scan::{unique_images, DomScanner, Scanner, TextScanner};
use crate::source::Source;

/// Extracts every image reference from a page, an HTML string or a CSS string.
///
/// The engine keeps no results between calls; every call rescans the source.
#[derive(Debug)]
pub struct DomImages {
    source: Source,
    options: Options,
    host: Arc<dyn Host>,
    scanner: Box<dyn Scanner>,
}

impl DomImages {
    /// Engine over a string or element, detached from any document.
    pub fn new(source: impl Into<Source>) -> Self {
        Self::builder().source(source).build()
    }

    pub fn builder() -> DomImagesBuilder {
        DomImagesBuilder::new()
    }

    pub(crate) fn assemble(source: Source, host: Arc<dyn Host>, options: Options) -> Self {
        let (scanner, source): (Box<dyn Scanner>, Source) = match host.document() {
            Ok(document) => {
                let source = if source.is_unset() {
                    Source::element(Element::body(Arc::clone(&document)))
                } else {
                    source
                };
                (Box::new(DomScanner::new(document)), source)
            }
            Err(err) => {
                tracing::trace!(error = %err, "no document attached, scanning text");
                (Box::new(TextScanner), source)
            }
        };

        Self {
            source,
            options,
            host,
            scanner,
        }
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The text the inline and detached scanners read.
    pub fn content(&self) -> Result<Cow<'_, str>, ImagesError> {
        self.source.content()
    }

    /// Whether the host currently exposes a document. Asked anew on each call.
    pub fn is_browser_context(&self) -> bool {
        self.host.document().is_ok()
    }

    /// Every distinct image: tags, then inline styles, then stylesheets when readable.
    pub fn document_images(&self) -> Result<Vec<String>, ImagesError> {
        let mut images = self.html_images()?;

        match self.stylesheet_images() {
            Ok(found) => images.extend(found),
            Err(err) => tracing::debug!(error = %err, "skipping stylesheet images"),
        }

        let images = unique_images(images);
        tracing::debug!(count = images.len(), "collected document images");
        Ok(images)
    }

    /// Tag images followed by inline-style images, unnormalized.
    pub fn html_images(&self) -> Result<Vec<String>, ImagesError> {
        let mut images = self.tag_images()?;
        images.extend(self.inline_style_images()?);
        Ok(images)
    }

    pub fn tag_images(&self) -> Result<Vec<String>, ImagesError> {
        self.scanner.scan_tags(&self.source)
    }

    pub fn inline_style_images(&self) -> Result<Vec<String>, ImagesError> {
        self.scanner.scan_inline_styles(&self.source)
    }

    /// Images referenced by attached stylesheets. Requires a browser-like context.
    pub fn stylesheet_images(&self) -> Result<Vec<String>, ImagesError> {
        if !self.is_browser_context() {
            return Err(ImagesError::UnsupportedContext);
        }
        self.scanner.scan_stylesheets()
    }

    /// Extracts the document images and preloads all of them.
    pub async fn preload_all<L>(&self, loader: &L) -> Result<PreloadReport, ImagesError>
    where
        L: ImageLoader + ?Sized,
    {
        let urls = self.document_images()?;
        self.preload_images(&urls, loader).await
    }

    /// Preloads the given URLs with no bound on concurrent loads.
    pub async fn preload_images<L>(
        &self,
        urls: &[String],
        loader: &L,
    ) -> Result<PreloadReport, ImagesError>
    where
        L: ImageLoader + ?Sized,
    {
        preload(loader, urls, None).await
    }
}
